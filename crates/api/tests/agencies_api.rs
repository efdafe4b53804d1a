//! HTTP-level integration tests for `/api/agencies`.

mod common;

use axum::http::StatusCode;
use common::{
    agency_user, body_json, build_test_app, create_agency, delete_auth, get, get_auth,
    ministry_admin, post_json_auth, put_json_auth, state_admin, test_state,
};
use janconnect_db::repositories::AgencyRepo;
use serde_json::{json, Value};
use sqlx::PgPool;

fn new_agency(name: &str, state: &str) -> Value {
    json!({
        "name": name,
        "type": "Executing",
        "state": state,
        "district": "Nagpur",
        "nodalOfficer": {
            "name": "S. Kulkarni",
            "email": "s.kulkarni@mah.gov.in",
            "phone": "9822098220"
        }
    })
}

#[sqlx::test(migrations = "../db/migrations")]
async fn state_admin_creates_in_own_state_only(pool: PgPool) {
    let (_, token) = state_admin(&pool, "Maharashtra").await;
    let app = build_test_app(test_state(pool));

    let response = post_json_auth(
        &app,
        "/api/agencies",
        &token,
        new_agency("Nagpur Works", "Maharashtra"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["type"], "Executing");
    assert_eq!(json["isActive"], true);
    assert_eq!(json["nodalOfficer"]["phone"], "9822098220");

    let response = post_json_auth(
        &app,
        "/api/agencies",
        &token,
        new_agency("Lucknow Works", "Uttar Pradesh"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn invalid_nodal_phone_is_rejected(pool: PgPool) {
    let (_, token) = ministry_admin(&pool).await;
    let app = build_test_app(test_state(pool));

    let mut body = new_agency("Bad Phone", "Goa");
    body["nodalOfficer"]["phone"] = json!("12345");
    let response = post_json_auth(&app, "/api/agencies", &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_fields_are_reported(pool: PgPool) {
    let (_, token) = ministry_admin(&pool).await;
    let app = build_test_app(test_state(pool));

    let response = post_json_auth(&app, "/api/agencies", &token, json!({ "name": "Only name" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "Please provide all required fields"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn agency_user_cannot_create_even_with_empty_body(pool: PgPool) {
    let own = create_agency(&pool, "Nagpur Works", "Maharashtra").await;
    let (_, token) = agency_user(&pool, "staff@ngo.org", own.id).await;
    let app = build_test_app(test_state(pool.clone()));

    let response = post_json_auth(&app, "/api/agencies", &token, json!({})).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_json(response).await["message"],
        "Not authorized as state admin or higher"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn listing_is_scoped_by_role(pool: PgPool) {
    let own = create_agency(&pool, "Pune Trust", "Maharashtra").await;
    create_agency(&pool, "Mumbai Trust", "Maharashtra").await;
    create_agency(&pool, "Lucknow Trust", "Uttar Pradesh").await;
    let (_, admin) = ministry_admin(&pool).await;
    let (_, sa) = state_admin(&pool, "Maharashtra").await;
    let (_, au) = agency_user(&pool, "staff@ngo.org", own.id).await;
    let app = build_test_app(test_state(pool));

    let all = body_json(get_auth(&app, "/api/agencies", &admin).await).await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let scoped = body_json(get_auth(&app, "/api/agencies?state=Uttar%20Pradesh", &sa).await).await;
    let scoped = scoped.as_array().unwrap();
    assert_eq!(scoped.len(), 2);
    assert!(scoped.iter().all(|a| a["state"] == "Maharashtra"));

    let mine = body_json(get_auth(&app, "/api/agencies", &au).await).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
    assert_eq!(mine[0]["id"], own.id);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn public_listing_hides_inactive_and_contacts(pool: PgPool) {
    let active = create_agency(&pool, "Active Trust", "Goa").await;
    let inactive = create_agency(&pool, "Dormant Trust", "Goa").await;
    let (_, token) = ministry_admin(&pool).await;
    let app = build_test_app(test_state(pool));

    let response = put_json_auth(
        &app,
        &format!("/api/agencies/{}", inactive.id),
        &token,
        json!({ "isActive": false }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&app, "/api/agencies/public").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let list = json.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], active.id);
    assert!(list[0].get("nodalOfficer").is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn agency_user_reads_only_own_agency(pool: PgPool) {
    let own = create_agency(&pool, "Pune Trust", "Maharashtra").await;
    let other = create_agency(&pool, "Mumbai Trust", "Maharashtra").await;
    let (_, token) = agency_user(&pool, "staff@ngo.org", own.id).await;
    let app = build_test_app(test_state(pool));

    let response = get_auth(&app, &format!("/api/agencies/{}", own.id), &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(&app, &format!("/api/agencies/{}", other.id), &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_clears_nullable_fields_and_guards_state_moves(pool: PgPool) {
    let agency = create_agency(&pool, "Pune Trust", "Maharashtra").await;
    let (_, token) = state_admin(&pool, "Maharashtra").await;
    let app = build_test_app(test_state(pool.clone()));
    let uri = format!("/api/agencies/{}", agency.id);

    let response = put_json_auth(&app, &uri, &token, json!({ "district": null })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["district"], Value::Null);
    assert_eq!(json["name"], "Pune Trust");

    let response = put_json_auth(&app, &uri, &token, json!({ "state": "Goa" })).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let stored = AgencyRepo::find_by_id(&pool, agency.id).await.unwrap().unwrap();
    assert_eq!(stored.state, "Maharashtra");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn only_ministry_admin_deletes(pool: PgPool) {
    let agency = create_agency(&pool, "Pune Trust", "Maharashtra").await;
    let (_, sa) = state_admin(&pool, "Maharashtra").await;
    let (_, admin) = ministry_admin(&pool).await;
    let app = build_test_app(test_state(pool));
    let uri = format!("/api/agencies/{}", agency.id);

    assert_eq!(delete_auth(&app, &uri, &sa).await.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(&app, &uri, &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Agency removed");

    let response = get_auth(&app, &uri, &admin).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "Agency not found");
}

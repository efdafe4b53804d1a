//! HTTP-level integration tests for `/api/projects` and milestones.

mod common;

use axum::http::StatusCode;
use common::{
    agency_user, body_json, build_test_app, create_agency, delete_auth, get_auth, ministry_admin,
    post_json_auth, put_json_auth, state_admin, test_state,
};
use janconnect_core::types::DbId;
use serde_json::{json, Value};
use sqlx::PgPool;

fn new_project(title: &str, state: &str, implementing: DbId, executing: DbId) -> Value {
    json!({
        "title": title,
        "component": "Hostel",
        "state": state,
        "district": "Pune",
        "implementingAgency": implementing,
        "executingAgency": executing,
        "financials": { "totalBudget": 1000000.0, "fundsReleased": 400000.0, "fundsUtilized": 100000.0 },
        "sanctionDate": "2024-04-01T00:00:00Z",
        "expectedCompletionDate": "2026-03-31T00:00:00Z",
        "milestones": [
            { "description": "Foundation", "deadline": "2024-10-01T00:00:00Z" }
        ]
    })
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_returns_populated_project(pool: PgPool) {
    let a = create_agency(&pool, "Pune Trust", "Maharashtra").await;
    let b = create_agency(&pool, "Pune Builders", "Maharashtra").await;
    let (admin, token) = state_admin(&pool, "Maharashtra").await;
    let app = build_test_app(test_state(pool));

    let response = post_json_auth(
        &app,
        "/api/projects",
        &token,
        new_project("Hostel Pune", "Maharashtra", a.id, b.id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["status"], "Sanctioned");
    assert_eq!(json["implementingAgency"]["name"], "Pune Trust");
    assert_eq!(json["executingAgency"]["name"], "Pune Builders");
    assert_eq!(json["createdBy"]["id"], admin.id);
    assert_eq!(json["utilizationPercentage"], 25.0);
    assert_eq!(json["milestones"].as_array().unwrap().len(), 1);
    assert_eq!(json["milestones"][0]["status"], "Pending");

    let id = json["id"].as_i64().unwrap();
    let fetched = body_json(get_auth(&app, &format!("/api/projects/{id}"), &token).await).await;
    assert_eq!(fetched["implementingAgency"]["id"], a.id);
    assert_eq!(fetched["executingAgency"]["id"], b.id);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn out_of_state_create_is_forbidden_and_stores_nothing(pool: PgPool) {
    let a = create_agency(&pool, "Lucknow Trust", "Uttar Pradesh").await;
    let (_, token) = state_admin(&pool, "Maharashtra").await;
    let (_, admin) = ministry_admin(&pool).await;
    let app = build_test_app(test_state(pool));

    let response = post_json_auth(
        &app,
        "/api/projects",
        &token,
        new_project("Hostel Lucknow", "Uttar Pradesh", a.id, a.id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_json(response).await["message"],
        "Not authorized to create projects in this state"
    );

    let all = body_json(get_auth(&app, "/api/projects", &admin).await).await;
    assert!(all.as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn agency_user_cannot_create_even_with_empty_body(pool: PgPool) {
    let a = create_agency(&pool, "Pune Trust", "Maharashtra").await;
    let (_, token) = agency_user(&pool, "staff@ngo.org", a.id).await;
    let (_, admin) = ministry_admin(&pool).await;
    let app = build_test_app(test_state(pool));

    let response = post_json_auth(&app, "/api/projects", &token, json!({})).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_json(response).await["message"],
        "Not authorized as state admin or higher"
    );

    let all = body_json(get_auth(&app, "/api/projects", &admin).await).await;
    assert!(all.as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_agency_is_404(pool: PgPool) {
    let a = create_agency(&pool, "Pune Trust", "Maharashtra").await;
    let (_, token) = ministry_admin(&pool).await;
    let app = build_test_app(test_state(pool));

    let response = post_json_auth(
        &app,
        "/api/projects",
        &token,
        new_project("Hostel Pune", "Maharashtra", a.id, 999_999),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["message"],
        "One or both agencies not found"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn broken_financial_chain_is_rejected(pool: PgPool) {
    let a = create_agency(&pool, "Pune Trust", "Maharashtra").await;
    let (_, token) = ministry_admin(&pool).await;
    let app = build_test_app(test_state(pool));

    let mut body = new_project("Hostel Pune", "Maharashtra", a.id, a.id);
    body["financials"]["fundsUtilized"] = json!(500000.0);
    let response = post_json_auth(&app, "/api/projects", &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn reads_are_scoped_by_role(pool: PgPool) {
    let mh = create_agency(&pool, "Pune Trust", "Maharashtra").await;
    let up = create_agency(&pool, "Lucknow Trust", "Uttar Pradesh").await;
    let (_, admin) = ministry_admin(&pool).await;
    let (_, sa) = state_admin(&pool, "Maharashtra").await;
    let (_, au) = agency_user(&pool, "staff@lucknow.org", up.id).await;
    let app = build_test_app(test_state(pool));

    let mh_project = body_json(
        post_json_auth(&app, "/api/projects", &admin, new_project("Hostel Pune", "Maharashtra", mh.id, mh.id)).await,
    )
    .await;
    post_json_auth(
        &app,
        "/api/projects",
        &admin,
        new_project("Hostel Lucknow", "Uttar Pradesh", up.id, up.id),
    )
    .await;

    let scoped =
        body_json(get_auth(&app, "/api/projects?state=Uttar%20Pradesh", &sa).await).await;
    let scoped = scoped.as_array().unwrap();
    assert_eq!(scoped.len(), 1);
    assert!(scoped.iter().all(|p| p["state"] == "Maharashtra"));

    let mine = body_json(get_auth(&app, "/api/projects", &au).await).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
    assert_eq!(mine[0]["implementingAgencyId"], up.id);

    let response = get_auth(
        &app,
        &format!("/api/projects/{}", mh_project["id"]),
        &au,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_json(response).await["message"],
        "Not authorized to view this project"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn stats_follow_the_same_scope(pool: PgPool) {
    let mh = create_agency(&pool, "Pune Trust", "Maharashtra").await;
    let up = create_agency(&pool, "Lucknow Trust", "Uttar Pradesh").await;
    let (_, admin) = ministry_admin(&pool).await;
    let (_, sa) = state_admin(&pool, "Maharashtra").await;
    let app = build_test_app(test_state(pool));

    for (title, state, agency) in [
        ("Hostel Pune", "Maharashtra", mh.id),
        ("Hostel Nashik", "Maharashtra", mh.id),
        ("Hostel Lucknow", "Uttar Pradesh", up.id),
    ] {
        let response =
            post_json_auth(&app, "/api/projects", &admin, new_project(title, state, agency, agency)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let stats = body_json(get_auth(&app, "/api/projects/stats/summary", &sa).await).await;
    assert_eq!(stats["summary"]["totalProjects"], 2);
    assert_eq!(stats["summary"]["totalBudget"], 2000000.0);
    assert_eq!(stats["summary"]["sanctioned"], 2);
    assert_eq!(stats["byComponent"][0]["component"], "Hostel");
    assert_eq!(stats["byComponent"][0]["count"], 2);

    let stats = body_json(get_auth(&app, "/api/projects/stats/summary", &admin).await).await;
    assert_eq!(stats["summary"]["totalProjects"], 3);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_patches_and_stamps_updater(pool: PgPool) {
    let a = create_agency(&pool, "Pune Trust", "Maharashtra").await;
    let (sa_user, sa) = state_admin(&pool, "Maharashtra").await;
    let app = build_test_app(test_state(pool));

    let created = body_json(
        post_json_auth(&app, "/api/projects", &sa, new_project("Hostel Pune", "Maharashtra", a.id, a.id)).await,
    )
    .await;
    let uri = format!("/api/projects/{}", created["id"]);

    let response = put_json_auth(
        &app,
        &uri,
        &sa,
        json!({ "status": "In-Progress", "financials": { "fundsReleased": 600000.0 }, "description": "Phase 1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "In-Progress");
    assert_eq!(json["financials"]["fundsReleased"], 600000.0);
    assert_eq!(json["financials"]["totalBudget"], 1000000.0);
    assert_eq!(json["description"], "Phase 1");
    assert_eq!(json["lastUpdatedBy"]["id"], sa_user.id);

    let response = put_json_auth(&app, &uri, &sa, json!({ "description": null })).await;
    assert_eq!(body_json(response).await["description"], Value::Null);

    let response = put_json_auth(&app, &uri, &sa, json!({ "state": "Goa" })).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = put_json_auth(
        &app,
        &uri,
        &sa,
        json!({ "financials": { "fundsReleased": 2000000.0 } }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_is_ministry_only(pool: PgPool) {
    let a = create_agency(&pool, "Pune Trust", "Maharashtra").await;
    let (_, sa) = state_admin(&pool, "Maharashtra").await;
    let (_, admin) = ministry_admin(&pool).await;
    let app = build_test_app(test_state(pool));

    let created = body_json(
        post_json_auth(&app, "/api/projects", &sa, new_project("Hostel Pune", "Maharashtra", a.id, a.id)).await,
    )
    .await;
    let uri = format!("/api/projects/{}", created["id"]);

    assert_eq!(delete_auth(&app, &uri, &sa).await.status(), StatusCode::FORBIDDEN);
    let response = delete_auth(&app, &uri, &admin).await;
    assert_eq!(body_json(response).await["message"], "Project removed");
    let response = get_auth(&app, &uri, &admin).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "Project not found");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn milestone_completion_is_stamped_once(pool: PgPool) {
    let a = create_agency(&pool, "Pune Trust", "Maharashtra").await;
    let (_, admin) = ministry_admin(&pool).await;
    let (_, au) = agency_user(&pool, "staff@ngo.org", a.id).await;
    let app = build_test_app(test_state(pool));

    let created = body_json(
        post_json_auth(&app, "/api/projects", &admin, new_project("Hostel Pune", "Maharashtra", a.id, a.id)).await,
    )
    .await;
    let project_id = created["id"].as_i64().unwrap();
    let milestone_id = created["milestones"][0]["id"].as_i64().unwrap();
    let uri = format!("/api/projects/{project_id}/milestone/{milestone_id}");

    let response = put_json_auth(
        &app,
        &uri,
        &au,
        json!({ "status": "Completed", "evidenceUrl": "https://example.org/photo.jpg" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let first = body_json(response).await;
    let stamped = first["milestones"][0]["completedDate"].clone();
    assert!(stamped.is_string());
    assert_eq!(first["milestoneProgress"], 100.0);

    let again = body_json(put_json_auth(&app, &uri, &au, json!({ "status": "Completed" })).await).await;
    assert_eq!(again["milestones"][0]["completedDate"], stamped);

    let reverted = body_json(put_json_auth(&app, &uri, &au, json!({ "status": "Pending" })).await).await;
    assert_eq!(reverted["milestones"][0]["status"], "Pending");
    assert_eq!(reverted["milestones"][0]["completedDate"], stamped);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn agency_user_cannot_add_milestones(pool: PgPool) {
    let a = create_agency(&pool, "Pune Trust", "Maharashtra").await;
    let (_, admin) = ministry_admin(&pool).await;
    let (_, au) = agency_user(&pool, "staff@ngo.org", a.id).await;
    let app = build_test_app(test_state(pool));

    let created = body_json(
        post_json_auth(&app, "/api/projects", &admin, new_project("Hostel Pune", "Maharashtra", a.id, a.id)).await,
    )
    .await;
    let uri = format!("/api/projects/{}/milestone", created["id"]);
    let body = json!({ "description": "Roofing", "deadline": "2025-06-01T00:00:00Z" });

    let response = post_json_auth(&app, &uri, &au, body.clone()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json_auth(&app, &uri, &admin, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["milestones"].as_array().unwrap().len(), 2);

    let response = post_json_auth(&app, &uri, &admin, json!({ "description": "No deadline" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "Please provide description and deadline"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_milestone_is_404(pool: PgPool) {
    let a = create_agency(&pool, "Pune Trust", "Maharashtra").await;
    let (_, admin) = ministry_admin(&pool).await;
    let app = build_test_app(test_state(pool));

    let created = body_json(
        post_json_auth(&app, "/api/projects", &admin, new_project("Hostel Pune", "Maharashtra", a.id, a.id)).await,
    )
    .await;
    let response = put_json_auth(
        &app,
        &format!("/api/projects/{}/milestone/999999", created["id"]),
        &admin,
        json!({ "status": "Completed" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "Milestone not found");
}

//! Repository for the `agencies` table.

use janconnect_core::agency::AgencyFields;
use janconnect_core::scope::AgencyFilter;
use janconnect_core::types::DbId;
use sqlx::PgPool;

use super::filter::{bind_values, BindValue, WhereBuilder};
use crate::models::agency::AgencyRow;

const COLUMNS: &str = "\
    id, name, agency_type, state, district, \
    nodal_officer_name, nodal_officer_email, nodal_officer_phone, \
    address, is_active, created_at, updated_at";

/// Provides CRUD operations for agencies.
pub struct AgencyRepo;

impl AgencyRepo {
    /// Insert a new agency, returning the created row.
    pub async fn create(pool: &PgPool, input: &AgencyFields) -> Result<AgencyRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO agencies \
                (name, agency_type, state, district, nodal_officer_name, \
                 nodal_officer_email, nodal_officer_phone, address, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AgencyRow>(&query)
            .bind(&input.name)
            .bind(input.agency_type.as_str())
            .bind(&input.state)
            .bind(&input.district)
            .bind(&input.nodal_officer.name)
            .bind(&input.nodal_officer.email)
            .bind(&input.nodal_officer.phone)
            .bind(&input.address)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<AgencyRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM agencies WHERE id = $1");
        sqlx::query_as::<_, AgencyRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch every agency whose id is in `ids`. Missing ids are skipped.
    pub async fn find_many(pool: &PgPool, ids: &[DbId]) -> Result<Vec<AgencyRow>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!("SELECT {COLUMNS} FROM agencies WHERE id = ANY($1)");
        sqlx::query_as::<_, AgencyRow>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// True when every id in `ids` names an existing agency.
    pub async fn all_exist(pool: &PgPool, ids: &[DbId]) -> Result<bool, sqlx::Error> {
        let mut distinct = ids.to_vec();
        distinct.sort_unstable();
        distinct.dedup();
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM agencies WHERE id = ANY($1)",
        )
        .bind(&distinct)
        .fetch_one(pool)
        .await?;
        Ok(found == distinct.len() as i64)
    }

    /// List agencies visible under `filter`, ordered by name.
    pub async fn list(pool: &PgPool, filter: &AgencyFilter) -> Result<Vec<AgencyRow>, sqlx::Error> {
        let (where_clause, binds, _) = build_agency_filter(filter);
        let query = format!("SELECT {COLUMNS} FROM agencies {where_clause} ORDER BY name");
        bind_values(sqlx::query_as::<_, AgencyRow>(&query), &binds)
            .fetch_all(pool)
            .await
    }

    /// Active agencies for the unauthenticated signup picker.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<AgencyRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM agencies WHERE is_active = true ORDER BY name");
        sqlx::query_as::<_, AgencyRow>(&query).fetch_all(pool).await
    }

    /// Overwrite the editable columns. Returns `None` if no row with `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &AgencyFields,
    ) -> Result<Option<AgencyRow>, sqlx::Error> {
        let query = format!(
            "UPDATE agencies SET
                name = $2,
                agency_type = $3,
                state = $4,
                district = $5,
                nodal_officer_name = $6,
                nodal_officer_email = $7,
                nodal_officer_phone = $8,
                address = $9,
                is_active = $10
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AgencyRow>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.agency_type.as_str())
            .bind(&input.state)
            .bind(&input.district)
            .bind(&input.nodal_officer.name)
            .bind(&input.nodal_officer.email)
            .bind(&input.nodal_officer.phone)
            .bind(&input.address)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete an agency. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM agencies WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn build_agency_filter(filter: &AgencyFilter) -> (String, Vec<BindValue>, u32) {
    let mut w = WhereBuilder::new();
    w.scope(&filter.scope, "state", &["id"]);
    w.eq_text("agency_type", filter.agency_type.map(|t| t.as_str()));
    w.eq_text("state", filter.state.as_deref());
    w.eq_bool("is_active", filter.is_active);
    w.finish()
}

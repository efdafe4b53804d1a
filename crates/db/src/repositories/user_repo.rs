//! Repository for the `users` table.

use janconnect_core::roles::Role;
use janconnect_core::scope::UserQuery;
use janconnect_core::types::DbId;
use sqlx::PgPool;

use super::filter::{bind_values, WhereBuilder};
use crate::models::user::{CreateUser, UpdateUser, User, UserSummaryRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, email, password_hash, role, agency_id, state, is_active, \
                       created_at, updated_at";

/// Name of the unique constraint on `users.email`.
pub const EMAIL_UNIQUE_CONSTRAINT: &str = "uq_users_email";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, email, password_hash, role, agency_id, state, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(input.role.as_str())
            .bind(input.agency_id)
            .bind(&input.state)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email. Emails are stored normalised, so callers pass
    /// the normalised form.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List users matching the query, most recently created first.
    pub async fn list(pool: &PgPool, params: &UserQuery) -> Result<Vec<User>, sqlx::Error> {
        let (where_clause, binds, _) = build_user_filter(params);
        let query = format!("SELECT {COLUMNS} FROM users {where_clause} ORDER BY created_at DESC");
        bind_values(sqlx::query_as::<_, User>(&query), &binds)
            .fetch_all(pool)
            .await
    }

    /// Overwrite the editable columns. Returns `None` if no row with `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                name = $2,
                email = $3,
                role = $4,
                agency_id = $5,
                state = $6,
                is_active = $7
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(input.role.as_str())
            .bind(input.agency_id)
            .bind(&input.state)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Self-service profile update. Only non-`None` fields are applied.
    pub async fn update_profile(
        pool: &PgPool,
        id: DbId,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(name)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Update a user's password hash. Returns `true` if the row was updated.
    pub async fn update_password(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Flip a pending account to active.
    ///
    /// Conditional on `is_active = false`, so of two concurrent approvals only
    /// one sees the row. Returns `None` when the user is missing or already active.
    pub async fn activate(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET is_active = true
             WHERE id = $1 AND is_active = false
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a user. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a pending (inactive) user, returning the removed row.
    pub async fn delete_pending(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("DELETE FROM users WHERE id = $1 AND is_active = false RETURNING {COLUMNS}");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// `{id, name, email}` for each existing id. Missing ids are skipped.
    pub async fn find_summaries(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<UserSummaryRow>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, UserSummaryRow>("SELECT id, name, email FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Whether any account holds `role`.
    pub async fn exists_with_role(pool: &PgPool, role: Role) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE role = $1)")
            .bind(role.as_str())
            .fetch_one(pool)
            .await
    }
}

fn build_user_filter(params: &UserQuery) -> (String, Vec<super::filter::BindValue>, u32) {
    let mut w = WhereBuilder::new();
    w.eq_text("role", params.role.map(Role::as_str));
    w.eq_text("state", params.state.as_deref());
    w.eq_id("agency_id", params.agency);
    w.eq_bool("is_active", params.is_active);
    w.finish()
}

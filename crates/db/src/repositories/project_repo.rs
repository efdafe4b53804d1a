//! Repository for the `projects` table, plus population of the full
//! project representation.

use std::collections::HashMap;

use janconnect_core::agency::Agency;
use janconnect_core::milestone::Milestone;
use janconnect_core::project::{milestone_progress, Component, ProjectDetail, ProjectFields};
use janconnect_core::scope::ProjectFilter;
use janconnect_core::stats::{ComponentStat, ProjectStats};
use janconnect_core::types::{DbId, Timestamp};
use janconnect_core::user::UserSummary;
use sqlx::PgPool;

use super::filter::{bind_values, BindValue, WhereBuilder};
use super::milestone_repo::insert_in;
use super::{AgencyRepo, MilestoneRepo, UserRepo};
use crate::models::project::{ComponentStatRow, ProjectRow, SummaryRow};

const COLUMNS: &str = "\
    id, title, component, status, state, district, \
    implementing_agency_id, executing_agency_id, \
    total_budget, funds_released, funds_utilized, \
    sanction_date, expected_completion_date, actual_completion_date, \
    description, beneficiaries, created_by, last_updated_by, created_at, updated_at";

/// Provides CRUD, listing and aggregate queries for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a project and its initial milestones in one transaction.
    pub async fn create(
        pool: &PgPool,
        input: &ProjectFields,
        created_by: DbId,
        milestones: &[(String, Timestamp)],
    ) -> Result<ProjectRow, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO projects \
                (title, component, status, state, district, \
                 implementing_agency_id, executing_agency_id, \
                 total_budget, funds_released, funds_utilized, \
                 sanction_date, expected_completion_date, actual_completion_date, \
                 description, beneficiaries, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(&input.title)
            .bind(input.component.as_str())
            .bind(input.status.as_str())
            .bind(&input.state)
            .bind(&input.district)
            .bind(input.implementing_agency_id)
            .bind(input.executing_agency_id)
            .bind(input.financials.total_budget)
            .bind(input.financials.funds_released)
            .bind(input.financials.funds_utilized)
            .bind(input.sanction_date)
            .bind(input.expected_completion_date)
            .bind(input.actual_completion_date)
            .bind(&input.description)
            .bind(input.beneficiaries)
            .bind(created_by)
            .fetch_one(&mut *tx)
            .await?;

        for (description, deadline) in milestones {
            insert_in(&mut tx, row.id, description, *deadline).await?;
        }

        tx.commit().await?;
        Ok(row)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ProjectRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a project and populate it.
    pub async fn find_detail(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProjectDetail>, sqlx::Error> {
        match Self::find_by_id(pool, id).await? {
            Some(row) => Ok(Self::populate(pool, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Projects visible under `filter`, newest first, fully populated.
    pub async fn list(
        pool: &PgPool,
        filter: &ProjectFilter,
    ) -> Result<Vec<ProjectDetail>, sqlx::Error> {
        let (where_clause, binds, _) = build_project_filter(filter);
        let query = format!("SELECT {COLUMNS} FROM projects {where_clause} ORDER BY created_at DESC, id DESC");
        let rows = bind_values(sqlx::query_as::<_, ProjectRow>(&query), &binds)
            .fetch_all(pool)
            .await?;
        Self::populate(pool, rows).await
    }

    /// Overwrite the editable columns and stamp `last_updated_by`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &ProjectFields,
        updated_by: DbId,
    ) -> Result<Option<ProjectRow>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                title = $2,
                component = $3,
                status = $4,
                state = $5,
                district = $6,
                implementing_agency_id = $7,
                executing_agency_id = $8,
                total_budget = $9,
                funds_released = $10,
                funds_utilized = $11,
                sanction_date = $12,
                expected_completion_date = $13,
                actual_completion_date = $14,
                description = $15,
                beneficiaries = $16,
                last_updated_by = $17
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(input.component.as_str())
            .bind(input.status.as_str())
            .bind(&input.state)
            .bind(&input.district)
            .bind(input.implementing_agency_id)
            .bind(input.executing_agency_id)
            .bind(input.financials.total_budget)
            .bind(input.financials.funds_released)
            .bind(input.financials.funds_utilized)
            .bind(input.sanction_date)
            .bind(input.expected_completion_date)
            .bind(input.actual_completion_date)
            .bind(&input.description)
            .bind(input.beneficiaries)
            .bind(updated_by)
            .fetch_optional(pool)
            .await
    }

    /// Delete a project; its milestones go with it.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Totals, per-status counts and per-component breakdown over `filter`.
    pub async fn stats(pool: &PgPool, filter: &ProjectFilter) -> Result<ProjectStats, sqlx::Error> {
        let (where_clause, binds, _) = build_project_filter(filter);

        let summary_query = format!(
            "SELECT \
                COUNT(*)::BIGINT AS total_projects, \
                COALESCE(SUM(total_budget), 0)::FLOAT8 AS total_budget, \
                COALESCE(SUM(funds_released), 0)::FLOAT8 AS total_released, \
                COALESCE(SUM(funds_utilized), 0)::FLOAT8 AS total_utilized, \
                COUNT(*) FILTER (WHERE status = 'Sanctioned')::BIGINT AS sanctioned, \
                COUNT(*) FILTER (WHERE status = 'In-Progress')::BIGINT AS in_progress, \
                COUNT(*) FILTER (WHERE status = 'Completed')::BIGINT AS completed, \
                COUNT(*) FILTER (WHERE status = 'Delayed')::BIGINT AS delayed \
             FROM projects {where_clause}"
        );
        let summary = bind_values(sqlx::query_as::<_, SummaryRow>(&summary_query), &binds)
            .fetch_one(pool)
            .await?;

        let component_query = format!(
            "SELECT component, COUNT(*)::BIGINT AS count, \
                COALESCE(SUM(total_budget), 0)::FLOAT8 AS budget \
             FROM projects {where_clause} GROUP BY component"
        );
        let rows = bind_values(sqlx::query_as::<_, ComponentStatRow>(&component_query), &binds)
            .fetch_all(pool)
            .await?;

        let mut by_component: Vec<ComponentStat> = rows.into_iter().map(Into::into).collect();
        by_component.sort_by_key(|c| Component::ALL.iter().position(|x| *x == c.component));

        Ok(ProjectStats {
            summary: summary.into(),
            by_component,
        })
    }

    /// Join agencies, author summaries and milestones onto `rows`.
    ///
    /// Runs one query per referenced table regardless of how many rows are
    /// passed. References whose target no longer exists populate as `None`.
    pub async fn populate(
        pool: &PgPool,
        rows: Vec<ProjectRow>,
    ) -> Result<Vec<ProjectDetail>, sqlx::Error> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let project_ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();
        let agency_ids: Vec<DbId> = rows
            .iter()
            .flat_map(|r| [r.implementing_agency_id, r.executing_agency_id])
            .collect();
        let user_ids: Vec<DbId> = rows
            .iter()
            .flat_map(|r| std::iter::once(r.created_by).chain(r.last_updated_by))
            .collect();

        let agencies: HashMap<DbId, Agency> = AgencyRepo::find_many(pool, &agency_ids)
            .await?
            .into_iter()
            .map(|row| (row.id, Agency::from(row)))
            .collect();
        let users: HashMap<DbId, UserSummary> = UserRepo::find_summaries(pool, &user_ids)
            .await?
            .into_iter()
            .map(|row| (row.id, UserSummary::from(row)))
            .collect();
        let mut milestones: HashMap<DbId, Vec<Milestone>> = HashMap::new();
        for row in MilestoneRepo::list_for_projects(pool, &project_ids).await? {
            milestones
                .entry(row.project_id)
                .or_default()
                .push(Milestone::from(row));
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let milestones = milestones.remove(&row.id).unwrap_or_default();
                detail(row, &agencies, &users, milestones)
            })
            .collect())
    }
}

fn detail(
    row: ProjectRow,
    agencies: &HashMap<DbId, Agency>,
    users: &HashMap<DbId, UserSummary>,
    milestones: Vec<Milestone>,
) -> ProjectDetail {
    let financials = row.financials();
    ProjectDetail {
        id: row.id,
        title: row.title,
        component: row.component,
        status: row.status,
        state: row.state,
        district: row.district,
        implementing_agency_id: row.implementing_agency_id,
        executing_agency_id: row.executing_agency_id,
        implementing_agency: agencies.get(&row.implementing_agency_id).cloned(),
        executing_agency: agencies.get(&row.executing_agency_id).cloned(),
        financials,
        milestone_progress: milestone_progress(&milestones),
        utilization_percentage: financials.utilization_percentage(),
        milestones,
        sanction_date: row.sanction_date,
        expected_completion_date: row.expected_completion_date,
        actual_completion_date: row.actual_completion_date,
        description: row.description,
        beneficiaries: row.beneficiaries,
        created_by: users.get(&row.created_by).cloned(),
        last_updated_by: row.last_updated_by.and_then(|id| users.get(&id).cloned()),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

/// Stamp the parent project after a milestone write.
pub(crate) async fn stamp_last_updated_by(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    project_id: DbId,
    user_id: DbId,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE projects SET last_updated_by = $2 WHERE id = $1")
        .bind(project_id)
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Render a [`ProjectFilter`] into SQL: scope first, then explicit filters.
///
/// Returns `(where_clause, bind_values, next_bind_index)`.
fn build_project_filter(filter: &ProjectFilter) -> (String, Vec<BindValue>, u32) {
    let mut w = WhereBuilder::new();
    w.scope(
        &filter.scope,
        "state",
        &["implementing_agency_id", "executing_agency_id"],
    );
    w.eq_text("state", filter.state.as_deref());
    w.eq_text("status", filter.status.map(|s| s.as_str()));
    w.eq_text("component", filter.component.map(|c| c.as_str()));
    w.eq_id("implementing_agency_id", filter.implementing_agency);
    w.eq_id("executing_agency_id", filter.executing_agency);
    w.contains("title", filter.search.as_deref());
    w.finish()
}

#[cfg(test)]
mod tests {
    use janconnect_core::project::ProjectStatus;
    use janconnect_core::scope::RecordScope;

    use super::*;

    fn filter(scope: RecordScope) -> ProjectFilter {
        ProjectFilter {
            scope,
            state: None,
            status: None,
            component: None,
            implementing_agency: None,
            executing_agency: None,
            search: None,
        }
    }

    #[test]
    fn ministry_scope_without_filters_is_unrestricted() {
        let (clause, binds, _) = build_project_filter(&filter(RecordScope::All));
        assert_eq!(clause, "");
        assert!(binds.is_empty());
    }

    #[test]
    fn state_scope_and_explicit_filters_are_anded() {
        let mut f = filter(RecordScope::State("Maharashtra".into()));
        f.status = Some(ProjectStatus::Delayed);
        f.search = Some("hostel".into());
        let (clause, binds, next) = build_project_filter(&f);
        assert_eq!(
            clause,
            "WHERE state = $1 AND status = $2 AND title ILIKE $3"
        );
        assert_eq!(binds[2], BindValue::Text("%hostel%".into()));
        assert_eq!(next, 4);
    }

    #[test]
    fn agency_scope_is_or_of_both_sides() {
        let mut f = filter(RecordScope::Agency(9));
        f.executing_agency = Some(12);
        let (clause, _, _) = build_project_filter(&f);
        assert_eq!(
            clause,
            "WHERE (implementing_agency_id = $1 OR executing_agency_id = $1) \
             AND executing_agency_id = $2"
        );
    }
}

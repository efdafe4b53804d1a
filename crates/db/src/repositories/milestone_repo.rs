//! Repository for the `milestones` table.
//!
//! Milestones belong to a project; every write also stamps the parent's
//! `last_updated_by` in the same transaction.

use janconnect_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use super::project_repo::stamp_last_updated_by;
use crate::models::milestone::{MilestoneRow, UpdateMilestone};

const COLUMNS: &str = "id, project_id, description, deadline, status, evidence_url, \
                       completed_date, remarks, created_at, updated_at";

pub struct MilestoneRepo;

impl MilestoneRepo {
    /// Milestones of the given projects, in insertion order.
    pub async fn list_for_projects(
        pool: &PgPool,
        project_ids: &[DbId],
    ) -> Result<Vec<MilestoneRow>, sqlx::Error> {
        if project_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {COLUMNS} FROM milestones WHERE project_id = ANY($1) ORDER BY project_id, id"
        );
        sqlx::query_as::<_, MilestoneRow>(&query)
            .bind(project_ids)
            .fetch_all(pool)
            .await
    }

    /// Find a milestone by id within its project.
    pub async fn find(
        pool: &PgPool,
        project_id: DbId,
        milestone_id: DbId,
    ) -> Result<Option<MilestoneRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM milestones WHERE id = $1 AND project_id = $2");
        sqlx::query_as::<_, MilestoneRow>(&query)
            .bind(milestone_id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// Append a pending milestone to a project.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        description: &str,
        deadline: Timestamp,
        added_by: DbId,
    ) -> Result<MilestoneRow, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let row = insert_in(&mut tx, project_id, description, deadline).await?;
        stamp_last_updated_by(&mut tx, project_id, added_by).await?;
        tx.commit().await?;
        Ok(row)
    }

    /// Write the resolved milestone values. Returns `None` if the milestone
    /// does not exist under `project_id`.
    pub async fn update(
        pool: &PgPool,
        project_id: DbId,
        milestone_id: DbId,
        input: &UpdateMilestone,
        updated_by: DbId,
    ) -> Result<Option<MilestoneRow>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "UPDATE milestones SET
                status = $3,
                completed_date = $4,
                evidence_url = $5,
                remarks = $6
             WHERE id = $1 AND project_id = $2
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, MilestoneRow>(&query)
            .bind(milestone_id)
            .bind(project_id)
            .bind(input.status.as_str())
            .bind(input.completed_date)
            .bind(&input.evidence_url)
            .bind(&input.remarks)
            .fetch_optional(&mut *tx)
            .await?;

        if row.is_some() {
            stamp_last_updated_by(&mut tx, project_id, updated_by).await?;
        }
        tx.commit().await?;
        Ok(row)
    }
}

/// Insert a milestone inside an open transaction.
pub(crate) async fn insert_in(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    project_id: DbId,
    description: &str,
    deadline: Timestamp,
) -> Result<MilestoneRow, sqlx::Error> {
    let query = format!(
        "INSERT INTO milestones (project_id, description, deadline)
         VALUES ($1, $2, $3)
         RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, MilestoneRow>(&query)
        .bind(project_id)
        .bind(description)
        .bind(deadline)
        .fetch_one(&mut **tx)
        .await
}

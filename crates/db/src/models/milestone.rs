//! Milestone row model.

use janconnect_core::milestone::{Milestone, MilestoneStatus};
use janconnect_core::types::{DbId, Timestamp};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct MilestoneRow {
    pub id: DbId,
    pub project_id: DbId,
    pub description: String,
    pub deadline: Timestamp,
    #[sqlx(try_from = "String")]
    pub status: MilestoneStatus,
    pub evidence_url: Option<String>,
    pub completed_date: Option<Timestamp>,
    pub remarks: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<MilestoneRow> for Milestone {
    fn from(row: MilestoneRow) -> Self {
        Self {
            id: row.id,
            project_id: row.project_id,
            description: row.description,
            deadline: row.deadline,
            status: row.status,
            evidence_url: row.evidence_url,
            completed_date: row.completed_date,
            remarks: row.remarks,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Final values for a milestone update, after the status machine has run.
#[derive(Debug, Clone)]
pub struct UpdateMilestone {
    pub status: MilestoneStatus,
    pub completed_date: Option<Timestamp>,
    pub evidence_url: Option<String>,
    pub remarks: Option<String>,
}

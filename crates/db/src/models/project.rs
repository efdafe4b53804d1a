//! Project row model and aggregate rows.

use janconnect_core::project::{Component, Financials, ProjectFields, ProjectStatus};
use janconnect_core::stats::{ComponentStat, ProjectSummary};
use janconnect_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Row from the `projects` table. Financials are stored flattened.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: DbId,
    pub title: String,
    #[sqlx(try_from = "String")]
    pub component: Component,
    #[sqlx(try_from = "String")]
    pub status: ProjectStatus,
    pub state: String,
    pub district: String,
    pub implementing_agency_id: DbId,
    pub executing_agency_id: DbId,
    pub total_budget: f64,
    pub funds_released: f64,
    pub funds_utilized: f64,
    pub sanction_date: Timestamp,
    pub expected_completion_date: Timestamp,
    pub actual_completion_date: Option<Timestamp>,
    pub description: Option<String>,
    pub beneficiaries: i64,
    pub created_by: DbId,
    pub last_updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProjectRow {
    pub fn financials(&self) -> Financials {
        Financials {
            total_budget: self.total_budget,
            funds_released: self.funds_released,
            funds_utilized: self.funds_utilized,
        }
    }

    /// The editable part of the row, for merging an update onto.
    pub fn fields(&self) -> ProjectFields {
        ProjectFields {
            title: self.title.clone(),
            component: self.component,
            status: self.status,
            state: self.state.clone(),
            district: self.district.clone(),
            implementing_agency_id: self.implementing_agency_id,
            executing_agency_id: self.executing_agency_id,
            financials: self.financials(),
            sanction_date: self.sanction_date,
            expected_completion_date: self.expected_completion_date,
            actual_completion_date: self.actual_completion_date,
            description: self.description.clone(),
            beneficiaries: self.beneficiaries,
        }
    }
}

/// Single-row result of the summary aggregate.
#[derive(Debug, Clone, FromRow)]
pub struct SummaryRow {
    pub total_projects: i64,
    pub total_budget: f64,
    pub total_released: f64,
    pub total_utilized: f64,
    pub sanctioned: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub delayed: i64,
}

impl From<SummaryRow> for ProjectSummary {
    fn from(row: SummaryRow) -> Self {
        Self {
            total_projects: row.total_projects,
            total_budget: row.total_budget,
            total_released: row.total_released,
            total_utilized: row.total_utilized,
            sanctioned: row.sanctioned,
            in_progress: row.in_progress,
            completed: row.completed,
            delayed: row.delayed,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ComponentStatRow {
    #[sqlx(try_from = "String")]
    pub component: Component,
    pub count: i64,
    pub budget: f64,
}

impl From<ComponentStatRow> for ComponentStat {
    fn from(row: ComponentStatRow) -> Self {
        Self {
            component: row.component,
            count: row.count,
            budget: row.budget,
        }
    }
}

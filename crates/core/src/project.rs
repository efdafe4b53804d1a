//! Project wire types, financial invariants and derived metrics.

use serde::{Deserialize, Serialize};

use crate::agency::Agency;
use crate::error::CoreError;
use crate::milestone::{Milestone, MilestoneStatus};
use crate::patch::{keep_or, keep_or_clear, nullable};
use crate::types::{labeled_enum, DbId, Timestamp};
use crate::user::UserSummary;
use crate::validation::require_fields;

labeled_enum! {
    /// Scheme component a project is funded under.
    Component, "component" {
        AdarshGram => "Adarsh Gram",
        Gia => "GIA",
        Hostel => "Hostel",
    }
}

labeled_enum! {
    /// Delivery status. Any status may move to any other.
    ProjectStatus, "project status" {
        Sanctioned => "Sanctioned",
        InProgress => "In-Progress",
        Completed => "Completed",
        Delayed => "Delayed",
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::Sanctioned
    }
}

// ---------------------------------------------------------------------------
// Financials
// ---------------------------------------------------------------------------

/// Budget figures in rupees. Must satisfy
/// `0 <= funds_utilized <= funds_released <= total_budget`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Financials {
    #[serde(default)]
    pub total_budget: f64,
    #[serde(default)]
    pub funds_released: f64,
    #[serde(default)]
    pub funds_utilized: f64,
}

impl Financials {
    /// Check the non-negativity and ordering chain. Violations are rejected, never clamped.
    pub fn validate(&self) -> Result<(), CoreError> {
        let checks = [
            (self.total_budget.is_finite() && self.total_budget >= 0.0, "Budget cannot be negative"),
            (
                self.funds_released.is_finite() && self.funds_released >= 0.0,
                "Funds released cannot be negative",
            ),
            (
                self.funds_utilized.is_finite() && self.funds_utilized >= 0.0,
                "Funds utilized cannot be negative",
            ),
            (
                self.funds_released <= self.total_budget,
                "Funds released cannot exceed total budget",
            ),
            (
                self.funds_utilized <= self.funds_released,
                "Funds utilized cannot exceed funds released",
            ),
        ];

        match checks.iter().find(|(ok, _)| !ok) {
            Some((_, msg)) => Err(CoreError::Validation((*msg).to_string())),
            None => Ok(()),
        }
    }

    /// `funds_utilized / funds_released * 100`, two decimals; 0 when nothing released.
    pub fn utilization_percentage(&self) -> f64 {
        percentage(self.funds_utilized, self.funds_released)
    }
}

/// Per-field financial update.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialsPatch {
    pub total_budget: Option<f64>,
    pub funds_released: Option<f64>,
    pub funds_utilized: Option<f64>,
}

impl FinancialsPatch {
    pub fn apply(&self, financials: &mut Financials) {
        keep_or(&mut financials.total_budget, self.total_budget);
        keep_or(&mut financials.funds_released, self.funds_released);
        keep_or(&mut financials.funds_utilized, self.funds_utilized);
    }
}

/// `part / whole * 100` rounded to two decimals, 0 when `whole` is 0.
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    (part / whole * 100.0 * 100.0).round() / 100.0
}

/// Share of completed milestones, two decimals; 0 with no milestones.
pub fn milestone_progress(milestones: &[Milestone]) -> f64 {
    let completed = milestones
        .iter()
        .filter(|m| m.status == MilestoneStatus::Completed)
        .count();
    percentage(completed as f64, milestones.len() as f64)
}

// ---------------------------------------------------------------------------
// Editable fields, create payload and patch
// ---------------------------------------------------------------------------

/// Every persisted project attribute a create or update can set.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectFields {
    pub title: String,
    pub component: Component,
    pub status: ProjectStatus,
    pub state: String,
    pub district: String,
    pub implementing_agency_id: DbId,
    pub executing_agency_id: DbId,
    pub financials: Financials,
    pub sanction_date: Timestamp,
    pub expected_completion_date: Timestamp,
    pub actual_completion_date: Option<Timestamp>,
    pub description: Option<String>,
    pub beneficiaries: i64,
}

impl ProjectFields {
    /// Schema-level checks run before every insert and update.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_fields(&[
            Some(self.title.as_str()),
            Some(self.state.as_str()),
            Some(self.district.as_str()),
        ])?;
        if self.beneficiaries < 0 {
            return Err(CoreError::Validation(
                "Beneficiaries cannot be negative".to_string(),
            ));
        }
        self.financials.validate()
    }
}

/// A milestone supplied inline when creating a project, or added later.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMilestone {
    pub description: Option<String>,
    pub deadline: Option<Timestamp>,
}

impl NewMilestone {
    /// Both description and deadline are mandatory.
    pub fn validate(&self) -> Result<(String, Timestamp), CoreError> {
        match (self.description.as_deref().map(str::trim), self.deadline) {
            (Some(description), Some(deadline)) if !description.is_empty() => {
                Ok((description.to_string(), deadline))
            }
            _ => Err(CoreError::Validation(
                "Please provide description and deadline".to_string(),
            )),
        }
    }
}

/// Body of `POST /projects`. Everything optional so missing fields surface as
/// one validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub title: Option<String>,
    pub component: Option<Component>,
    pub status: Option<ProjectStatus>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub implementing_agency: Option<DbId>,
    pub executing_agency: Option<DbId>,
    pub financials: Option<Financials>,
    pub sanction_date: Option<Timestamp>,
    pub expected_completion_date: Option<Timestamp>,
    pub actual_completion_date: Option<Timestamp>,
    pub description: Option<String>,
    pub beneficiaries: Option<i64>,
    #[serde(default)]
    pub milestones: Vec<NewMilestone>,
}

impl NewProject {
    /// The state the project would be created in, if supplied.
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    /// Validate required fields and invariants, producing the insertable fields
    /// and the validated inline milestones.
    pub fn into_fields(self) -> Result<(ProjectFields, Vec<(String, Timestamp)>), CoreError> {
        let (Some(title), Some(component), Some(state), Some(district), Some(imp), Some(exec)) = (
            self.title,
            self.component,
            self.state,
            self.district,
            self.implementing_agency,
            self.executing_agency,
        ) else {
            return Err(CoreError::Validation(
                crate::validation::MISSING_FIELDS_MESSAGE.to_string(),
            ));
        };

        let sanction_date = self
            .sanction_date
            .ok_or_else(|| CoreError::Validation("Please provide sanction date".to_string()))?;
        let expected_completion_date = self.expected_completion_date.ok_or_else(|| {
            CoreError::Validation("Please provide expected completion date".to_string())
        })?;

        let fields = ProjectFields {
            title: title.trim().to_string(),
            component,
            status: self.status.unwrap_or_default(),
            state,
            district,
            implementing_agency_id: imp,
            executing_agency_id: exec,
            financials: self.financials.unwrap_or_default(),
            sanction_date,
            expected_completion_date,
            actual_completion_date: self.actual_completion_date,
            description: self.description,
            beneficiaries: self.beneficiaries.unwrap_or(0),
        };
        fields.validate()?;

        let milestones = self
            .milestones
            .iter()
            .map(NewMilestone::validate)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((fields, milestones))
    }
}

/// Body of `PUT /projects/{id}`: absent keys keep the stored value.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub component: Option<Component>,
    pub status: Option<ProjectStatus>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub implementing_agency: Option<DbId>,
    pub executing_agency: Option<DbId>,
    pub financials: Option<FinancialsPatch>,
    pub sanction_date: Option<Timestamp>,
    pub expected_completion_date: Option<Timestamp>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub actual_completion_date: Option<Option<Timestamp>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    pub beneficiaries: Option<i64>,
}

impl ProjectPatch {
    /// Merge onto `fields` and re-validate the result.
    pub fn apply(self, fields: &mut ProjectFields) -> Result<(), CoreError> {
        keep_or(&mut fields.title, self.title);
        keep_or(&mut fields.component, self.component);
        keep_or(&mut fields.status, self.status);
        keep_or(&mut fields.state, self.state);
        keep_or(&mut fields.district, self.district);
        keep_or(&mut fields.implementing_agency_id, self.implementing_agency);
        keep_or(&mut fields.executing_agency_id, self.executing_agency);
        if let Some(financials) = self.financials {
            financials.apply(&mut fields.financials);
        }
        keep_or(&mut fields.sanction_date, self.sanction_date);
        keep_or(
            &mut fields.expected_completion_date,
            self.expected_completion_date,
        );
        keep_or_clear(&mut fields.actual_completion_date, self.actual_completion_date);
        keep_or_clear(&mut fields.description, self.description);
        keep_or(&mut fields.beneficiaries, self.beneficiaries);
        fields.validate()
    }

    /// Agency ids this patch would newly reference.
    pub fn referenced_agencies(&self) -> Vec<DbId> {
        self.implementing_agency
            .into_iter()
            .chain(self.executing_agency)
            .collect()
    }
}

/// Body of `PUT /projects/{id}/milestone/{milestone_id}`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestonePatch {
    pub status: Option<MilestoneStatus>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub evidence_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub remarks: Option<Option<String>>,
}

// ---------------------------------------------------------------------------
// Populated representation
// ---------------------------------------------------------------------------

/// A project with its agencies, authors and milestones joined in, plus the
/// derived percentages.
///
/// A reference whose target has since been deleted is populated as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    pub id: DbId,
    pub title: String,
    pub component: Component,
    pub status: ProjectStatus,
    pub state: String,
    pub district: String,
    pub implementing_agency_id: DbId,
    pub executing_agency_id: DbId,
    pub implementing_agency: Option<Agency>,
    pub executing_agency: Option<Agency>,
    pub financials: Financials,
    pub milestones: Vec<Milestone>,
    pub sanction_date: Timestamp,
    pub expected_completion_date: Timestamp,
    pub actual_completion_date: Option<Timestamp>,
    pub description: Option<String>,
    pub beneficiaries: i64,
    pub created_by: Option<UserSummary>,
    pub last_updated_by: Option<UserSummary>,
    pub utilization_percentage: f64,
    pub milestone_progress: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProjectDetail {
    /// True when `agency_id` is the implementing or executing agency.
    pub fn involves_agency(&self, agency_id: DbId) -> bool {
        self.implementing_agency_id == agency_id || self.executing_agency_id == agency_id
    }
}

//! Dashboard analytics over an already-fetched, already-scoped project list.
//!
//! Everything here is pure: callers pass `now` so results are reproducible.

use std::collections::HashMap;

use chrono::{Datelike, Months};
use janconnect_core::agency::{Agency, AgencyType};
use janconnect_core::milestone::Milestone;
use janconnect_core::project::{percentage, Component, MilestonePatch, ProjectDetail, ProjectStatus};
use janconnect_core::types::{DbId, Timestamp};
use serde::Serialize;

/// Creation-date window applied before any aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    #[default]
    All,
    Month,
    Quarter,
    Year,
}

impl TimeRange {
    /// Earliest `created_at` still inside the window; `None` for no bound.
    pub fn cutoff(self, now: Timestamp) -> Option<Timestamp> {
        let months = match self {
            TimeRange::All => return None,
            TimeRange::Month => 1,
            TimeRange::Quarter => 3,
            TimeRange::Year => 12,
        };
        now.checked_sub_months(Months::new(months))
    }
}

pub fn filter_by_range(
    projects: &[ProjectDetail],
    range: TimeRange,
    now: Timestamp,
) -> Vec<&ProjectDetail> {
    match range.cutoff(now) {
        Some(cutoff) => projects.iter().filter(|p| p.created_at >= cutoff).collect(),
        None => projects.iter().collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBreakdown {
    pub total: usize,
    pub sanctioned: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub delayed: usize,
    pub completion_rate: f64,
    pub delay_rate: f64,
}

impl StatusBreakdown {
    pub fn of(projects: &[&ProjectDetail]) -> Self {
        let mut out = StatusBreakdown {
            total: projects.len(),
            ..Default::default()
        };
        for project in projects {
            match project.status {
                ProjectStatus::Sanctioned => out.sanctioned += 1,
                ProjectStatus::InProgress => out.in_progress += 1,
                ProjectStatus::Completed => out.completed += 1,
                ProjectStatus::Delayed => out.delayed += 1,
            }
        }
        out.completion_rate = percentage(out.completed as f64, out.total as f64);
        out.delay_rate = percentage(out.delayed as f64, out.total as f64);
        out
    }

    pub fn count(&self, status: ProjectStatus) -> usize {
        match status {
            ProjectStatus::Sanctioned => self.sanctioned,
            ProjectStatus::InProgress => self.in_progress,
            ProjectStatus::Completed => self.completed,
            ProjectStatus::Delayed => self.delayed,
        }
    }
}

/// Fund flow totals. Both rates are relative to the total budget.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub total_budget: f64,
    pub funds_released: f64,
    pub funds_utilized: f64,
    pub release_rate: f64,
    pub utilization_rate: f64,
    /// Sanctioned but not yet released.
    pub pending_funds: f64,
    /// Released but not yet utilized.
    pub unused_funds: f64,
}

impl FinancialSummary {
    pub fn of(projects: &[&ProjectDetail]) -> Self {
        let mut out = FinancialSummary::default();
        for project in projects {
            out.total_budget += project.financials.total_budget;
            out.funds_released += project.financials.funds_released;
            out.funds_utilized += project.financials.funds_utilized;
        }
        out.release_rate = percentage(out.funds_released, out.total_budget);
        out.utilization_rate = percentage(out.funds_utilized, out.total_budget);
        out.pending_funds = out.total_budget - out.funds_released;
        out.unused_funds = out.funds_released - out.funds_utilized;
        out
    }
}

/// Project count per component, every component listed even when zero.
pub fn component_breakdown(projects: &[&ProjectDetail]) -> Vec<(Component, usize)> {
    Component::ALL
        .iter()
        .map(|&c| (c, projects.iter().filter(|p| p.component == c).count()))
        .collect()
}

/// States by project count, busiest first; ties in name order.
pub fn top_states(projects: &[&ProjectDetail], limit: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for project in projects {
        *counts.entry(project.state.as_str()).or_default() += 1;
    }
    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(state, n)| (state.to_string(), n))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    pub year: i32,
    pub month: u32,
    pub count: usize,
}

/// Projects created in each of the last `months` calendar months, oldest
/// first, the current month last.
pub fn monthly_trend(projects: &[&ProjectDetail], months: u32, now: Timestamp) -> Vec<MonthCount> {
    (0..months)
        .rev()
        .filter_map(|back| now.checked_sub_months(Months::new(back)))
        .map(|at| MonthCount {
            year: at.year(),
            month: at.month(),
            count: projects
                .iter()
                .filter(|p| p.created_at.year() == at.year() && p.created_at.month() == at.month())
                .count(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgencyPerformance {
    pub agency_id: DbId,
    pub name: String,
    pub agency_type: AgencyType,
    pub state: String,
    pub total_projects: usize,
    pub completed_projects: usize,
    /// Completed share of the projects the agency takes part in.
    pub performance_rate: f64,
}

/// Agencies ranked by completion rate over the projects they implement or
/// execute, best first, at most `limit` entries.
pub fn agency_performance(
    projects: &[&ProjectDetail],
    agencies: &[Agency],
    limit: usize,
) -> Vec<AgencyPerformance> {
    let mut ranked: Vec<AgencyPerformance> = agencies
        .iter()
        .map(|agency| {
            let involved: Vec<_> = projects
                .iter()
                .filter(|p| p.involves_agency(agency.id))
                .collect();
            let completed = involved
                .iter()
                .filter(|p| p.status == ProjectStatus::Completed)
                .count();
            AgencyPerformance {
                agency_id: agency.id,
                name: agency.name.clone(),
                agency_type: agency.agency_type,
                state: agency.state.clone(),
                total_projects: involved.len(),
                completed_projects: completed,
                performance_rate: percentage(completed as f64, involved.len() as f64),
            }
        })
        .collect();
    ranked.sort_by(|a, b| b.performance_rate.total_cmp(&a.performance_rate));
    ranked.truncate(limit);
    ranked
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverdueMilestone {
    pub project_id: DbId,
    pub project_title: String,
    pub state: String,
    pub milestone_id: DbId,
    pub description: String,
    pub deadline: Timestamp,
}

/// Pending milestones past their deadline, most overdue first.
pub fn overdue_milestones(projects: &[&ProjectDetail], now: Timestamp) -> Vec<OverdueMilestone> {
    let mut overdue: Vec<OverdueMilestone> = projects
        .iter()
        .flat_map(|project| {
            project
                .milestones
                .iter()
                .filter(move |m| m.is_overdue(now))
                .map(move |m| OverdueMilestone {
                    project_id: project.id,
                    project_title: project.title.clone(),
                    state: project.state.clone(),
                    milestone_id: m.id,
                    description: m.description.clone(),
                    deadline: m.deadline,
                })
        })
        .collect();
    overdue.sort_by_key(|o| o.deadline);
    overdue
}

/// The update the tracker's checkbox sends: flip the status, leave
/// evidence and remarks untouched.
pub fn toggle_patch(milestone: &Milestone) -> MilestonePatch {
    MilestonePatch {
        status: Some(milestone.status.toggled()),
        evidence_url: None,
        remarks: None,
    }
}

/// `(completed, total)` for the tracker's progress bar.
pub fn milestone_counts(milestones: &[Milestone]) -> (usize, usize) {
    let completed = milestones.iter().filter(|m| m.is_completed()).count();
    (completed, milestones.len())
}

/// Everything the analytics dashboard shows for one time window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub status: StatusBreakdown,
    pub financials: FinancialSummary,
    pub components: Vec<(Component, usize)>,
    pub top_states: Vec<(String, usize)>,
    pub monthly_trend: Vec<MonthCount>,
    pub agency_performance: Vec<AgencyPerformance>,
    pub overdue_milestones: Vec<OverdueMilestone>,
}

impl AnalyticsReport {
    pub fn build(
        projects: &[ProjectDetail],
        agencies: &[Agency],
        range: TimeRange,
        now: Timestamp,
    ) -> Self {
        let window = filter_by_range(projects, range, now);
        AnalyticsReport {
            status: StatusBreakdown::of(&window),
            financials: FinancialSummary::of(&window),
            components: component_breakdown(&window),
            top_states: top_states(&window, 5),
            monthly_trend: monthly_trend(&window, 6, now),
            agency_performance: agency_performance(&window, agencies, 10),
            overdue_milestones: overdue_milestones(&window, now),
        }
    }
}

//! Aggregate project statistics.

use serde::{Deserialize, Serialize};

use crate::project::{Component, ProjectDetail, ProjectStatus};

/// Totals over the caller's scoped project set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub total_projects: i64,
    pub total_budget: f64,
    pub total_released: f64,
    pub total_utilized: f64,
    pub sanctioned: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub delayed: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentStat {
    pub component: Component,
    pub count: i64,
    pub budget: f64,
}

/// Body of `GET /projects/stats/summary`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    pub summary: ProjectSummary,
    pub by_component: Vec<ComponentStat>,
}

impl ProjectSummary {
    pub fn add(&mut self, project: &ProjectDetail) {
        self.total_projects += 1;
        self.total_budget += project.financials.total_budget;
        self.total_released += project.financials.funds_released;
        self.total_utilized += project.financials.funds_utilized;
        match project.status {
            ProjectStatus::Sanctioned => self.sanctioned += 1,
            ProjectStatus::InProgress => self.in_progress += 1,
            ProjectStatus::Completed => self.completed += 1,
            ProjectStatus::Delayed => self.delayed += 1,
        }
    }
}

impl ProjectStats {
    /// Compute stats from already-fetched projects. Components with no
    /// projects are omitted, matching the SQL aggregate.
    pub fn from_projects<'a>(projects: impl IntoIterator<Item = &'a ProjectDetail>) -> Self {
        let mut stats = ProjectStats::default();
        for project in projects {
            stats.summary.add(project);
            match stats
                .by_component
                .iter_mut()
                .find(|c| c.component == project.component)
            {
                Some(entry) => {
                    entry.count += 1;
                    entry.budget += project.financials.total_budget;
                }
                None => stats.by_component.push(ComponentStat {
                    component: project.component,
                    count: 1,
                    budget: project.financials.total_budget,
                }),
            }
        }
        stats
            .by_component
            .sort_by_key(|c| Component::ALL.iter().position(|x| *x == c.component));
        stats
    }
}

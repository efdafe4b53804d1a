//! Milestone status machine and wire type.
//!
//! Two states only. Moving to `Completed` stamps `completed_date` when it is
//! unset; moving back to `Pending` leaves any existing stamp in place.

use serde::{Deserialize, Serialize};

use crate::types::{labeled_enum, DbId, Timestamp};

labeled_enum! {
    MilestoneStatus, "milestone status" {
        Pending => "Pending",
        Completed => "Completed",
    }
}

impl Default for MilestoneStatus {
    fn default() -> Self {
        MilestoneStatus::Pending
    }
}

impl MilestoneStatus {
    /// The status the tracker's checkbox flips to.
    pub fn toggled(self) -> Self {
        match self {
            MilestoneStatus::Pending => MilestoneStatus::Completed,
            MilestoneStatus::Completed => MilestoneStatus::Pending,
        }
    }
}

/// A dated sub-deliverable of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: DbId,
    pub project_id: DbId,
    pub description: String,
    pub deadline: Timestamp,
    pub status: MilestoneStatus,
    pub evidence_url: Option<String>,
    pub completed_date: Option<Timestamp>,
    pub remarks: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Milestone {
    pub fn is_completed(&self) -> bool {
        self.status == MilestoneStatus::Completed
    }

    /// Past its deadline and still pending.
    pub fn is_overdue(&self, now: Timestamp) -> bool {
        self.status == MilestoneStatus::Pending && self.deadline < now
    }
}

/// Resolve the `(status, completed_date)` pair after a status change request.
///
/// `requested` of `None` keeps the current status. The completion stamp is
/// only ever set, never cleared.
pub fn apply_status(
    current: MilestoneStatus,
    completed_date: Option<Timestamp>,
    requested: Option<MilestoneStatus>,
    now: Timestamp,
) -> (MilestoneStatus, Option<Timestamp>) {
    let status = requested.unwrap_or(current);
    let completed_date = match (requested, completed_date) {
        (Some(MilestoneStatus::Completed), None) => Some(now),
        (_, existing) => existing,
    };
    (status, completed_date)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn t(day: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2025, 3, day, 10, 0, 0).unwrap()
    }

    #[test]
    fn completing_a_pending_milestone_stamps_now() {
        let (status, stamp) =
            apply_status(MilestoneStatus::Pending, None, Some(MilestoneStatus::Completed), t(5));
        assert_eq!(status, MilestoneStatus::Completed);
        assert_eq!(stamp, Some(t(5)));
    }

    #[test]
    fn recompleting_keeps_original_stamp() {
        let (status, stamp) = apply_status(
            MilestoneStatus::Completed,
            Some(t(1)),
            Some(MilestoneStatus::Completed),
            t(9),
        );
        assert_eq!(status, MilestoneStatus::Completed);
        assert_eq!(stamp, Some(t(1)));
    }

    #[test]
    fn reopening_keeps_completed_date() {
        let (status, stamp) = apply_status(
            MilestoneStatus::Completed,
            Some(t(1)),
            Some(MilestoneStatus::Pending),
            t(9),
        );
        assert_eq!(status, MilestoneStatus::Pending);
        assert_eq!(stamp, Some(t(1)));
    }

    #[test]
    fn no_status_in_request_changes_nothing() {
        let (status, stamp) = apply_status(MilestoneStatus::Pending, None, None, t(9));
        assert_eq!(status, MilestoneStatus::Pending);
        assert_eq!(stamp, None);
    }

    #[test]
    fn toggle_flips_both_ways() {
        assert_eq!(MilestoneStatus::Pending.toggled(), MilestoneStatus::Completed);
        assert_eq!(MilestoneStatus::Completed.toggled(), MilestoneStatus::Pending);
    }

    #[test]
    fn overdue_only_when_pending_and_past_deadline() {
        let now = t(10);
        let mut m = Milestone {
            id: 1,
            project_id: 1,
            description: "Foundation laid".into(),
            deadline: now - Duration::days(1),
            status: MilestoneStatus::Pending,
            evidence_url: None,
            completed_date: None,
            remarks: None,
            created_at: t(1),
            updated_at: t(1),
        };
        assert!(m.is_overdue(now));
        m.status = MilestoneStatus::Completed;
        assert!(!m.is_overdue(now));
        m.status = MilestoneStatus::Pending;
        m.deadline = now + Duration::days(1);
        assert!(!m.is_overdue(now));
    }
}

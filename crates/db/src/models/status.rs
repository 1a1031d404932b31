//! Task status lookup enum mapping to the `task_statuses` table.
//!
//! Variant discriminants match the seed data order (1-based) in the
//! migration, so a status id read from a row can be compared against
//! enum values without a lookup query.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

/// Task lifecycle status.
///
/// Transitions are monotonic: `Pending -> Processing -> {Completed,
/// Failed}`. Once a terminal status is reached the task never moves
/// again (a conflicting terminal write is tolerated but logged as an
/// anomaly by the repository).
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending = 1,
    Processing = 2,
    Completed = 3,
    Failed = 4,
}

impl TaskStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Decode a status id read from the database.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(TaskStatus::Pending),
            2 => Some(TaskStatus::Processing),
            3 => Some(TaskStatus::Completed),
            4 => Some(TaskStatus::Failed),
            _ => None,
        }
    }

    /// Human-readable name matching the `task_statuses.name` seed data.
    pub fn name(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Processing => "processing",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }

    /// Completed and failed tasks never transition again.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl From<TaskStatus> for StatusId {
    fn from(value: TaskStatus) -> Self {
        value as StatusId
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_ids_match_seed_data() {
        assert_eq!(TaskStatus::Pending.id(), 1);
        assert_eq!(TaskStatus::Processing.id(), 2);
        assert_eq!(TaskStatus::Completed.id(), 3);
        assert_eq!(TaskStatus::Failed.id(), 4);
    }

    #[test]
    fn status_round_trips_through_id() {
        for status in [
            TaskStatus::Pending,
            TaskStatus::Processing,
            TaskStatus::Completed,
            TaskStatus::Failed,
        ] {
            assert_eq!(TaskStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(TaskStatus::from_id(0), None);
        assert_eq!(TaskStatus::from_id(5), None);
    }

    #[test]
    fn names_match_seed_data() {
        assert_eq!(TaskStatus::Pending.name(), "pending");
        assert_eq!(TaskStatus::Processing.name(), "processing");
        assert_eq!(TaskStatus::Completed.name(), "completed");
        assert_eq!(TaskStatus::Failed.name(), "failed");
    }

    #[test]
    fn only_completed_and_failed_are_terminal() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Processing.is_terminal());
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
    }
}

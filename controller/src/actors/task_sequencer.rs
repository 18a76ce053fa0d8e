//! Task Sequencer - ordered task list plus a cursor
//!
//! ```text
//! Uninitialized --initialize--> Positioned(0)
//! Positioned(i) --advance/retreat/jump_to (in range)--> Positioned(j)
//! Positioned(i) --advance/retreat/jump_to (miss)------> Positioned(i)   (Blocked)
//! ```
//!
//! Every operation yields a `Decision`; the caller acts on it.

use serde::Serialize;
use shared_types::{TaskIdentification, TaskRequestDetails};

pub const NOT_INITIALIZED: &str = "Task sequencer not initialized properly.";
pub const NO_NEXT_TASK: &str = "no next task";
pub const NO_PREVIOUS_TASK: &str = "no previous task";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "index", rename_all = "snake_case")]
pub enum Position {
    Uninitialized,
    Positioned(usize),
}

/// Result of a sequencing operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Return to the login dialog, optionally on a specific endpoint
    Login { player_id: Option<String> },
    /// Switch to `next_task`, optionally on a specific endpoint
    TaskSwitch {
        next_task: TaskIdentification,
        player_id: Option<String>,
    },
    Blocked { reason: String },
}

impl Decision {
    fn blocked(reason: impl Into<String>) -> Self {
        Decision::Blocked {
            reason: reason.into(),
        }
    }

    fn switch_to(task: &TaskIdentification) -> Self {
        Decision::TaskSwitch {
            next_task: task.clone(),
            player_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SequencerSnapshot {
    pub position: Position,
    pub task_count: usize,
    pub current_task: Option<TaskIdentification>,
}

#[derive(Debug)]
pub struct TaskSequencer {
    tasks: Vec<TaskIdentification>,
    position: Position,
}

impl Default for TaskSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskSequencer {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            position: Position::Uninitialized,
        }
    }

    /// Replace the task list and move to the first task.
    pub fn initialize(&mut self, tasks: Vec<TaskIdentification>) {
        self.tasks = tasks;
        self.position = Position::Positioned(0);
    }

    /// Reset to index 0 and return that task.
    pub fn first(&mut self) -> Option<TaskIdentification> {
        self.position = Position::Positioned(0);
        self.tasks.first().cloned()
    }

    pub fn advance(&mut self) -> Decision {
        match self.position {
            Position::Uninitialized => Decision::blocked(NOT_INITIALIZED),
            Position::Positioned(index) => self.move_to(index.checked_add(1), NO_NEXT_TASK),
        }
    }

    pub fn retreat(&mut self) -> Decision {
        match self.position {
            Position::Uninitialized => Decision::blocked(NOT_INITIALIZED),
            Position::Positioned(index) => self.move_to(index.checked_sub(1), NO_PREVIOUS_TASK),
        }
    }

    /// Jump to the task matching `target`. An unspecified item matches on
    /// task and scope only.
    pub fn jump_to(&mut self, target: &TaskRequestDetails) -> Decision {
        if self.position == Position::Uninitialized {
            return Decision::blocked(NOT_INITIALIZED);
        }
        let found = self.tasks.iter().position(|candidate| {
            candidate.task == target.task
                && candidate.scope == target.scope
                && target
                    .item
                    .as_ref()
                    .map(|item| &candidate.item == item)
                    .unwrap_or(true)
        });
        let item = match &target.item {
            Some(item) => format!("in item {item}"),
            None => "with item unspecified".to_string(),
        };
        let reason = format!(
            "Task {} {} and in scope {} is not part of the assessment configuration.",
            target.task, item, target.scope
        );
        self.move_to(found, &reason)
    }

    /// Back to login. The position is left untouched.
    pub fn cancel(&self) -> Decision {
        Decision::Login { player_id: None }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn current(&self) -> Option<&TaskIdentification> {
        match self.position {
            Position::Uninitialized => None,
            Position::Positioned(index) => self.tasks.get(index),
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn snapshot(&self) -> SequencerSnapshot {
        SequencerSnapshot {
            position: self.position,
            task_count: self.tasks.len(),
            current_task: self.current().cloned(),
        }
    }

    fn move_to(&mut self, index: Option<usize>, blocked_reason: &str) -> Decision {
        match index.and_then(|i| self.tasks.get(i).map(|task| (i, task))) {
            Some((i, task)) => {
                let decision = Decision::switch_to(task);
                self.position = Position::Positioned(i);
                decision
            }
            None => Decision::blocked(blocked_reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(item: &str, task: &str, scope: &str) -> TaskIdentification {
        TaskIdentification::new(item, task, scope)
    }

    fn two_task_sequencer() -> TaskSequencer {
        let mut sequencer = TaskSequencer::new();
        sequencer.initialize(vec![task("i1", "t1", "A"), task("i1", "t2", "A")]);
        sequencer
    }

    #[test]
    fn test_uninitialized_blocks_everything_but_cancel() {
        let mut sequencer = TaskSequencer::new();
        let blocked = Decision::Blocked {
            reason: NOT_INITIALIZED.to_string(),
        };
        assert_eq!(sequencer.advance(), blocked);
        assert_eq!(sequencer.retreat(), blocked);
        assert_eq!(
            sequencer.jump_to(&TaskRequestDetails {
                item: None,
                task: "t1".to_string(),
                scope: "A".to_string(),
            }),
            blocked
        );
        assert_eq!(sequencer.cancel(), Decision::Login { player_id: None });
        assert_eq!(sequencer.position(), Position::Uninitialized);
    }

    #[test]
    fn test_two_task_assessment() {
        let mut sequencer = two_task_sequencer();
        assert_eq!(sequencer.first(), Some(task("i1", "t1", "A")));
        assert_eq!(
            sequencer.advance(),
            Decision::TaskSwitch {
                next_task: task("i1", "t2", "A"),
                player_id: None,
            }
        );
        assert_eq!(
            sequencer.advance(),
            Decision::Blocked {
                reason: NO_NEXT_TASK.to_string()
            }
        );
        assert_eq!(sequencer.position(), Position::Positioned(1));
    }

    #[test]
    fn test_bounds_in_both_directions() {
        let tasks: Vec<_> = (0..5).map(|i| task("i", &format!("t{i}"), "A")).collect();
        let mut sequencer = TaskSequencer::new();
        sequencer.initialize(tasks);

        for _ in 0..4 {
            assert!(matches!(sequencer.advance(), Decision::TaskSwitch { .. }));
        }
        assert_eq!(sequencer.position(), Position::Positioned(4));
        assert!(matches!(sequencer.advance(), Decision::Blocked { .. }));
        assert_eq!(sequencer.position(), Position::Positioned(4));

        for _ in 0..4 {
            assert!(matches!(sequencer.retreat(), Decision::TaskSwitch { .. }));
        }
        assert_eq!(
            sequencer.retreat(),
            Decision::Blocked {
                reason: NO_PREVIOUS_TASK.to_string()
            }
        );
        assert_eq!(sequencer.position(), Position::Positioned(0));
    }

    #[test]
    fn test_jump_to_exact_match() {
        let mut sequencer = TaskSequencer::new();
        sequencer.initialize(vec![
            task("i1", "t1", "A"),
            task("i2", "t1", "A"),
            task("i2", "t2", "B"),
        ]);

        let decision = sequencer.jump_to(&TaskRequestDetails {
            item: Some("i2".to_string()),
            task: "t1".to_string(),
            scope: "A".to_string(),
        });
        assert_eq!(
            decision,
            Decision::TaskSwitch {
                next_task: task("i2", "t1", "A"),
                player_id: None,
            }
        );
        assert_eq!(sequencer.position(), Position::Positioned(1));

        let miss = sequencer.jump_to(&TaskRequestDetails {
            item: Some("i1".to_string()),
            task: "t2".to_string(),
            scope: "B".to_string(),
        });
        assert_eq!(
            miss,
            Decision::Blocked {
                reason: "Task t2 in item i1 and in scope B is not part of the assessment configuration."
                    .to_string()
            }
        );
        assert_eq!(sequencer.position(), Position::Positioned(1));
    }

    #[test]
    fn test_jump_to_without_item_matches_first_task_and_scope() {
        let mut sequencer = TaskSequencer::new();
        sequencer.initialize(vec![task("i1", "t1", "A"), task("i2", "t1", "A")]);
        sequencer.advance();

        let decision = sequencer.jump_to(&TaskRequestDetails {
            item: None,
            task: "t1".to_string(),
            scope: "A".to_string(),
        });
        assert!(matches!(
            decision,
            Decision::TaskSwitch { ref next_task, .. } if next_task.item == "i1"
        ));

        let miss = sequencer.jump_to(&TaskRequestDetails {
            item: None,
            task: "t1".to_string(),
            scope: "Z".to_string(),
        });
        assert_eq!(
            miss,
            Decision::Blocked {
                reason: "Task t1 with item unspecified and in scope Z is not part of the assessment configuration."
                    .to_string()
            }
        );
    }

    #[test]
    fn test_initialize_with_empty_list() {
        let mut sequencer = TaskSequencer::new();
        sequencer.initialize(Vec::new());
        assert_eq!(sequencer.position(), Position::Positioned(0));
        assert_eq!(sequencer.first(), None);
        assert!(matches!(sequencer.advance(), Decision::Blocked { .. }));
        assert!(sequencer.current().is_none());
    }

    #[test]
    fn test_reinitialize_replaces_list() {
        let mut sequencer = two_task_sequencer();
        sequencer.advance();
        sequencer.initialize(vec![task("i9", "t9", "A")]);
        assert_eq!(sequencer.position(), Position::Positioned(0));
        assert_eq!(sequencer.current(), Some(&task("i9", "t9", "A")));
        assert_eq!(sequencer.len(), 1);
    }
}

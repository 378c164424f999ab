//! Property-based tests for the task filter.
//!
//! Uses proptest to verify:
//! 1. The result is a subsequence of the collection, in order.
//! 2. Every result case-insensitively contains the filter.
//! 3. The empty filter returns the whole collection.
//! 4. Nothing is dropped that matches.

use proptest::prelude::*;
use taskboard::tasks::filter_tasks;
use taskboard_proto::task::{Priority, Task, TaskId};

/// Strategy for a task collection with position-based ids.
fn arb_tasks() -> impl Strategy<Value = Vec<Task>> {
    prop::collection::vec(("[a-zA-Z ]{0,24}", any::<bool>()), 0..24).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (text, completed))| Task {
                id: TaskId::new(i.to_string()),
                text,
                priority: Priority::Normal,
                completed,
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn result_is_ordered_subset(tasks in arb_tasks(), filter in "[a-zA-Z]{0,3}") {
        let visible = filter_tasks(&tasks, &filter);
        let mut rest = tasks.iter();
        for task in visible {
            prop_assert!(rest.any(|t| t == task), "result out of order or not in collection");
        }
    }

    #[test]
    fn every_result_contains_filter(tasks in arb_tasks(), filter in "[a-zA-Z]{0,3}") {
        let needle = filter.to_lowercase();
        for task in filter_tasks(&tasks, &filter) {
            prop_assert!(task.text.to_lowercase().contains(&needle));
        }
    }

    #[test]
    fn empty_filter_is_identity(tasks in arb_tasks()) {
        let visible: Vec<Task> = filter_tasks(&tasks, "").into_iter().cloned().collect();
        prop_assert_eq!(visible, tasks);
    }

    #[test]
    fn matching_tasks_are_kept(tasks in arb_tasks(), filter in "[a-zA-Z]{0,3}") {
        let needle = filter.to_lowercase();
        let expected = tasks
            .iter()
            .filter(|t| t.text.to_lowercase().contains(&needle))
            .count();
        prop_assert_eq!(filter_tasks(&tasks, &filter).len(), expected);
    }

    #[test]
    fn filter_is_case_insensitive(tasks in arb_tasks(), filter in "[a-zA-Z]{0,3}") {
        prop_assert_eq!(
            filter_tasks(&tasks, &filter.to_uppercase()),
            filter_tasks(&tasks, &filter.to_lowercase())
        );
    }
}

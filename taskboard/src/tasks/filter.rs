//! Case-insensitive text filter over the task collection.

use taskboard_proto::task::Task;

/// Returns the tasks whose text contains `filter`, ignoring case.
///
/// Order is preserved and the collection is never modified. An empty
/// filter returns every task.
#[must_use]
pub fn filter_tasks<'a>(tasks: &'a [Task], filter: &str) -> Vec<&'a Task> {
    let needle = filter.to_lowercase();
    tasks
        .iter()
        .filter(|task| task.text.to_lowercase().contains(&needle))
        .collect()
}

//! Column filtering by tag and due-date bucket, plus sidebar counts.

use crate::dates::DateBucket;
use crate::types::{Tag, TagId, Task, TaskStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Active sidebar selections. Local only, never written to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// Selected tags; a task passes if it carries any of them
    pub tags: BTreeSet<TagId>,
    /// Selected date bucket, at most one at a time
    pub date: Option<DateBucket>,
}

impl FilterState {
    /// Select a tag, or deselect it if already selected
    pub fn toggle_tag(&mut self, tag: TagId) {
        if !self.tags.remove(&tag) {
            self.tags.insert(tag);
        }
    }

    /// Select a date bucket; selecting the active one again clears it
    pub fn toggle_date(&mut self, bucket: DateBucket) {
        self.date = if self.date == Some(bucket) {
            None
        } else {
            Some(bucket)
        };
    }

    pub fn clear(&mut self) {
        self.tags.clear();
        self.date = None;
    }

    pub fn is_active(&self) -> bool {
        !self.tags.is_empty() || self.date.is_some()
    }

    /// Whether a task passes both the tag and the date filter
    pub fn admits(&self, task: &Task, today: NaiveDate) -> bool {
        passes(task, &self.tags, self.date, today)
    }

    /// Visible tasks of a column under these selections
    pub fn visible<'a>(
        &self,
        column: TaskStatus,
        tasks: &'a [Task],
        today: NaiveDate,
    ) -> Vec<&'a Task> {
        visible_tasks(column, tasks, &self.tags, self.date, today)
    }
}

fn passes(
    task: &Task,
    tag_filters: &BTreeSet<TagId>,
    date_filter: Option<DateBucket>,
    today: NaiveDate,
) -> bool {
    let tag_ok = tag_filters.is_empty() || task.has_any_tag(tag_filters);
    let date_ok = date_filter.map_or(true, |bucket| bucket.matches(task.due_date, today));
    tag_ok && date_ok
}

/// Tasks of `column` that pass the tag filter (any selected tag) and the
/// date filter, sorted ascending by order.
pub fn visible_tasks<'a>(
    column: TaskStatus,
    tasks: &'a [Task],
    tag_filters: &BTreeSet<TagId>,
    date_filter: Option<DateBucket>,
    today: NaiveDate,
) -> Vec<&'a Task> {
    let mut visible: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.status == column && passes(t, tag_filters, date_filter, today))
        .collect();
    visible.sort_by(|a, b| a.order.total_cmp(&b.order));
    visible
}

/// Badge counts for the sidebar
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCounts {
    /// Open (not completed) tasks per date bucket
    pub by_date: BTreeMap<DateBucket, usize>,
    /// Tasks in any column carrying each tag
    pub by_tag: BTreeMap<TagId, usize>,
    /// Open tasks in total
    pub open: usize,
}

impl FilterCounts {
    pub fn build(tasks: &[Task], tags: &[Tag], today: NaiveDate) -> Self {
        let open: Vec<&Task> = tasks.iter().filter(|t| !t.is_completed()).collect();

        let by_date = DateBucket::ALL
            .into_iter()
            .map(|bucket| {
                let count = open
                    .iter()
                    .filter(|t| bucket.matches(t.due_date, today))
                    .count();
                (bucket, count)
            })
            .collect();

        let by_tag = tags
            .iter()
            .map(|tag| {
                let count = tasks.iter().filter(|t| t.has_tag(&tag.id)).count();
                (tag.id.clone(), count)
            })
            .collect();

        Self {
            by_date,
            by_tag,
            open: open.len(),
        }
    }

    pub fn date(&self, bucket: DateBucket) -> usize {
        self.by_date.get(&bucket).copied().unwrap_or(0)
    }

    pub fn tag(&self, tag: &TagId) -> usize {
        self.by_tag.get(tag).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewTag, NewTask, TagColor, TaskId};
    use chrono::Utc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
    }

    fn task(id: &str, status: TaskStatus, order: f64, tags: &[&str]) -> Task {
        let fields = NewTask::new(id, status, order).with_tags(tags.iter().map(|t| TagId::from(*t)));
        Task::from_new(TaskId::from_string(id), fields, Utc::now())
    }

    fn due(mut task: Task, y: i32, m: u32, d: u32) -> Task {
        task.due_date = NaiveDate::from_ymd_opt(y, m, d);
        task
    }

    fn tag_set(ids: &[&str]) -> BTreeSet<TagId> {
        ids.iter().map(|t| TagId::from(*t)).collect()
    }

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.to_string()).collect()
    }

    #[test]
    fn test_column_only_sorted_by_order() {
        let tasks = vec![
            task("c", TaskStatus::Todo, 3000.0, &[]),
            task("a", TaskStatus::Todo, 1000.0, &[]),
            task("x", TaskStatus::Completed, 500.0, &[]),
            task("b", TaskStatus::Todo, 2000.0, &[]),
        ];
        let visible = visible_tasks(TaskStatus::Todo, &tasks, &BTreeSet::new(), None, today());
        assert_eq!(ids(&visible), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_tag_filter_is_any_of() {
        let tasks = vec![
            task("has-b", TaskStatus::Todo, 1000.0, &["B"]),
            task("has-c", TaskStatus::Todo, 2000.0, &["C"]),
            task("has-a-c", TaskStatus::Todo, 3000.0, &["A", "C"]),
        ];
        let visible = visible_tasks(
            TaskStatus::Todo,
            &tasks,
            &tag_set(&["A", "B"]),
            None,
            today(),
        );
        assert_eq!(ids(&visible), vec!["has-b", "has-a-c"]);
    }

    #[test]
    fn test_tag_and_date_filters_compose_with_and() {
        let tasks = vec![
            due(task("tagged-today", TaskStatus::Todo, 1000.0, &["A"]), 2025, 6, 10),
            due(task("tagged-later", TaskStatus::Todo, 2000.0, &["A"]), 2025, 7, 1),
            due(task("untagged-today", TaskStatus::Todo, 3000.0, &[]), 2025, 6, 10),
        ];
        let visible = visible_tasks(
            TaskStatus::Todo,
            &tasks,
            &tag_set(&["A"]),
            Some(DateBucket::Today),
            today(),
        );
        assert_eq!(ids(&visible), vec!["tagged-today"]);
    }

    #[test]
    fn test_no_date_filter() {
        let tasks = vec![
            task("undated", TaskStatus::InProgress, 1000.0, &[]),
            due(task("dated", TaskStatus::InProgress, 2000.0, &[]), 2025, 6, 12),
        ];
        let filters = FilterState {
            date: Some(DateBucket::NoDate),
            ..FilterState::default()
        };
        let visible = filters.visible(TaskStatus::InProgress, &tasks, today());
        assert_eq!(ids(&visible), vec!["undated"]);
    }

    #[test]
    fn test_toggles() {
        let mut filters = FilterState::default();
        filters.toggle_tag(TagId::from("A"));
        filters.toggle_date(DateBucket::Overdue);
        assert!(filters.is_active());

        filters.toggle_tag(TagId::from("A"));
        assert!(filters.tags.is_empty());
        filters.toggle_date(DateBucket::Today);
        assert_eq!(filters.date, Some(DateBucket::Today));
        filters.toggle_date(DateBucket::Today);
        assert_eq!(filters.date, None);
        assert!(!filters.is_active());
    }

    #[test]
    fn test_counts_exclude_completed_from_date_buckets() {
        let tasks = vec![
            due(task("open-overdue", TaskStatus::Todo, 1000.0, &["A"]), 2025, 6, 1),
            due(task("done-overdue", TaskStatus::Completed, 1000.0, &["A"]), 2025, 6, 1),
            task("open-undated", TaskStatus::InProgress, 1000.0, &[]),
        ];
        let tags = vec![Tag::from_new(
            TagId::from("A"),
            NewTag::new("A", TagColor::Blue),
            Utc::now(),
        )];
        let counts = FilterCounts::build(&tasks, &tags, today());

        assert_eq!(counts.date(DateBucket::Overdue), 1);
        assert_eq!(counts.date(DateBucket::NoDate), 1);
        assert_eq!(counts.date(DateBucket::Today), 0);
        assert_eq!(counts.tag(&TagId::from("A")), 2);
        assert_eq!(counts.open, 2);
    }
}

//! Progress derivation and status classification.
//!
//! Everything here is pure: callers hand in subtasks or projects and get
//! derived numbers back. `compute_progress` is the only function that turns
//! subtasks into a percentage; `Project` and `ProjectPatch` both route
//! through it.

use serde::Serialize;
use std::fmt;

use crate::model::{Project, Subtask};

/// Upper bound of a progress percentage.
pub const MAX_PROGRESS: u8 = 100;

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// Status bucket of a project, derived from its progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProjectStatus {
    #[serde(rename = "to-do")]
    ToDo,
    #[serde(rename = "in progress")]
    InProgress,
    #[serde(rename = "done")]
    Done,
}

impl ProjectStatus {
    /// Buckets in the order the project list shows them.
    pub const DISPLAY_ORDER: [ProjectStatus; 3] = [
        ProjectStatus::Done,
        ProjectStatus::InProgress,
        ProjectStatus::ToDo,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ProjectStatus::ToDo => "to-do",
            ProjectStatus::InProgress => "in progress",
            ProjectStatus::Done => "done",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// Completion percentage of a subtask list, rounded half-up.
///
/// An empty list counts as a total of one, so it yields `0`.
#[must_use]
pub fn compute_progress(subtasks: &[Subtask]) -> u8 {
    let completed = subtasks.iter().filter(|s| s.is_completed()).count() as u64;
    let total = subtasks.len().max(1) as u64;
    clamp_percent(rounded_ratio(completed * 100, total))
}

/// Classify a progress value: `0` is to-do, `100` is done, anything between is in progress.
#[must_use]
pub fn classify_status(progress: u8) -> ProjectStatus {
    match progress {
        0 => ProjectStatus::ToDo,
        p if p >= MAX_PROGRESS => ProjectStatus::Done,
        _ => ProjectStatus::InProgress,
    }
}

/// `numerator / denominator` rounded half-up. `denominator` must be non-zero.
fn rounded_ratio(numerator: u64, denominator: u64) -> u64 {
    (numerator * 2 + denominator) / (denominator * 2)
}

fn clamp_percent(value: u64) -> u8 {
    u8::try_from(value.min(u64::from(MAX_PROGRESS))).unwrap_or(MAX_PROGRESS)
}

//
// ─── AGGREGATES ────────────────────────────────────────────────────────────────
//

/// Number of projects per status bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub to_do: usize,
    pub in_progress: usize,
    pub done: usize,
}

impl StatusCounts {
    #[must_use]
    pub fn get(&self, status: ProjectStatus) -> usize {
        match status {
            ProjectStatus::ToDo => self.to_do,
            ProjectStatus::InProgress => self.in_progress,
            ProjectStatus::Done => self.done,
        }
    }

    fn increment(&mut self, status: ProjectStatus) {
        match status {
            ProjectStatus::ToDo => self.to_do += 1,
            ProjectStatus::InProgress => self.in_progress += 1,
            ProjectStatus::Done => self.done += 1,
        }
    }
}

/// Dashboard and report statistics over a project collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProjectStats {
    pub total_projects: usize,
    /// Incomplete subtasks across all projects, as shown on the dashboard.
    pub pending_task_count: usize,
    pub completed_subtask_count: usize,
    pub pending_subtask_count: usize,
    pub count_by_status: StatusCounts,
    /// Mean project progress rounded half-up; `0` for no projects.
    pub average_progress: u8,
}

/// Derive all statistics in a single pass.
#[must_use]
pub fn aggregate(projects: &[Project]) -> ProjectStats {
    let mut stats = ProjectStats::default();
    let mut progress_sum: u64 = 0;

    for project in projects {
        let completed = project
            .subtasks()
            .iter()
            .filter(|s| s.is_completed())
            .count();
        let pending = project.subtasks().len() - completed;

        stats.total_projects += 1;
        stats.completed_subtask_count += completed;
        stats.pending_subtask_count += pending;
        stats.count_by_status.increment(project.status());
        progress_sum += u64::from(project.progress());
    }

    stats.pending_task_count = stats.pending_subtask_count;
    if stats.total_projects > 0 {
        stats.average_progress =
            clamp_percent(rounded_ratio(progress_sum, stats.total_projects as u64));
    }
    stats
}

/// Projects partitioned by status bucket.
///
/// A snapshot: it does not follow later edits to the projects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusGroups<'a> {
    pub to_do: Vec<&'a Project>,
    pub in_progress: Vec<&'a Project>,
    pub done: Vec<&'a Project>,
}

impl<'a> StatusGroups<'a> {
    #[must_use]
    pub fn get(&self, status: ProjectStatus) -> &[&'a Project] {
        match status {
            ProjectStatus::ToDo => &self.to_do,
            ProjectStatus::InProgress => &self.in_progress,
            ProjectStatus::Done => &self.done,
        }
    }

    /// Buckets in display order (done, in progress, to-do).
    pub fn iter(&self) -> impl Iterator<Item = (ProjectStatus, &[&'a Project])> + '_ {
        ProjectStatus::DISPLAY_ORDER
            .into_iter()
            .map(move |status| (status, self.get(status)))
    }
}

/// Partition projects into status buckets, keeping relative input order in each.
#[must_use]
pub fn group_by_status(projects: &[Project]) -> StatusGroups<'_> {
    let mut groups = StatusGroups::default();
    for project in projects {
        match project.status() {
            ProjectStatus::ToDo => groups.to_do.push(project),
            ProjectStatus::InProgress => groups.in_progress.push(project),
            ProjectStatus::Done => groups.done.push(project),
        }
    }
    groups
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProjectId, SubtaskId};

    fn subtasks(flags: &[bool]) -> Vec<Subtask> {
        flags
            .iter()
            .enumerate()
            .map(|(i, done)| Subtask::from_persisted(SubtaskId::generate(), format!("t{i}"), *done))
            .collect()
    }

    fn project(id: &str, flags: &[bool]) -> Project {
        Project::from_persisted(
            ProjectId::new(id),
            format!("Project {id}"),
            "2025-05-01".into(),
            subtasks(flags),
            None,
        )
    }

    #[test]
    fn empty_list_has_zero_progress() {
        assert_eq!(compute_progress(&[]), 0);
    }

    #[test]
    fn single_subtask_is_all_or_nothing() {
        assert_eq!(compute_progress(&subtasks(&[true])), 100);
        assert_eq!(compute_progress(&subtasks(&[false])), 0);
    }

    #[test]
    fn two_of_three_rounds_up_to_67() {
        assert_eq!(compute_progress(&subtasks(&[true, false, true])), 67);
    }

    #[test]
    fn one_of_three_rounds_down_to_33() {
        assert_eq!(compute_progress(&subtasks(&[true, false, false])), 33);
    }

    #[test]
    fn exact_half_rounds_up() {
        // 1/8 = 12.5%
        let mut flags = vec![false; 8];
        flags[0] = true;
        assert_eq!(compute_progress(&subtasks(&flags)), 13);
    }

    #[test]
    fn progress_stays_within_bounds() {
        for total in 0..=12 {
            for completed in 0..=total {
                let mut flags = vec![false; total];
                flags.iter_mut().take(completed).for_each(|f| *f = true);
                let p = compute_progress(&subtasks(&flags));
                assert!(p <= MAX_PROGRESS, "{completed}/{total} gave {p}");
                if completed == total && total > 0 {
                    assert_eq!(p, 100);
                }
            }
        }
    }

    #[test]
    fn classify_boundaries() {
        assert_eq!(classify_status(0), ProjectStatus::ToDo);
        assert_eq!(classify_status(100), ProjectStatus::Done);
        for p in 1..100 {
            assert_eq!(classify_status(p), ProjectStatus::InProgress);
        }
    }

    #[test]
    fn aggregate_of_nothing_is_zero() {
        let stats = aggregate(&[]);
        assert_eq!(stats, ProjectStats::default());
        assert_eq!(stats.average_progress, 0);
    }

    #[test]
    fn aggregate_counts_subtasks_and_buckets() {
        let projects = vec![
            project("a", &[true, true]),
            project("b", &[true, false, false, false]),
            project("c", &[]),
            project("d", &[false]),
        ];
        let stats = aggregate(&projects);

        assert_eq!(stats.total_projects, 4);
        assert_eq!(stats.completed_subtask_count, 3);
        assert_eq!(stats.pending_subtask_count, 4);
        assert_eq!(stats.pending_task_count, 4);
        assert_eq!(stats.count_by_status.done, 1);
        assert_eq!(stats.count_by_status.in_progress, 1);
        assert_eq!(stats.count_by_status.to_do, 2);
        // (100 + 25 + 0 + 0) / 4 = 31.25
        assert_eq!(stats.average_progress, 31);
    }

    #[test]
    fn group_preserves_relative_order() {
        let projects = vec![
            project("a", &[false]),
            project("b", &[true]),
            project("c", &[true, false]),
            project("d", &[]),
            project("e", &[true]),
        ];
        let groups = group_by_status(&projects);

        let ids = |bucket: &[&Project]| -> Vec<String> {
            bucket.iter().map(|p| p.id().to_string()).collect()
        };
        assert_eq!(ids(&groups.to_do), vec!["a", "d"]);
        assert_eq!(ids(&groups.in_progress), vec!["c"]);
        assert_eq!(ids(&groups.done), vec!["b", "e"]);

        let order: Vec<ProjectStatus> = groups.iter().map(|(status, _)| status).collect();
        assert_eq!(order, ProjectStatus::DISPLAY_ORDER.to_vec());
    }

    #[test]
    fn status_serializes_with_screen_labels() {
        let json = serde_json::to_string(&ProjectStatus::InProgress).unwrap();
        assert_eq!(json, "\"in progress\"");
        assert_eq!(ProjectStatus::ToDo.to_string(), "to-do");
    }
}

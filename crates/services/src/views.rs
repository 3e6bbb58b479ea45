//! Presentation-agnostic views built from a project snapshot.
//!
//! These are not UI view-models: no pre-formatted strings beyond fixed chart
//! labels, no colours. Each view has a pure `from_projects` constructor so a
//! live subscription can rebuild it from every new snapshot.

use serde::Serialize;

use tracker_core::model::{Project, ProjectId};
use tracker_core::progress::{ProjectStats, ProjectStatus, aggregate, group_by_status};

/// One project row as shown on the dashboard, list, and report screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    pub id: ProjectId,
    pub name: String,
    pub deadline: String,
    pub progress: u8,
    pub status: ProjectStatus,
    pub pending_subtasks: usize,
}

impl ProjectSummary {
    #[must_use]
    pub fn from_project(project: &Project) -> Self {
        Self {
            id: project.id().clone(),
            name: project.name().to_owned(),
            deadline: project.deadline().to_owned(),
            progress: project.progress(),
            status: project.status(),
            pending_subtasks: project
                .subtasks()
                .iter()
                .filter(|s| !s.is_completed())
                .count(),
        }
    }
}

/// Dashboard: headline numbers plus every project with its progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub stats: ProjectStats,
    pub projects: Vec<ProjectSummary>,
}

impl Dashboard {
    #[must_use]
    pub fn from_projects(projects: &[Project]) -> Self {
        Self {
            stats: aggregate(projects),
            projects: projects.iter().map(ProjectSummary::from_project).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardColumn {
    pub status: ProjectStatus,
    pub projects: Vec<ProjectSummary>,
}

/// Project list grouped into done / in progress / to-do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectBoard {
    pub columns: Vec<BoardColumn>,
}

impl ProjectBoard {
    #[must_use]
    pub fn from_projects(projects: &[Project]) -> Self {
        let groups = group_by_status(projects);
        let columns = groups
            .iter()
            .map(|(status, bucket)| BoardColumn {
                status,
                projects: bucket
                    .iter()
                    .map(|project| ProjectSummary::from_project(project))
                    .collect(),
            })
            .collect();
        Self { columns }
    }

    #[must_use]
    pub fn column(&self, status: ProjectStatus) -> Option<&BoardColumn> {
        self.columns.iter().find(|c| c.status == status)
    }
}

/// One pie-chart slice: how many projects sit in a status bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSlice {
    pub label: &'static str,
    pub status: ProjectStatus,
    pub count: usize,
}

/// Progress report: status distribution, subtask totals, and per-project rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressReport {
    pub stats: ProjectStats,
    pub slices: Vec<ChartSlice>,
    pub rows: Vec<ProjectSummary>,
}

impl ProgressReport {
    #[must_use]
    pub fn from_projects(projects: &[Project]) -> Self {
        let stats = aggregate(projects);
        let slices = ProjectStatus::DISPLAY_ORDER
            .into_iter()
            .map(|status| ChartSlice {
                label: slice_label(status),
                status,
                count: stats.count_by_status.get(status),
            })
            .collect();
        Self {
            stats,
            slices,
            rows: projects.iter().map(ProjectSummary::from_project).collect(),
        }
    }
}

fn slice_label(status: ProjectStatus) -> &'static str {
    match status {
        ProjectStatus::Done => "Completed",
        ProjectStatus::InProgress => "In Progress",
        ProjectStatus::ToDo => "To Do",
    }
}

#![forbid(unsafe_code)]

pub mod app_services;
pub mod auth_service;
pub mod dashboard_service;
pub mod error;
pub mod profile_service;
pub mod project_service;
pub mod views;

pub use tracker_core::Clock;

pub use app_services::AppServices;
pub use auth_service::{AuthService, Credentials, IdentityProvider};
pub use dashboard_service::DashboardService;
pub use error::{
    AppServicesError, AuthError, DashboardServiceError, IdentityError, ProfileServiceError,
    ProjectServiceError,
};
pub use profile_service::ProfileService;
pub use project_service::ProjectService;
pub use views::{BoardColumn, ChartSlice, Dashboard, ProgressReport, ProjectBoard, ProjectSummary};

mod ids;
mod profile;
mod project;
mod session;
mod subtask;
mod user;

pub use ids::{ParseIdError, ProjectId, SubtaskId};
pub use profile::{ProfileDraft, ProfileError, ProfileUpdate, UserProfile};
pub use project::{Project, ProjectDraft, ProjectError, ProjectPatch};
pub use session::{Session, SessionState};
pub use subtask::Subtask;
pub use user::{UserKey, UserKeyError};

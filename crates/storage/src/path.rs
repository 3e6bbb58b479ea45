use std::fmt;

use tracker_core::model::{ProjectId, UserKey};

/// Hierarchical address of a record in the store.
///
/// Profiles live at `users/<key>`, projects at `users/<key>/projects/<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorePath(String);

impl StorePath {
    #[must_use]
    pub fn user(key: &UserKey) -> Self {
        Self(format!("users/{key}"))
    }

    #[must_use]
    pub fn projects(key: &UserKey) -> Self {
        Self(format!("users/{key}/projects"))
    }

    #[must_use]
    pub fn project(key: &UserKey, id: &ProjectId) -> Self {
        Self(format!("users/{key}/projects/{id}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_user_and_project_paths() {
        let key = UserKey::from_email("kim@uni.edu").unwrap();
        let id = ProjectId::new("-Nx1");
        assert_eq!(StorePath::user(&key).as_str(), "users/kim_uni_edu");
        assert_eq!(StorePath::projects(&key).as_str(), "users/kim_uni_edu/projects");
        assert_eq!(
            StorePath::project(&key, &id).to_string(),
            "users/kim_uni_edu/projects/-Nx1"
        );
    }
}

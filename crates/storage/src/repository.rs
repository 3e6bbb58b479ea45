use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracker_core::model::{Project, ProjectDraft, ProjectId, ProjectPatch, UserKey, UserProfile};

use crate::feed::{ChangeFeed, ChangeListener};
use crate::path::StorePath;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("already exists")]
    AlreadyExists,

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Project persistence contract, scoped per user.
///
/// Ordering of `list_projects` is backend-defined; only the subtask order
/// inside each project is guaranteed.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Current snapshot of the user's projects.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` if the backend cannot be reached.
    async fn list_projects(&self, user: &UserKey) -> Result<Vec<Project>, StorageError>;

    /// Fetch a single project.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_project(&self, user: &UserKey, id: &ProjectId) -> Result<Project, StorageError>;

    /// Persist a new project and return the id the store assigned.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the project cannot be stored.
    async fn create_project(
        &self,
        user: &UserKey,
        draft: &ProjectDraft,
    ) -> Result<ProjectId, StorageError>;

    /// Merge the fields present in `patch`; subtasks and progress are written together.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the project does not exist.
    async fn update_project(
        &self,
        user: &UserKey,
        id: &ProjectId,
        patch: &ProjectPatch,
    ) -> Result<(), StorageError>;

    /// Remove a project.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the project does not exist.
    async fn delete_project(&self, user: &UserKey, id: &ProjectId) -> Result<(), StorageError>;

    /// Listen for committed writes to the user's projects.
    fn subscribe(&self, user: &UserKey) -> ChangeListener;
}

/// Profile persistence contract.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_profile(&self, user: &UserKey) -> Result<Option<UserProfile>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if a profile is stored under the same key.
    async fn insert_profile(&self, profile: &UserProfile) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no profile is stored under the key.
    async fn update_profile(&self, profile: &UserProfile) -> Result<(), StorageError>;
}

//
// ─── LIVE SNAPSHOTS ────────────────────────────────────────────────────────────
//

/// Live view over a user's projects.
///
/// Each `next` waits for a committed write and yields a fresh snapshot.
pub struct ProjectSubscription {
    store: Arc<dyn ProjectStore>,
    user: UserKey,
    listener: Option<ChangeListener>,
}

impl ProjectSubscription {
    #[must_use]
    pub fn new(store: Arc<dyn ProjectStore>, user: UserKey) -> Self {
        let listener = store.subscribe(&user);
        Self {
            store,
            user,
            listener: Some(listener),
        }
    }

    /// Wait for the next change and load the resulting snapshot.
    ///
    /// Returns `None` after `cancel`, or once the backing store is gone.
    pub async fn next(&mut self) -> Option<Result<Vec<Project>, StorageError>> {
        let listener = self.listener.as_mut()?;
        if !listener.changed().await {
            self.listener = None;
            return None;
        }
        Some(self.store.list_projects(&self.user).await)
    }

    /// Stop delivery. Subsequent `next` calls return `None` immediately.
    pub fn cancel(&mut self) {
        if self.listener.take().is_some() {
            debug!(
                "event=subscription_cancel module=storage path={}",
                StorePath::projects(&self.user)
            );
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.listener.is_some()
    }
}

/// Load the user's projects and keep listening for changes.
///
/// The subscription is registered before the snapshot is read, so a write
/// racing with the initial load is never missed.
///
/// # Errors
///
/// Returns `StorageError` if the initial snapshot cannot be loaded.
pub async fn load_all(
    store: &Arc<dyn ProjectStore>,
    user: &UserKey,
) -> Result<(Vec<Project>, ProjectSubscription), StorageError> {
    let subscription = ProjectSubscription::new(Arc::clone(store), user.clone());
    let projects = store.list_projects(user).await?;
    Ok((projects, subscription))
}

//
// ─── IN-MEMORY BACKEND ─────────────────────────────────────────────────────────
//

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Projects keep their insertion order per user.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    projects: Arc<Mutex<HashMap<UserKey, Vec<Project>>>>,
    profiles: Arc<Mutex<HashMap<UserKey, UserProfile>>>,
    offline: Arc<AtomicBool>,
    feed: ChangeFeed,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a backend outage: while offline every call fails with `Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), StorageError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("in-memory store is offline".into()));
        }
        Ok(())
    }
}

fn lock_error<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Unavailable(e.to_string())
}

#[async_trait]
impl ProjectStore for InMemoryRepository {
    async fn list_projects(&self, user: &UserKey) -> Result<Vec<Project>, StorageError> {
        self.check_online()?;
        let guard = self.projects.lock().map_err(lock_error)?;
        Ok(guard.get(user).cloned().unwrap_or_default())
    }

    async fn get_project(&self, user: &UserKey, id: &ProjectId) -> Result<Project, StorageError> {
        self.check_online()?;
        let guard = self.projects.lock().map_err(lock_error)?;
        guard
            .get(user)
            .and_then(|projects| projects.iter().find(|p| p.id() == id))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn create_project(
        &self,
        user: &UserKey,
        draft: &ProjectDraft,
    ) -> Result<ProjectId, StorageError> {
        self.check_online()?;
        let id = ProjectId::generate();
        {
            let mut guard = self.projects.lock().map_err(lock_error)?;
            guard
                .entry(user.clone())
                .or_default()
                .push(draft.clone().assign_id(id.clone()));
        }
        debug!(
            "event=project_create module=storage backend=memory path={}",
            StorePath::project(user, &id)
        );
        self.feed.notify(user);
        Ok(id)
    }

    async fn update_project(
        &self,
        user: &UserKey,
        id: &ProjectId,
        patch: &ProjectPatch,
    ) -> Result<(), StorageError> {
        self.check_online()?;
        {
            let mut guard = self.projects.lock().map_err(lock_error)?;
            let project = guard
                .get_mut(user)
                .and_then(|projects| projects.iter_mut().find(|p| p.id() == id))
                .ok_or(StorageError::NotFound)?;
            project.apply(patch);
        }
        debug!(
            "event=project_update module=storage backend=memory path={}",
            StorePath::project(user, id)
        );
        self.feed.notify(user);
        Ok(())
    }

    async fn delete_project(&self, user: &UserKey, id: &ProjectId) -> Result<(), StorageError> {
        self.check_online()?;
        {
            let mut guard = self.projects.lock().map_err(lock_error)?;
            let projects = guard.get_mut(user).ok_or(StorageError::NotFound)?;
            let index = projects
                .iter()
                .position(|p| p.id() == id)
                .ok_or(StorageError::NotFound)?;
            projects.remove(index);
        }
        debug!(
            "event=project_delete module=storage backend=memory path={}",
            StorePath::project(user, id)
        );
        self.feed.notify(user);
        Ok(())
    }

    fn subscribe(&self, user: &UserKey) -> ChangeListener {
        self.feed.subscribe(user)
    }
}

#[async_trait]
impl ProfileRepository for InMemoryRepository {
    async fn get_profile(&self, user: &UserKey) -> Result<Option<UserProfile>, StorageError> {
        self.check_online()?;
        let guard = self.profiles.lock().map_err(lock_error)?;
        Ok(guard.get(user).cloned())
    }

    async fn insert_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        self.check_online()?;
        let mut guard = self.profiles.lock().map_err(lock_error)?;
        if guard.contains_key(profile.key()) {
            return Err(StorageError::AlreadyExists);
        }
        guard.insert(profile.key().clone(), profile.clone());
        Ok(())
    }

    async fn update_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        self.check_online()?;
        let mut guard = self.profiles.lock().map_err(lock_error)?;
        let slot = guard.get_mut(profile.key()).ok_or(StorageError::NotFound)?;
        *slot = profile.clone();
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub projects: Arc<dyn ProjectStore>,
    pub profiles: Arc<dyn ProfileRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_in_memory(InMemoryRepository::new())
    }

    /// Wrap an existing in-memory repository, keeping a handle for tests.
    #[must_use]
    pub fn from_in_memory(repo: InMemoryRepository) -> Self {
        let projects: Arc<dyn ProjectStore> = Arc::new(repo.clone());
        let profiles: Arc<dyn ProfileRepository> = Arc::new(repo);
        Self { projects, profiles }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tracker_core::model::{ProfileDraft, Subtask};
    use tracker_core::time::fixed_now;

    fn user() -> UserKey {
        UserKey::from_email("lee@campus.edu").unwrap()
    }

    fn draft(name: &str) -> ProjectDraft {
        ProjectDraft::new(name, "2025-05-01").unwrap()
    }

    #[tokio::test]
    async fn create_assigns_id_and_lists_in_insertion_order() {
        let repo = InMemoryRepository::new();
        let a = repo.create_project(&user(), &draft("A")).await.unwrap();
        let b = repo.create_project(&user(), &draft("B")).await.unwrap();
        assert_ne!(a, b);

        let listed = repo.list_projects(&user()).await.unwrap();
        let names: Vec<&str> = listed.iter().map(Project::name).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(listed[0].progress(), 0);
    }

    #[tokio::test]
    async fn update_merges_only_given_fields() {
        let repo = InMemoryRepository::new();
        let id = repo.create_project(&user(), &draft("Essay")).await.unwrap();

        let mut subtask = vec![Subtask::new("Outline").unwrap()];
        subtask = tracker_core::subtasks::toggle_subtask(&subtask, 0).unwrap();
        let patch = ProjectPatch::new().with_subtasks(subtask);
        repo.update_project(&user(), &id, &patch).await.unwrap();

        let project = repo.get_project(&user(), &id).await.unwrap();
        assert_eq!(project.name(), "Essay");
        assert_eq!(project.deadline(), "2025-05-01");
        assert_eq!(project.progress(), 100);
    }

    #[tokio::test]
    async fn missing_project_is_not_found() {
        let repo = InMemoryRepository::new();
        let id = ProjectId::new("ghost");
        let patch = ProjectPatch::new().with_deadline("x");
        assert!(matches!(
            repo.update_project(&user(), &id, &patch).await,
            Err(StorageError::NotFound)
        ));
        assert!(matches!(
            repo.delete_project(&user(), &id).await,
            Err(StorageError::NotFound)
        ));
        assert!(matches!(
            repo.get_project(&user(), &id).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn deleted_project_disappears_from_snapshots() {
        let repo = InMemoryRepository::new();
        let id = repo.create_project(&user(), &draft("Gone")).await.unwrap();
        repo.delete_project(&user(), &id).await.unwrap();
        assert!(repo.list_projects(&user()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn offline_store_reports_unavailable() {
        let repo = InMemoryRepository::new();
        repo.set_offline(true);
        assert!(matches!(
            repo.list_projects(&user()).await,
            Err(StorageError::Unavailable(_))
        ));
        repo.set_offline(false);
        assert!(repo.list_projects(&user()).await.is_ok());
    }

    #[tokio::test]
    async fn subscription_delivers_snapshots_until_cancelled() {
        let store: Arc<dyn ProjectStore> = Arc::new(InMemoryRepository::new());
        let (initial, mut subscription) = load_all(&store, &user()).await.unwrap();
        assert!(initial.is_empty());

        store.create_project(&user(), &draft("Live")).await.unwrap();
        let snapshot = subscription.next().await.unwrap().unwrap();
        assert_eq!(snapshot.len(), 1);

        subscription.cancel();
        assert!(!subscription.is_active());
        store.create_project(&user(), &draft("Unseen")).await.unwrap();
        let after = tokio::time::timeout(Duration::from_millis(50), subscription.next())
            .await
            .expect("cancelled subscription returns immediately");
        assert!(after.is_none());
    }

    #[tokio::test]
    async fn profile_insert_rejects_duplicates() {
        let repo = InMemoryRepository::new();
        let profile = ProfileDraft {
            email: "lee@campus.edu".into(),
            first_name: "Lee".into(),
            last_name: "Cruz".into(),
        }
        .validate(fixed_now())
        .unwrap();

        repo.insert_profile(&profile).await.unwrap();
        assert!(matches!(
            repo.insert_profile(&profile).await,
            Err(StorageError::AlreadyExists)
        ));
        let fetched = repo.get_profile(&user()).await.unwrap().unwrap();
        assert_eq!(fetched.first_name(), "Lee");
    }
}

use std::sync::Arc;
use std::time::Duration;

use storage::repository::{ProfileRepository, ProjectStore, StorageError, load_all};
use storage::sqlite::SqliteRepository;
use tracker_core::model::{ProfileDraft, ProfileUpdate, ProjectDraft, ProjectPatch, Subtask, UserKey};
use tracker_core::progress::ProjectStatus;
use tracker_core::subtasks::{add_subtask, toggle_subtask};
use tracker_core::time::fixed_now;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn user() -> UserKey {
    UserKey::from_email("mika@uni.edu.ph").unwrap()
}

#[tokio::test]
async fn sqlite_roundtrip_keeps_subtask_order_and_progress() {
    let repo = connect("memdb_roundtrip").await;

    let subtasks = vec![
        Subtask::new("Draft").unwrap(),
        Subtask::new("Review").unwrap(),
        Subtask::new("Submit").unwrap(),
    ];
    let subtasks = toggle_subtask(&subtasks, 0).unwrap();
    let subtasks = toggle_subtask(&subtasks, 2).unwrap();
    let draft = ProjectDraft::new("GEFIL02 Paper", "2025-04-28")
        .unwrap()
        .with_subtasks(subtasks.clone());

    let id = repo.create_project(&user(), &draft).await.unwrap();
    let fetched = repo.get_project(&user(), &id).await.unwrap();

    assert_eq!(fetched.name(), "GEFIL02 Paper");
    assert_eq!(fetched.subtasks(), subtasks.as_slice());
    assert_eq!(fetched.progress(), 67);
    assert_eq!(fetched.status(), ProjectStatus::InProgress);
}

#[tokio::test]
async fn sqlite_partial_update_leaves_other_fields() {
    let repo = connect("memdb_partial_update").await;
    let draft = ProjectDraft::new("CSPL System", "2025-05-01")
        .unwrap()
        .with_subtasks(vec![Subtask::new("ERD").unwrap()]);
    let id = repo.create_project(&user(), &draft).await.unwrap();

    let patch = ProjectPatch::new().with_name("CSPL Final System").unwrap();
    repo.update_project(&user(), &id, &patch).await.unwrap();

    let project = repo.get_project(&user(), &id).await.unwrap();
    assert_eq!(project.name(), "CSPL Final System");
    assert_eq!(project.deadline(), "2025-05-01");
    assert_eq!(project.subtasks().len(), 1);

    let subtasks = add_subtask(project.subtasks(), "Deploy").unwrap();
    let subtasks = toggle_subtask(&subtasks, 1).unwrap();
    repo.update_project(&user(), &id, &ProjectPatch::new().with_subtasks(subtasks))
        .await
        .unwrap();

    let project = repo.get_project(&user(), &id).await.unwrap();
    assert_eq!(project.subtasks()[1].name(), "Deploy");
    assert_eq!(project.progress(), 50);
    assert_eq!(project.name(), "CSPL Final System");
}

#[tokio::test]
async fn sqlite_delete_cascades_and_reports_missing() {
    let repo = connect("memdb_delete").await;
    let draft = ProjectDraft::new("ITECC06", "2025-05-10")
        .unwrap()
        .with_subtasks(vec![Subtask::new("Docs").unwrap()]);
    let id = repo.create_project(&user(), &draft).await.unwrap();

    repo.delete_project(&user(), &id).await.unwrap();
    assert!(repo.list_projects(&user()).await.unwrap().is_empty());
    assert!(matches!(
        repo.delete_project(&user(), &id).await,
        Err(StorageError::NotFound)
    ));
    assert!(matches!(
        repo.update_project(&user(), &id, &ProjectPatch::new().with_deadline("x"))
            .await,
        Err(StorageError::NotFound)
    ));

    let (orphans,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM subtasks")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(orphans, 0);
}

#[tokio::test]
async fn sqlite_projects_are_scoped_per_user() {
    let repo = connect("memdb_scoped").await;
    let other = UserKey::from_email("someone@else.com").unwrap();

    repo.create_project(&user(), &ProjectDraft::new("Mine", "").unwrap())
        .await
        .unwrap();
    repo.create_project(&other, &ProjectDraft::new("Theirs", "").unwrap())
        .await
        .unwrap();

    let mine = repo.list_projects(&user()).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].name(), "Mine");
}

#[tokio::test]
async fn sqlite_subscription_sees_committed_writes() {
    let store: Arc<dyn ProjectStore> = Arc::new(connect("memdb_subscribe").await);
    let (initial, mut subscription) = load_all(&store, &user()).await.unwrap();
    assert!(initial.is_empty());

    store
        .create_project(&user(), &ProjectDraft::new("Live", "").unwrap())
        .await
        .unwrap();
    let snapshot = tokio::time::timeout(Duration::from_secs(2), subscription.next())
        .await
        .expect("snapshot delivered")
        .expect("subscription active")
        .expect("snapshot loaded");
    assert_eq!(snapshot.len(), 1);

    subscription.cancel();
    assert!(subscription.next().await.is_none());
}

#[tokio::test]
async fn sqlite_profiles_insert_update() {
    let repo = connect("memdb_profiles").await;
    let profile = ProfileDraft {
        email: "mika@uni.edu.ph".into(),
        first_name: "Mika".into(),
        last_name: "Santos".into(),
    }
    .validate(fixed_now())
    .unwrap();

    repo.insert_profile(&profile).await.unwrap();
    assert!(matches!(
        repo.insert_profile(&profile).await,
        Err(StorageError::AlreadyExists)
    ));

    let updated = profile
        .apply(ProfileUpdate {
            first_name: None,
            last_name: Some("Santos-Cruz".into()),
        })
        .unwrap();
    repo.update_profile(&updated).await.unwrap();

    let fetched = repo.get_profile(&user()).await.unwrap().unwrap();
    assert_eq!(fetched.last_name(), "Santos-Cruz");
    assert_eq!(fetched.created_at(), fixed_now());
    assert!(
        repo.get_profile(&UserKey::from_email("nobody@x.io").unwrap())
            .await
            .unwrap()
            .is_none()
    );
}

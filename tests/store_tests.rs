use ssh_manager::domain::search;
use ssh_manager::{
    CommandBuilder, DomainError, EventBus, NewProfile, Profile, ProfileRepository, ProfileStore, UsageTracker,
};
use std::sync::Arc;
use tempfile::TempDir;

async fn store(temp: &TempDir) -> ProfileStore {
    ProfileStore::load(temp.path().join("profiles.json")).await.unwrap()
}

fn full_fields() -> NewProfile {
    NewProfile::new("api", "api.example.com", "dev")
        .port(2222)
        .private_key("~/.ssh/id")
        .jump_host("ops@bastion.example.com:2200")
        .description("Internal API")
        .tag("backend")
}

#[tokio::test]
async fn test_add_then_get_keeps_every_field() {
    let temp = TempDir::new().unwrap();
    let store = store(&temp).await;

    store.add(full_fields()).await.unwrap();
    let profile = store.get("api").await.unwrap();

    assert!(!profile.id.is_empty());
    assert_eq!(profile.host, "api.example.com");
    assert_eq!(profile.username, "dev");
    assert_eq!(profile.port, 2222);
    assert_eq!(profile.private_key_path.as_deref(), Some("~/.ssh/id"));
    assert_eq!(profile.jump_host.as_deref(), Some("ops@bastion.example.com:2200"));
    assert_eq!(profile.description.as_deref(), Some("Internal API"));
    assert!(profile.has_tag("backend"));
    assert_eq!(profile.last_used, None);
    assert_eq!(profile.use_count, 0);
}

#[tokio::test]
async fn test_duplicate_add_leaves_store_unchanged() {
    let temp = TempDir::new().unwrap();
    let store = store(&temp).await;
    store.add(full_fields()).await.unwrap();
    let before = store.list().await.unwrap();
    let file_before = std::fs::read(store.path()).unwrap();

    let result = store.add(NewProfile::new("api", "other.example.com", "root")).await;

    assert!(matches!(result, Err(DomainError::DuplicateName(name)) if name == "api"));
    assert_eq!(store.list().await.unwrap(), before);
    assert_eq!(std::fs::read(store.path()).unwrap(), file_before);
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let temp = TempDir::new().unwrap();
    let store = store(&temp).await;
    store.add(full_fields()).await.unwrap();
    store.add(NewProfile::new("web", "example.com", "deploy")).await.unwrap();

    store.delete("api").await.unwrap();

    assert!(matches!(store.get("api").await, Err(DomainError::NotFound(_))));
    assert_eq!(store.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_save_then_load_round_trip() {
    let temp = TempDir::new().unwrap();
    let store = store(&temp).await;
    store.add(full_fields()).await.unwrap();
    store.add(NewProfile::new("web", "example.com", "deploy")).await.unwrap();
    store.add(NewProfile::new("db", "10.0.0.5", "postgres")).await.unwrap();
    store.mark_used("web", chrono::Utc::now()).await.unwrap();
    store.save().await.unwrap();

    let reloaded = ProfileStore::load(store.path()).await.unwrap();

    assert_eq!(reloaded.list().await.unwrap(), store.list().await.unwrap());
}

#[tokio::test]
async fn test_ids_are_never_reused() {
    let temp = TempDir::new().unwrap();
    let store = store(&temp).await;
    let first = store.add(NewProfile::new("web", "example.com", "deploy")).await.unwrap();
    store.delete("web").await.unwrap();

    let second = store.add(NewProfile::new("web", "example.com", "deploy")).await.unwrap();

    assert_ne!(first.id, second.id);
}

#[tokio::test]
async fn test_record_use_counts_every_call() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(store(&temp).await);
    store.add(full_fields()).await.unwrap();
    let tracker = UsageTracker::new(store.clone(), Arc::new(EventBus::new()));

    let first = tracker.record_use("api").await.unwrap();
    let second = tracker.record_use("api").await.unwrap();

    assert_eq!(first.use_count, 1);
    assert_eq!(second.use_count, 2);
    assert!(second.last_used.is_some());
    assert_eq!(ProfileStore::load(store.path()).await.unwrap().get("api").await.unwrap().use_count, 2);
}

#[tokio::test]
async fn test_command_for_key_without_jump_host() {
    let temp = TempDir::new().unwrap();
    let store = store(&temp).await;
    let profile = store
        .add(NewProfile::new("api", "api.example.com", "dev").port(2222).private_key("~/.ssh/id"))
        .await
        .unwrap();

    let args = CommandBuilder::default().build(&profile).unwrap();

    assert_eq!(args, ["-p", "2222", "-i", "~/.ssh/id", "dev@api.example.com"]);
}

#[tokio::test]
async fn test_search_prod() {
    let temp = TempDir::new().unwrap();
    let store = store(&temp).await;
    store
        .add(NewProfile::new("production-web", "web1.example.com", "deploy").tag("production"))
        .await
        .unwrap();
    store.add(NewProfile::new("dev-api", "api.dev.local", "dev")).await.unwrap();

    let profiles = store.list().await.unwrap();
    let found: Vec<&Profile> = search::search(&profiles, "prod", &[]).collect();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "production-web");
}

#[tokio::test]
async fn test_duplicate_names_on_disk_are_corrupt() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("profiles.json");
    let record = |id: &str| {
        format!(
            r#"{{"id": "{}", "name": "web", "host": "h", "username": "u", "port": 22,
                "private_key_path": null, "jump_host": null, "description": null, "tags": [],
                "created_at": "2024-01-01T00:00:00Z", "last_used": null, "use_count": 0}}"#,
            id
        )
    };
    std::fs::write(&path, format!(r#"{{"version": "2.0", "profiles": [{}, {}]}}"#, record("1"), record("2"))).unwrap();

    let result = ProfileStore::load(&path).await;

    match result {
        Err(DomainError::CorruptConfig { message, .. }) => assert!(message.contains("duplicate name 'web'")),
        Err(other) => panic!("expected CorruptConfig, got {:?}", other),
        Ok(_) => panic!("expected CorruptConfig, got a store"),
    }
}

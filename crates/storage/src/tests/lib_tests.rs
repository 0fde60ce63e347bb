use super::*;

fn database_url_in(dir: &Path, name: &str) -> String {
    format!("sqlite://{}", dir.join(name).display())
}

#[tokio::test]
async fn setting_round_trips_and_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let database_url = database_url_in(dir.path(), "settings.sqlite3");

    let storage = Storage::new(&database_url).await.expect("open storage");
    storage.health_check().await.expect("healthy");
    storage
        .save_setting("search", "React")
        .await
        .expect("save setting");

    drop(storage);

    let reopened = Storage::new(&database_url).await.expect("reopen storage");
    let value = reopened.load_setting("search").await.expect("load setting");
    assert_eq!(value.as_deref(), Some("React"));
}

#[tokio::test]
async fn missing_setting_loads_as_none() {
    let dir = tempfile::tempdir().expect("tempdir");
    let storage = Storage::new(&database_url_in(dir.path(), "empty.sqlite3"))
        .await
        .expect("open storage");

    let value = storage.load_setting("search").await.expect("load setting");
    assert_eq!(value, None);
}

#[tokio::test]
async fn save_setting_overwrites_previous_value() {
    let dir = tempfile::tempdir().expect("tempdir");
    let storage = Storage::new(&database_url_in(dir.path(), "overwrite.sqlite3"))
        .await
        .expect("open storage");

    storage.save_setting("search", "React").await.expect("first save");
    storage
        .save_setting("search", "JavaScript")
        .await
        .expect("second save");

    let value = storage.load_setting("search").await.expect("load setting");
    assert_eq!(value.as_deref(), Some("JavaScript"));
}

#[tokio::test]
async fn creates_parent_directory_for_nested_database_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let nested = dir.path().join("data").join("client");
    let database_url = database_url_in(&nested, "settings.sqlite3");

    let storage = Storage::new(&database_url).await.expect("open storage");
    storage.save_setting("search", "Rust").await.expect("save setting");

    assert!(nested.exists());
}

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ragchat::api::HttpBackend;
use ragchat::config::ServerConfig;
use ragchat::controller::{ControllerOptions, SessionController};
use ragchat::view::RecordingPresenter;
use serde_json::{json, Value};
use tempfile::TempDir;

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Session object as the backend serializes it
#[allow(dead_code)]
pub fn session_json(id: &str, name: &str, message_count: u64) -> Value {
    json!({
        "id": id,
        "name": name,
        "message_count": message_count,
        "created_at": "2024-05-01T08:00:00Z",
        "updated_at": "2024-05-01T09:30:00Z",
    })
}

#[allow(dead_code)]
pub fn http_backend(base_url: &str) -> HttpBackend {
    HttpBackend::new(&ServerConfig {
        base_url: base_url.to_string(),
        timeout_seconds: Some(5),
    })
    .expect("valid backend config")
}

/// Controller over HTTP that reveals answers without pacing
#[allow(dead_code)]
pub fn http_controller(base_url: &str) -> (SessionController, Arc<RecordingPresenter>) {
    let presenter = Arc::new(RecordingPresenter::new());
    let options = ControllerOptions {
        reveal_interval: Duration::ZERO,
        ..ControllerOptions::default()
    };
    let controller =
        SessionController::new(Arc::new(http_backend(base_url)), presenter.clone(), options);
    (controller, presenter)
}

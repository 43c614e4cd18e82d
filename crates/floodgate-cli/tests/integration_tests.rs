//! Integration tests for CLI commands, run against a wiremock Gate

use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Output;
use tempfile::TempDir;
use tokio::process::Command;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to run the floodgate binary
async fn floodgate(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_floodgate"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .await
        .expect("Failed to execute floodgate")
}

/// Config and resources directory pointing at `server`
fn workspace(server: &MockServer) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let resources = dir.path().join("resources");
    fs::create_dir_all(&resources).unwrap();
    fs::write(resources.join("app.yaml"), "name: shop\n").unwrap();
    fs::write(
        resources.join("pipelines.json"),
        r#"[{"name": "deploy-staging", "application": "shop", "id": "abc123"}]"#,
    )
    .unwrap();

    let config = dir.path().join("config.yaml");
    fs::write(
        &config,
        format!("endpoint: {}\nresources:\n  - resources\n", server.uri()),
    )
    .unwrap();
    (dir, config)
}

async fn gate_with_app() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/applications/shop"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"name": "shop", "attributes": {"name": "shop"}})),
        )
        .mount(&server)
        .await;
    server
}

mod compare_command {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_compare_in_sync() {
        let server = gate_with_app().await;
        Mock::given(method("GET"))
            .and(path("/applications/shop/pipelineConfigs/deploy-staging"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "abc123", "application": "shop", "name": "deploy-staging"
            })))
            .mount(&server)
            .await;

        let (_dir, config) = workspace(&server);
        let output = floodgate(&config, &["compare"]).await;

        assert!(output.status.success(), "Expected success when in sync");
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("in sync"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_compare_json_reports_drift() {
        let server = gate_with_app().await;
        Mock::given(method("GET"))
            .and(path("/applications/shop/pipelineConfigs/deploy-staging"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "abc123", "application": "shop", "name": "deploy-staging", "stages": []
            })))
            .mount(&server)
            .await;

        let (_dir, config) = workspace(&server);
        let output = floodgate(&config, &["compare", "--json"]).await;

        assert_eq!(output.status.code(), Some(1));
        let stdout = String::from_utf8_lossy(&output.stdout);
        let changes: serde_json::Value =
            serde_json::from_str(&stdout).expect("Output should be valid JSON");
        let changes = changes.as_array().unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0]["type"], "pipeline");
        assert_eq!(changes[0]["id"], "abc123");
        assert_eq!(changes[0]["name"], "deploy-staging");
        assert!(changes[0]["changes"].as_str().unwrap().contains("stages"));

        // drift is signalled by the exit code alone
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(!stderr.contains("out of sync with Gate"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_compare_fetch_failure() {
        let server = gate_with_app().await;
        Mock::given(method("GET"))
            .and(path("/applications/shop/pipelineConfigs/deploy-staging"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (_dir, config) = workspace(&server);
        let output = floodgate(&config, &["compare"]).await;

        assert_eq!(output.status.code(), Some(5));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("shop/deploy-staging"));
    }
}

mod sync_command {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_sync_pushes_missing_pipeline() {
        let server = gate_with_app().await;
        Mock::given(method("GET"))
            .and(path("/applications/shop/pipelineConfigs/deploy-staging"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/pipelines"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let (_dir, config) = workspace(&server);
        let output = floodgate(&config, &["sync"]).await;

        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("1 synced, 1 up to date"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_sync_failure_exit_code() {
        let server = gate_with_app().await;
        Mock::given(method("GET"))
            .and(path("/applications/shop/pipelineConfigs/deploy-staging"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/pipelines"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let (_dir, config) = workspace(&server);
        let output = floodgate(&config, &["sync"]).await;

        assert_eq!(output.status.code(), Some(6));
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("1 failed"));
        assert!(stdout.contains("pipeline shop/deploy-staging"));
    }
}

mod inspect_command {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_inspect_single_kind() {
        let server = gate_with_app().await;
        Mock::given(method("GET"))
            .and(path("/applications/shop/pipelineConfigs/deploy-staging"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let (_dir, config) = workspace(&server);
        let output = floodgate(&config, &["inspect", "--kind", "application"]).await;

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert_eq!(stdout.trim_end(), r#"{"name":"shop"}"#);
    }
}

mod config_errors {
    use super::*;

    #[tokio::test]
    async fn test_missing_config() {
        let dir = TempDir::new().unwrap();
        let output = floodgate(&dir.path().join("missing.yaml"), &["compare"]).await;

        assert_eq!(output.status.code(), Some(3));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("not found"));
    }

    #[tokio::test]
    async fn test_invalid_endpoint() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("config.yaml");
        fs::create_dir_all(dir.path().join("resources")).unwrap();
        fs::write(&config, "endpoint: gate.local\nresources:\n  - resources\n").unwrap();

        let output = floodgate(&config, &["sync"]).await;
        assert_eq!(output.status.code(), Some(3));
    }
}

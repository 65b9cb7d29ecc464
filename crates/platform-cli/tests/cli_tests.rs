//! Integration tests for CLI commands

use std::path::Path;
use std::process::{Command, Output};

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to run the platform-provider binary with a clean environment
fn provider_cmd(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_platform-provider"))
        .args(args)
        .env_remove("PLATFORM_URL")
        .env_remove("PLATFORM_ACCESS_TOKEN")
        .env_remove("PLATFORM_ACCESS_VERSION")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute platform-provider")
}

/// Run the binary off the async test runtime
async fn provider_cmd_async(args: Vec<String>) -> Output {
    tokio::task::spawn_blocking(move || {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        provider_cmd(&args)
    })
    .await
    .unwrap()
}

fn write_json(dir: &TempDir, name: &str, value: serde_json::Value) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, value.to_string()).unwrap();
    path.to_string_lossy().to_string()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

mod offline_commands {
    use super::*;

    #[test]
    fn test_types_json() {
        let output = provider_cmd(&["types", "--json"]);
        assert!(output.status.success());

        let names: Vec<String> = serde_json::from_str(&stdout(&output)).unwrap();
        assert_eq!(names, vec!["platform_lifecycle_stage", "platform_lifecycle"]);
    }

    #[test]
    fn test_types_human() {
        let output = provider_cmd(&["types"]);
        assert!(output.status.success());
        insta::assert_snapshot!(stdout(&output).trim_end(), @r"
        • platform_lifecycle_stage
        • platform_lifecycle
        ");
    }

    #[test]
    fn test_schema_lists_attributes() {
        let output = provider_cmd(&["schema", "platform_lifecycle"]);
        assert!(output.status.success());

        let schema: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        let promote = &schema["attributes"]["promote_stages"];
        assert_eq!(promote["type"], "list(string)");
        assert_eq!(promote["required"], true);
        assert_eq!(schema["attributes"]["categories"]["computed"], true);
    }

    #[test]
    fn test_unknown_type_suggests() {
        let output = provider_cmd(&["schema", "platform_lifecycl"]);
        assert_eq!(output.status.code(), Some(2));
        assert!(stderr(&output).contains("did you mean"));
    }

    #[test]
    fn test_validate_reserved_stage_name() {
        let dir = TempDir::new().unwrap();
        let config = write_json(&dir, "lifecycle.json", json!({"promote_stages": ["QA", "prod"]}));

        let output = provider_cmd(&[
            "validate",
            "platform_lifecycle",
            &config,
            "--access-version",
            "7.125.0",
        ]);

        assert_eq!(output.status.code(), Some(2));
        let out = stdout(&output);
        assert!(out.contains("promote_stages[1]"), "{out}");
        assert!(out.contains("'prod'"), "{out}");
    }

    #[test]
    fn test_validate_valid_stage() {
        let dir = TempDir::new().unwrap();
        let config = write_json(
            &dir,
            "stage.json",
            json!({"name": "bookverse-qa", "project_key": "bookverse"}),
        );

        let output = provider_cmd(&[
            "validate",
            "platform_lifecycle_stage",
            &config,
            "--access-version",
            "7.125.0",
        ]);

        assert!(output.status.success(), "{}", stderr(&output));
        assert!(stdout(&output).contains("Configuration is valid"));
    }

    #[test]
    fn test_validate_json_output() {
        let dir = TempDir::new().unwrap();
        let config = write_json(&dir, "stage.json", json!({"name": "deploy", "project_key": "bookverse"}));

        let output = provider_cmd(&[
            "validate",
            "platform_lifecycle_stage",
            &config,
            "--access-version",
            "7.125.0",
            "--json",
        ]);

        assert_eq!(output.status.code(), Some(2));
        let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert_eq!(report["valid"], false);
        assert_eq!(report["diagnostics"][0]["path"], json!([{"attribute": "name"}]));
    }

    #[test]
    fn test_validate_old_access_version() {
        let dir = TempDir::new().unwrap();
        let config = write_json(&dir, "lifecycle.json", json!({"promote_stages": []}));

        let output = provider_cmd(&[
            "validate",
            "platform_lifecycle",
            &config,
            "--access-version",
            "7.84.3",
        ]);

        assert_eq!(output.status.code(), Some(2));
        assert!(stdout(&output).contains("Unsupported platform version"));
    }

    #[test]
    fn test_plan_create() {
        let dir = TempDir::new().unwrap();
        let config = write_json(&dir, "stage.json", json!({"name": "deploy"}));

        let output = provider_cmd(&[
            "plan",
            "platform_lifecycle_stage",
            &config,
            "--access-version",
            "7.125.0",
            "--json",
        ]);

        assert!(output.status.success(), "{}", stderr(&output));
        let plan: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert_eq!(plan["action"], "create");
        assert_eq!(plan["planned"]["category"], "promote");
    }

    #[test]
    fn test_invalid_json_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let output = provider_cmd(&["validate", "platform_lifecycle", &path.to_string_lossy()]);
        assert_eq!(output.status.code(), Some(1));
    }

    #[test]
    fn test_apply_requires_url() {
        let dir = TempDir::new().unwrap();
        let config = write_json(&dir, "stage.json", json!({"name": "deploy"}));

        let output = provider_cmd(&["apply", "platform_lifecycle_stage", &config]);
        assert_eq!(output.status.code(), Some(64));
        assert!(stderr(&output).contains("PLATFORM_URL"));
    }
}

mod platform_commands {
    use super::*;

    fn stage_document() -> serde_json::Value {
        json!({
            "name": "deploy",
            "scope": "GLOBAL",
            "category": "promote",
            "repositories": [],
            "used_in_lifecycles": [],
            "created": 1700000000000_i64,
            "modified": 1700000000000_i64,
            "total_repository_count": 0
        })
    }

    fn args(server: &MockServer, rest: &[&str]) -> Vec<String> {
        let mut args: Vec<String> = rest.iter().map(|s| s.to_string()).collect();
        args.extend([
            "--url".to_string(),
            server.uri(),
            "--access-version".to_string(),
            "7.125.0".to_string(),
            "--platform-version".to_string(),
            "7.104.2".to_string(),
        ]);
        args
    }

    fn read_state(path: &Path) -> serde_json::Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_apply_then_destroy_stage() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/access/api/v2/stages"))
            .and(body_json(json!({"name": "deploy", "category": "promote"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(stage_document()))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/access/api/v2/stages/deploy"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let config = write_json(&dir, "stage.json", json!({"name": "deploy"}));
        let state = dir.path().join("stage.tfstate.json");
        let state_arg = state.to_string_lossy().to_string();

        let output = provider_cmd_async(args(
            &server,
            &["apply", "platform_lifecycle_stage", &config, "--state", &state_arg],
        ))
        .await;
        assert!(output.status.success(), "{}", stderr(&output));
        assert!(stdout(&output).contains("2023-11-14 22:13:20"));

        let saved = read_state(&state);
        assert_eq!(saved["scope"], "GLOBAL");
        assert_eq!(saved["repositories"], json!([]));

        let output = provider_cmd_async(args(
            &server,
            &["destroy", "platform_lifecycle_stage", "--state", &state_arg],
        ))
        .await;
        assert!(output.status.success(), "{}", stderr(&output));
        assert!(!state.exists());
    }

    #[tokio::test]
    async fn test_refresh_removes_missing_stage() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/access/api/v2/stages/deploy"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let state = write_json(&dir, "stage.tfstate.json", stage_document());

        let output = provider_cmd_async(args(
            &server,
            &["refresh", "platform_lifecycle_stage", "--state", &state],
        ))
        .await;

        assert!(output.status.success(), "{}", stderr(&output));
        assert!(stdout(&output).contains("no longer exists"));
        assert!(!Path::new(&state).exists());
    }

    #[tokio::test]
    async fn test_destroy_lifecycle_only_warns() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let state = write_json(
            &dir,
            "lifecycle.tfstate.json",
            json!({
                "project_key": "bookverse",
                "promote_stages": [],
                "release_stage": "PROD",
                "categories": []
            }),
        );

        let output = provider_cmd_async(args(
            &server,
            &["destroy", "platform_lifecycle", "--state", &state],
        ))
        .await;

        assert!(output.status.success(), "{}", stderr(&output));
        let out = stdout(&output);
        assert!(out.contains("platform_lifecycle cannot be deleted"), "{out}");
        assert!(!Path::new(&state).exists());
    }

    #[tokio::test]
    async fn test_import_prints_state() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/access/api/v2/stages/bookverse-qa"))
            .and(query_param("project_key", "bookverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "bookverse-qa",
                "scope": "PROJECT",
                "project_key": "bookverse",
                "category": "code",
                "repositories": ["bookverse-docker"],
                "used_in_lifecycles": ["bookverse"],
                "created": 1700000000000_i64,
                "modified": 1700000000000_i64,
                "total_repository_count": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        let output = provider_cmd_async(args(
            &server,
            &["import", "platform_lifecycle_stage", "bookverse-qa:bookverse"],
        ))
        .await;

        assert!(output.status.success(), "{}", stderr(&output));
        let state: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert_eq!(state["project_key"], "bookverse");
        assert_eq!(state["scope"], "PROJECT");
        assert_eq!(state["repositories"], json!(["bookverse-docker"]));
    }

    #[tokio::test]
    async fn test_apply_api_error_exit_code() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/access/api/v2/stages"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "errors": [{"code": "CONFLICT", "message": "Stage 'deploy' already exists"}]
            })))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let config = write_json(&dir, "stage.json", json!({"name": "deploy"}));

        let output =
            provider_cmd_async(args(&server, &["apply", "platform_lifecycle_stage", &config])).await;

        assert_eq!(output.status.code(), Some(3));
        assert!(stderr(&output).contains("CONFLICT"));
    }
}

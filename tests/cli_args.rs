//! Integration tests for the holocast binary
//!
//! Runs the compiled CLI for argument handling, cache maintenance, and a full
//! `fuse` against mocked origins.

use std::process::{Command, Output};

use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_holocast"))
        .args(args)
        .env_remove("HOLOCAST_CACHE_DIR")
        .env_remove("HOLOCAST_HISTORY_DIR")
        .env_remove("HOLOCAST_SWAPI_URL")
        .env_remove("HOLOCAST_OPEN_METEO_URL")
        .env_remove("HOLOCAST_TIMEZONE")
        .env_remove("HOLOCAST_REQUEST_TIMEOUT_SECS")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute holocast")
}

/// Runs the CLI off the async runtime so mocked origins keep serving
async fn run_cli_async(args: Vec<String>) -> Output {
    tokio::task::spawn_blocking(move || {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        run_cli(&args)
    })
    .await
    .expect("CLI task panicked")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(output.status.success(), "Expected --help to exit successfully");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("holocast"), "Help should mention holocast");
    assert!(stdout.contains("fuse"), "Help should mention the fuse command");
    assert!(stdout.contains("cache"), "Help should mention the cache command");
}

#[test]
fn test_fuse_without_ids_fails() {
    let output = run_cli(&["fuse"]);
    assert!(!output.status.success());
}

#[test]
fn test_invalid_id_prints_error_and_exits() {
    let dir = TempDir::new().unwrap();
    let output = run_cli(&["--cache-dir", dir.path().to_str().unwrap(), "fuse", "1/2"]);

    assert!(!output.status.success(), "Expected invalid id to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid character id"),
        "Should print error message about invalid id: {}",
        stderr
    );
}

#[test]
fn test_cache_list_on_empty_directory() {
    let dir = TempDir::new().unwrap();
    let output = run_cli(&["--cache-dir", dir.path().to_str().unwrap(), "cache", "list"]);

    assert!(output.status.success());
    assert!(output.stdout.is_empty(), "Empty cache should list nothing");
}

#[test]
fn test_cache_purge_on_empty_directory() {
    let dir = TempDir::new().unwrap();
    let output = run_cli(&["--cache-dir", dir.path().to_str().unwrap(), "cache", "purge"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("removed 0 expired entries"));
}

#[test]
fn test_purge_with_no_persist_is_rejected() {
    let output = run_cli(&["--no-persist", "cache", "purge"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("persistent cache"), "Unexpected stderr: {}", stderr);
}

#[tokio::test]
async fn test_fuse_prints_composite_and_warms_cache() {
    let swapi = MockServer::start().await;
    let meteo = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/people/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {
                "uid": "2",
                "properties": {
                    "name": "C-3PO",
                    "homeworld": format!("{}/planets/1", swapi.uri())
                }
            }
        })))
        .expect(1)
        .mount(&swapi)
        .await;
    Mock::given(method("GET"))
        .and(path("/planets/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {"properties": {"name": "Tatooine", "climate": "arid"}}
        })))
        .expect(1)
        .mount(&swapi)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "latitude": 30.0,
            "longitude": 10.0,
            "timezone": "America/New_York",
            "hourly": {"time": ["2024-07-15T00:00"], "temperature_2m": [31.0]}
        })))
        .expect(1)
        .mount(&meteo)
        .await;
    let dir = TempDir::new().unwrap();
    let history = TempDir::new().unwrap();
    let cache_dir = dir.path().to_str().unwrap().to_string();
    let history_dir = history.path().to_str().unwrap().to_string();
    let args = |cmd: &[&str]| -> Vec<String> {
        let mut args = vec![
            "--cache-dir".to_string(),
            cache_dir.clone(),
            "--history-dir".to_string(),
            history_dir.clone(),
            "--swapi-url".to_string(),
            swapi.uri(),
            "--open-meteo-url".to_string(),
            meteo.uri(),
        ];
        args.extend(cmd.iter().map(|s| s.to_string()));
        args
    };

    // Second run must be served entirely from the file cache
    for _ in 0..2 {
        let output = run_cli_async(args(&["fuse", "2"])).await;
        assert!(
            output.status.success(),
            "fuse failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        let composite: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
        assert_eq!(composite["name"], json!("C-3PO"));
        assert_eq!(composite["planet"]["data"]["name"], json!("Tatooine"));
        assert_eq!(composite["planet"]["weather"]["hourly"][0]["temperature"], json!(31.0));
    }

    let output = run_cli_async(args(&["cache", "list"])).await;
    let listing = String::from_utf8_lossy(&output.stdout);
    assert_eq!(listing.lines().count(), 3);
    assert!(listing.contains("swapi-people-2\t"));
    assert!(listing.contains("weather-Tatooine\t"));
    assert!(listing.lines().all(|line| line.ends_with("fresh")));

    let recorded = std::fs::read_dir(history.path()).unwrap().count();
    assert_eq!(recorded, 2, "Each fuse run should record one fusion");

    swapi.verify().await;
    meteo.verify().await;
}

#[tokio::test]
async fn test_fuse_missing_character_exits_with_not_found() {
    let swapi = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/people/999999"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "not found"})))
        .mount(&swapi)
        .await;

    let output = run_cli_async(vec![
        "--no-persist".to_string(),
        "--swapi-url".to_string(),
        swapi.uri(),
        "fuse".to_string(),
        "999999".to_string(),
    ])
    .await;

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("character not found"), "Unexpected stderr: {}", stderr);
    assert!(output.stdout.is_empty());
}

#[tokio::test]
async fn test_fuse_with_failing_registry_exits_with_not_found() {
    let swapi = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/people/1"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&swapi)
        .await;

    let output = run_cli_async(vec![
        "--no-persist".to_string(),
        "--swapi-url".to_string(),
        swapi.uri(),
        "fuse".to_string(),
        "1".to_string(),
    ])
    .await;

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("character not found (404)"), "Unexpected stderr: {}", stderr);
    assert!(stderr.contains("503"), "Cause should be printed: {}", stderr);
}

// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-level tests for the `structview` binary.
//!
//! Each test runs the binary in its own temp directory with the XDG config
//! lookup pointed there, so host configuration never leaks in.

use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;

use structview_rpc::pb::ai_service_client::AiServiceClient;
use structview_rpc::pb::{ExtractedRecord, HistoryRequest, PingRequest};
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};

const BIN: &str = env!("CARGO_BIN_EXE_structview");

fn command(dir: &Path) -> Command {
    let mut cmd = Command::new(BIN);
    cmd.current_dir(dir)
        .env_clear()
        .env("PATH", std::env::var_os("PATH").unwrap_or_default())
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join("config"))
        .env("XDG_DATA_HOME", dir.join("data"))
        .env(
            "STRUCTVIEW_STORAGE_DATABASE_PATH",
            dir.join("records.db").to_string_lossy().into_owned(),
        )
        .env("RUST_LOG", "info")
        .kill_on_drop(true);
    cmd
}

async fn run(cmd: &mut Command) -> Output {
    cmd.stdin(Stdio::null()).output().await.unwrap()
}

fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Starts `serve` and waits for the readiness line.
async fn spawn_server(dir: &Path, port: u16) -> Child {
    spawn_server_with(dir, port, |_| {}).await.0
}

/// Starts `serve` and waits for the readiness line, which is returned with the child.
async fn spawn_server_with(
    dir: &Path,
    port: u16,
    configure: impl FnOnce(&mut Command),
) -> (Child, String) {
    let mut cmd = command(dir);
    cmd.arg("serve")
        .env("GRPC_PORT", port.to_string())
        .env("STRUCTVIEW_SERVER_HOST", "127.0.0.1")
        .stdout(Stdio::null())
        .stderr(Stdio::piped());
    configure(&mut cmd);
    let mut child = cmd.spawn().unwrap();

    let stderr = child.stderr.take().unwrap();
    let mut lines = BufReader::new(stderr).lines();
    let ready = format!("listening on :{port}");
    let ready_line = tokio::time::timeout(Duration::from_secs(30), async {
        while let Some(line) = lines.next_line().await.unwrap() {
            if line.contains(&ready) {
                return line;
            }
        }
        panic!("server exited before becoming ready");
    })
    .await
    .expect("server did not report readiness");

    // Keep draining so the child never blocks on a full pipe.
    tokio::spawn(async move { while let Ok(Some(_)) = lines.next_line().await {} });
    (child, ready_line)
}

#[tokio::test]
async fn serve_announces_port_and_answers_grpc() {
    let dir = TempDir::new().unwrap();
    let port = free_port();
    let mut child = spawn_server(dir.path(), port).await;

    let mut client = AiServiceClient::connect(format!("http://127.0.0.1:{port}"))
        .await
        .unwrap();
    let reply = client
        .ping(PingRequest {
            message: "hello".into(),
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(reply.reply, "Pong! structview backend is online.");

    let saved = client
        .save_extracted_record(ExtractedRecord {
            extracted_json: r#"{"features":{}}"#.into(),
            source_text: "body".into(),
            ..ExtractedRecord::default()
        })
        .await
        .unwrap()
        .into_inner();
    let history = client
        .get_extraction_history(HistoryRequest::default())
        .await
        .unwrap()
        .into_inner();
    assert_eq!(history.records.len(), 1);
    assert_eq!(history.records[0].id, saved.id);

    child.kill().await.unwrap();
}

#[tokio::test]
async fn readiness_line_survives_quiet_log_levels() {
    let dir = TempDir::new().unwrap();
    let port = free_port();
    let (mut child, line) = spawn_server_with(dir.path(), port, |cmd| {
        cmd.env_remove("RUST_LOG")
            .env("STRUCTVIEW_SERVICE_LOG_LEVEL", "warn");
    })
    .await;
    assert!(!line.contains('\x1b'), "escape codes in {line:?}");
    child.kill().await.unwrap();

    let port = free_port();
    let (mut child, _) = spawn_server_with(dir.path(), port, |cmd| {
        cmd.env("RUST_LOG", "error");
    })
    .await;
    child.kill().await.unwrap();
}

#[tokio::test]
async fn records_outlive_the_server_process() {
    let dir = TempDir::new().unwrap();
    let port = free_port();
    let mut child = spawn_server(dir.path(), port).await;

    let mut client = AiServiceClient::connect(format!("http://127.0.0.1:{port}"))
        .await
        .unwrap();
    client
        .save_extracted_record(ExtractedRecord {
            id: "kept".into(),
            extracted_json: "{}".into(),
            created_at: 7,
            ..ExtractedRecord::default()
        })
        .await
        .unwrap();
    child.kill().await.unwrap();
    child.wait().await.unwrap();

    let output = run(command(dir.path()).arg("history")).await;
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).unwrap();
    let line: serde_json::Value = serde_json::from_str(stdout.lines().next().unwrap()).unwrap();
    assert_eq!(line["id"], "kept");
    assert_eq!(line["created_at"], 7);
}

#[tokio::test]
async fn non_numeric_grpc_port_fails_startup() {
    let dir = TempDir::new().unwrap();
    let output = run(command(dir.path()).arg("serve").env("GRPC_PORT", "fifty")).await;
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("GRPC_PORT"), "{stderr}");
}

#[tokio::test]
async fn extract_prints_document_for_file() {
    let dir = TempDir::new().unwrap();
    let page = dir.path().join("page.txt");
    std::fs::write(&page, "SKU: A-100\nOnly $4.50 until 2026-01-31! #deal").unwrap();

    let output = run(command(dir.path())
        .arg("extract")
        .arg(&page)
        .args(["--fields", "sku,color"]))
    .await;
    assert!(output.status.success(), "{output:?}");

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(doc["error"].is_null());
    assert_eq!(doc["fields"]["sku"], "A-100");
    assert!(doc["fields"]["color"].is_null());
    assert_eq!(doc["features"]["prices"][0], "$4.50");
    assert_eq!(doc["features"]["hashtags"][0], "#deal");
}

#[tokio::test]
async fn extract_rejects_invalid_utf8() {
    let dir = TempDir::new().unwrap();
    let page = dir.path().join("bad.bin");
    std::fs::write(&page, [0x66, 0x6f, 0xff, 0x6f]).unwrap();

    let output = run(command(dir.path()).arg("extract").arg(&page)).await;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid input"));
}

#[tokio::test]
async fn config_command_honours_local_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("structview.toml"),
        "[history]\ndefault_limit = 7\n",
    )
    .unwrap();

    let output = run(command(dir.path()).arg("config")).await;
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("default_limit = 7"), "{stdout}");
    assert!(stdout.contains("port = 50051"), "{stdout}");
}

#[tokio::test]
async fn config_typo_is_reported() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("structview.toml"), "[server]\nprot = 1\n").unwrap();

    let output = run(command(dir.path()).arg("config")).await;
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("prot"), "{stderr}");
}

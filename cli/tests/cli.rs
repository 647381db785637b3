use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn paperchat(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("paperchat").unwrap();
    cmd.current_dir(dir.path())
        .env("XDG_CONFIG_HOME", dir.path())
        .env_remove("OPENAI_API_KEY")
        .env_remove("OPENAI_BASE_URL")
        .env_remove("OPENAI_MODEL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_tools_lists_paper_tools() {
    let dir = TempDir::new().unwrap();
    paperchat(&dir)
        .arg("tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("search_papers"))
        .stdout(predicate::str::contains("extract_info"));
}

#[test]
fn test_serve_answers_handshake_and_listing() {
    let dir = TempDir::new().unwrap();
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"test"}}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
        "\n",
    );

    let output = paperchat(&dir)
        .arg("serve")
        .write_stdin(input)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let lines: Vec<serde_json::Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(lines[1]["result"]["tools"][0]["name"], "search_papers");
    assert_eq!(lines[1]["result"]["tools"][1]["name"], "extract_info");
}

#[test]
fn test_serve_extract_unknown_paper_returns_sentinel() {
    let dir = TempDir::new().unwrap();
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":7,"method":"tools/call","params":{"name":"extract_info","arguments":{"paper_id":"nonexistent"}}}"#,
        "\n",
    );

    paperchat(&dir)
        .arg("serve")
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "The operation completed but didn't return any results.",
        ));
}

#[test]
fn test_chat_without_api_key_fails() {
    let dir = TempDir::new().unwrap();
    paperchat(&dir)
        .write_stdin("quit\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No API key configured"));
}

#[test]
fn test_chat_quits_on_command() {
    let dir = TempDir::new().unwrap();
    paperchat(&dir)
        .args(["--api-key", "sk-test"])
        .write_stdin("\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Paper Chat Started!"))
        .stdout(predicate::str::contains("Query: "));
}

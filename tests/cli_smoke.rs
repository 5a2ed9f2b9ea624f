use assert_cmd::prelude::*;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::Path;
use std::process::Command;
use std::thread;
use tempfile::tempdir;

const ROSTER: &str = r#"
repos = ["acme/app"]

[[members]]
username = "alice"
name = "Alice Doe"
team = "Titans"

[[members]]
username = "bob"
name = "Bob Roe"
team = "Titans"
"#;

fn write_roster(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("teampulse.toml");
    fs::write(&path, ROSTER).unwrap();
    path
}

fn teampulse() -> Command {
    let mut cmd = Command::cargo_bin("teampulse").unwrap();
    cmd.env_remove("GITHUB_TOKEN")
        .env_remove("GITHUB_API_URL")
        .env_remove("TEAMPULSE_START_DATE")
        .env_remove("TEAMPULSE_END_DATE")
        .env_remove("RUST_LOG");
    cmd
}

/// Serve canned JSON by request path (query ignored) until the test exits.
fn serve(routes: Vec<(&'static str, String)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            if reader.read_line(&mut request_line).is_err() {
                continue;
            }
            loop {
                let mut line = String::new();
                match reader.read_line(&mut line) {
                    Ok(0) => break,
                    Ok(_) if line == "\r\n" => break,
                    Ok(_) => {}
                    Err(_) => break,
                }
            }
            let target = request_line.split_whitespace().nth(1).unwrap_or("/");
            let path = target.split('?').next().unwrap_or(target);
            let (status, body) = match routes.iter().find(|(p, _)| *p == path) {
                Some((_, body)) => ("200 OK", body.clone()),
                None => ("404 Not Found", r#"{"message":"Not Found"}"#.to_string()),
            };
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });
    format!("http://{addr}")
}

fn commit(sha: &str, login: Option<&str>, date: &str) -> serde_json::Value {
    serde_json::json!({
        "sha": sha,
        "html_url": format!("https://github.com/acme/app/commit/{sha}"),
        "commit": {
            "message": format!("commit {sha}"),
            "author": {"date": date},
            "committer": {"date": date}
        },
        "author": login.map(|l| serde_json::json!({"login": l}))
    })
}

#[test]
fn help_lists_subcommands() {
    let out = teampulse().arg("--help").assert().success().get_output().stdout.clone();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("report"));
    assert!(text.contains("branches"));
}

#[test]
fn missing_token_aborts_before_any_request() {
    let dir = tempdir().unwrap();
    let roster = write_roster(dir.path());

    let out = teampulse()
        .arg("--config")
        .arg(&roster)
        .args(["--api-url", "http://127.0.0.1:9", "report", "--no-charts", "--no-csv"])
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8(out).unwrap();
    assert!(stderr.contains("Missing configuration"), "{stderr}");
    assert!(stderr.contains("GITHUB_TOKEN"), "{stderr}");
}

#[test]
fn missing_roster_is_reported() {
    let dir = tempdir().unwrap();

    let out = teampulse()
        .arg("--config")
        .arg(dir.path().join("nope.toml"))
        .args(["--token", "t", "report"])
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8(out).unwrap();
    assert!(stderr.contains("Missing configuration"), "{stderr}");
}

#[test]
fn report_json_and_csv_from_a_stub_api() {
    let dir = tempdir().unwrap();
    let roster = write_roster(dir.path());
    let out_dir = dir.path().join("out");
    let commits = serde_json::json!([
        commit("a1", Some("alice"), "2025-01-02T10:00:00Z"),
        commit("b1", Some("bob"), "2025-02-10T10:00:00Z"),
        commit("x1", Some("stranger"), "2025-02-11T10:00:00Z"),
        commit("n1", None, "2025-02-12T10:00:00Z"),
    ]);
    let base = serve(vec![("/repos/acme/app/commits", commits.to_string())]);

    let out = teampulse()
        .arg("--config")
        .arg(&roster)
        .args(["--token", "t", "--api-url", &base])
        .args(["--since", "2025-01-01", "--until", "2025-03-31"])
        .args(["report", "--branch", "main", "--no-charts", "--json"])
        .arg("--out-dir")
        .arg(&out_dir)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["version"], 1);
    assert_eq!(v["strategy"], "per-branch");
    assert_eq!(v["contributors"][0]["commits"], 1);
    assert_eq!(v["contributors"][1]["commits"], 1);
    assert_eq!(v["teams"][0]["commits"], 2);
    assert_eq!(v["weekly"].as_array().unwrap().len(), 13);
    assert_eq!(v["failed_requests"], 0);

    let table = fs::read_to_string(out_dir.join("team_productivity_report.csv")).unwrap();
    assert_eq!(table.lines().count(), 3);
    let weekly = fs::read_to_string(out_dir.join("weekly_commit_trend.csv")).unwrap();
    assert_eq!(weekly.lines().count(), 14);
}

#[test]
fn branches_json_classifies_tips() {
    let fresh = (chrono::Utc::now() - chrono::Duration::days(2)).to_rfc3339();
    let base = serve(vec![
        (
            "/repos/acme/app/branches",
            serde_json::json!([
                {"name": "main", "commit": {"sha": "aaaaaaaaaaaa"}},
                {"name": "old-spike", "commit": {"sha": "bbbbbbbbbbbb"}}
            ])
            .to_string(),
        ),
        (
            "/repos/acme/app/commits/aaaaaaaaaaaa",
            commit("aaaaaaaaaaaa", Some("alice"), &fresh).to_string(),
        ),
        (
            "/repos/acme/app/commits/bbbbbbbbbbbb",
            commit("bbbbbbbbbbbb", Some("bob"), "2020-01-01T00:00:00Z").to_string(),
        ),
    ]);

    let out = teampulse()
        .args(["--token", "t", "--api-url", &base])
        .args(["branches", "acme/app", "--sample", "10", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["repository"], "acme/app");
    assert_eq!(v["total_analyzed"], 2);
    assert_eq!(v["tiers"]["very_active"][0]["name"], "main");
    assert_eq!(v["tiers"]["very_active"][0]["last_commit_hash_prefix"], "aaaaaaaa");
    assert_eq!(v["tiers"]["stale"][0]["name"], "old-spike");
}

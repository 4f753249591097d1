//! Integration tests for the buildmatrix binary
//!
//! Drives the compiled binary end to end with a stub conda executable and a
//! wiremock channel, checking exit codes and the exported plan.

mod common;

use std::process::{Command, Output};

use common::{write_stub_conda, TestRecipes};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn run_buildmatrix(args: &[&str], envs: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_buildmatrix"));
    cmd.args(args);
    for (key, value) in envs {
        cmd.env(key, value);
    }
    cmd.output().expect("Failed to execute buildmatrix")
}

/// Channel that answers every repodata request with an empty index
async fn empty_channel() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "packages": {},
            "packages.conda": {}
        })))
        .mount(&server)
        .await;
    server
}

#[test]
fn test_help_describes_the_tool() {
    let output = run_buildmatrix(&["--help"], &[]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("recipes"));
    assert!(stdout.contains("--allow-failures"));
    assert!(stdout.contains("--dry-run"));
}

#[test]
fn test_missing_recipes_path_exits_nonzero() {
    let output = run_buildmatrix(&["/no/such/recipes/path"], &[]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does not exist"));
}

#[test]
fn test_default_log_name_is_a_readable_timestamp() {
    let output = run_buildmatrix(&["/no/such/recipes/path"], &[]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout
        .lines()
        .find(|line| line.starts_with("Logging summary to "))
        .expect("the log path is announced on stdout");
    let name = std::path::Path::new(line.trim_start_matches("Logging summary to "))
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned();

    // YYYY.MM.DD-HH.MM.log
    let stem = name.strip_suffix(".log").expect("log files end in .log");
    let parts: Vec<&str> = stem.split(['.', '-']).collect();
    assert_eq!(parts.len(), 5, "unexpected log file name '{name}'");
    assert_eq!(parts[0].len(), 4, "year comes first in '{name}'");
    assert!(parts
        .iter()
        .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit())));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dry_run_writes_ordered_plan_and_exits_zero() {
    let server = empty_channel().await;
    let recipes = TestRecipes::new();
    recipes.add_recipe("package-a", &["python", "numpy x.x"], &["python"], &[]);
    recipes.add_recipe("package-b", &["python", "package-a"], &["python"], &[]);
    let stub = write_stub_conda(recipes.dir.path());
    let plan_file = recipes.dir.path().join("plan.json");

    let output = run_buildmatrix(
        &[
            recipes.path().to_str().unwrap(),
            "--python",
            "3.5",
            "3.6",
            "3.7",
            "--numpy",
            "1.10",
            "1.11",
            "--channel",
            &server.uri(),
            "--conda",
            stub.to_str().unwrap(),
            "--dry-run",
            "--plan-file",
            plan_file.to_str().unwrap(),
        ],
        &[],
    );

    assert!(
        output.status.success(),
        "dry run should exit 0: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let plan: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&plan_file).unwrap()).unwrap();
    let entries = plan.as_array().unwrap();
    assert_eq!(entries.len(), 9, "6 package-a variants + 3 package-b variants");
    let packages: Vec<&str> = entries
        .iter()
        .map(|e| e["package"].as_str().unwrap())
        .collect();
    let first_b = packages.iter().position(|p| *p == "package-b").unwrap();
    assert!(packages[..first_b].iter().all(|p| *p == "package-a"));
    assert!(packages[first_b..].iter().all(|p| *p == "package-b"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_build_failure_exits_nonzero_by_default() {
    let server = empty_channel().await;
    let recipes = TestRecipes::new();
    recipes.add_recipe("package-a", &["python"], &[], &[]);
    let stub = write_stub_conda(recipes.dir.path());

    let output = run_buildmatrix(
        &[
            recipes.path().to_str().unwrap(),
            "--channel",
            &server.uri(),
            "--conda",
            stub.to_str().unwrap(),
        ],
        &[("STUB_BUILD_EXIT", "1")],
    );

    assert_eq!(output.status.code(), Some(1));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_allow_failures_exits_zero_with_failures_in_summary() {
    let server = empty_channel().await;
    let recipes = TestRecipes::new();
    recipes.add_recipe("package-a", &["python"], &[], &[]);
    let stub = write_stub_conda(recipes.dir.path());

    let output = run_buildmatrix(
        &[
            recipes.path().to_str().unwrap(),
            "--channel",
            &server.uri(),
            "--conda",
            stub.to_str().unwrap(),
            "--allow-failures",
        ],
        &[("STUB_BUILD_EXIT", "1")],
    );

    assert!(
        output.status.success(),
        "--allow-failures completes with exit 0: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to build"));
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread")]
async fn test_sigterm_kills_the_build_and_exits_nonzero() {
    use std::time::{Duration, Instant};

    let server = empty_channel().await;
    let recipes = TestRecipes::new();
    recipes.add_recipe("package-a", &["python"], &[], &[]);
    let stub = write_stub_conda(recipes.dir.path());
    let pid_file = recipes.dir.path().join("build.pid");

    let mut child = Command::new(env!("CARGO_BIN_EXE_buildmatrix"))
        .args([
            recipes.path().to_str().unwrap(),
            "--channel",
            &server.uri(),
            "--conda",
            stub.to_str().unwrap(),
        ])
        .env("STUB_BUILD_PID_FILE", &pid_file)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .expect("Failed to spawn buildmatrix");

    // Wait until the stub build is running, then deliver SIGTERM.
    let deadline = Instant::now() + Duration::from_secs(20);
    while !pid_file.exists() {
        assert!(Instant::now() < deadline, "stub build never started");
        std::thread::sleep(Duration::from_millis(50));
    }
    let build_pid = std::fs::read_to_string(&pid_file)
        .expect("Failed to read pid file")
        .trim()
        .to_string();
    Command::new("kill")
        .args(["-TERM", &child.id().to_string()])
        .status()
        .expect("Failed to signal buildmatrix");

    let status = loop {
        if let Some(status) = child.try_wait().expect("Failed to poll buildmatrix") {
            break status;
        }
        assert!(Instant::now() < deadline, "buildmatrix did not exit after SIGTERM");
        std::thread::sleep(Duration::from_millis(50));
    };
    assert_eq!(status.code(), Some(1), "a cancelled run must exit nonzero");

    // The tracked build child must not outlive the orchestrator.
    let alive = Command::new("kill")
        .args(["-0", &build_pid])
        .status()
        .expect("Failed to probe build pid");
    assert!(!alive.success(), "build child pid {build_pid} is still alive");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_nothing_to_build_exits_zero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "packages": {
                "package-a-1.0-py3.5_np1.11.tar.bz2": {}
            }
        })))
        .mount(&server)
        .await;
    let recipes = TestRecipes::new();
    recipes.add_recipe("package-a", &["python"], &[], &[]);
    let stub = write_stub_conda(recipes.dir.path());

    let output = run_buildmatrix(
        &[
            recipes.path().to_str().unwrap(),
            "--channel",
            &server.uri(),
            "--conda",
            stub.to_str().unwrap(),
        ],
        &[],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No recipes to build"));
}

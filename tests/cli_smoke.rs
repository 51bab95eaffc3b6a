use assert_cmd::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

fn has_git() -> bool {
    Command::new("git").arg("--version").output().is_ok()
}

fn git(dir: &Path, args: &[&str]) {
    assert!(Command::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
}

fn init_git_repo(dir: &Path) {
    git(dir, &["init"]);
    git(dir, &["config", "core.autocrlf", "false"]);
    git(dir, &["config", "core.safecrlf", "false"]);
    git(dir, &["config", "user.email", "you@example.com"]);
    git(dir, &["config", "user.name", "Your Name"]);
}

fn commit_as(dir: &Path, author: &str, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    git(dir, &["add", "."]);
    git(
        dir,
        &[
            "commit",
            "-m",
            &format!("add {name}"),
            "--author",
            &format!("{author} <{}@example.com>", author.to_lowercase()),
        ],
    );
}

fn commit_json(author: &str, day: u32) -> serde_json::Value {
    json!({
        "hash": format!("{day:040}"),
        "author_name": author,
        "author_email": format!("{}@example.com", author.to_lowercase()),
        "author_timestamp": format!("2023-01-{day:02}T10:00:00+00:00"),
        "committer_name": author,
        "committer_email": format!("{}@example.com", author.to_lowercase()),
        "committer_timestamp": format!("2023-01-{day:02} 10:00:00+00:00"),
        "message": "change",
        "lines_added": day,
        "lines_deleted": 1
    })
}

/// Commit data for `authors` (oldest-first), stored newest-first.
fn write_commits(data_dir: &Path, ledger: &str, repo: &str, authors: &[&str]) {
    let mut commits: Vec<_> = authors
        .iter()
        .enumerate()
        .map(|(i, a)| commit_json(a, i as u32 + 1))
        .collect();
    commits.reverse();
    let dir = data_dir.join("commit_data").join(ledger);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join(format!("{repo}_repo_commits.json")),
        serde_json::to_string_pretty(&commits).unwrap(),
    )
    .unwrap();
}

fn write_config(dir: &Path, extra: &str) -> PathBuf {
    let path = dir.join("gconc.toml");
    fs::write(
        &path,
        format!(
            r#"
data_dir = "data"
output_dir = "out"
metrics = ["nakamoto_coefficient", "gini", "total_entities"]
granularities = [2, "all"]
{extra}

[repositories]
demo = ["alpha", "beta"]
"#
        ),
    )
    .unwrap();
    path
}

fn fixture() -> (tempfile::TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), "");
    write_commits(&dir.path().join("data"), "demo", "alpha", &["A", "B", "A", "A", "C"]);
    write_commits(&dir.path().join("data"), "demo", "beta", &["X", "X", "Y", "X"]);
    (dir, config)
}

fn gconc(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("gconc").unwrap();
    cmd.arg("--config").arg(config);
    cmd
}

#[test]
fn run_writes_matrices_and_metric_tables() {
    let (dir, config) = fixture();
    gconc(&config).arg("run").assert().success();

    let out = dir.path().join("out/count/author");
    let matrix = fs::read_to_string(out.join("2/commits_per_entity/alpha_commits_per_entity.csv")).unwrap();
    assert_eq!(matrix.lines().next().unwrap(), "Entity \\ Time period,2023-01-01,2023-01-03");
    assert_eq!(matrix.lines().nth(1).unwrap(), "A,1,2");

    let all = fs::read_to_string(out.join("2/metrics/all_metrics.csv")).unwrap();
    let lines: Vec<&str> = all.lines().collect();
    assert_eq!(lines[0], "ledger,repository,window,date,nakamoto_coefficient,gini,total_entities");
    // two complete windows each for alpha and beta
    assert_eq!(lines.len(), 5);
    assert!(lines.contains(&"demo,alpha,1,2023-01-03,1,0,1"));

    let gini = fs::read_to_string(out.join("2/metrics/gini.csv")).unwrap();
    assert_eq!(gini.lines().next().unwrap(), "window,alpha,beta");

    let whole: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("all/metrics/all_metrics.json")).unwrap()).unwrap();
    assert_eq!(whole["granularity"], "all");
    assert_eq!(whole["rows"].as_array().unwrap().len(), 2);
    assert_eq!(whole["rows"][0]["values"]["total_entities"], 3.0);
}

#[test]
fn metrics_recomputes_from_written_matrices() {
    let (dir, config) = fixture();
    gconc(&config).arg("aggregate").assert().success();
    let metrics_dir = dir.path().join("out/count/author/all/metrics");
    assert!(!metrics_dir.exists());

    gconc(&config).arg("metrics").assert().success();
    let all = fs::read_to_string(metrics_dir.join("all_metrics.csv")).unwrap();
    assert!(all.lines().any(|l| l.starts_with("demo,beta,0,")));
}

#[test]
fn show_json_reports_each_window() {
    let (_dir, config) = fixture();
    let out = gconc(&config)
        .args(["show", "alpha", "--granularity", "all", "--metric", "nakamoto_coefficient", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let rows = v[0]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["repository"], "alpha");
    assert_eq!(rows[0]["values"]["nakamoto_coefficient"], 1.0);
}

#[test]
fn unsupported_identifiers_are_skipped_unless_nothing_is_left() {
    let (dir, config) = fixture();
    gconc(&config)
        .args(["run", "--metric", "palma_ratio", "--metric", "gini", "--weight", "stars", "--weight", "count"])
        .assert()
        .success();
    assert!(dir.path().join("out/count/author/all/metrics/gini.csv").exists());
    assert!(!dir.path().join("out/count/author/all/metrics/palma_ratio.csv").exists());

    gconc(&config).args(["run", "--metric", "palma_ratio"]).assert().failure();
    gconc(&config).args(["run", "--granularity", "0"]).assert().failure();
}

#[test]
fn missing_repository_data_does_not_abort_the_run() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), "");
    write_commits(&dir.path().join("data"), "demo", "alpha", &["A", "B", "B", "A"]);
    gconc(&config).arg("run").assert().success();

    let gini = fs::read_to_string(dir.path().join("out/count/author/2/metrics/gini.csv")).unwrap();
    assert_eq!(gini.lines().next().unwrap(), "window,alpha");
}

#[test]
fn short_history_keeps_its_matrix_but_adds_no_rows() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), "");
    write_commits(&dir.path().join("data"), "demo", "alpha", &["A"]);
    write_commits(&dir.path().join("data"), "demo", "beta", &["X", "X", "Y", "X"]);
    gconc(&config).args(["run", "--granularity", "2"]).assert().success();

    let out = dir.path().join("out/count/author/2");
    let matrix = fs::read_to_string(out.join("commits_per_entity/alpha_commits_per_entity.csv")).unwrap();
    assert_eq!(matrix.lines().collect::<Vec<_>>(), vec!["Entity \\ Time period,2023-01-01", "A,1"]);

    let all = fs::read_to_string(out.join("metrics/all_metrics.csv")).unwrap();
    assert!(all.lines().skip(1).all(|l| l.starts_with("demo,beta,")));
}

#[test]
fn names_then_resolved_run() {
    let dir = tempdir().unwrap();
    let config = write_config(
        dir.path(),
        r#"
[identity_overrides.alpha]
"a@example.com" = "Alice, Maintainer"
"#,
    );
    write_commits(&dir.path().join("data"), "demo", "alpha", &["A", "B", "A", "A"]);

    gconc(&config).args(["names", "--repo", "alpha"]).assert().success();
    let names: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("data/contributor_names/alpha.json")).unwrap())
            .unwrap();
    assert_eq!(names["a@example.com"], "Alice Maintainer");
    assert_eq!(names["b@example.com"], "B");

    gconc(&config)
        .args(["run", "--repo", "alpha", "--resolve-identities", "--granularity", "all"])
        .assert()
        .success();
    let matrix = fs::read_to_string(
        dir.path()
            .join("out/count/author/all/commits_per_entity/alpha_commits_per_entity.csv"),
    )
    .unwrap();
    assert!(matrix.lines().any(|l| l == "Alice Maintainer,3"));
}

#[test]
fn collect_reads_local_clone() {
    let dir = tempdir().unwrap();
    if !has_git() {
        return;
    }
    let clone = dir.path().join("clone");
    fs::create_dir_all(&clone).unwrap();
    init_git_repo(&clone);
    commit_as(&clone, "Alice", "src/a.rs", "fn a() {}\n");
    commit_as(&clone, "Bob", "src/b.rs", "fn b() {}\nfn c() {}\n");
    commit_as(&clone, "Alice", "src/a.rs", "fn a() { println!(\"a\"); }\n");

    let config = write_config(
        dir.path(),
        &format!("\n[sources.alpha]\npath = {:?}\n", clone.to_string_lossy()),
    );
    gconc(&config)
        .args(["collect", "--repo", "alpha", "--no-progress"])
        .assert()
        .success();

    let saved: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(dir.path().join("data/commit_data/demo/alpha_repo_commits.json")).unwrap(),
    )
    .unwrap();
    let commits = saved.as_array().unwrap();
    assert_eq!(commits.len(), 3);
    let added: u64 = commits.iter().map(|c| c["lines_added"].as_u64().unwrap()).sum();
    let deleted: u64 = commits.iter().map(|c| c["lines_deleted"].as_u64().unwrap()).sum();
    assert_eq!(added, 4);
    assert_eq!(deleted, 1);
    assert!(commits.iter().all(|c| c["hash"].as_str().map(|h| h.len()) == Some(40)));

    // a second pass finds nothing new
    gconc(&config)
        .args(["collect", "--repo", "alpha", "--no-progress"])
        .assert()
        .success();

    let out = gconc(&config)
        .args(["show", "alpha", "--granularity", "all", "--metric", "total_entities", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v[0]["rows"][0]["values"]["total_entities"], 2.0);
}

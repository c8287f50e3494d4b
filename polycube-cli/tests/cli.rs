use assert_cmd::Command;
use predicates::str::contains;

fn cmd() -> Command {
    Command::cargo_bin("polycube").unwrap()
}

fn isolated_cache_dir(tag: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("polycube-cli-test-{tag}"));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn generates_five_tetracubes_worth_of_output() {
    let dir = isolated_cache_dir("n4");
    cmd()
        .arg("4")
        .arg("--no-cache")
        .arg("--cache-dir")
        .arg(&dir)
        .assert()
        .success()
        .stdout(contains("8 free polycubes of size 4"));
}

#[test]
fn rejects_negative_n() {
    let dir = isolated_cache_dir("neg");
    cmd()
        .arg("--no-cache")
        .arg("--cache-dir")
        .arg(&dir)
        .arg("--")
        .arg("-1")
        .assert()
        .failure();
}

#[test]
fn multicore_matches_single_core_count() {
    let dir = isolated_cache_dir("multicore");
    cmd()
        .arg("5")
        .arg("--no-cache")
        .arg("--multicore")
        .arg("--cache-dir")
        .arg(&dir)
        .assert()
        .success()
        .stdout(contains("29 free polycubes of size 5"));
}

#[test]
fn help_lists_the_documented_flags() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("--cache"))
        .stdout(contains("--multicore"))
        .stdout(contains("--render"));
}

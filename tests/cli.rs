extern crate assert_cmd;
extern crate predicates;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn bandbrot() -> Command {
    Command::cargo_bin("bandbrot").unwrap()
}

#[test]
fn renders_to_completion() {
    bandbrot()
        .args(&["--size", "40x30", "--threads", "3", "--iterations", "200"])
        .assert()
        .success()
        .stdout(predicate::str::contains("status: Done"))
        .stdout(predicate::str::contains("cancelled: no"))
        .stdout(predicate::str::contains("rows: 30/30"))
        .stdout(predicate::str::contains("workers: 3"))
        .stdout(predicate::str::contains("faults: 0"));
}

#[test]
fn accepts_negative_corners() {
    bandbrot()
        .args(&[
            "--size",
            "20x20",
            "--leftlower",
            "-1.5,-1.0",
            "--rightupper",
            "0.5,1.0",
            "--iterations",
            "50",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("rows: 20/20"));
}

#[test]
fn abort_requests_a_stop() {
    bandbrot()
        .args(&[
            "--size",
            "64x64",
            "--threads",
            "2",
            "--iterations",
            "5000",
            "--abort-after",
            "0",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("status: Done"))
        .stdout(predicate::str::contains("cancelled: yes"));
}

#[test]
fn rejects_zero_threads() {
    bandbrot()
        .args(&["--threads", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Thread count must be between"));
}

#[test]
fn rejects_more_threads_than_rows() {
    bandbrot()
        .args(&["--size", "10x3", "--threads", "4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration failure"));
}

#[test]
fn rejects_inverted_viewport() {
    bandbrot()
        .args(&["--leftlower", "1.0,-1.0", "--rightupper", "-1.0,1.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("xmax"));
}

#[test]
fn rejects_malformed_size() {
    bandbrot()
        .args(&["--size", "big"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not parse image size"));
}

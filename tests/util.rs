#![allow(dead_code)]
use std::io::Write;

use assert_cmd::Command;
use tempfile::NamedTempFile;

pub const SUCCESS: i32 = 0;
pub const DATA_ERROR: i32 = 65;
pub const SOFTWARE_ERROR: i32 = 70;

fn with_temp_file(source: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp file");
    write!(file, "{source}").expect("failed to write temp file");
    file
}

pub struct Output {
    pub stdout: String,
    pub stderr: String,
    pub code: i32,
}

pub fn run(subcommand: &str, source: &str) -> Output {
    let file = with_temp_file(source);
    let mut cmd = Command::cargo_bin("rlox").expect("binary not found");
    cmd.args([subcommand, file.path().to_str().unwrap()]);
    let output = cmd.output().expect("failed to run binary");
    Output {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        code: output.status.code().unwrap_or(-1),
    }
}

pub fn run_tokenize(source: &str, expected_stdout: &str, expected_code: i32) {
    let output = run("tokenize", source);
    assert_eq!(output.stdout, expected_stdout);
    assert_eq!(output.code, expected_code);
}

pub fn run_program(source: &str, expected_stdout: &str, expected_code: i32) {
    let output = run("run", source);
    assert_eq!(output.stdout, expected_stdout);
    assert_eq!(output.code, expected_code);
}

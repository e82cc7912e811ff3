#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::Builder;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn read_fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name)).expect("fixture should be readable")
}

pub fn write_temp_ts(content: &str) -> PathBuf {
    let mut temp_file = Builder::new()
        .suffix(".ts")
        .tempfile()
        .expect("temp ts file should be created");
    temp_file
        .write_all(content.as_bytes())
        .expect("temp fixture write should succeed");
    temp_file.keep().expect("temp file should persist").1
}

pub fn copy_fixture_to_temp_ts(name: &str) -> PathBuf {
    write_temp_ts(&read_fixture(name))
}

pub fn run_extractpatch(args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_extractpatch"));
    command.env_remove("EXTRACTPATCH_FILE");
    command.env_remove("EXTRACTPATCH_LOG");
    command.args(args);
    command.output().expect("failed to run extractpatch binary")
}

pub fn run_extractpatch_with_env(args: &[&str], env: &[(&str, &str)]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_extractpatch"));
    command.env_remove("EXTRACTPATCH_FILE");
    command.env_remove("EXTRACTPATCH_LOG");
    command.envs(env.iter().copied());
    command.args(args);
    command.output().expect("failed to run extractpatch binary")
}

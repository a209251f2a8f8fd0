//! Tests for the `destripe-config` binary: exit codes, output formats and logging.

use std::io::Write;
use std::process::{Command, Output};

use destripe_config::config::loader::{load_config, parse_toml};
use destripe_config::config::{ConfigLoader, DestripeConfig, Statistic};
use tempfile::Builder;

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_destripe-config"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

#[test]
fn test_show_defaults_as_toml() {
    let output = run(&["show"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(parse_toml(&stdout(&output)).unwrap(), DestripeConfig::default());
}

#[test]
fn test_show_cfg_output_loads_back() {
    let output = run(&[
        "--set", "stat=midpt", "--set", "lower=none", "--set", "mask1=m1.fits",
        "show", "--format", "cfg",
    ]);
    assert_eq!(output.status.code(), Some(0));

    let mut file = Builder::new().suffix(".cfg").tempfile().unwrap();
    file.write_all(&output.stdout).unwrap();

    let expected = ConfigLoader::new()
        .set("stat", "midpt")
        .set("lower", "none")
        .set("mask1", "m1.fits")
        .load()
        .unwrap();
    let loaded = load_config(file.path()).unwrap();
    assert_eq!(loaded, expected);
    assert_eq!(loaded.stat, Statistic::Midpt);
}

#[test]
fn test_show_json_uses_null() {
    let output = run(&["--set", "sigrej=none", "show", "--format", "json"]);
    assert_eq!(output.status.code(), Some(0));
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert!(value["sigrej"].is_null());
    assert!(value["lower"].is_null());
    assert_eq!(value["stat"], "pmode1");
}

#[test]
fn test_load_failures_exit_one() {
    let output = run(&["--set", "stat=average", "show"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("stat"));

    let output = run(&["--set", "maxiter=many", "check"]);
    assert_eq!(output.status.code(), Some(1));

    let output = run(&["--set", "maxiter", "check"]);
    assert_eq!(output.status.code(), Some(1));

    let output = run(&["--config", "/nonexistent/acs_destripe.toml", "check"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_validation_failure_exits_one() {
    let output = run(&["--set", "binwidth=0", "check"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("binwidth"));
}

#[test]
fn test_check_success() {
    let output = run(&["--set", "dqbits=~4096", "check"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("acs_destripe: parameter set is valid"));
}

#[test]
fn test_params_exit_codes() {
    let output = run(&["params", "stat"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("enumerated-option (default: pmode1)"));

    let output = run(&["params"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("rpt_clean"));

    let output = run(&["params", "sigma"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_loader_events_are_logged() {
    let output = Command::new(env!("CARGO_BIN_EXE_destripe-config"))
        .args(["--set", "stat=mean", "--set", "dqbits=4+4", "show"])
        .env("RUST_LOG", "destripe_config=debug")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    let log = stderr(&output);
    assert!(log.contains("Applied override"), "{log}");
    assert!(log.contains("Duplicate DQ bit flag ignored"), "{log}");
}

#[test]
fn test_verbose_sets_log_level() {
    let output = run(&["show"]);
    assert!(stderr(&output).contains("Parameters loaded"));

    let output = run(&["--set", "verbose=false", "show"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(!stderr(&output).contains("Parameters loaded"));
}

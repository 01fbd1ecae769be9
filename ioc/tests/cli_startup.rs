//! CLI tests for the IOC binary.
//!
//! Spawns the binary in a scratch directory, feeds operator commands on stdin
//! and checks the shell output and exit status of the full
//! script -> interactive -> shutdown sequence.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::time::Duration;

use ioc::exit_codes;
use ioc::test_support::{script_dir, write_script};
use wait_timeout::ChildExt;

const TIMEOUT: Duration = Duration::from_secs(20);

fn run_binary(dir: &Path, args: &[&str], stdin: &str, envs: &[(&str, &str)]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_agilent33521a-ioc"))
        .current_dir(dir)
        .args(args)
        .envs(envs.iter().copied())
        .env_remove("IOCSH_PS1")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn ioc");

    {
        let mut input = child.stdin.take().expect("stdin piped");
        input.write_all(stdin.as_bytes()).expect("write stdin");
    }

    if child.wait_timeout(TIMEOUT).expect("wait for ioc").is_none() {
        child.kill().expect("kill ioc");
        panic!("ioc did not exit within {TIMEOUT:?}");
    }
    child.wait_with_output().expect("collect output")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn no_script_enters_shell_and_exits_on_end_of_input() {
    let dir = script_dir();
    let output = run_binary(dir.path(), &[], "epicsEnvSet P FG:\nepicsEnvShow P\n", &[]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(stdout(&output), "P=FG:\n");
}

#[test]
fn script_runs_before_interactive_commands() {
    let dir = script_dir();
    write_script(
        dir.path(),
        "st.cmd",
        "#- not echoed\nepicsEnvSet(\"P\", \"FG:\")\nepicsEnvShow P\n",
    );

    let output = run_binary(dir.path(), &["st.cmd"], "epicsEnvShow P\nexit\n", &[]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(
        stdout(&output),
        "epicsEnvSet(\"P\", \"FG:\")\nepicsEnvShow P\nP=FG:\nP=FG:\n"
    );
}

#[test]
fn exit_command_ends_session_before_remaining_input() {
    let dir = script_dir();
    let output = run_binary(dir.path(), &[], "exit\nepicsEnvShow HOME\n", &[]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(stdout(&output), "");
}

#[test]
fn missing_script_is_reported_and_shell_still_runs() {
    let dir = script_dir();
    let output = run_binary(
        dir.path(),
        &["missing.cmd"],
        "epicsEnvShow MARKER\n",
        &[("MARKER", "alive")],
    );

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let out = stdout(&output);
    assert!(out.starts_with("Can't open missing.cmd: "), "stdout: {out}");
    assert!(out.ends_with("MARKER=alive\n"), "stdout: {out}");
}

#[test]
fn double_dash_is_taken_as_the_script_name() {
    let dir = script_dir();
    write_script(dir.path(), "st.cmd", "#- st\nepicsEnvShow RAN_ST\n");

    let output = run_binary(dir.path(), &["--", "st.cmd"], "", &[("RAN_ST", "yes")]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let out = stdout(&output);
    assert!(out.starts_with("Can't open --: "), "stdout: {out}");
    assert!(!out.contains("RAN_ST"), "stdout: {out}");
}

#[test]
fn only_first_argument_is_run() {
    let dir = script_dir();
    write_script(dir.path(), "a.cmd", "#- a\nepicsEnvShow RAN_A\n");
    write_script(dir.path(), "b.cmd", "#- b\nepicsEnvShow RAN_B\n");

    let output = run_binary(dir.path(), &["a.cmd", "b.cmd"], "", &[("RAN_A", "yes")]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let out = stdout(&output);
    assert!(out.contains("RAN_A=yes"), "stdout: {out}");
    assert!(!out.contains("RAN_B"), "stdout: {out}");
}

#[test]
fn environment_parameterizes_startup_script() {
    let dir = script_dir();
    write_script(
        dir.path(),
        "st.cmd",
        "#- connection\nepicsEnvSet PORT \"$(IPADDR=localhost):$(IPPORT)\"\nepicsEnvShow PORT\n",
    );

    let output = run_binary(
        dir.path(),
        &["st.cmd"],
        "",
        &[("IPADDR", "127.0.0.1"), ("IPPORT", "5025")],
    );

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert!(stdout(&output).ends_with("PORT=127.0.0.1:5025\n"));
}

#[test]
fn config_file_disables_echo() {
    let dir = script_dir();
    std::fs::write(dir.path().join("iocsh.toml"), "echo_commands = false\n").expect("write config");
    write_script(dir.path(), "st.cmd", "epicsEnvSet P FG:\nepicsEnvShow P\n");

    let output = run_binary(dir.path(), &["st.cmd"], "", &[]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(stdout(&output), "P=FG:\n");
}

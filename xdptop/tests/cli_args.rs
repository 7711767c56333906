//! CLI surface smoke tests: flags and subcommands parse and show up in help.

use assert_cmd::Command;

fn stdout_of(args: &[&str]) -> String {
    let assert = Command::cargo_bin("xdptop")
        .expect("binary built")
        .args(args)
        .assert()
        .success();
    String::from_utf8_lossy(&assert.get_output().stdout).to_string()
}

#[test]
fn help_lists_stats_subcommand() {
    let text = stdout_of(&["--help"]);
    assert!(text.contains("stats"), "help missing stats subcommand:\n{text}");
}

#[test]
fn no_subcommand_prints_help() {
    let text = stdout_of(&[]);
    assert!(text.contains("Usage"), "expected usage text:\n{text}");
}

#[test]
fn stats_help_lists_flags() {
    let text = stdout_of(&["stats", "--help"]);
    for flag in ["--pin-dir", "--interval-secs", "--verbose"] {
        assert!(text.contains(flag), "stats help missing {flag}:\n{text}");
    }
    assert!(
        text.contains("/sys/fs/bpf"),
        "default pin directory not shown:\n{text}"
    );
}

mod common;

#[cfg(feature = "e2e")]
use common::{CommandOutput, TestContext};
#[cfg(feature = "e2e")]
use std::process::Command;

// These tests hit the real GitHub API and download real release assets.
// Run them with: cargo test --features e2e

#[test]
#[cfg(feature = "e2e")]
fn e2e_install_raw_binary_shfmt() {
    let ctx = TestContext::new();

    let output: CommandOutput = ctx
        .cmd()
        .args(["install", "--tool", "shfmt", "--version", "3.8.0"])
        .arg("--dir")
        .arg(&ctx.install_dir)
        .output()
        .expect("Failed to run toolchest")
        .into();

    output.assert_success().assert_stdout_contains("Installed shfmt 3.8.0");

    let bin = ctx.installed_bin("shfmt");
    assert!(bin.is_file(), "missing binary at {}", bin.display());

    let version = Command::new(&bin)
        .arg("--version")
        .output()
        .expect("Failed to run installed shfmt");
    assert!(String::from_utf8_lossy(&version.stdout).contains("3.8.0"));
}

#[test]
#[cfg(feature = "e2e")]
fn e2e_install_zip_archive_stylua() {
    let ctx = TestContext::new();

    let output: CommandOutput = ctx
        .cmd()
        .args(["install", "--tool", "stylua", "--version", "0.20.0"])
        .arg("--dir")
        .arg(&ctx.install_dir)
        .output()
        .expect("Failed to run toolchest")
        .into();

    output.assert_success();

    let version = Command::new(ctx.installed_bin("stylua"))
        .arg("--version")
        .output()
        .expect("Failed to run installed stylua");
    assert!(String::from_utf8_lossy(&version.stdout).contains("0.20.0"));
}

#[test]
#[cfg(feature = "e2e")]
fn e2e_install_latest_fzf() {
    let ctx = TestContext::new();

    let output: CommandOutput = ctx
        .cmd()
        .args(["install-latest", "--tool", "fzf"])
        .arg("--dir")
        .arg(&ctx.install_dir)
        .output()
        .expect("Failed to run toolchest")
        .into();

    output.assert_success().assert_stdout_contains("Installed fzf");

    let version = Command::new(ctx.installed_bin("fzf"))
        .arg("--version")
        .output()
        .expect("Failed to run installed fzf");
    assert!(version.status.success());
}

#[test]
#[cfg(feature = "e2e")]
fn e2e_reinstall_is_idempotent() {
    let ctx = TestContext::new();

    for _ in 0..2 {
        let output: CommandOutput = ctx
            .cmd()
            .args(["install", "--tool", "shfmt", "--version", "3.8.0"])
            .arg("--dir")
            .arg(&ctx.install_dir)
            .output()
            .expect("Failed to run toolchest")
            .into();
        output.assert_success();
    }

    let version = Command::new(ctx.installed_bin("shfmt"))
        .arg("--version")
        .output()
        .expect("Failed to run installed shfmt");
    assert!(String::from_utf8_lossy(&version.stdout).contains("3.8.0"));
}

#[test]
#[cfg(feature = "e2e")]
fn e2e_list_versions_ripgrep() {
    let ctx = TestContext::new();

    let output: CommandOutput = ctx
        .cmd()
        .args(["list-versions", "--tool", "ripgrep", "--with-published-at"])
        .output()
        .expect("Failed to run toolchest")
        .into();

    output.assert_success();

    let lines: Vec<&str> = output.stdout.lines().filter(|l| !l.is_empty()).collect();
    assert!(!lines.is_empty() && lines.len() <= 10, "got:\n{}", output.stdout);
    for line in lines {
        let (version, stamp) = line.split_once(" #").expect("expected `version #timestamp`");
        assert!(version.chars().next().is_some_and(|c| c.is_ascii_digit()));
        assert!(!version.ends_with(' '), "version: {:?}", version);
        assert!(stamp.ends_with('Z'), "timestamp: {}", stamp);
    }
}

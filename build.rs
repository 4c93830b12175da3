//! Embeds the build version as `PROVISION_VERSION`.
#![allow(clippy::print_stdout)] // cargo reads directives from stdout

use std::process::Command;

/// `git describe` of the checkout, when built from one.
fn git_version() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .filter(|v| !v.is_empty())
}

fn main() {
    println!("cargo:rerun-if-env-changed=PROVISION_VERSION");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");

    // release pipelines pin the version; local builds describe the checkout
    let version = std::env::var("PROVISION_VERSION").ok().or_else(git_version);
    if let Some(version) = version {
        println!("cargo:rustc-env=PROVISION_VERSION={version}");
    }
}

//! Exposes `MILKRUN_VERSION` to the binary for `--version`.
//!
//! Packagers can pin the string with `MILKRUN_BUILD_VERSION`. Otherwise the
//! crate version is used, annotated with the git revision when building
//! from a checkout, e.g. `0.1.0 (v0.1.0-3-g1a2b3c4-dirty)`.

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-env-changed=MILKRUN_BUILD_VERSION");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");

    let package = env!("CARGO_PKG_VERSION");
    let version = match env::var("MILKRUN_BUILD_VERSION") {
        Ok(pinned) if !pinned.trim().is_empty() => pinned.trim().to_string(),
        _ => match revision() {
            Some(rev) if rev.trim_start_matches('v') != package => {
                format!("{} ({})", package, rev)
            }
            _ => package.to_string(),
        },
    };

    println!("cargo:rustc-env=MILKRUN_VERSION={}", version);
}

/// `git describe` of the working tree, or `None` outside a checkout.
fn revision() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let rev = String::from_utf8(output.stdout).ok()?;
    let rev = rev.trim();
    (!rev.is_empty()).then(|| rev.to_string())
}

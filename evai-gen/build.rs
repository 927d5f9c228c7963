//! Build identification for evai-gen reports and startup logs
//!
//! `EVAI_SOURCE_REVISION` overrides git lookup for builds from a source
//! archive. A working tree with uncommitted changes gets a `-dirty` suffix.

use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}

fn source_revision() -> String {
    if let Ok(revision) = std::env::var("EVAI_SOURCE_REVISION") {
        if !revision.trim().is_empty() {
            return revision.trim().to_string();
        }
    }
    match git(&["rev-parse", "--short=8", "HEAD"]) {
        Some(hash) => match git(&["status", "--porcelain", "--untracked-files=no"]) {
            Some(changes) if !changes.is_empty() => format!("{}-dirty", hash),
            _ => hash,
        },
        None => "unknown".to_string(),
    }
}

fn main() {
    let build_timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=EVAI_GIT_HASH={}", source_revision());
    println!("cargo:rustc-env=EVAI_BUILD_TIMESTAMP={}", build_timestamp);
    println!("cargo:rustc-env=EVAI_BUILD_PROFILE={}", profile);

    println!("cargo:rerun-if-env-changed=EVAI_SOURCE_REVISION");
    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-changed=../.git/index");
    println!("cargo:rerun-if-changed=build.rs");
}

//! Build script for embedding build information.

use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=plugin.yaml");
    println!("cargo:rerun-if-env-changed=RIFF_GIT_COMMIT");
    println!("cargo:rerun-if-env-changed=RIFF_BUILD_TIME");

    // Git commit hash, overridable for reproducible builds
    let git_commit = std::env::var("RIFF_GIT_COMMIT").ok().unwrap_or_else(|| {
        Command::new("git")
            .args(["rev-parse", "--short", "HEAD"])
            .output()
            .ok()
            .filter(|output| output.status.success())
            .and_then(|output| String::from_utf8(output.stdout).ok())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "unknown".to_string())
    });
    println!("cargo:rustc-env=RIFF_GIT_COMMIT={}", git_commit);

    // Build timestamp
    let build_time = std::env::var("RIFF_BUILD_TIME")
        .unwrap_or_else(|_| chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string());
    println!("cargo:rustc-env=RIFF_BUILD_TIME={}", build_time);
}

// Build script for timer-metrics
// Captures the VCS revision so build_info can report it without the
// process having to shell out at runtime.

use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-env-changed=TIMER_METRICS_REVISION");

    let revision = std::env::var("TIMER_METRICS_REVISION")
        .ok()
        .filter(|rev| !rev.trim().is_empty())
        .or_else(git_revision)
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=TIMER_METRICS_REVISION={revision}");
}

fn git_revision() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        println!("cargo:warning=git revision unavailable; reporting build_info revision as unknown");
        return None;
    }
    let rev = String::from_utf8(output.stdout).ok()?;
    let rev = rev.trim();
    (!rev.is_empty()).then(|| rev.to_string())
}

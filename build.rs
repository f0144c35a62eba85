use std::process::Command;

fn main() {
    // Set build date
    let now = chrono::Utc::now()
        .format("%Y-%m-%d %H:%M:%S UTC")
        .to_string();
    println!("cargo:rustc-env=BUILD_DATE={}", now);

    // The host API hash is the git commit when available, otherwise the package version.
    let mut api_hash = std::env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "unknown".to_string());
    if let Ok(output) = Command::new("git").args(["rev-parse", "HEAD"]).output() {
        if output.status.success() {
            let commit = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !commit.is_empty() {
                api_hash = commit;
            }
        }
    }
    println!("cargo:rustc-env=WINWRAP_API_HASH={}", api_hash);

    // Tell cargo to re-run if git HEAD changes
    println!("cargo:rerun-if-changed=.git/HEAD");
}

use std::process::Command;

fn main() {
    // Packaged builds have no .git; let them pass the hash in.
    let hash = std::env::var("LIVESTREAM_GIT_HASH")
        .ok()
        .filter(|h| !h.is_empty())
        .or_else(|| {
            Command::new("git")
                .args(["rev-parse", "--short", "HEAD"])
                .output()
                .ok()
                .filter(|o| o.status.success())
                .and_then(|o| String::from_utf8(o.stdout).ok())
                .map(|s| s.trim().to_string())
        })
        .unwrap_or_default();

    println!("cargo:rustc-env=GIT_HASH={}", hash);
    println!("cargo:rerun-if-env-changed=LIVESTREAM_GIT_HASH");
    println!("cargo:rerun-if-changed=../../.git/HEAD");
}

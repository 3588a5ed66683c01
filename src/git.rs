use anyhow::{anyhow, Context};
use std::path::Path;
use std::process::Command;

/// Capture the accumulated uncommitted changes of the repository at `dir`
/// as one unified-diff blob. A clean tree yields an empty string.
pub fn uncommitted_diff(dir: &Path) -> crate::Result<String> {
    let output = Command::new("git")
        .arg("diff")
        .current_dir(dir)
        .output()
        .context("failed to run git diff")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("git diff failed: {}", stderr.trim()));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

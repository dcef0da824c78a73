//! Platform detection utilities

use std::fs;

/// Detect if running in WSL (Windows Subsystem for Linux)
///
/// Checks for WSL-specific indicators in /proc/version and environment variables.
pub fn is_wsl() -> bool {
    if let Ok(contents) = fs::read_to_string("/proc/version") {
        let lower = contents.to_lowercase();
        if lower.contains("microsoft") || lower.contains("wsl") {
            return true;
        }
    }

    std::env::var("WSL_DISTRO_NAME").is_ok()
}

/// Install instruction for an external program on the current platform
///
/// Shown when a required tool (ffmpeg, az) cannot be started.
pub fn install_hint(program: &str) -> String {
    // Strip any directory so "/opt/bin/ffmpeg" still maps to the package name
    let package = std::path::Path::new(program)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(program);

    match std::env::consts::OS {
        "macos" => format!("brew install {}", package),
        "windows" => format!("winget install {}", package),
        "linux" if is_wsl() => format!("sudo apt install {} (inside your WSL distribution)", package),
        "linux" => format!("sudo apt install {}", package),
        _ => format!("install {} with your system package manager", package),
    }
}

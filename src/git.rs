//! Version-control capability, implemented by shelling out to `git`.
//!
//! Used only by the outermost CLI layer, and only as an advisory: any git
//! failure degrades to a message, never an aborted publish. The core
//! pipeline does not depend on this module.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// The version-control questions the publish flow asks.
pub trait Vcs {
    /// `true` when the working tree has no uncommitted changes.
    fn is_clean(&self) -> io::Result<bool>;

    /// `true` when local commits exist that the upstream does not have.
    fn is_ahead(&self) -> io::Result<bool>;

    /// Push the current branch to its upstream.
    fn push(&self) -> io::Result<()>;
}

/// `Vcs` backed by the `git` command-line tool run inside one repository.
pub struct GitCli {
    repo: PathBuf,
}

impl GitCli {
    pub fn new<P: Into<PathBuf>>(repo: P) -> Self {
        Self { repo: repo.into() }
    }

    fn git(&self, args: &[&str]) -> io::Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo)
            .output()?;
        if !output.status.success() {
            return Err(io::Error::other(format!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Vcs for GitCli {
    fn is_clean(&self) -> io::Result<bool> {
        Ok(self.git(&["status", "--porcelain"])?.is_empty())
    }

    fn is_ahead(&self) -> io::Result<bool> {
        // Refresh remote-tracking refs first so "ahead" is judged against
        // the remote's current state, not a stale one.
        let _ = self.git(&["fetch"]);
        // "## main...origin/main [ahead 1]"
        Ok(self.git(&["status", "-sb"])?.contains("[ahead"))
    }

    fn push(&self) -> io::Result<()> {
        self.git(&["push"]).map(|_| ())
    }
}

/// Convenience nudge: when the repo needs operator attention, make sure the
/// GitHub Desktop client is on screen. Windows-only; everywhere else (and on
/// any error at all) this quietly does nothing.
pub fn nudge_desktop_client(repo: &Path) {
    let needs_attention = {
        let git = GitCli::new(repo);
        !git.is_clean().unwrap_or(true) || git.is_ahead().unwrap_or(false)
    };
    if needs_attention {
        launch_desktop_client();
    }
}

#[cfg(target_os = "windows")]
fn launch_desktop_client() {
    let running = Command::new("tasklist")
        .output()
        .map(|o| String::from_utf8_lossy(&o.stdout).contains("GitHubDesktop.exe"))
        .unwrap_or(false);
    if running {
        println!("GitHub Desktop already running.");
        return;
    }

    let user = std::env::var("USERNAME").unwrap_or_default();
    let candidates = [
        format!(r"C:\Users\{user}\AppData\Local\GitHubDesktop\GitHubDesktop.exe"),
        r"C:\Program Files\GitHub Desktop\GitHubDesktop.exe".to_string(),
        r"C:\Program Files (x86)\GitHub Desktop\GitHubDesktop.exe".to_string(),
    ];
    for path in &candidates {
        if Path::new(path).exists() {
            if Command::new(path).spawn().is_ok() {
                println!("Opened GitHub Desktop.");
            }
            return;
        }
    }
    println!("GitHub Desktop not found. Open it manually.");
}

#[cfg(not(target_os = "windows"))]
fn launch_desktop_client() {}

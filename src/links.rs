//! Sidecar storage for a part's Autodesk Viewer share link.
//!
//! The link lives as a single trimmed line in `autodesk.txt` inside the
//! part's output directory. Loading is tolerant (absent file, blank lines);
//! saving is an unconditional overwrite — validation belongs to the caller.

use std::fs;
use std::io;
use std::path::Path;

/// Sidecar filename inside a part's output directory.
pub const LINK_FILE: &str = "autodesk.txt";

/// Accepted share-link prefixes. Case- and scheme-sensitive: exactly the
/// `autode.sk` shortener host, secure or insecure.
pub const VIEWER_LINK_PREFIXES: &[&str] = &["https://autode.sk/", "http://autode.sk/"];

/// `true` when `text` is a valid viewer share link for persistence.
pub fn is_viewer_link(text: &str) -> bool {
    VIEWER_LINK_PREFIXES.iter().any(|p| text.starts_with(p))
}

/// Load the stored link for a part: the first non-blank trimmed line of the
/// sidecar file, or `None` when the file is absent or effectively empty.
pub fn load(output_dir: &Path) -> Option<String> {
    let text = fs::read_to_string(output_dir.join(LINK_FILE)).ok()?;
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_owned)
}

/// Overwrite the stored link for a part.
///
/// Callers validate with [`is_viewer_link`] first; `save` itself writes
/// whatever it is given.
pub fn save(output_dir: &Path, link: &str) -> io::Result<()> {
    fs::write(output_dir.join(LINK_FILE), format!("{}\n", link.trim()))
}

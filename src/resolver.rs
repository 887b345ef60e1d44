//! Source-file resolution: given a working directory, find the authoritative
//! PDF drawing and the optional CAD export for one part.
//!
//! Working directories are author-controlled and messy — draft PDFs,
//! intermediate exports, previously stamped copies. Selection is therefore
//! deliberately simple and auditable: filter by name, then take the most
//! recently modified candidate. No content inspection.

use crate::{PublishError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Name of the conventional export subfolder. When it exists and itself
/// contains a PDF, resolution happens inside it instead of the start
/// directory, so a part's working folder routes to its designated exports.
pub const EXPORT_SUBDIR: &str = "QR";

/// Reserved suffix marking a previously stamped output. Files ending in it
/// are never picked as a stamping source (compared case-insensitively).
pub const STAMPED_SUFFIX: &str = "_qr.pdf";

/// Recognized CAD export extensions (compared case-insensitively).
pub const CAD_EXTENSIONS: &[&str] = &["step", "stp"];

// ── Candidate selection (pure) ───────────────────────────────────────────────

/// One file considered during resolution.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// Pick the most recently modified candidate, or `None` for an empty list.
///
/// Pure so it can be exercised against synthetic candidate lists; ties are
/// broken arbitrarily (two exports in the same instant have no meaningful
/// order anyway).
pub fn newest(candidates: Vec<FileCandidate>) -> Option<PathBuf> {
    candidates
        .into_iter()
        .max_by_key(|c| c.modified)
        .map(|c| c.path)
}

// ── Directory scanning ───────────────────────────────────────────────────────

/// Collect the plain files in `dir` whose (lowercased) name passes `keep`,
/// together with their modification times. Unreadable entries are skipped.
fn candidates_in<F>(dir: &Path, keep: F) -> Vec<FileCandidate>
where
    F: Fn(&str) -> bool,
{
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return Vec::new(),
    };

    let mut out = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n.to_lowercase(),
            None => continue,
        };
        if !keep(&name) {
            continue;
        }
        if let Ok(meta) = entry.metadata() {
            if let Ok(modified) = meta.modified() {
                out.push(FileCandidate { path, modified });
            }
        }
    }
    out
}

fn is_publishable_pdf(name: &str) -> bool {
    name.ends_with(".pdf") && !name.ends_with(STAMPED_SUFFIX)
}

fn is_cad_export(name: &str) -> bool {
    CAD_EXTENSIONS
        .iter()
        .any(|ext| name.ends_with(&format!(".{ext}")))
}

/// The directory actually published from: the `QR` subfolder when it exists
/// and contains at least one PDF, otherwise the start directory itself.
pub fn find_publish_dir(start_dir: &Path) -> PathBuf {
    let qr_dir = start_dir.join(EXPORT_SUBDIR);
    if qr_dir.is_dir() {
        let has_pdf = !candidates_in(&qr_dir, |n| n.ends_with(".pdf")).is_empty();
        if has_pdf {
            return qr_dir;
        }
    }
    start_dir.to_path_buf()
}

/// Newest non-stamped PDF in `dir`, or [`PublishError::NoPdfFound`].
pub fn pick_pdf(dir: &Path) -> Result<PathBuf> {
    newest(candidates_in(dir, is_publishable_pdf))
        .ok_or_else(|| PublishError::NoPdfFound(dir.to_path_buf()))
}

/// Newest CAD export in `dir`; absence is not an error — the CAD copy step
/// is simply skipped downstream.
pub fn pick_cad(dir: &Path) -> Option<PathBuf> {
    newest(candidates_in(dir, is_cad_export))
}

// ── Identity derivation ──────────────────────────────────────────────────────

/// The part identity: the PDF's file stem, verbatim.
///
/// No case or whitespace normalization — the same raw string names the
/// output folder, the artifacts, and the page URL path segment, so altering
/// it anywhere would break the correspondence.
///
/// ```
/// # use std::path::Path;
/// assert_eq!(partpublisher::resolver::part_name(Path::new("/x/PN-1001.pdf")), "PN-1001");
/// ```
pub fn part_name(pdf_path: &Path) -> String {
    pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// ── SourceBundle ─────────────────────────────────────────────────────────────

/// Everything resolution found for one part, resolved fresh on every run.
#[derive(Debug, Clone)]
pub struct SourceBundle {
    /// Directory the files were picked from (start dir or its `QR` subfolder).
    pub dir: PathBuf,
    /// The authoritative drawing to stamp from — always a pristine source,
    /// never a previously stamped output.
    pub pdf: PathBuf,
    /// Optional CAD export copied alongside the drawing.
    pub cad: Option<PathBuf>,
}

/// Resolve the source bundle for a publish run starting at `start_dir`.
pub fn resolve(start_dir: &Path) -> Result<SourceBundle> {
    let dir = find_publish_dir(start_dir);
    let pdf = pick_pdf(&dir)?;
    let cad = pick_cad(&dir);
    Ok(SourceBundle { dir, pdf, cad })
}

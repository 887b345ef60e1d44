//! The publish orchestrator: sequences resolution, QR generation, stamping,
//! CAD copying, viewer-link upkeep, and page rendering for one part.
//!
//! Every write is an overwrite keyed by the part identity, so a failed run
//! needs no rollback — the next run simply overwrites whatever landed.

use crate::interact::Interact;
use crate::{links, page, resolver, stamper, warn};
use crate::{PublishConfig, PublishError, QrGenerator, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// What one successful publish run produced.
#[derive(Debug, Clone)]
pub struct PublishOutcome {
    /// The part identity everything is keyed by.
    pub part: String,
    /// Public page URL (identical to what the QR encodes).
    pub page_url: String,
    /// Directory the sources were resolved from.
    pub source_dir: PathBuf,
    /// Output directory under the publish root.
    pub output_dir: PathBuf,
    /// The stamped `<part>.pdf` inside the output directory.
    pub stamped_pdf: PathBuf,
    /// Stable-named CAD copy, when a CAD export was found.
    pub cad_copy: Option<PathBuf>,
    /// Viewer link embedded in the rendered page, when one is stored.
    pub viewer_link: Option<String>,
}

/// Entry point for the whole pipeline.
///
/// ```no_run
/// use partpublisher::{PublishConfig, Publisher};
/// use partpublisher::interact::Console;
///
/// # fn main() -> partpublisher::Result<()> {
/// let publisher = Publisher::new(PublishConfig::new("/srv/shop-library"));
/// let outcome = publisher.publish("/work/PN-1001".as_ref(), &mut Console)?;
/// println!("Page URL: {}", outcome.page_url);
/// # Ok(())
/// # }
/// ```
pub struct Publisher {
    config: PublishConfig,
}

impl Publisher {
    pub fn new(config: PublishConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PublishConfig {
        &self.config
    }

    /// Publish the part found under `start_dir`.
    ///
    /// Fatal conditions (no PDF, zero-page PDF, missing template) propagate;
    /// everything downstream of a successful stamp is best-effort and
    /// recoverable on the next run.
    pub fn publish(&self, start_dir: &Path, interact: &mut dyn Interact) -> Result<PublishOutcome> {
        let bundle = resolver::resolve(start_dir)?;
        let part = resolver::part_name(&bundle.pdf);
        let output_dir = self.config.output_dir(&part);
        fs::create_dir_all(&output_dir)?;

        println!("SOURCE : {}", bundle.dir.display());
        println!("TARGET : {}", output_dir.display());
        println!("PART   : {part}");

        let cad_copy = self.copy_cad(&bundle.cad, &output_dir, &part);

        let qr_png = QrGenerator::new(&self.config).ensure(&output_dir, &part)?;

        // Always stamp from the freshly resolved source, never from a prior
        // output copy — stamping a stamped file would double the QR.
        let stamped_pdf = stamper::stamp(&self.config, &bundle.pdf, &qr_png, &output_dir, &part)?;

        self.copy_back(&bundle.dir, &part, &stamped_pdf, &qr_png);

        let viewer_link = self.refresh_viewer_link(&output_dir, bundle.cad.is_some(), interact);

        self.write_page(&output_dir, &part, viewer_link.as_deref())?;

        Ok(PublishOutcome {
            page_url: self.config.page_url(&part),
            part,
            source_dir: bundle.dir,
            output_dir,
            stamped_pdf,
            cad_copy,
            viewer_link,
        })
    }

    /// Copy the CAD export under its stable name `<part>.<ext>` (extension
    /// lowercased). Absence is only worth a warning.
    fn copy_cad(&self, cad: &Option<PathBuf>, output_dir: &Path, part: &str) -> Option<PathBuf> {
        let src = match cad {
            Some(src) => src,
            None => {
                warn("no STEP file found in source folder (ok if PDF-only)");
                return None;
            }
        };
        let ext = src
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let dst = output_dir.join(format!("{part}.{ext}"));
        match fs::copy(src, &dst) {
            Ok(_) => {
                println!(
                    "Copied STEP -> {}",
                    dst.file_name().unwrap_or_default().to_string_lossy()
                );
                Some(dst)
            }
            Err(e) => {
                warn(&format!("could not copy CAD file: {e}"));
                None
            }
        }
    }

    /// Mirror the stamped PDF and the QR PNG back into the source folder so
    /// the part's working directory carries the published artifacts too.
    ///
    /// The stamped copy lands under the reserved `<part>_QR.pdf` name: the
    /// source folder usually holds the pristine `<part>.pdf`, and resolution
    /// must keep finding that one, never a stamped copy. Best effort; the
    /// publish target already holds the authoritative files.
    fn copy_back(&self, source_dir: &Path, part: &str, stamped_pdf: &Path, qr_png: &Path) {
        let stamped_name = format!("{part}_QR.pdf");
        let qr_name = qr_png.file_name().unwrap_or_default().to_os_string();
        let mut copied = 0;
        // The two mirrors are independent; one failing must not skip the other.
        for (artifact, name) in [
            (stamped_pdf, PathBuf::from(stamped_name)),
            (qr_png, PathBuf::from(qr_name)),
        ] {
            match fs::copy(artifact, source_dir.join(&name)) {
                Ok(_) => copied += 1,
                Err(e) => warn(&format!(
                    "could not copy {} back to source folder: {e}",
                    name.display()
                )),
            }
        }
        if copied == 2 {
            println!("Copied stamped PDF + QR back to: {}", source_dir.display());
        }
    }

    /// Keep the Autodesk Viewer link current.
    ///
    /// Only offered when a CAD export exists (the viewer shows the model,
    /// not the drawing). The operator can decline; with no stored link yet,
    /// the flow runs anyway. Clipboard is tried first, manual paste second;
    /// anything failing the prefix check leaves the previous value in place.
    fn refresh_viewer_link(
        &self,
        output_dir: &Path,
        has_cad: bool,
        interact: &mut dyn Interact,
    ) -> Option<String> {
        let existing = links::load(output_dir);
        if !has_cad {
            return existing;
        }

        let update = interact.ask_yes_no("\nUpdate Autodesk link? (y/n, Enter = no): ");
        if !update && existing.is_some() {
            return existing;
        }
        // Reaching here: a refresh was requested, or no link exists yet —
        // a first publish runs the upload flow even after a decline.
        println!("Opening Autodesk Viewer upload...");
        if !interact.open_browser(&self.config.viewer_upload_url) {
            warn(&format!(
                "could not open a browser; visit {} yourself",
                self.config.viewer_upload_url
            ));
        }
        interact.wait_enter("After you COPY the autode.sk link, press ENTER here...");

        let candidate = interact
            .clipboard_text()
            .filter(|t| links::is_viewer_link(t))
            .unwrap_or_else(|| interact.read_line("Paste the https://autode.sk/... link here: "));

        if !links::is_viewer_link(&candidate) {
            warn("not a valid autode.sk link; keeping previous value");
            return existing;
        }

        let candidate = candidate.trim().to_string();
        match links::save(output_dir, &candidate) {
            Ok(()) => {
                println!("Saved {}", links::LINK_FILE);
                Some(candidate)
            }
            Err(e) => {
                warn(&format!("could not save {}: {e}", links::LINK_FILE));
                existing
            }
        }
    }

    /// Render and write the part's page. A missing template is fatal — the
    /// published folder must never end up without its page.
    fn write_page(&self, output_dir: &Path, part: &str, viewer_link: Option<&str>) -> Result<()> {
        let template = fs::read_to_string(&self.config.template_path)
            .map_err(|_| PublishError::TemplateMissing(self.config.template_path.clone()))?;

        let html = page::render(&template, part, viewer_link, page::cache_token());
        fs::write(output_dir.join("index.html"), html)?;
        println!("Updated index.html");
        Ok(())
    }
}

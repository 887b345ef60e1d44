//! # partpublisher
//!
//! Publishes a manufacturing part's drawing package to a static web page,
//! reachable through a QR code that is also stamped onto the drawing itself.
//!
//! ## What this crate does
//!
//! 1. **Resolve sources** — find the authoritative PDF (and optional STEP
//!    file) in a messy working directory, preferring a `QR` export subfolder.
//! 2. **Derive the part identity** — the PDF's file stem, used verbatim for
//!    the output folder, the page URL, and every artifact name.
//! 3. **Generate the QR code** — a PNG encoding the part's page URL, cached
//!    by existence so republishing never regenerates it.
//! 4. **Stamp the drawing** — composite the QR onto page one of the PDF next
//!    to the title block, leaving every other page untouched.
//! 5. **Render the page** — fill the site template with the part identity, a
//!    cache-busted PDF link, and the optional Autodesk Viewer link.
//!
//! ## Quick example
//!
//! ```no_run
//! use partpublisher::{PublishConfig, Publisher};
//! use partpublisher::interact::Console;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PublishConfig::new("/srv/shop-library");
//! let outcome = Publisher::new(config).publish(".".as_ref(), &mut Console)?;
//! println!("published {} -> {}", outcome.part, outcome.page_url);
//! # Ok(())
//! # }
//! ```

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::path::PathBuf;
use thiserror::Error;

pub mod git;
pub mod interact;
pub mod links;
pub mod page;
pub mod publisher;
pub mod qr;
pub mod resolver;
pub mod stamper;

pub use publisher::{PublishOutcome, Publisher};
pub use qr::QrGenerator;
pub use resolver::SourceBundle;

/// One PostScript point is 1/72 inch; all PDF geometry is in points.
pub const POINTS_PER_INCH: f32 = 72.0;

// ── Configuration ────────────────────────────────────────────────────────────

/// Process-wide settings for one publish run.
///
/// Every component takes this by reference; nothing in the crate reads
/// mutable global state, so tests can substitute fixture values freely.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// Base URL of the published site, with trailing slash
    /// (e.g. `https://lucy-eng123.github.io/shop-library/`).
    pub base_url: String,

    /// Root of the publish target; one subdirectory per part identity is
    /// created under it.
    pub publish_root: PathBuf,

    /// The page template filled in for every part.
    pub template_path: PathBuf,

    /// Physical side length of the stamped QR square, in inches.
    pub qr_size_in: f32,

    /// Distance from the page's left edge to the title block's left edge,
    /// in inches. The QR sits to the left of this anchor.
    pub titleblock_left_in: f32,

    /// Distance from the page's bottom edge to the QR's bottom edge, in inches.
    pub titleblock_bottom_in: f32,

    /// Horizontal clearance between the QR and the title-block anchor, in inches.
    pub gap_in: f32,

    /// Upload page opened in the browser when the operator refreshes the
    /// Autodesk Viewer link.
    pub viewer_upload_url: String,
}

impl PublishConfig {
    /// Build a config for the given publish root with the shop's standard
    /// base URL, QR placement, and `_TEMPLATE/index.html` template location.
    pub fn new<P: Into<PathBuf>>(publish_root: P) -> Self {
        let publish_root = publish_root.into();
        let template_path = publish_root.join("_TEMPLATE").join("index.html");
        Self {
            base_url: "https://lucy-eng123.github.io/shop-library/".into(),
            publish_root,
            template_path,
            qr_size_in: 1.25,
            titleblock_left_in: 11.75,
            titleblock_bottom_in: 0.40,
            gap_in: 0.10,
            viewer_upload_url: "https://viewer.autodesk.com/".into(),
        }
    }

    /// Public page URL for a part: `base_url` + url-encoded identity + `/`.
    ///
    /// This exact string is what the QR image encodes — the two must never
    /// be computed independently.
    ///
    /// ```
    /// # use partpublisher::PublishConfig;
    /// let cfg = PublishConfig::new("/tmp/x");
    /// assert_eq!(
    ///     cfg.page_url("PN-1001 rev B"),
    ///     "https://lucy-eng123.github.io/shop-library/PN-1001%20rev%20B/"
    /// );
    /// ```
    pub fn page_url(&self, part: &str) -> String {
        format!(
            "{}/{}/",
            self.base_url.trim_end_matches('/'),
            encode_path_segment(part)
        )
    }

    /// Output directory for a part identity (not created here).
    pub fn output_dir(&self, part: &str) -> PathBuf {
        self.publish_root.join(part)
    }
}

/// Characters escaped when a part identity becomes a URL path segment.
/// Matches Python's `urllib.parse.quote` defaults: alphanumerics and
/// `/ - _ . ~` pass through, everything else is percent-encoded.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode a part identity for use inside a URL. The identity string
/// itself is never altered; encoding happens only at URL-construction time.
pub fn encode_path_segment(part: &str) -> String {
    utf8_percent_encode(part, PATH_SEGMENT).to_string()
}

// ── Error type ───────────────────────────────────────────────────────────────

/// Every error that this crate can produce.
#[derive(Error, Debug)]
pub enum PublishError {
    /// A filesystem I/O error occurred (e.g. when copying or writing a file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The resolved source directory contains no publishable PDF. Fatal for
    /// the run — there is nothing to derive an identity from.
    #[error("no publishable PDF found in '{}'", .0.display())]
    NoPdfFound(PathBuf),

    /// The source PDF parsed but has no pages to stamp.
    #[error("source PDF has no pages: '{}'", .0.display())]
    EmptyPdf(PathBuf),

    /// The first page declares no usable `/MediaBox`, so its dimensions —
    /// and therefore the stamp placement — cannot be established.
    #[error("first page of '{}' has no usable /MediaBox", .0.display())]
    MissingMediaBox(PathBuf),

    /// The page template file is missing; publishing cannot finish without it.
    #[error("page template not found: '{}'", .0.display())]
    TemplateMissing(PathBuf),

    /// The underlying lopdf parser or writer returned an error.
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// The page URL could not be encoded as a QR symbol.
    #[error("QR encoding error: {0}")]
    Qr(#[from] qrcode::types::QrError),

    /// The QR image could not be encoded or decoded as a PNG.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, PublishError>;

/// Crate-prefixed warning print, used for recoverable conditions the
/// operator should see but which never abort a run.
pub(crate) fn warn(message: &str) {
    eprintln!("partpublisher: warning: {message}");
}

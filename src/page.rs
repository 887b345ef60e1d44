//! Renders the per-part page from the site template.
//!
//! Pure text transform — reading the template and writing the result are the
//! orchestrator's job. Each substitution touches only the *first* occurrence
//! its pattern finds, which is the template contract: one `<title>`, one
//! `<h1>`, one PDF link, and optionally one viewer link placeholder.

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use std::time::{SystemTime, UNIX_EPOCH};

static TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<title>.*?</title>").unwrap());
static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<h1>.*?</h1>").unwrap());
static PDF_HREF: Lazy<Regex> = Lazy::new(|| Regex::new(r#"href="[^"]+\.pdf[^"]*""#).unwrap());
static VIEWER_HREF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"href="https://autode\.sk/[^"]+""#).unwrap());

/// Fill the template for one part.
///
/// * `<title>` and `<h1>` bodies become the part identity, verbatim.
/// * The first `.pdf` hyperlink becomes `<part>.pdf?v=<cache_token>` so
///   consumers never see a stale cached PDF behind an unchanged URL.
/// * With `viewer_link` present, the first `autode.sk` hyperlink is replaced;
///   otherwise the template's placeholder stays untouched.
pub fn render(template: &str, part: &str, viewer_link: Option<&str>, cache_token: u64) -> String {
    let html = TITLE.replacen(template, 1, NoExpand(&format!("<title>{part}</title>")));
    let html = HEADING.replacen(&html, 1, NoExpand(&format!("<h1>{part}</h1>")));

    let pdf_href = format!(r#"href="{part}.pdf?v={cache_token}""#);
    let html = PDF_HREF.replacen(&html, 1, NoExpand(&pdf_href));

    match viewer_link {
        Some(link) => VIEWER_HREF
            .replacen(&html, 1, NoExpand(&format!(r#"href="{link}""#)))
            .into_owned(),
        None => html.into_owned(),
    }
}

/// Cache-busting token for the PDF link: seconds since the Unix epoch.
/// Non-decreasing across regenerations; two republishes inside one second
/// share a token, which is fine — a human-operated run never outpaces that.
pub fn cache_token() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

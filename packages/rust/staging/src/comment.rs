//! Preview comment body rendering.

use stagehand_shared::PresentedUrlMap;

/// Render the preview comment body for a successful build.
///
/// Singular phrasing when exactly one URL was resolved, a per-root list
/// otherwise. Roots that resolved to zero URLs are listed as staged but not
/// yet mounted so reviewers know the submission happened.
pub fn for_successful_build(urls: &PresentedUrlMap) -> String {
    let total: usize = urls.values().map(Vec::len).sum();

    if total == 1 {
        if let Some(url) = urls.values().flatten().next() {
            return format!("Your content preview is ready to view at {url}.");
        }
    }

    let mut body = String::from("Your content previews are ready:\n");
    for (root, root_urls) in urls {
        if root_urls.is_empty() {
            body.push_str(&format!("\n- **{root}** — staged, not yet mounted"));
        } else {
            for url in root_urls {
                body.push_str(&format!("\n- **{root}** — {url}"));
            }
        }
    }
    body
}

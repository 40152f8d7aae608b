//! Parses "add link" deep links such as `?add_url=...&add_title=...`.

use url::form_urlencoded;

use crate::types::link::LinkDraft;

/// Builds a draft from a query string (with or without the leading `?`).
///
/// Returns `None` when `add_url` is missing or blank. The title falls back to
/// the URL's host, then to the URL itself.
pub fn parse_add_link(query: &str, category_id: &str) -> Option<LinkDraft> {
    let query = query.trim().trim_start_matches('?');
    let mut add_url = None;
    let mut add_title = None;
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "add_url" => add_url = Some(value.trim().to_string()),
            "add_title" => add_title = Some(value.trim().to_string()),
            _ => {}
        }
    }

    let url = add_url.filter(|u| !u.is_empty())?;
    let title = add_title.filter(|t| !t.is_empty()).unwrap_or_else(|| {
        url::Url::parse(&url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| url.clone())
    });

    Some(LinkDraft {
        title,
        url,
        category_id: category_id.to_string(),
        ..LinkDraft::default()
    })
}

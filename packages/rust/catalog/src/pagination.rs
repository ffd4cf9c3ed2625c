//! Minimal parser for RFC 8288 `Link` response headers.
//!
//! The source catalog paginates via `Link: <url>; rel="next"`. We only
//! ever need the `next` relation, so this stays deliberately small.

/// Extract the `rel="next"` target URL from a `Link` header value.
///
/// Returns `None` when the header carries no `next` relation, which is
/// how the catalog signals the last page.
pub fn next_link(header: &str) -> Option<String> {
    for part in header.split(',') {
        let mut segments = part.split(';');

        let target = segments.next()?.trim();
        let target = target.strip_prefix('<')?.strip_suffix('>')?;

        for param in segments {
            let (name, value) = match param.split_once('=') {
                Some(pair) => pair,
                None => continue,
            };
            if !name.trim().eq_ignore_ascii_case("rel") {
                continue;
            }
            let value = value.trim().trim_matches('"');
            // A rel value is a whitespace-separated list of relation types.
            if value.split_ascii_whitespace().any(|rel| rel.eq_ignore_ascii_case("next")) {
                return Some(target.to_string());
            }
        }
    }
    None
}

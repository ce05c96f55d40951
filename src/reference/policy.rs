//! Embedding policy of remote documents
//!
//! The viewer is never the same origin as a remote site, so any restriction
//! other than an explicit wildcard refuses embedding.

/// Decide whether a response may be shown inside the viewer
///
/// A CSP `frame-ancestors` directive takes precedence over
/// `X-Frame-Options`, matching browser behavior.
pub fn allows_embedding(x_frame_options: Option<&str>, content_security_policy: Option<&str>) -> bool {
    if let Some(sources) = content_security_policy.and_then(frame_ancestors) {
        return sources.iter().any(|s| *s == "*");
    }

    match x_frame_options.map(|v| v.trim().to_ascii_uppercase()) {
        Some(v) if v == "DENY" || v == "SAMEORIGIN" => false,
        _ => true,
    }
}

/// Sources of the first `frame-ancestors` directive, if any
fn frame_ancestors(csp: &str) -> Option<Vec<&str>> {
    csp.split([',', ';'])
        .map(str::trim)
        .find_map(|directive| {
            let mut parts = directive.split_whitespace();
            let name = parts.next()?;
            if name.eq_ignore_ascii_case("frame-ancestors") {
                Some(parts.collect())
            } else {
                None
            }
        })
}

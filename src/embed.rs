//! Embed source resolution
//!
//! Turns a requested video URL (query parameter or path remainder) into the
//! `src` of the player iframe, and builds the cache keys those sources are
//! stored under.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Cache namespace for `/api/embed.js?url=...`
pub const QUERY_KEY_PREFIX: &str = "embed:query:";

/// Cache namespace for `/embed/{id}`
pub const PATH_KEY_PREFIX: &str = "embed:";

/// Characters left alone by JavaScript's `encodeURIComponent`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn query_cache_key(url: &str) -> String {
    format!("{}{}", QUERY_KEY_PREFIX, url)
}

pub fn path_cache_key(id: &str) -> String {
    format!("{}{}", PATH_KEY_PREFIX, id)
}

/// Upgrade a leading `http://` to `https://`
pub fn force_https(url: &str) -> String {
    match url.strip_prefix("http://") {
        Some(rest) => format!("https://{}", rest),
        None => url.to_string(),
    }
}

/// Normalized source for a `?url=` request
pub fn resolve_query_source(url: &str) -> String {
    force_https(url)
}

/// Normalized source for an `/embed/{id}` request. `id` is the raw path
/// remainder, still percent-encoded.
pub fn resolve_path_source(id: &str) -> String {
    force_https(&decode_path_id(id))
}

/// Percent-decode `id` when it looks encoded. Falls back to the raw id when
/// any escape is malformed or the decoded bytes are not UTF-8.
pub fn decode_path_id(id: &str) -> String {
    if !id.contains('%') || has_malformed_escape(id) {
        return id.to_string();
    }

    match percent_decode_str(id).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => id.to_string(),
    }
}

/// True when some `%` is not followed by two hex digits
fn has_malformed_escape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        b == b'%'
            && !matches!(
                (bytes.get(i + 1), bytes.get(i + 2)),
                (Some(hi), Some(lo)) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit()
            )
    })
}

/// Append `autoplay=1` / `muted=1` to the iframe source
pub fn with_player_params(src: &str, autoplay: bool, muted: bool) -> String {
    let mut params = Vec::new();
    if autoplay {
        params.push("autoplay=1");
    }
    if muted {
        params.push("muted=1");
    }

    if params.is_empty() {
        return src.to_string();
    }

    let separator = if src.contains('?') { '&' } else { '?' };
    format!("{}{}{}", src, separator, params.join("&"))
}

/// Same escaping as JavaScript's `encodeURIComponent`
pub fn encode_uri_component(s: &str) -> String {
    utf8_percent_encode(s, URI_COMPONENT).to_string()
}

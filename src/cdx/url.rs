// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! URL key canonicalization.
//!
//! Captures of the same resource must share one URL key so they sort next to
//! each other. The key drops the scheme, userinfo, default ports, `www`
//! prefixes and the fragment. Parsing and host normalization (case, IDNA)
//! come from the `url` crate; path and query keep their parsed form.

use url::Url;

/// Returns the canonical URL key for `url`.
///
/// Input without a scheme is read as `http`. Input that does not parse as a
/// URL with a host is returned trimmed and unchanged.
///
/// ```
/// use cdxdb::cdx::url_key;
///
/// assert_eq!(url_key("http://WWW.Example.org:80/a?b=1#top"), "example.org/a?b=1");
/// assert_eq!(url_key("https://www2.example.org"), "example.org/");
/// ```
pub fn url_key(url: &str) -> String {
    let url = url.trim();
    let Some(parsed) = parse_with_host(url) else {
        return url.to_string();
    };
    let host = parsed.host_str().unwrap_or_default();

    let host = strip_www(host);
    let mut key = String::with_capacity(url.len());
    key.push_str(host);
    if let Some(port) = parsed.port() {
        key.push(':');
        key.push_str(&port.to_string());
    }
    if !parsed.path().starts_with('/') {
        key.push('/');
    }
    key.push_str(parsed.path());
    if let Some(query) = parsed.query() {
        key.push('?');
        key.push_str(query);
    }
    key
}

/// Parses `url`, retrying as `http://{url}` when it has no host.
///
/// `example.org:8080/` parses with `example.org` as its scheme, so a hostless
/// parse is retried too.
fn parse_with_host(url: &str) -> Option<Url> {
    match Url::parse(url) {
        Ok(parsed) if parsed.host_str().is_some() => Some(parsed),
        _ => Url::parse(&format!("http://{url}"))
            .ok()
            .filter(|parsed| parsed.host_str().is_some()),
    }
}

/// Strips a leading `www.`, `www1.`, `www2.` ... label.
fn strip_www(host: &str) -> &str {
    let Some(rest) = host.strip_prefix("www") else {
        return host;
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    match rest[digits..].strip_prefix('.') {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => host,
    }
}

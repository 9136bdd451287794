//! Hostname utilities
//!
//! These work directly on string slices and only allocate for the final
//! normalized host.

// =============================================================================
// Host Provider
// =============================================================================

/// Exposes the current page's hostname.
///
/// Evaluated fresh on every scan pass; single-page apps can change the
/// location without reloading the content script.
pub trait HostProvider {
    fn hostname(&self) -> String;
}

impl HostProvider for String {
    fn hostname(&self) -> String {
        normalize_host(self)
    }
}

impl HostProvider for &str {
    fn hostname(&self) -> String {
        normalize_host(self)
    }
}

// =============================================================================
// Scheme / Host Extraction
// =============================================================================

/// Get the position after "://".
#[inline]
pub fn get_scheme_end(url: &str) -> Option<usize> {
    let colon_pos = url.find("://")?;
    let scheme = &url[..colon_pos];
    if scheme.is_empty()
        || !scheme
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'-' || b == b'.')
    {
        return None;
    }
    Some(colon_pos + 3)
}

/// Host portion of a URL or bare host string, as a slice of the input.
///
/// Accepts both `https://user@host:8080/path` and `host/path`.
pub fn extract_host(input: &str) -> &str {
    let start = get_scheme_end(input).unwrap_or(0);
    let rest = &input[start..];

    let authority_end = rest
        .find(|c| c == '/' || c == '?' || c == '#')
        .unwrap_or(rest.len());
    let authority = &rest[..authority_end];

    let host = match authority.rfind('@') {
        Some(at_pos) => &authority[at_pos + 1..],
        None => authority,
    };

    match host.find(':') {
        Some(port_pos) => &host[..port_pos],
        None => host,
    }
}

/// Normalize a hostname for domain list comparison.
///
/// Strips scheme, path, port and a leading `www.` label; lower-cases.
pub fn normalize_host(input: &str) -> String {
    let host = extract_host(input.trim()).trim_end_matches('.');
    let lower = host.to_lowercase();
    match lower.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => lower,
    }
}

// =============================================================================
// Suffix Walk
// =============================================================================

/// Iterator over host suffixes from most to least specific.
///
/// `a.b.example.com` yields `a.b.example.com`, `b.example.com`,
/// `example.com`, `com`.
pub struct HostSuffixIter<'a> {
    current: &'a str,
}

impl<'a> Iterator for HostSuffixIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_empty() {
            return None;
        }
        let result = self.current;
        self.current = match result.find('.') {
            Some(dot) => &result[dot + 1..],
            None => "",
        };
        Some(result)
    }
}

pub fn walk_host_suffixes(host: &str) -> HostSuffixIter<'_> {
    HostSuffixIter { current: host }
}

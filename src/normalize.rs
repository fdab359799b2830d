use std::collections::HashSet;
use url::Url;

/// Structural URL validity check.
///
/// Valid means: parses as a URL, scheme is exactly `http` or `https`, and
/// the host is non-empty. Malformed strings are invalid, not an error.
/// No network access.
pub fn is_valid_url(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https")
                && parsed.host_str().is_some_and(|host| !host.is_empty())
        }
        Err(_) => false,
    }
}

/// Removes session tokens from a URL: a `;jsessionid=...` path suffix and
/// any query parameter whose key contains "session" (case-insensitive).
///
/// When parameters are removed the survivors are re-encoded sorted by key
/// so the result is deterministic; a URL without session markers is
/// returned unchanged. Returns `None` when the string no longer parses as
/// a URL after truncation (the URL is dropped from the set, not an error).
pub fn strip_session_artifacts(raw: &str) -> Option<String> {
    let truncated = match raw.find(";jsessionid=") {
        Some(index) => &raw[..index],
        None => raw,
    };

    if Url::parse(truncated).is_err() {
        ::log::warn!("Failed to parse URL, dropping: {}", truncated);
        return None;
    }

    // Split off the query by hand so URLs without session parameters can be
    // returned byte-identical rather than re-serialized.
    let Some(question) = truncated.find('?') else {
        return Some(truncated.to_string());
    };

    let base = &truncated[..question];
    let rest = &truncated[question + 1..];
    let (query, fragment) = match rest.find('#') {
        Some(hash) => (&rest[..hash], Some(&rest[hash..])),
        None => (rest, None),
    };

    let pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();
    let mut kept: Vec<(String, String)> = pairs
        .iter()
        .filter(|(key, _)| !key.to_lowercase().contains("session"))
        .cloned()
        .collect();

    if kept.len() == pairs.len() {
        return Some(truncated.to_string());
    }

    kept.sort_by(|a, b| a.0.cmp(&b.0));

    let mut result = base.to_string();
    if !kept.is_empty() {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in &kept {
            serializer.append_pair(key, value);
        }
        result.push('?');
        result.push_str(&serializer.finish());
    }
    if let Some(fragment) = fragment {
        result.push_str(fragment);
    }
    Some(result)
}

/// Applies session stripping across a survivor set, dropping URLs that no
/// longer parse.
pub fn strip_session_set(valid_urls: HashSet<String>) -> HashSet<String> {
    valid_urls
        .into_iter()
        .filter_map(|url| strip_session_artifacts(&url))
        .collect()
}

/// Logs a warning for any surviving URL that still mentions "session",
/// which usually means a token encoded somewhere stripping does not reach.
pub fn warn_if_session_remains(valid_urls: &HashSet<String>) {
    for url in valid_urls {
        if url.to_lowercase().contains("session") {
            ::log::warn!("URL still contains 'session': {}", url);
        }
    }
}

use std::collections::BTreeSet;

/// Check whether `filename` ends in one of the allowed extensions.
///
/// The extension is the lowercased text after the last `.`; a name without
/// any `.` is never allowed.
pub fn is_allowed_extension(filename: &str, allowed: &BTreeSet<String>) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => allowed.contains(&ext.to_lowercase()),
        None => false,
    }
}

/// Decode uploaded bytes as UTF-8 text.
///
/// Never fails: invalid sequences are replaced with U+FFFD.
pub fn decode(raw: &[u8]) -> String {
    match std::str::from_utf8(raw) {
        Ok(text) => text.to_string(),
        Err(_) => String::from_utf8_lossy(raw).into_owned(),
    }
}

/// Last path component of a client-supplied filename, for both `/` and `\` separators
pub fn base_name(filename: &str) -> &str {
    let name = filename.rsplit('/').next().unwrap_or(filename);
    name.rsplit('\\').next().unwrap_or(name)
}

/// Human-readable list of allowed extensions: ".txt" or ".md, .txt"
pub fn describe_extensions(allowed: &BTreeSet<String>) -> String {
    allowed
        .iter()
        .map(|ext| format!(".{}", ext))
        .collect::<Vec<_>>()
        .join(", ")
}

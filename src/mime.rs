//! File extension to MIME type lookup, backed by `mime_guess`.

/// Media type for a ledger-reported extension token.
///
/// Unknown extensions become the synthetic `file/<extension>`.
pub fn resolve_ledger_type(extension: &str) -> String {
    let ext = extension.trim().trim_start_matches('.');
    match mime_guess::from_ext(&ext.to_ascii_lowercase()).first() {
        Some(mime) if !ext.is_empty() => mime.essence_str().to_string(),
        _ => format!("file/{}", ext),
    }
}

/// Media type for a local filename, falling back to `application/octet-stream`.
pub fn guess_for_filename(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Extension after the last dot, if the name has a non-empty one.
pub fn extension_of(name: &str) -> Option<&str> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext)
}

/// Split `"image/png"` into `("image", "png")`.
///
/// A value without a slash is treated as a broad type with an empty subtype.
pub fn split_media_type(media_type: &str) -> (String, String) {
    match media_type.split_once('/') {
        Some((broad, sub)) => (broad.to_string(), sub.to_string()),
        None => (media_type.to_string(), String::new()),
    }
}

/// Rejoin broad and sub types into a media type string.
pub fn join_media_type(broad: &str, sub: &str) -> String {
    if sub.is_empty() {
        broad.to_string()
    } else {
        format!("{}/{}", broad, sub)
    }
}

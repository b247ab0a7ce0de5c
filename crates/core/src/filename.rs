//! Uploaded-filename normalization.
//!
//! The legacy web client submits multipart filenames with each UTF-8
//! byte widened to its own character (latin1 mangling), which garbles
//! non-ASCII names. [`decode_legacy_filename`] undoes that, and
//! [`sanitize_file_name`] strips any path components so an uploaded name
//! can never escape the session directory.

/// Fallback name when sanitization leaves nothing usable.
const FALLBACK_FILE_NAME: &str = "file";

/// Reinterpret a latin1-mangled multipart filename as UTF-8.
///
/// Only applies when every char fits in a single byte and the byte
/// sequence is valid UTF-8; anything else is returned unchanged, so
/// correctly-encoded names pass through.
pub fn decode_legacy_filename(raw: &str) -> String {
    if raw.is_empty() || raw.chars().any(|c| (c as u32) > 0xFF) {
        return raw.to_string();
    }
    let bytes: Vec<u8> = raw.chars().map(|c| c as u8).collect();
    String::from_utf8(bytes).unwrap_or_else(|_| raw.to_string())
}

/// Reduce a client-supplied filename to a safe basename.
///
/// Takes the component after the last `/` or `\`, and rejects names that
/// are empty or pure dot sequences.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name)
        .trim();
    if base.is_empty() || base.chars().all(|c| c == '.') {
        FALLBACK_FILE_NAME.to_string()
    } else {
        base.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

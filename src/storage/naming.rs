//! Stored file naming.
//!
//! Client file names are reduced to `[A-Za-z0-9_.-]`, so a stored name can
//! never contain a path separator and the storage directory stays flat.
//! Collisions are resolved by numbering: `clip.mp4`, `clip-1.mp4`,
//! `clip-2.mp4`, ...

use super::MAX_FILE_NAME_LENGTH;

/// Stem used when nothing of the client file name survives sanitization.
const FALLBACK_STEM: &str = "video";

/// Extensions longer than this are treated as part of the stem when truncating.
const MAX_EXTENSION_LENGTH: usize = 16;

/// Reduce a client-supplied file name to a safe stored name.
///
/// Only the final path component is kept, characters outside
/// `[A-Za-z0-9_.-]` are removed, and leading/trailing dots are trimmed.
/// The result may be empty.
pub fn sanitize_file_name(original: &str) -> String {
    filter_component(original).trim_matches('.').to_string()
}

/// Last path component of `original`, reduced to `[A-Za-z0-9_.-]`.
fn filter_component(original: &str) -> String {
    let base = original
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or("");

    base.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect()
}

/// Build the preferred stored name for an upload.
///
/// Falls back to `video.<ext>` when the client name sanitizes to nothing
/// (extension derived from `mime`) or when only its extension survives
/// (`"視聴.mp4"` becomes `"video.mp4"`). Overly long names are truncated
/// while keeping the extension.
pub fn stored_name_for(original: &str, mime: Option<&str>) -> String {
    let filtered = filter_component(original);
    let sanitized = filtered.trim_matches('.');

    let name = if sanitized.is_empty() {
        match mime.and_then(extension_for_mime) {
            Some(ext) => format!("{FALLBACK_STEM}.{ext}"),
            None => FALLBACK_STEM.to_string(),
        }
    } else if filtered.starts_with('.') && !sanitized.contains('.') {
        format!("{FALLBACK_STEM}.{sanitized}")
    } else {
        sanitized.to_string()
    };

    truncate_name(&name)
}

/// The `n`-th collision candidate for `name`; `n == 0` is the name itself.
pub fn numbered_name(name: &str, n: u32) -> String {
    if n == 0 {
        return name.to_string();
    }
    let (stem, ext) = split_name(name);
    format!("{stem}-{n}{ext}")
}

/// Whether `name` may address a file directly inside the storage directory.
///
/// This admits any single path component that is not hidden, so files placed
/// in the directory by other means remain deletable.
pub fn is_valid_stored_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 255
        && !name.starts_with('.')
        && !name.contains(|c: char| c == '/' || c == '\\' || c == '\0')
}

/// Split into stem and extension; the extension keeps its leading dot.
fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx + 1 < name.len() => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    }
}

fn truncate_name(name: &str) -> String {
    if name.len() <= MAX_FILE_NAME_LENGTH {
        return name.to_string();
    }

    let (stem, ext) = split_name(name);
    if ext.len() > MAX_EXTENSION_LENGTH {
        return name[..MAX_FILE_NAME_LENGTH].to_string();
    }

    let keep = MAX_FILE_NAME_LENGTH - ext.len();
    format!("{}{ext}", &stem[..keep.min(stem.len())])
}

fn extension_for_mime(mime: &str) -> Option<&'static str> {
    mime_guess::get_mime_extensions_str(mime).and_then(|exts| exts.first().copied())
}

//! Request path to filesystem path mapping.

use percent_encoding::percent_decode_str;
use std::path::PathBuf;

/// Lexically normalize a slash-separated path.
///
/// Collapses repeated separators, drops `.` elements, and resolves `..`
/// against the preceding element. `..` at the root of a rooted path is
/// dropped. The empty path becomes `.`.
pub fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !rooted {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    if rooted {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Map a raw (percent-encoded) request path below `base`.
///
/// The request path is cleaned as a rooted path before joining, so the
/// result never climbs above `base`. Returns `None` if the path does not
/// decode to UTF-8.
pub fn resolve(base: &str, raw_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(raw_path).decode_utf8().ok()?;
    let confined = clean_path(&format!("/{decoded}"));
    Some(PathBuf::from(clean_path(&format!("{base}{confined}"))))
}

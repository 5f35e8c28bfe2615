use lazy_static::lazy_static;
use regex::Regex;

use crate::shared::constants::DEFAULT_UPLOAD_NAME;

lazy_static! {
    /// Characters that never survive into a stored filename
    pub static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9_.-]").unwrap();
}

/// Reduce a client-supplied filename to something safe to store on disk.
///
/// Non-ASCII characters are dropped, path separators and whitespace runs
/// become `_`, anything outside `[A-Za-z0-9_.-]` is removed and leading or
/// trailing dots/underscores are trimmed, so the result can never name a
/// parent directory or a hidden file.
/// - `"../../etc/passwd"` -> `"etc_passwd"`
/// - `"photo (1).jpg"` -> `"photo_1.jpg"`
pub fn sanitize_filename(raw: &str) -> String {
    let ascii: String = raw
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(&joined, "");
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        DEFAULT_UPLOAD_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_safe_names() {
        assert_eq!(sanitize_filename("trash.jpg"), "trash.jpg");
        assert_eq!(sanitize_filename("IMG_2024-01.PNG"), "IMG_2024-01.PNG");
    }

    #[test]
    fn test_sanitize_strips_traversal() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(sanitize_filename("..\\windows\\win.ini"), "windows_win.ini");
        assert_eq!(sanitize_filename("/abs/path.png"), "abs_path.png");
    }

    #[test]
    fn test_sanitize_whitespace_and_symbols() {
        assert_eq!(sanitize_filename("My cool  photo.jpg"), "My_cool_photo.jpg");
        assert_eq!(sanitize_filename("photo (1).jpg"), "photo_1.jpg");
        assert_eq!(sanitize_filename("a;rm -rf*.jpg"), "arm_-rf.jpg");
    }

    #[test]
    fn test_sanitize_drops_non_ascii() {
        assert_eq!(sanitize_filename("héllo wörld.jpg"), "hllo_wrld.jpg");
    }

    #[test]
    fn test_sanitize_empty_result_gets_default() {
        assert_eq!(sanitize_filename(""), DEFAULT_UPLOAD_NAME);
        assert_eq!(sanitize_filename("...."), DEFAULT_UPLOAD_NAME);
        assert_eq!(sanitize_filename("日本"), DEFAULT_UPLOAD_NAME);
    }

    #[test]
    fn test_sanitize_hidden_file() {
        assert_eq!(sanitize_filename(".env"), "env");
    }
}

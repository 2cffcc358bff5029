//! File and object naming.
//!
//! Three conventions meet here:
//! - Re-encoded images keep their base name and take the new extension:
//!   `IMG_0042.HEIC.png` → `IMG_0042.HEIC.jpg`.
//! - Upload names are restricted to `[A-Za-z0-9.-]`; everything else
//!   becomes `_`, so keys are safe in URLs: `駅前 (1).jpg` → `____1_.jpg`.
//! - Object keys are `<prefix>/<millis>-<name>`, which keeps repeated
//!   uploads of the same file name apart.

/// Replace the last extension of `name` (if any) with `ext`.
///
/// - `"photo.png"` → `"photo.jpg"`
/// - `"archive.tar.gz"` → `"archive.tar.jpg"`
/// - `"noext"` → `"noext.jpg"`
/// - `".hidden"` → `".hidden.jpg"` (a leading dot is not an extension)
pub fn with_extension(name: &str, ext: &str) -> String {
    let stem = match name.rfind('.') {
        Some(pos) if pos > 0 => &name[..pos],
        _ => name,
    };
    format!("{stem}.{ext}")
}

/// Make a file name safe to use in an object key.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Build the storage key for an upload.
pub fn object_key(prefix: &str, millis: i64, filename: &str) -> String {
    let name = sanitize_filename(filename);
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("{millis}-{name}")
    } else {
        format!("{prefix}/{millis}-{name}")
    }
}

/// Join a public base URL and a key with exactly one slash.
pub fn public_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key.trim_start_matches('/'))
}

/// Disambiguate a repeated output name: `photo.jpg`, 2 → `photo-2.jpg`.
pub fn numbered(name: &str, n: usize) -> String {
    match name.rfind('.') {
        Some(pos) if pos > 0 => format!("{}-{}{}", &name[..pos], n, &name[pos..]),
        _ => format!("{name}-{n}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_replaced() {
        assert_eq!(with_extension("photo.png", "jpg"), "photo.jpg");
    }

    #[test]
    fn only_last_extension_replaced() {
        assert_eq!(with_extension("archive.tar.gz", "jpg"), "archive.tar.jpg");
    }

    #[test]
    fn extension_added_when_missing() {
        assert_eq!(with_extension("noext", "jpg"), "noext.jpg");
    }

    #[test]
    fn leading_dot_is_not_extension() {
        assert_eq!(with_extension(".hidden", "jpg"), ".hidden.jpg");
    }

    #[test]
    fn sanitize_keeps_safe_characters() {
        assert_eq!(sanitize_filename("IMG-0042.v2.jpg"), "IMG-0042.v2.jpg");
    }

    #[test]
    fn sanitize_replaces_spaces_and_non_ascii() {
        assert_eq!(sanitize_filename("駅前 (1).jpg"), "____1_.jpg");
        assert_eq!(sanitize_filename("a/b\\c.jpg"), "a_b_c.jpg");
    }

    #[test]
    fn object_key_with_prefix() {
        assert_eq!(
            object_key("spots", 1_700_000_000_000, "my photo.jpg"),
            "spots/1700000000000-my_photo.jpg"
        );
    }

    #[test]
    fn object_key_strips_prefix_slashes() {
        assert_eq!(object_key("/spots/", 5, "a.jpg"), "spots/5-a.jpg");
        assert_eq!(object_key("", 5, "a.jpg"), "5-a.jpg");
    }

    #[test]
    fn public_url_single_slash() {
        assert_eq!(
            public_url("https://cdn.example.com/", "/spots/1-a.jpg"),
            "https://cdn.example.com/spots/1-a.jpg"
        );
        assert_eq!(public_url("", "spots/1-a.jpg"), "/spots/1-a.jpg");
    }

    #[test]
    fn numbered_inserts_before_extension() {
        assert_eq!(numbered("photo.jpg", 2), "photo-2.jpg");
        assert_eq!(numbered("noext", 3), "noext-3");
        assert_eq!(numbered(".hidden", 2), ".hidden-2");
    }
}

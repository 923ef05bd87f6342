/// Splits a key into (dirname, basename, extension, filename).
///
/// The extension is the substring after the last `.` in the basename; the
/// filename is the basename without that extension. A basename with no `.`
/// has an empty extension and a filename equal to the basename. A top-level
/// key has an empty dirname.
pub fn split_key(key: &str) -> (String, String, String, String) {
    let (dirname, basename) = match key.rsplit_once('/') {
        Some((dir, base)) => (dir.to_string(), base.to_string()),
        None => (String::new(), key.to_string()),
    };

    let (filename, extension) = match basename.rsplit_once('.') {
        Some((stem, ext)) => (stem.to_string(), ext.to_string()),
        None => (basename.clone(), String::new()),
    };

    (dirname, basename, extension, filename)
}

/// Prepends `prefix` to `path` with exactly one separating slash.
pub fn apply_prefix(prefix: &str, path: &str) -> String {
    format!(
        "{}/{}",
        prefix.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Inverse of [`apply_prefix`]: removes a leading `prefix` from `path`.
/// Paths outside the prefix come back unchanged.
pub fn strip_prefix(prefix: &str, path: &str) -> String {
    let prefix = format!("{}/", prefix.trim_end_matches('/'));

    path.strip_prefix(&prefix).unwrap_or(path).to_string()
}

fn is_hex(b: u8) -> bool {
    matches!(b, b'0'..=b'9' | b'a'..=b'f' | b'A'..=b'F')
}

/// Decodes percent-encoded sequences. Malformed sequences pass through as
/// literal bytes; invalid UTF-8 is replaced rather than rejected.
pub fn percent_decode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() && is_hex(bytes[i + 1]) && is_hex(bytes[i + 2]) => {
                let hex = [bytes[i + 1], bytes[i + 2]];
                let s = std::str::from_utf8(&hex).expect("hex digits are ASCII");
                out.push(u8::from_str_radix(s, 16).expect("hex digits validated"));
                i += 3;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Percent-encodes a key for use in a URL path. Slashes stay literal so the
/// key keeps its hierarchy in the URL.
pub fn percent_encode(key: &str) -> String {
    let mut out = String::with_capacity(key.len());

    for b in key.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(b as char);
            }
            b => {
                out.push_str(&format!("%{:02X}", b));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_key() {
        let cases = vec![
            ("docs/report.v2.pdf", ("docs", "report.v2.pdf", "pdf", "report.v2")),
            ("file.txt", ("", "file.txt", "txt", "file")),
            ("file", ("", "file", "", "file")),
            ("a/b/c.tar.gz", ("a/b", "c.tar.gz", "gz", "c.tar")),
            (".hidden", ("", ".hidden", "hidden", "")),
            ("dir/noext", ("dir", "noext", "", "noext")),
        ];

        for (key, (dirname, basename, extension, filename)) in cases {
            let result = split_key(key);
            assert_eq!(result.0, dirname, "failed on `dirname` for case: {}", key);
            assert_eq!(result.1, basename, "failed on `basename` for case: {}", key);
            assert_eq!(result.2, extension, "failed on `extension` for case: {}", key);
            assert_eq!(result.3, filename, "failed on `filename` for case: {}", key);
        }
    }

    #[test]
    fn test_apply_strip_prefix_symmetric() {
        let cases = vec![
            ("https://cdn.example.com", "a/b.txt", "https://cdn.example.com/a/b.txt"),
            ("https://cdn.example.com/", "a/b.txt", "https://cdn.example.com/a/b.txt"),
            ("https://cdn.example.com", "/a/b.txt", "https://cdn.example.com/a/b.txt"),
        ];

        for (prefix, path, expected) in cases {
            let applied = apply_prefix(prefix, path);
            assert_eq!(applied, expected, "failed for case: {} + {}", prefix, path);

            let stripped = strip_prefix(prefix, &applied);
            assert_eq!(
                stripped,
                path.trim_start_matches('/'),
                "failed to strip for case: {} + {}",
                prefix,
                path
            );
        }
    }

    #[test]
    fn test_strip_prefix_outside_path() {
        let result = strip_prefix("https://cdn.example.com", "other/a.txt");
        assert_eq!(result, "other/a.txt");
    }

    #[test]
    fn test_percent_decode() {
        let cases = vec![
            ("a%20b.txt", "a b.txt"),
            ("plain/key.txt", "plain/key.txt"),
            ("%E4%B8%AD.txt", "中.txt"),
            ("100%", "100%"),
            ("%GG", "%GG"),
        ];

        for (raw, expected) in cases {
            let result = percent_decode(raw);
            assert_eq!(result, expected, "failed for case: {}", raw);
        }
    }

    #[test]
    fn test_percent_encode_round_trip() {
        let cases = vec!["a b.txt", "docs/report.v2.pdf", "中文/键.txt", "a+b&c.txt"];

        for key in cases {
            let encoded = percent_encode(key);
            assert!(
                encoded.bytes().all(|b| b.is_ascii() && b != b' '),
                "failed encoding for case: {}",
                key
            );
            assert_eq!(percent_decode(&encoded), key, "failed for case: {}", key);
        }
    }
}

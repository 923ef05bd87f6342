use time::{
    format_description::well_known::{Rfc2822, Rfc3339},
    OffsetDateTime,
};

use crate::{
    model::{
        cos::RawObject,
        fs::{FileRecord, FsError},
    },
    util,
};

/// Parses a last-modified string into epoch seconds. Accepts RFC 3339 and
/// the RFC 2822 date form some client responses carry.
pub fn parse_last_modified(raw: &str) -> Result<i64, FsError> {
    OffsetDateTime::parse(raw, &Rfc3339)
        .or_else(|_| OffsetDateTime::parse(raw, &Rfc2822))
        .map(|dt| dt.unix_timestamp())
        .map_err(|err| FsError::Time {
            message: format!("failed to parse last-modified: {}, {}", raw, err),
        })
}

/// Converts one raw listing entry into the filesystem record shape.
pub fn normalize(raw: &RawObject) -> Result<FileRecord, FsError> {
    let (dirname, basename, extension, filename) = util::path::split_key(&raw.key);

    Ok(FileRecord {
        kind: "file",
        path: raw.key.clone(),
        timestamp: parse_last_modified(&raw.last_modified)?,
        size: raw.size,
        dirname,
        basename,
        extension,
        filename,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_last_modified() {
        let cases = vec![
            ("2024-01-02T03:04:05Z", 1704164645),
            ("2024-01-02T03:04:05.000Z", 1704164645),
            ("Tue, 02 Jan 2024 03:04:05 +0000", 1704164645),
            ("1970-01-01T00:00:00Z", 0),
        ];

        for (raw, expected) in cases {
            let result = parse_last_modified(raw).unwrap();
            assert_eq!(result, expected, "failed for case: {}", raw);
        }
    }

    #[test]
    fn test_parse_last_modified_garbage() {
        assert!(matches!(
            parse_last_modified("yesterday"),
            Err(FsError::Time { .. })
        ));
    }

    #[test]
    fn test_normalize() {
        let raw = RawObject {
            key: "docs/report.v2.pdf".to_string(),
            size: 2048,
            last_modified: "2024-01-02T03:04:05Z".to_string(),
        };

        let record = normalize(&raw).unwrap();

        assert_eq!(record.kind, "file");
        assert_eq!(record.path, "docs/report.v2.pdf");
        assert_eq!(record.timestamp, 1704164645);
        assert_eq!(record.size, 2048);
        assert_eq!(record.dirname, "docs");
        assert_eq!(record.basename, "report.v2.pdf");
        assert_eq!(record.extension, "pdf");
        assert_eq!(record.filename, "report.v2");
    }

    #[test]
    fn test_normalize_top_level_key() {
        let raw = RawObject {
            key: "readme".to_string(),
            size: 0,
            last_modified: "2024-01-02T03:04:05Z".to_string(),
        };

        let record = normalize(&raw).unwrap();

        assert_eq!(record.dirname, "");
        assert_eq!(record.basename, "readme");
        assert_eq!(record.extension, "");
        assert_eq!(record.filename, "readme");
    }
}

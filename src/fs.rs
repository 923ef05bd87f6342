use std::io::{Cursor, Read};

use time::{macros::format_description, OffsetDateTime, UtcOffset};
use tracing::debug;

use crate::{
    adapters, meta,
    model::{
        cos::HeadMeta,
        fs::{FileRecord, FsError},
    },
    region, util,
    visibility::Visibility,
};

/// Name of the zero-byte object written to materialize an empty directory.
pub const DIR_MARKER: &str = "_blank";

/// Static adapter configuration. `region` is the short alias, resolved
/// once at construction; `cdn` is an alternate public base URL.
#[derive(Clone, Debug)]
pub struct Config {
    pub bucket: String,
    pub app_id: String,
    pub region: String,
    pub cdn: Option<String>,
}

/// The filesystem operation set this adapter satisfies.
///
/// Every method is one synchronous round trip to the storage service
/// (`rename` and `delete_dir` take two). Absent keys surface as `Ok(false)`
/// or `Ok(None)` where documented; every other service failure propagates
/// unchanged.
pub trait Filesystem {
    fn write(&self, path: &str, contents: &[u8]) -> Result<(), FsError>;

    /// Buffers the whole stream into memory, then uploads it as one body.
    fn write_stream(&self, path: &str, stream: &mut dyn Read) -> Result<(), FsError>;

    fn update(&self, path: &str, contents: &[u8]) -> Result<(), FsError>;

    fn update_stream(&self, path: &str, stream: &mut dyn Read) -> Result<(), FsError>;

    /// Server-side copy to `to`, then delete of `from`. A failed delete is
    /// an error: the copy alone does not make a rename.
    fn rename(&self, from: &str, to: &str) -> Result<(), FsError>;

    fn copy(&self, from: &str, to: &str) -> Result<(), FsError>;

    fn delete(&self, path: &str) -> Result<(), FsError>;

    /// Lists the directory one level deep, then issues one batch delete for
    /// the returned keys. Not transactional; see the crate docs.
    fn delete_dir(&self, dirname: &str) -> Result<(), FsError>;

    fn create_dir(&self, dirname: &str) -> Result<(), FsError>;

    fn set_visibility(&self, path: &str, visibility: Visibility) -> Result<(), FsError>;

    fn get_visibility(&self, path: &str) -> Result<Visibility, FsError>;

    fn has(&self, path: &str) -> Result<bool, FsError>;

    fn read(&self, path: &str) -> Result<Option<Vec<u8>>, FsError>;

    fn read_stream(&self, path: &str) -> Result<Option<Box<dyn Read>>, FsError>;

    /// One page of listing entries, in service order. `recursive` scans the
    /// whole prefix; otherwise only one level is returned.
    fn list_contents(&self, directory: &str, recursive: bool)
        -> Result<Vec<FileRecord>, FsError>;

    fn get_metadata(&self, path: &str) -> Result<Option<HeadMeta>, FsError>;

    /// `Ok(None)` when the head succeeded but carried no content length.
    fn get_size(&self, path: &str) -> Result<Option<u64>, FsError>;

    fn get_mimetype(&self, path: &str) -> Result<Option<String>, FsError>;

    fn get_timestamp(&self, path: &str) -> Result<Option<i64>, FsError>;
}

/// Filesystem adapter over a COS bucket. Holds no per-call mutable state;
/// ordering between concurrent calls is the service's concern.
pub struct CosFS {
    client: Box<dyn adapters::ObjectClient>,
    bucket: String,
    app_id: String,
    region: &'static str,
    cdn: Option<String>,
}

impl CosFS {
    pub fn new(
        client: Box<dyn adapters::ObjectClient>,
        config: Config,
    ) -> Result<Self, FsError> {
        let region = region::resolve(&config.region)?;

        Ok(Self {
            client,
            bucket: config.bucket,
            app_id: config.app_id,
            region,
            cdn: config.cdn.filter(|cdn| !cdn.is_empty()),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Canonical region identifier.
    pub fn region(&self) -> &str {
        self.region
    }

    /// The bucket name as it appears on the wire: `<bucket>-<app_id>`.
    fn wire_bucket(&self) -> String {
        format!("{}-{}", self.bucket, self.app_id)
    }

    /// Fully-qualified source locator for server-side copies. Not a
    /// fetchable URL.
    pub fn source_path(&self, path: &str) -> String {
        format!(
            "{}.cos.{}.myqcloud.com/{}",
            self.wire_bucket(),
            self.region,
            path
        )
    }

    /// Public URL for `path`: the CDN prefix when one is configured,
    /// otherwise the client's native URL with percent-encoding restored to
    /// a literal path.
    pub fn url(&self, path: &str) -> Result<String, FsError> {
        if let Some(cdn) = &self.cdn {
            return Ok(util::path::apply_prefix(cdn, path));
        }

        let raw = self.client.fs_object_url(&self.wire_bucket(), path, None)?;

        Ok(util::path::percent_decode(&raw))
    }

    /// Signed URL valid until `expires_at`. Constructed on demand, never
    /// cached.
    pub fn temporary_url(
        &self,
        path: &str,
        expires_at: OffsetDateTime,
    ) -> Result<String, FsError> {
        let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
        let expires = expires_at
            .to_offset(UtcOffset::UTC)
            .format(&format)
            .map_err(|err| FsError::Time {
                message: format!("failed to format expiration, {}", err),
            })?;

        let raw = self
            .client
            .fs_object_url(&self.wire_bucket(), path, Some(&expires))?;

        Ok(util::path::percent_decode(&raw))
    }

    fn list_prefix(directory: &str) -> String {
        if directory.is_empty() {
            String::new()
        } else {
            format!("{}/", directory.trim_end_matches('/'))
        }
    }
}

impl Filesystem for CosFS {
    fn write(&self, path: &str, contents: &[u8]) -> Result<(), FsError> {
        debug!(path, "write");

        self.client
            .fs_upload(&self.wire_bucket(), path, contents.to_vec())
    }

    fn write_stream(&self, path: &str, stream: &mut dyn Read) -> Result<(), FsError> {
        debug!(path, "write_stream");

        let mut contents = Vec::new();
        stream
            .read_to_end(&mut contents)
            .map_err(|err| FsError::Service {
                message: format!("failed to read stream for: {}, {}", path, err),
            })?;

        self.client.fs_upload(&self.wire_bucket(), path, contents)
    }

    fn update(&self, path: &str, contents: &[u8]) -> Result<(), FsError> {
        self.write(path, contents)
    }

    fn update_stream(&self, path: &str, stream: &mut dyn Read) -> Result<(), FsError> {
        self.write_stream(path, stream)
    }

    fn rename(&self, from: &str, to: &str) -> Result<(), FsError> {
        debug!(from, to, "rename");

        self.client
            .fs_copy_object(&self.wire_bucket(), to, &self.source_path(from))?;

        self.client.fs_delete_object(&self.wire_bucket(), from)
    }

    fn copy(&self, from: &str, to: &str) -> Result<(), FsError> {
        debug!(from, to, "copy");

        self.client
            .fs_copy_object(&self.wire_bucket(), to, &self.source_path(from))
    }

    fn delete(&self, path: &str) -> Result<(), FsError> {
        debug!(path, "delete");

        self.client.fs_delete_object(&self.wire_bucket(), path)
    }

    fn delete_dir(&self, dirname: &str) -> Result<(), FsError> {
        debug!(dirname, "delete_dir");

        let keys = self
            .list_contents(dirname, false)?
            .into_iter()
            .map(|record| record.path)
            .collect();

        self.client.fs_delete_objects(&self.wire_bucket(), keys)
    }

    fn create_dir(&self, dirname: &str) -> Result<(), FsError> {
        debug!(dirname, "create_dir");

        let marker = format!("{}/{}", dirname, DIR_MARKER);

        self.client
            .fs_put_object(&self.wire_bucket(), &marker, Vec::new(), None)
    }

    fn set_visibility(&self, path: &str, visibility: Visibility) -> Result<(), FsError> {
        debug!(path, acl = visibility.as_acl(), "set_visibility");

        self.client
            .fs_put_object_acl(&self.wire_bucket(), path, visibility.as_acl())
    }

    fn get_visibility(&self, path: &str) -> Result<Visibility, FsError> {
        let grants = self.client.fs_get_object_acl(&self.wire_bucket(), path)?;

        Ok(Visibility::from_grants(&grants))
    }

    fn has(&self, path: &str) -> Result<bool, FsError> {
        Ok(self.get_metadata(path)?.is_some())
    }

    fn read(&self, path: &str) -> Result<Option<Vec<u8>>, FsError> {
        self.client.fs_get_object(&self.wire_bucket(), path)
    }

    fn read_stream(&self, path: &str) -> Result<Option<Box<dyn Read>>, FsError> {
        let body = self.client.fs_get_object(&self.wire_bucket(), path)?;

        Ok(body.map(|bytes| Box::new(Cursor::new(bytes)) as Box<dyn Read>))
    }

    fn list_contents(
        &self,
        directory: &str,
        recursive: bool,
    ) -> Result<Vec<FileRecord>, FsError> {
        let prefix = Self::list_prefix(directory);
        let delimiter = if recursive { "" } else { "/" };

        let raw = self
            .client
            .fs_list_objects(&self.wire_bucket(), &prefix, delimiter)?;

        raw.iter().map(meta::normalize).collect()
    }

    fn get_metadata(&self, path: &str) -> Result<Option<HeadMeta>, FsError> {
        self.client.fs_head_object(&self.wire_bucket(), path)
    }

    fn get_size(&self, path: &str) -> Result<Option<u64>, FsError> {
        match self.get_metadata(path)? {
            None => Err(FsError::NotFound {
                key: path.to_string(),
            }),
            Some(head) => Ok(head.content_length),
        }
    }

    fn get_mimetype(&self, path: &str) -> Result<Option<String>, FsError> {
        match self.get_metadata(path)? {
            None => Err(FsError::NotFound {
                key: path.to_string(),
            }),
            Some(head) => Ok(head.content_type),
        }
    }

    fn get_timestamp(&self, path: &str) -> Result<Option<i64>, FsError> {
        match self.get_metadata(path)? {
            None => Err(FsError::NotFound {
                key: path.to_string(),
            }),
            Some(head) => head
                .last_modified
                .as_deref()
                .map(meta::parse_last_modified)
                .transpose(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::adapters::{mock::MockClient, ObjectClient};

    fn new_fs(client: Arc<MockClient>) -> CosFS {
        CosFS::new(
            Box::new(client),
            Config {
                bucket: "mybucket".to_string(),
                app_id: "1000".to_string(),
                region: "sh".to_string(),
                cdn: None,
            },
        )
        .unwrap()
    }

    fn new_fs_with_cdn(client: Arc<MockClient>, cdn: &str) -> CosFS {
        CosFS::new(
            Box::new(client),
            Config {
                bucket: "mybucket".to_string(),
                app_id: "1000".to_string(),
                region: "sh".to_string(),
                cdn: Some(cdn.to_string()),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_new_unknown_region() {
        let result = CosFS::new(
            Box::new(MockClient::new()),
            Config {
                bucket: "mybucket".to_string(),
                app_id: "1000".to_string(),
                region: "nowhere".to_string(),
                cdn: None,
            },
        );

        assert!(matches!(result, Err(FsError::UnknownRegion { .. })));
    }

    #[test]
    fn test_write_read_round_trip() {
        let fs = new_fs(Arc::new(MockClient::new()));

        let contents = b"hello \xf0\x9f\x8c\x8d world".to_vec();
        fs.write("a/b.txt", &contents).unwrap();

        let result = fs.read("a/b.txt").unwrap();
        assert_eq!(result, Some(contents));
    }

    #[test]
    fn test_read_missing_key() {
        let fs = new_fs(Arc::new(MockClient::new()));

        assert_eq!(fs.read("nope.txt").unwrap(), None);
        assert!(fs.read_stream("nope.txt").unwrap().is_none());
    }

    #[test]
    fn test_write_stream_round_trip() {
        let fs = new_fs(Arc::new(MockClient::new()));

        let mut input = Cursor::new(b"streamed contents".to_vec());
        fs.write_stream("stream.bin", &mut input).unwrap();

        let mut output = Vec::new();
        fs.read_stream("stream.bin")
            .unwrap()
            .expect("object should exist")
            .read_to_end(&mut output)
            .unwrap();

        assert_eq!(output, b"streamed contents");
    }

    #[test]
    fn test_has() {
        let fs = new_fs(Arc::new(MockClient::new()));

        fs.write("present.txt", b"x").unwrap();

        assert!(fs.has("present.txt").unwrap());
        assert!(!fs.has("absent.txt").unwrap());
    }

    #[test]
    fn test_rename() {
        let fs = new_fs(Arc::new(MockClient::new()));

        fs.write("old.txt", b"payload").unwrap();
        fs.rename("old.txt", "new.txt").unwrap();

        assert_eq!(fs.read("new.txt").unwrap(), Some(b"payload".to_vec()));
        assert!(!fs.has("old.txt").unwrap());
    }

    #[test]
    fn test_rename_missing_source() {
        let fs = new_fs(Arc::new(MockClient::new()));

        assert!(fs.rename("absent.txt", "new.txt").is_err());
    }

    #[test]
    fn test_copy() {
        let fs = new_fs(Arc::new(MockClient::new()));

        fs.write("src.txt", b"payload").unwrap();
        fs.copy("src.txt", "dst.txt").unwrap();

        assert_eq!(fs.read("src.txt").unwrap(), Some(b"payload".to_vec()));
        assert_eq!(fs.read("dst.txt").unwrap(), Some(b"payload".to_vec()));
    }

    #[test]
    fn test_delete() {
        let fs = new_fs(Arc::new(MockClient::new()));

        fs.write("gone.txt", b"x").unwrap();
        fs.delete("gone.txt").unwrap();

        assert!(!fs.has("gone.txt").unwrap());
    }

    #[test]
    fn test_delete_dir_batches_exact_keys() {
        let client = Arc::new(MockClient::new());
        let fs = new_fs(Arc::clone(&client));

        fs.write("tmp/a", b"1").unwrap();
        fs.write("tmp/b", b"2").unwrap();
        fs.write("tmp/sub/c", b"3").unwrap();
        fs.write("other/x", b"4").unwrap();

        fs.delete_dir("tmp").unwrap();

        let batches = client.batch_deletes.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(
            batches[0],
            vec!["tmp/a".to_string(), "tmp/b".to_string()]
        );

        // One level deep only: the nested key survives the batch.
        assert!(fs.has("tmp/sub/c").unwrap());
        assert!(fs.has("other/x").unwrap());
    }

    #[test]
    fn test_create_dir_writes_marker() {
        let client = Arc::new(MockClient::new());
        let fs = new_fs(Arc::clone(&client));

        fs.create_dir("tmp").unwrap();

        let body = client.fs_get_object("", "tmp/_blank").unwrap();
        assert_eq!(body, Some(Vec::new()));
    }

    #[test]
    fn test_visibility_round_trip() {
        let fs = new_fs(Arc::new(MockClient::new()));

        fs.write("acl.txt", b"x").unwrap();
        assert_eq!(fs.get_visibility("acl.txt").unwrap(), Visibility::Private);

        fs.set_visibility("acl.txt", Visibility::Public).unwrap();
        assert_eq!(fs.get_visibility("acl.txt").unwrap(), Visibility::Public);

        fs.set_visibility("acl.txt", Visibility::Private).unwrap();
        assert_eq!(fs.get_visibility("acl.txt").unwrap(), Visibility::Private);
    }

    #[test]
    fn test_list_contents_depth() {
        let fs = new_fs(Arc::new(MockClient::new()));

        fs.write("dir/a.txt", b"1").unwrap();
        fs.write("dir/b.txt", b"2").unwrap();
        fs.write("dir/sub/c.txt", b"3").unwrap();
        fs.write("top.txt", b"4").unwrap();

        let one_level: Vec<String> = fs
            .list_contents("dir", false)
            .unwrap()
            .into_iter()
            .map(|record| record.path)
            .collect();
        assert_eq!(one_level, vec!["dir/a.txt", "dir/b.txt"]);

        let recursive: Vec<String> = fs
            .list_contents("dir", true)
            .unwrap()
            .into_iter()
            .map(|record| record.path)
            .collect();
        assert_eq!(recursive, vec!["dir/a.txt", "dir/b.txt", "dir/sub/c.txt"]);

        // Trailing slashes on the directory are trimmed before the prefix
        // is built.
        let trimmed: Vec<String> = fs
            .list_contents("dir//", false)
            .unwrap()
            .into_iter()
            .map(|record| record.path)
            .collect();
        assert_eq!(trimmed, vec!["dir/a.txt", "dir/b.txt"]);

        let root: Vec<String> = fs
            .list_contents("", true)
            .unwrap()
            .into_iter()
            .map(|record| record.path)
            .collect();
        assert_eq!(
            root,
            vec!["dir/a.txt", "dir/b.txt", "dir/sub/c.txt", "top.txt"]
        );
    }

    #[test]
    fn test_list_contents_records() {
        let fs = new_fs(Arc::new(MockClient::new()));

        fs.write("docs/report.v2.pdf", b"%PDF-").unwrap();

        let records = fs.list_contents("docs", false).unwrap();
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.kind, "file");
        assert_eq!(record.path, "docs/report.v2.pdf");
        assert_eq!(record.size, 5);
        assert_eq!(record.timestamp, 1704164645);
        assert_eq!(record.dirname, "docs");
        assert_eq!(record.basename, "report.v2.pdf");
        assert_eq!(record.extension, "pdf");
        assert_eq!(record.filename, "report.v2");
    }

    #[test]
    fn test_stat_operations() {
        let client = Arc::new(MockClient::new());
        let fs = new_fs(Arc::clone(&client));

        fs.write("stat.txt", b"12345").unwrap();

        assert_eq!(fs.get_size("stat.txt").unwrap(), Some(5));
        assert_eq!(fs.get_timestamp("stat.txt").unwrap(), Some(1704164645));

        // The mock stores no content type; the head succeeds but the field
        // is absent.
        assert_eq!(fs.get_mimetype("stat.txt").unwrap(), None);

        client
            .objects
            .lock()
            .unwrap()
            .get_mut("stat.txt")
            .unwrap()
            .content_type = Some("text/plain".to_string());
        assert_eq!(
            fs.get_mimetype("stat.txt").unwrap(),
            Some("text/plain".to_string())
        );
    }

    #[test]
    fn test_stat_missing_key() {
        let fs = new_fs(Arc::new(MockClient::new()));

        assert!(fs.get_metadata("absent.txt").unwrap().is_none());
        assert!(matches!(
            fs.get_size("absent.txt"),
            Err(FsError::NotFound { .. })
        ));
        assert!(matches!(
            fs.get_mimetype("absent.txt"),
            Err(FsError::NotFound { .. })
        ));
        assert!(matches!(
            fs.get_timestamp("absent.txt"),
            Err(FsError::NotFound { .. })
        ));
    }

    #[test]
    fn test_source_path() {
        let fs = new_fs(Arc::new(MockClient::new()));

        assert_eq!(
            fs.source_path("a/b.txt"),
            "mybucket-1000.cos.ap-shanghai.myqcloud.com/a/b.txt"
        );
    }

    #[test]
    fn test_url_without_cdn_is_decoded() {
        let fs = new_fs(Arc::new(MockClient::new()));

        let url = fs.url("a b.txt").unwrap();
        assert_eq!(url, "https://mybucket-1000.cos.ap-mock.myqcloud.com/a b.txt");
    }

    #[test]
    fn test_url_with_cdn() {
        let fs = new_fs_with_cdn(Arc::new(MockClient::new()), "https://cdn.example.com/");

        let url = fs.url("a/b.txt").unwrap();
        assert_eq!(url, "https://cdn.example.com/a/b.txt");
    }

    #[test]
    fn test_temporary_url_expiration_format() {
        let fs = new_fs(Arc::new(MockClient::new()));

        let expires_at = OffsetDateTime::from_unix_timestamp(1704164645).unwrap();
        let url = fs.temporary_url("a b.txt", expires_at).unwrap();

        assert!(
            url.contains("sign=2024-01-02 03:04:05"),
            "unexpected url: {}",
            url
        );
        assert!(url.contains("/a b.txt"), "unexpected url: {}", url);
    }

    #[test]
    fn test_accessors() {
        let fs = new_fs(Arc::new(MockClient::new()));

        assert_eq!(fs.bucket(), "mybucket");
        assert_eq!(fs.app_id(), "1000");
        assert_eq!(fs.region(), "ap-shanghai");
    }
}

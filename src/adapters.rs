use crate::model;

pub mod cos;
pub mod mock;

/// The storage-service capability the adapter is built on. One method per
/// wire operation; no retries, batching, or caching happen behind it.
///
/// Methods carry an `fs_` prefix so implementations on SDK client types do
/// not collide with the SDK's own inherent methods.
pub trait ObjectClient {
    /// Uploads a full object body in a single request.
    fn fs_upload(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
    ) -> Result<(), model::fs::FsError>;

    /// Puts an object, optionally replacing its canned ACL in the same call.
    fn fs_put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        acl: Option<&str>,
    ) -> Result<(), model::fs::FsError>;

    /// Server-side copy; `copy_source` is a fully-qualified source locator,
    /// not a fetchable URL.
    fn fs_copy_object(
        &self,
        bucket: &str,
        key: &str,
        copy_source: &str,
    ) -> Result<(), model::fs::FsError>;

    fn fs_delete_object(&self, bucket: &str, key: &str) -> Result<(), model::fs::FsError>;

    /// One batch-delete request for all `keys`. Not transactional.
    fn fs_delete_objects(
        &self,
        bucket: &str,
        keys: Vec<String>,
    ) -> Result<(), model::fs::FsError>;

    /// `Ok(None)` when the key does not exist.
    fn fs_head_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<model::cos::HeadMeta>, model::fs::FsError>;

    /// Full object body; `Ok(None)` when the key does not exist.
    fn fs_get_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<Vec<u8>>, model::fs::FsError>;

    fn fs_get_object_acl(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Vec<model::cos::Grant>, model::fs::FsError>;

    fn fs_put_object_acl(
        &self,
        bucket: &str,
        key: &str,
        acl: &str,
    ) -> Result<(), model::fs::FsError>;

    /// Single-page prefix/delimiter listing, in service order. An empty
    /// delimiter means a full prefix scan.
    fn fs_list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: &str,
    ) -> Result<Vec<model::cos::RawObject>, model::fs::FsError>;

    /// Builds an object URL; with `expires` (formatted
    /// `YYYY-MM-DD HH:MM:SS`) the URL is signed and time-limited. The
    /// result is percent-encoded.
    fn fs_object_url(
        &self,
        bucket: &str,
        key: &str,
        expires: Option<&str>,
    ) -> Result<String, model::fs::FsError>;
}

impl<C: ObjectClient + ?Sized> ObjectClient for std::sync::Arc<C> {
    fn fs_upload(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
    ) -> Result<(), model::fs::FsError> {
        (**self).fs_upload(bucket, key, body)
    }

    fn fs_put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        acl: Option<&str>,
    ) -> Result<(), model::fs::FsError> {
        (**self).fs_put_object(bucket, key, body, acl)
    }

    fn fs_copy_object(
        &self,
        bucket: &str,
        key: &str,
        copy_source: &str,
    ) -> Result<(), model::fs::FsError> {
        (**self).fs_copy_object(bucket, key, copy_source)
    }

    fn fs_delete_object(&self, bucket: &str, key: &str) -> Result<(), model::fs::FsError> {
        (**self).fs_delete_object(bucket, key)
    }

    fn fs_delete_objects(
        &self,
        bucket: &str,
        keys: Vec<String>,
    ) -> Result<(), model::fs::FsError> {
        (**self).fs_delete_objects(bucket, keys)
    }

    fn fs_head_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<model::cos::HeadMeta>, model::fs::FsError> {
        (**self).fs_head_object(bucket, key)
    }

    fn fs_get_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<Vec<u8>>, model::fs::FsError> {
        (**self).fs_get_object(bucket, key)
    }

    fn fs_get_object_acl(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Vec<model::cos::Grant>, model::fs::FsError> {
        (**self).fs_get_object_acl(bucket, key)
    }

    fn fs_put_object_acl(
        &self,
        bucket: &str,
        key: &str,
        acl: &str,
    ) -> Result<(), model::fs::FsError> {
        (**self).fs_put_object_acl(bucket, key, acl)
    }

    fn fs_list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: &str,
    ) -> Result<Vec<model::cos::RawObject>, model::fs::FsError> {
        (**self).fs_list_objects(bucket, prefix, delimiter)
    }

    fn fs_object_url(
        &self,
        bucket: &str,
        key: &str,
        expires: Option<&str>,
    ) -> Result<String, model::fs::FsError> {
        (**self).fs_object_url(bucket, key, expires)
    }
}

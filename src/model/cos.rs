/// One content entry of a listing response.
#[derive(Clone, Debug)]
pub struct RawObject {
    pub key: String,
    pub size: u64,
    /// The service's last-modified string, RFC 3339 or RFC 2822.
    pub last_modified: String,
}

/// Fields of a head-object response. Each field can be absent even when the
/// head call itself succeeded.
#[derive(Clone, Debug, Default)]
pub struct HeadMeta {
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
    pub last_modified: Option<String>,
}

/// One ACL grant as returned by get-object-acl.
#[derive(Clone, Debug)]
pub struct Grant {
    pub grantee_uri: Option<String>,
    pub permission: String,
}

//! Filesystem-style operations over Qcloud COS object storage.
//!
//! COS is a flat, key-addressed blob store; this crate translates
//! hierarchical filesystem operations (write, read, rename, list, stat,
//! visibility) into COS request shapes and maps the responses back into
//! filesystem records. Directories are emulated with prefix/delimiter
//! listings and zero-byte marker objects.
//!
//! The network client is injected as an [`adapters::ObjectClient`]; an
//! implementation over `aws_sdk_s3::Client` pointed at the COS
//! S3-compatible endpoint lives in [`adapters::cos`].

pub mod adapters;
pub mod fs;
pub mod meta;
pub mod model;
pub mod region;
pub mod util;
pub mod visibility;

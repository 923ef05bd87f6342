use std::time::Duration;

use aws_sdk_s3::{
    presigning::PresigningConfig,
    primitives::{ByteStream, DateTimeFormat},
    types::{Delete, ObjectCannedAcl, ObjectIdentifier},
};
use time::{macros::format_description, OffsetDateTime, PrimitiveDateTime};

use crate::{adapters, model, util};

/// Builds an S3 client pointed at the COS S3-compatible endpoint for the
/// given canonical region. Credentials come from the environment.
pub fn build_client(region: &str) -> aws_sdk_s3::Client {
    let base = util::poll::wait_for(aws_config::load_from_env());

    let config = aws_sdk_s3::config::Builder::from(&base)
        .region(aws_sdk_s3::config::Region::new(region.to_string()))
        .endpoint_url(format!("https://cos.{}.myqcloud.com", region))
        .build();

    aws_sdk_s3::Client::from_conf(config)
}

fn format_last_modified(
    dt: &aws_sdk_s3::primitives::DateTime,
    key: &str,
) -> Result<String, model::fs::FsError> {
    dt.fmt(DateTimeFormat::DateTime)
        .map_err(|err| model::fs::FsError::Time {
            message: format!("failed to format last-modified of: {}, {}", key, err),
        })
}

impl adapters::ObjectClient for aws_sdk_s3::Client {
    fn fs_upload(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
    ) -> Result<(), model::fs::FsError> {
        self.fs_put_object(bucket, key, body, None)
    }

    fn fs_put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        acl: Option<&str>,
    ) -> Result<(), model::fs::FsError> {
        let mut req = self
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body));

        if let Some(acl) = acl {
            req = req.acl(ObjectCannedAcl::from(acl));
        }

        util::poll::wait_for(req.send()).map_err(|err| model::fs::FsError::Service {
            message: format!("failed to put_object at: {}, {}", key, err),
        })?;

        Ok(())
    }

    fn fs_copy_object(
        &self,
        bucket: &str,
        key: &str,
        copy_source: &str,
    ) -> Result<(), model::fs::FsError> {
        let req = self
            .copy_object()
            .bucket(bucket)
            .key(key)
            .copy_source(copy_source);

        util::poll::wait_for(req.send()).map_err(|err| model::fs::FsError::Service {
            message: format!("failed to copy_object to: {}, {}", key, err),
        })?;

        Ok(())
    }

    fn fs_delete_object(&self, bucket: &str, key: &str) -> Result<(), model::fs::FsError> {
        let req = self.delete_object().bucket(bucket).key(key);

        util::poll::wait_for(req.send()).map_err(|err| model::fs::FsError::Service {
            message: format!("failed to delete_object at: {}, {}", key, err),
        })?;

        Ok(())
    }

    fn fs_delete_objects(
        &self,
        bucket: &str,
        keys: Vec<String>,
    ) -> Result<(), model::fs::FsError> {
        let mut objects = Vec::with_capacity(keys.len());
        for key in keys {
            let id = ObjectIdentifier::builder().key(&key).build().map_err(|err| {
                model::fs::FsError::Service {
                    message: format!("failed to build identifier for: {}, {}", key, err),
                }
            })?;
            objects.push(id);
        }

        let delete = Delete::builder()
            .set_objects(Some(objects))
            .build()
            .map_err(|err| model::fs::FsError::Service {
                message: format!("failed to build batch delete, {}", err),
            })?;

        let req = self.delete_objects().bucket(bucket).delete(delete);

        util::poll::wait_for(req.send()).map_err(|err| model::fs::FsError::Service {
            message: format!("failed to delete_objects, {}", err),
        })?;

        Ok(())
    }

    fn fs_head_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<model::cos::HeadMeta>, model::fs::FsError> {
        let req = self.head_object().bucket(bucket).key(key);

        let ho = match util::poll::wait_for(req.send()) {
            Err(err) => {
                if let Some(svc_err) = err.as_service_error() {
                    if svc_err.is_not_found() {
                        return Ok(None);
                    }
                }

                return Err(model::fs::FsError::Service {
                    message: format!("failed to head_object: {}, {}", key, err),
                });
            }
            Ok(ho) => ho,
        };

        let last_modified = match ho.last_modified() {
            Some(dt) => Some(format_last_modified(dt, key)?),
            None => None,
        };

        Ok(Some(model::cos::HeadMeta {
            content_length: ho.content_length().map(|len| len.max(0) as u64),
            content_type: ho.content_type().map(|ct| ct.to_string()),
            last_modified,
        }))
    }

    fn fs_get_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<Vec<u8>>, model::fs::FsError> {
        let req = self.get_object().bucket(bucket).key(key);

        let o = match util::poll::wait_for(req.send()) {
            Err(err) => {
                if let Some(svc_err) = err.as_service_error() {
                    if svc_err.is_no_such_key() {
                        return Ok(None);
                    }
                }

                return Err(model::fs::FsError::Service {
                    message: format!("failed to get_object: {}, {}", key, err),
                });
            }
            Ok(o) => o,
        };

        let bytes =
            util::poll::wait_for(o.body.collect()).map_err(|err| model::fs::FsError::Service {
                message: format!("failed to collect body: {}, {}", key, err),
            })?;

        Ok(Some(bytes.into_bytes().to_vec()))
    }

    fn fs_get_object_acl(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Vec<model::cos::Grant>, model::fs::FsError> {
        let req = self.get_object_acl().bucket(bucket).key(key);

        let acl = util::poll::wait_for(req.send()).map_err(|err| model::fs::FsError::Service {
            message: format!("failed to get_object_acl: {}, {}", key, err),
        })?;

        let grants = acl
            .grants()
            .iter()
            .map(|grant| model::cos::Grant {
                grantee_uri: grant
                    .grantee()
                    .and_then(|grantee| grantee.uri())
                    .map(|uri| uri.to_string()),
                permission: grant
                    .permission()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default(),
            })
            .collect();

        Ok(grants)
    }

    fn fs_put_object_acl(
        &self,
        bucket: &str,
        key: &str,
        acl: &str,
    ) -> Result<(), model::fs::FsError> {
        let req = self
            .put_object_acl()
            .bucket(bucket)
            .key(key)
            .acl(ObjectCannedAcl::from(acl));

        util::poll::wait_for(req.send()).map_err(|err| model::fs::FsError::Service {
            message: format!("failed to put_object_acl: {}, {}", key, err),
        })?;

        Ok(())
    }

    fn fs_list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: &str,
    ) -> Result<Vec<model::cos::RawObject>, model::fs::FsError> {
        let mut req = self.list_objects_v2().bucket(bucket).prefix(prefix);

        if !delimiter.is_empty() {
            req = req.delimiter(delimiter);
        }

        // Single page only. Very large directories truncate at the service's
        // page size; continuation tokens are not followed.
        let lo = util::poll::wait_for(req.send()).map_err(|err| model::fs::FsError::Service {
            message: format!("failed to list_objects at: {}, {}", prefix, err),
        })?;

        let mut objects = Vec::new();
        for o in lo.contents() {
            let key = o.key().unwrap_or("").to_string();
            let last_modified = match o.last_modified() {
                Some(dt) => format_last_modified(dt, &key)?,
                None => "1970-01-01T00:00:00Z".to_string(),
            };

            objects.push(model::cos::RawObject {
                size: o.size().unwrap_or(0).max(0) as u64,
                key,
                last_modified,
            });
        }

        Ok(objects)
    }

    fn fs_object_url(
        &self,
        bucket: &str,
        key: &str,
        expires: Option<&str>,
    ) -> Result<String, model::fs::FsError> {
        match expires {
            Some(expires) => {
                let format =
                    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
                let deadline = PrimitiveDateTime::parse(expires, &format)
                    .map_err(|err| model::fs::FsError::Time {
                        message: format!("failed to parse expiration: {}, {}", expires, err),
                    })?
                    .assume_utc();

                let remaining = (deadline - OffsetDateTime::now_utc()).whole_seconds().max(1);
                let presigning = PresigningConfig::expires_in(Duration::from_secs(
                    remaining as u64,
                ))
                .map_err(|err| model::fs::FsError::Service {
                    message: format!("failed to build presigning config, {}", err),
                })?;

                let req = self.get_object().bucket(bucket).key(key);
                let presigned = util::poll::wait_for(req.presigned(presigning)).map_err(
                    |err| model::fs::FsError::Service {
                        message: format!("failed to presign url for: {}, {}", key, err),
                    },
                )?;

                Ok(presigned.uri().to_string())
            }
            None => {
                let region = self
                    .config()
                    .region()
                    .map(|r| r.to_string())
                    .unwrap_or_default();

                Ok(format!(
                    "https://{}.cos.{}.myqcloud.com/{}",
                    bucket,
                    region,
                    util::path::percent_encode(key)
                ))
            }
        }
    }
}

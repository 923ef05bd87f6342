use std::{collections::HashMap, sync::Mutex};

use crate::{adapters, model, util, visibility};

const MOCK_LAST_MODIFIED: &str = "2024-01-02T03:04:05Z";

#[derive(Clone, Debug)]
pub struct MockObject {
    pub body: Vec<u8>,
    pub content_type: Option<String>,
    pub last_modified: String,
    pub acl: String,
}

impl MockObject {
    pub fn new(body: Vec<u8>) -> Self {
        Self {
            body,
            content_type: None,
            last_modified: MOCK_LAST_MODIFIED.to_string(),
            acl: visibility::ACL_PRIVATE.to_string(),
        }
    }
}

/// In-memory stand-in for the COS client. Keys live in a flat map, the same
/// shape the real service exposes; batch-delete payloads are recorded so
/// tests can assert exactly what was sent.
#[derive(Default)]
pub struct MockClient {
    pub objects: Mutex<HashMap<String, MockObject>>,
    pub batch_deletes: Mutex<Vec<Vec<String>>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, HashMap<String, MockObject>> {
        self.objects.lock().expect("failed to acquire `objects` guard")
    }
}

impl adapters::ObjectClient for MockClient {
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
        _bucket: &str,
        key: &str,
        body: Vec<u8>,
        acl: Option<&str>,
    ) -> Result<(), model::fs::FsError> {
        let mut object = MockObject::new(body);
        if let Some(acl) = acl {
            object.acl = acl.to_string();
        }

        self.guard().insert(key.to_string(), object);

        Ok(())
    }

    fn fs_copy_object(
        &self,
        _bucket: &str,
        key: &str,
        copy_source: &str,
    ) -> Result<(), model::fs::FsError> {
        // The locator is "<host>/<key>"; the mock only needs the key part.
        let source_key = copy_source
            .split_once('/')
            .map(|(_, rest)| rest)
            .unwrap_or(copy_source);

        let source = self.guard().get(source_key).cloned().ok_or_else(|| {
            model::fs::FsError::Service {
                message: format!("failed to copy_object, no such source: {}", source_key),
            }
        })?;

        self.guard().insert(key.to_string(), source);

        Ok(())
    }

    fn fs_delete_object(&self, _bucket: &str, key: &str) -> Result<(), model::fs::FsError> {
        // Deleting an absent key succeeds, matching the service.
        self.guard().remove(key);

        Ok(())
    }

    fn fs_delete_objects(
        &self,
        _bucket: &str,
        keys: Vec<String>,
    ) -> Result<(), model::fs::FsError> {
        let mut objects = self.guard();
        for key in &keys {
            objects.remove(key);
        }

        self.batch_deletes
            .lock()
            .expect("failed to acquire `batch_deletes` guard")
            .push(keys);

        Ok(())
    }

    fn fs_head_object(
        &self,
        _bucket: &str,
        key: &str,
    ) -> Result<Option<model::cos::HeadMeta>, model::fs::FsError> {
        Ok(self.guard().get(key).map(|object| model::cos::HeadMeta {
            content_length: Some(object.body.len() as u64),
            content_type: object.content_type.clone(),
            last_modified: Some(object.last_modified.clone()),
        }))
    }

    fn fs_get_object(
        &self,
        _bucket: &str,
        key: &str,
    ) -> Result<Option<Vec<u8>>, model::fs::FsError> {
        Ok(self.guard().get(key).map(|object| object.body.clone()))
    }

    fn fs_get_object_acl(
        &self,
        _bucket: &str,
        key: &str,
    ) -> Result<Vec<model::cos::Grant>, model::fs::FsError> {
        let objects = self.guard();
        let object = objects.get(key).ok_or_else(|| model::fs::FsError::Service {
            message: format!("failed to get_object_acl, no such key: {}", key),
        })?;

        let mut grants = vec![model::cos::Grant {
            grantee_uri: None,
            permission: "FULL_CONTROL".to_string(),
        }];

        if object.acl == visibility::ACL_PUBLIC_READ {
            grants.push(model::cos::Grant {
                grantee_uri: Some(
                    "http://cam.qcloud.com/groups/global/AllUsers".to_string(),
                ),
                permission: "READ".to_string(),
            });
        }

        Ok(grants)
    }

    fn fs_put_object_acl(
        &self,
        _bucket: &str,
        key: &str,
        acl: &str,
    ) -> Result<(), model::fs::FsError> {
        let mut objects = self.guard();
        let object = objects.get_mut(key).ok_or_else(|| model::fs::FsError::Service {
            message: format!("failed to put_object_acl, no such key: {}", key),
        })?;

        object.acl = acl.to_string();

        Ok(())
    }

    fn fs_list_objects(
        &self,
        _bucket: &str,
        prefix: &str,
        delimiter: &str,
    ) -> Result<Vec<model::cos::RawObject>, model::fs::FsError> {
        let objects = self.guard();

        let mut keys: Vec<&String> = objects
            .keys()
            .filter(|key| key.starts_with(prefix))
            .filter(|key| {
                delimiter.is_empty() || !key[prefix.len()..].contains(delimiter)
            })
            .collect();
        keys.sort();

        Ok(keys
            .into_iter()
            .map(|key| {
                let object = &objects[key];

                model::cos::RawObject {
                    key: key.clone(),
                    size: object.body.len() as u64,
                    last_modified: object.last_modified.clone(),
                }
            })
            .collect())
    }

    fn fs_object_url(
        &self,
        bucket: &str,
        key: &str,
        expires: Option<&str>,
    ) -> Result<String, model::fs::FsError> {
        let mut url = format!(
            "https://{}.cos.ap-mock.myqcloud.com/{}",
            bucket,
            util::path::percent_encode(key)
        );

        if let Some(expires) = expires {
            url.push_str("?sign=");
            url.push_str(&util::path::percent_encode(expires));
        }

        Ok(url)
    }
}

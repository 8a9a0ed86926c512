//! Object-created trigger events.

use serde::{Deserialize, Serialize};

use crate::error::EventError;
use crate::models::receipt::ObjectLocation;

/// An S3 notification event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct S3Event {
    #[serde(rename = "Records", default)]
    pub records: Vec<S3EventRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct S3EventRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct S3Object {
    /// Object key, URL-encoded as delivered by the notification.
    pub key: String,
}

impl S3Event {
    /// Parse an event from JSON.
    pub fn from_json(json: &str) -> Result<Self, EventError> {
        serde_json::from_str(json).map_err(|e| EventError::Malformed(e.to_string()))
    }

    /// Event for a single object. `encoded_key` is stored as given.
    pub fn for_object(bucket: impl Into<String>, encoded_key: impl Into<String>) -> Self {
        Self {
            records: vec![S3EventRecord {
                s3: S3Entity {
                    bucket: S3Bucket {
                        name: bucket.into(),
                    },
                    object: S3Object {
                        key: encoded_key.into(),
                    },
                },
            }],
        }
    }

    /// Location of the object named by the first record, with the key decoded.
    ///
    /// Only the first record is processed; any others are ignored.
    pub fn location(&self) -> Result<ObjectLocation, EventError> {
        let record = self.records.first().ok_or(EventError::NoRecords)?;
        Ok(ObjectLocation::new(
            record.s3.bucket.name.clone(),
            unquote_plus(&record.s3.object.key),
        ))
    }
}

/// Decode a form-encoded key: `+` becomes a space, then `%XX` escapes are
/// decoded. Malformed escapes are kept literally.
pub fn unquote_plus(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                let hex = |offset: usize| bytes.get(i + offset).and_then(|b| (*b as char).to_digit(16));
                match (hex(1), hex(2)) {
                    (Some(hi), Some(lo)) => {
                        out.push(((hi << 4) | lo) as u8);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

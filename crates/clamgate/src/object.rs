//! Object references and trigger-event extraction.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one store object. Immutable once an invocation begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
}

impl ObjectRef {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Last path component of the key.
    pub fn basename(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }

    /// Extract the object reference from an S3 event notification payload.
    ///
    /// Event keys arrive URL-encoded with `+` standing in for spaces; the
    /// decoded key is what HeadObject/GetObject expect.
    pub fn from_event_json(payload: &str) -> Result<ObjectRef> {
        let event: S3Event =
            serde_json::from_str(payload).context("invalid event payload")?;
        let record = event
            .records
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("event payload contains no records"))?;
        let key = decode_event_key(&record.s3.object.key)?;
        Ok(ObjectRef {
            bucket: record.s3.bucket.name,
            key,
        })
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

fn decode_event_key(raw: &str) -> Result<String> {
    let spaced = raw.replace('+', " ");
    let decoded = urlencoding::decode(&spaced)
        .with_context(|| format!("object key is not valid percent-encoding: {raw}"))?;
    Ok(decoded.into_owned())
}

#[derive(Debug, Deserialize)]
struct S3Event {
    #[serde(rename = "Records")]
    records: Vec<S3Record>,
}

#[derive(Debug, Deserialize)]
struct S3Record {
    s3: S3Entity,
}

#[derive(Debug, Deserialize)]
struct S3Entity {
    bucket: S3Bucket,
    object: S3Object,
}

#[derive(Debug, Deserialize)]
struct S3Bucket {
    name: String,
}

#[derive(Debug, Deserialize)]
struct S3Object {
    key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_EVENT: &str = r#"{
        "Records": [
            {
                "eventName": "ObjectCreated:Put",
                "s3": {
                    "bucket": { "name": "uploads" },
                    "object": { "key": "incoming/monthly+report+%281%29.pdf", "size": 1024 }
                }
            }
        ]
    }"#;

    #[test]
    fn extracts_bucket_and_decoded_key_from_event() {
        let object = ObjectRef::from_event_json(SAMPLE_EVENT).unwrap();
        assert_eq!(object.bucket, "uploads");
        assert_eq!(object.key, "incoming/monthly report (1).pdf");
    }

    #[test]
    fn empty_record_list_is_rejected() {
        let err = ObjectRef::from_event_json(r#"{"Records": []}"#).unwrap_err();
        assert!(err.to_string().contains("no records"), "{err}");
    }

    #[test]
    fn garbage_payload_is_rejected() {
        assert!(ObjectRef::from_event_json("not json").is_err());
    }

    #[test]
    fn basename_is_last_path_component() {
        assert_eq!(ObjectRef::new("b", "a/b/c.txt").basename(), "c.txt");
        assert_eq!(ObjectRef::new("b", "flat.bin").basename(), "flat.bin");
        assert_eq!(ObjectRef::new("b", "trailing/").basename(), "");
    }

    #[test]
    fn display_is_the_s3_uri() {
        let object = ObjectRef::new("uploads", "a/b.txt");
        assert_eq!(object.to_string(), "s3://uploads/a/b.txt");
    }
}

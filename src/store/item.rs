//! Item records and their in-memory content.

use crate::mime;
use crate::types::TransactionId;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Broad type that marks a folder entry.
pub const FOLDER_TYPE: &str = "folder";

/// Binary payload fetched from the store, tagged with its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl Blob {
    pub fn new(media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            media_type: media_type.into(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// BLAKE3 digest of the bytes, hex encoded.
    pub fn digest_hex(&self) -> String {
        blake3::hash(&self.bytes).to_hex().to_string()
    }
}

/// One file-system entry as known to this client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub broad_type: String,
    pub sub_type: String,
    /// RFC 3339 when the source date was recognised, verbatim otherwise.
    pub date: String,
    pub owner: String,
    pub transaction_id: TransactionId,
    pub owner_public_key: String,
    pub is_retrieved: bool,
    /// Present only when this session performed the upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_private_key: Option<String>,
    #[serde(skip)]
    pub content: Option<Blob>,
}

impl Item {
    /// Media type rebuilt from the stored broad and sub types.
    pub fn media_type(&self) -> String {
        mime::join_media_type(&self.broad_type, &self.sub_type)
    }

    pub fn is_folder(&self) -> bool {
        self.broad_type == FOLDER_TYPE
    }

    pub fn is_file(&self) -> bool {
        !self.is_folder()
    }

    /// Whether this session holds the uploader's private key.
    pub fn owned_locally(&self) -> bool {
        self.owner_private_key.is_some()
    }

    /// Parsed modification time, used for recency ordering.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_date(&self.date)
    }
}

/// Canonicalise a date string to RFC 3339 UTC when its format is recognised.
///
/// Accepts RFC 3339, `ctime` output (`Mon Nov 18 12:34:56 2024`),
/// `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DD`. Anything else is returned as-is.
pub fn normalize_date(raw: &str) -> String {
    match parse_date(raw) {
        Some(ts) => ts.to_rfc3339_opts(SecondsFormat::Secs, true),
        None => raw.to_string(),
    }
}

/// Parse any of the date formats accepted by [`normalize_date`].
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(&collapsed) {
        return Some(ts.with_timezone(&Utc));
    }
    const NAIVE_FORMATS: &[&str] = &["%a %b %d %H:%M:%S %Y", "%Y-%m-%d %H:%M:%S"];
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&collapsed, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(&collapsed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

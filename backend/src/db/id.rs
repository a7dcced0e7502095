//! Document identifiers.
//!
//! The store assigns 12-byte native ids ([`ObjectId`]) to documents it creates,
//! but callers may also key documents with arbitrary strings. Every id that
//! arrives over the API is a plain string, so [`parse_id`] is the single place
//! where a raw string is turned into the identifier the store compares against.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Length of an [`ObjectId`] in its hex form.
pub const OBJECT_ID_HEX_LEN: usize = 24;

/// 12-byte native identifier assigned by the store.
///
/// Layout: 4 bytes of big-endian Unix seconds, 5 process-unique bytes and a
/// 3-byte big-endian counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

static PROCESS_UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
static COUNTER: OnceLock<AtomicU32> = OnceLock::new();

impl ObjectId {
    /// Generate a fresh id.
    pub fn new() -> Self {
        let seconds = chrono::Utc::now().timestamp() as u32;
        let process = PROCESS_UNIQUE.get_or_init(|| {
            let seed = uuid::Uuid::new_v4();
            let mut bytes = [0u8; 5];
            bytes.copy_from_slice(&seed.as_bytes()[..5]);
            bytes
        });
        let counter = COUNTER
            .get_or_init(|| {
                let seed = uuid::Uuid::new_v4();
                let b = seed.as_bytes();
                AtomicU32::new(u32::from_be_bytes([0, b[0], b[1], b[2]]))
            })
            .fetch_add(1, Ordering::SeqCst)
            & 0x00ff_ffff;

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(process);
        bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);
        Self(bytes)
    }

    /// Build an id from raw bytes.
    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Seconds since the Unix epoch encoded in the id.
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// Whether `raw` is syntactically a native id: exactly 24 hex digits.
    pub fn is_valid(raw: &str) -> bool {
        raw.len() == OBJECT_ID_HEX_LEN && raw.bytes().all(|b| b.is_ascii_hexdigit())
    }

    /// Lowercase hex form.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Error returned when a string is not a valid [`ObjectId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a 24-character hex object id")]
pub struct InvalidObjectId(pub String);

impl FromStr for ObjectId {
    type Err = InvalidObjectId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !Self::is_valid(s) {
            return Err(InvalidObjectId(s.to_string()));
        }
        let mut bytes = [0u8; 12];
        for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk).map_err(|_| InvalidObjectId(s.to_string()))?;
            bytes[i] = u8::from_str_radix(pair, 16).map_err(|_| InvalidObjectId(s.to_string()))?;
        }
        Ok(Self(bytes))
    }
}

/// Identifier of a stored document.
///
/// A native id never equals a string key, even when both render the same.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentId {
    /// Store-assigned native id.
    Native(ObjectId),
    /// Caller-chosen string key.
    Key(String),
}

impl DocumentId {
    pub fn is_native(&self) -> bool {
        matches!(self, DocumentId::Native(_))
    }

    /// String form used at the API boundary and as the persisted key.
    pub fn as_key(&self) -> String {
        match self {
            DocumentId::Native(oid) => oid.to_hex(),
            DocumentId::Key(key) => key.clone(),
        }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentId::Native(oid) => write!(f, "{}", oid),
            DocumentId::Key(key) => f.write_str(key),
        }
    }
}

impl From<ObjectId> for DocumentId {
    fn from(oid: ObjectId) -> Self {
        DocumentId::Native(oid)
    }
}

impl Serialize for DocumentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(parse_id(&raw))
    }
}

/// Interpret a raw API id: native when it is shaped like one, string key otherwise.
pub fn parse_id(raw: &str) -> DocumentId {
    match raw.parse::<ObjectId>() {
        Ok(oid) => DocumentId::Native(oid),
        Err(_) => DocumentId::Key(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique_and_valid() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        assert_ne!(a, b);
        assert!(ObjectId::is_valid(&a.to_hex()));
        assert_eq!(a.to_hex().len(), OBJECT_ID_HEX_LEN);
    }

    #[test]
    fn test_timestamp_is_recent() {
        let oid = ObjectId::new();
        let now = chrono::Utc::now().timestamp() as u32;
        assert!(now - oid.timestamp() < 5);
    }

    #[test]
    fn test_is_valid() {
        assert!(ObjectId::is_valid("000000000000000000000000"));
        assert!(ObjectId::is_valid("65A1f0c2e4b0a1b2c3d4e5f6"));
        assert!(!ObjectId::is_valid("65a1f0c2e4b0a1b2c3d4e5f"));
        assert!(!ObjectId::is_valid("65a1f0c2e4b0a1b2c3d4e5fz"));
        assert!(!ObjectId::is_valid("barber-alex"));
        assert!(!ObjectId::is_valid(""));
    }

    #[test]
    fn test_parse_is_case_insensitive_and_displays_lowercase() {
        let oid: ObjectId = "65A1F0C2E4B0A1B2C3D4E5F6".parse().unwrap();
        assert_eq!(oid.to_string(), "65a1f0c2e4b0a1b2c3d4e5f6");
    }

    #[test]
    fn test_parse_id_two_paths() {
        assert!(parse_id("000000000000000000000000").is_native());
        assert_eq!(
            parse_id("barber-alex"),
            DocumentId::Key("barber-alex".to_string())
        );
    }

    #[test]
    fn test_native_never_equals_key() {
        let oid = ObjectId::from_bytes([0; 12]);
        assert_ne!(
            DocumentId::Native(oid),
            DocumentId::Key("000000000000000000000000".to_string())
        );
    }

    #[test]
    fn test_serde_uses_string_form() {
        let id = DocumentId::Native(ObjectId::from_bytes([0xab; 12]));
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abababababababababababab\"");
        let back: DocumentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}

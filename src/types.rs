//! Core value types: content hashes, revision ids, entry paths, and entries.

use crate::error::ObjectError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Content hash of a stored object.
///
/// Git object ids are SHA-1 (40 hex chars) or, in SHA-256 repositories,
/// SHA-256 (64 hex chars). Equality is by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContentHash {
    Sha1([u8; 20]),
    Sha256([u8; 32]),
}

impl ContentHash {
    /// Parse a hex object id, ignoring surrounding whitespace and case.
    pub fn from_hex(input: &str) -> Result<Self, ObjectError> {
        let trimmed = input.trim();
        let invalid = || ObjectError::InvalidId(input.to_string());
        match trimmed.len() {
            40 => {
                let mut bytes = [0u8; 20];
                hex::decode_to_slice(trimmed, &mut bytes).map_err(|_| invalid())?;
                Ok(ContentHash::Sha1(bytes))
            }
            64 => {
                let mut bytes = [0u8; 32];
                hex::decode_to_slice(trimmed, &mut bytes).map_err(|_| invalid())?;
                Ok(ContentHash::Sha256(bytes))
            }
            _ => Err(invalid()),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ContentHash::Sha1(bytes) => bytes,
            ContentHash::Sha256(bytes) => bytes,
        }
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ContentHash {
    type Err = ObjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentHash::from_hex(s)
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Name of one point in history, as emitted by the revision listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RevisionId(String);

impl RevisionId {
    pub fn parse(input: &str) -> Result<Self, ObjectError> {
        if input.is_empty() || input.chars().any(char::is_whitespace) {
            return Err(ObjectError::InvalidId(input.to_string()));
        }
        Ok(RevisionId(input.to_string()))
    }

    /// Wrap a listing token without validation.
    pub(crate) fn from_raw(raw: impl Into<String>) -> Self {
        RevisionId(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Slash-delimited location inside a snapshot, relative to its root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntryPath(String);

impl EntryPath {
    /// Normalize a caller-supplied path.
    ///
    /// Leading `./` and `/`, repeated slashes, and trailing slashes are dropped.
    /// Empty paths and `.`/`..` components are rejected.
    pub fn parse(input: &str) -> Result<Self, ObjectError> {
        let mut components = Vec::new();
        for (index, component) in input.split('/').enumerate() {
            match component {
                "" => continue,
                "." if index == 0 => continue,
                "." | ".." => return Err(ObjectError::InvalidPath(input.to_string())),
                other => components.push(other),
            }
        }
        if components.is_empty() {
            return Err(ObjectError::InvalidPath(input.to_string()));
        }
        Ok(EntryPath(components.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final path component.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for EntryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of a stored object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Commit,
    Tree,
    Blob,
    Tag,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Commit => "commit",
            ObjectType::Tree => "tree",
            ObjectType::Blob => "blob",
            ObjectType::Tag => "tag",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = ObjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "commit" => Ok(ObjectType::Commit),
            "tree" => Ok(ObjectType::Tree),
            "blob" => Ok(ObjectType::Blob),
            "tag" => Ok(ObjectType::Tag),
            other => Err(ObjectError::Malformed {
                command: "object type".to_string(),
                detail: format!("unknown object type {:?}", other),
            }),
        }
    }
}

/// Full state of tracked content at one revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub revision: RevisionId,
    pub tree: ContentHash,
}

/// Record found at a path inside a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Revision whose snapshot holds this entry
    pub revision: RevisionId,
    pub path: EntryPath,
    /// Octal file mode as stored in the tree (e.g. `100644`)
    pub mode: String,
    pub kind: ObjectType,
    pub hash: ContentHash,
}

use std::{fmt, str::FromStr};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use thiserror::Error;
use uuid::Uuid;

/// Portable 128-bit identifier.
///
/// The binary form (16 raw bytes) is what gets stored. The canonical
/// string form is the URL-safe base64 encoding of those bytes without
/// padding.
#[derive(Default, Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Id(Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid identifier")]
pub struct InvalidIdentifier;

impl Id {
    pub const BYTES_LEN: usize = 16;
    pub const STR_LEN: usize = 22;

    /// The all-zero identifier, used for references that are not set.
    pub const NIL: Self = Self(Uuid::nil());

    pub fn new() -> Self {
        Uuid::new_v4().into()
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    pub fn as_bytes(&self) -> &[u8; Self::BYTES_LEN] {
        self.0.as_bytes()
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, InvalidIdentifier> {
        Uuid::from_slice(bytes)
            .map(Into::into)
            .map_err(|_| InvalidIdentifier)
    }

    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.as_bytes())
    }
}

impl From<Uuid> for Id {
    fn from(from: Uuid) -> Self {
        Self(from)
    }
}

impl From<Id> for Uuid {
    fn from(from: Id) -> Self {
        from.0
    }
}

impl From<[u8; 16]> for Id {
    fn from(from: [u8; 16]) -> Self {
        Uuid::from_bytes(from).into()
    }
}

impl TryFrom<&[u8]> for Id {
    type Error = InvalidIdentifier;
    fn try_from(from: &[u8]) -> Result<Self, Self::Error> {
        Self::from_slice(from)
    }
}

impl FromStr for Id {
    type Err = InvalidIdentifier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == Self::STR_LEN {
            let bytes = URL_SAFE_NO_PAD
                .decode(s)
                .map_err(|_| InvalidIdentifier)?;
            return Self::from_slice(&bytes);
        }
        // Also accept the plain UUID notations printed by other tools
        s.parse::<Uuid>()
            .map(Into::into)
            .map_err(|_| InvalidIdentifier)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        f.write_str(&self.encode())
    }
}

/// Caller-supplied identifier before validation.
///
/// Empty bytes and empty strings both mean "absent".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdInput {
    Id(Id),
    Bytes(Vec<u8>),
    Encoded(String),
}

impl IdInput {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Id(_) => false,
            Self::Bytes(bytes) => bytes.is_empty(),
            Self::Encoded(s) => s.is_empty(),
        }
    }

    pub fn parse(&self) -> Result<Option<Id>, InvalidIdentifier> {
        if self.is_empty() {
            return Ok(None);
        }
        match self {
            Self::Id(id) => Ok(Some(*id)),
            Self::Bytes(bytes) => Id::from_slice(bytes).map(Some),
            Self::Encoded(s) => s.parse().map(Some),
        }
    }

    /// Parses the input or generates a fresh random id if it is empty.
    pub fn generate_or_parse(&self) -> Result<Id, InvalidIdentifier> {
        Ok(self.parse()?.unwrap_or_else(Id::new))
    }

    /// Parses the input or falls back to [`Id::NIL`] if it is empty.
    pub fn parse_or_nil(&self) -> Result<Id, InvalidIdentifier> {
        Ok(self.parse()?.unwrap_or(Id::NIL))
    }
}

impl From<Id> for IdInput {
    fn from(from: Id) -> Self {
        Self::Id(from)
    }
}

impl From<&Id> for IdInput {
    fn from(from: &Id) -> Self {
        Self::Id(*from)
    }
}

impl From<Vec<u8>> for IdInput {
    fn from(from: Vec<u8>) -> Self {
        Self::Bytes(from)
    }
}

impl From<&[u8]> for IdInput {
    fn from(from: &[u8]) -> Self {
        Self::Bytes(from.to_vec())
    }
}

impl From<[u8; 16]> for IdInput {
    fn from(from: [u8; 16]) -> Self {
        Self::Bytes(from.to_vec())
    }
}

impl From<String> for IdInput {
    fn from(from: String) -> Self {
        Self::Encoded(from)
    }
}

impl From<&str> for IdInput {
    fn from(from: &str) -> Self {
        Self::Encoded(from.to_owned())
    }
}

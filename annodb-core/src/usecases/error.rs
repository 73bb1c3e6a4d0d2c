use crate::{entities::*, repositories};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid identifier")]
    InvalidIdentifier,
    #[error("Invalid remote origin: {0}")]
    InvalidOrigin(String),
    #[error("A comment with this identifier already exists")]
    IdentifierCollision,
    #[error("Unsupported address family ({0} bytes)")]
    UnsupportedAddressFamily(usize),
    #[error(transparent)]
    Repo(repositories::Error),
}

impl From<repositories::Error> for Error {
    fn from(err: repositories::Error) -> Self {
        match err {
            repositories::Error::AlreadyExists => Self::IdentifierCollision,
            repositories::Error::UnsupportedAddressFamily(err) => err.into(),
            err => Self::Repo(err),
        }
    }
}

impl From<InvalidIdentifier> for Error {
    fn from(_: InvalidIdentifier) -> Self {
        Self::InvalidIdentifier
    }
}

impl From<InvalidOrigin> for Error {
    fn from(err: InvalidOrigin) -> Self {
        Self::InvalidOrigin(err.0)
    }
}

impl From<UnsupportedAddressFamily> for Error {
    fn from(err: UnsupportedAddressFamily) -> Self {
        Self::UnsupportedAddressFamily(err.0)
    }
}

impl From<CommentInvalidation> for Error {
    fn from(err: CommentInvalidation) -> Self {
        match err {
            CommentInvalidation::Identifier(err) => err.into(),
            CommentInvalidation::Origin(err) => err.into(),
        }
    }
}

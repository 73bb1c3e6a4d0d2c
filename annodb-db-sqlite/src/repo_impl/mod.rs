// NOTE:
// All timestamps are stored as unix timestamps in seconds.

use anyhow::anyhow;
use diesel::{
    self,
    prelude::*,
    result::{DatabaseErrorKind, Error as DieselError},
};

use annodb_core::{
    entities::*,
    filter::*,
    repositories::{self as repo, *},
};

use super::*;

mod comment;

type Result<T> = std::result::Result<T, repo::Error>;

pub fn from_diesel_err(err: DieselError) -> repo::Error {
    match err {
        DieselError::NotFound => repo::Error::NotFound,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            repo::Error::AlreadyExists
        }
        _ => repo::Error::Other(err.into()),
    }
}

fn load_id(bytes: &[u8]) -> Result<Id> {
    Id::from_slice(bytes).map_err(|err| {
        // This should never happen
        log::warn!("Stored identifier has {} instead of 16 bytes", bytes.len());
        anyhow!(err).into()
    })
}

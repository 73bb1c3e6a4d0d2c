//! # annodb-core
//!
//! Storage-independent comment use cases. Storage backends implement
//! [`repositories::CommentRepository`].

pub mod filter;
pub mod repositories;
pub mod usecases;

pub mod entities {
    pub use annodb_entities::{collection::*, comment::*, id::*, origin::*, time::*};
}

//#![deny(missing_docs)] // TODO: Complete missing documentation and enable this option
#![deny(missing_debug_implementations)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(test, deny(warnings))]

//! # annodb-entities
//!
//! Reusable, storage-agnostic comment entities for annodb.
//!
//! The entities only contain value construction and normalization; they never
//! perform any I/O.

pub mod collection;
pub mod comment;
pub mod id;
pub mod origin;
pub mod time;

#[cfg(any(test, feature = "builders"))]
pub mod builders;

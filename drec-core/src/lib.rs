#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

extern crate alloc;

// Key casing rules
mod case;
pub use case::*;

// Field identifiers
mod field;
pub use field::*;

mod posix;
pub use posix::*;

// Declared and inferred types
mod dtype;
pub use dtype::*;

mod schema;
pub use schema::*;

mod error;
pub use error::*;

#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

extern crate alloc;

pub use drec_core::*;

pub use drec_json as json;
pub use drec_json::{JsonObject, JsonValue, Number};

mod value;
pub use value::*;

mod record;
pub use record::*;

pub mod convert;

// JSON to records
mod decode;
pub use decode::*;

// Records to JSON
mod encode;
pub use encode::*;

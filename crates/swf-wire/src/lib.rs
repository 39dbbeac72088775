#![warn(clippy::pedantic)]

pub mod bits;
pub mod coder;
pub mod error;
pub mod header;
pub mod record_header;

pub use coder::{BitReader, BitWriter, ByteOrder, Mark, RecordSpan, TextEncoding};
pub use error::{CodingMismatch, WireError};

#![warn(clippy::pedantic)]

pub mod error;
pub mod decoder;
pub mod flv;

mod decompression;

pub use decoder::{DecoderOptions, MovieDecoder};
pub use decompression::DEFAULT_MAX_INFLATED_SIZE;
pub use error::DecodeError;
pub use flv::FlvDecoder;

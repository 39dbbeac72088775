#![warn(clippy::pedantic)]

pub mod error;
pub mod encoder;
pub mod flv;

mod compression;

pub use compression::DEFAULT_COMPRESSION_LEVEL;
pub use encoder::{MovieEncoder, encode_movie, encode_movie_with_level};
pub use error::EncodeError;
pub use flv::{FlvEncoder, encode_flv};

#![warn(clippy::pedantic)]

pub mod config;
pub mod driver;
pub mod error;
pub mod render_minimal;
pub mod render_tree;

pub use config::{DescribeConfig, OutputMode};
pub use driver::MovieDriver;
pub use error::DriverError;

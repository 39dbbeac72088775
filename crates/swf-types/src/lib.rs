#![warn(clippy::pedantic)]

pub mod error;
pub mod context;
pub mod record;
pub mod registry;
pub mod geometry;
pub mod style;
pub mod shape;
pub mod action;
pub mod tag_code;
pub mod tag;
pub mod define_shape;
pub mod display;
pub mod sprite;
pub mod script;
pub mod media;
pub mod attributes;
pub mod movie;
pub mod flv;

pub use action::{Action, ActionBlock, PushValue};
pub use context::{Context, ContextFlags};
pub use error::TypeError;
pub use flv::{FlvTag, FlvVideo};
pub use geometry::{Color, ColorTransform, Matrix, Rect};
pub use movie::{Movie, MovieHeader};
pub use record::{Prepared, Record, write_record};
pub use registry::{Factory, Family, Registries, Registry};
pub use tag::{OpaqueTag, Tag, TagPlan};
pub use tag_code::TagCode;

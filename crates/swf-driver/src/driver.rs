use swf_types::{FlvVideo, Movie};

use crate::config::{DescribeConfig, OutputMode};
use crate::error::DriverError;
use crate::render_minimal::MinimalRenderer;
use crate::render_tree::TreeRenderer;

/// Renders decoded containers as human-readable text.
///
/// ```text
/// ┌─────────────┐     ┌──────────┐     ┌─────────────────┐
/// │ &Movie      │────▶│ filter + │────▶│ TreeRenderer    │
/// │ &FlvVideo   │     │ dispatch │     │ MinimalRenderer │
/// └─────────────┘     └──────────┘     └─────────────────┘
///                          │                    │
///                   DescribeConfig         String output
/// ```
///
/// Describing never fails on content: opaque tags, raw action blocks and
/// empty streams all render.
pub struct MovieDriver;

impl MovieDriver {
    /// # Errors
    ///
    /// `DriverError::Format` if the output buffer rejects a write.
    pub fn describe(movie: &Movie, config: &DescribeConfig) -> Result<String, DriverError> {
        match config.mode {
            OutputMode::Tree => TreeRenderer::render_movie(movie, config),
            OutputMode::Minimal => MinimalRenderer::render_movie(movie, config),
        }
    }

    /// Describe an FLV file. `include_codes` and `show_actions` do not apply.
    ///
    /// # Errors
    ///
    /// `DriverError::Format` if the output buffer rejects a write.
    pub fn describe_flv(video: &FlvVideo, config: &DescribeConfig) -> Result<String, DriverError> {
        match config.mode {
            OutputMode::Tree => TreeRenderer::render_flv(video),
            OutputMode::Minimal => MinimalRenderer::render_flv(video),
        }
    }
}

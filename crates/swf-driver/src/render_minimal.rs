use std::fmt::Write;

use swf_types::{FlvVideo, Movie};

use crate::config::DescribeConfig;
use crate::error::DriverError;
use crate::render_tree::{flv_tag_line, rect_pixels, signature, tag_line};

/// Minimal renderer: a summary line, then one line per top-level tag
/// prefixed with its position in the stream.
///
/// ```text
/// FWS 10 550x400 24fps 1 frames 3 tags
/// [0] SetBackgroundColor #FF0000
/// [1] DefineSprite id=1 frames=1 tags=1
/// [2] ShowFrame
/// ```
///
/// Sprite children and actions are summarized on their parent's line.
pub struct MinimalRenderer;

impl MinimalRenderer {
    /// # Errors
    ///
    /// `DriverError::Format` if the output buffer rejects a write.
    pub fn render_movie(movie: &Movie, config: &DescribeConfig) -> Result<String, DriverError> {
        let mut out = String::new();
        writeln!(
            out,
            "{} {} {} {}fps {} frames {} tags",
            signature(movie.compressed),
            movie.version,
            rect_pixels(&movie.frame_size),
            movie.frame_rate(),
            movie.frame_count(),
            movie.tags.len()
        )?;
        for (index, tag) in movie.tags.iter().enumerate() {
            if config.includes(tag.tag_code()) {
                writeln!(out, "[{index}] {}", tag_line(tag))?;
            }
        }
        Ok(out)
    }

    /// # Errors
    ///
    /// `DriverError::Format` if the output buffer rejects a write.
    pub fn render_flv(video: &FlvVideo) -> Result<String, DriverError> {
        let mut out = String::new();
        writeln!(
            out,
            "FLV {} {}ms {} tags",
            video.version,
            video.duration_ms(),
            video.tags.len()
        )?;
        for (index, tag) in video.tags.iter().enumerate() {
            writeln!(out, "[{index}] {}", flv_tag_line(tag))?;
        }
        Ok(out)
    }
}

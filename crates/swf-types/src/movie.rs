use swf_wire::{BitReader, BitWriter};

use crate::context::Context;
use crate::error::{TypeError, check_count, check_range};
use crate::geometry::Rect;
use crate::registry::Registries;
use crate::sprite::count_frames;
use crate::tag::Tag;

/// Default frame rate of a new movie, frames per second.
pub const DEFAULT_FRAME_RATE: f32 = 12.0;

/// The fixed fields following the 8-byte prefix.
///
/// ```text
/// frame size RECT │ frame rate u16 (8.8 fixed) │ frame count u16
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MovieHeader {
    pub frame_size: Rect,
    /// Frames per second in 8.8 fixed point.
    pub frame_rate: u16,
    pub frame_count: u16,
}

impl MovieHeader {
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        self.frame_size.encoded_len() + 4
    }

    /// # Errors
    ///
    /// Wire errors from the rectangle or the two words.
    pub fn write(&self, w: &mut BitWriter) -> Result<(), TypeError> {
        self.frame_size.write(w)?;
        w.write_u16(self.frame_rate)?;
        w.write_u16(self.frame_count)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Truncation or a zero-width rectangle.
    pub fn read(r: &mut BitReader<'_>) -> Result<Self, TypeError> {
        Ok(Self {
            frame_size: Rect::read(r)?,
            frame_rate: r.read_u16()?,
            frame_count: r.read_u16()?,
        })
    }
}

/// A movie: container header values plus the top-level tag stream.
///
/// The frame count is derived from the `ShowFrame` tags. Identifiers for
/// new definitions come from [`Movie::allocate_identifier`], which never
/// hands out an identifier already used by a definition in `tags` when
/// the movie was decoded or refreshed.
#[derive(Clone, Debug, PartialEq)]
pub struct Movie {
    pub compressed: bool,
    pub version: u8,
    pub frame_size: Rect,
    frame_rate: u16,
    pub tags: Vec<Tag>,
    next_identifier: u32,
}

impl Movie {
    #[must_use]
    pub fn new(version: u8) -> Self {
        Self {
            compressed: false,
            version,
            frame_size: Rect::default(),
            frame_rate: (DEFAULT_FRAME_RATE * 256.0) as u16,
            tags: Vec::new(),
            next_identifier: 1,
        }
    }

    /// Rebuild a movie from decoded parts and derive the next identifier.
    #[must_use]
    pub fn from_parts(compressed: bool, version: u8, header: &MovieHeader, tags: Vec<Tag>) -> Self {
        let mut movie = Self {
            compressed,
            version,
            frame_size: header.frame_size,
            frame_rate: header.frame_rate,
            tags,
            next_identifier: 1,
        };
        movie.refresh_identifiers();
        movie
    }

    /// Context for coding this movie's records.
    #[must_use]
    pub fn context<'r>(&self, registries: &'r Registries) -> Context<'r> {
        Context::new(registries, self.version)
    }

    #[must_use]
    pub fn frame_rate(&self) -> f32 {
        f32::from(self.frame_rate) / 256.0
    }

    /// # Errors
    ///
    /// [`TypeError::OutOfRange`] unless `0 <= fps < 256`.
    pub fn set_frame_rate(&mut self, fps: f32) -> Result<(), TypeError> {
        if !(0.0..256.0).contains(&fps) {
            return Err(TypeError::out_of_range("frame rate", fps as i64, 0, 255));
        }
        self.frame_rate = (fps * 256.0).round().min(f32::from(u16::MAX)) as u16;
        Ok(())
    }

    /// Frame rate in its stored 8.8 fixed-point form.
    #[must_use]
    pub fn frame_rate_raw(&self) -> u16 {
        self.frame_rate
    }

    pub fn set_frame_rate_raw(&mut self, raw: u16) {
        self.frame_rate = raw;
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        count_frames(&self.tags)
    }

    /// Header values as they will be written.
    ///
    /// # Errors
    ///
    /// [`TypeError::TooMany`] when there are more than 65535 frames.
    pub fn header(&self) -> Result<MovieHeader, TypeError> {
        let frames = self.frame_count();
        check_count("frames", frames, usize::from(u16::MAX))?;
        Ok(MovieHeader {
            frame_size: self.frame_size,
            frame_rate: self.frame_rate,
            frame_count: frames as u16,
        })
    }

    /// Identifiers of every definition tag, in stream order.
    pub fn identifiers(&self) -> impl Iterator<Item = u16> + '_ {
        self.tags.iter().filter_map(Tag::identifier)
    }

    #[must_use]
    pub fn next_identifier(&self) -> u32 {
        self.next_identifier
    }

    /// Reserve the next free identifier.
    ///
    /// # Errors
    ///
    /// [`TypeError::OutOfRange`] once all 65535 identifiers are taken.
    pub fn allocate_identifier(&mut self) -> Result<u16, TypeError> {
        check_range("identifier", i64::from(self.next_identifier), 1, i64::from(u16::MAX))?;
        let id = self.next_identifier as u16;
        self.next_identifier += 1;
        Ok(id)
    }

    /// Raise the next identifier above every identifier in `tags`.
    pub fn refresh_identifiers(&mut self) {
        let floor = self.identifiers().max().map_or(1, |max| u32::from(max) + 1);
        self.next_identifier = self.next_identifier.max(floor);
    }
}

impl Default for Movie {
    fn default() -> Self {
        Self::new(10)
    }
}

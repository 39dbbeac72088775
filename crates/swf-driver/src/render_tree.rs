use std::fmt::Write;

use swf_types::{Action, ActionBlock, Color, FlvTag, FlvVideo, Movie, PushValue, Rect, Tag};

use crate::config::DescribeConfig;
use crate::error::DriverError;

const INDENT: &str = "  ";

/// Tree renderer: header fields followed by one indented line per tag.
///
/// ```text
/// movie FWS version 10
///   frame size: 550x400
///   frame rate: 24
///   frames: 1
///   tags:
///     SetBackgroundColor #FF0000
///     DefineSprite id=1 frames=1 tags=1
///       ShowFrame
///     DoAction actions=1
///       Stop
///     ShowFrame
/// ```
pub struct TreeRenderer;

impl TreeRenderer {
    /// # Errors
    ///
    /// `DriverError::Format` if the output buffer rejects a write.
    pub fn render_movie(movie: &Movie, config: &DescribeConfig) -> Result<String, DriverError> {
        let mut out = String::new();
        writeln!(
            out,
            "movie {} version {}",
            signature(movie.compressed),
            movie.version
        )?;
        writeln!(out, "{INDENT}frame size: {}", rect_pixels(&movie.frame_size))?;
        writeln!(out, "{INDENT}frame rate: {}", movie.frame_rate())?;
        writeln!(out, "{INDENT}frames: {}", movie.frame_count())?;
        writeln!(out, "{INDENT}tags:")?;
        Self::render_tags(&mut out, &movie.tags, 2, config)?;
        Ok(out)
    }

    /// # Errors
    ///
    /// `DriverError::Format` if the output buffer rejects a write.
    pub fn render_flv(video: &FlvVideo) -> Result<String, DriverError> {
        let mut out = String::new();
        writeln!(out, "flv version {}", video.version)?;
        writeln!(
            out,
            "{INDENT}audio: {}, video: {}",
            video.flags.has_audio(),
            video.flags.has_video()
        )?;
        writeln!(out, "{INDENT}duration: {} ms", video.duration_ms())?;
        writeln!(out, "{INDENT}tags:")?;
        for tag in &video.tags {
            writeln!(out, "{INDENT}{INDENT}{}", flv_tag_line(tag))?;
        }
        Ok(out)
    }

    fn render_tags(
        out: &mut String,
        tags: &[Tag],
        depth: usize,
        config: &DescribeConfig,
    ) -> Result<(), DriverError> {
        let pad = INDENT.repeat(depth);
        for tag in tags.iter().filter(|t| config.includes(t.tag_code())) {
            writeln!(out, "{pad}{}", tag_line(tag))?;
            match tag {
                Tag::DefineSprite(sprite) => {
                    Self::render_tags(out, &sprite.tags, depth + 1, config)?;
                }
                Tag::DoAction(t) if config.show_actions => {
                    Self::render_actions(out, &t.actions, depth + 1)?;
                }
                Tag::DoInitAction(t) if config.show_actions => {
                    Self::render_actions(out, &t.actions, depth + 1)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn render_actions(out: &mut String, block: &ActionBlock, depth: usize) -> Result<(), DriverError> {
        if let ActionBlock::Decoded(actions) = block {
            let pad = INDENT.repeat(depth);
            for action in actions {
                writeln!(out, "{pad}{}", action_line(action))?;
            }
        }
        Ok(())
    }
}

pub(crate) fn signature(compressed: bool) -> &'static str {
    if compressed { "CWS" } else { "FWS" }
}

/// Frame size in pixels; twips that are not a whole pixel keep a fraction.
pub(crate) fn rect_pixels(rect: &Rect) -> String {
    let width = f64::from(rect.width()) / 20.0;
    let height = f64::from(rect.height()) / 20.0;
    format!("{width}x{height}")
}

fn hex_color(color: Color) -> String {
    format!("#{:02X}{:02X}{:02X}", color.red, color.green, color.blue)
}

fn actions_summary(block: &ActionBlock) -> String {
    match block {
        ActionBlock::Decoded(actions) => format!("actions={}", actions.len()),
        ActionBlock::Raw(bytes) => format!("raw={} bytes", bytes.len()),
    }
}

/// One-line description of a tag, without its children.
pub(crate) fn tag_line(tag: &Tag) -> String {
    let name = tag.tag_code().name();
    match tag {
        Tag::ShowFrame => name,
        Tag::DefineShape(t) => format!(
            "{name} id={} bounds={} fills={} lines={} records={}",
            t.id,
            rect_pixels(&t.bounds),
            t.shape.styles.fills.len(),
            t.shape.styles.lines.len(),
            t.shape.records.len()
        ),
        Tag::SetBackgroundColor(t) => format!("{name} {}", hex_color(t.color)),
        Tag::DoAction(t) => format!("{name} {}", actions_summary(&t.actions)),
        Tag::DoInitAction(t) => format!(
            "{name} sprite={} {}",
            t.sprite_id,
            actions_summary(&t.actions)
        ),
        Tag::DefineSound(t) => format!(
            "{name} id={} format={} rate={} {}-bit {} samples={}",
            t.id,
            t.format,
            t.rate,
            if t.is_16_bit { 16 } else { 8 },
            if t.is_stereo { "stereo" } else { "mono" },
            t.sample_count
        ),
        Tag::PlaceObject2(t) => {
            let mut line = format!("{name} depth={}", t.depth);
            if let Some(id) = t.character_id {
                let _ = write!(line, " character={id}");
            }
            if t.is_move {
                line.push_str(" move");
            }
            if let Some(instance) = &t.name {
                let _ = write!(line, " name={instance:?}");
            }
            line
        }
        Tag::RemoveObject2(t) => format!("{name} depth={}", t.depth),
        Tag::DefineSprite(t) => format!(
            "{name} id={} frames={} tags={}",
            t.id,
            t.frame_count(),
            t.tags.len()
        ),
        Tag::FrameLabel(t) => {
            let anchor = if t.anchor { " anchor" } else { "" };
            format!("{name} {:?}{anchor}", t.name)
        }
        Tag::DefineVideoStream(t) => format!(
            "{name} id={} frames={} size={}x{} codec={}",
            t.id, t.frame_count, t.width, t.height, t.codec
        ),
        Tag::ScriptLimits(t) => format!(
            "{name} recursion={} timeout={}s",
            t.max_recursion_depth, t.timeout_seconds
        ),
        Tag::FileAttributes(t) => format!("{name} flags=0x{:08X}", t.flags.raw()),
        Tag::Metadata(t) => format!("{name} xml={} bytes", t.xml.len()),
        Tag::DefineBinaryData(t) => format!("{name} id={} data={} bytes", t.id, t.data.len()),
        Tag::Opaque(t) => format!("{name} opaque={} bytes", t.body.len()),
    }
}

fn push_value(value: &PushValue) -> String {
    match value {
        PushValue::String(s) => format!("{s:?}"),
        PushValue::Float(v) => format!("{v}f"),
        PushValue::Null => "null".to_string(),
        PushValue::Undefined => "undefined".to_string(),
        PushValue::Register(r) => format!("r{r}"),
        PushValue::Boolean(b) => b.to_string(),
        PushValue::Double(v) => v.to_string(),
        PushValue::Integer(v) => v.to_string(),
        PushValue::Constant8(c) => format!("c{c}"),
        PushValue::Constant16(c) => format!("c{c}"),
    }
}

pub(crate) fn action_line(action: &Action) -> String {
    match action {
        Action::Simple(code) => format!("Action 0x{code:02X}"),
        Action::GotoFrame(frame) => format!("GotoFrame {frame}"),
        Action::GetUrl { url, target } => format!("GetUrl {url:?} {target:?}"),
        Action::ConstantPool(pool) => format!("ConstantPool count={}", pool.len()),
        Action::SetTarget(target) => format!("SetTarget {target:?}"),
        Action::Push(values) => {
            let values: Vec<String> = values.iter().map(push_value).collect();
            format!("Push {}", values.join(", "))
        }
        Action::Jump(offset) => format!("Jump {offset:+}"),
        Action::If(offset) => format!("If {offset:+}"),
        Action::Opaque { code, body } => format!("Action 0x{code:02X} opaque={} bytes", body.len()),
    }
}

pub(crate) fn flv_tag_line(tag: &FlvTag) -> String {
    match tag {
        FlvTag::Audio {
            timestamp,
            format,
            rate,
            is_16_bit,
            is_stereo,
            data,
        } => format!(
            "audio @{timestamp}ms format={format} rate={rate} {}-bit {} data={} bytes",
            if *is_16_bit { 16 } else { 8 },
            if *is_stereo { "stereo" } else { "mono" },
            data.len()
        ),
        FlvTag::Video {
            timestamp,
            frame_type,
            codec,
            data,
        } => format!(
            "video @{timestamp}ms frame type={frame_type} codec={codec} data={} bytes",
            data.len()
        ),
        FlvTag::Script { timestamp, data } => {
            format!("script @{timestamp}ms data={} bytes", data.len())
        }
        FlvTag::Opaque {
            tag_type,
            timestamp,
            data,
        } => format!("type {tag_type} @{timestamp}ms data={} bytes", data.len()),
    }
}

#[cfg(test)]
mod tests {
    use swf_types::display::SetBackgroundColor;
    use swf_types::script::DoAction;
    use swf_types::sprite::DefineSprite;

    use super::*;

    fn movie() -> Movie {
        let mut movie = Movie::new(10);
        movie.frame_size = Rect::from_pixels(550, 400).unwrap();
        movie.set_frame_rate(24.0).unwrap();
        movie.tags = vec![
            Tag::SetBackgroundColor(SetBackgroundColor {
                color: Color::rgb(255, 0, 0),
                long_header: false,
            }),
            Tag::DefineSprite(DefineSprite {
                id: 1,
                tags: vec![Tag::ShowFrame],
                long_header: false,
            }),
            Tag::DoAction(DoAction {
                actions: ActionBlock::Decoded(vec![
                    Action::Push(vec![PushValue::String("a".into()), PushValue::Integer(3)]),
                    Action::Simple(0x07),
                ]),
                long_header: false,
            }),
            Tag::ShowFrame,
        ];
        movie
    }

    #[test]
    fn tree_layout() {
        let out = TreeRenderer::render_movie(&movie(), &DescribeConfig::default()).unwrap();
        let expected = "\
movie FWS version 10
  frame size: 550x400
  frame rate: 24
  frames: 1
  tags:
    SetBackgroundColor #FF0000
    DefineSprite id=1 frames=1 tags=1
      ShowFrame
    DoAction actions=2
      Push \"a\", 3
      Action 0x07
    ShowFrame
";
        assert_eq!(out, expected);
    }

    #[test]
    fn actions_can_be_hidden() {
        let config = DescribeConfig::default().with_actions(false);
        let out = TreeRenderer::render_movie(&movie(), &config).unwrap();
        assert!(out.contains("DoAction actions=2"));
        assert!(!out.contains("Push"));
    }

    #[test]
    fn filter_applies_inside_sprites() {
        let config = DescribeConfig::default().with_codes([swf_types::TagCode::DefineSprite]);
        let out = TreeRenderer::render_movie(&movie(), &config).unwrap();
        assert!(out.contains("DefineSprite"));
        assert!(!out.contains("ShowFrame"));
        assert!(!out.contains("SetBackgroundColor"));
    }

    #[test]
    fn fractional_pixels() {
        let rect = Rect::new(0, 30, 0, 20).unwrap();
        assert_eq!(rect_pixels(&rect), "1.5x1");
    }

    #[test]
    fn jump_offsets_are_signed() {
        assert_eq!(action_line(&Action::Jump(-4)), "Jump -4");
        assert_eq!(action_line(&Action::If(6)), "If +6");
    }
}

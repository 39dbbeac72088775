/// Movie tag type codes.
///
/// Codes without a typed representation are captured by `Unknown(u16)`
/// so they can be named, filtered and re-encoded without loss.
///
/// ```text
/// ┌──────┬────────────────────┬──────────────────────────────────────┐
/// │ Code │ Variant            │ Description                          │
/// ├──────┼────────────────────┼──────────────────────────────────────┤
/// │ 0    │ End                │ Stream sentinel                      │
/// │ 1    │ ShowFrame          │ Frame boundary                       │
/// │ 2    │ DefineShape        │ Shape, RGB colors                    │
/// │ 9    │ SetBackgroundColor │ Stage color                          │
/// │ 12   │ DoAction           │ Frame actions                        │
/// │ 14   │ DefineSound        │ Event sound                          │
/// │ 22   │ DefineShape2       │ Shape, extended style tables         │
/// │ 26   │ PlaceObject2       │ Add or modify a display list entry   │
/// │ 28   │ RemoveObject2      │ Remove a display list entry          │
/// │ 32   │ DefineShape3       │ Shape, RGBA colors                   │
/// │ 39   │ DefineSprite       │ Movie clip with its own tag stream   │
/// │ 43   │ FrameLabel         │ Named frame                          │
/// │ 59   │ DoInitAction       │ Sprite initialization actions        │
/// │ 60   │ DefineVideoStream  │ Embedded video stream                │
/// │ 65   │ ScriptLimits       │ Recursion depth and timeout          │
/// │ 69   │ FileAttributes     │ Movie-wide attribute flags           │
/// │ 77   │ Metadata           │ XML metadata                         │
/// │ 87   │ DefineBinaryData   │ Opaque embedded data                 │
/// └──────┴────────────────────┴──────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TagCode {
    End,
    ShowFrame,
    DefineShape,
    SetBackgroundColor,
    DoAction,
    DefineSound,
    DefineShape2,
    PlaceObject2,
    RemoveObject2,
    DefineShape3,
    DefineSprite,
    FrameLabel,
    DoInitAction,
    DefineVideoStream,
    ScriptLimits,
    FileAttributes,
    Metadata,
    DefineBinaryData,
    Unknown(u16),
}

impl TagCode {
    #[must_use]
    pub fn wire_id(&self) -> u16 {
        match self {
            Self::End => 0,
            Self::ShowFrame => 1,
            Self::DefineShape => 2,
            Self::SetBackgroundColor => 9,
            Self::DoAction => 12,
            Self::DefineSound => 14,
            Self::DefineShape2 => 22,
            Self::PlaceObject2 => 26,
            Self::RemoveObject2 => 28,
            Self::DefineShape3 => 32,
            Self::DefineSprite => 39,
            Self::FrameLabel => 43,
            Self::DoInitAction => 59,
            Self::DefineVideoStream => 60,
            Self::ScriptLimits => 65,
            Self::FileAttributes => 69,
            Self::Metadata => 77,
            Self::DefineBinaryData => 87,
            Self::Unknown(code) => *code,
        }
    }

    #[must_use]
    pub fn from_wire_id(code: u16) -> Self {
        match code {
            0 => Self::End,
            1 => Self::ShowFrame,
            2 => Self::DefineShape,
            9 => Self::SetBackgroundColor,
            12 => Self::DoAction,
            14 => Self::DefineSound,
            22 => Self::DefineShape2,
            26 => Self::PlaceObject2,
            28 => Self::RemoveObject2,
            32 => Self::DefineShape3,
            39 => Self::DefineSprite,
            43 => Self::FrameLabel,
            59 => Self::DoInitAction,
            60 => Self::DefineVideoStream,
            65 => Self::ScriptLimits,
            69 => Self::FileAttributes,
            77 => Self::Metadata,
            87 => Self::DefineBinaryData,
            other => Self::Unknown(other),
        }
    }

    /// Display name; unknown codes render as `Tag<code>`.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Unknown(code) => format!("Tag{code}"),
            known => format!("{known:?}"),
        }
    }

    /// Whether tags with this code introduce an asset under an identifier.
    #[must_use]
    pub fn is_definition(&self) -> bool {
        matches!(
            self,
            Self::DefineShape
                | Self::DefineShape2
                | Self::DefineShape3
                | Self::DefineSound
                | Self::DefineSprite
                | Self::DefineVideoStream
                | Self::DefineBinaryData
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_roundtrip() {
        let known = [0, 1, 2, 9, 12, 14, 22, 26, 28, 32, 39, 43, 59, 60, 65, 69, 77, 87];
        for code in known {
            let tag = TagCode::from_wire_id(code);
            assert!(!matches!(tag, TagCode::Unknown(_)), "code {code} should be known");
            assert_eq!(tag.wire_id(), code);
        }
    }

    #[test]
    fn unknown_codes_are_preserved() {
        assert_eq!(TagCode::from_wire_id(777), TagCode::Unknown(777));
        assert_eq!(TagCode::Unknown(777).wire_id(), 777);
        assert_eq!(TagCode::Unknown(777).name(), "Tag777");
        assert_eq!(TagCode::DefineShape3.name(), "DefineShape3");
    }

    #[test]
    fn definitions() {
        assert!(TagCode::DefineSprite.is_definition());
        assert!(!TagCode::PlaceObject2.is_definition());
        assert!(!TagCode::Unknown(6).is_definition());
    }
}

use swf_wire::TextEncoding;

use crate::error::TypeError;
use crate::registry::Registries;

/// Flags that change how nested structures are laid out.
///
/// Bit layout:
///   bit 0 = colors carry an alpha channel
///   bit 1 = style arrays may use the `0xFF` + `u16` count escape
///   bit 2 = action bodies are decoded into typed actions
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ContextFlags(u16);

impl ContextFlags {
    pub const NONE: Self = Self(0);
    pub const TRANSPARENT: Self = Self(0b0000_0001);
    pub const EXTENDED_STYLES: Self = Self(0b0000_0010);
    pub const DECODE_ACTIONS: Self = Self(0b0000_0100);

    #[must_use]
    pub fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn raw(self) -> u16 {
        self.0
    }

    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[must_use]
    pub fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

/// Per-call coding context.
///
/// A `Context` is an immutable value: the movie version, the active
/// layout flags and the registries used to look up nested decoders.
/// A record that changes the layout of what it contains (a `DefineShape3`
/// switching colors to RGBA) hands its children a derived copy, so the
/// change never leaks to siblings. Entering a sprite derives a copy one
/// level deeper; nesting past [`Context::MAX_DEPTH`] is rejected.
///
/// ```text
///   movie ctx ─┬─ DefineShape   (ctx)
///              ├─ DefineShape3  (ctx + TRANSPARENT + EXTENDED_STYLES)
///              │     └─ fill styles see RGBA colors
///              └─ SetBackgroundColor (ctx - TRANSPARENT)
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Context<'r> {
    registries: &'r Registries,
    version: u8,
    flags: ContextFlags,
    depth: u8,
}

impl<'r> Context<'r> {
    /// Sprites may sit in the top-level tag stream but not inside another
    /// sprite.
    pub const MAX_DEPTH: u8 = 1;

    #[must_use]
    pub fn new(registries: &'r Registries, version: u8) -> Self {
        Self {
            registries,
            version,
            flags: ContextFlags::NONE,
            depth: 0,
        }
    }

    #[must_use]
    pub fn registries(&self) -> &'r Registries {
        self.registries
    }

    #[must_use]
    pub fn version(&self) -> u8 {
        self.version
    }

    #[must_use]
    pub fn flags(&self) -> ContextFlags {
        self.flags
    }

    #[must_use]
    pub fn has(&self, flag: ContextFlags) -> bool {
        self.flags.contains(flag)
    }

    /// Text encoding implied by the movie version.
    #[must_use]
    pub fn text_encoding(&self) -> TextEncoding {
        TextEncoding::for_version(self.version)
    }

    /// Copy of this context with `flags` added.
    #[must_use]
    pub fn with_flags(&self, flags: ContextFlags) -> Self {
        Self {
            flags: self.flags.union(flags),
            ..*self
        }
    }

    /// Copy of this context with `flags` cleared.
    #[must_use]
    pub fn without_flags(&self, flags: ContextFlags) -> Self {
        Self {
            flags: self.flags.difference(flags),
            ..*self
        }
    }

    /// Number of sprites enclosing the records coded under this context.
    #[must_use]
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Copy of this context one sprite deeper.
    ///
    /// # Errors
    ///
    /// [`TypeError::NestingTooDeep`] past [`Context::MAX_DEPTH`].
    pub fn nested(&self) -> Result<Self, TypeError> {
        if self.depth >= Self::MAX_DEPTH {
            return Err(TypeError::NestingTooDeep { max: Self::MAX_DEPTH });
        }
        Ok(Self {
            depth: self.depth + 1,
            ..*self
        })
    }
}

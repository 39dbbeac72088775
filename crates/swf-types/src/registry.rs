use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use swf_wire::BitReader;
use tracing::debug;

use crate::action::Action;
use crate::context::Context;
use crate::error::TypeError;
use crate::flv::FlvTag;
use crate::style::FillStyle;
use crate::tag::Tag;

/// Decoder for one record type: reads a whole record, header included,
/// from a cursor positioned at its first byte.
pub type Factory<R> = fn(&mut BitReader<'_>, &Context<'_>) -> Result<R, TypeError>;

/// A family of records sharing one code space and one tagged union.
///
/// The family decides how a code is scanned from the stream and what
/// happens to codes nobody registered.
pub trait Family: Sized + 'static {
    /// Name used in diagnostics ("tag", "action", ...).
    const FAMILY: &'static str;

    /// Read the next record's type code and rewind.
    ///
    /// # Errors
    ///
    /// Fails if the code itself cannot be read.
    fn scan_code(r: &mut BitReader<'_>) -> Result<u16, TypeError>;

    /// Decode a record whose code has no registered factory.
    ///
    /// # Errors
    ///
    /// Families without a meaningful opaque form return
    /// [`TypeError::UnknownCode`].
    fn fallback(code: u16, r: &mut BitReader<'_>, ctx: &Context<'_>) -> Result<Self, TypeError>;

    /// This family's registry within a [`Registries`] bundle.
    fn registry(registries: &Registries) -> &Registry<Self>;

    /// Decode the next record through the registry carried by `ctx`.
    ///
    /// # Errors
    ///
    /// Propagates the factory's or fallback's error.
    fn decode_next(r: &mut BitReader<'_>, ctx: &Context<'_>) -> Result<Self, TypeError> {
        Self::registry(ctx.registries()).decode_next(r, ctx)
    }
}

/// Code → factory table for one record family.
pub struct Registry<R> {
    factories: BTreeMap<u16, Factory<R>>,
}

impl<R> Default for Registry<R> {
    fn default() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }
}

impl<R> Clone for Registry<R> {
    fn clone(&self) -> Self {
        Self {
            factories: self.factories.clone(),
        }
    }
}

impl<R> fmt::Debug for Registry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("codes", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<R: Family> Registry<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `factory` for `code`, returning the factory it replaces.
    pub fn register(&mut self, code: u16, factory: Factory<R>) -> Option<Factory<R>> {
        self.factories.insert(code, factory)
    }

    /// Remove the factory for `code`; the code then decodes through the
    /// family fallback.
    pub fn unregister(&mut self, code: u16) -> Option<Factory<R>> {
        self.factories.remove(&code)
    }

    #[must_use]
    pub fn get(&self, code: u16) -> Option<Factory<R>> {
        self.factories.get(&code).copied()
    }

    #[must_use]
    pub fn contains(&self, code: u16) -> bool {
        self.factories.contains_key(&code)
    }

    pub fn codes(&self) -> impl Iterator<Item = u16> + '_ {
        self.factories.keys().copied()
    }

    /// Scan the next code and decode the record with the matching factory,
    /// or with the family fallback when none is registered.
    ///
    /// # Errors
    ///
    /// Propagates scan, factory and fallback errors.
    pub fn decode_next(&self, r: &mut BitReader<'_>, ctx: &Context<'_>) -> Result<R, TypeError> {
        r.set_text_encoding(ctx.text_encoding());
        let code = R::scan_code(r)?;
        match self.get(code) {
            Some(factory) => factory(r, ctx),
            None => {
                debug!(family = R::FAMILY, code, offset = r.pointer() / 8, "no factory, using fallback");
                R::fallback(code, r, ctx)
            }
        }
    }
}

/// One registry per record family.
///
/// [`Registries::standard`] registers every built-in record type. Callers
/// can start from it and override single codes, for example to decode a
/// custom tag or to force a built-in tag through the opaque path.
#[derive(Clone, Debug, Default)]
pub struct Registries {
    pub tags: Registry<Tag>,
    pub actions: Registry<Action>,
    pub fill_styles: Registry<FillStyle>,
    pub flv: Registry<FlvTag>,
}

impl Registries {
    /// Registries with no factories: every record decodes through its
    /// family fallback.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn standard() -> Self {
        let mut registries = Self::empty();
        crate::tag::register_standard(&mut registries.tags);
        crate::action::register_standard(&mut registries.actions);
        crate::style::register_standard(&mut registries.fill_styles);
        crate::flv::register_standard(&mut registries.flv);
        registries
    }

    /// Shared instance of [`Registries::standard`].
    #[must_use]
    pub fn builtin() -> &'static Self {
        static BUILTIN: OnceLock<Registries> = OnceLock::new();
        BUILTIN.get_or_init(Self::standard)
    }
}

#[cfg(test)]
mod tests {
    use swf_wire::BitWriter;

    use super::*;
    use crate::tag::{OpaqueTag, Tag};
    use crate::Record;

    #[test]
    fn register_returns_previous_factory() {
        let mut registry: Registry<Tag> = Registry::new();
        fn first(_: &mut BitReader<'_>, _: &Context<'_>) -> Result<Tag, TypeError> {
            Ok(Tag::ShowFrame)
        }
        fn second(_: &mut BitReader<'_>, _: &Context<'_>) -> Result<Tag, TypeError> {
            Ok(Tag::ShowFrame)
        }
        assert!(registry.register(1, first).is_none());
        assert!(registry.register(1, second).is_some());
        assert!(registry.contains(1));
        assert!(registry.unregister(1).is_some());
        assert!(!registry.contains(1));
    }

    #[test]
    fn unregistered_code_uses_fallback() {
        let registries = Registries::standard();
        let ctx = Context::new(&registries, 10);
        let bytes = [0x43, 0x02, 0xFF, 0x00, 0x00];

        let decoded = Tag::decode(&mut BitReader::swf(&bytes), &ctx).unwrap();
        assert!(matches!(decoded, Tag::SetBackgroundColor(_)));

        let mut custom = Registries::standard();
        custom.tags.unregister(9);
        let ctx = Context::new(&custom, 10);
        let decoded = Tag::decode(&mut BitReader::swf(&bytes), &ctx).unwrap();
        assert_eq!(
            decoded,
            Tag::Opaque(OpaqueTag::new(9, vec![0xFF, 0x00, 0x00]))
        );
    }

    #[test]
    fn opaque_fallback_reencodes_identically() {
        let registries = Registries::empty();
        let ctx = Context::new(&registries, 10);
        let bytes = [0x7F, 0x00, 0x03, 0x00, 0x00, 0x00, 1, 2, 3];

        let decoded = Tag::decode(&mut BitReader::swf(&bytes), &ctx).unwrap();
        let mut w = BitWriter::swf();
        crate::write_record(&decoded, &mut w, &ctx).unwrap();
        assert_eq!(w.as_bytes(), &bytes);
    }

    #[test]
    fn unknown_fill_style_is_a_hard_error() {
        let registries = Registries::standard();
        let ctx = Context::new(&registries, 10);
        let err = FillStyle::decode(&mut BitReader::swf(&[0x13]), &ctx).unwrap_err();
        assert!(matches!(
            err,
            TypeError::UnknownCode {
                family: "fill style",
                code: 0x13
            }
        ));
    }

    #[test]
    fn builtin_is_shared() {
        assert!(std::ptr::eq(Registries::builtin(), Registries::builtin()));
        assert!(Registries::builtin().tags.contains(9));
    }
}

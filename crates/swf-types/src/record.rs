use swf_wire::{BitReader, BitWriter};

use crate::context::Context;
use crate::error::TypeError;
use crate::registry::Family;

/// Output of the sizing phase: the exact encoded size of a record and the
/// decisions (bit widths, presence flags, nested plans) the write phase
/// must follow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prepared<P> {
    /// Encoded size in bytes, header included.
    pub size: usize,
    pub plan: P,
}

impl<P> Prepared<P> {
    pub fn new(size: usize, plan: P) -> Self {
        Self { size, plan }
    }
}

/// The two-phase coding contract shared by every record family.
///
/// A record's header carries the length of its body, and that length
/// depends on the body's content, so encoding always runs in two passes:
///
/// ```text
///   prepare(ctx)              encode(prepared, w, ctx)
///   ┌──────────────────┐      ┌──────────────────────────────┐
///   │ size children    │ ───▶ │ header(len from plan)        │
///   │ pick bit widths  │      │ body (widths from plan)      │
///   │ size = hdr + body│      │ finish: cursor == header end │
///   └──────────────────┘      └──────────────────────────────┘
/// ```
///
/// Decoding reads the header, derives the end of the record from the
/// declared length, decodes the body and checks the cursor landed on that
/// end. Every record belongs to a [`Family`], whose name tags diagnostics.
pub trait Record: Family {
    type Plan;

    /// # Errors
    ///
    /// Any wire or field error met while reading, including a
    /// `CodingMismatch` when the body disagrees with its declared length.
    fn decode(r: &mut BitReader<'_>, ctx: &Context<'_>) -> Result<Self, TypeError>;

    /// # Errors
    ///
    /// Field values that cannot be encoded.
    fn prepare(&self, ctx: &Context<'_>) -> Result<Prepared<Self::Plan>, TypeError>;

    /// # Errors
    ///
    /// Wire errors, a `CodingMismatch`, or [`TypeError::PlanMismatch`] when
    /// `prepared` was not produced by this record.
    fn encode(
        &self,
        prepared: &Prepared<Self::Plan>,
        w: &mut BitWriter,
        ctx: &Context<'_>,
    ) -> Result<(), TypeError>;

    /// Type code used in diagnostics.
    fn code(&self) -> u16;
}

/// Run both phases for `record` and return the number of bytes written.
///
/// # Errors
///
/// Errors from either phase, or [`TypeError::SizeMismatch`] when the
/// bytes written differ from the prepared size.
pub fn write_record<R: Record>(
    record: &R,
    w: &mut BitWriter,
    ctx: &Context<'_>,
) -> Result<usize, TypeError> {
    let prepared = record.prepare(ctx)?;
    write_prepared(record, &prepared, w, ctx)
}

/// Write `record` with an existing plan and verify the size it promised.
/// Strings are written in the text encoding of `ctx`, as they were sized.
///
/// # Errors
///
/// See [`write_record`].
pub fn write_prepared<R: Record>(
    record: &R,
    prepared: &Prepared<R::Plan>,
    w: &mut BitWriter,
    ctx: &Context<'_>,
) -> Result<usize, TypeError> {
    w.set_text_encoding(ctx.text_encoding());
    w.align_to_byte();
    let start = w.pointer();
    record.encode(prepared, w, ctx)?;
    w.align_to_byte();
    let written = (w.pointer() - start) / 8;
    if written != prepared.size {
        return Err(TypeError::SizeMismatch {
            family: R::FAMILY,
            code: record.code(),
            prepared: prepared.size,
            written,
        });
    }
    Ok(written)
}

/// Prepare every record of a list, in order.
///
/// # Errors
///
/// The first preparation error.
pub fn prepare_all<R: Record>(
    records: &[R],
    ctx: &Context<'_>,
) -> Result<Vec<Prepared<R::Plan>>, TypeError> {
    records.iter().map(|r| r.prepare(ctx)).collect()
}

/// Write a list of records with the plans from [`prepare_all`].
///
/// # Errors
///
/// See [`write_record`], plus [`TypeError::PlanMismatch`] when the plan
/// list does not match the record list.
pub fn write_all<R: Record>(
    records: &[R],
    plans: &[Prepared<R::Plan>],
    w: &mut BitWriter,
    ctx: &Context<'_>,
) -> Result<usize, TypeError> {
    if records.len() != plans.len() {
        return Err(TypeError::PlanMismatch { code: 0 });
    }
    let mut written = 0;
    for (record, prepared) in records.iter().zip(plans) {
        written += write_prepared(record, prepared, w, ctx)?;
    }
    Ok(written)
}

/// Total size of a list of prepared records.
#[must_use]
pub fn total_size<P>(plans: &[Prepared<P>]) -> usize {
    plans.iter().map(|p| p.size).sum()
}

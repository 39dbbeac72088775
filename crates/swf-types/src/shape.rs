//! Vector shapes: style tables followed by a bit-packed stream of shape
//! records.
//!
//! Shape records are not byte-aligned individually; only the record stream
//! as a whole ends on a byte boundary, and style tables introduced mid-stream
//! start on one. Sizing therefore walks the stream at bit granularity.
//!
//! Widths follow the same rule as the geometry structures: narrowest for
//! records built in memory, kept as read for decoded records that used a
//! wider field or the general form of an axis-aligned edge.

use swf_wire::bits::{index_bits, max_signed_bits, signed_bits};
use swf_wire::{BitReader, BitWriter};

use crate::context::Context;
use crate::error::{TypeError, check_range};
use crate::geometry::{kept_width, read_width, wider_than};
use crate::style::Styles;

/// Edge deltas are stored in at most 17 bits.
const EDGE_MIN: i64 = -(1 << 16);
const EDGE_MAX: i64 = (1 << 16) - 1;

const FLAG_NEW_STYLES: u32 = 0b1_0000;
const FLAG_LINE_STYLE: u32 = 0b0_1000;
const FLAG_FILL_STYLE1: u32 = 0b0_0100;
const FLAG_FILL_STYLE0: u32 = 0b0_0010;
const FLAG_MOVE_TO: u32 = 0b0_0001;

fn check_edge(field: &'static str, value: i32) -> Result<(), TypeError> {
    check_range(field, i64::from(value), EDGE_MIN, EDGE_MAX)
}

/// Straight edge, as a delta from the current drawing position (twips).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StraightEdge {
    dx: i32,
    dy: i32,
    nbits: Option<u8>,
    /// Both deltas stored although one of them is zero.
    general: bool,
}

impl StraightEdge {
    /// # Errors
    ///
    /// [`TypeError::OutOfRange`] if a delta needs more than 17 bits.
    pub fn new(dx: i32, dy: i32) -> Result<Self, TypeError> {
        check_edge("straight edge dx", dx)?;
        check_edge("straight edge dy", dy)?;
        Ok(Self {
            dx,
            dy,
            nbits: None,
            general: false,
        })
    }

    #[must_use]
    pub fn dx(&self) -> i32 {
        self.dx
    }

    #[must_use]
    pub fn dy(&self) -> i32 {
        self.dy
    }

    /// Narrowest width for the stored deltas: a vertical edge (dx = 0)
    /// stores only dy, a horizontal one only dx, a general one both.
    fn minimal_bits(&self) -> u32 {
        let bits = if self.is_general() {
            signed_bits(self.dx).max(signed_bits(self.dy))
        } else if self.dx == 0 {
            signed_bits(self.dy)
        } else {
            signed_bits(self.dx)
        };
        bits.max(2)
    }

    fn bits(&self) -> u32 {
        kept_width(self.minimal_bits(), self.nbits)
    }

    fn is_general(&self) -> bool {
        self.general || (self.dx != 0 && self.dy != 0)
    }
}

/// Quadratic Bézier edge: control point and anchor, both as deltas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CurvedEdge {
    control_dx: i32,
    control_dy: i32,
    anchor_dx: i32,
    anchor_dy: i32,
    nbits: Option<u8>,
}

impl CurvedEdge {
    /// # Errors
    ///
    /// [`TypeError::OutOfRange`] if a delta needs more than 17 bits.
    pub fn new(control_dx: i32, control_dy: i32, anchor_dx: i32, anchor_dy: i32) -> Result<Self, TypeError> {
        check_edge("curved edge control_dx", control_dx)?;
        check_edge("curved edge control_dy", control_dy)?;
        check_edge("curved edge anchor_dx", anchor_dx)?;
        check_edge("curved edge anchor_dy", anchor_dy)?;
        Ok(Self {
            control_dx,
            control_dy,
            anchor_dx,
            anchor_dy,
            nbits: None,
        })
    }

    #[must_use]
    pub fn control(&self) -> (i32, i32) {
        (self.control_dx, self.control_dy)
    }

    #[must_use]
    pub fn anchor(&self) -> (i32, i32) {
        (self.anchor_dx, self.anchor_dy)
    }

    fn values(&self) -> [i32; 4] {
        [self.control_dx, self.control_dy, self.anchor_dx, self.anchor_dy]
    }

    fn minimal_bits(&self) -> u32 {
        max_signed_bits(&self.values()).max(2)
    }

    fn bits(&self) -> u32 {
        kept_width(self.minimal_bits(), self.nbits)
    }
}

/// Style change record. Style indices are 1-based; `Some(0)` selects "no
/// style", `None` leaves the current selection unchanged.
///
/// `move_bits` and `index_bits` hold widths read from a file when they
/// differ from the ones the encoder would pick; leave them `None` when
/// building records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct StyleChange {
    pub move_to: Option<(i32, i32)>,
    pub fill_style0: Option<u32>,
    pub fill_style1: Option<u32>,
    pub line_style: Option<u32>,
    pub new_styles: Option<Styles>,
    pub move_bits: Option<u8>,
    /// Fill and line index widths announced after `new_styles`.
    pub index_bits: Option<(u8, u8)>,
}

impl StyleChange {
    fn flags(&self) -> u32 {
        let mut flags = 0;
        if self.new_styles.is_some() {
            flags |= FLAG_NEW_STYLES;
        }
        if self.line_style.is_some() {
            flags |= FLAG_LINE_STYLE;
        }
        if self.fill_style1.is_some() {
            flags |= FLAG_FILL_STYLE1;
        }
        if self.fill_style0.is_some() {
            flags |= FLAG_FILL_STYLE0;
        }
        if self.move_to.is_some() {
            flags |= FLAG_MOVE_TO;
        }
        flags
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShapeRecord {
    StyleChange(StyleChange),
    StraightEdge(StraightEdge),
    CurvedEdge(CurvedEdge),
}

/// Encoding decisions for one shape record.
#[derive(Clone, Debug, PartialEq, Eq)]
enum RecordPlan {
    StyleChange {
        move_bits: u32,
        fill_bits: u32,
        line_bits: u32,
        /// Index widths announced after a new style table.
        new_bits: Option<(u32, u32)>,
    },
    Edge {
        bits: u32,
    },
}

/// Plan for a whole shape: the index widths in force at the start, one
/// plan per record, and the encoded size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShapePlan {
    fill_bits: u32,
    line_bits: u32,
    records: Vec<RecordPlan>,
    size: usize,
}

impl ShapePlan {
    /// Encoded size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }
}

/// A shape with its style tables.
///
/// ```text
///  styles │ UB[4] fill_bits │ UB[4] line_bits │ records … │ end (UB[6] 0) │ pad
/// ```
///
/// The end record is implicit: it is written after the last record and
/// consumed on read.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ShapeWithStyle {
    pub styles: Styles,
    pub records: Vec<ShapeRecord>,
    /// Fill and line index widths read from a file, when they differ
    /// from the narrowest ones for `styles`.
    pub index_bits: Option<(u8, u8)>,
}

/// An index must name a table entry and fit the active index width.
fn check_index(field: &'static str, index: Option<u32>, count: usize, bits: u32) -> Result<(), TypeError> {
    if let Some(index) = index {
        let max = (count as i64).min((1i64 << bits) - 1);
        check_range(field, i64::from(index), 0, max)?;
    }
    Ok(())
}

fn table_bits(styles: &Styles, kept: Option<(u8, u8)>) -> (u32, u32) {
    kept.map_or_else(
        || (index_bits(styles.fills.len()), index_bits(styles.lines.len())),
        |(fill, line)| (u32::from(fill), u32::from(line)),
    )
}

/// Index widths worth remembering: ones that differ from the narrowest.
fn differing_table_bits(styles: &Styles, fill: u32, line: u32) -> Option<(u8, u8)> {
    ((fill, line) != table_bits(styles, None)).then(|| (fill as u8, line as u8))
}

fn check_table_bits(fill_bits: u32, line_bits: u32) -> Result<(), TypeError> {
    check_range("fill style index bits", i64::from(fill_bits), 0, 15)?;
    check_range("line style index bits", i64::from(line_bits), 0, 15)
}

impl ShapeWithStyle {
    /// Size the shape and fix every bit width.
    ///
    /// # Errors
    ///
    /// [`TypeError::OutOfRange`] for a style index beyond its table or a
    /// move delta wider than 31 bits.
    pub fn plan(&self, ctx: &Context<'_>) -> Result<ShapePlan, TypeError> {
        let (fill_bits, line_bits) = table_bits(&self.styles, self.index_bits);
        check_table_bits(fill_bits, line_bits)?;
        let mut pos = (self.styles.encoded_len(ctx)? * 8 + 8) as u64;
        let (mut fills, mut lines) = (self.styles.fills.len(), self.styles.lines.len());
        let (mut fb, mut lb) = (fill_bits, line_bits);
        let mut records = Vec::with_capacity(self.records.len());

        for record in &self.records {
            match record {
                ShapeRecord::StyleChange(change) => {
                    check_index("fill style 0", change.fill_style0, fills, fb)?;
                    check_index("fill style 1", change.fill_style1, fills, fb)?;
                    check_index("line style", change.line_style, lines, lb)?;
                    pos += 6;
                    let mut move_bits = 0;
                    if let Some((x, y)) = change.move_to {
                        check_range("move delta x", i64::from(x), -(1 << 30), (1 << 30) - 1)?;
                        check_range("move delta y", i64::from(y), -(1 << 30), (1 << 30) - 1)?;
                        move_bits = kept_width(signed_bits(x).max(signed_bits(y)), change.move_bits);
                        check_range("move bits", i64::from(move_bits), 1, 31)?;
                        pos += 5 + 2 * u64::from(move_bits);
                    }
                    pos += u64::from(fb) * u64::from(change.fill_style0.is_some());
                    pos += u64::from(fb) * u64::from(change.fill_style1.is_some());
                    pos += u64::from(lb) * u64::from(change.line_style.is_some());
                    let mut new_bits = None;
                    let (this_fb, this_lb) = (fb, lb);
                    if let Some(styles) = &change.new_styles {
                        pos = pos.div_ceil(8) * 8 + styles.encoded_len(ctx)? as u64 * 8 + 8;
                        let bits = table_bits(styles, change.index_bits);
                        check_table_bits(bits.0, bits.1)?;
                        (fills, lines) = (styles.fills.len(), styles.lines.len());
                        (fb, lb) = bits;
                        new_bits = Some(bits);
                    }
                    records.push(RecordPlan::StyleChange {
                        move_bits,
                        fill_bits: this_fb,
                        line_bits: this_lb,
                        new_bits,
                    });
                }
                ShapeRecord::StraightEdge(edge) => {
                    let bits = edge.bits();
                    let deltas = if edge.is_general() { 2 * bits } else { 1 + bits };
                    pos += 2 + 4 + 1 + u64::from(deltas);
                    records.push(RecordPlan::Edge { bits });
                }
                ShapeRecord::CurvedEdge(edge) => {
                    let bits = edge.bits();
                    pos += 2 + 4 + 4 * u64::from(bits);
                    records.push(RecordPlan::Edge { bits });
                }
            }
        }
        pos += 6;

        Ok(ShapePlan {
            fill_bits,
            line_bits,
            records,
            size: pos.div_ceil(8) as usize,
        })
    }

    /// # Errors
    ///
    /// [`TypeError::PlanMismatch`] if `plan` was built for another shape,
    /// or a wire error.
    pub fn write(&self, plan: &ShapePlan, w: &mut BitWriter, ctx: &Context<'_>) -> Result<(), TypeError> {
        if plan.records.len() != self.records.len() {
            return Err(TypeError::PlanMismatch { code: 0 });
        }
        self.styles.write(w, ctx)?;
        w.write_ubits(plan.fill_bits, 4)?;
        w.write_ubits(plan.line_bits, 4)?;

        for (record, record_plan) in self.records.iter().zip(&plan.records) {
            match (record, record_plan) {
                (
                    ShapeRecord::StyleChange(change),
                    RecordPlan::StyleChange {
                        move_bits,
                        fill_bits,
                        line_bits,
                        new_bits,
                    },
                ) => {
                    w.write_bool(false)?;
                    w.write_ubits(change.flags(), 5)?;
                    if let Some((x, y)) = change.move_to {
                        w.write_ubits(*move_bits, 5)?;
                        w.write_sbits(x, *move_bits)?;
                        w.write_sbits(y, *move_bits)?;
                    }
                    if let Some(index) = change.fill_style0 {
                        w.write_ubits(index, *fill_bits)?;
                    }
                    if let Some(index) = change.fill_style1 {
                        w.write_ubits(index, *fill_bits)?;
                    }
                    if let Some(index) = change.line_style {
                        w.write_ubits(index, *line_bits)?;
                    }
                    if let (Some(styles), Some((fb, lb))) = (&change.new_styles, new_bits) {
                        styles.write(w, ctx)?;
                        w.write_ubits(*fb, 4)?;
                        w.write_ubits(*lb, 4)?;
                    }
                }
                (ShapeRecord::StraightEdge(edge), RecordPlan::Edge { bits }) => {
                    w.write_bool(true)?;
                    w.write_bool(true)?;
                    w.write_ubits(bits - 2, 4)?;
                    if edge.is_general() {
                        w.write_bool(true)?;
                        w.write_sbits(edge.dx, *bits)?;
                        w.write_sbits(edge.dy, *bits)?;
                    } else {
                        w.write_bool(false)?;
                        let vertical = edge.dx == 0;
                        w.write_bool(vertical)?;
                        w.write_sbits(if vertical { edge.dy } else { edge.dx }, *bits)?;
                    }
                }
                (ShapeRecord::CurvedEdge(edge), RecordPlan::Edge { bits }) => {
                    w.write_bool(true)?;
                    w.write_bool(false)?;
                    w.write_ubits(bits - 2, 4)?;
                    for v in edge.values() {
                        w.write_sbits(v, *bits)?;
                    }
                }
                _ => return Err(TypeError::PlanMismatch { code: 0 }),
            }
        }
        // end record: non-edge with no flags
        w.write_ubits(0, 6)?;
        w.align_to_byte();
        Ok(())
    }

    /// # Errors
    ///
    /// Wire errors, [`TypeError::ZeroBitWidth`] for a zero move width, or
    /// [`TypeError::UnknownCode`] for an unknown fill style.
    pub fn read(r: &mut BitReader<'_>, ctx: &Context<'_>) -> Result<Self, TypeError> {
        let styles = Styles::read(r, ctx)?;
        let mut fb = r.read_ubits(4)?;
        let mut lb = r.read_ubits(4)?;
        let index_bits = differing_table_bits(&styles, fb, lb);
        let mut records = Vec::new();

        loop {
            let is_edge = r.read_bool()?;
            if !is_edge {
                let flags = r.read_ubits(5)?;
                if flags == 0 {
                    break;
                }
                let mut change = StyleChange::default();
                if flags & FLAG_MOVE_TO != 0 {
                    let n = read_width(r, 5, "shape move")?;
                    let (x, y) = (r.read_sbits(n)?, r.read_sbits(n)?);
                    change.move_to = Some((x, y));
                    change.move_bits = wider_than(n, signed_bits(x).max(signed_bits(y)));
                }
                if flags & FLAG_FILL_STYLE0 != 0 {
                    change.fill_style0 = Some(r.read_ubits(fb)?);
                }
                if flags & FLAG_FILL_STYLE1 != 0 {
                    change.fill_style1 = Some(r.read_ubits(fb)?);
                }
                if flags & FLAG_LINE_STYLE != 0 {
                    change.line_style = Some(r.read_ubits(lb)?);
                }
                if flags & FLAG_NEW_STYLES != 0 {
                    let styles = Styles::read(r, ctx)?;
                    fb = r.read_ubits(4)?;
                    lb = r.read_ubits(4)?;
                    change.index_bits = differing_table_bits(&styles, fb, lb);
                    change.new_styles = Some(styles);
                }
                records.push(ShapeRecord::StyleChange(change));
            } else if r.read_bool()? {
                let bits = r.read_ubits(4)? + 2;
                let mut edge = if r.read_bool()? {
                    let (dx, dy) = (r.read_sbits(bits)?, r.read_sbits(bits)?);
                    StraightEdge {
                        dx,
                        dy,
                        nbits: None,
                        general: dx == 0 || dy == 0,
                    }
                } else if r.read_bool()? {
                    StraightEdge {
                        dx: 0,
                        dy: r.read_sbits(bits)?,
                        nbits: None,
                        general: false,
                    }
                } else {
                    StraightEdge {
                        dx: r.read_sbits(bits)?,
                        dy: 0,
                        nbits: None,
                        general: false,
                    }
                };
                edge.nbits = wider_than(bits, edge.minimal_bits());
                records.push(ShapeRecord::StraightEdge(edge));
            } else {
                let bits = r.read_ubits(4)? + 2;
                let mut edge = CurvedEdge {
                    control_dx: r.read_sbits(bits)?,
                    control_dy: r.read_sbits(bits)?,
                    anchor_dx: r.read_sbits(bits)?,
                    anchor_dy: r.read_sbits(bits)?,
                    nbits: None,
                };
                edge.nbits = wider_than(bits, edge.minimal_bits());
                records.push(ShapeRecord::CurvedEdge(edge));
            }
        }
        r.align_to_byte();
        Ok(Self {
            styles,
            records,
            index_bits,
        })
    }
}

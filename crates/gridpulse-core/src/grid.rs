//! Field-major grid codecs.
//!
//! A grid is a linear slice of cells addressed as `row * resolution + column`.
//! Each call writes (or reads) one structural field across the whole slice
//! before the caller moves on to the next field. The order of calls is part
//! of the wire format.
//!
//! The gated variants only carry a value for cells whose gate predicate
//! holds. Nothing records which cells were skipped: the decoder must
//! evaluate the same predicate against state that was fully decoded earlier
//! in the same pass, otherwise every later field is misaligned.

use std::borrow::Cow;

use crate::cursor::{ByteReader, ByteWriter};
use crate::error::DecodeError;
use crate::stream::FieldValue;

/// Linear index of `(column, row)` in a square grid.
#[inline]
pub fn cell_index(column: usize, row: usize, resolution: usize) -> usize {
    row * resolution + column
}

/// View `cells` as exactly `len` cells for encoding. Extra cells are cut and
/// missing ones are filled with `C::default()`; either case is logged.
pub fn fit_cells<'c, C: Clone + Default>(cells: &'c [C], len: usize, field: &'static str) -> Cow<'c, [C]> {
    if cells.len() == len {
        return Cow::Borrowed(cells);
    }
    tracing::warn!(field, found = cells.len(), expected = len, "grid size differs from layout");
    if cells.len() > len {
        Cow::Borrowed(&cells[..len])
    } else {
        let mut fitted = cells.to_vec();
        fitted.resize(len, C::default());
        Cow::Owned(fitted)
    }
}

// ---------------------------------------------------------------------------
// Unconditional fields
// ---------------------------------------------------------------------------

/// Write `select(cell)` for every cell, in index order. Returns the number of
/// values written.
pub fn write_grid_field<C, T, F>(out: &mut ByteWriter, cells: &[C], select: F) -> usize
where
    T: FieldValue,
    F: Fn(&C) -> T,
{
    let mut field = out.begin_write::<T>();
    for cell in cells {
        field.write(select(cell));
    }
    field.end_write()
}

/// Read one value per cell, in index order, and hand it to `set`.
pub fn read_grid_field<C, T, F>(
    input: &mut ByteReader<'_>,
    cells: &mut [C],
    mut set: F,
) -> Result<(), DecodeError>
where
    T: FieldValue,
    F: FnMut(&mut C, T),
{
    let mut field = input.begin_read::<T>();
    for cell in cells.iter_mut() {
        set(cell, field.read()?);
    }
    field.end_read();
    Ok(())
}

// ---------------------------------------------------------------------------
// Gated fields
// ---------------------------------------------------------------------------

/// Write `select(cell)` only for cells where `gate(cell)` holds. Returns the
/// number of values written.
pub fn write_gated_field<C, T, G, F>(
    out: &mut ByteWriter,
    cells: &[C],
    gate: G,
    select: F,
) -> usize
where
    T: FieldValue,
    G: Fn(&C) -> bool,
    F: Fn(&C) -> T,
{
    let mut field = out.begin_write::<T>();
    for cell in cells.iter().filter(|cell| gate(*cell)) {
        field.write(select(cell));
    }
    field.end_write()
}

/// Read a gated field. Cells where `gate(cell)` holds consume one value from
/// the stream; every other cell receives `default` without touching the
/// stream. Returns the number of values consumed.
pub fn read_gated_field<C, T, G, F>(
    input: &mut ByteReader<'_>,
    cells: &mut [C],
    gate: G,
    mut set: F,
    default: T,
) -> Result<usize, DecodeError>
where
    T: FieldValue,
    G: Fn(&C) -> bool,
    F: FnMut(&mut C, T),
{
    let mut field = input.begin_read::<T>();
    for cell in cells.iter_mut() {
        let value = if gate(&*cell) { field.read()? } else { default };
        set(cell, value);
    }
    Ok(field.end_read())
}

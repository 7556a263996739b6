//! Pulse-network propagation state: group tables and circular unit queues.
//!
//! A pulse network floods charge (or pressure) outward from sources one
//! breadth-first step at a time. Two structures carry its in-flight state:
//!
//! - [`PulseGroupTable`] -- a bounded array of per-region accumulators of
//!   which only the first `count` entries are live.
//! - [`PulseQueue`] -- a fixed-capacity circular FIFO of pending steps,
//!   addressed by independent start/end offsets that wrap modulo capacity.
//!
//! Queues are serialized in logical (FIFO) order. The physical wrap point is
//! never written; decoding re-anchors the queue so that `start == 0`.

use crate::cursor::{ByteReader, ByteWriter};
use crate::error::DecodeError;
use crate::report::DecodeReport;

// ---------------------------------------------------------------------------
// Limits and records
// ---------------------------------------------------------------------------

/// Bounds every decoded pulse record is validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseLimits {
    /// Grid resolution; coordinates must be below it.
    pub resolution: usize,
    /// Pulse group capacity; group references must be below it.
    pub group_capacity: usize,
    /// Network node capacity; node references must be below it.
    pub node_capacity: usize,
}

/// A fixed-shape record stored in a pulse table or queue.
pub trait PulseRecord: Clone + Default {
    /// Written as raw scalars on the cursor, in a fixed field order.
    fn write(&self, out: &mut ByteWriter);

    /// Read one record and validate every index it carries.
    fn read(
        input: &mut ByteReader<'_>,
        limits: &PulseLimits,
        report: &mut DecodeReport,
    ) -> Result<Self, DecodeError>;
}

// ---------------------------------------------------------------------------
// Group table
// ---------------------------------------------------------------------------

/// Largest group table whose count fits the `u16` on the wire.
pub const MAX_TABLE_CAPACITY: usize = u16::MAX as usize;

/// Bounded table of pulse groups; entries at and beyond `len()` are dead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PulseGroupTable<G> {
    groups: Vec<G>,
    count: usize,
}

impl<G: PulseRecord> PulseGroupTable<G> {
    /// Create an empty table. The capacity is clamped to
    /// `1..=MAX_TABLE_CAPACITY`.
    pub fn new(capacity: usize) -> Self {
        Self {
            groups: vec![G::default(); capacity.clamp(1, MAX_TABLE_CAPACITY)],
            count: 0,
        }
    }

    /// Append a group. Returns `false` if the table is full.
    pub fn push(&mut self, group: G) -> bool {
        if self.count == self.groups.len() {
            return false;
        }
        self.groups[self.count] = group;
        self.count += 1;
        true
    }

    pub fn clear(&mut self) {
        self.groups.fill(G::default());
        self.count = 0;
    }
}

impl<G> PulseGroupTable<G> {
    pub fn capacity(&self) -> usize {
        self.groups.len()
    }

    /// Number of live groups.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn get(&self, index: usize) -> Option<&G> {
        self.as_slice().get(index)
    }

    /// The live groups.
    pub fn as_slice(&self) -> &[G] {
        &self.groups[..self.count]
    }
}

/// Write the live count as a `u16` followed by that many records.
pub fn write_groups<G: PulseRecord>(out: &mut ByteWriter, table: &PulseGroupTable<G>) {
    out.write_u16(table.len() as u16);
    for group in table.as_slice() {
        group.write(out);
    }
}

/// Read a group table written by [`write_groups`] into `table`, replacing
/// its contents. Returns the new live count.
///
/// A count larger than the table's capacity is reported as an anomaly; all
/// records are still consumed so the stream stays aligned, and the excess is
/// dropped.
pub fn read_groups<G: PulseRecord>(
    input: &mut ByteReader<'_>,
    table: &mut PulseGroupTable<G>,
    limits: &PulseLimits,
    report: &mut DecodeReport,
    field: &'static str,
) -> Result<usize, DecodeError> {
    table.clear();
    let count = usize::from(input.read_u16()?);
    let capacity = table.capacity();
    if count > capacity {
        report.overflow(field, count, capacity);
    }
    for i in 0..count {
        let group = G::read(input, limits, report)?;
        if i < capacity {
            table.groups[i] = group;
        } else {
            report.discarded_records += 1;
        }
    }
    table.count = count.min(capacity);
    Ok(table.count)
}

// ---------------------------------------------------------------------------
// Circular unit queue
// ---------------------------------------------------------------------------

/// Largest queue buffer. One slot stays free, so the queued count still
/// fits the `u16` on the wire.
pub const MAX_QUEUE_CAPACITY: usize = u16::MAX as usize + 1;

/// Fixed-capacity circular FIFO. One slot always stays free so that
/// `start == end` means empty; at most `capacity - 1` units are queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PulseQueue<U> {
    units: Vec<U>,
    start: usize,
    end: usize,
}

impl<U: PulseRecord> PulseQueue<U> {
    /// Create an empty queue. The capacity is clamped to
    /// `1..=MAX_QUEUE_CAPACITY`.
    pub fn new(capacity: usize) -> Self {
        Self {
            units: vec![U::default(); capacity.clamp(1, MAX_QUEUE_CAPACITY)],
            start: 0,
            end: 0,
        }
    }
}

impl<U> PulseQueue<U> {
    /// Build a queue from a physical buffer and offsets, as the host holds
    /// it. Returns `None` if the buffer is empty or larger than
    /// [`MAX_QUEUE_CAPACITY`], or if either offset is outside it.
    pub fn from_parts(units: Vec<U>, start: usize, end: usize) -> Option<Self> {
        if units.is_empty() || units.len() > MAX_QUEUE_CAPACITY || start >= units.len() || end >= units.len() {
            return None;
        }
        Some(Self { units, start, end })
    }

    pub fn capacity(&self) -> usize {
        self.units.len()
    }

    /// Physical offset of the oldest unit.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Physical offset one past the newest unit.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of queued units: `(end - start) mod capacity`.
    pub fn len(&self) -> usize {
        (self.end + self.capacity() - self.start) % self.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn is_full(&self) -> bool {
        self.len() == self.capacity() - 1
    }

    /// Enqueue at the end. Returns `false` if the queue is full.
    pub fn push_back(&mut self, unit: U) -> bool {
        if self.is_full() {
            return false;
        }
        self.units[self.end] = unit;
        self.end = (self.end + 1) % self.capacity();
        true
    }

    /// Dequeue from the start.
    pub fn pop_front(&mut self) -> Option<U>
    where
        U: Clone,
    {
        if self.is_empty() {
            return None;
        }
        let unit = self.units[self.start].clone();
        self.start = (self.start + 1) % self.capacity();
        Some(unit)
    }

    /// Units in FIFO order.
    pub fn iter(&self) -> impl Iterator<Item = &U> + '_ {
        let capacity = self.capacity();
        (0..self.len()).map(move |i| &self.units[(self.start + i) % capacity])
    }

    /// The physical buffer, including dead slots.
    pub fn physical(&self) -> &[U] {
        &self.units
    }
}

/// Write the queued count as a `u16` followed by the units in FIFO order,
/// walking physical slots from `start` to `end` modulo capacity.
pub fn write_units<U: PulseRecord>(out: &mut ByteWriter, queue: &PulseQueue<U>) {
    out.write_u16(queue.len() as u16);
    for unit in queue.iter() {
        unit.write(out);
    }
}

/// Read a queue written by [`write_units`] into `queue`, replacing its
/// contents. Units land in physical slots `0..count`; the new start offset is
/// 0 and the returned end offset is `count mod capacity`.
///
/// A count that does not fit is reported, fully consumed, and cut down to
/// `capacity - 1`.
pub fn read_units<U: PulseRecord>(
    input: &mut ByteReader<'_>,
    queue: &mut PulseQueue<U>,
    limits: &PulseLimits,
    report: &mut DecodeReport,
    field: &'static str,
) -> Result<usize, DecodeError> {
    queue.units.fill(U::default());
    queue.start = 0;
    queue.end = 0;

    let count = usize::from(input.read_u16()?);
    let room = queue.capacity() - 1;
    if count > room {
        report.overflow(field, count, room);
    }
    for i in 0..count {
        let unit = U::read(input, limits, report)?;
        if i < room {
            queue.units[i] = unit;
        } else {
            report.discarded_records += 1;
        }
    }
    queue.end = count.min(room) % queue.capacity();
    Ok(queue.end)
}

// ---------------------------------------------------------------------------
// Trailing propagation progress
// ---------------------------------------------------------------------------

/// Scalars that close every network payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropagationProgress {
    pub processed_cells: i32,
    pub conductive_cells: i32,
    pub can_continue: bool,
}

impl PropagationProgress {
    pub fn write(&self, out: &mut ByteWriter) {
        out.write_i32(self.processed_cells);
        out.write_i32(self.conductive_cells);
        out.write_bool(self.can_continue);
    }

    pub fn read(input: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            processed_cells: input.read_i32()?,
            conductive_cells: input.read_i32()?,
            can_continue: input.read_bool()?,
        })
    }
}

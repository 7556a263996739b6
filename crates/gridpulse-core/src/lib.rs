//! Gridpulse Core -- field-major binary codec for fixed-size simulation grids.
//!
//! This crate provides the building blocks every domain codec (districts,
//! areas, electricity, water) is assembled from: a byte cursor, typed field
//! streams, field-major and gated grid codecs, the pulse-network state codec,
//! the validation guard, version plans and the container envelope.
//!
//! # Decode Pipeline
//!
//! A domain decode runs linearly through these stages:
//!
//! 1. **Gating fields** -- unconditional per-cell fields (conductivity, ids).
//! 2. **Gated fields** -- fields present only where the gate is non-zero.
//! 3. **Version branch** -- synthesize groups absent from older formats.
//! 4. **Network state** -- pulse-group tables and pulse-unit queues.
//! 5. **Repair** -- one-off fixups tied to a single historical version.
//!
//! Only a truncated stream aborts a decode. Out-of-range indices are clamped
//! by the [`guard`] and recorded in the [`report::DecodeReport`].
//!
//! # Key Types
//!
//! - [`cursor::ByteWriter`] / [`cursor::ByteReader`] -- raw little-endian cursor.
//! - [`stream::FieldWriter`] / [`stream::FieldReader`] -- scoped per-field streams.
//! - [`grid`] -- field-major and gated grid codecs.
//! - [`pulse::PulseGroupTable`] / [`pulse::PulseQueue`] -- network propagation state.
//! - [`version::VersionPlan`] -- per-version table consulted once per decode.
//! - [`host::DomainCodec`] / [`host::HostAccess`] -- the seam to the host simulation.

pub mod cursor;
pub mod envelope;
pub mod error;
pub mod grid;
pub mod guard;
pub mod host;
pub mod options;
pub mod pulse;
pub mod report;
pub mod stream;
pub mod version;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

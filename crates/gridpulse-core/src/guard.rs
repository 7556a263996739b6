//! Validation guard for decoded indices.
//!
//! Every decoded coordinate, node reference and group index passes through
//! here before it can be used to address another array. Out-of-range values
//! are logged and replaced by a safe default; the decode carries on.

use std::fmt;

/// Reference value meaning "not assigned to any group".
pub const UNASSIGNED: u16 = u16::MAX;

/// Integer types the guard accepts.
pub trait GuardValue: Copy + Default + PartialEq + fmt::Debug {
    fn as_i64(self) -> i64;
}

macro_rules! guard_value {
    ($($t:ty),*) => {
        $(impl GuardValue for $t {
            fn as_i64(self) -> i64 {
                self as i64
            }
        })*
    };
}

guard_value!(u8, u16, i16, u32, i32);

/// Whether `value` can index an array of length `limit`.
pub fn in_range<T: GuardValue>(value: T, limit: usize) -> bool {
    let v = value.as_i64();
    v >= 0 && (v as u64) < limit as u64
}

/// Return `value` unchanged if it is a valid index below `limit`, otherwise
/// log `field` as an error and return zero.
pub fn clamp_index<T: GuardValue>(value: T, limit: usize, field: &'static str) -> T {
    if in_range(value, limit) {
        return value;
    }
    tracing::error!(field, value = value.as_i64(), limit, "decoded index out of range, reset to 0");
    T::default()
}

/// Like [`clamp_index`] for references that may hold [`UNASSIGNED`]. The
/// sentinel passes through; other out-of-range values become the sentinel.
pub fn clamp_ref(value: u16, limit: usize, field: &'static str) -> u16 {
    if value == UNASSIGNED || in_range(value, limit) {
        return value;
    }
    tracing::error!(field, value, limit, "decoded reference out of range, reset to unassigned");
    UNASSIGNED
}

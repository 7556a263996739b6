//! District, park and unlockable-area grids for the Gridpulse codec.
//!
//! Both domains store every field of every cell; there is no gating. The
//! district container carries two grids (districts and parks) of the same
//! cell shape, the area container a single byte per tile.

pub mod area;
pub mod district;

pub use area::{AreaCodec, AreaLayout, AreaState};
pub use district::{DistrictCell, DistrictCodec, DistrictLayout, DistrictState};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

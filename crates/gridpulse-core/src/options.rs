//! Behaviour toggles passed to codecs at construction time.

use serde::{Deserialize, Serialize};

/// Options recognised by the domain codecs. Codecs never consult global
/// state; whatever the host's settings say arrives through this struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecOptions {
    /// Area decode marks every locked tile as unlocked.
    pub ignore_unlocking: bool,
    /// Roads conduct electricity. When off, electricity decode clears the
    /// road-carried temporary electrified flags.
    pub electric_roads_enabled: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            ignore_unlocking: false,
            electric_roads_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_keep_data_untouched() {
        let options = CodecOptions::default();
        assert!(!options.ignore_unlocking);
        assert!(options.electric_roads_enabled);
    }
}

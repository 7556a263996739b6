//! Loading codec options from configuration files.
//!
//! A settings directory holds at most one `gridpulse.{ron,toml,json}`. Every
//! key is optional; missing keys keep their [`CodecOptions::default`] value,
//! and a missing file means all defaults.

pub mod loader;

pub use loader::{ConfigError, Format, OPTIONS_BASE_NAME, load_options, load_options_from_dir, save_options};

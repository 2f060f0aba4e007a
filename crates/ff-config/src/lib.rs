//! fitframe configuration loading and resolution.
//!
//! This crate provides:
//! - Typed Rust structs for `config.json`
//! - Config resolution (CLI → env → XDG → defaults)

pub mod frame;
pub mod resolve;

pub use frame::{ColumnOrder, CompressionKind, ExportConfig, FrameConfig, UnrecognizedPolicy};
pub use resolve::{resolve_config, ConfigError, ConfigSource, ResolvedConfig, CONFIG_ENV_VAR};

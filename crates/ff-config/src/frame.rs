//! Aggregation and export settings.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Order in which a table's columns are emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ColumnOrder {
    /// Alphabetical by column name.
    #[default]
    Name,
    /// Order in which columns were first seen in the stream.
    Discovery,
}

/// What an unrecognized field encoding becomes in the numeric columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum UnrecognizedPolicy {
    /// Leave the cell empty.
    #[default]
    Null,
    /// Store the legacy `-1` placeholder.
    Sentinel,
}

impl UnrecognizedPolicy {
    /// Placeholder written under [`UnrecognizedPolicy::Sentinel`].
    pub const SENTINEL: f64 = -1.0;

    /// The value stored for an unrecognized scalar, if any.
    pub fn substitute(self) -> Option<f64> {
        match self {
            UnrecognizedPolicy::Null => None,
            UnrecognizedPolicy::Sentinel => Some(Self::SENTINEL),
        }
    }
}

/// Parquet compression codec.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CompressionKind {
    #[default]
    Zstd,
    Snappy,
    None,
}

/// Tabular export settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub compression: CompressionKind,
}

/// Complete fitframe configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameConfig {
    #[serde(default)]
    pub column_order: ColumnOrder,

    #[serde(default)]
    pub unrecognized_values: UnrecognizedPolicy,

    #[serde(default)]
    pub export: ExportConfig,
}

impl FrameConfig {
    /// Parse a configuration document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the configuration to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

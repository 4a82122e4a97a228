//! # Profile Export
//!
//! Exports per-frame profiler samples captured by a game-engine editor to CSV files
//! for offline analysis.
//!
//! ## Features
//!
//! - **Scalar counters**: CPU, memory and rendering statistics, one row per frame
//! - **Call hierarchy**: frame-level timings plus one row per call-tree item under each branch node
//! - **Recorded captures**: runs offline from a JSON capture exported by the host editor
//! - **Configuration**: TOML/JSON config files with environment overrides
//!
//! 展平逻辑在独立的 [`profile_export_core`] crate 中，本crate负责配置、日志和文件读写。
//!
//! ### Example
//!
//! ```no_run
//! use profile_export::{config::ExportConfig, export};
//!
//! let (config, _) = ExportConfig::load_or_default()?;
//! let summary = export::export_capture(&config)?;
//! println!("exported frames {}..{}", summary.range.first, summary.range.last);
//! # Ok::<(), profile_export::error::ExportError>(())
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Export configuration
//! - [`error`]: Error types
//! - [`export`]: Capture loading and CSV writing
//! - [`logging`]: Logging setup

/// Export configuration (TOML/JSON, environment overrides)
pub mod config;
/// Error types for the export tool
pub mod error;
/// Capture loading and writing of the five CSV tables
pub mod export;
/// Logging setup
pub mod logging;

//! Traits for table-aware queries
//!
//! This module contains the descriptor and binder traits every query
//! and row materialization goes through.

pub mod scan_args;
pub mod table_metadata;

pub use scan_args::ScanArgs;
pub use table_metadata::{TableMetadata, Tabler};

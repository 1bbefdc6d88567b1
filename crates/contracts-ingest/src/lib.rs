//! Source data handling for the contracts pipeline.
//!
//! This crate owns everything that touches the network or the filesystem:
//!
//! - **Fetch**: download the published workbook with one HTTP GET
//! - **Workbook**: split each sheet into `<sheet>.csv`
//! - **CSV**: read CSVs into string-typed Polars frames, write frames back,
//!   and publish the final table with a write-then-rename
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use contracts_ingest::{fetch_workbook, read_csv_frame, split_workbook};
//!
//! let raw = Path::new("data/raw");
//! let fetched = fetch_workbook(url, &raw.join("contracts.xlsx"))?;
//! split_workbook(&fetched.path, raw, |sheet| sheet == "Field Information")?;
//! let items = read_csv_frame(&raw.join("tender_items.csv"))?;
//! ```

mod csv_io;
mod error;
mod fetch;
pub mod polars_utils;
mod workbook;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV ===
pub use csv_io::{publish_csv_frame, read_csv_frame, write_csv_frame, write_csv_rows};

// === Fetch ===
pub use fetch::{FetchedWorkbook, fetch_workbook, sha256_hex, store_workbook};

// === Workbook ===
pub use workbook::{RawSheet, cell_to_string, split_workbook};

// === Polars helpers ===
pub use polars_utils::{any_to_string, cell_string, column_strings, format_numeric, is_present};

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! rpkilog - RPKI VRP history viewer
//!
//! rpkilog queries a history of RPKI Validated ROA Payloads (VRPs) and shows,
//! one page at a time, how each prefix's authorization changed between
//! observations: created, deleted, replaced, or unchanged. It can be used as
//! both a command-line application and a library.
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | (none) | Data model, diff rendering, pagination, config | `chrono`, `ipnet`, `serde_json` |
//! | `client` | History API queries | `ureq`, `dateparser` |
//! | `display` | Table formatting with `tabled` | `tabled` |
//! | `cli` | CLI binary | All above + `clap`, `tracing-subscriber` |
//!
//! # Architecture
//!
//! - **[`vrp`]**: the validated data model and the diff/pagination logic
//!   - `VrpEntry`, `VrpHistoryEntry`, `HistoryEntryFactory`
//!   - `DiffRowRenderer`, `RowModel`, `Cell`
//!   - `Paginator`, `PageSize`
//!   - `HistoryResultSet`: the owned entries of one query
//!
//! - **[`lens`]**: query arguments, HTTP fetch, and output formatting
//!
//! - **[`config`]**: Configuration management
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use rpkilog::lens::history::HistoryLens;
//! use rpkilog::lens::utils::OutputFormat;
//! use rpkilog::vrp::PageSize;
//!
//! let lens = HistoryLens::offline();
//! let result = lens.load_json(&std::fs::read_to_string("history.json")?)?;
//!
//! for skipped in result.skipped() {
//!     eprintln!("record {} skipped: {}", skipped.index, skipped.error);
//! }
//!
//! let page = lens.render_page(&result, 0, PageSize::parse_or_default("20"));
//! println!("{}", lens.format_page(&page, OutputFormat::Table));
//! ```

pub mod config;
pub mod lens;
pub mod vrp;

// =============================================================================
// Configuration
// =============================================================================

pub use config::RpkilogConfig;

// =============================================================================
// Data model
// =============================================================================

pub use vrp::{
    AddressFamily, Cell, DiffRowRenderer, HistoryEntryFactory, HistoryError, HistoryResultSet,
    PageSize, Paginator, RawHistoryRecord, RowModel, ValidationError, Verb, VrpEntry, VrpField,
    VrpHistoryEntry, VrpPrefix, DEFAULT_PAGE_SIZE,
};

// =============================================================================
// Lens
// =============================================================================

pub use lens::history::{HistoryLens, HistoryPage};
pub use lens::utils::OutputFormat;

#[cfg(feature = "client")]
pub use lens::history::HistoryQueryArgs;

//! VRP history data model
//!
//! This module holds the validated data model for RPKI VRP history and the
//! logic that turns it into a diff table:
//!
//! - [`VrpEntry`]: one validated ROA payload (asn, prefix, maxLength, expires, ta)
//! - [`VrpHistoryEntry`]: one observed change between two optional snapshots
//! - [`HistoryEntryFactory`]: raw history-service record to [`VrpHistoryEntry`]
//! - [`DiffRowRenderer`]: [`VrpHistoryEntry`] to a display-neutral [`RowModel`]
//! - [`Paginator`]: windowing over the ordered entries
//! - [`HistoryResultSet`]: the owned entries of one query
//!
//! Everything here is synchronous and free of I/O.

mod entry;
mod error;
mod history;
mod paginate;
mod prefix;
mod render;
mod result_set;

pub use entry::*;
pub use error::*;
pub use history::*;
pub use paginate::*;
pub use prefix::*;
pub use render::*;
pub use result_set::*;

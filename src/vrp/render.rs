//! Diff rendering of history entries
//!
//! [`DiffRowRenderer`] turns one [`VrpHistoryEntry`] into a [`RowModel`]: one
//! cell per VRP field plus the verb label and observation timestamp. The row
//! model carries no presentation technology; terminal tables use
//! [`Cell::to_text`], JSON consumers serialize the model directly.
//!
//! Cell content is chosen by verb alone:
//!
//! | verb | cell |
//! |------|------|
//! | UNCHANGED | new value, plain |
//! | NEW | new value, inserted |
//! | DELETE | old value, deleted |
//! | REPLACE | plain if old == new, otherwise old deleted over new inserted |
//! | unrecognized | empty (error logged) |

use super::entry::VrpField;
use super::error::HistoryError;
use super::history::{Verb, VrpHistoryEntry};
use serde::Serialize;
use tracing::error;

/// Content of one table cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cell {
    /// Value that did not change
    Plain { value: String },
    /// Value that appeared
    Inserted { value: String },
    /// Value that disappeared
    Deleted { value: String },
    /// Old value deleted, new value inserted, shown stacked
    Changed { old: String, new: String },
    /// No content
    Empty,
}

impl Cell {
    /// Terminal representation: `-` marks deleted, `+` marks inserted
    pub fn to_text(&self) -> String {
        match self {
            Cell::Plain { value } => value.clone(),
            Cell::Inserted { value } => format!("+{}", value),
            Cell::Deleted { value } => format!("-{}", value),
            Cell::Changed { old, new } => format!("-{}\n+{}", old, new),
            Cell::Empty => String::new(),
        }
    }
}

static EMPTY_CELL: Cell = Cell::Empty;

/// One field and its rendered cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldCell {
    pub field: VrpField,
    pub cell: Cell,
}

/// A rendered table row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowModel {
    pub verb: String,
    pub observation_timestamp: String,
    /// Cells in [`VrpField::ALL`] order
    pub cells: Vec<FieldCell>,
}

impl RowModel {
    pub fn cell(&self, field: VrpField) -> &Cell {
        self.cells
            .iter()
            .find(|c| c.field == field)
            .map(|c| &c.cell)
            .unwrap_or(&EMPTY_CELL)
    }

    /// True when the row carries no field content (unrecognized verb)
    pub fn is_placeholder(&self) -> bool {
        self.cells.iter().all(|c| c.cell == Cell::Empty)
    }
}

/// Renders history entries as diff rows
pub struct DiffRowRenderer;

impl DiffRowRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render one entry
    ///
    /// Never fails: an unrecognized verb is logged and produces a row whose
    /// field cells are all [`Cell::Empty`].
    pub fn render(&self, entry: &VrpHistoryEntry) -> RowModel {
        let cells = match self.render_cells(entry) {
            Ok(cells) => cells,
            Err(e) => {
                error!(
                    observation_timestamp = entry.observation_timestamp(),
                    "{}", e
                );
                VrpField::ALL
                    .iter()
                    .map(|field| FieldCell {
                        field: *field,
                        cell: Cell::Empty,
                    })
                    .collect()
            }
        };

        RowModel {
            verb: entry.verb().to_string(),
            observation_timestamp: entry.observation_timestamp().to_string(),
            cells,
        }
    }

    /// Render a sequence of entries in order
    pub fn render_all<'a, I>(&self, entries: I) -> Vec<RowModel>
    where
        I: IntoIterator<Item = &'a VrpHistoryEntry>,
    {
        entries.into_iter().map(|e| self.render(e)).collect()
    }

    fn render_cells(&self, entry: &VrpHistoryEntry) -> Result<Vec<FieldCell>, HistoryError> {
        VrpField::ALL
            .iter()
            .map(|field| {
                Ok(FieldCell {
                    field: *field,
                    cell: self.render_cell(entry, *field)?,
                })
            })
            .collect()
    }

    fn render_cell(&self, entry: &VrpHistoryEntry, field: VrpField) -> Result<Cell, HistoryError> {
        let old = entry.old_entry().map(|e| e.field_text(field));
        let new = entry.new_entry().map(|e| e.field_text(field));

        let cell = match (entry.verb(), old, new) {
            (Verb::Unchanged, _, Some(new)) => Cell::Plain { value: new },
            (Verb::New, _, Some(new)) => Cell::Inserted { value: new },
            (Verb::Delete, Some(old), _) => Cell::Deleted { value: old },
            (Verb::Replace, Some(old), Some(new)) => {
                if old == new {
                    Cell::Plain { value: new }
                } else {
                    Cell::Changed { old, new }
                }
            }
            (Verb::Unrecognized(verb), _, _) => {
                return Err(HistoryError::UnrecognizedVerb(verb.clone()))
            }
            // unreachable for entries built through VrpHistoryEntry::new
            (verb, _, _) => {
                return Err(HistoryError::VerbMismatch {
                    verb: verb.to_string(),
                })
            }
        };
        Ok(cell)
    }
}

impl Default for DiffRowRenderer {
    fn default() -> Self {
        Self::new()
    }
}

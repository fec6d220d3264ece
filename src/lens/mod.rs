//! Lens module
//!
//! This module provides high-level "lens" abstractions that combine business logic
//! with output formatting. Lenses are designed to be reusable across different
//! interfaces (CLI, REST API, GUI).
//!
//! # Feature Requirements
//!
//! | Lens | Feature Required | Dependencies |
//! |------|-----------------|--------------|
//! | `HistoryLens` (render, format) | none | serde_json, tabled with `display` |
//! | `HistoryLens::fetch`, `HistoryQueryArgs` | `client` | ureq, dateparser |
//!
//! # Architecture
//!
//! Each lens module exports:
//! - A **Lens struct** (e.g., `HistoryLens`) - the main entry point for all operations
//! - **Args structs** - input arguments for lens methods
//! - **Output types** - return types and format enums
//!
//! The data model itself lives in [`crate::vrp`]; lenses only orchestrate it.

// =============================================================================
// Utility module (always available)
// =============================================================================
pub mod utils;

// =============================================================================
// History lens
// =============================================================================

// HistoryLens - VRP history query, pagination, and diff rendering
pub mod history;

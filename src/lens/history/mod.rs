//! VRP history lens
//!
//! This module provides the `HistoryLens` for querying the RPKI history service
//! and presenting one page of the result as a diff table:
//! - Query construction and HTTP fetch (requires `client`)
//! - Loading a saved history response
//! - Page selection and diff rendering
//! - Output formatting (table, markdown, JSON, PSV)
//!
//! # Example
//!
//! ```rust,ignore
//! use rpkilog::lens::history::{HistoryLens, HistoryQueryArgs};
//! use rpkilog::lens::utils::OutputFormat;
//! use rpkilog::vrp::PageSize;
//!
//! let lens = HistoryLens::new("https://history.example.net/vrp");
//! let args = HistoryQueryArgs::new().with_prefix("1.6.4.0/22");
//! let result = lens.fetch(&args)?;
//!
//! let page = lens.render_page(&result, 0, PageSize::default());
//! println!("{}", lens.format_page(&page, OutputFormat::Table));
//! ```

#[cfg(feature = "client")]
mod args;

#[cfg(feature = "client")]
pub use args::{HistoryQueryArgs, DEFAULT_PAGINATE_SIZE};

use crate::lens::utils::OutputFormat;
use crate::vrp::{
    DiffRowRenderer, HistoryResultSet, PageLink, PageSize, Paginator, RowModel, VrpField,
};
use anyhow::{anyhow, Result};
use serde::Serialize;
use std::io::Read;

// =============================================================================
// Types
// =============================================================================

/// One rendered page of a history result
#[derive(Debug, Clone, Serialize)]
pub struct HistoryPage {
    /// Query statistics, or a neutral message when there is nothing to show
    pub caption: String,
    pub offset: usize,
    pub page_size: usize,
    /// Zero-based index of the displayed page
    pub current_page: usize,
    pub page_count: usize,
    pub total_entries: usize,
    /// Records dropped because they failed validation
    pub skipped_records: usize,
    pub pages: Vec<PageLink>,
    pub rows: Vec<RowModel>,
}

/// Flattened row for table output
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "display", derive(tabled::Tabled))]
pub struct HistoryTableRow {
    pub verb: String,
    #[cfg_attr(feature = "display", tabled(rename = "observed"))]
    pub observation_timestamp: String,
    pub prefix: String,
    #[cfg_attr(feature = "display", tabled(rename = "maxLength"))]
    pub max_length: String,
    pub asn: String,
    pub ta: String,
    pub expires: String,
}

impl From<&RowModel> for HistoryTableRow {
    fn from(row: &RowModel) -> Self {
        HistoryTableRow {
            verb: row.verb.clone(),
            observation_timestamp: row.observation_timestamp.clone(),
            prefix: row.cell(VrpField::Prefix).to_text(),
            max_length: row.cell(VrpField::MaxLength).to_text(),
            asn: row.cell(VrpField::Asn).to_text(),
            ta: row.cell(VrpField::Ta).to_text(),
            expires: row.cell(VrpField::Expires).to_text(),
        }
    }
}

// =============================================================================
// Lens
// =============================================================================

/// VRP history lens
///
/// Holds only the history service endpoint. Result sets are returned to the
/// caller, who keeps the current one and passes it back for rendering.
pub struct HistoryLens {
    api_url: Option<String>,
    renderer: DiffRowRenderer,
}

impl HistoryLens {
    /// Create a lens that talks to the given history API endpoint
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: Some(api_url.into()),
            renderer: DiffRowRenderer::new(),
        }
    }

    /// Create a lens without an endpoint, for rendering saved responses
    pub fn offline() -> Self {
        Self {
            api_url: None,
            renderer: DiffRowRenderer::new(),
        }
    }

    pub fn api_url(&self) -> Option<&str> {
        self.api_url.as_deref()
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Query the history service
    #[cfg(feature = "client")]
    pub fn fetch(&self, args: &HistoryQueryArgs) -> Result<HistoryResultSet> {
        use crate::vrp::SearchResponse;

        let api_url = self
            .api_url
            .as_deref()
            .ok_or_else(|| anyhow!("No history API URL configured (set api_url)"))?;
        let pairs = args.query_pairs()?;
        tracing::info!("querying {} with {:?}", api_url, pairs);

        let mut request = ureq::get(api_url).header("Accept", "application/json");
        for (name, value) in &pairs {
            request = request.query(*name, value);
        }
        let response = request
            .call()
            .map_err(|e| anyhow!("History query failed: {}", e))?
            .body_mut()
            .read_json::<SearchResponse>()
            .map_err(|e| anyhow!("Failed to decode history response: {}", e))?;

        Ok(HistoryResultSet::from_response(&response))
    }

    /// Load a saved response (search response object or array of records)
    pub fn load_json(&self, text: &str) -> Result<HistoryResultSet> {
        HistoryResultSet::from_json_str(text)
    }

    /// Load a saved response from a reader
    pub fn load_reader<R: Read>(&self, mut reader: R) -> Result<HistoryResultSet> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|e| anyhow!("Failed to read history response: {}", e))?;
        self.load_json(&text)
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Select the page starting at `offset` and render its rows
    pub fn render_page(
        &self,
        result: &HistoryResultSet,
        offset: usize,
        page_size: PageSize,
    ) -> HistoryPage {
        let paginator = Paginator::new(result.entries(), page_size);
        HistoryPage {
            caption: result.caption().to_string(),
            offset,
            page_size: page_size.get(),
            current_page: paginator.current_page(offset),
            page_count: paginator.page_count(),
            total_entries: paginator.total(),
            skipped_records: result.skipped().len(),
            pages: paginator.page_links(),
            rows: self.renderer.render_all(paginator.page(offset)),
        }
    }

    // =========================================================================
    // Formatting methods
    // =========================================================================

    /// Format a rendered page for display
    ///
    /// Table formats print the caption, the table, and the page selector.
    /// Note: Table formats require the `display` feature and fall back to
    /// pretty JSON without it.
    pub fn format_page(&self, page: &HistoryPage, format: OutputFormat) -> String {
        match format {
            OutputFormat::Table | OutputFormat::Markdown => {
                #[cfg(feature = "display")]
                {
                    use tabled::settings::Style;
                    use tabled::Table;

                    let rows: Vec<HistoryTableRow> = page.rows.iter().map(|r| r.into()).collect();
                    let mut table = Table::new(rows);
                    match format {
                        OutputFormat::Markdown => table.with(Style::markdown()),
                        _ => table.with(Style::rounded()),
                    };
                    format!(
                        "{}\n{}\n{}",
                        page.caption,
                        table,
                        format_page_selector(page)
                    )
                }
                #[cfg(not(feature = "display"))]
                {
                    serde_json::to_string_pretty(page).unwrap_or_default()
                }
            }
            OutputFormat::Json => serde_json::to_string(page).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(page).unwrap_or_default(),
            OutputFormat::JsonLine => page
                .rows
                .iter()
                .filter_map(|r| serde_json::to_string(r).ok())
                .collect::<Vec<_>>()
                .join("\n"),
            OutputFormat::Psv => {
                let mut lines =
                    vec!["verb|observation_timestamp|prefix|maxLength|asn|ta|expires".to_string()];
                for row in &page.rows {
                    let t = HistoryTableRow::from(row);
                    lines.push(
                        [
                            t.verb,
                            t.observation_timestamp,
                            t.prefix,
                            t.max_length,
                            t.asn,
                            t.ta,
                            t.expires,
                        ]
                        .iter()
                        .map(|c| c.replace('\n', " "))
                        .collect::<Vec<_>>()
                        .join("|"),
                    );
                }
                lines.join("\n")
            }
        }
    }
}

/// `Page: 0 [1] 2` with the current page bracketed
pub fn format_page_selector(page: &HistoryPage) -> String {
    let links = page
        .pages
        .iter()
        .map(|link| match link.index == page.current_page {
            true => format!("[{}]", link.index),
            false => link.index.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ");
    format!("Page: {}", links)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vrp::Cell;
    use serde_json::{json, Value};

    fn record(verb: &str, old_prefix: Option<&str>, new_prefix: Option<&str>) -> Value {
        let roa = |prefix: &str| {
            json!({
                "asn": 9583,
                "expires": 1672915899,
                "maxLength": 24,
                "prefix": prefix,
                "ta": "apnic"
            })
        };
        let mut source = json!({
            "verb": verb,
            "observation_timestamp": "2023-01-04T10:00:00Z",
        });
        if let Some(p) = old_prefix {
            source["old_roa"] = roa(p);
        }
        if let Some(p) = new_prefix {
            source["new_roa"] = roa(p);
        }
        json!({ "_source": source, "sort": [1] })
    }

    fn response(n: usize) -> String {
        let hits: Vec<Value> = (0..n)
            .map(|i| record("NEW", None, Some(&format!("10.{}.0.0/16", i))))
            .collect();
        json!({
            "took": 7,
            "_shards": {"total": 2},
            "hits": {"total": {"value": n}, "hits": hits}
        })
        .to_string()
    }

    #[test]
    fn test_render_page_metadata() {
        let lens = HistoryLens::offline();
        let result = lens.load_json(&response(45)).unwrap();

        let page = lens.render_page(&result, 40, PageSize::new(20).unwrap());
        assert_eq!(page.page_count, 3);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.total_entries, 45);
        assert_eq!(page.rows.len(), 5);
        assert_eq!(page.pages.len(), 3);
        assert_eq!(page.caption, "took: 7ms shards: 2 hits: 45");
        assert_eq!(
            page.rows[0].cell(VrpField::Prefix),
            &Cell::Inserted {
                value: "10.40.0.0/16".to_string()
            }
        );

        let beyond = lens.render_page(&result, 60, PageSize::new(20).unwrap());
        assert!(beyond.rows.is_empty());
    }

    #[test]
    fn test_render_page_with_invalid_page_size_text() {
        let lens = HistoryLens::offline();
        let result = lens.load_json(&response(45)).unwrap();
        let page = lens.render_page(&result, 0, PageSize::parse_or_default("abc"));
        assert_eq!(page.page_size, 20);
        assert_eq!(page.rows.len(), 20);
    }

    #[test]
    fn test_empty_result_renders_empty_table() {
        let lens = HistoryLens::offline();
        let result = lens.load_json("").unwrap();
        let page = lens.render_page(&result, 0, PageSize::default());
        assert!(page.rows.is_empty());
        assert_eq!(page.page_count, 1);
        assert_eq!(page.caption, "no history entries");
        assert_eq!(format_page_selector(&page), "Page: [0]");
    }

    #[test]
    fn test_load_reader() {
        let lens = HistoryLens::offline();
        let text = response(3);
        let result = lens.load_reader(text.as_bytes()).unwrap();
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_format_psv() {
        let lens = HistoryLens::offline();
        let body = json!([
            record("REPLACE", Some("1.6.4.0/22"), Some("1.6.8.0/22")),
            record("DELETE", Some("1.6.4.0/22"), None),
        ])
        .to_string();
        let result = lens.load_json(&body).unwrap();
        let page = lens.render_page(&result, 0, PageSize::default());
        assert_eq!(page.caption, "hits: 2");
        let output = lens.format_page(&page, OutputFormat::Psv);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines[0],
            "verb|observation_timestamp|prefix|maxLength|asn|ta|expires"
        );
        assert_eq!(
            lines[1],
            "REPLACE|2023-01-04T10:00:00Z|-1.6.4.0/22 +1.6.8.0/22|24|9583|apnic|2023-01-05T10:51:39Z"
        );
        assert_eq!(
            lines[2],
            "DELETE|2023-01-04T10:00:00Z|-1.6.4.0/22|-24|-9583|-apnic|-2023-01-05T10:51:39Z"
        );
    }

    #[test]
    fn test_format_json_line() {
        let lens = HistoryLens::offline();
        let result = lens.load_json(&response(2)).unwrap();
        let page = lens.render_page(&result, 0, PageSize::default());
        let output = lens.format_page(&page, OutputFormat::JsonLine);
        assert_eq!(output.lines().count(), 2);
        let first: Value = serde_json::from_str(output.lines().next().unwrap()).unwrap();
        assert_eq!(first["verb"], "NEW");
    }

    #[cfg(feature = "display")]
    #[test]
    fn test_format_table_includes_caption_and_selector() {
        let lens = HistoryLens::offline();
        let result = lens.load_json(&response(25)).unwrap();
        let page = lens.render_page(&result, 20, PageSize::default());
        let output = lens.format_page(&page, OutputFormat::Table);
        assert!(output.starts_with("took: 7ms"));
        assert!(output.contains("+10.24.0.0/16"));
        assert!(output.ends_with("Page: 0 [1]"));
    }

    #[test]
    fn test_offline_lens_has_no_endpoint() {
        assert!(HistoryLens::offline().api_url().is_none());
        assert_eq!(
            HistoryLens::new("http://localhost:8080/vrp").api_url(),
            Some("http://localhost:8080/vrp")
        );
    }
}

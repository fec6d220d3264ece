use clap::Args;
use rpkilog::lens::history::{HistoryLens, HistoryQueryArgs};
use rpkilog::lens::utils::OutputFormat;
use rpkilog::vrp::{HistoryResultSet, PageSize};
use rpkilog::RpkilogConfig;
use std::io::Read;

/// Arguments for the History command
#[derive(Args)]
pub struct HistoryArgs {
    #[clap(flatten)]
    pub query: HistoryQueryArgs,

    /// Read a saved history response from this file instead of querying the API ("-" for stdin)
    #[clap(long)]
    pub file: Option<String>,

    /// Index of the first entry to display
    #[clap(short, long, default_value_t = 0)]
    pub offset: usize,

    /// Entries per page; invalid values fall back to the default (20)
    #[clap(short = 'n', long)]
    pub page_size: Option<String>,

    /// History API endpoint, overrides api_url from the configuration
    #[clap(long)]
    pub api_url: Option<String>,
}

pub fn run(config: &RpkilogConfig, args: HistoryArgs, output_format: OutputFormat) {
    let HistoryArgs {
        query,
        file,
        offset,
        page_size,
        api_url,
    } = args;

    let page_size = match page_size {
        Some(text) => match PageSize::parse(&text) {
            Ok(size) => size,
            Err(msg) => {
                eprintln!("WARNING: {}", msg);
                PageSize::default()
            }
        },
        None => config.page_size,
    };

    let lens = match api_url.or_else(|| config.api_url.clone()) {
        Some(url) => HistoryLens::new(url),
        None => HistoryLens::offline(),
    };

    let result = match &file {
        Some(path) => load_file(&lens, path),
        None => lens.fetch(&query.or_paginate_size(config.paginate_size)),
    };

    let result = match result {
        Ok(r) => r,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            return;
        }
    };

    for skipped in result.skipped() {
        eprintln!(
            "WARNING: skipped history record {}: {}",
            skipped.index, skipped.error
        );
    }

    let page = lens.render_page(&result, offset, page_size);
    println!("{}", lens.format_page(&page, output_format));
}

fn load_file(lens: &HistoryLens, path: &str) -> anyhow::Result<HistoryResultSet> {
    if path == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return lens.load_json(&text);
    }
    let file = std::fs::File::open(path)
        .map_err(|e| anyhow::anyhow!("Unable to open {}: {}", path, e))?;
    lens.load_reader(file)
}

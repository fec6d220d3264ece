use rpkilog::lens::utils::OutputFormat;
use rpkilog::RpkilogConfig;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ConfigInfo {
    config_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_url: Option<String>,
    page_size: usize,
    paginate_size: u32,
}

pub fn run(config: &RpkilogConfig, output_format: OutputFormat) {
    let info = ConfigInfo {
        config_file: RpkilogConfig::config_file_path(),
        api_url: config.api_url.clone(),
        page_size: config.page_size.get(),
        paginate_size: config.paginate_size,
    };

    match output_format {
        OutputFormat::Json | OutputFormat::JsonLine => match serde_json::to_string(&info) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("ERROR: Failed to serialize to JSON: {}", e),
        },
        OutputFormat::JsonPretty => match serde_json::to_string_pretty(&info) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("ERROR: Failed to serialize to JSON: {}", e),
        },
        OutputFormat::Psv => {
            println!("config_file|api_url|page_size|paginate_size");
            println!(
                "{}|{}|{}|{}",
                info.config_file,
                info.api_url.as_deref().unwrap_or(""),
                info.page_size,
                info.paginate_size
            );
        }
        OutputFormat::Table | OutputFormat::Markdown => {
            println!("{}", config.summary());
        }
    }
}

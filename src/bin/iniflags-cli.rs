use std::collections::BTreeMap;
use std::time::Duration;

use clap::{Parser, Subcommand};
use iniflags::observability::logging::init_logging;
use iniflags::parser::ConfigParser;
use iniflags::source::{SourceId, SourceReader};
use serde_json::json;

#[derive(Parser)]
#[command(name = "iniflags-cli")]
#[command(about = "Inspect iniflags config files", long_about = None)]
struct Cli {
    /// Timeout for remote sources, in seconds
    #[arg(short, long, default_value_t = 10)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every record after expanding imports, as JSON
    Records {
        /// Path or http(s) URL of the top-level config
        source: String,
    },
    /// Parse a config and report keys set more than once
    Check {
        /// Path or http(s) URL of the top-level config
        source: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging("warn");
    let cli = Cli::parse();
    let parser = ConfigParser::new(SourceReader::new(Duration::from_secs(cli.timeout)));

    match cli.command {
        Commands::Records { source } => {
            let records = parser.parse(&SourceId::parse(&source)?).await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Commands::Check { source } => {
            let records = match parser.parse(&SourceId::parse(&source)?).await {
                Ok(records) => records,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };

            let mut locations: BTreeMap<&str, Vec<String>> = BTreeMap::new();
            for record in &records {
                locations
                    .entry(record.key.as_str())
                    .or_default()
                    .push(format!("{}:{}", record.source_path, record.line_number));
            }
            let overridden: BTreeMap<_, _> = locations
                .into_iter()
                .filter(|(_, seen)| seen.len() > 1)
                .collect();

            let report = json!({
                "source": source,
                "records": records.len(),
                "overridden": overridden,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

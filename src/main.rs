//! Report Table CLI
//! Paginates a table description without a browser. The main interface is
//! through WASM bindings.

use clap::Parser;
use report_table::{MemoryDocument, ReportConfig, ReportTable, TableSpec};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const INPUT_HELP: &str = "input.json:
  {
    \"config\": { \"tableId\": \"report\", \"paperSize\": \"LETTER\", ... },
    \"devicePixelRatio\": 1,
    \"table\": {
      \"id\": \"report\",
      \"header\": { \"html\": \"<th>Name</th>\", \"height\": 32 },
      \"rows\": [ { \"html\": \"<td>Ada</td>\", \"height\": 24 } ]
    }
  }";

#[derive(Parser)]
#[command(name = "report-table")]
#[command(about = "Paginate an HTML table for print")]
#[command(version)]
#[command(after_help = INPUT_HELP)]
struct Args {
    /// JSON table description
    input: PathBuf,

    /// Print the page plan as JSON instead of the page markup
    #[arg(long)]
    plan: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Input {
    config: ReportConfig,
    #[serde(default = "default_pixel_ratio")]
    device_pixel_ratio: f64,
    table: TableSpec,
}

fn default_pixel_ratio() -> f64 {
    1.0
}

fn run(path: &Path, plan_only: bool) -> Result<String, Box<dyn std::error::Error>> {
    let input: Input = serde_json::from_str(&std::fs::read_to_string(path)?)?;

    let mut document = MemoryDocument::new(input.device_pixel_ratio);
    document.add_table(&input.table);
    let mut table = ReportTable::new(document, input.config)?;

    if plan_only {
        return Ok(serde_json::to_string_pretty(&table.plan())?);
    }

    table.format(None);
    Ok(table.document().render_pages())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args.input, args.plan) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

//! csvw2rdf CLI - Convert CSV files and list exports to RDF
//!
//! # Main Commands
//!
//! ```bash
//! csvw2rdf convert input.csv --base http://example.org/t   # Convert to N-Triples
//! csvw2rdf convert list.json --profile profile.json -o out.nt
//! ```
//!
//! # Helper Commands
//!
//! ```bash
//! csvw2rdf parse input.csv         # Just parse the source to JSON
//! csvw2rdf example-profile         # Show an example conversion profile
//! csvw2rdf handlers                # Show available cell handlers
//! ```

use clap::{Parser, Subcommand};
use csvw2rdf::parser::format_delimiter;
use csvw2rdf::{
    convert_file, example_profile, handlers_description, parse_file, ConversionProfile,
    ConvertOptions, ErrorPolicy, Mode,
};
use std::fs;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "csvw2rdf", version)]
#[command(about = "Convert tabular data to RDF following CSV on the Web", long_about = None)]
struct Cli {
    /// Log progress (RUST_LOG overrides the level)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Disable logging
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a CSV file or JSON list export to N-Triples
    Convert {
        /// Input file (.json for list exports, CSV otherwise)
        input: PathBuf,

        /// Table URL; predicates become <URL>#<column>
        #[arg(short, long, env = "CSVW2RDF_BASE_URL")]
        base: Option<String>,

        /// Output mode: minimal or standard
        #[arg(short, long, env = "CSVW2RDF_MODE")]
        mode: Option<Mode>,

        /// Conversion profile (JSON)
        #[arg(short, long)]
        profile: Option<PathBuf>,

        /// Table node IRI (standard mode)
        #[arg(long)]
        table_id: Option<String>,

        /// Table group node IRI (standard mode)
        #[arg(long)]
        group_id: Option<String>,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Skip cells that cannot be converted instead of aborting
        #[arg(long)]
        skip_invalid: bool,

        /// Keep duplicate statements
        #[arg(long)]
        keep_duplicates: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse a source file and output the table as JSON
    Parse {
        /// Input file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show example conversion profile
    ExampleProfile,

    /// Show available cell handlers
    Handlers,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Convert {
            input,
            base,
            mode,
            profile,
            table_id,
            group_id,
            delimiter,
            skip_invalid,
            keep_duplicates,
            output,
        } => {
            let options = ConvertOptions {
                mode,
                base_url: base,
                table_id,
                group_id,
                on_error: skip_invalid.then_some(ErrorPolicy::Skip),
                distinct: !keep_duplicates,
                delimiter,
                blank_prefix: None,
            };
            cmd_convert(&input, &options, profile.as_deref(), output.as_deref())
        }

        Commands::Parse {
            input,
            delimiter,
            output,
        } => cmd_parse(&input, delimiter, output.as_deref()),

        Commands::ExampleProfile => cmd_example_profile(),

        Commands::Handlers => cmd_handlers(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("off")
    } else if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn cmd_convert(
    input: &Path,
    options: &ConvertOptions,
    profile_path: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Converting: {}", input.display());

    let profile = profile_path.map(ConversionProfile::load).transpose()?;
    if let Some(path) = profile_path {
        eprintln!("   Profile: {}", path.display());
    }

    let result = convert_file(input, options, profile.as_ref())?;

    let info = &result.source_info;
    eprintln!("   Format: {}", info.format);
    eprintln!("   Encoding: {}", info.encoding);
    if let Some(d) = info.delimiter {
        eprintln!("   Delimiter: '{}'", format_delimiter(d));
    }
    eprintln!("   Rows: {}", info.row_count);
    eprintln!("   Columns: {}", info.columns.join(", "));
    eprintln!("   Mode: {}", result.mode);

    eprintln!("\n⚙️  {}", result.report.summary());
    if !result.report.is_complete() {
        eprintln!("   Skipped cells:");
        for cell in result.report.skipped.iter().take(5) {
            eprintln!("     - row {}, column '{}': {}", cell.row, cell.column, cell.reason);
        }
        if result.report.skipped.len() > 5 {
            eprintln!("     ... +{}", result.report.skipped.len() - 5);
        }
    }
    if result.duplicates_removed > 0 {
        eprintln!("   Duplicates removed: {}", result.duplicates_removed);
    }

    let written = match output {
        Some(path) => {
            let written = result.write_ntriples_file(path)?;
            eprintln!("💾 Output written to: {}", path.display());
            written
        }
        None => result.write_ntriples(BufWriter::new(io::stdout().lock()))?,
    };

    eprintln!("\n✨ Done! {} triples", written);
    Ok(())
}

fn cmd_parse(
    input: &Path,
    delimiter: Option<char>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing: {}", input.display());

    let result = parse_file(input, delimiter)?;

    eprintln!("   Format: {}", result.format);
    eprintln!("   Encoding: {}", result.encoding);
    if let Some(used) = result.delimiter {
        eprintln!(
            "   Delimiter: '{}'{}",
            format_delimiter(used),
            if delimiter.is_none() { " (auto-detected)" } else { "" }
        );
    }
    eprintln!("   Columns: {}", result.headers().join(", "));
    eprintln!("✅ Parsed {} rows", result.table.row_count());

    let json = serde_json::to_string_pretty(&result.table)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_example_profile() -> Result<(), Box<dyn std::error::Error>> {
    let profile = example_profile();
    let json = profile.to_json()?;
    println!("{}", json);
    Ok(())
}

fn cmd_handlers() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", handlers_description());
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

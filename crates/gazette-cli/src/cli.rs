//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};

/// Gazette - normalize circular PDFs into graph-ready clause records.
#[derive(Debug, Parser)]
#[command(name = "gazette")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Output directory for mapped artifacts
    #[arg(short, long, global = true, default_value = "out")]
    pub out_dir: String,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Dry run: map documents and write artifacts, submit nothing
    Map(MapArgs),

    /// Map documents, then build and submit ingestion episodes
    Ingest(IngestArgs),
}

/// Arguments for the map command.
#[derive(Debug, Parser)]
pub struct MapArgs {
    /// Directory of extracted page files (one JSON array of pages per
    /// document)
    pub input_dir: String,
}

/// Arguments for the ingest command.
#[derive(Debug, Parser)]
pub struct IngestArgs {
    /// Directory of extracted page files (one JSON array of pages per
    /// document)
    pub input_dir: String,

    /// Ingestion service endpoint
    #[arg(short, long, env = "GAZETTE_ENDPOINT")]
    pub endpoint: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_command() {
        let cli = Cli::parse_from(["gazette", "map", "extracted/"]);
        match cli.command {
            Command::Map(args) => assert_eq!(args.input_dir, "extracted/"),
            _ => panic!("Expected Map command"),
        }
    }

    #[test]
    fn test_ingest_command_with_endpoint() {
        let cli = Cli::parse_from([
            "gazette",
            "ingest",
            "extracted/",
            "--endpoint",
            "http://localhost:8123/episodes",
        ]);
        match cli.command {
            Command::Ingest(args) => {
                assert_eq!(args.endpoint.as_deref(), Some("http://localhost:8123/episodes"));
            }
            _ => panic!("Expected Ingest command"),
        }
    }

    #[test]
    fn test_out_dir_default() {
        let cli = Cli::parse_from(["gazette", "map", "extracted/"]);
        assert_eq!(cli.out_dir, "out");
    }
}

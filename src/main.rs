use clap::{Parser, Subcommand};
use scandex::commands::{run_extract, run_index, run_search, show_status};
use scandex::config::{Config, default_data_dir, run_interactive_config, show_config};
use scandex::{Result, ScandexError};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scandex")]
#[command(about = "Search scanned documents by what their text says")]
#[command(version)]
struct Cli {
    /// Override the data directory holding config, documents, and the index
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run OCR over the raw documents folder and build the search index
    Index {
        /// Rebuild the index from scratch instead of appending new files
        #[arg(long, short)]
        force: bool,
    },
    /// Search indexed documents with a natural-language query
    Search {
        /// The text you want to find inside your documents
        query: String,
        /// Number of documents to return
        #[arg(long = "top", short = 'k', default_value_t = 3)]
        top: usize,
    },
    /// Show index size, location, and embedding server health
    Status,
    /// Run OCR on a single image and show the transcript
    Extract {
        /// Image file name inside the raw documents folder, or a path
        image: String,
        /// Do not save the transcript to the extracts folder
        #[arg(long)]
        no_save: bool,
    },
    /// Configure the embedding server and indexing settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir().map_err(|e| ScandexError::Config(e.to_string()))?,
    };

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config(&data_dir)?;
            } else {
                run_interactive_config(&data_dir)?;
            }
        }
        Commands::Index { force } => {
            run_index(&Config::load(&data_dir)?, force)?;
        }
        Commands::Search { query, top } => {
            run_search(&Config::load(&data_dir)?, &query, top)?;
        }
        Commands::Status => {
            show_status(&Config::load(&data_dir)?)?;
        }
        Commands::Extract { image, no_save } => {
            run_extract(&Config::load(&data_dir)?, &image, !no_save)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn cli_parsing() {
        let cli = Cli::try_parse_from(["scandex", "status"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            matches!(parsed.command, Commands::Status);
        }
    }

    #[test]
    fn index_command_with_force() {
        let cli = Cli::try_parse_from(["scandex", "index", "--force"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Index { force } = parsed.command {
                assert!(force);
            }
        }
    }

    #[test]
    fn search_command_with_top_k() {
        let cli = Cli::try_parse_from(["scandex", "search", "meeting notes", "-k", "5"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Search { query, top } = parsed.command {
                assert_eq!(query, "meeting notes");
                assert_eq!(top, 5);
            }
        }
    }

    #[test]
    fn search_command_default_top_k() {
        let cli = Cli::try_parse_from(["scandex", "search", "receipt"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Search { top, .. } = parsed.command {
                assert_eq!(top, 3);
            }
        }
    }

    #[test]
    fn extract_command() {
        let cli = Cli::try_parse_from(["scandex", "extract", "receipt.png", "--no-save"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Extract { image, no_save } = parsed.command {
                assert_eq!(image, "receipt.png");
                assert!(no_save);
            }
        }
    }

    #[test]
    fn global_data_dir_flag() {
        let cli = Cli::try_parse_from(["scandex", "--data-dir", "/tmp/scans", "status"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            assert_eq!(parsed.data_dir, Some(PathBuf::from("/tmp/scans")));
        }
    }

    #[test]
    fn config_show_flag() {
        let cli = Cli::try_parse_from(["scandex", "config", "--show"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Config { show } = parsed.command {
                assert!(show);
            }
        }
    }

    #[test]
    fn invalid_command() {
        let cli = Cli::try_parse_from(["scandex", "invalid"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
        }
    }

    #[test]
    fn help_message() {
        let cli = Cli::try_parse_from(["scandex", "--help"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        }
    }
}

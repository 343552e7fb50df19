//! Similarity API
//!
//! HTTP service answering "similar problems" (AutoInsider) and "similar
//! places" (European Rail Guide) queries, plus one-shot commands that bulk
//! load those domains from MySQL.

use clap::{Args, Parser, Subcommand};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_similarity::Domain;

mod api;
mod commands;
mod config;
mod openapi;
mod state;

use config::Config;

#[derive(Parser)]
#[command(name = "similarity-api")]
#[command(about = "Similarity search over AutoInsider problems and European Rail Guide places")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve {
        /// Create missing domain indexes before accepting traffic
        #[arg(long)]
        ensure_indexes: bool,
    },

    /// Load AutoInsider problems from MySQL (rebuilds the index by default)
    IndexAiFromMysql(RebuildArgs),

    /// Load European Rail Guide places from MySQL
    IndexErgFromMysql(RebuildArgs),

    /// Drop and recreate a domain index
    RebuildIndex {
        /// autoinsider or erg
        domain: Domain,
    },
}

#[derive(Args)]
struct RebuildArgs {
    /// Drop and recreate the index before loading
    #[arg(long, overrides_with = "no_rebuild")]
    rebuild: bool,

    /// Load into the existing index
    #[arg(long, overrides_with = "rebuild")]
    no_rebuild: bool,
}

impl RebuildArgs {
    fn resolve(&self, default: bool) -> bool {
        match (self.rebuild, self.no_rebuild) {
            (true, _) => true,
            (_, true) => false,
            _ => default,
        }
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(&config.environment);

    match cli.command.unwrap_or(Commands::Serve {
        ensure_indexes: false,
    }) {
        Commands::Serve { ensure_indexes } => commands::serve(config, ensure_indexes).await,
        Commands::IndexAiFromMysql(args) => {
            commands::index_from_mysql(config, Domain::AutoInsider, args.resolve(true)).await
        }
        Commands::IndexErgFromMysql(args) => {
            commands::index_from_mysql(config, Domain::EuropeanRailGuide, args.resolve(false)).await
        }
        Commands::RebuildIndex { domain } => commands::rebuild_index(config, domain).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("similarity-api").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_no_subcommand_means_serve() {
        assert!(parse(&[]).command.is_none());
    }

    #[test]
    fn test_rebuild_flags() {
        let Some(Commands::IndexAiFromMysql(args)) = parse(&["index-ai-from-mysql"]).command else {
            panic!("expected index-ai-from-mysql");
        };
        assert!(args.resolve(true));

        let Some(Commands::IndexAiFromMysql(args)) =
            parse(&["index-ai-from-mysql", "--no-rebuild"]).command
        else {
            panic!("expected index-ai-from-mysql");
        };
        assert!(!args.resolve(true));

        let Some(Commands::IndexErgFromMysql(args)) =
            parse(&["index-erg-from-mysql", "--rebuild"]).command
        else {
            panic!("expected index-erg-from-mysql");
        };
        assert!(args.resolve(false));
    }

    #[test]
    fn test_last_rebuild_flag_wins() {
        let Some(Commands::IndexErgFromMysql(args)) =
            parse(&["index-erg-from-mysql", "--rebuild", "--no-rebuild"]).command
        else {
            panic!("expected index-erg-from-mysql");
        };
        assert!(!args.resolve(false));
    }

    #[test]
    fn test_rebuild_index_domain() {
        let Some(Commands::RebuildIndex { domain }) = parse(&["rebuild-index", "erg"]).command
        else {
            panic!("expected rebuild-index");
        };
        assert_eq!(domain, Domain::EuropeanRailGuide);

        assert!(Cli::try_parse_from(["similarity-api", "rebuild-index", "pinecone"]).is_err());
    }
}

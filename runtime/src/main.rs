use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use footgraph::cli::{self, FilterArgs, ScrapeArgs};
use footgraph::extraction::stat_labels;
use footgraph::model::DataField;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "footgraph", version, about = "Scrape football statistics into SQLite")]
struct Cli {
    /// Machine-readable JSON output.
    #[arg(long, global = true)]
    json: bool,

    /// Only print results and warnings.
    #[arg(long, global = true)]
    quiet: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,

    /// Database file (default ~/.footgraph/footgraph.db).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the scraping pipeline: leagues, then squads, then players.
    Scrape(ScrapeArgs),

    /// List stored players.
    Players {
        /// Show the leagues, clubs, countries and positions available to filter on instead.
        #[arg(long)]
        choices: bool,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Pair two statistics per player.
    Scatter {
        /// Field on the x axis (see `footgraph fields`).
        #[arg(long)]
        x: DataField,

        /// Field on the y axis.
        #[arg(long)]
        y: DataField,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// List the statistics fields.
    Fields,
}

fn init_tracing(json: bool, quiet: bool) {
    let default = if quiet { "footgraph=warn" } else { "footgraph=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    if args.json {
        std::env::set_var("FOOTGRAPH_JSON", "1");
    }
    if args.quiet {
        std::env::set_var("FOOTGRAPH_QUIET", "1");
    }
    if args.no_color {
        std::env::set_var("FOOTGRAPH_NO_COLOR", "1");
    }

    init_tracing(args.json, args.quiet);
    stat_labels::validate().context("invalid stat label table")?;

    let db = args.db.unwrap_or_else(footgraph::store::Store::default_path);

    match args.command {
        Command::Scrape(scrape) => cli::scrape_cmd::run(scrape, &db).await,
        Command::Players { choices, filter } => cli::players_cmd::run(&filter, choices, &db),
        Command::Scatter { x, y, filter } => cli::scatter_cmd::run(x, y, &filter, &db),
        Command::Fields => cli::fields_cmd::run(),
    }
}

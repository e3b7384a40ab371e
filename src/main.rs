use analytics::{GroupStatistics, StatisticsEngine, TradeStatistics, breakdown};
use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use comfy_table::Table;
use configuration::Config;
use core_types::{Dimension, TradeRecord, ViewMode};
use database::{DbRepository, TradeQuery};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// The main entry point for the Tradelog journal tools.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    let config = configuration::load_config_from(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    let _guard = configuration::init_tracing(&config.logging);

    // Execute the appropriate command
    match cli.command {
        Commands::Stats(args) => handle_stats(args, &config).await,
        Commands::Breakdown(args) => handle_breakdown(args, &config).await,
        Commands::Import(args) => handle_import(args, &config).await,
        Commands::Serve(args) => handle_serve(args, config).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Performance statistics for a personal trading journal.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file. Every setting has a default if it is missing.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate the full statistics report for a set of trades.
    Stats(StatsArgs),
    /// Calculate statistics for each value of a categorical trade field.
    Breakdown(BreakdownArgs),
    /// Store the trades of a JSON file in the database.
    Import(ImportArgs),
    /// Run the HTTP API.
    Serve(ServeArgs),
}

/// Where trades are read from: a JSON file, or a user's journal in the database.
#[derive(Args)]
struct SourceArgs {
    /// A JSON array of trade records, in the order to analyse them.
    #[arg(long, conflicts_with = "user")]
    file: Option<PathBuf>,

    /// Load this user's trades from the database.
    #[arg(long, required_unless_present = "file")]
    user: Option<Uuid>,

    /// Only include trades of this account.
    #[arg(long, requires = "user")]
    account: Option<Uuid>,

    /// The first trade date to include (format: YYYY-MM-DD).
    #[arg(long, requires = "user")]
    from: Option<NaiveDate>,

    /// The last trade date to include (format: YYYY-MM-DD).
    #[arg(long, requires = "user")]
    to: Option<NaiveDate>,

    /// Unit of the results. Defaults to the configured view mode.
    #[arg(long, value_enum)]
    view_mode: Option<ViewMode>,
}

impl SourceArgs {
    fn view_mode_or(&self, config: &Config) -> ViewMode {
        self.view_mode
            .unwrap_or(config.statistics.default_view_mode)
    }
}

#[derive(Args)]
struct StatsArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Print the report as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct BreakdownArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// The trade field to group by.
    #[arg(long, value_enum)]
    dimension: Dimension,

    /// Print the groups as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ImportArgs {
    /// Owner of the imported trades.
    #[arg(long)]
    user: Uuid,

    /// Account the trades belong to.
    #[arg(long)]
    account: Option<Uuid>,

    /// A JSON array of trade records.
    #[arg(long)]
    file: PathBuf,
}

#[derive(Args)]
struct ServeArgs {
    /// Overrides `server.host` from the configuration.
    #[arg(long)]
    host: Option<String>,

    /// Overrides `server.port` from the configuration.
    #[arg(long)]
    port: Option<u16>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_stats(args: StatsArgs, config: &Config) -> anyhow::Result<()> {
    let view_mode = args.source.view_mode_or(config);
    let trades = load_trades(&args.source, config).await?;
    let stats = StatisticsEngine::new().calculate(&trades, view_mode);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("{}", statistics_table(&stats));
    }
    Ok(())
}

async fn handle_breakdown(args: BreakdownArgs, config: &Config) -> anyhow::Result<()> {
    let view_mode = args.source.view_mode_or(config);
    let trades = load_trades(&args.source, config).await?;
    let groups = breakdown(&StatisticsEngine::new(), &trades, view_mode, args.dimension);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
    } else {
        println!("{}", breakdown_table(args.dimension, &groups));
    }
    Ok(())
}

async fn handle_import(args: ImportArgs, config: &Config) -> anyhow::Result<()> {
    let trades = read_trade_file(&args.file)?;
    if trades.is_empty() {
        anyhow::bail!("{} contains no trades", args.file.display());
    }
    let repo = connect_repository(config).await?;
    let ids = repo.save_trades(args.user, args.account, &trades).await?;
    println!("Imported {} trades for user {}.", ids.len(), args.user);
    Ok(())
}

async fn handle_serve(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    web_server::run_server(config).await
}

async fn load_trades(source: &SourceArgs, config: &Config) -> anyhow::Result<Vec<TradeRecord>> {
    if let Some(path) = &source.file {
        return read_trade_file(path);
    }
    let user_id = source
        .user
        .context("Either --file or --user must be given")?;
    if let (Some(from), Some(to)) = (source.from, source.to) {
        anyhow::ensure!(from <= to, "--from ({from}) must not be after --to ({to})");
    }

    let query = TradeQuery {
        account_id: source.account,
        from: source.from,
        to: source.to,
        ..TradeQuery::for_user(user_id)
    };
    let repo = connect_repository(config).await?;
    Ok(repo.get_trades(&query).await?)
}

async fn connect_repository(config: &Config) -> anyhow::Result<DbRepository> {
    let pool = database::connect(&config.database).await?;
    if config.database.run_migrations {
        database::run_migrations(&pool).await?;
    }
    Ok(DbRepository::new(pool))
}

fn read_trade_file(path: &Path) -> anyhow::Result<Vec<TradeRecord>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let trades: Vec<TradeRecord> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse trades from {}", path.display()))?;
    tracing::info!(trades = trades.len(), path = %path.display(), "Read trade file");
    Ok(trades)
}

fn statistics_table(stats: &TradeStatistics) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    for (label, value) in stats.summary_rows() {
        table.add_row(vec![label.to_string(), value]);
    }
    table
}

fn breakdown_table(dimension: Dimension, groups: &[GroupStatistics]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        dimension.to_string(),
        "Trades".to_string(),
        "Win Rate".to_string(),
        "Total".to_string(),
        "Profit Factor".to_string(),
        "SQN".to_string(),
    ]);
    for group in groups {
        let stats = &group.statistics;
        let profit_factor = if stats.has_unbounded_profit_factor() {
            "∞".to_string()
        } else {
            format!("{:.2}", stats.profit_factor)
        };
        table.add_row(vec![
            group.key.clone(),
            stats.total_trades.to_string(),
            format!("{:.1}%", stats.win_rate),
            format!("{:.2}", stats.total_profit),
            profit_factor,
            stats.sqn.to_string(),
        ]);
    }
    table
}

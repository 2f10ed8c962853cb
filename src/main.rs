use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use tickerboard::cli::quotes::{QuoteOptions, SortField, ViewMode};
use tickerboard::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Log to stderr; repeat for more detail (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct ViewArgs {
    /// Comma separated symbols, overrides the configured list
    #[arg(short, long, value_delimiter = ',')]
    symbols: Option<Vec<String>>,

    /// How to display the quotes
    #[arg(long, value_enum, default_value_t = ViewMode::Table)]
    view: ViewMode,

    /// Only show quotes whose symbol or company name contains this text
    #[arg(long)]
    search: Option<String>,

    /// Column to sort by
    #[arg(long, value_enum, default_value_t = SortField::Symbol)]
    sort: SortField,

    /// Sort in descending order
    #[arg(long)]
    desc: bool,

    /// Print quotes as JSON instead of a table or chart
    #[arg(long)]
    json: bool,
}

impl ViewArgs {
    fn split(self) -> (Option<Vec<String>>, QuoteOptions) {
        let options = QuoteOptions {
            view: self.view,
            search: self.search,
            sort: self.sort,
            descending: self.desc,
            json: self.json,
        };
        (self.symbols, options)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Fetch quotes once and print them
    Quotes(ViewArgs),
    /// Poll quotes on the configured interval until Ctrl-C
    Watch(ViewArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config_path = cli.config_path.as_deref();
    let result = match cli.command {
        Some(Commands::Setup) => {
            tickerboard::cli::setup::setup(&tickerboard::core::config::ApiCredentials::from_env())
        }
        Some(Commands::Quotes(args)) => {
            let (symbols, options) = args.split();
            tickerboard::run_command(tickerboard::AppCommand::Quotes(options), config_path, symbols)
                .await
        }
        Some(Commands::Watch(args)) => {
            let (symbols, options) = args.split();
            tickerboard::run_command(tickerboard::AppCommand::Watch(options), config_path, symbols)
                .await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{Parser, Subcommand};
use lotdesk_core::config::resolve_config;
use lotdesk_core::error::ErrorCode;
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "lotdesk: review desk for scored vehicle listings",
    long_about = None
)]
struct Cli {
    /// Output format: pretty, text or json.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Use the built-in demo listings instead of the backend.
    #[arg(long, global = true)]
    offline: bool,

    /// Backend base URL (overrides config and LOTDESK_BACKEND_URL).
    #[arg(long, global = true, value_name = "URL")]
    backend: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Read",
        about = "List one page of listings",
        long_about = "Load listings, apply filters and sort, and show one page with the pager window.",
        after_help = "EXAMPLES:\n    # Best-scored listings first (default sort)\n    lotdesk list\n\n    # Unscored Toyotas by price, 10 per page\n    lotdesk list --status pending --make toyota --sort price --rows 10\n\n    # One buyer's listings this month\n    lotdesk list --buyer b-17 --since 2024-05-01\n\n    # Emit machine-readable output\n    lotdesk list --format json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show listing counters",
        long_about = "Show scored, pending, decided and undecided counts plus the distinct makes.",
        after_help = "EXAMPLES:\n    # Dashboard counters\n    lotdesk stats\n\n    # Against the demo data\n    lotdesk --offline stats"
    )]
    Stats(cmd::stats::StatsArgs),

    #[command(
        next_help_heading = "Read",
        about = "Check backend reachability",
        long_about = "Probe the backend health endpoint. Exits non-zero when it is not reachable.",
        after_help = "EXAMPLES:\n    # Probe the configured backend\n    lotdesk health\n\n    # Probe another backend\n    lotdesk --backend http://10.0.0.5:8000/api health"
    )]
    Health(cmd::health::HealthArgs),

    #[command(
        next_help_heading = "Actions",
        about = "Rescore the filtered listings",
        long_about = "Send every filtered listing with a VIN to the scoring service and merge the new scores.",
        after_help = "EXAMPLES:\n    # Rescore everything still pending\n    lotdesk rescore --status pending\n\n    # Rescore one make\n    lotdesk rescore --make ford"
    )]
    Rescore(cmd::rescore::RescoreArgs),

    #[command(
        next_help_heading = "Actions",
        about = "Notify the buyer about a listing",
        long_about = "Send a notification for the listing with the given VIN.",
        after_help = "EXAMPLES:\n    # Notify on one vehicle\n    lotdesk notify 1HGCM82633A004352"
    )]
    Notify(cmd::notify::NotifyArgs),

    #[command(
        next_help_heading = "Actions",
        about = "Seed the backend with demo listings",
        long_about = "Push the built-in demo listings to the backend ingest endpoint.",
        after_help = "EXAMPLES:\n    # Seed a fresh backend\n    lotdesk seed"
    )]
    Seed(cmd::seed::SeedArgs),

    #[command(
        next_help_heading = "Actions",
        about = "Export listings as CSV",
        long_about = "Export all, today's, a date range of, or the filtered listings as CSV.",
        after_help = "EXAMPLES:\n    # Everything to a file\n    lotdesk export --out listings.csv\n\n    # A date range to stdout\n    lotdesk export --type range --start 2024-05-01 --end 2024-05-31\n\n    # Only the filtered rows\n    lotdesk export --type selected --status decided"
    )]
    Export(cmd::export::ExportArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOTDESK_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "lotdesk=debug,info"
        } else {
            "lotdesk=info,warn"
        })
    });

    let format = env::var("LOTDESK_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let project_root = env::current_dir()?;

    let config = match resolve_config(&project_root) {
        Ok(config) => config,
        Err(err) => {
            let output = resolve_output_mode(cli.format, cli.json, None);
            render_error(
                output,
                &CliError::coded(ErrorCode::ConfigParseError, format!("{err:#}")),
            )?;
            return Err(err);
        }
    };
    let output = resolve_output_mode(cli.format, cli.json, config.user.output.as_deref());
    debug!(?output, offline = cli.offline, "resolved settings");

    let session = cmd::Session {
        config,
        offline: cli.offline,
        backend: cli.backend,
    };

    match cli.command {
        Commands::List(ref args) => cmd::list::run_list(args, output, &session),
        Commands::Stats(ref args) => cmd::stats::run_stats(args, output, &session),
        Commands::Health(ref args) => cmd::health::run_health(args, output, &session),
        Commands::Rescore(ref args) => cmd::rescore::run_rescore(args, output, &session),
        Commands::Notify(ref args) => cmd::notify::run_notify(args, output, &session),
        Commands::Seed(ref args) => cmd::seed::run_seed(args, output, &session),
        Commands::Export(ref args) => cmd::export::run_export(args, output, &session),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_flag_parses_before_subcommand() {
        let cli = Cli::parse_from(["lotdesk", "--format", "json", "list"]);
        assert_eq!(cli.format, Some(OutputMode::Json));
        assert!(matches!(cli.command, Commands::List(_)));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::parse_from(["lotdesk", "stats", "--offline", "--json"]);
        assert!(cli.offline);
        assert!(cli.json);
    }

    #[test]
    fn backend_flag_is_kept() {
        let cli = Cli::parse_from(["lotdesk", "--backend", "http://h:1/api", "health"]);
        assert_eq!(cli.backend.as_deref(), Some("http://h:1/api"));
    }

    #[test]
    fn notify_requires_vin() {
        assert!(Cli::try_parse_from(["lotdesk", "notify"]).is_err());
        let cli = Cli::parse_from(["lotdesk", "notify", "V1"]);
        assert!(matches!(cli.command, Commands::Notify(ref a) if a.vin == "V1"));
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["lotdesk", "--format", "yaml", "list"]).is_err());
    }

    #[test]
    fn all_subcommands_listed() {
        let subcommands = [
            vec!["lotdesk", "list"],
            vec!["lotdesk", "list", "--sort", "price", "--desc", "--page", "2", "--rows", "5"],
            vec!["lotdesk", "stats"],
            vec!["lotdesk", "health"],
            vec!["lotdesk", "rescore", "--status", "pending"],
            vec!["lotdesk", "notify", "V1"],
            vec!["lotdesk", "seed"],
            vec!["lotdesk", "export", "--type", "selected", "--make", "ford"],
        ];
        for args in &subcommands {
            let result = Cli::try_parse_from(args.iter());
            assert!(
                result.is_ok(),
                "Failed to parse: {:?}: {:?}",
                args,
                result.err()
            );
        }
    }
}

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use session_tokens::config::Config;
use session_tokens::error::FlushError;
use session_tokens::flush::{flush_tokens, FlushOptions, DEFAULT_FLUSH_DAYS};
use session_tokens::repositories::PgTokenStore;

/// Flush session tokens that have not been touched for a while.
#[derive(Debug, Parser)]
#[command(name = "flush_tokens")]
struct Cli {
    /// Number of days a token must have been untouched for it to be flushed
    #[arg(long, default_value_t = DEFAULT_FLUSH_DAYS)]
    days: u32,

    /// Only select the given subject ID (repeatable)
    #[arg(long = "user")]
    users: Vec<i64>,

    /// Perform hard deletion instead of soft deletion
    #[arg(long)]
    hard: bool,

    /// Confirm destructive or floor-violating operations
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "session_tokens=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    let store = PgTokenStore::connect(&config.database_url).await?;

    let options = FlushOptions {
        days: cli.days,
        subject_ids: cli.users,
        hard: cli.hard,
        force: cli.force,
    };

    match flush_tokens(&store, &options, config.safety_floor_days).await {
        Ok(outcome) if outcome.affected == 0 => {
            println!("No session tokens to flush.");
        }
        Ok(outcome) => {
            let verb = if outcome.hard { "Hard deleted" } else { "Flushed" };
            let plural = if outcome.affected == 1 { "" } else { "s" };
            println!(
                "{} {} session token{} that have not been touched since {}",
                verb, outcome.affected, plural, outcome.cutoff
            );
        }
        Err(FlushError::Config(errors)) => {
            for error in &errors {
                eprintln!("{error}");
            }
            std::process::exit(1);
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}

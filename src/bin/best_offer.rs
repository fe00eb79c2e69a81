//! One-shot best-offer query from the command line.
//!
//! Prints the result envelope as JSON and exits non-zero when no offer was
//! selected.

use anyhow::Context;
use clap::Parser;
use exchange_offers::application::validation::BestOfferQuery;
use exchange_offers::bootstrap::build_best_offer;
use exchange_offers::config::AppConfig;
use exchange_offers::infrastructure::observability::init_tracing;
use rust_decimal::Decimal;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

/// Query every configured provider and print the best offer
#[derive(Parser, Debug)]
#[command(name = "best-offer")]
#[command(about = "Find the best currency-exchange offer across providers")]
struct Args {
    /// Currency to convert from
    source: String,

    /// Currency to convert to
    target: String,

    /// Amount of source currency
    amount: Decimal,

    /// Extra configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    let config = AppConfig::load_with(args.config.as_deref()).context("loading configuration")?;
    init_tracing(config.log_format).context("installing tracing subscriber")?;
    if let Some(path) = &config.dotenv_path {
        tracing::debug!(path = %path.display(), "loaded .env file");
    }

    let (best_offer, _) = build_best_offer(&config).context("building provider clients")?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted; cancelling provider calls");
            on_interrupt.cancel();
        }
    });

    let query = BestOfferQuery::new(args.source, args.target, args.amount);
    let (status, envelope) = best_offer.handle(&query, &cancel).await;

    let output = if args.pretty {
        serde_json::to_string_pretty(&envelope)
    } else {
        serde_json::to_string(&envelope)
    }
    .context("serializing result")?;
    println!("{output}");

    tracing::debug!(status, "best-offer query finished");
    Ok(if envelope.is_successful() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

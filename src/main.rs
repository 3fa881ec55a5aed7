//! NIFTY 50 Trend Tracker — Entry Point
//!
//! Initializes configuration, logging and adapters, then runs one
//! command: `track` (default), `gap-scan`, `screen` or `report`.
//!
//! `track` wiring sequence:
//! 1. Load config.toml + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Create QuoteClient (HTTP + pacing + retry) and the quote source
//! 4. Create the report store and notifier (WhatsApp creds from env)
//! 5. Spawn metrics observer on the tracker's event feed
//! 6. Spawn health server (/live, /ready, /board, /metrics)
//! 7. Start the session (report slot check, baseline capture), spawn the polling loop
//! 8. Wait for the cutoff (finalize) or SIGINT (stop, no finalize)

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use nifty_trend_tracker::adapters::metrics::{HealthServer, HealthState, MetricsRegistry};
use nifty_trend_tracker::adapters::notify::build_notifier;
use nifty_trend_tracker::adapters::persistence::FileReportStore;
use nifty_trend_tracker::adapters::quotes::{QuoteClient, YahooQuoteSource};
use nifty_trend_tracker::cli::{Cli, Command};
use nifty_trend_tracker::config::{self, AppConfig};
use nifty_trend_tracker::domain::instrument::display_symbol;
use nifty_trend_tracker::domain::market_time::session_date;
use nifty_trend_tracker::domain::{ExtremeStatus, IntradaySummary, Symbol};
use nifty_trend_tracker::ports::clock::{Clock, SystemClock};
use nifty_trend_tracker::ports::repository::ReportStore;
use nifty_trend_tracker::usecases::{
    DeliveryStatus, ExtremesScreener, FinalizeOutcome, GapScanner, ReportEmitter, ReportViewer,
    RunOutcome, TrendTracker,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── 1. Load configuration ───────────────────────────────
    let config =
        config::loader::load_config(&cli.config).context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.tracker.log_level)),
        )
        .json()
        .init();

    info!(
        name = %config.tracker.name,
        version = env!("CARGO_PKG_VERSION"),
        command = ?cli.command(),
        "Starting NIFTY 50 trend tracker"
    );

    match cli.command() {
        Command::Track { symbols, overwrite } => track(config, symbols, overwrite).await,
        Command::GapScan { overwrite } => gap_scan(config, overwrite).await,
        Command::Screen => screen(config).await,
        Command::Report { date, send } => report(config, date, send).await,
    }
}

fn quote_source(config: &AppConfig) -> Result<Arc<YahooQuoteSource>> {
    let client =
        QuoteClient::new((&config.quotes).into()).context("Failed to create quote client")?;
    Ok(Arc::new(YahooQuoteSource::new(Arc::new(client))))
}

async fn report_emitter(
    config: &AppConfig,
    overwrite: bool,
) -> Result<(Arc<dyn ReportStore>, Arc<ReportEmitter>)> {
    let store: Arc<dyn ReportStore> = Arc::new(
        FileReportStore::new(&config.persistence)
            .await
            .context("Failed to open report store")?,
    );
    let notifier =
        build_notifier(&config.notifications).context("Failed to set up notifications")?;
    if notifier.is_none() {
        warn!("Notifications disabled");
    }
    let emitter = ReportEmitter::new(
        Arc::clone(&store),
        notifier,
        overwrite || config.persistence.overwrite_existing,
    );
    Ok((store, Arc::new(emitter)))
}

/// Start → run → finalize at the cutoff. SIGINT stops without finalizing.
async fn track(config: AppConfig, symbols: Vec<Symbol>, overwrite: bool) -> Result<()> {
    let universe = if symbols.is_empty() {
        config.tracker.universe.clone()
    } else {
        symbols
    };

    let quotes = quote_source(&config)?;
    let (store, emitter) = report_emitter(&config, overwrite).await?;
    let tracker = Arc::new(TrendTracker::new(quotes, Arc::new(SystemClock), emitter));

    // ── Metrics follow the tracker's event feed ─────────────
    let metrics = Arc::new(MetricsRegistry::new().context("Failed to register metrics")?);
    let metrics_handle = tokio::spawn(Arc::clone(&metrics).follow(tracker.subscribe()));

    // ── Health / board server ───────────────────────────────
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let health_handle = if config.server.enabled {
        let server = HealthServer::new(
            HealthState {
                session: tracker.session(),
                board: tracker.board(),
                metrics: Arc::clone(&metrics),
                store,
            },
            config.server.bind_address.clone(),
        );
        let shutdown_rx = shutdown_tx.subscribe();
        Some(tokio::spawn(async move {
            if let Err(e) = server.run(shutdown_rx).await {
                error!(error = %e, "Health server failed");
            }
        }))
    } else {
        None
    };

    // ── Report slot check + baseline capture, then the loop ─
    let outcome = match tracker.start(&universe).await {
        Ok(captured) => {
            info!(captured, universe = universe.len(), "Baselines captured");
            let runner = Arc::clone(&tracker);
            let mut run_handle = tokio::spawn(async move { runner.run().await });

            let joined = tokio::select! {
                joined = &mut run_handle => joined,
                _ = signal::ctrl_c() => {
                    info!("SIGINT received, stopping without finalizing");
                    tracker.stop();
                    run_handle.await
                }
            };
            joined.context("Tracking loop panicked")?
        }
        Err(e) => Err(e),
    };

    let result = match outcome {
        Ok(RunOutcome::Finalized(FinalizeOutcome::Finalized { result, saved, delivery })) => {
            info!(
                rising = result.rising().count(),
                falling = result.falling().count(),
                path = %saved.path().display(),
                "Session complete"
            );
            if let DeliveryStatus::Failed(reason) = delivery {
                warn!(reason = %reason, "Report saved but not delivered");
            }
            println!("{}", result.render_text());
            Ok(())
        }
        Ok(RunOutcome::Finalized(FinalizeOutcome::AlreadyFinalized(result))) => {
            info!(session_id = %result.session_id, "Session was already finalized");
            Ok(())
        }
        Ok(RunOutcome::Stopped) => {
            info!("Session stopped; no report written");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Tracking session failed");
            // The observation window is gone; show what could not be saved.
            if let Some(unsaved) = tracker.pending_result().await {
                eprintln!("Report NOT saved:\n{}", unsaved.render_text());
            }
            Err(e).context("Tracking session failed")
        }
    };

    // ── Shutdown ────────────────────────────────────────────
    let _ = shutdown_tx.send(());
    if let Some(handle) = health_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }
    drop(tracker);
    metrics_handle.abort();

    info!("Shutdown complete");
    result
}

/// One-shot opening gap scan: persist CSV + HTML and notify.
async fn gap_scan(config: AppConfig, overwrite: bool) -> Result<()> {
    let source = quote_source(&config)?;
    let scanner = GapScanner::new(source, config.quotes.daily_lookback_days);
    let date = session_date(SystemClock.now());

    let report = scanner.scan(&config.tracker.universe, date).await;
    let (_, emitter) = report_emitter(&config, overwrite).await?;

    match emitter
        .publish_gap_report(&report)
        .await
        .context("Failed to publish gap report")?
    {
        Some((saved, delivery)) => {
            info!(
                path = %saved.path().display(),
                delivered = delivery.is_delivered(),
                "Gap scan published"
            );
            println!("{}", report.render_text());
        }
        None => println!("No breakouts today."),
    }
    Ok(())
}

fn print_summary(s: &IntradaySummary) {
    println!(
        "  {:<12} {:>7.2}%  open {:.2}  high {:.2}  low {:.2}  last {:.2}  {}",
        display_symbol(&s.symbol),
        s.change_pct,
        s.open,
        s.high,
        s.low,
        s.last,
        s.status
    );
}

/// Print the day's extremes, then every instrument by change.
async fn screen(config: AppConfig) -> Result<()> {
    let screener = ExtremesScreener::new(quote_source(&config)?);
    let all = screener.screen(&config.tracker.universe).await;

    println!("High-High:");
    all.iter()
        .filter(|s| s.status == ExtremeStatus::HighHigh)
        .for_each(print_summary);
    println!("Low-Low:");
    all.iter()
        .rev()
        .filter(|s| s.status == ExtremeStatus::LowLow)
        .for_each(print_summary);
    println!("All instruments:");
    all.iter().for_each(print_summary);
    Ok(())
}

/// Show stored reports for a date and optionally send them again.
async fn report(config: AppConfig, date: Option<NaiveDate>, send: bool) -> Result<()> {
    let (store, emitter) = report_emitter(&config, false).await?;
    let viewer = ReportViewer::new(store, emitter);

    let dates = viewer.dates().await.context("Failed to list stored reports")?;
    let Some(date) = date.or_else(|| dates.first().copied()) else {
        println!("No data files found yet.");
        return Ok(());
    };
    let available: Vec<String> = dates.iter().map(ToString::to_string).collect();
    println!("Stored dates: {}", available.join(", "));

    let day = viewer
        .load(date)
        .await
        .with_context(|| format!("Failed to load reports for {date}"))?;
    anyhow::ensure!(!day.is_empty(), "No stored reports for {date}");
    println!("{}", day.render_text());

    if send {
        for status in viewer.resend(&day).await {
            match status {
                DeliveryStatus::Delivered => println!("Report sent."),
                DeliveryStatus::Disabled => println!("Notifications are disabled; nothing sent."),
                DeliveryStatus::Failed(reason) => anyhow::bail!("Re-send failed: {reason}"),
            }
        }
    }
    Ok(())
}

mod analyzer;
mod basket;
mod commands;
mod config;
mod index;
mod model;
mod normalizer;
mod parser;
mod report;
mod session;
mod storage;

use analyzer::Comparator;
use commands::{handle_command, parse_command};
use config::load_config;
use index::HttpPriceIndex;
use report::render_comparison;
use session::BagSession;
use std::sync::Arc;
use storage::SqliteStorage;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;
use tokio::time::{Duration, interval};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    std::panic::set_hook(Box::new(|panic_info| {
        error!("😱 Panic occurred: {:?}", panic_info);
    }));

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.json".into());
    let config = match load_config(&config_path) {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            error!("Config load error: {}", e);
            return;
        }
    };
    info!(
        "Using price index at {} (policy {:?})",
        config.api_base_url, config.best_shop_policy
    );

    let index = match HttpPriceIndex::new(&config) {
        Ok(index) => Arc::new(index),
        Err(e) => {
            error!("Failed to create price index client: {}", e);
            return;
        }
    };
    let comparator = Comparator::new(index, config.best_shop_policy);

    // A broken database only costs persistence, the bag still works in memory.
    let session = match SqliteStorage::new(&config.database_path) {
        Ok(storage) => Arc::new(BagSession::with_storage(storage)),
        Err(e) => {
            warn!("Bag storage unavailable, running in memory: {}", e);
            Arc::new(BagSession::new(basket::Basket::new()))
        }
    };

    spawn_report_printer(&session, config.currency.clone());

    let refresh_notify = Arc::new(Notify::new());
    let mut timer = interval(Duration::from_secs(config.refresh_interval_seconds));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    println!("{}", commands::HELP);

    loop {
        tokio::select! {
            _ = timer.tick() => {
                info!("Timer triggered.");
                spawn_refresh(session.clone(), comparator.clone());
            }
            _ = refresh_notify.notified() => {
                info!("Manual refresh triggered.");
                spawn_refresh(session.clone(), comparator.clone());
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => match parse_command(&line) {
                    Ok(command) => {
                        let outcome = handle_command(command, &session, &config.currency).await;
                        println!("{}", outcome.reply);
                        if outcome.quit {
                            break;
                        }
                        if outcome.refresh {
                            refresh_notify.notify_one();
                        }
                    }
                    Err(e) => println!("❌ {}", e),
                },
                Ok(None) => {
                    info!("Input closed, continuing with timed refreshes only.");
                    stdin_open = false;
                }
                Err(e) => {
                    warn!("Failed to read command: {}", e);
                    stdin_open = false;
                }
            },
        }
    }

    info!("Shutting down.");
}

/// Runs one comparison in the background. A newer run may finish first; the
/// session then discards this one on publish.
fn spawn_refresh(session: Arc<BagSession>, comparator: Comparator) {
    tokio::spawn(async move {
        if !session.refresh(&comparator).await {
            info!("Comparison superseded by a newer bag state.");
        }
    });
}

/// Prints every comparison the session accepts.
fn spawn_report_printer(session: &BagSession, currency: String) {
    let mut rx = session.subscribe();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let latest = rx.borrow_and_update().clone();
            if let Some(comparison) = latest {
                println!("{}", render_comparison(&comparison, &currency));
            }
        }
    });
}

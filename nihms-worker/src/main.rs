//! NIHMS Poller - drains notification emails and publishes submission outcomes.
//!
//! On every poll interval this binary:
//! 1. Searches the spool mailbox for unseen bulk submission notifications
//! 2. Extracts one outcome record per reported submission
//! 3. Publishes each record to the outcome queue, then marks the message seen

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nihms::{drain_mailbox, Config, Publisher, SpoolMailbox};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("poller_starting");

    let config = Config::from_env();
    info!(
        spool_dir = %config.spool_dir.display(),
        subject_filter = %config.subject_filter,
        amqp_url_set = !config.amqp_url.is_empty(),
        outcome_queue = %config.outcome_queue,
        poll_interval_secs = config.poll_interval_secs,
        "config_loaded"
    );

    run(config).await?;

    Ok(())
}

/// Run the poller until SIGINT or SIGTERM.
async fn run(config: Config) -> Result<()> {
    let spool = SpoolMailbox::open(&config.spool_dir).context("Failed to open spool mailbox")?;
    let publisher = Publisher::new(config.amqp_url.clone(), config.outcome_queue.clone());

    let shutdown = async {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                error!(error = %e, "ctrl_c_handler_failed");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    error!(error = %e, "sigterm_handler_failed");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("Received SIGINT"),
            _ = terminate => info!("Received SIGTERM"),
        }
    };

    tokio::pin!(shutdown);

    let mut tick = tokio::time::interval(Duration::from_secs(config.poll_interval_secs.max(1)));

    info!("poller_ready");

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("poller_stopping");
                break;
            }
            _ = tick.tick() => {
                poll_once(&spool, &config.subject_filter, &publisher).await;
            }
        }
    }

    publisher.close().await;

    info!("poller_shutdown_complete");
    Ok(())
}

/// Drain the spool once, publishing each message's records before it is marked seen.
async fn poll_once(spool: &SpoolMailbox, subject_filter: &str, publisher: &Publisher) {
    let mut spool = spool.clone();
    let subject_filter = subject_filter.to_string();
    let publisher = publisher.clone();
    let runtime = tokio::runtime::Handle::current();

    // Spool access is blocking file I/O; publishing is bridged back onto the runtime
    let drained = tokio::task::spawn_blocking(move || {
        drain_mailbox(&mut spool, &subject_filter, |outcomes| {
            for outcome in outcomes {
                runtime.block_on(publisher.publish_outcome(outcome))?;
            }
            Ok::<(), anyhow::Error>(())
        })
    })
    .await;

    match drained {
        Ok(Ok(summary)) if summary.message_count > 0 => {
            info!(
                message_count = summary.message_count,
                delivered_count = summary.delivered_count,
                record_count = summary.record_count,
                "poll_complete"
            );
        }
        Ok(Ok(_)) => {}
        Ok(Err(e)) => error!(error = %e, "poll_drain_failed"),
        Err(e) => error!(error = %e, "poll_drain_task_panicked"),
    }
}

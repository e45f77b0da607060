use canteen_checkout::application::reconciler::{DeepLinkReconciler, ReconcileOutcome};
use canteen_checkout::application::registry::CheckoutSessionRegistry;
use canteen_checkout::domain::codec;
use canteen_checkout::domain::ports::{OrderLedgerBox, PresentationSurfaceBox};
use canteen_checkout::error::CheckoutError;
use canteen_checkout::infrastructure::in_memory::InMemoryLedger;
#[cfg(feature = "storage-rocksdb")]
use canteen_checkout::infrastructure::rocksdb::RocksDbLedger;
use canteen_checkout::infrastructure::surface::LoggingSurface;
use canteen_checkout::interfaces::csv::event_reader::{CheckoutEvent, EventKind, EventReader};
use canteen_checkout::interfaces::csv::ledger_writer::LedgerWriter;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input checkout-events CSV file
    events: PathBuf,

    /// Path to the persistent ledger (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

fn open_ledger(db_path: Option<PathBuf>) -> Result<OrderLedgerBox> {
    #[cfg(feature = "storage-rocksdb")]
    if let Some(db_path) = db_path {
        let ledger = RocksDbLedger::open(db_path).into_diagnostic()?;
        return Ok(Box::new(ledger));
    }

    #[cfg(not(feature = "storage-rocksdb"))]
    if db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }

    Ok(Box::new(InMemoryLedger::new()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let registry = Arc::new(CheckoutSessionRegistry::new());
    let ledger = open_ledger(cli.db_path)?;
    let surface: PresentationSurfaceBox = Box::new(LoggingSurface);
    let reconciler = DeepLinkReconciler::new(Arc::clone(&registry), ledger, surface);

    let file = File::open(cli.events).into_diagnostic()?;
    let reader = EventReader::new(file);
    for event_result in reader.events() {
        match event_result {
            Ok(event) => {
                if let Err(e) = apply_event(&registry, &reconciler, event).await {
                    eprintln!("Error processing event: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading event: {}", e);
            }
        }
    }

    // Output the final ledger for admin review.
    let orders = reconciler.ledger().list().await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = LedgerWriter::new(stdout.lock());
    writer.write_orders(&orders).into_diagnostic()?;

    Ok(())
}

async fn apply_event(
    registry: &CheckoutSessionRegistry,
    reconciler: &DeepLinkReconciler,
    event: CheckoutEvent,
) -> canteen_checkout::error::Result<()> {
    match event.event {
        EventKind::Begin => {
            let draft = event.draft()?;
            let session_id = registry.begin(draft).await;
            info!(%session_id, "checkout session opened");
        }
        EventKind::Callback => {
            let url = event.url.clone().ok_or_else(|| {
                CheckoutError::Validation("callback row is missing the url".to_string())
            })?;
            // Replay scripts cannot know generated session ids up front; the
            // $SESSION token stands for the currently active one.
            let url = match registry.active_session().await {
                Some(session) => url.replace("$SESSION", &session.session_id.to_string()),
                None => url,
            };
            report(reconciler.handle_callback(&url).await)?;
        }
        EventKind::Clear => {
            reconciler.ledger().clear_all().await?;
        }
    }
    Ok(())
}

fn report(outcome: ReconcileOutcome) -> canteen_checkout::error::Result<()> {
    match outcome {
        ReconcileOutcome::Completed(order) => {
            let payload = codec::encode(&order)?;
            debug!(%payload, "outbound submission payload");
            info!(reference = %order.payment_reference, "order finalized");
        }
        ReconcileOutcome::CompletedUnsaved { order, error } => {
            eprintln!(
                "WARNING: payment {} succeeded but the order could not be saved: {}",
                order.payment_reference, error
            );
        }
        ReconcileOutcome::Declined { session_id } => {
            info!(%session_id, "payment declined");
        }
        ReconcileOutcome::Ignored(reason) => {
            debug!(?reason, "callback ignored");
        }
    }
    Ok(())
}

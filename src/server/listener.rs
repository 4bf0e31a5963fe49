//! Accept loop, spec §5.
//!
//! One task per connection; a connection's failure is confined to itself
//! and never brings down the listener or any other connection (spec §7).
//! Shutdown stops accepting new connections and waits up to a grace period
//! for in-flight connection tasks to finish on their own before moving on.

use super::connection::{Connection, HandlerContext};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// How long `run` waits for in-flight connections to finish once shutdown
/// is requested, spec §5.
const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Serve GSUP/IPA connections on an already-bound `listener` until
/// `shutdown` resolves. Binding is left to the caller so tests can bind an
/// ephemeral port and production can bind the configured one.
pub async fn run(
    listener: TcpListener,
    ctx: HandlerContext,
    shutdown: impl std::future::Future<Output = ()>,
) -> std::io::Result<()> {
    info!(local_addr = ?listener.local_addr(), "listening for GSUP connections");

    let mut tasks = JoinSet::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer_addr) = match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };
                let ctx = ctx.clone();
                tasks.spawn(async move {
                    let mut connection = Connection::new(stream, peer_addr, ctx);
                    if let Err(e) = connection.run().await {
                        error!(%peer_addr, error = %e, "connection terminated with an error");
                    }
                });
            }
            _ = &mut shutdown => {
                info!("shutdown requested, no longer accepting new connections");
                break;
            }
        }
    }

    drop(listener);
    let drain = async {
        while tasks.join_next().await.is_some() {}
    };
    if tokio::time::timeout(SHUTDOWN_GRACE_PERIOD, drain).await.is_err() {
        warn!("grace period elapsed with connections still open; aborting remaining tasks");
        tasks.shutdown().await;
    }

    Ok(())
}

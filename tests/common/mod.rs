//! Shared harness for the end-to-end protocol tests: spins up a real
//! listener on an ephemeral port and hands back a plain `TcpStream` for
//! the test to drive as a GSUP/IPA peer.

use hlr_gsup::auth::AuthClient;
use hlr_gsup::routing::RoutingStore;
use hlr_gsup::server::{listener, HandlerContext};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

pub struct RunningServer {
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl RunningServer {
    pub async fn spawn(auth_client: Arc<dyn AuthClient>, update_location_timeout: Duration) -> Self {
        let tcp_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = tcp_listener.local_addr().unwrap();
        let ctx = HandlerContext {
            auth_client,
            routing: RoutingStore::new(),
            update_location_timeout,
        };

        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let shutdown = async {
                let _ = rx.await;
            };
            listener::run(tcp_listener, ctx, shutdown).await.unwrap();
        });

        Self {
            addr,
            shutdown: Some(tx),
        }
    }
}

impl Drop for RunningServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

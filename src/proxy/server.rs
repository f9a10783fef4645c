//! Listener / Dispatcher
//!
//! Accepts client connections and hands each one to its own detached
//! worker task. Workers are never tracked or joined.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::proxy::handle_connection;
use crate::state::AppState;

/// Pause after a failed accept so a persistent error (e.g. EMFILE) does not spin.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// The bound proxy listener.
pub struct ProxyServer {
    listener: TcpListener,
    state: AppState,
}

impl ProxyServer {
    /// Binds the listening socket.
    pub async fn bind(addr: SocketAddr, state: AppState) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, state })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until `shutdown` resolves.
    ///
    /// Stopping only closes the listener; workers already spawned run on.
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) {
        let addr = self.local_addr().ok();
        info!(addr = ?addr, "Proxy listening");

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Listener stopped");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        debug!(%peer, "Accepted connection");
                        tokio::spawn(handle_connection(stream, peer, self.state.clone()));
                    }
                    Err(err) => {
                        error!(error = %err, "Error accepting connection");
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::proxy::ProxySettings;
    use bytes::Bytes;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    async fn start(state: AppState) -> (SocketAddr, oneshot::Sender<()>, tokio::task::JoinHandle<()>) {
        let server = ProxyServer::bind("127.0.0.1:0".parse().unwrap(), state)
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();
        let handle = tokio::spawn(server.run_until(async move {
            let _ = rx.await;
        }));
        (addr, tx, handle)
    }

    #[tokio::test]
    async fn test_serves_concurrent_clients() {
        let state = AppState::new(CacheStore::new(10_000), ProxySettings::default());
        for i in 0..8 {
            state
                .cache
                .insert(format!("GET http://cached/{} HTTP/1.0", i), Bytes::from(format!("reply {}", i)))
                .await;
        }
        let (addr, _tx, _handle) = start(state).await;

        let mut clients = vec![];
        for i in 0..8 {
            clients.push(tokio::spawn(async move {
                let mut stream = TcpStream::connect(addr).await.unwrap();
                stream
                    .write_all(format!("GET http://cached/{} HTTP/1.0\r\n\r\n", i).as_bytes())
                    .await
                    .unwrap();
                let mut reply = String::new();
                stream.read_to_string(&mut reply).await.unwrap();
                assert_eq!(reply, format!("reply {}", i));
            }));
        }
        for client in clients {
            client.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_bad_connection_does_not_stop_listener() {
        let state = AppState::new(CacheStore::new(1000), ProxySettings::default());
        state
            .cache
            .insert("GET http://cached/ HTTP/1.0".to_string(), Bytes::from_static(b"ok"))
            .await;
        let (addr, _tx, _handle) = start(state).await;

        let mut bad = TcpStream::connect(addr).await.unwrap();
        bad.write_all(b"DELETE http://cached/ HTTP/1.0\r\n\r\n").await.unwrap();
        let mut nothing = Vec::new();
        // A reset is as good as a close here.
        let _ = bad.read_to_end(&mut nothing).await;
        assert!(nothing.is_empty());

        let mut good = TcpStream::connect(addr).await.unwrap();
        good.write_all(b"GET http://cached/ HTTP/1.0\r\n\r\n").await.unwrap();
        let mut reply = Vec::new();
        good.read_to_end(&mut reply).await.unwrap();
        assert_eq!(reply, b"ok");
    }

    #[tokio::test]
    async fn test_shutdown_stops_accepting() {
        let state = AppState::new(CacheStore::new(1000), ProxySettings::default());
        let (_addr, tx, handle) = start(state).await;

        tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("listener should stop")
            .unwrap();
    }
}

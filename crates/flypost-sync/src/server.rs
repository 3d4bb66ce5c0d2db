//! The sync server: accept loop and per-connection sessions.
//!
//! The accept loop polls with a bounded timeout and re-checks a shutdown
//! flag between polls, so stopping takes effect within one poll window and
//! the loop never blocks indefinitely. Each accepted connection is served
//! on its own task: read one request line, answer one line, close. A failed
//! session is logged and dies alone; nothing propagates to the accept loop.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{
    self, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::task::JoinHandle;
use tokio::time;

use flypost_store::MessageStore;

use crate::wire::{limits, Request, PROTOCOL_VERSION, SYNTAX_ERROR};

/// Server timing configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// How long one accept poll waits before re-checking the shutdown flag.
    pub poll_interval: Duration,
    /// Bound on each session's request read and response write.
    pub session_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            session_timeout: Duration::from_secs(10),
        }
    }
}

/// Handle to a running server.
///
/// Dropping the handle does not stop the server; call
/// [`shutdown`](Self::shutdown).
pub struct ServerHandle {
    local_addr: SocketAddr,
    running: Arc<AtomicBool>,
    connections_served: Arc<AtomicU64>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// The address the server is listening on.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The listening port.
    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    /// Number of connections accepted so far.
    pub fn connections_served(&self) -> u64 {
        self.connections_served.load(Ordering::SeqCst)
    }

    /// Whether the accept loop is still polling.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop accepting and wait for the accept loop to exit.
    ///
    /// Takes effect within one poll window; sessions already spawned finish
    /// on their own.
    pub async fn shutdown(self) {
        self.running.store(false, Ordering::SeqCst);
        if let Err(e) = self.task.await {
            tracing::warn!("Accept loop ended abnormally: {}", e);
        }
    }
}

/// Bind a listener and start serving the store.
pub async fn start(
    addr: impl ToSocketAddrs,
    store: Arc<MessageStore>,
    node_id: String,
    config: ServerConfig,
) -> io::Result<ServerHandle> {
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    let running = Arc::new(AtomicBool::new(true));
    let connections_served = Arc::new(AtomicU64::new(0));

    let task = tokio::spawn(accept_loop(
        listener,
        store,
        node_id,
        config,
        Arc::clone(&running),
        Arc::clone(&connections_served),
    ));

    tracing::info!("Listening on {}", local_addr);
    Ok(ServerHandle {
        local_addr,
        running,
        connections_served,
        task,
    })
}

async fn accept_loop(
    listener: TcpListener,
    store: Arc<MessageStore>,
    node_id: String,
    config: ServerConfig,
    running: Arc<AtomicBool>,
    connections_served: Arc<AtomicU64>,
) {
    while running.load(Ordering::SeqCst) {
        match time::timeout(config.poll_interval, listener.accept()).await {
            // Poll window elapsed with no connection; re-check the flag.
            Err(_) => continue,
            Ok(Err(e)) => {
                // A failing accept (fd exhaustion and the like) returns at
                // once; keep the retry on the poll cadence.
                tracing::warn!("Accept failed: {}", e);
                time::sleep(config.poll_interval).await;
            }
            Ok(Ok((stream, peer))) => {
                connections_served.fetch_add(1, Ordering::SeqCst);
                let store = Arc::clone(&store);
                let node_id = node_id.clone();
                let timeout = config.session_timeout;
                tokio::spawn(async move {
                    if let Err(e) = serve_connection(stream, &store, &node_id, timeout).await {
                        tracing::warn!("Session with {} failed: {}", peer, e);
                    }
                });
            }
        }
    }
    tracing::info!("Stopped listening");
}

/// Serve a single connection: one request line in, one response line out.
pub async fn serve_connection<S>(
    stream: S,
    store: &MessageStore,
    node_id: &str,
    timeout: Duration,
) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = io::split(stream);
    let mut reader = BufReader::new(reader).take(limits::MAX_REQUEST_LINE as u64 + 1);

    let mut line = String::new();
    let read = time::timeout(timeout, reader.read_line(&mut line))
        .await
        .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "request read timed out"))?;

    let response = match read {
        // Peer closed without sending anything.
        Ok(0) => return Ok(()),
        Ok(_) if line.len() > limits::MAX_REQUEST_LINE => SYNTAX_ERROR.to_owned(),
        Ok(_) => answer(line.trim_end_matches(['\r', '\n']), store, node_id),
        // Not UTF-8, so it cannot match any request form.
        Err(e) if e.kind() == io::ErrorKind::InvalidData => SYNTAX_ERROR.to_owned(),
        Err(e) => return Err(e),
    };

    time::timeout(timeout, async {
        writer.write_all(response.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.shutdown().await
    })
    .await
    .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "response write timed out"))??;

    Ok(())
}

/// Compute the response line for one request line.
fn answer(line: &str, store: &MessageStore, node_id: &str) -> String {
    match Request::parse(line) {
        Ok(Request::Version) => PROTOCOL_VERSION.to_owned(),
        Ok(Request::NodeId) => node_id.to_owned(),
        Ok(Request::List) => {
            let ids: Vec<String> = store.ids().iter().map(|id| id.to_hex()).collect();
            ids.join(";")
        }
        Ok(Request::Messages(None)) => {
            let msgs: Vec<String> = store.messages().iter().map(|m| m.serialize()).collect();
            msgs.join(";")
        }
        Ok(Request::Messages(Some(ids))) => {
            let msgs: Vec<String> = store.select(&ids).iter().map(|m| m.serialize()).collect();
            msgs.join(";")
        }
        Err(e) => {
            tracing::debug!("Rejecting request: {}", e);
            SYNTAX_ERROR.to_owned()
        }
    }
}

//! FactorialServer: TCP accept loop and per-connection request handling.
//!
//! # Connection lifecycle
//!
//! ```text
//! Listening ──accept──▶ ConnectedLoop ──EOF / error──▶ Closed
//!     ▲                   │    ▲                          │
//!     │                   └────┘ one request, one reply   │
//!     └───────────────────────────────────────────────────┘
//! ```
//!
//! Every accepted connection runs in its own Tokio task, so a long
//! computation on one connection never delays another.  Inside a connection
//! the server reads a 24-byte request, checks it, computes the product on the
//! [`WorkerPool`], writes the 8-byte reply, and waits for the next request.
//!
//! A connection is closed *without* a reply when the request is malformed or
//! invalid; the client sees EOF.  Nothing that happens on one connection can
//! stop the server.  Only failing to bind the listening socket is fatal.

use std::io;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use modfact_core::{ComputeRequest, ComputeResponse, ProtocolError, ValidationError, REQUEST_SIZE};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::application::worker_pool::{WorkerPool, WorkerPoolError};
use crate::infrastructure::config::ServerConfig;

/// Pending-connection queue length passed to `listen(2)`.
const LISTEN_BACKLOG: u32 = 128;

/// How often the accept loop wakes up to check the shutdown flag.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Errors that prevent the server from starting.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("bind failed on {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("invalid server configuration: {0}")]
    InvalidConfig(#[from] ValidationError),
}

/// Reasons a single connection was closed early.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),
    #[error("computation failed: {0}")]
    Compute(#[from] WorkerPoolError),
}

/// A bound factorial server, ready to [`serve`](FactorialServer::serve).
pub struct FactorialServer {
    listener: TcpListener,
    pool: WorkerPool,
}

impl FactorialServer {
    /// Binds the listening socket described by `config`.
    ///
    /// The socket is created with `SO_REUSEADDR` so a restarted server can
    /// rebind while old connections sit in `TIME_WAIT`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidConfig`] for a zero thread count and
    /// [`ServerError::BindFailed`] if the socket cannot be bound or put into
    /// listening mode.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let pool = WorkerPool::new(config.thread_count)?;
        let addr = config.bind_addr;
        let bind_err = |source: io::Error| ServerError::BindFailed { addr, source };

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        };
        let socket = socket.map_err(bind_err)?;
        socket.set_reuseaddr(true).map_err(bind_err)?;
        socket.bind(addr).map_err(bind_err)?;
        let listener = socket.listen(LISTEN_BACKLOG).map_err(bind_err)?;

        Ok(Self { listener, pool })
    }

    /// The address the listener actually bound (useful with port 0 in tests).
    ///
    /// # Errors
    ///
    /// Propagates the OS error from `getsockname`.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop until `running` is cleared.
    ///
    /// Each accepted connection is handed to its own task.  Transient accept
    /// errors are logged and the loop continues.
    pub async fn serve(self, running: Arc<AtomicBool>) {
        match self.listener.local_addr() {
            Ok(addr) => info!(
                "server listening on {addr} with {} worker(s) per request",
                self.pool.worker_count()
            ),
            Err(e) => warn!("server listening on unknown address: {e}"),
        }

        loop {
            if !running.load(Ordering::Relaxed) {
                info!("shutdown flag set; stopping accept loop");
                break;
            }

            // A short timeout lets the loop notice the shutdown flag even
            // when no client is connecting.
            match timeout(ACCEPT_POLL_INTERVAL, self.listener.accept()).await {
                Ok(Ok((stream, peer_addr))) => {
                    info!("new connection from {peer_addr}");
                    let pool = self.pool;
                    tokio::spawn(async move {
                        handle_connection(stream, peer_addr, pool).await;
                    });
                }
                Ok(Err(e)) => {
                    // e.g. too many open file descriptors
                    error!("accept error: {e}");
                }
                Err(_) => {}
            }
        }
    }
}

// ── Per-connection handler ────────────────────────────────────────────────────

/// Drives one connection and logs how it ended.  The socket is released when
/// `stream` is dropped on return.
async fn handle_connection(mut stream: TcpStream, peer_addr: SocketAddr, pool: WorkerPool) {
    match serve_connection(&mut stream, &pool).await {
        Ok(served) => info!("connection {peer_addr} closed after {served} request(s)"),
        Err(e) => warn!("connection {peer_addr} closed: {e}"),
    }
}

/// Request/response loop for one connection.
///
/// Returns the number of requests answered once the peer closes cleanly.
///
/// # Errors
///
/// Any [`ConnectionError`] ends the loop; no reply is written for the request
/// that caused it.
pub async fn serve_connection<S>(stream: &mut S, pool: &WorkerPool) -> Result<u64, ConnectionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut served = 0u64;

    while let Some(frame) = read_request_frame(stream).await? {
        let request = ComputeRequest::decode(&frame)?;
        debug!(
            "received begin={} end={} modulus={}",
            request.begin, request.end, request.modulus
        );

        let range = request.validate()?;
        let result = pool.compute(range, request.modulus).await?;
        debug!("result for {range} mod {}: {result}", request.modulus);

        stream.write_all(&ComputeResponse { result }.encode()).await?;
        served += 1;
    }

    Ok(served)
}

/// Reads exactly one request frame, accumulating short reads.
///
/// Returns `Ok(None)` when the peer closes before sending any byte of a new
/// request, which is the normal end of a connection.
///
/// # Errors
///
/// Returns [`ProtocolError::InsufficientData`] when the peer closes part-way
/// through a frame, and [`ConnectionError::Io`] for socket errors.
async fn read_request_frame<R>(reader: &mut R) -> Result<Option<[u8; REQUEST_SIZE]>, ConnectionError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; REQUEST_SIZE];
    let mut filled = 0;

    while filled < REQUEST_SIZE {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(ProtocolError::InsufficientData {
                needed: REQUEST_SIZE,
                available: filled,
            }
            .into());
        }
        filled += n;
    }

    Ok(Some(buf))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

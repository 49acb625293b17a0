//! TcpExchange: one request/response round trip per server over TCP.
//!
//! Each exchange opens a fresh connection, writes one 24-byte request, reads
//! one 8-byte response and closes.  Every step runs under the same timeout so
//! a silent server cannot stall the whole fan-out.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use modfact_core::{ComputeRequest, ComputeResponse, ServerEndpoint, RESPONSE_SIZE};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::application::{ExchangeError, ExchangeStage, RangeExchange};

/// Per-step timeout used when none is configured.
pub const DEFAULT_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(5);

/// [`RangeExchange`] over plain TCP.
#[derive(Debug, Clone, Copy)]
pub struct TcpExchange {
    step_timeout: Duration,
}

impl Default for TcpExchange {
    fn default() -> Self {
        Self::new(DEFAULT_EXCHANGE_TIMEOUT)
    }
}

impl TcpExchange {
    pub fn new(step_timeout: Duration) -> Self {
        Self { step_timeout }
    }

    /// Runs `fut` under the step timeout, tagging failures with `stage`.
    async fn step<T, F>(&self, stage: ExchangeStage, fut: F) -> Result<T, ExchangeError>
    where
        F: std::future::Future<Output = io::Result<T>>,
    {
        match timeout(self.step_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) if e.kind() == io::ErrorKind::UnexpectedEof => Err(ExchangeError::Closed),
            Ok(Err(source)) => Err(ExchangeError::Io { stage, source }),
            Err(_) => Err(ExchangeError::Timeout {
                stage,
                after: self.step_timeout,
            }),
        }
    }
}

#[async_trait]
impl RangeExchange for TcpExchange {
    async fn exchange(
        &self,
        endpoint: &ServerEndpoint,
        request: ComputeRequest,
    ) -> Result<u64, ExchangeError> {
        let mut stream = self
            .step(
                ExchangeStage::Connect,
                TcpStream::connect((endpoint.host.as_str(), endpoint.port)),
            )
            .await?;
        debug!("connected to {endpoint}");

        let frame = request.encode();
        self.step(ExchangeStage::Send, stream.write_all(&frame))
            .await?;

        let mut reply = [0u8; RESPONSE_SIZE];
        self.step(ExchangeStage::Receive, stream.read_exact(&mut reply))
            .await?;

        let response = ComputeResponse::decode(&reply)?;
        debug!("{endpoint} replied {}", response.result);
        Ok(response.result)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

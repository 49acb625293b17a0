//! FactorialClient: splits `[1, k]` across a roster and combines the replies.
//!
//! # Fan-out and combine
//!
//! ```text
//!            partition([1, k], roster.len())
//!          ┌──────────────┼──────────────┐
//!   server A [1, 4]  server B [5, 7]  server C [8, 10]     one task each,
//!          │              │              │                 all spawned first
//!          └──────── join_all barrier ───┘
//!                         │
//!          fold successes with mod_mul, skip failures
//! ```
//!
//! A failed server is skipped with a warning, and the final value then omits
//! that server's range.  The [`FactorialReport`] records which ranges are
//! missing.
//!
//! The transport sits behind [`RangeExchange`], so this module never touches
//! a socket.  The TCP implementation is
//! `crate::infrastructure::exchange::TcpExchange`.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use modfact_core::{
    mod_mul, partition, ComputeRequest, ProtocolError, Range, ServerEndpoint, ValidationError,
};
use thiserror::Error;
use tracing::{info, warn};

/// Which step of an exchange failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeStage {
    Connect,
    Send,
    Receive,
}

impl fmt::Display for ExchangeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExchangeStage::Connect => "connect",
            ExchangeStage::Send => "send",
            ExchangeStage::Receive => "receive",
        };
        f.write_str(s)
    }
}

/// Why one server's exchange produced no partial result.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("{stage} failed: {source}")]
    Io {
        stage: ExchangeStage,
        #[source]
        source: std::io::Error,
    },

    #[error("{stage} timed out after {after:?}")]
    Timeout {
        stage: ExchangeStage,
        after: Duration,
    },

    /// The server closed the connection without replying, which is how it
    /// rejects an invalid request.
    #[error("server closed the connection without a response")]
    Closed,

    #[error("malformed response: {0}")]
    Protocol(#[from] ProtocolError),

    /// The task driving the exchange panicked or was cancelled.
    #[error("exchange task failed: {0}")]
    TaskFailed(String),
}

/// Sends one compute request to one server and returns its partial result.
///
/// Infrastructure implementations use TCP; test implementations script the
/// replies.
#[async_trait]
pub trait RangeExchange: Send + Sync {
    async fn exchange(
        &self,
        endpoint: &ServerEndpoint,
        request: ComputeRequest,
    ) -> Result<u64, ExchangeError>;
}

/// Error type for a whole client computation.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid input: {0}")]
    Invalid(#[from] ValidationError),

    #[error("the server roster is empty")]
    EmptyRoster,

    /// Every contacted server failed, so there is no partial product at all.
    #[error("all {attempted} server(s) failed; no result available")]
    NoServerSucceeded { attempted: usize },
}

/// What happened with one server.
#[derive(Debug)]
pub struct ServerOutcome {
    pub endpoint: ServerEndpoint,
    pub range: Range,
    pub result: Result<u64, ExchangeError>,
}

impl ServerOutcome {
    /// `true` when this server's range is missing from the final value.
    pub fn is_skipped(&self) -> bool {
        self.result.is_err()
    }
}

/// The combined answer plus a per-server account of how it was obtained.
#[derive(Debug)]
pub struct FactorialReport {
    pub k: u64,
    pub modulus: u64,
    /// Product of every successful partial result, modulo `modulus`.
    pub value: u64,
    /// One entry per contacted server, in partition order.
    pub outcomes: Vec<ServerOutcome>,
}

impl FactorialReport {
    /// Servers whose ranges were left out of [`FactorialReport::value`].
    pub fn skipped(&self) -> impl Iterator<Item = &ServerOutcome> {
        self.outcomes.iter().filter(|o| o.is_skipped())
    }

    /// `true` when every contacted server contributed.
    pub fn is_complete(&self) -> bool {
        self.skipped().next().is_none()
    }
}

/// Computes `k! mod m` by fanning sub-ranges out over a [`RangeExchange`].
pub struct FactorialClient<E> {
    exchange: Arc<E>,
}

impl<E> FactorialClient<E>
where
    E: RangeExchange + 'static,
{
    pub fn new(exchange: E) -> Self {
        Self {
            exchange: Arc::new(exchange),
        }
    }

    /// Computes `k! mod modulus` across `roster`.
    ///
    /// Server `i` receives the `i`-th slice of `partition([1, k], roster.len())`.
    /// When the roster is longer than `k`, the surplus servers are not
    /// contacted.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Invalid`] for `k == 0` or `modulus == 0`,
    /// [`ClientError::EmptyRoster`] for an empty roster, and
    /// [`ClientError::NoServerSucceeded`] when every exchange failed.
    pub async fn compute(
        &self,
        k: u64,
        modulus: u64,
        roster: &[ServerEndpoint],
    ) -> Result<FactorialReport, ClientError> {
        if modulus == 0 {
            return Err(ValidationError::ZeroModulus.into());
        }
        let total = Range::factorial(k)?;
        if roster.is_empty() {
            return Err(ClientError::EmptyRoster);
        }

        let slices = partition(total, roster.len())?;
        for idle in &roster[slices.len()..] {
            info!("server {idle} has no range to process (k = {k})");
        }

        // Spawn every exchange before awaiting any of them.
        let assignments: Vec<(ServerEndpoint, Range)> =
            roster.iter().cloned().zip(slices).collect();
        let handles: Vec<_> = assignments
            .iter()
            .map(|(endpoint, range)| {
                info!("server {endpoint} will process {range}");
                let exchange = Arc::clone(&self.exchange);
                let endpoint = endpoint.clone();
                let request = ComputeRequest::for_range(*range, modulus);
                tokio::spawn(async move { exchange.exchange(&endpoint, request).await })
            })
            .collect();

        let joined = join_all(handles).await;

        let mut value = 1 % modulus;
        let mut outcomes = Vec::with_capacity(assignments.len());
        for ((endpoint, range), joined) in assignments.into_iter().zip(joined) {
            let result = joined.unwrap_or_else(|e| Err(ExchangeError::TaskFailed(e.to_string())));
            match &result {
                Ok(partial) => {
                    info!("server {endpoint} returned {partial} for {range}");
                    value = mod_mul(value, *partial, modulus);
                }
                Err(e) => {
                    warn!("server {endpoint} failed ({e}); skipping its range {range}");
                }
            }
            outcomes.push(ServerOutcome {
                endpoint,
                range,
                result,
            });
        }

        if outcomes.iter().all(ServerOutcome::is_skipped) {
            return Err(ClientError::NoServerSucceeded {
                attempted: outcomes.len(),
            });
        }

        Ok(FactorialReport {
            k,
            modulus,
            value,
            outcomes,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use modfact_core::reduce_range;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use tokio::sync::Barrier;

    // ── Test doubles ──────────────────────────────────────────────────────────

    /// Computes replies locally; ports listed in `down` fail to connect.
    #[derive(Default)]
    struct ScriptedExchange {
        down: HashSet<u16>,
        requests: Mutex<Vec<(ServerEndpoint, ComputeRequest)>>,
    }

    impl ScriptedExchange {
        fn with_down(ports: &[u16]) -> Self {
            Self {
                down: ports.iter().copied().collect(),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl RangeExchange for ScriptedExchange {
        async fn exchange(
            &self,
            endpoint: &ServerEndpoint,
            request: ComputeRequest,
        ) -> Result<u64, ExchangeError> {
            self.requests
                .lock()
                .unwrap()
                .push((endpoint.clone(), request));
            if self.down.contains(&endpoint.port) {
                return Err(ExchangeError::Io {
                    stage: ExchangeStage::Connect,
                    source: std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
                });
            }
            let range = request.validate().expect("client sends valid requests");
            Ok(reduce_range(range, request.modulus))
        }
    }

    /// Completes only once `n` exchanges are in flight at the same time.
    struct RendezvousExchange {
        barrier: Barrier,
    }

    #[async_trait]
    impl RangeExchange for RendezvousExchange {
        async fn exchange(
            &self,
            _endpoint: &ServerEndpoint,
            request: ComputeRequest,
        ) -> Result<u64, ExchangeError> {
            self.barrier.wait().await;
            Ok(request.end - request.begin + 1)
        }
    }

    struct PanickingExchange;

    #[async_trait]
    impl RangeExchange for PanickingExchange {
        async fn exchange(
            &self,
            endpoint: &ServerEndpoint,
            request: ComputeRequest,
        ) -> Result<u64, ExchangeError> {
            if endpoint.port == 2 {
                panic!("injected exchange panic");
            }
            Ok(reduce_range(request.validate().unwrap(), request.modulus))
        }
    }

    fn roster(ports: &[u16]) -> Vec<ServerEndpoint> {
        ports
            .iter()
            .map(|&p| ServerEndpoint::new("worker", p).unwrap())
            .collect()
    }

    /// In-memory log sink for asserting on `tracing` output.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    // ── Tests ─────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_compute_all_servers_up_gives_exact_factorial() {
        // Arrange
        let client = FactorialClient::new(ScriptedExchange::default());

        // Act
        let report = client
            .compute(10, 1_000_000_007, &roster(&[1, 2, 3]))
            .await
            .unwrap();

        // Assert
        assert_eq!(report.value, 3_628_800);
        assert!(report.is_complete());
        assert_eq!(report.outcomes.len(), 3);
    }

    #[tokio::test]
    async fn test_compute_sends_partitioned_ranges_in_roster_order() {
        let exchange = ScriptedExchange::default();
        let client = FactorialClient::new(exchange);

        let report = client.compute(10, 97, &roster(&[1, 2, 3])).await.unwrap();

        let assigned: Vec<_> = report
            .outcomes
            .iter()
            .map(|o| (o.endpoint.port, o.range.begin(), o.range.end()))
            .collect();
        assert_eq!(assigned, vec![(1, 1, 4), (2, 5, 7), (3, 8, 10)]);

        let mut sent = client.exchange.requests.lock().unwrap().clone();
        sent.sort_by_key(|(ep, _)| ep.port);
        assert!(sent.iter().all(|(_, req)| req.modulus == 97));
        assert_eq!(sent[1].1.begin, 5);
        assert_eq!(sent[1].1.end, 7);
    }

    #[tokio::test]
    async fn test_compute_skips_failed_server_and_combines_the_rest() {
        // Arrange: the middle server ([5, 7]) is down
        let client = FactorialClient::new(ScriptedExchange::with_down(&[2]));
        let modulus = 1_000_000_007;

        // Act
        let report = client.compute(10, modulus, &roster(&[1, 2, 3])).await.unwrap();

        // Assert: 1*2*3*4 * 8*9*10 = 24 * 720
        assert_eq!(report.value, 24 * 720);
        let skipped: Vec<_> = report.skipped().map(|o| o.endpoint.to_string()).collect();
        assert_eq!(skipped, vec!["worker:2"]);
        assert!(!report.is_complete());
    }

    #[tokio::test]
    async fn test_compute_warns_with_the_skipped_endpoint_and_range() {
        // Arrange: record WARN output for the duration of the test
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer({
                let logs = logs.clone();
                move || logs.clone()
            })
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);
        let client = FactorialClient::new(ScriptedExchange::with_down(&[2]));

        // Act
        let report = client.compute(10, 97, &roster(&[1, 2, 3])).await.unwrap();

        // Assert
        let output = logs.contents();
        assert_eq!(report.skipped().count(), 1);
        let warnings: Vec<&str> = output.lines().filter(|l| l.contains("WARN")).collect();
        assert_eq!(warnings.len(), 1, "got: {output}");
        assert!(warnings[0].contains("worker:2"), "got: {output}");
        assert!(warnings[0].contains("[5, 7]"), "got: {output}");
    }

    #[tokio::test]
    async fn test_compute_all_servers_down_is_an_error() {
        let client = FactorialClient::new(ScriptedExchange::with_down(&[1, 2]));

        let result = client.compute(10, 97, &roster(&[1, 2])).await;

        assert!(matches!(
            result,
            Err(ClientError::NoServerSucceeded { attempted: 2 })
        ));
    }

    #[tokio::test]
    async fn test_compute_more_servers_than_terms_leaves_surplus_idle() {
        let client = FactorialClient::new(ScriptedExchange::default());

        let report = client
            .compute(3, 1_000, &roster(&[1, 2, 3, 4, 5]))
            .await
            .unwrap();

        assert_eq!(report.value, 6);
        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(client.exchange.requests.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_compute_contacts_all_servers_concurrently() {
        // Each exchange waits until all three are in flight, so a sequential
        // client would deadlock here and hit the timeout.
        let client = FactorialClient::new(RendezvousExchange {
            barrier: Barrier::new(3),
        });

        let report = tokio::time::timeout(
            Duration::from_secs(5),
            client.compute(9, 1_000, &roster(&[1, 2, 3])),
        )
        .await
        .expect("exchanges must run in parallel")
        .unwrap();

        // Each scripted reply is the slice length: 3 * 3 * 3.
        assert_eq!(report.value, 27);
    }

    #[tokio::test]
    async fn test_compute_treats_panicked_task_as_skipped_server() {
        let client = FactorialClient::new(PanickingExchange);

        let report = client.compute(6, 1_000, &roster(&[1, 2, 3])).await.unwrap();

        // [1,2] and [5,6] survive: 2 * 30
        assert_eq!(report.value, 60);
        let skipped: Vec<_> = report.skipped().collect();
        assert_eq!(skipped.len(), 1);
        assert!(matches!(
            skipped[0].result,
            Err(ExchangeError::TaskFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_compute_modulus_one_is_zero() {
        let client = FactorialClient::new(ScriptedExchange::default());
        let report = client.compute(5, 1, &roster(&[1, 2])).await.unwrap();
        assert_eq!(report.value, 0);
    }

    #[tokio::test]
    async fn test_compute_rejects_invalid_input() {
        let client = FactorialClient::new(ScriptedExchange::default());

        assert!(matches!(
            client.compute(0, 97, &roster(&[1])).await,
            Err(ClientError::Invalid(_))
        ));
        assert!(matches!(
            client.compute(5, 0, &roster(&[1])).await,
            Err(ClientError::Invalid(ValidationError::ZeroModulus))
        ));
        assert!(matches!(
            client.compute(5, 97, &[]).await,
            Err(ClientError::EmptyRoster)
        ));
    }

    #[test]
    fn test_exchange_error_messages_name_the_stage() {
        let err = ExchangeError::Timeout {
            stage: ExchangeStage::Receive,
            after: Duration::from_secs(5),
        };
        assert_eq!(err.to_string(), "receive timed out after 5s");
    }
}

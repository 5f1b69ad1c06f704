//! The round's shared readiness wait.
//!
//! Every connected session contributes one readiness future per round. The
//! program loop then waits once on all of them together, bounded by a
//! timeout and interruptible by the stop token.

use std::future::Future;
use std::io;
use std::time::Duration;

use futures_util::future::LocalBoxFuture;
use futures_util::stream::{FuturesUnordered, StreamExt};
use futures_util::FutureExt;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// A registered source: resolves once its connection has something to do.
pub type Readiness<'a> = LocalBoxFuture<'a, Result<(), WaitError>>;

/// The wait itself failed. Fatal to the process.
#[derive(Debug, Error)]
pub enum WaitError {
    #[error("readiness wait failed: {0}")]
    Io(#[from] io::Error),
}

/// How a wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// This many sources became ready.
    Ready(usize),
    TimedOut,
    /// The stop token was cancelled.
    Stopped,
}

/// Readiness sources collected for one round.
pub struct WaitSet<'a> {
    timeout: Duration,
    sources: Vec<Readiness<'a>>,
}

impl<'a> WaitSet<'a> {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            sources: Vec::new(),
        }
    }

    pub fn register<F>(&mut self, source: F)
    where
        F: Future<Output = Result<(), WaitError>> + 'a,
    {
        self.sources.push(source.boxed_local());
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Block until a source is ready, the timeout passes or `stop` fires.
    ///
    /// A stop that is already pending wins over ready sources. Once one
    /// source resolves, every other source that is ready without blocking
    /// is collected too. Unresolved sources are dropped.
    pub async fn wait(self, stop: &CancellationToken) -> Result<WaitOutcome, WaitError> {
        let mut pending: FuturesUnordered<_> = self.sources.into_iter().collect();
        let sleep = tokio::time::sleep(self.timeout);
        tokio::pin!(sleep);

        tokio::select! {
            biased;
            _ = stop.cancelled() => Ok(WaitOutcome::Stopped),
            Some(first) = pending.next() => {
                first?;
                let mut ready = 1;
                while let Some(Some(next)) = pending.next().now_or_never() {
                    next?;
                    ready += 1;
                }
                Ok(WaitOutcome::Ready(ready))
            }
            _ = &mut sleep => Ok(WaitOutcome::TimedOut),
        }
    }
}

//! The round loop over all sessions.
//!
//! Every round applies each phase to every session, in session order,
//! before the next phase starts:
//!
//! 1. create, connect, register
//! 2. one shared wait on everything registered
//! 3. stop (only when the wait saw the stop token)
//! 4. process, teardown, backoff
//!
//! The shared wait is the only suspension point. Session failures are
//! recorded in the [`RoundReport`] and never end the loop; a [`WaitError`]
//! does.

use std::rc::Rc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info};

use crate::client::{EventHandler, ProtocolClient, WaitError, WaitOutcome, WaitSet};
use crate::config::{Config, ServerEntry};
use crate::dispatch::Dispatcher;
use crate::session::{RoundReport, Session};
use crate::telemetry::spans;

/// All configured sessions and the client that connects them.
pub struct Bot<P: ProtocolClient> {
    client: P,
    sessions: Vec<Session<P::Connection>>,
    wait_timeout: Duration,
    rounds: u64,
}

impl<P: ProtocolClient> Bot<P> {
    /// One session per configured server, each with its own [`Dispatcher`].
    pub fn new(config: &Config, client: P) -> Self {
        Self::with_handlers(config, client, |server| Box::new(Dispatcher::new(server)))
    }

    /// Like [`Bot::new`] with a custom handler per server.
    pub fn with_handlers<F>(config: &Config, client: P, mut handler: F) -> Self
    where
        F: FnMut(Rc<ServerEntry>) -> Box<dyn EventHandler>,
    {
        let reconnect_delay = config.settings.reconnect_delay();
        let sessions = config
            .servers()
            .iter()
            .enumerate()
            .map(|(index, server)| {
                let server = Rc::new(server.clone());
                Session::new(index, Rc::clone(&server), handler(server), reconnect_delay)
            })
            .collect();

        Self {
            client,
            sessions,
            wait_timeout: config.settings.wait_timeout(),
            rounds: 0,
        }
    }

    pub fn sessions(&self) -> &[Session<P::Connection>] {
        &self.sessions
    }

    pub fn client(&self) -> &P {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut P {
        &mut self.client
    }

    /// Run one round.
    pub async fn round(&mut self, stop: &CancellationToken) -> Result<RoundReport, WaitError> {
        self.rounds += 1;
        let span = spans::round(self.rounds);
        self.round_inner(stop).instrument(span).await
    }

    async fn round_inner(&mut self, stop: &CancellationToken) -> Result<RoundReport, WaitError> {
        let create = self
            .sessions
            .iter_mut()
            .map(|s| s.create(&mut self.client))
            .collect();
        let connect = self.sessions.iter_mut().map(Session::connect).collect();

        let mut waitset = WaitSet::new(self.wait_timeout);
        let mut register = Vec::with_capacity(self.sessions.len());
        for session in self.sessions.iter_mut() {
            register.push(session.register(&mut waitset));
        }
        debug!(sources = waitset.len(), "Waiting");
        let wait = waitset.wait(stop).await?;

        let stopped = if wait == WaitOutcome::Stopped {
            info!("Stop requested");
            self.sessions.iter_mut().map(Session::stop).collect()
        } else {
            Vec::new()
        };

        let now = Instant::now();
        let process = self.sessions.iter_mut().map(|s| s.process(now)).collect();
        let teardown = self.sessions.iter_mut().map(|s| s.teardown(now)).collect();
        let now = Instant::now();
        let backoff = self.sessions.iter_mut().map(|s| s.backoff(now)).collect();

        Ok(RoundReport {
            create,
            connect,
            register,
            wait,
            stop: stopped,
            process,
            teardown,
            backoff,
        })
    }

    /// Run rounds until `stop` fires or the wait fails.
    pub async fn run(&mut self, stop: &CancellationToken) -> Result<(), WaitError> {
        info!(sessions = self.sessions.len(), "Starting");
        loop {
            let report = self.round(stop).await?;
            if report.stopped() {
                return Ok(());
            }
        }
    }
}

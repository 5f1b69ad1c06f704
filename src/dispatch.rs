//! Event dispatcher.
//!
//! One [`Dispatcher`] per session. It runs the configured commands and
//! joins when a server accepts the registration, feeds channel lines
//! through the channel's filters, and logs everything else.

use std::rc::Rc;

use tracing::{debug, error, info, warn};

use crate::client::{Commands, EventHandler, EventKind, IrcEvent};
use crate::config::{CommandAction, ServerEntry};
use crate::filter::{self, Bindings, LineHistory};

/// Numerics above this are protocol errors.
const ERROR_NUMERIC_FLOOR: u16 = 400;

/// A filter that matched a window of channel lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterMatch {
    pub server: String,
    pub channel: String,
    pub origin: String,
    pub filter: String,
    pub bindings: Bindings,
}

/// What happens when a filter matches.
pub trait MatchAction {
    fn on_match(&mut self, client: &mut dyn Commands, found: FilterMatch);
}

/// Logs every match with its bindings.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAction;

impl MatchAction for LogAction {
    fn on_match(&mut self, _client: &mut dyn Commands, found: FilterMatch) {
        info!(
            server = %found.server,
            channel = %found.channel,
            origin = %found.origin,
            filter = %found.filter,
            bindings = ?found.bindings,
            "Filter matched"
        );
    }
}

/// Callback target for one server's events.
pub struct Dispatcher {
    server: Rc<ServerEntry>,
    history: LineHistory,
    action: Box<dyn MatchAction>,
}

impl Dispatcher {
    pub fn new(server: Rc<ServerEntry>) -> Self {
        Self::with_action(server, Box::new(LogAction))
    }

    pub fn with_action(server: Rc<ServerEntry>, action: Box<dyn MatchAction>) -> Self {
        let mut history = LineHistory::new();
        for channel in &server.channels {
            history.set_depth(&channel.name, channel.history_depth());
        }
        Self {
            server,
            history,
            action,
        }
    }

    fn on_connect(&mut self, client: &mut dyn Commands) {
        info!(server = %self.server.name, "Connected");
        // Lines seen before a reconnect never combine with new ones.
        self.history.clear();

        for cmd in &self.server.cmds {
            match cmd.action() {
                Some(CommandAction::Msg { target, text }) => {
                    if let Err(e) = client.send_message(target, text) {
                        warn!(target = %target, error = %e, "Could not send message");
                    }
                }
                None => warn!(command = %cmd.name, "Unknown command"),
            }
        }

        for channel in &self.server.channels {
            if let Err(e) = client.join(&channel.name, channel.passwd.as_deref()) {
                warn!(channel = %channel.name, error = %e, "Could not join");
            }
        }
    }

    fn on_channel(&mut self, client: &mut dyn Commands, event: &IrcEvent) {
        let [channel_name, text] = event.params.as_slice() else {
            debug!("Ignoring malformed channel event: {event}");
            return;
        };
        let Some(origin) = event.origin.as_deref() else {
            warn!("Channel message without origin: {event}");
            return;
        };
        info!("{origin}:{channel_name}: {text}");

        let Some(channel) = self.server.find_channel(channel_name) else {
            return;
        };
        if !channel.accepts_origin(origin) {
            return;
        }

        self.history.push(origin, channel_name, text);
        for entry in &channel.filters {
            let window = self
                .history
                .window(origin, channel_name, entry.regexes.len());
            let Some(bindings) = filter::match_filter(&window, entry) else {
                continue;
            };
            self.action.on_match(
                client,
                FilterMatch {
                    server: self.server.name.clone(),
                    channel: channel.name.clone(),
                    origin: origin.to_owned(),
                    filter: entry.name.clone(),
                    bindings,
                },
            );
        }
    }
}

impl EventHandler for Dispatcher {
    fn handle(&mut self, client: &mut dyn Commands, event: IrcEvent) {
        match event.kind {
            EventKind::Connect => self.on_connect(client),
            EventKind::Channel => self.on_channel(client, &event),
            EventKind::Numeric(code) if code > ERROR_NUMERIC_FLOOR => {
                error!(
                    "ERROR {}: {}: {}",
                    code,
                    event.origin.as_deref().unwrap_or("NULL"),
                    event.params.join(" ")
                );
            }
            EventKind::Numeric(_) => debug!("{event}"),
            EventKind::Kick | EventKind::Notice | EventKind::Invite | EventKind::Unknown(_) => {
                info!("{event}")
            }
        }
    }
}

//! Scripted protocol client.
//!
//! Every call is counted per server name, and any phase can be made to fail
//! per server through [`Faults`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::rc::Rc;

use slircbot::client::{
    ClientError, Commands, Connection, EventHandler, IrcEvent, ProtocolClient, WaitError, WaitSet,
};
use slircbot::config::ServerEntry;

/// Which calls fail for one server.
#[derive(Debug, Default, Clone, Copy)]
pub struct Faults {
    pub create: bool,
    pub connect: bool,
    pub register: bool,
    pub process: bool,
    /// The readiness source resolves with an error.
    pub wait: bool,
    /// The readiness source never resolves.
    pub silent: bool,
}

/// Call counters for one server.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Calls {
    pub create: usize,
    pub connect: usize,
    pub register: usize,
    pub process: usize,
    /// Connections released.
    pub dropped: usize,
    /// `connect` on a handle that was already connected.
    pub reconnects_on_handle: usize,
}

#[derive(Debug, Default)]
pub struct MockState {
    faults: HashMap<String, Faults>,
    calls: HashMap<String, Calls>,
    /// Events handed to every connection's handler on each `process`.
    events: Vec<IrcEvent>,
}

impl MockState {
    pub fn faults(&mut self, server: &str) -> &mut Faults {
        self.faults.entry(server.to_owned()).or_default()
    }

    pub fn calls(&self, server: &str) -> Calls {
        self.calls.get(server).copied().unwrap_or_default()
    }

    pub fn push_event(&mut self, event: IrcEvent) {
        self.events.push(event);
    }

    fn fault(&self, server: &str) -> Faults {
        self.faults.get(server).copied().unwrap_or_default()
    }

    fn count(&mut self, server: &str) -> &mut Calls {
        self.calls.entry(server.to_owned()).or_default()
    }
}

pub type Shared = Rc<RefCell<MockState>>;

pub struct MockClient {
    state: Shared,
}

impl MockClient {
    pub fn new() -> (Self, Shared) {
        let state = Shared::default();
        (
            Self {
                state: Rc::clone(&state),
            },
            state,
        )
    }
}

impl ProtocolClient for MockClient {
    type Connection = MockConnection;

    fn create_session(&mut self, server: &ServerEntry) -> Result<MockConnection, ClientError> {
        let mut state = self.state.borrow_mut();
        state.count(&server.name).create += 1;
        if state.fault(&server.name).create {
            return Err(ClientError::Create(format!("no handle for {}", server.name)));
        }
        Ok(MockConnection {
            server: server.name.clone(),
            state: Rc::clone(&self.state),
            connected: false,
            sent: Vec::new(),
        })
    }
}

pub struct MockConnection {
    server: String,
    state: Shared,
    connected: bool,
    pub sent: Vec<String>,
}

impl Commands for MockConnection {
    fn send_message(&mut self, target: &str, text: &str) -> Result<(), ClientError> {
        self.sent.push(format!("PRIVMSG {target} :{text}"));
        Ok(())
    }

    fn join(&mut self, channel: &str, key: Option<&str>) -> Result<(), ClientError> {
        match key {
            Some(key) => self.sent.push(format!("JOIN {channel} {key}")),
            None => self.sent.push(format!("JOIN {channel}")),
        }
        Ok(())
    }
}

impl Connection for MockConnection {
    fn connect(&mut self, _server: &ServerEntry) -> Result<(), ClientError> {
        let mut state = self.state.borrow_mut();
        let calls = state.count(&self.server);
        calls.connect += 1;
        if self.connected {
            calls.reconnects_on_handle += 1;
        }
        self.connected = true;
        if state.fault(&self.server).connect {
            return Err(ClientError::Connect(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "refused",
            )));
        }
        Ok(())
    }

    fn register<'a>(&'a mut self, waitset: &mut WaitSet<'a>) -> Result<(), ClientError> {
        let mut state = self.state.borrow_mut();
        state.count(&self.server).register += 1;
        let faults = state.fault(&self.server);
        if faults.register {
            return Err(ClientError::NotConnected);
        }
        if faults.wait {
            waitset.register(async {
                Err(WaitError::Io(io::Error::other("wait-set broken")))
            });
        } else if faults.silent {
            waitset.register(std::future::pending());
        } else {
            waitset.register(async { Ok(()) });
        }
        Ok(())
    }

    fn process(&mut self, handler: &mut dyn EventHandler) -> Result<(), ClientError> {
        let events = {
            let mut state = self.state.borrow_mut();
            state.count(&self.server).process += 1;
            if state.fault(&self.server).process {
                return Err(ClientError::Closed);
            }
            state.events.clone()
        };
        for event in events {
            handler.handle(self, event);
        }
        Ok(())
    }
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        self.state.borrow_mut().count(&self.server).dropped += 1;
    }
}

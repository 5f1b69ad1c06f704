//! IRC over plain TCP.
//!
//! A [`TcpConnection`] never blocks outside the shared wait: connecting is a
//! stored future that the readiness source drives, and processing only
//! uses `try_read`/`try_write` on the socket.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::time::Duration;

use bytes::{Buf, BytesMut};
use slircbot_proto::{Command, IrcCodec, MAX_IRC_LINE_LEN, Message, Response};
use tokio::io::Interest;
use tokio::net::TcpStream;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, info, warn};

use super::{
    ClientError, Commands, Connection, EventHandler, ProtocolClient, WaitError, WaitSet,
    translate,
};
use crate::config::{ServerEntry, Settings};

const READ_CHUNK: usize = 4096;
/// Reads per `process` call before yielding back to the round.
const MAX_READS_PER_PROCESS: usize = 16;

type ConnectFuture = Pin<Box<dyn Future<Output = io::Result<TcpStream>>>>;

enum Link {
    Idle,
    Connecting(ConnectFuture),
    Open(TcpStream),
    Failed(io::Error),
    Closed,
}

/// Creates [`TcpConnection`]s.
#[derive(Debug, Clone)]
pub struct TcpClient {
    connect_timeout: Duration,
    strip_nicks: bool,
}

impl TcpClient {
    pub fn new(settings: &Settings) -> Self {
        Self {
            connect_timeout: settings.connect_timeout(),
            strip_nicks: settings.strip_nicks,
        }
    }
}

impl ProtocolClient for TcpClient {
    type Connection = TcpConnection;

    fn create_session(&mut self, _server: &ServerEntry) -> Result<TcpConnection, ClientError> {
        Ok(TcpConnection::new(self.connect_timeout, self.strip_nicks))
    }
}

/// One IRC connection.
pub struct TcpConnection {
    link: Link,
    codec: IrcCodec,
    read_buf: BytesMut,
    write_buf: BytesMut,
    /// Error seen by the readiness source, reported by the next `process`.
    pending_error: Option<io::Error>,
    connect_timeout: Duration,
    strip_nicks: bool,
    registered: bool,
}

impl TcpConnection {
    pub fn new(connect_timeout: Duration, strip_nicks: bool) -> Self {
        Self {
            link: Link::Idle,
            codec: IrcCodec::with_max_len(MAX_IRC_LINE_LEN),
            read_buf: BytesMut::with_capacity(READ_CHUNK),
            write_buf: BytesMut::new(),
            pending_error: None,
            connect_timeout,
            strip_nicks,
            registered: false,
        }
    }

    /// Whether the server accepted the registration.
    pub fn is_registered(&self) -> bool {
        self.registered
    }

    fn queue(&mut self, msg: Message) -> Result<(), ClientError> {
        self.codec.encode(msg, &mut self.write_buf)?;
        Ok(())
    }

    /// Resolves when the connect attempt finished or the socket is ready
    /// for the I/O this connection has pending.
    async fn ready(&mut self) {
        match &mut self.link {
            Link::Connecting(connect) => {
                let result = connect.await;
                self.link = match result {
                    Ok(stream) => {
                        debug!(peer = ?stream.peer_addr().ok(), "TCP connection established");
                        Link::Open(stream)
                    }
                    Err(e) => Link::Failed(e),
                };
            }
            Link::Open(stream) => {
                let interest = if self.write_buf.is_empty() {
                    Interest::READABLE
                } else {
                    Interest::READABLE | Interest::WRITABLE
                };
                if let Err(e) = stream.ready(interest).await {
                    self.pending_error = Some(e);
                }
            }
            Link::Failed(_) => {}
            Link::Idle | Link::Closed => std::future::pending::<()>().await,
        }
    }

    /// Pull whatever the socket has buffered. Returns `true` on EOF.
    fn fill(&mut self) -> Result<bool, ClientError> {
        let Link::Open(stream) = &self.link else {
            return Ok(false);
        };

        for _ in 0..MAX_READS_PER_PROCESS {
            self.read_buf.reserve(READ_CHUNK);
            match stream.try_read_buf(&mut self.read_buf) {
                Ok(0) => return Ok(true),
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(false)
    }

    /// Decode buffered lines and hand their events to `handler`.
    fn dispatch(&mut self, handler: &mut dyn EventHandler) -> Result<(), ClientError> {
        loop {
            let msg = match self.codec.decode(&mut self.read_buf) {
                Ok(Some(msg)) => msg,
                Ok(None) => return Ok(()),
                Err(e) if e.is_recoverable() => {
                    warn!(error = %e, "Skipping malformed line from server");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            match &msg.command {
                Command::PING(token, _) => {
                    let pong = Message::pong(token.clone());
                    self.queue(pong)?;
                }
                Command::Response(resp, _) if *resp == Response::RPL_WELCOME && !self.registered => {
                    info!("Registration accepted");
                    self.registered = true;
                }
                _ => {}
            }

            for event in translate(&msg, self.strip_nicks) {
                handler.handle(self, event);
            }
        }
    }

    fn flush(&mut self) -> Result<(), ClientError> {
        let Link::Open(stream) = &self.link else {
            return Ok(());
        };

        while !self.write_buf.is_empty() {
            match stream.try_write(&self.write_buf) {
                Ok(0) => return Err(ClientError::Closed),
                Ok(n) => self.write_buf.advance(n),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

impl Commands for TcpConnection {
    fn send_message(&mut self, target: &str, text: &str) -> Result<(), ClientError> {
        self.queue(Message::privmsg(target, text))
    }

    fn join(&mut self, channel: &str, key: Option<&str>) -> Result<(), ClientError> {
        let msg = match key {
            Some(key) => Message::join_with_key(channel, key),
            None => Message::join(channel),
        };
        self.queue(msg)
    }
}

impl Connection for TcpConnection {
    fn connect(&mut self, server: &ServerEntry) -> Result<(), ClientError> {
        if !matches!(self.link, Link::Idle) {
            return Err(ClientError::AlreadyConnecting);
        }

        if let Some(pass) = &server.passwd {
            self.queue(Command::PASS(pass.clone()).into())?;
        }
        self.queue(Command::NICK(server.nick.clone()).into())?;
        self.queue(
            Command::USER(
                server.username().to_owned(),
                "0".to_owned(),
                server.realname().to_owned(),
            )
            .into(),
        )?;

        let addr = (server.ip.clone(), server.port);
        let limit = self.connect_timeout;
        let connect = async move {
            match tokio::time::timeout(limit, TcpStream::connect(addr)).await {
                Ok(result) => result,
                Err(_) => Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "connect timed out",
                )),
            }
        };
        self.link = Link::Connecting(Box::pin(connect));
        Ok(())
    }

    fn register<'a>(&'a mut self, waitset: &mut WaitSet<'a>) -> Result<(), ClientError> {
        if matches!(self.link, Link::Idle | Link::Closed) {
            return Err(ClientError::NotConnected);
        }
        waitset.register(async move {
            self.ready().await;
            Ok::<(), WaitError>(())
        });
        Ok(())
    }

    fn process(&mut self, handler: &mut dyn EventHandler) -> Result<(), ClientError> {
        if matches!(self.link, Link::Failed(_))
            && let Link::Failed(e) = std::mem::replace(&mut self.link, Link::Closed)
        {
            return Err(ClientError::Connect(e));
        }
        match self.link {
            Link::Idle | Link::Closed | Link::Failed(_) => return Err(ClientError::NotConnected),
            Link::Connecting(_) => return Ok(()),
            Link::Open(_) => {}
        }

        if let Some(e) = self.pending_error.take() {
            self.link = Link::Closed;
            return Err(e.into());
        }

        let eof = self.fill()?;
        self.dispatch(handler)?;
        if eof {
            self.link = Link::Closed;
            return Err(ClientError::Closed);
        }
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::IrcEvent;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;

    #[derive(Default)]
    struct Recorder(Vec<IrcEvent>);

    impl EventHandler for Recorder {
        fn handle(&mut self, _client: &mut dyn Commands, event: IrcEvent) {
            self.0.push(event);
        }
    }

    fn server_entry(port: u16) -> ServerEntry {
        let json = format!(
            r#"{{"name":"local","ip":"127.0.0.1","port":{port},"nick":"bot","passwd":"pw"}}"#
        );
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_connect_queues_registration() {
        let mut conn = TcpConnection::new(Duration::from_secs(1), true);
        conn.connect(&server_entry(1)).unwrap();
        assert_eq!(
            &conn.write_buf[..],
            b"PASS pw\r\nNICK bot\r\nUSER nobody 0 * :noname\r\n"
        );
        assert!(matches!(
            conn.connect(&server_entry(1)),
            Err(ClientError::AlreadyConnecting)
        ));
    }

    #[test]
    fn test_unsafe_message_is_rejected() {
        let mut conn = TcpConnection::new(Duration::from_secs(1), true);
        assert!(conn.send_message("#c", "hi\r\nQUIT").is_err());
        assert!(conn.write_buf.is_empty());
    }

    #[test]
    fn test_idle_connection_cannot_register_or_process() {
        let mut conn = TcpConnection::new(Duration::from_secs(1), true);
        let mut ws = WaitSet::new(Duration::from_secs(1));
        assert!(matches!(
            conn.register(&mut ws),
            Err(ClientError::NotConnected)
        ));
        drop(ws);
        let mut recorder = Recorder::default();
        assert!(matches!(
            conn.process(&mut recorder),
            Err(ClientError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_register_pong_and_events() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let stop = tokio_util::sync::CancellationToken::new();

        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let (read, mut write) = socket.into_split();
            let mut lines = BufReader::new(read).lines();
            let mut seen = Vec::new();
            for _ in 0..3 {
                seen.push(lines.next_line().await.unwrap().unwrap());
            }
            write
                .write_all(b"PING :abc\r\n:irc.test 001 bot :Welcome\r\n")
                .await
                .unwrap();
            seen.push(lines.next_line().await.unwrap().unwrap());
            seen
        });

        let mut conn = TcpConnection::new(Duration::from_secs(5), true);
        conn.connect(&server_entry(port)).unwrap();
        let mut recorder = Recorder::default();

        for _ in 0..50 {
            let mut ws = WaitSet::new(Duration::from_millis(100));
            conn.register(&mut ws).unwrap();
            ws.wait(&stop).await.unwrap();
            conn.process(&mut recorder).unwrap();
            if conn.is_registered() && conn.write_buf.is_empty() {
                break;
            }
        }

        let seen = server.await.unwrap();
        assert_eq!(
            seen,
            vec!["PASS pw", "NICK bot", "USER nobody 0 * :noname", "PONG abc"]
        );
        assert!(conn.is_registered());
        let kinds: Vec<_> = recorder.0.iter().map(|e| e.kind.to_string()).collect();
        assert_eq!(kinds, vec!["CONNECT", "001"]);
    }

    #[tokio::test]
    async fn test_refused_connect_fails_process() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let stop = tokio_util::sync::CancellationToken::new();
        let mut conn = TcpConnection::new(Duration::from_secs(5), true);
        conn.connect(&server_entry(port)).unwrap();

        let mut ws = WaitSet::new(Duration::from_secs(5));
        conn.register(&mut ws).unwrap();
        ws.wait(&stop).await.unwrap();

        let mut recorder = Recorder::default();
        assert!(matches!(
            conn.process(&mut recorder),
            Err(ClientError::Connect(_))
        ));
    }

    #[tokio::test]
    async fn test_server_close_fails_process() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let (read, mut write) = socket.into_split();
            let mut lines = BufReader::new(read).lines();
            while let Some(line) = lines.next_line().await.unwrap() {
                if line.starts_with("USER ") {
                    break;
                }
            }
            write
                .write_all(b":irc.test NOTICE * :bye\r\n")
                .await
                .unwrap();
        });

        let stop = tokio_util::sync::CancellationToken::new();
        let mut conn = TcpConnection::new(Duration::from_secs(5), true);
        conn.connect(&server_entry(port)).unwrap();
        let mut recorder = Recorder::default();

        let mut result = Ok(());
        for _ in 0..50 {
            let mut ws = WaitSet::new(Duration::from_millis(100));
            conn.register(&mut ws).unwrap();
            ws.wait(&stop).await.unwrap();
            result = conn.process(&mut recorder);
            if result.is_err() {
                break;
            }
        }

        assert!(matches!(result, Err(ClientError::Closed)));
        assert_eq!(recorder.0.len(), 1);
        assert_eq!(recorder.0[0].kind.to_string(), "NOTICE");
    }
}

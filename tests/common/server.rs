//! Minimal IRC server for end-to-end tests.
//!
//! Accepts a single client on `127.0.0.1:0` and exposes line-level reads and
//! writes so a test can script the conversation.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;

pub struct TestServer {
    listener: TcpListener,
}

impl TestServer {
    pub async fn bind() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        Ok(Self { listener })
    }

    pub fn port(&self) -> u16 {
        self.listener.local_addr().map(|a| a.port()).unwrap_or(0)
    }

    pub async fn accept(&self) -> anyhow::Result<TestPeer> {
        let (stream, _) = self.listener.accept().await?;
        let (read, write) = stream.into_split();
        Ok(TestPeer {
            lines: BufReader::new(read).lines(),
            write,
            received: Vec::new(),
        })
    }
}

/// The server side of one accepted connection.
pub struct TestPeer {
    lines: Lines<BufReader<OwnedReadHalf>>,
    write: OwnedWriteHalf,
    /// Every line read so far, without line endings.
    pub received: Vec<String>,
}

impl TestPeer {
    pub async fn send(&mut self, line: &str) -> anyhow::Result<()> {
        self.write.write_all(line.as_bytes()).await?;
        self.write.write_all(b"\r\n").await?;
        Ok(())
    }

    /// Read lines until one satisfies `pred`, and return it.
    pub async fn read_until<F>(&mut self, mut pred: F) -> anyhow::Result<String>
    where
        F: FnMut(&str) -> bool,
    {
        loop {
            let line = tokio::time::timeout(Duration::from_secs(5), self.lines.next_line())
                .await??
                .ok_or_else(|| anyhow::anyhow!("client closed the connection"))?;
            let line = line.trim_end_matches('\r').to_owned();
            self.received.push(line.clone());
            if pred(&line) {
                return Ok(line);
            }
        }
    }

    /// Accept the registration the client sends.
    pub async fn welcome(&mut self, nick: &str) -> anyhow::Result<()> {
        self.read_until(|l| l.starts_with("USER ")).await?;
        self.send(&format!(":irc.test 001 {nick} :Welcome to the test network"))
            .await
    }
}

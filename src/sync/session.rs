//! One TCP connection to a peer.
//!
//! ## Threads
//!
//! A receiver thread owns the read half. It reassembles lines, parses them
//! and pushes the messages onto an [`InboundQueue`]. It never touches battle
//! state. The owning task sends on the write half and consumes the queue.
//!
//! `shutdown` (also run on drop) raises the quit flag, wakes any waiter,
//! shuts the socket down so the blocked read returns, and joins the
//! receiver before the socket is released.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;

use super::message::{ProtocolError, SyncMessage};
use super::queue::{InboundQueue, QueueState};
use crate::core::SyncConfig;

/// Longest line the receiver accepts, newline included. Longer lines are
/// dropped up to their next newline.
pub const MAX_LINE_BYTES: usize = 100 * 1024;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("connection to peer lost")]
    ConnectionLost,
    #[error("peer did not send {0} in time")]
    HandshakeTimeout(&'static str),
    #[error("socket error: {0}")]
    Io(#[from] io::Error),
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// A bound port waiting for its single peer.
#[derive(Debug)]
pub struct PeerListener {
    listener: TcpListener,
    config: SyncConfig,
}

impl PeerListener {
    pub fn bind(addr: impl ToSocketAddrs, config: SyncConfig) -> Result<Self, SyncError> {
        let listener = TcpListener::bind(addr)?;
        log::info!("waiting for a peer on {}", listener.local_addr()?);
        Ok(Self { listener, config })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, SyncError> {
        Ok(self.listener.local_addr()?)
    }

    /// Block until a peer connects.
    pub fn accept(self) -> Result<PeerSession, SyncError> {
        let (stream, peer) = self.listener.accept()?;
        log::info!("peer connected from {peer}");
        PeerSession::from_stream(stream, true, self.config)
    }
}

/// A live connection to the other player.
#[derive(Debug)]
pub struct PeerSession {
    stream: TcpStream,
    queue: Arc<InboundQueue>,
    quit: Arc<AtomicBool>,
    receiver: Option<JoinHandle<()>>,
    is_host: bool,
    config: SyncConfig,
}

impl PeerSession {
    /// Listen on every interface at `port` and accept one peer.
    pub fn connect_as_host(port: u16, config: SyncConfig) -> Result<Self, SyncError> {
        PeerListener::bind(("0.0.0.0", port), config)?.accept()
    }

    pub fn connect_as_client(host: &str, port: u16, config: SyncConfig) -> Result<Self, SyncError> {
        let stream = TcpStream::connect((host, port))?;
        log::info!("connected to {host}:{port}");
        Self::from_stream(stream, false, config)
    }

    /// Wrap a connected stream and start its receiver.
    pub fn from_stream(stream: TcpStream, is_host: bool, config: SyncConfig) -> Result<Self, SyncError> {
        stream.set_nodelay(true)?;
        let reader = stream.try_clone()?;
        let queue = Arc::new(InboundQueue::new());
        let quit = Arc::new(AtomicBool::new(false));

        let receiver = {
            let queue = Arc::clone(&queue);
            let quit = Arc::clone(&quit);
            thread::Builder::new()
                .name("peer-receiver".into())
                .spawn(move || receive(reader, &queue, &quit))?
        };

        Ok(Self {
            stream,
            queue,
            quit,
            receiver: Some(receiver),
            is_host,
            config,
        })
    }

    /// The host moves first.
    #[must_use]
    pub fn is_host(&self) -> bool {
        self.is_host
    }

    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    #[must_use]
    pub fn inbound(&self) -> &Arc<InboundQueue> {
        &self.queue
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.queue.state() == QueueState::Open
    }

    pub fn send(&mut self, message: &SyncMessage) -> Result<(), SyncError> {
        if !self.is_connected() {
            return Err(SyncError::ConnectionLost);
        }
        log::trace!("send {message}");
        let line = message.encode();
        if let Err(err) = self.stream.write_all(line.as_bytes()).and_then(|()| self.stream.flush()) {
            log::warn!("send failed: {err}");
            self.queue.finish(QueueState::Disconnected);
            return Err(SyncError::ConnectionLost);
        }
        Ok(())
    }

    /// Everything received so far.
    pub fn drain(&self) -> Vec<SyncMessage> {
        self.queue.drain()
    }

    /// Wait up to `timeout` for the next message.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<SyncMessage> {
        self.queue.pop_timeout(timeout)
    }

    /// Wait one poll interval for the next message.
    pub fn poll(&self) -> Option<SyncMessage> {
        self.recv_timeout(self.config.poll_interval)
    }

    /// Stop the receiver and close the socket. Safe to call twice.
    pub fn shutdown(&mut self) {
        let Some(receiver) = self.receiver.take() else {
            return;
        };
        self.quit.store(true, Ordering::SeqCst);
        self.queue.finish(QueueState::Closed);
        if let Err(err) = self.stream.shutdown(Shutdown::Both) {
            log::debug!("socket shutdown: {err}");
        }
        if receiver.join().is_err() {
            log::warn!("peer receiver panicked");
        }
        log::info!("peer session closed");
    }
}

impl Drop for PeerSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn receive(stream: TcpStream, queue: &InboundQueue, quit: &AtomicBool) {
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    let mut skipping = false;

    loop {
        buf.clear();
        match reader.by_ref().take(MAX_LINE_BYTES as u64).read_until(b'\n', &mut buf) {
            Ok(0) => {
                if !quit.load(Ordering::SeqCst) {
                    log::info!("peer closed the connection");
                }
                queue.finish(QueueState::Disconnected);
                return;
            }
            Ok(_) => {
                let complete = buf.last() == Some(&b'\n');
                if skipping {
                    skipping = !complete;
                } else if !complete && buf.len() >= MAX_LINE_BYTES {
                    log::warn!("dropping a line longer than {MAX_LINE_BYTES} bytes");
                    skipping = true;
                } else {
                    let line = String::from_utf8_lossy(&buf);
                    match SyncMessage::parse(&line) {
                        Ok(message) => {
                            log::trace!("recv {message}");
                            queue.push(message);
                        }
                        Err(ProtocolError::Empty) => {}
                        Err(err) => log::warn!("ignoring line {:?}: {err}", line.trim_end()),
                    }
                }
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                if !quit.load(Ordering::SeqCst) {
                    log::warn!("read failed: {err}");
                }
                queue.finish(QueueState::Disconnected);
                return;
            }
        }
        if quit.load(Ordering::SeqCst) {
            return;
        }
    }
}

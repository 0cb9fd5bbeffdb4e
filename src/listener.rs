//! UDP listener for TIC datagrams.
//!
//! This module binds a UDP socket, decodes every datagram with [`TicCodec`]
//! and forwards the results as [`TicEvent`]s over a channel. Zero-length
//! datagrams are reported like any other datagram without data.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use bytes::BytesMut;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio_util::codec::Decoder;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::codec::TicCodec;
use crate::error::{Result, TicError};
use crate::parser::DecodeOptions;
use crate::types::TicFrame;

/// Default UDP port used by ESP-based TIC bridges.
pub const DEFAULT_PORT: u16 = 8095;

/// Default capacity of the event channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// Largest UDP payload.
const MAX_DATAGRAM_SIZE: usize = 65_535;

/// Parse a user-supplied UDP port.
///
/// Accepts an integer in `1..=65535`, surrounding whitespace allowed.
pub fn parse_port(value: &str) -> Result<u16> {
    let port: i64 = value
        .trim()
        .parse()
        .map_err(|_| TicError::invalid_config(format!("port is not an integer: {value:?}")))?;

    u16::try_from(port)
        .ok()
        .filter(|p| *p != 0)
        .ok_or_else(|| TicError::invalid_config(format!("port out of range: {port}")))
}

/// Listener configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerConfig {
    /// Local address to bind (all interfaces by default)
    pub bind_ip: IpAddr,
    /// UDP port
    pub port: u16,
    /// Event channel capacity
    pub channel_capacity: usize,
    /// Frame decoder options
    pub decode: DecodeOptions,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            decode: DecodeOptions::default(),
        }
    }
}

impl ListenerConfig {
    /// Create a configuration listening on all interfaces, port 8095.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bind address.
    pub fn bind_ip(mut self, ip: impl Into<IpAddr>) -> Self {
        self.bind_ip = ip.into();
        self
    }

    /// Set UDP port. Port 0 asks the OS for an ephemeral port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set event channel capacity.
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Set decoder options.
    pub fn decode_options(mut self, options: DecodeOptions) -> Self {
        self.decode = options;
        self
    }

    /// Socket address to bind.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.channel_capacity == 0 {
            return Err(TicError::invalid_config("channel capacity must be non-zero"));
        }
        Ok(())
    }
}

/// Listener state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    /// No socket yet
    Unbound,
    /// Socket bound, receive loop not started
    Bound,
    /// Receive loop running
    Running,
    /// Receive loop finished
    Stopped,
}

/// Events emitted by the listener.
#[derive(Debug, Clone)]
pub enum TicEvent {
    /// Socket bound
    Listening {
        /// Bound local address
        local_addr: SocketAddr,
    },
    /// Frame with at least one measurement
    Frame {
        /// Datagram sender
        source: SocketAddr,
        /// Decoded frame
        frame: TicFrame,
    },
    /// Datagram without any valid measurement ("no data this cycle")
    Empty {
        /// Datagram sender
        source: SocketAddr,
    },
    /// Receive error
    Error(String),
    /// Receive loop finished
    Stopped,
}

/// TIC UDP listener.
///
/// Subscribe before calling [`run`](Self::run): events are sent on a bounded
/// channel and the loop waits for room when it is full. Cancelling the
/// shutdown token ends the loop even while it waits.
pub struct TicListener {
    config: ListenerConfig,
    state: ListenerState,
    event_tx: mpsc::Sender<TicEvent>,
    event_rx: Option<mpsc::Receiver<TicEvent>>,
    socket: Option<UdpSocket>,
    local_addr: Option<SocketAddr>,
    shutdown: CancellationToken,
    datagrams: u64,
}

impl TicListener {
    /// Create a new listener.
    ///
    /// A zero channel capacity is raised to one here and rejected by
    /// [`bind`](Self::bind).
    pub fn new(config: ListenerConfig) -> Self {
        let (event_tx, event_rx) = mpsc::channel(config.channel_capacity.max(1));
        Self {
            config,
            state: ListenerState::Unbound,
            event_tx,
            event_rx: Some(event_rx),
            socket: None,
            local_addr: None,
            shutdown: CancellationToken::new(),
            datagrams: 0,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }

    /// Get the current state.
    pub fn state(&self) -> ListenerState {
        self.state
    }

    /// Bound local address, once bound.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Number of decoded datagrams.
    pub fn datagrams(&self) -> u64 {
        self.datagrams
    }

    /// Subscribe to events.
    ///
    /// This can only be called once. Returns None if already subscribed.
    pub fn subscribe(&mut self) -> Option<mpsc::Receiver<TicEvent>> {
        self.event_rx.take()
    }

    /// Token that stops the receive loop when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Stop the receive loop.
    pub fn stop(&self) {
        self.shutdown.cancel();
    }

    /// Bind the UDP socket.
    pub async fn bind(&mut self) -> Result<SocketAddr> {
        if self.state != ListenerState::Unbound {
            return Err(TicError::AlreadyBound);
        }
        self.config.validate()?;

        let addr = self.config.socket_addr();
        let socket = UdpSocket::bind(addr).await.map_err(|err| {
            warn!(%addr, error = %err, "Failed to bind UDP socket");
            TicError::Io(err)
        })?;
        let local_addr = socket.local_addr()?;

        self.socket = Some(socket);
        self.local_addr = Some(local_addr);
        self.state = ListenerState::Bound;

        info!(%local_addr, "UDP listener started");
        self.emit_event(TicEvent::Listening { local_addr });
        Ok(local_addr)
    }

    /// Run the receive loop until stopped.
    ///
    /// Returns [`TicError::ChannelClosed`] if the subscriber goes away.
    pub async fn run(&mut self) -> Result<()> {
        let socket = self.socket.take().ok_or(TicError::NotBound)?;
        let mut codec = TicCodec::with_options(self.config.decode.clone());
        let mut buf = BytesMut::with_capacity(MAX_DATAGRAM_SIZE);
        let shutdown = self.shutdown.clone();
        self.state = ListenerState::Running;

        let result = loop {
            buf.resize(MAX_DATAGRAM_SIZE, 0);

            let event = tokio::select! {
                _ = shutdown.cancelled() => break Ok(()),
                received = socket.recv_from(&mut buf[..]) => match received {
                    Ok((len, source)) => {
                        buf.truncate(len);
                        match codec.decode(&mut buf) {
                            // An empty payload yields no frame
                            Ok(frame) => self.frame_event(frame.unwrap_or_default(), source),
                            Err(err) => break Err(err),
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, "UDP receive error");
                        TicEvent::Error(err.to_string())
                    }
                },
            };

            match self.forward(event, &shutdown).await {
                Ok(true) => {}
                Ok(false) => break Ok(()),
                Err(err) => break Err(err),
            }
        };

        self.state = ListenerState::Stopped;
        info!(datagrams = self.datagrams, "UDP listener stopped");
        self.emit_event(TicEvent::Stopped);
        result
    }

    // Internal methods

    fn emit_event(&self, event: TicEvent) {
        if let Err(err) = self.event_tx.try_send(event) {
            debug!(error = %err, "Dropping listener event");
        }
    }

    /// Send an event, waiting for room unless shutdown is requested.
    ///
    /// Returns `false` when shutdown won.
    async fn forward(&self, event: TicEvent, shutdown: &CancellationToken) -> Result<bool> {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => Ok(false),
            sent = self.event_tx.send(event) => sent
                .map(|()| true)
                .map_err(|_| TicError::ChannelClosed),
        }
    }

    fn frame_event(&mut self, frame: TicFrame, source: SocketAddr) -> TicEvent {
        self.datagrams += 1;

        if frame.is_empty() {
            warn!(%source, "Received UDP packet without any valid TIC data");
            TicEvent::Empty { source }
        } else {
            debug!(%source, measurements = frame.len(), "Decoded TIC frame");
            TicEvent::Frame { source, frame }
        }
    }
}

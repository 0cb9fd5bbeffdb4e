//! TIC datagram codec for tokio.
//!
//! This module provides a decoder that turns each UDP payload into a
//! [`TicFrame`] using the tokio-util codec framework.

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::error::TicError;
use crate::parser::{decode_frame, DecodeOptions};
use crate::types::TicFrame;

/// TIC historic-mode datagram codec.
///
/// Every call to `decode` consumes the whole buffer: one datagram is one
/// frame. Frame-wide failures produce an empty [`TicFrame`] instead of an
/// error, so a single bad datagram never terminates the stream. An empty
/// buffer yields `None`; callers that read datagrams themselves treat that
/// as an empty frame.
///
/// # Example
///
/// ```rust,ignore
/// use bytes::BytesMut;
/// use tokio::net::UdpSocket;
/// use tokio_util::codec::Decoder;
/// use linky_tic::codec::TicCodec;
///
/// let socket = UdpSocket::bind("0.0.0.0:8095").await?;
/// let mut codec = TicCodec::new();
/// let mut buf = BytesMut::zeroed(65_535);
///
/// let (len, source) = socket.recv_from(&mut buf[..]).await?;
/// buf.truncate(len);
/// let frame = codec.decode(&mut buf)?.unwrap_or_default();
/// println!("{source}: {frame}");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TicCodec {
    options: DecodeOptions,
}

impl TicCodec {
    /// Create a codec with default decode options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a codec with the given decode options.
    pub fn with_options(options: DecodeOptions) -> Self {
        Self { options }
    }

    /// Get the decode options.
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }
}

impl Decoder for TicCodec {
    type Item = TicFrame;
    type Error = TicError;

    fn decode(
        &mut self,
        src: &mut BytesMut,
    ) -> std::result::Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        let datagram = src.split();
        Ok(Some(decode_frame(&datagram, &self.options)))
    }
}

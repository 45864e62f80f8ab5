//! Fire-and-forget transports for peer messages.

use std::io::Write;

use tokio::sync::mpsc;

use super::message::PeerMessage;
use crate::error::SyncError;

/// Outgoing half of an established peer session.
///
/// Delivery is at most once; implementations never retry.
pub trait PeerChannel: Send {
    fn send(&mut self, message: &PeerMessage) -> Result<(), SyncError>;
}

/// One end of an in-process link between two clocks.
#[derive(Debug)]
pub struct LoopbackEnd {
    outgoing: mpsc::UnboundedSender<PeerMessage>,
    incoming: mpsc::UnboundedReceiver<PeerMessage>,
}

/// Two connected ends; what one sends, the other receives.
pub fn loopback_pair() -> (LoopbackEnd, LoopbackEnd) {
    let (a_tx, b_rx) = mpsc::unbounded_channel();
    let (b_tx, a_rx) = mpsc::unbounded_channel();
    (
        LoopbackEnd {
            outgoing: a_tx,
            incoming: a_rx,
        },
        LoopbackEnd {
            outgoing: b_tx,
            incoming: b_rx,
        },
    )
}

impl LoopbackEnd {
    /// Wait for the next message. `None` once the other end is dropped.
    pub async fn recv(&mut self) -> Option<PeerMessage> {
        self.incoming.recv().await
    }

    pub fn try_recv(&mut self) -> Option<PeerMessage> {
        self.incoming.try_recv().ok()
    }
}

impl PeerChannel for LoopbackEnd {
    fn send(&mut self, message: &PeerMessage) -> Result<(), SyncError> {
        self.outgoing
            .send(message.clone())
            .map_err(|_| SyncError::ChannelClosed)
    }
}

/// Writes each message as one JSON line, e.g. to stdout for piping into
/// the other device's `receive`.
#[derive(Debug)]
pub struct WriterChannel<W> {
    writer: W,
}

impl<W: Write + Send> WriterChannel<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> PeerChannel for WriterChannel<W> {
    fn send(&mut self, message: &PeerMessage) -> Result<(), SyncError> {
        serde_json::to_writer(&mut self.writer, message)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(data: &str) -> PeerMessage {
        PeerMessage { data: data.into() }
    }

    #[test]
    fn loopback_delivers_to_other_end() {
        let (mut phone, mut watch) = loopback_pair();
        phone.send(&msg("a")).unwrap();
        watch.send(&msg("b")).unwrap();
        assert_eq!(watch.try_recv(), Some(msg("a")));
        assert_eq!(phone.try_recv(), Some(msg("b")));
        assert_eq!(phone.try_recv(), None);
    }

    #[test]
    fn loopback_send_fails_when_peer_gone() {
        let (mut phone, watch) = loopback_pair();
        drop(watch);
        assert!(matches!(phone.send(&msg("a")), Err(SyncError::ChannelClosed)));
    }

    #[test]
    fn writer_channel_emits_json_lines() {
        let mut channel = WriterChannel::new(Vec::new());
        channel.send(&msg("1x40$x0s=0.00$ (init)")).unwrap();
        channel.send(&msg("x")).unwrap();
        let out = String::from_utf8(channel.into_inner()).unwrap();
        assert_eq!(
            out,
            "{\"data\":\"1x40$x0s=0.00$ (init)\"}\n{\"data\":\"x\"}\n"
        );
    }
}

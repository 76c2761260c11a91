use super::{async_trait, decode_message, encode_message, Message, Transport};
use crate::{Error, Result};
use tokio::sync::{mpsc, Mutex};

/// One end of an in-process duplex channel.
///
/// Messages go through the same JSON encoding as a network transport, so
/// a run over a memory pair exercises the full codec.
pub struct MemoryTransport {
    outgoing: mpsc::UnboundedSender<Vec<u8>>,
    incoming: Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
}

impl MemoryTransport {
    /// Create two connected endpoints
    pub fn pair() -> (Self, Self) {
        let (to_second, from_first) = mpsc::unbounded_channel();
        let (to_first, from_second) = mpsc::unbounded_channel();

        let first = Self {
            outgoing: to_second,
            incoming: Mutex::new(from_second),
        };
        let second = Self {
            outgoing: to_first,
            incoming: Mutex::new(from_first),
        };
        (first, second)
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, message: &Message) -> Result<()> {
        let bytes = encode_message(message)?;
        self.outgoing
            .send(bytes)
            .map_err(|_| Error::Transport("peer endpoint dropped".into()))
    }

    async fn receive(&self) -> Result<Message> {
        let bytes = self
            .incoming
            .lock()
            .await
            .recv()
            .await
            .ok_or_else(|| Error::Transport("peer endpoint closed".into()))?;
        decode_message(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Control;

    #[tokio::test]
    async fn test_pair_is_duplex_and_ordered() {
        let (alice, bob) = MemoryTransport::pair();

        alice.send(&Message::SeedCommit([1; 32])).await.unwrap();
        alice.send(&Message::Control(Control::Ok)).await.unwrap();
        bob.send(&Message::TReveal(vec![5, 6])).await.unwrap();

        assert_eq!(bob.receive().await.unwrap(), Message::SeedCommit([1; 32]));
        assert_eq!(bob.receive().await.unwrap(), Message::Control(Control::Ok));
        assert_eq!(alice.receive().await.unwrap(), Message::TReveal(vec![5, 6]));
    }

    #[tokio::test]
    async fn test_dropped_peer_is_a_transport_error() {
        let (alice, bob) = MemoryTransport::pair();
        drop(bob);

        assert!(matches!(
            alice.send(&Message::Control(Control::Ok)).await,
            Err(Error::Transport(_))
        ));
        assert!(matches!(alice.receive().await, Err(Error::Transport(_))));
    }
}

/// Relay: forwards a message from a paired participant to their partner.
use log::{debug, warn};

use super::error::DeliveryError;
use super::notice::Outbound;
use super::registry::SessionRegistry;
use super::transport::Transport;
use super::types::{ParticipantId, Payload};

/// What happened to a forwarded message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Sender has no partner; the message was dropped without any notice.
    Dropped,
    Delivered { to: ParticipantId },
    /// Partner could not be reached. The pairing is kept.
    Failed(DeliveryError),
}

/// Forward `payload` verbatim from `sender` to their partner.
pub fn forward<T: Transport>(
    registry: &SessionRegistry,
    transport: &T,
    sender: &ParticipantId,
    payload: Payload,
) -> RelayOutcome {
    let Some(partner) = registry.partner_of(sender) else {
        debug!("[Relay] Dropped {} bytes from idle participant {}", payload.size(), sender);
        return RelayOutcome::Dropped;
    };

    match transport.deliver(partner, Outbound::Relayed(payload)) {
        Ok(()) => RelayOutcome::Delivered { to: partner.clone() },
        Err(e) => {
            warn!("[Relay] Message from {} lost: {}", sender, e);
            RelayOutcome::Failed(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::transport::testing::RecordingTransport;

    fn id(s: &str) -> ParticipantId {
        ParticipantId::from(s)
    }

    #[test]
    fn test_idle_sender_is_dropped_silently() {
        let registry = SessionRegistry::new();
        let transport = RecordingTransport::new();

        let outcome = forward(&registry, &transport, &id("x"), Payload::Text("hi".into()));
        assert_eq!(outcome, RelayOutcome::Dropped);
        assert!(transport.take().is_empty());
    }

    #[test]
    fn test_waiting_sender_is_dropped_silently() {
        let mut registry = SessionRegistry::new();
        registry.enqueue(&id("x"));
        let transport = RecordingTransport::new();

        let outcome = forward(&registry, &transport, &id("x"), Payload::Text("hi".into()));
        assert_eq!(outcome, RelayOutcome::Dropped);
        assert!(transport.take().is_empty());
    }

    #[test]
    fn test_forwards_payload_verbatim() {
        let mut registry = SessionRegistry::new();
        registry.pair(&id("x"), &id("y")).unwrap();
        let transport = RecordingTransport::new();
        let payload = Payload::Binary(vec![0, 159, 146, 150]);

        let outcome = forward(&registry, &transport, &id("x"), payload.clone());
        assert_eq!(outcome, RelayOutcome::Delivered { to: id("y") });
        assert_eq!(transport.take_relayed(), vec![(id("y"), payload)]);
    }

    #[test]
    fn test_delivery_failure_keeps_pairing() {
        let mut registry = SessionRegistry::new();
        registry.pair(&id("x"), &id("y")).unwrap();
        let transport = RecordingTransport::new();
        transport.set_offline(&id("y"));

        let outcome = forward(&registry, &transport, &id("x"), Payload::Text("hi".into()));
        assert_eq!(outcome, RelayOutcome::Failed(DeliveryError::Unreachable(id("y"))));
        assert_eq!(registry.partner_of(&id("x")), Some(&id("y")));
    }
}

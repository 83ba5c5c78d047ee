use super::error::DeliveryError;
use super::notice::Outbound;
use super::types::ParticipantId;

/// Capability to push a message to a participant.
///
/// Delivery must not block: implementations hand the message off (to a session
/// mailbox, a send queue, ...) and return immediately.
pub trait Transport {
    fn deliver(&self, to: &ParticipantId, message: Outbound) -> Result<(), DeliveryError>;
}

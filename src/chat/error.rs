use thiserror::Error;

use super::types::ParticipantId;

/// Precondition failures detected by the session registry.
///
/// These abort the single request that triggered them; registry state is left
/// exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("invariant violation: {participant} is already paired")]
    AlreadyPaired { participant: ParticipantId },

    #[error("invariant violation: {participant} is still in the wait queue")]
    StillWaiting { participant: ParticipantId },

    #[error("invariant violation: {participant} cannot be paired with themselves")]
    SelfPairing { participant: ParticipantId },
}

/// Failure to hand an outbound message to a participant.
///
/// Informational only: the registry is never rolled back because of it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("participant {0} has no connected session")]
    NotConnected(ParticipantId),

    #[error("session of participant {0} is closed")]
    Unreachable(ParticipantId),

    #[error("mailbox of participant {0} is full")]
    MailboxFull(ParticipantId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = RegistryError::AlreadyPaired { participant: "a".into() };
        assert_eq!(err.to_string(), "invariant violation: a is already paired");

        let err = DeliveryError::Unreachable("b".into());
        assert_eq!(err.to_string(), "session of participant b is closed");
    }

    #[test]
    fn test_errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RegistryError>();
        assert_send_sync::<DeliveryError>();
    }
}

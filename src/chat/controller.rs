/// Session controller actor.
///
/// Owns the session registry and the transport. Every inbound command is handled
/// inside the actor, so the mailbox is the single serialization point for all
/// registry reads and writes. Each handler finishes its registry mutation before
/// any message is handed to the transport.
use actix::prelude::*;
use log::{debug, error, warn};

use super::command::Command;
use super::error::{DeliveryError, RegistryError};
use super::matchmaker;
use super::notice::{Notice, Notification, Outbound};
use super::registry::SessionRegistry;
use super::relay::{self, RelayOutcome};
use super::transport::Transport;
use super::types::ParticipantId;

/// Result of dispatching one inbound command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    /// Notices were handed to the transport; `failed` lists the ones that did not go out.
    Notified { sent: usize, failed: Vec<DeliveryError> },
    Relayed(RelayOutcome),
    /// The request was aborted by a registry precondition; no state changed.
    Rejected(RegistryError),
}

/// Message: a participant sent a command or a plain message.
#[derive(Message, Debug)]
#[rtype(result = "Dispatched")]
pub struct Inbound {
    pub participant: ParticipantId,
    pub command: Command,
}

pub struct SessionController<T: Transport> {
    registry: SessionRegistry,
    transport: T,
}

impl<T: Transport> SessionController<T> {
    pub fn new(transport: T) -> Self {
        Self {
            registry: SessionRegistry::new(),
            transport,
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Route one command to the matchmaker or the relay.
    pub fn dispatch(&mut self, participant: &ParticipantId, command: Command) -> Dispatched {
        match command {
            Command::Start { name } => {
                self.notify(vec![Notification::new(participant, Notice::Welcome { name })])
            }
            Command::Search => match matchmaker::request_search(&mut self.registry, participant) {
                Ok(notifications) => self.notify(notifications),
                Err(e) => {
                    error!("[Controller] Search by {} aborted: {}", participant, e);
                    Dispatched::Rejected(e)
                }
            },
            Command::Stop => {
                let notifications = matchmaker::request_stop(&mut self.registry, participant);
                self.notify(notifications)
            }
            Command::Message(payload) => Dispatched::Relayed(relay::forward(
                &self.registry,
                &self.transport,
                participant,
                payload,
            )),
        }
    }

    /// The participant is gone without saying stop: cancel their search or end
    /// their chat. Only the partner is told; the leaver is unreachable anyway.
    pub fn disconnect(&mut self, participant: &ParticipantId) -> Dispatched {
        let notifications = matchmaker::request_stop(&mut self.registry, participant)
            .into_iter()
            .filter(|n| &n.to != participant)
            .collect();
        self.notify(notifications)
    }

    /// Hand notices to the transport. Failures are logged and collected, never retried.
    fn notify(&self, notifications: Vec<Notification>) -> Dispatched {
        let mut sent = 0;
        let mut failed = Vec::new();
        for Notification { to, notice } in notifications {
            let kind = notice.kind();
            match self.transport.deliver(&to, Outbound::Notice(notice)) {
                Ok(()) => {
                    debug!("[Controller] Sent {} notice to {}", kind, to);
                    sent += 1;
                }
                Err(e) => {
                    warn!("[Controller] Could not send {} notice: {}", kind, e);
                    failed.push(e);
                }
            }
        }
        Dispatched::Notified { sent, failed }
    }
}

impl<T: Transport + Unpin + 'static> Actor for SessionController<T> {
    type Context = Context<Self>;
}

impl<T: Transport + Unpin + 'static> Handler<Inbound> for SessionController<T> {
    type Result = MessageResult<Inbound>;

    fn handle(&mut self, msg: Inbound, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.dispatch(&msg.participant, msg.command))
    }
}

/// Session directory: which WebSocket session currently speaks for which participant.
///
/// Owned by the session controller as its transport, so attaching, detaching and
/// delivering are serialized with every registry change.
///
/// Participant ids are issued here, together with a secret resume token. A client
/// can only take over an id (and its active chat) by presenting that token.
use actix::dev::ToEnvelope;
use actix::prelude::*;
use std::collections::HashMap;
use log::{debug, info, warn};
use thiserror::Error;
use uuid::Uuid;

use super::messages::SessionKicked;
use super::session::ChatSession;
use crate::chat::controller::SessionController;
use crate::chat::error::DeliveryError;
use crate::chat::notice::Outbound;
use crate::chat::transport::Transport;
use crate::chat::types::ParticipantId;

/// Controller type used by the WebSocket host.
pub type ChatController = SessionController<SessionDirectory<ChatSession>>;

/// Server-issued identity of a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub participant: ParticipantId,
    pub token: String,
}

impl Credentials {
    fn generate() -> Self {
        Self {
            participant: ParticipantId::generate(),
            token: Uuid::new_v4().simple().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimError {
    #[error("unknown participant or wrong resume token")]
    Rejected,
}

struct SessionEntry<A: Actor> {
    addr: Addr<A>,
    token: String,
}

pub struct SessionDirectory<A: Actor = ChatSession> {
    sessions: HashMap<ParticipantId, SessionEntry<A>>,
}

impl<A: Actor> Default for SessionDirectory<A> {
    fn default() -> Self {
        Self { sessions: HashMap::new() }
    }
}

impl<A: Actor> SessionDirectory<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue fresh credentials, or confirm `resume` if it names a live
    /// participant with the matching token.
    pub fn claim(&self, resume: Option<Credentials>) -> Result<Credentials, ClaimError> {
        let Some(resume) = resume else {
            return Ok(Credentials::generate());
        };
        match self.sessions.get(&resume.participant) {
            Some(entry) if entry.token == resume.token => Ok(resume),
            _ => Err(ClaimError::Rejected),
        }
    }

    /// Register `addr` for the participant, returning the session it replaced, if different.
    pub fn attach(&mut self, credentials: Credentials, addr: Addr<A>) -> Option<Addr<A>> {
        let entry = SessionEntry {
            addr: addr.clone(),
            token: credentials.token,
        };
        self.sessions
            .insert(credentials.participant, entry)
            .map(|old| old.addr)
            .filter(|old| *old != addr)
    }

    /// Remove `participant`, but only if `addr` is still the registered session.
    pub fn detach(&mut self, participant: &ParticipantId, addr: &Addr<A>) -> bool {
        match self.sessions.get(participant) {
            Some(current) if current.addr == *addr => {
                self.sessions.remove(participant);
                true
            }
            _ => false,
        }
    }

    pub fn online_count(&self) -> usize {
        self.sessions.len()
    }
}

impl<A> Transport for SessionDirectory<A>
where
    A: Actor + Handler<Outbound>,
    A::Context: ToEnvelope<A, Outbound>,
{
    fn deliver(&self, to: &ParticipantId, message: Outbound) -> Result<(), DeliveryError> {
        let entry = self
            .sessions
            .get(to)
            .ok_or_else(|| DeliveryError::NotConnected(to.clone()))?;
        entry.addr.try_send(message).map_err(|e| match e {
            SendError::Full(_) => DeliveryError::MailboxFull(to.clone()),
            SendError::Closed(_) => DeliveryError::Unreachable(to.clone()),
        })
    }
}

/// Message: a client is opening a connection, possibly resuming an id.
#[derive(Message, Debug)]
#[rtype(result = "Result<Credentials, ClaimError>")]
pub struct Claim {
    pub resume: Option<Credentials>,
}

/// Message: a session opened with claimed credentials.
pub struct Connect<A: Actor = ChatSession> {
    pub credentials: Credentials,
    pub addr: Addr<A>,
}

impl<A: Actor> Message for Connect<A> {
    type Result = ();
}

/// Message: a session closed.
pub struct Disconnect<A: Actor = ChatSession> {
    pub participant: ParticipantId,
    pub addr: Addr<A>,
}

impl<A: Actor> Message for Disconnect<A> {
    type Result = ();
}

impl<A> Handler<Claim> for SessionController<SessionDirectory<A>>
where
    A: Actor + Handler<Outbound>,
    A::Context: ToEnvelope<A, Outbound>,
{
    type Result = Result<Credentials, ClaimError>;

    fn handle(&mut self, msg: Claim, _ctx: &mut Self::Context) -> Self::Result {
        let resumed = msg.resume.as_ref().map(|c| c.participant.clone());
        let result = self.transport_mut().claim(msg.resume);
        if let (Some(participant), Err(e)) = (&resumed, &result) {
            warn!("[Directory] Refused to resume {}: {}", participant, e);
        }
        result
    }
}

impl<A> Handler<Connect<A>> for SessionController<SessionDirectory<A>>
where
    A: Actor + Handler<Outbound> + Handler<SessionKicked>,
    A::Context: ToEnvelope<A, Outbound> + ToEnvelope<A, SessionKicked>,
{
    type Result = ();

    /// Registers the session, kicking any older session of the same participant.
    fn handle(&mut self, msg: Connect<A>, _ctx: &mut Self::Context) -> Self::Result {
        let participant = msg.credentials.participant.clone();
        let directory = self.transport_mut();
        if let Some(old) = directory.attach(msg.credentials, msg.addr) {
            old.do_send(SessionKicked {
                reason: "Another session has resumed your participant id.".to_string(),
            });
            debug!("[Directory] {} reconnected (old session kicked)", participant);
        } else {
            debug!("[Directory] {} connected ({} online)", participant, directory.online_count());
        }
    }
}

impl<A> Handler<Disconnect<A>> for SessionController<SessionDirectory<A>>
where
    A: Actor + Handler<Outbound>,
    A::Context: ToEnvelope<A, Outbound>,
{
    type Result = ();

    /// Detaches the session and ends whatever the participant was doing.
    /// A stale session (already replaced) is ignored.
    fn handle(&mut self, msg: Disconnect<A>, _ctx: &mut Self::Context) -> Self::Result {
        if !self.transport_mut().detach(&msg.participant, &msg.addr) {
            debug!("[Directory] Ignored disconnect of stale session for {}", msg.participant);
            return;
        }
        self.disconnect(&msg.participant);
        info!(
            "[Directory] {} disconnected ({} waiting, {} chats active)",
            msg.participant,
            self.registry().waiting_count(),
            self.registry().chat_count()
        );
    }
}

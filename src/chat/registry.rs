/// Session registry.
///
/// Sole owner of the wait queue and the pairing map. Every mutation goes through
/// the methods below so the two invariants always hold between calls:
/// - a participant is in at most one of {wait queue, pairing map};
/// - pairing is symmetric (`a -> b` iff `b -> a`).
///
/// The registry itself is not synchronized. It is owned by the session controller
/// actor, whose mailbox serializes all access.
use std::collections::{HashMap, HashSet, VecDeque};
use log::debug;

use super::error::RegistryError;
use super::types::ParticipantId;

/// FIFO of participants seeking a partner, with O(1) membership checks.
#[derive(Debug, Default)]
struct WaitQueue {
    order: VecDeque<ParticipantId>,
    members: HashSet<ParticipantId>,
}

impl WaitQueue {
    fn contains(&self, id: &ParticipantId) -> bool {
        self.members.contains(id)
    }

    fn push_back(&mut self, id: ParticipantId) -> bool {
        if !self.members.insert(id.clone()) {
            return false;
        }
        self.order.push_back(id);
        true
    }

    fn push_front(&mut self, id: ParticipantId) -> bool {
        if !self.members.insert(id.clone()) {
            return false;
        }
        self.order.push_front(id);
        true
    }

    fn remove(&mut self, id: &ParticipantId) -> bool {
        if !self.members.remove(id) {
            return false;
        }
        if let Some(pos) = self.order.iter().position(|queued| queued == id) {
            self.order.remove(pos);
        }
        true
    }

    /// Pop the earliest entry that is not `excluding`.
    fn pop_first_except(&mut self, excluding: &ParticipantId) -> Option<ParticipantId> {
        let pos = self.order.iter().position(|queued| queued != excluding)?;
        let id = self.order.remove(pos)?;
        self.members.remove(&id);
        Some(id)
    }

    fn len(&self) -> usize {
        self.order.len()
    }
}

/// Authoritative waiting/pairing state for every participant.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    waiting: WaitQueue,
    partners: HashMap<ParticipantId, ParticipantId>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id` to the tail of the wait queue.
    ///
    /// No-op when the participant is already waiting or paired. Returns whether
    /// the queue changed.
    pub fn enqueue(&mut self, id: &ParticipantId) -> bool {
        if self.is_paired(id) {
            return false;
        }
        let added = self.waiting.push_back(id.clone());
        if added {
            debug!("[Registry] {} enqueued (queue length {})", id, self.waiting.len());
        }
        added
    }

    /// Remove and return the earliest waiting participant other than `excluding`.
    pub fn dequeue_head(&mut self, excluding: &ParticipantId) -> Option<ParticipantId> {
        self.waiting.pop_first_except(excluding)
    }

    /// Put a participant back at the head of the queue after an aborted match.
    pub(crate) fn requeue_front(&mut self, id: ParticipantId) {
        if !self.is_paired(&id) {
            self.waiting.push_front(id);
        }
    }

    /// Remove `id` from the wait queue. Returns whether it was waiting.
    pub fn remove_from_queue(&mut self, id: &ParticipantId) -> bool {
        self.waiting.remove(id)
    }

    /// Record `a` and `b` as partners of each other.
    ///
    /// Both must already be out of the wait queue and unpaired; otherwise the call
    /// fails and nothing is modified.
    pub fn pair(&mut self, a: &ParticipantId, b: &ParticipantId) -> Result<(), RegistryError> {
        if a == b {
            return Err(RegistryError::SelfPairing { participant: a.clone() });
        }
        for id in [a, b] {
            if self.is_paired(id) {
                return Err(RegistryError::AlreadyPaired { participant: id.clone() });
            }
            if self.is_waiting(id) {
                return Err(RegistryError::StillWaiting { participant: id.clone() });
            }
        }
        self.partners.insert(a.clone(), b.clone());
        self.partners.insert(b.clone(), a.clone());
        debug!("[Registry] Paired {} <-> {}", a, b);
        Ok(())
    }

    /// Tear down the pairing of `id`, both directions at once.
    ///
    /// Returns the former partner, or `None` if `id` was not paired.
    pub fn unpair(&mut self, id: &ParticipantId) -> Option<ParticipantId> {
        let partner = self.partners.remove(id)?;
        self.partners.remove(&partner);
        debug!("[Registry] Unpaired {} <-> {}", id, partner);
        Some(partner)
    }

    pub fn partner_of(&self, id: &ParticipantId) -> Option<&ParticipantId> {
        self.partners.get(id)
    }

    pub fn is_waiting(&self, id: &ParticipantId) -> bool {
        self.waiting.contains(id)
    }

    pub fn is_paired(&self, id: &ParticipantId) -> bool {
        self.partners.contains_key(id)
    }

    pub fn waiting_count(&self) -> usize {
        self.waiting.len()
    }

    /// Number of active chats (each pair counted once).
    pub fn chat_count(&self) -> usize {
        self.partners.len() / 2
    }

    /// Panics if any registry invariant is broken. Test helper.
    #[cfg(test)]
    pub fn assert_consistent(&self) {
        assert_eq!(self.waiting.order.len(), self.waiting.members.len(), "queue has duplicates");
        for id in &self.waiting.order {
            assert!(self.waiting.members.contains(id));
            assert!(!self.partners.contains_key(id), "{id} is both waiting and paired");
        }
        for (id, partner) in &self.partners {
            assert_ne!(id, partner, "{id} is paired with themselves");
            assert_eq!(self.partners.get(partner), Some(id), "pairing of {id} is not symmetric");
        }
    }
}

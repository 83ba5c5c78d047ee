/// Matchmaker: search and stop semantics over the session registry.
///
/// Both operations mutate the registry to completion and return the notices to
/// send; delivering them is the caller's job, after the mutation is done.
use log::{debug, info};

use super::error::RegistryError;
use super::notice::{Notice, Notification};
use super::registry::SessionRegistry;
use super::types::ParticipantId;

/// Handle a search request from `id`.
///
/// Pairs `id` with the earliest other waiting participant, or puts `id` in the
/// queue. A participant never gets matched with themselves.
pub fn request_search(
    registry: &mut SessionRegistry,
    id: &ParticipantId,
) -> Result<Vec<Notification>, RegistryError> {
    if registry.is_paired(id) {
        debug!("[Matchmaker] {} searched while already in a chat", id);
        return Ok(vec![Notification::new(id, Notice::AlreadyInChat)]);
    }

    if let Some(partner) = registry.dequeue_head(id) {
        let was_waiting = registry.remove_from_queue(id);
        if let Err(e) = registry.pair(id, &partner) {
            registry.requeue_front(partner);
            if was_waiting {
                registry.enqueue(id);
            }
            return Err(e);
        }
        info!("[Matchmaker] Matched {} with {} ({} chats active)", id, partner, registry.chat_count());
        return Ok(vec![
            Notification::new(&partner, Notice::Matched),
            Notification::new(id, Notice::Matched),
        ]);
    }

    if registry.enqueue(id) {
        debug!("[Matchmaker] {} is waiting for a partner", id);
        Ok(vec![Notification::new(id, Notice::Waiting)])
    } else {
        // Already waiting: searching again changes nothing.
        Ok(Vec::new())
    }
}

/// Handle a stop request from `id`: cancel the search, or leave the chat.
pub fn request_stop(registry: &mut SessionRegistry, id: &ParticipantId) -> Vec<Notification> {
    if registry.remove_from_queue(id) {
        debug!("[Matchmaker] {} cancelled the search", id);
        return vec![Notification::new(id, Notice::SearchCancelled)];
    }

    if let Some(partner) = registry.unpair(id) {
        info!("[Matchmaker] {} left the chat with {}", id, partner);
        return vec![
            Notification::new(&partner, Notice::PartnerLeft),
            Notification::new(id, Notice::YouLeft),
        ];
    }

    vec![Notification::new(id, Notice::NotSearching)]
}

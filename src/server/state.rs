// src/server/state.rs

//! Application state for the backend server.
//!
//! Holds the address of the session controller actor.
//! Used to share state between HTTP/WebSocket handlers and the actor system.

use actix::Addr;
use crate::server::directory::ChatController;

/// Shared application state, injected into HTTP/WebSocket handlers.
pub struct AppState {
    /// Address of the session controller actor (owns the queue, pairings and sessions).
    pub controller: Addr<ChatController>,
}

impl AppState {
    /// Create a new AppState with the given actor address.
    pub fn new(controller: Addr<ChatController>) -> Self {
        AppState { controller }
    }
}

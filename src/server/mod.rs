// src/server/mod.rs

//! Server layer root module.
//!
//! This module is the WebSocket host for the chat core, including:
//! - Application state management
//! - HTTP/WebSocket routing
//! - The session directory (participant id -> connected session)
//! - Per-connection WebSocket sessions and their wire format
//! - Reassembly of fragmented client messages

pub mod state;
pub mod router;
pub mod directory;
pub mod session;
pub mod fragments;
pub mod messages;
pub mod ws_error;

//! Chat core: waiting queue, pairing state machine and message relay.
//!
//! Nothing in here knows about WebSockets. Participants are reached through the
//! [`transport::Transport`] capability; the host adapter lives in `crate::server`.

pub mod types;
pub mod error;
pub mod command;
pub mod notice;
pub mod transport;
pub mod registry;
pub mod matchmaker;
pub mod relay;
pub mod controller;

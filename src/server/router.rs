//! HTTP and WebSocket routing configuration.
//!
//! Each WebSocket connection is handled by a dedicated session actor.

use actix_web::web;
use crate::server::session::ws_chat;

/// Configure the application's HTTP/WebSocket routes.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/ws/chat")
            .to(ws_chat)
    );
}

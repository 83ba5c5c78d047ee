/// Centralized helpers for WebSocket and HTTP error responses.
///
/// Use these helpers to ensure all error messages are consistent and include a code and context.
use actix_web::{HttpResponse, http::StatusCode};
use serde_json::json;

/// Formats a WebSocket error message as a JSON string.
///
/// # Arguments
/// - `code`: Unique error code (e.g. "INVALID_MESSAGE").
/// - `message`: Human-readable error message (in English).
/// - `context`: Optional context (e.g. participant id).
pub fn ws_error_message(code: &str, message: &str, context: Option<&str>) -> String {
    json!({
        "action": "Error",
        "data": {
            "code": code,
            "message": message,
            "context": context.unwrap_or(""),
        }
    })
    .to_string()
}

/// Returns a WebSocket message for session kicked (unicity violation).
pub fn ws_session_kicked_message(context: Option<&str>) -> String {
    ws_error_message(
        "SESSION_KICKED",
        "You have been disconnected because another session has connected with your participant id.",
        context,
    )
}

/// Returns an HTTP error response with a JSON body.
pub fn http_error_response(
    code: &str,
    message: &str,
    context: Option<&str>,
    status: StatusCode,
) -> HttpResponse {
    let body = json!({
        "error": {
            "code": code,
            "message": message,
            "context": context.unwrap_or(""),
        }
    });
    HttpResponse::build(status).json(body)
}

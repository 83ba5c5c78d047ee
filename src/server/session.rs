/// WebSocket session handler for one chat participant.
///
/// This actor manages a single participant's connection: it registers with the
/// session controller on start, turns client frames into chat commands, and
/// writes notices and relayed messages back to the client.
use actix::prelude::*;
use actix_http::ws::Item;
use actix_web::{web, Error, HttpRequest, HttpResponse, http::StatusCode};
use actix_web_actors::ws;
use log::{debug, error, warn};
use std::borrow::Cow;

use super::directory::{ChatController, Claim, Connect, Credentials, Disconnect};
use super::fragments::{Assembled, FragmentError, FrameAssembler};
use super::messages::{ClientWsMessage, ServerWsMessage, SessionKicked};
use super::ws_error::{http_error_response, ws_error_message, ws_session_kicked_message};
use crate::chat::command::Command;
use crate::chat::controller::Inbound;
use crate::chat::notice::Outbound;
use crate::chat::types::{ParticipantId, Payload};
use crate::config::server::{MAX_FRAME_SIZE, MAX_MESSAGE_SIZE, SESSION_MAILBOX_CAPACITY};

/// Represents a participant's WebSocket connection.
pub struct ChatSession {
    pub credentials: Credentials,
    /// Display name from the connection query; only used in the welcome text.
    pub username: String,
    pub controller: Addr<ChatController>,
    assembler: FrameAssembler,
}

impl ChatSession {
    pub fn new(credentials: Credentials, username: String, controller: Addr<ChatController>) -> Self {
        Self {
            credentials,
            username,
            controller,
            assembler: FrameAssembler::new(MAX_MESSAGE_SIZE),
        }
    }

    fn participant(&self) -> &ParticipantId {
        &self.credentials.participant
    }

    fn submit(&self, command: Command) {
        self.controller.do_send(Inbound {
            participant: self.participant().clone(),
            command,
        });
    }

    /// Text frames carry a JSON `ClientWsMessage`.
    fn handle_text(&self, text: &str, ctx: &mut ws::WebsocketContext<Self>) {
        match serde_json::from_str::<ClientWsMessage>(text) {
            Ok(client_msg) => {
                if let Some(command) = client_msg.into_command(&self.username) {
                    self.submit(command);
                }
            }
            Err(e) => {
                debug!("[Session] Invalid frame from {}: {}", self.participant(), e);
                ctx.text(ws_error_message(
                    "INVALID_MESSAGE",
                    "Invalid client message",
                    Some(self.participant().as_str()),
                ));
            }
        }
    }

    fn handle_fragment(&mut self, item: Item, ctx: &mut ws::WebsocketContext<Self>) {
        match self.assembler.push(item) {
            Ok(None) => {}
            Ok(Some(Assembled::Text(text))) => self.handle_text(&text, ctx),
            Ok(Some(Assembled::Binary(bytes))) => self.submit(Command::Message(Payload::Binary(bytes))),
            Err(e) => {
                warn!("[Session] Dropped fragmented message from {}: {}", self.participant(), e);
                let code = match &e {
                    FragmentError::TooLarge { .. } => "MESSAGE_TOO_LARGE",
                    _ => "INVALID_FRAGMENT",
                };
                ctx.text(ws_error_message(code, &e.to_string(), Some(self.participant().as_str())));
            }
        }
    }
}

impl Actor for ChatSession {
    type Context = ws::WebsocketContext<Self>;

    /// Called when the session starts. Hands the client its credentials and
    /// registers the participant with the controller.
    fn started(&mut self, ctx: &mut Self::Context) {
        ctx.set_mailbox_capacity(SESSION_MAILBOX_CAPACITY);
        match serde_json::to_string(&ServerWsMessage::session(&self.credentials)) {
            Ok(text) => ctx.text(text),
            Err(e) => error!("[Session] Failed to serialize session frame: {}", e),
        }
        self.controller.do_send(Connect {
            credentials: self.credentials.clone(),
            addr: ctx.address(),
        });
    }

    /// Called when the session stops. Ends the participant's search or chat.
    fn stopped(&mut self, ctx: &mut Self::Context) {
        self.controller.do_send(Disconnect {
            participant: self.participant().clone(),
            addr: ctx.address(),
        });
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ChatSession {
    /// Handles incoming WebSocket frames from the client.
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Text(text)) => self.handle_text(&text, ctx),
            Ok(ws::Message::Binary(bytes)) => {
                self.submit(Command::Message(Payload::Binary(bytes.to_vec())));
            }
            Ok(ws::Message::Continuation(item)) => self.handle_fragment(item, ctx),
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Pong(_)) | Ok(ws::Message::Nop) => {}
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            // The decoder cannot skip an oversized frame, so the stream ends here.
            // Tell the client why before closing.
            Err(ws::ProtocolError::Overflow) => {
                warn!("[Session] Frame over {} bytes from {}", MAX_FRAME_SIZE, self.participant());
                ctx.text(ws_error_message(
                    "MESSAGE_TOO_LARGE",
                    &format!("Frames are limited to {} bytes", MAX_FRAME_SIZE),
                    Some(self.participant().as_str()),
                ));
                ctx.close(Some(ws::CloseReason {
                    code: ws::CloseCode::Size,
                    description: Some("Frame too large".into()),
                }));
                ctx.stop();
            }
            Err(e) => {
                debug!("[Session] Protocol error for {}: {}", self.participant(), e);
                ctx.stop();
            }
        }
    }
}

impl Handler<Outbound> for ChatSession {
    type Result = ();

    /// Writes a notice or a relayed message to the client.
    fn handle(&mut self, msg: Outbound, ctx: &mut Self::Context) {
        let server_msg = match msg {
            Outbound::Notice(notice) => ServerWsMessage::notice(&notice),
            Outbound::Relayed(Payload::Text(text)) => ServerWsMessage::relayed(text),
            Outbound::Relayed(Payload::Binary(bytes)) => {
                ctx.binary(bytes);
                return;
            }
        };
        match serde_json::to_string(&server_msg) {
            Ok(text) => ctx.text(text),
            Err(e) => {
                // Serialization error: notify client and close connection.
                error!("[Session] Failed to serialize ServerWsMessage: {}", e);
                ctx.text(ws_error_message("INTERNAL_ERROR", "Internal server error", None));
                ctx.close(Some(ws::CloseReason {
                    code: ws::CloseCode::Error,
                    description: Some("Internal server error".into()),
                }));
                ctx.stop();
            }
        }
    }
}

impl Handler<SessionKicked> for ChatSession {
    type Result = ();

    fn handle(&mut self, msg: SessionKicked, ctx: &mut Self::Context) {
        debug!("[Session] Kicking session of {}: {}", self.participant(), msg.reason);
        ctx.text(ws_session_kicked_message(Some(self.participant().as_str())));
        ctx.close(Some(ws::CloseReason {
            code: ws::CloseCode::Policy,
            description: Some(msg.reason),
        }));
        ctx.stop();
    }
}

/// Connection parameters read from the query string.
#[derive(Debug, PartialEq, Eq)]
struct ConnectParams {
    participant: Option<String>,
    token: Option<String>,
    username: String,
}

fn parse_query(query: &str) -> ConnectParams {
    let mut params = ConnectParams {
        participant: None,
        token: None,
        username: String::new(),
    };
    for kv in query.split('&') {
        let mut split = kv.splitn(2, '=');
        let decode = |value: &str| {
            urlencoding::decode(value)
                .unwrap_or_else(|_| Cow::Borrowed(""))
                .trim()
                .to_string()
        };
        let non_empty = |value: String| Some(value).filter(|v| !v.is_empty());
        match (split.next(), split.next()) {
            (Some("participant"), Some(id)) => params.participant = non_empty(decode(id)),
            (Some("token"), Some(token)) => params.token = non_empty(decode(token)),
            (Some("username"), Some(name)) => params.username = decode(name),
            _ => {}
        }
    }
    params
}

fn unauthorized(message: &str) -> HttpResponse {
    http_error_response("INVALID_CREDENTIALS", message, None, StatusCode::UNAUTHORIZED)
}

/// WebSocket endpoint for the chat.
///
/// Query parameters: `username` (optional), and `participant` plus `token` to
/// resume an id issued earlier. Without them the connection gets fresh
/// credentials, sent to the client in its first frame.
pub async fn ws_chat(
    req: HttpRequest,
    stream: web::Payload,
    data: web::Data<crate::server::state::AppState>,
) -> Result<HttpResponse, Error> {
    let params = parse_query(req.query_string());

    let resume = match (params.participant, params.token) {
        (None, None) => None,
        (Some(participant), Some(token)) => Some(Credentials {
            participant: ParticipantId::new(participant),
            token,
        }),
        _ => return Ok(unauthorized("Resuming a session needs both participant and token")),
    };

    let credentials = match data
        .controller
        .send(Claim { resume })
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?
    {
        Ok(credentials) => credentials,
        Err(e) => return Ok(unauthorized(&e.to_string())),
    };
    debug!("[Session] Opening chat session for {}", credentials.participant);

    ws::WsResponseBuilder::new(
        ChatSession::new(credentials, params.username, data.controller.clone()),
        &req,
        stream,
    )
    .frame_size(MAX_FRAME_SIZE)
    .start()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_decodes_values() {
        let params = parse_query("participant=42&token=abc&username=%D0%90%D1%80%D1%83");
        assert_eq!(params.participant.as_deref(), Some("42"));
        assert_eq!(params.token.as_deref(), Some("abc"));
        assert_eq!(params.username, "Ару");
    }

    #[test]
    fn test_parse_query_without_credentials() {
        let params = parse_query("username=Aru");
        assert_eq!(params.participant, None);
        assert_eq!(params.token, None);

        let params = parse_query("participant=&token=&foo=bar");
        assert_eq!(params.participant, None);
        assert_eq!(params.token, None);
        assert_eq!(params.username, "");
    }

    #[test]
    fn test_parse_query_keeps_equals_in_value() {
        let params = parse_query("participant=a=b");
        assert_eq!(params.participant.as_deref(), Some("a=b"));
    }

    /// Drives the real HTTP server over a raw TCP socket with hand-built frames.
    mod socket {
        use super::super::*;
        use crate::server::directory::SessionDirectory;
        use crate::server::state::AppState;
        use actix_web::{App, HttpServer};
        use std::net::SocketAddr;
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpStream;
        use tokio::time::{timeout, Duration};

        const OP_CONTINUATION: u8 = 0x0;
        const OP_TEXT: u8 = 0x1;
        const OP_BINARY: u8 = 0x2;
        const OP_CLOSE: u8 = 0x8;

        fn start_server() -> SocketAddr {
            let controller = ChatController::new(SessionDirectory::new()).start();
            let state = web::Data::new(AppState::new(controller));
            let server = HttpServer::new(move || {
                App::new()
                    .app_data(state.clone())
                    .configure(crate::server::router::config)
            })
            .workers(1)
            .disable_signals()
            .bind(("127.0.0.1", 0))
            .unwrap();
            let addr = server.addrs()[0];
            let server = server.run();
            actix::spawn(async move {
                let _ = server.await;
            });
            addr
        }

        async fn open(addr: SocketAddr, query: &str) -> (TcpStream, String) {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            let request = format!(
                "GET /ws/chat{query} HTTP/1.1\r\n\
                 Host: {addr}\r\n\
                 Upgrade: websocket\r\n\
                 Connection: Upgrade\r\n\
                 Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n\
                 Sec-WebSocket-Version: 13\r\n\r\n"
            );
            stream.write_all(request.as_bytes()).await.unwrap();
            let mut head = Vec::new();
            while !head.ends_with(b"\r\n\r\n") {
                head.push(stream.read_u8().await.unwrap());
            }
            (stream, String::from_utf8_lossy(&head).into_owned())
        }

        /// Connect with fresh credentials and consume the session frame.
        async fn join(addr: SocketAddr) -> (TcpStream, serde_json::Value) {
            let (mut stream, head) = open(addr, "").await;
            assert!(head.starts_with("HTTP/1.1 101"), "{head}");
            let session = read_json(&mut stream).await;
            assert_eq!(session["action"], "Session");
            (stream, session["data"].clone())
        }

        /// Client frames must be masked; a zero key leaves the payload unchanged.
        async fn send_frame(stream: &mut TcpStream, fin: bool, opcode: u8, payload: &[u8]) {
            let mut frame = vec![(if fin { 0x80 } else { 0 }) | opcode];
            match payload.len() {
                n if n < 126 => frame.push(0x80 | n as u8),
                n if n <= u16::MAX as usize => {
                    frame.push(0x80 | 126);
                    frame.extend_from_slice(&(n as u16).to_be_bytes());
                }
                n => {
                    frame.push(0x80 | 127);
                    frame.extend_from_slice(&(n as u64).to_be_bytes());
                }
            }
            frame.extend_from_slice(&[0; 4]);
            frame.extend_from_slice(payload);
            stream.write_all(&frame).await.unwrap();
        }

        async fn send_json(stream: &mut TcpStream, json: &str) {
            send_frame(stream, true, OP_TEXT, json.as_bytes()).await;
        }

        async fn read_frame(stream: &mut TcpStream) -> (u8, Vec<u8>) {
            let frame = async {
                let first = stream.read_u8().await?;
                let len = match stream.read_u8().await? & 0x7f {
                    126 => stream.read_u16().await? as usize,
                    127 => stream.read_u64().await? as usize,
                    n => n as usize,
                };
                let mut payload = vec![0; len];
                stream.read_exact(&mut payload).await?;
                Ok::<_, std::io::Error>((first & 0x0f, payload))
            };
            timeout(Duration::from_secs(5), frame).await.unwrap().unwrap()
        }

        async fn read_json(stream: &mut TcpStream) -> serde_json::Value {
            let (opcode, payload) = read_frame(stream).await;
            assert_eq!(opcode, OP_TEXT);
            serde_json::from_slice(&payload).unwrap()
        }

        async fn matched_pair(addr: SocketAddr) -> (TcpStream, TcpStream) {
            let (mut x, _) = join(addr).await;
            let (mut y, _) = join(addr).await;
            send_json(&mut x, r#"{"action":"Search"}"#).await;
            assert_eq!(read_json(&mut x).await["data"]["kind"], "waiting");
            send_json(&mut y, r#"{"action":"Search"}"#).await;
            assert_eq!(read_json(&mut x).await["data"]["kind"], "matched");
            assert_eq!(read_json(&mut y).await["data"]["kind"], "matched");
            (x, y)
        }

        #[actix::test]
        async fn test_large_binary_frame_reaches_partner() {
            let addr = start_server();
            let (mut x, mut y) = matched_pair(addr).await;

            let photo: Vec<u8> = (0..70_000u32).map(|i| i as u8).collect();
            send_frame(&mut x, true, OP_BINARY, &photo).await;

            let (opcode, payload) = read_frame(&mut y).await;
            assert_eq!(opcode, OP_BINARY);
            assert_eq!(payload, photo);

            send_json(&mut y, r#"{"action":"Text","data":{"text":"got it"}}"#).await;
            let reply = read_json(&mut x).await;
            assert_eq!(reply["action"], "Relayed");
            assert_eq!(reply["data"]["text"], "got it");
        }

        #[actix::test]
        async fn test_fragmented_messages_are_reassembled() {
            let addr = start_server();
            let (mut x, mut y) = matched_pair(addr).await;

            send_frame(&mut x, false, OP_BINARY, &[1, 2, 3]).await;
            send_frame(&mut x, false, OP_CONTINUATION, &[4]).await;
            send_frame(&mut x, true, OP_CONTINUATION, &[5, 6]).await;
            assert_eq!(read_frame(&mut y).await, (OP_BINARY, vec![1, 2, 3, 4, 5, 6]));

            send_frame(&mut x, false, OP_TEXT, br#"{"action":"Text","#).await;
            send_frame(&mut x, true, OP_CONTINUATION, br#""data":{"text":"hi"}}"#).await;
            let relayed = read_json(&mut y).await;
            assert_eq!(relayed["data"]["text"], "hi");
        }

        #[actix::test]
        async fn test_stray_continuation_gets_error_and_session_stays() {
            let addr = start_server();
            let (mut x, mut y) = matched_pair(addr).await;

            send_frame(&mut x, true, OP_CONTINUATION, b"orphan").await;
            let error = read_json(&mut x).await;
            assert_eq!(error["action"], "Error");
            assert_eq!(error["data"]["code"], "INVALID_FRAGMENT");

            send_frame(&mut x, true, OP_BINARY, &[9]).await;
            assert_eq!(read_frame(&mut y).await, (OP_BINARY, vec![9]));
        }

        #[actix::test]
        async fn test_resume_requires_issued_token() {
            let addr = start_server();
            let (mut first, credentials) = join(addr).await;
            let participant = credentials["participant"].as_str().unwrap().to_string();
            let token = credentials["token"].as_str().unwrap().to_string();

            let (_, head) = open(addr, &format!("?participant={participant}&token=guess")).await;
            assert!(head.starts_with("HTTP/1.1 401"), "{head}");
            let (_, head) = open(addr, &format!("?participant={participant}")).await;
            assert!(head.starts_with("HTTP/1.1 401"), "{head}");

            let (mut second, head) = open(addr, &format!("?participant={participant}&token={token}")).await;
            assert!(head.starts_with("HTTP/1.1 101"), "{head}");
            let session = read_json(&mut second).await;
            assert_eq!(session["data"]["participant"], participant.as_str());

            let kicked = read_json(&mut first).await;
            assert_eq!(kicked["data"]["code"], "SESSION_KICKED");
            assert_eq!(read_frame(&mut first).await.0, OP_CLOSE);
        }
    }
}

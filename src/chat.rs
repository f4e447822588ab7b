use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::model::message::Message;
use crate::models::TokenType;
use actix_web::{HttpRequest, HttpResponse, error::ErrorUnauthorized, web};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

/// Server → client events, fanned out to every connection
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// A message was persisted (via REST or WS) and is being announced
    MessageNew { payload: Message },
    /// Answer to a client Ping
    Pong,
    /// A user's socket opened or closed
    Presence { user_id: u64, online: bool },
    /// Client frame could not be honored
    Error { message: String },
}

/// Client → server frames
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    Send { recipient_id: u64, body: String },
    Ping,
}

/// Process-wide broadcast hub. Delivery is best-effort fan-out: no
/// ordering or delivery guarantees, lagging receivers drop events.
#[derive(Clone)]
pub struct ChatHub {
    tx: broadcast::Sender<ServerEvent>,
}

impl ChatHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Send to all connected clients. A send with no receivers is fine.
    pub fn publish(&self, event: ServerEvent) {
        let _ = self.tx.send(event);
    }

    fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.tx.subscribe()
    }
}

#[derive(Deserialize)]
pub struct WsQuery {
    token: String,
}

/// WebSocket entry point. Browsers cannot set headers on the upgrade
/// request, so the access token rides in the query string.
pub async fn ws_entry(
    req: HttpRequest,
    stream: web::Payload,
    query: web::Query<WsQuery>,
    hub: web::Data<ChatHub>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> actix_web::Result<HttpResponse> {
    let claims = verify_token(&query.token, &config.jwt_secret)
        .map_err(|_| ErrorUnauthorized("Invalid token"))?;

    if claims.token_type != TokenType::Access {
        return Err(ErrorUnauthorized("Access token required"));
    }

    let (response, session, msg_stream) = actix_ws::handle(&req, stream)?;

    actix_web::rt::spawn(run_session(
        session,
        msg_stream,
        hub.get_ref().clone(),
        pool.get_ref().clone(),
        claims.user_id,
        claims.employee_id,
    ));

    Ok(response)
}

async fn run_session(
    mut session: actix_ws::Session,
    mut msg_stream: actix_ws::MessageStream,
    hub: ChatHub,
    pool: MySqlPool,
    user_id: u64,
    employee_id: Option<u64>,
) {
    let conn_id = Uuid::new_v4();
    let mut rx = hub.subscribe();

    debug!(%conn_id, user_id, "chat connection opened");
    hub.publish(ServerEvent::Presence {
        user_id,
        online: true,
    });

    loop {
        tokio::select! {
            broadcasted = rx.recv() => match broadcasted {
                Ok(event) => {
                    let Ok(text) = serde_json::to_string(&event) else { continue };
                    if session.text(text).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(%conn_id, skipped, "chat receiver lagging, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },

            frame = msg_stream.next() => match frame {
                Some(Ok(actix_ws::Message::Text(text))) => {
                    handle_client_frame(&text, &mut session, &hub, &pool, employee_id).await;
                }
                Some(Ok(actix_ws::Message::Ping(bytes))) => {
                    if session.pong(&bytes).await.is_err() {
                        break;
                    }
                }
                Some(Ok(actix_ws::Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(%conn_id, error = %e, "chat protocol error");
                    break;
                }
            },
        }
    }

    hub.publish(ServerEvent::Presence {
        user_id,
        online: false,
    });
    debug!(%conn_id, user_id, "chat connection closed");

    let _ = session.close(None).await;
}

async fn handle_client_frame(
    text: &str,
    session: &mut actix_ws::Session,
    hub: &ChatHub,
    pool: &MySqlPool,
    employee_id: Option<u64>,
) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(e) => e,
        Err(_) => {
            send_direct(
                session,
                &ServerEvent::Error {
                    message: "Unrecognized frame".into(),
                },
            )
            .await;
            return;
        }
    };

    match event {
        ClientEvent::Ping => send_direct(session, &ServerEvent::Pong).await,

        ClientEvent::Send { recipient_id, body } => {
            let Some(sender_id) = employee_id else {
                send_direct(
                    session,
                    &ServerEvent::Error {
                        message: "No employee profile".into(),
                    },
                )
                .await;
                return;
            };

            match crate::api::message::persist_message(pool, sender_id, recipient_id, &body).await
            {
                Ok(message) => hub.publish(ServerEvent::MessageNew { payload: message }),
                Err(e) => {
                    send_direct(
                        session,
                        &ServerEvent::Error {
                            message: e.to_string(),
                        },
                    )
                    .await;
                }
            }
        }
    }
}

async fn send_direct(session: &mut actix_ws::Session, event: &ServerEvent) {
    if let Ok(text) = serde_json::to_string(event) {
        let _ = session.text(text).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_events_are_tagged() {
        let json = serde_json::to_string(&ServerEvent::Pong).unwrap();
        assert_eq!(json, r#"{"type":"Pong"}"#);

        let json = serde_json::to_string(&ServerEvent::Presence {
            user_id: 9,
            online: true,
        })
        .unwrap();
        assert!(json.contains(r#""type":"Presence""#));
        assert!(json.contains(r#""user_id":9"#));
    }

    #[test]
    fn client_send_frame_parses() {
        let frame = r#"{"type":"Send","recipient_id":12,"body":"hello"}"#;
        match serde_json::from_str::<ClientEvent>(frame).unwrap() {
            ClientEvent::Send { recipient_id, body } => {
                assert_eq!(recipient_id, 12);
                assert_eq!(body, "hello");
            }
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[test]
    fn unknown_frame_is_an_error() {
        assert!(serde_json::from_str::<ClientEvent>(r#"{"type":"Nope"}"#).is_err());
    }

    #[tokio::test]
    async fn hub_fans_out_to_all_subscribers() {
        let hub = ChatHub::new(8);
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        hub.publish(ServerEvent::Pong);

        assert!(matches!(a.recv().await, Ok(ServerEvent::Pong)));
        assert!(matches!(b.recv().await, Ok(ServerEvent::Pong)));
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_silent() {
        let hub = ChatHub::new(8);
        hub.publish(ServerEvent::Pong); // must not panic or error
    }
}

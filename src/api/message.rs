use crate::auth::auth::AuthUser;
use crate::chat::{ChatHub, ServerEvent};
use crate::model::message::{Message, valid_body};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct SendMessageReq {
    #[schema(example = 12)]
    pub recipient_id: u64,
    #[schema(example = "Standup moved to 10:30")]
    pub body: String,
}

#[derive(Deserialize, IntoParams)]
pub struct ConversationQuery {
    /// Employee id of the conversation peer
    pub with: u64,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct ConversationResponse {
    pub data: Vec<Message>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

#[derive(Debug)]
pub enum SendError {
    InvalidBody,
    UnknownRecipient,
    Db(sqlx::Error),
}

impl std::fmt::Display for SendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SendError::InvalidBody => write!(f, "Message body must be 1 to 2000 characters"),
            SendError::UnknownRecipient => write!(f, "Unknown recipient"),
            SendError::Db(_) => write!(f, "Internal Server Error"),
        }
    }
}

/// Validate and persist a direct message. Shared by the REST endpoint
/// and the WebSocket Send frame.
pub(crate) async fn persist_message(
    pool: &MySqlPool,
    sender_id: u64,
    recipient_id: u64,
    body: &str,
) -> Result<Message, SendError> {
    if !valid_body(body) {
        return Err(SendError::InvalidBody);
    }

    let result = sqlx::query(
        "INSERT INTO messages (sender_id, recipient_id, body) VALUES (?, ?, ?)",
    )
    .bind(sender_id)
    .bind(recipient_id)
    .bind(body)
    .execute(pool)
    .await;

    match result {
        Ok(res) => Ok(Message {
            id: res.last_insert_id(),
            sender_id,
            recipient_id,
            body: body.to_string(),
            created_at: Some(Utc::now()),
            read_at: None,
        }),
        Err(e) => {
            // FK violation means the recipient does not exist
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Err(SendError::UnknownRecipient);
                }
            }
            error!(error = %e, sender_id, recipient_id, "Failed to persist message");
            Err(SendError::Db(e))
        }
    }
}

/// Send a direct message. Connected chat clients get it pushed over the
/// WebSocket fan-out as well.
#[utoipa::path(
    post,
    path = "/api/messages",
    request_body = SendMessageReq,
    responses(
        (status = 201, description = "Message sent", body = Message),
        (status = 400, description = "Empty body, body too long, or unknown recipient"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Message"
)]
pub async fn send_message(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    hub: web::Data<ChatHub>,
    payload: web::Json<SendMessageReq>,
) -> actix_web::Result<impl Responder> {
    let sender_id = auth.employee_id_or_forbidden()?;

    match persist_message(pool.get_ref(), sender_id, payload.recipient_id, &payload.body).await {
        Ok(message) => {
            hub.publish(ServerEvent::MessageNew {
                payload: message.clone(),
            });
            Ok(HttpResponse::Created().json(message))
        }
        Err(SendError::Db(_)) => Err(ErrorInternalServerError("Internal Server Error")),
        Err(e) => Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": e.to_string()
        }))),
    }
}

/// Conversation with one peer, newest first
#[utoipa::path(
    get,
    path = "/api/messages",
    params(ConversationQuery),
    responses(
        (status = 200, description = "Paginated conversation", body = ConversationResponse),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Message"
)]
pub async fn conversation(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ConversationQuery>,
) -> actix_web::Result<impl Responder> {
    let me = auth.employee_id_or_forbidden()?;
    let peer = query.with;

    let per_page = query.per_page.unwrap_or(50).min(200);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM messages
        WHERE (sender_id = ? AND recipient_id = ?) OR (sender_id = ? AND recipient_id = ?)
        "#,
    )
    .bind(me)
    .bind(peer)
    .bind(peer)
    .bind(me)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to count conversation");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let messages = sqlx::query_as::<_, Message>(
        r#"
        SELECT id, sender_id, recipient_id, body, created_at, read_at
        FROM messages
        WHERE (sender_id = ? AND recipient_id = ?) OR (sender_id = ? AND recipient_id = ?)
        ORDER BY created_at DESC, id DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(me)
    .bind(peer)
    .bind(peer)
    .bind(me)
    .bind(per_page)
    .bind(offset)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch conversation");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(ConversationResponse {
        data: messages,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}

/// Mark a received message as read
#[utoipa::path(
    put,
    path = "/api/messages/{message_id}/read",
    params(("message_id" = u64, Path, description = "Message ID")),
    responses(
        (status = 200, description = "Marked read"),
        (status = 404, description = "Not the recipient, or already read"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Message"
)]
pub async fn mark_read(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let me = auth.employee_id_or_forbidden()?;
    let message_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE messages
        SET read_at = NOW()
        WHERE id = ? AND recipient_id = ? AND read_at IS NULL
        "#,
    )
    .bind(message_id)
    .bind(me)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, message_id, "Failed to mark message read");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Message not found or already read"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Marked read"
    })))
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Longest message body accepted, in characters.
pub const MAX_BODY_CHARS: usize = 2000;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Message {
    pub id: u64,
    pub sender_id: u64,
    pub recipient_id: u64,
    #[schema(example = "Standup moved to 10:30")]
    pub body: String,
    #[schema(example = "2026-01-01T00:00:00Z", value_type = String, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub read_at: Option<DateTime<Utc>>,
}

pub fn valid_body(body: &str) -> bool {
    let len = body.chars().count();
    len >= 1 && len <= MAX_BODY_CHARS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_rejected() {
        assert!(!valid_body(""));
        assert!(valid_body("hi"));
    }

    #[test]
    fn body_limit_is_in_characters_not_bytes() {
        let exactly = "ü".repeat(MAX_BODY_CHARS);
        assert!(valid_body(&exactly));
        assert!(!valid_body(&format!("{exactly}x")));
    }
}

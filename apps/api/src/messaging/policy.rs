//! Messaging authorization and validation.
//!
//! Every message operation first resolves the message's connection and requires
//! the caller to be one of its two parties while it is `accepted`. Edits and
//! deletes additionally require the caller to be the sender and the message to
//! be live. Deletion is soft: the row stays, its content is never served again.

use uuid::Uuid;

use crate::errors::AppError;
use crate::models::connection::{ConnectionRow, ConnectionStatus};
use crate::models::message::MessageRow;

pub const MAX_MESSAGE_CHARS: usize = 2000;
pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 200;

/// Returns the counterparty when `user_id` may exchange messages on `connection`.
pub fn authorize_participant(connection: &ConnectionRow, user_id: Uuid) -> Result<Uuid, AppError> {
    let counterparty = connection.counterparty(user_id).ok_or_else(|| {
        AppError::Forbidden("You are not a party to this connection".to_string())
    })?;
    match connection.status()? {
        ConnectionStatus::Accepted => Ok(counterparty),
        other => Err(AppError::Forbidden(format!(
            "Messaging requires an accepted connection (currently {})",
            other.as_str()
        ))),
    }
}

/// Only the sender may change a message, and never after it was deleted.
pub fn authorize_author(message: &MessageRow, user_id: Uuid) -> Result<(), AppError> {
    if message.sender_id != user_id {
        return Err(AppError::Forbidden(
            "Only the sender can modify this message".to_string(),
        ));
    }
    if message.is_deleted() {
        return Err(AppError::Conflict("Message has been deleted".to_string()));
    }
    Ok(())
}

pub fn validate_content(raw: &str) -> Result<String, AppError> {
    let content = raw.trim();
    if content.is_empty() {
        return Err(AppError::Validation("Message cannot be empty".to_string()));
    }
    if content.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::Validation(format!(
            "Message exceeds {MAX_MESSAGE_CHARS} characters"
        )));
    }
    Ok(content.to_string())
}

pub fn page_size(requested: Option<u32>) -> i64 {
    i64::from(requested.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn connection(status: ConnectionStatus) -> ConnectionRow {
        let ngo_id = Uuid::new_v4();
        ConnectionRow {
            id: Uuid::new_v4(),
            ngo_id,
            artisan_id: Uuid::new_v4(),
            requested_by: ngo_id,
            status: status.as_str().to_string(),
            created_at: Utc::now(),
            responded_at: Some(Utc::now()),
        }
    }

    fn message(sender_id: Uuid, deleted: bool) -> MessageRow {
        MessageRow {
            id: Uuid::new_v4(),
            connection_id: Uuid::new_v4(),
            sender_id,
            content: "Namaste".to_string(),
            created_at: Utc::now(),
            edited_at: None,
            deleted_at: deleted.then(Utc::now),
            read_at: None,
        }
    }

    #[test]
    fn test_both_parties_of_accepted_connection_may_message() {
        let conn = connection(ConnectionStatus::Accepted);
        assert_eq!(authorize_participant(&conn, conn.ngo_id).unwrap(), conn.artisan_id);
        assert_eq!(authorize_participant(&conn, conn.artisan_id).unwrap(), conn.ngo_id);
    }

    #[test]
    fn test_outsider_is_forbidden() {
        let conn = connection(ConnectionStatus::Accepted);
        assert!(matches!(
            authorize_participant(&conn, Uuid::new_v4()),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_pending_and_rejected_connections_block_messaging() {
        for status in [ConnectionStatus::Pending, ConnectionStatus::Rejected] {
            let conn = connection(status);
            assert!(matches!(
                authorize_participant(&conn, conn.ngo_id),
                Err(AppError::Forbidden(_))
            ));
        }
    }

    #[test]
    fn test_only_sender_may_modify() {
        let sender = Uuid::new_v4();
        let msg = message(sender, false);
        assert!(authorize_author(&msg, sender).is_ok());
        assert!(matches!(
            authorize_author(&msg, Uuid::new_v4()),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_deleted_message_cannot_be_modified() {
        let sender = Uuid::new_v4();
        let msg = message(sender, true);
        assert!(matches!(
            authorize_author(&msg, sender),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_validate_content() {
        assert_eq!(validate_content("  hello \n").unwrap(), "hello");
        assert!(validate_content(" \n\t ").is_err());
        assert!(validate_content(&"क".repeat(MAX_MESSAGE_CHARS)).is_ok());
        assert!(validate_content(&"a".repeat(MAX_MESSAGE_CHARS + 1)).is_err());
    }

    #[test]
    fn test_page_size_clamps() {
        assert_eq!(page_size(None), 50);
        assert_eq!(page_size(Some(0)), 1);
        assert_eq!(page_size(Some(1000)), 200);
        assert_eq!(page_size(Some(20)), 20);
    }
}

//! Connection rules.
//!
//! A connection always pairs one NGO with one artisan. Either side may send the
//! request; only the other side may accept or reject it. A rejected pair can be
//! requested again, which reopens the same row.

use uuid::Uuid;

use crate::errors::AppError;
use crate::models::connection::{ConnectionRow, ConnectionStatus};
use crate::models::user::Role;

/// What a new request does to the pair's row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPlan {
    Create,
    Reopen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    pub fn target_status(&self) -> ConnectionStatus {
        match self {
            Decision::Accept => ConnectionStatus::Accepted,
            Decision::Reject => ConnectionStatus::Rejected,
        }
    }
}

/// Orders the two parties as `(ngo_id, artisan_id)`. `target_role` is `None`
/// when no such user exists.
pub fn assign_pair(
    caller: Uuid,
    caller_role: Role,
    target: Uuid,
    target_role: Option<Role>,
) -> Result<(Uuid, Uuid), AppError> {
    if caller == target {
        return Err(AppError::Validation(
            "You cannot connect with yourself".to_string(),
        ));
    }
    let target_role = target_role
        .ok_or_else(|| AppError::Validation(format!("User {target} does not exist")))?;
    match (caller_role, target_role) {
        (Role::Ngo, Role::Artisan) => Ok((caller, target)),
        (Role::Artisan, Role::Ngo) => Ok((target, caller)),
        _ => Err(AppError::Validation(
            "Connections link an NGO with an artisan".to_string(),
        )),
    }
}

pub fn plan_request(existing: Option<ConnectionStatus>) -> Result<RequestPlan, AppError> {
    match existing {
        None => Ok(RequestPlan::Create),
        Some(ConnectionStatus::Rejected) => Ok(RequestPlan::Reopen),
        Some(ConnectionStatus::Pending) => Err(AppError::Conflict(
            "A connection request between you is already pending".to_string(),
        )),
        Some(ConnectionStatus::Accepted) => Err(AppError::Conflict(
            "You are already connected".to_string(),
        )),
    }
}

/// Only the party who did not send the request may answer it, and only once.
pub fn check_decision(connection: &ConnectionRow, responder: Uuid) -> Result<(), AppError> {
    if !connection.involves(responder) {
        return Err(AppError::Forbidden(
            "You are not a party to this connection".to_string(),
        ));
    }
    if connection.requested_by == responder {
        return Err(AppError::Forbidden(
            "Only the recipient can respond to a connection request".to_string(),
        ));
    }
    match connection.status()? {
        ConnectionStatus::Pending => Ok(()),
        other => Err(AppError::Conflict(format!(
            "Connection is already {}",
            other.as_str()
        ))),
    }
}

/// Either party may withdraw a request or disconnect.
pub fn check_removal(connection: &ConnectionRow, caller: Uuid) -> Result<(), AppError> {
    if connection.involves(caller) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You are not a party to this connection".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn connection(status: ConnectionStatus, requested_by_ngo: bool) -> ConnectionRow {
        let ngo_id = Uuid::new_v4();
        let artisan_id = Uuid::new_v4();
        ConnectionRow {
            id: Uuid::new_v4(),
            ngo_id,
            artisan_id,
            requested_by: if requested_by_ngo { ngo_id } else { artisan_id },
            status: status.as_str().to_string(),
            created_at: Utc::now(),
            responded_at: None,
        }
    }

    #[test]
    fn test_assign_pair_orders_ngo_first() {
        let ngo = Uuid::new_v4();
        let artisan = Uuid::new_v4();
        assert_eq!(
            assign_pair(ngo, Role::Ngo, artisan, Some(Role::Artisan)).unwrap(),
            (ngo, artisan)
        );
        assert_eq!(
            assign_pair(artisan, Role::Artisan, ngo, Some(Role::Ngo)).unwrap(),
            (ngo, artisan)
        );
    }

    #[test]
    fn test_assign_pair_rejects_same_side_and_plain_users() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert!(assign_pair(a, Role::Ngo, b, Some(Role::Ngo)).is_err());
        assert!(assign_pair(a, Role::Artisan, b, Some(Role::Artisan)).is_err());
        assert!(assign_pair(a, Role::User, b, Some(Role::Artisan)).is_err());
        assert!(assign_pair(a, Role::Ngo, b, Some(Role::User)).is_err());
    }

    #[test]
    fn test_assign_pair_rejects_self() {
        let a = Uuid::new_v4();
        assert!(matches!(
            assign_pair(a, Role::Ngo, a, Some(Role::Artisan)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_assign_pair_rejects_unknown_target() {
        let result = assign_pair(Uuid::new_v4(), Role::Ngo, Uuid::new_v4(), None);
        assert!(matches!(result, Err(AppError::Validation(msg)) if msg.contains("does not exist")));
    }

    #[test]
    fn test_plan_request() {
        assert_eq!(plan_request(None).unwrap(), RequestPlan::Create);
        assert_eq!(
            plan_request(Some(ConnectionStatus::Rejected)).unwrap(),
            RequestPlan::Reopen
        );
        assert!(matches!(
            plan_request(Some(ConnectionStatus::Pending)),
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            plan_request(Some(ConnectionStatus::Accepted)),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_recipient_can_respond_to_pending() {
        let conn = connection(ConnectionStatus::Pending, true);
        assert!(check_decision(&conn, conn.artisan_id).is_ok());
    }

    #[test]
    fn test_requester_cannot_respond_to_own_request() {
        let conn = connection(ConnectionStatus::Pending, true);
        assert!(matches!(
            check_decision(&conn, conn.ngo_id),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_outsider_cannot_respond() {
        let conn = connection(ConnectionStatus::Pending, false);
        assert!(matches!(
            check_decision(&conn, Uuid::new_v4()),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_cannot_respond_twice() {
        let conn = connection(ConnectionStatus::Accepted, false);
        assert!(matches!(
            check_decision(&conn, conn.ngo_id),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_either_party_can_remove() {
        let conn = connection(ConnectionStatus::Accepted, true);
        assert!(check_removal(&conn, conn.ngo_id).is_ok());
        assert!(check_removal(&conn, conn.artisan_id).is_ok());
        assert!(check_removal(&conn, Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_decision_targets() {
        assert_eq!(Decision::Accept.target_status(), ConnectionStatus::Accepted);
        assert_eq!(Decision::Reject.target_status(), ConnectionStatus::Rejected);
    }
}

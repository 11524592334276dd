use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DonationRow {
    pub id: Uuid,
    pub donor_id: Uuid,
    pub recipient_id: Uuid,
    /// Integer amount in the currency's minor unit (paise, cents).
    pub amount_minor: i64,
    pub currency: String,
    pub note: Option<String>,
    pub anonymous: bool,
    pub created_at: DateTime<Utc>,
}

/// Donation as shown to its recipient: anonymous donors are hidden.
#[derive(Debug, Clone, Serialize)]
pub struct ReceivedDonation {
    pub id: Uuid,
    pub donor_id: Option<Uuid>,
    pub amount_minor: i64,
    pub currency: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<DonationRow> for ReceivedDonation {
    fn from(row: DonationRow) -> Self {
        ReceivedDonation {
            id: row.id,
            donor_id: (!row.anonymous).then_some(row.donor_id),
            amount_minor: row.amount_minor,
            currency: row.currency,
            note: row.note,
            created_at: row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(anonymous: bool) -> DonationRow {
        DonationRow {
            id: Uuid::new_v4(),
            donor_id: Uuid::new_v4(),
            recipient_id: Uuid::new_v4(),
            amount_minor: 50_000,
            currency: "INR".to_string(),
            note: Some("For the loom repairs".to_string()),
            anonymous,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_anonymous_donor_is_hidden_from_recipient() {
        let view = ReceivedDonation::from(row(true));
        assert_eq!(view.donor_id, None);
        assert_eq!(view.note.as_deref(), Some("For the loom repairs"));
    }

    #[test]
    fn test_named_donor_is_visible() {
        let donation = row(false);
        let donor = donation.donor_id;
        assert_eq!(ReceivedDonation::from(donation).donor_id, Some(donor));
    }
}

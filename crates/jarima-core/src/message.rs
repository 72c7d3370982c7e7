use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// What a message body was recognized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Body matched neither known pattern.
    Unclassified,
    /// Traffic/parking violation notice.
    Fine,
    /// Payment reminder referencing a previously issued fine.
    Reminder,
}

/// An in-progress record, built up stage by stage (frame → classify → link)
/// before its first insert. Identity is assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDraft {
    /// Sender address as reported by the modem.
    pub sender: String,
    /// Receive time from the modem listing, timezone suffix stripped.
    pub received_date: Option<NaiveDateTime>,
    /// Raw message body.
    pub text: String,
    pub classification: Classification,
    pub car_number: Option<String>,
    pub article: Option<String>,
    pub street: Option<String>,
    pub date_of_fine: Option<NaiveDateTime>,
    pub receipt_number: Option<String>,
    pub amount: Option<i64>,
    /// Payment term in days, counted from the date of the fine.
    pub term_days: Option<i64>,
    /// Either parsed directly from a reminder body or derived as
    /// `date_of_fine + term_days`. Once set it is never overwritten.
    pub last_date_of_payment: Option<NaiveDateTime>,
    /// True once classification (and, for reminders, linking) succeeded.
    pub parsed: bool,
    pub created_date: NaiveDateTime,
}

impl MessageDraft {
    /// Base record for a framed message, before any classification.
    pub fn new(sender: &str, received_date: Option<NaiveDateTime>, text: &str) -> Self {
        Self {
            sender: sender.to_string(),
            received_date,
            text: text.to_string(),
            classification: Classification::Unclassified,
            car_number: None,
            article: None,
            street: None,
            date_of_fine: None,
            receipt_number: None,
            amount: None,
            term_days: None,
            last_date_of_payment: None,
            parsed: false,
            created_date: Local::now().naive_local(),
        }
    }
}

/// A persisted message record, as read back from the store.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoredMessage {
    pub id: i64,
    pub sender: String,
    pub received_date: Option<NaiveDateTime>,
    pub text: String,
    pub classification: Classification,
    pub car_number: Option<String>,
    pub article: Option<String>,
    pub street: Option<String>,
    pub date_of_fine: Option<NaiveDateTime>,
    pub receipt_number: Option<String>,
    pub amount: Option<i64>,
    pub term_days: Option<i64>,
    pub last_date_of_payment: Option<NaiveDateTime>,
    pub parsed: bool,
    pub created_date: NaiveDateTime,
    /// Set only after the device confirmed the message slot was cleared.
    pub deleted: bool,
}

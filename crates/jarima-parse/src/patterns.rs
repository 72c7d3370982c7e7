//! The three fixed extraction patterns.
//!
//! One frames stored-message blocks out of the bulk `AT+CMGL="ALL"` response;
//! the other two pull typed fields out of a single body. The pattern text is
//! part of the wire contract with the device and the carrier's message
//! layout; the boilerplate runs between captures carry no meaning beyond
//! positional separation.

use once_cell::sync::Lazy;
use regex::Regex;

/// Frames one stored message per match. The modem separates messages with a
/// trailing blank line, so the body capture is non-greedy up to the next
/// double newline — the only frame boundary signal available.
static SMS_FRAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?s)\+CMGL: (?P<index>\d{1,2}),+"[\w ]+","(?P<sender>[+\w]*)","","(?P<time>[+\w/ :]*)"(?P<text>.*?)(?:\r?\n){2}"#,
    )
    .unwrap()
});

/// Fine-notice body: car number, article, street up to a colon, fine
/// date-time, receipt number, amount, and the payment term in days after
/// the keyword "chabarebidan" ("from delivery").
static FINE_BODY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s): (?P<car>[\w\d\-_]+), \w+ \w+[\w-]+[^\d](?P<article>[\d-]+)[\w .]+:(?P<street>[\w\d .:]+),[a-zA-Z :]+(?P<time>[+\w/ :]*), [a-zA-Z: ]+: (?P<receipt>\w+), [a-zA-Z:]+ (?P<amount>\d+).+chabarebidan (?P<term>\d+)",
    )
    .unwrap()
});

/// Reminder body: receipt number after the keyword "qvitris" ("of the
/// receipt"), then a dot-separated due date.
static REMINDER_BODY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"qvitris (?P<receipt>\w+)[a-zA-Z ]+(?P<due>[\d.]+)").unwrap());

/// One stored-message block recovered from the bulk listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedSms {
    /// Device-side slot index, used to issue the delete command.
    pub index: String,
    pub sender: String,
    /// Raw receive-time string as reported by the modem.
    pub time: String,
    pub text: String,
}

/// Fields captured from a fine-notice body, still as raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FineFields {
    pub car_number: String,
    pub article: String,
    pub street: String,
    pub time: String,
    pub receipt_number: String,
    pub amount: String,
    pub term: String,
}

/// Fields captured from a reminder body, still as raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderFields {
    pub receipt_number: String,
    pub due_date: String,
}

/// Extract every framed message from the combined listing response, in the
/// order the device reported them.
pub fn frame_messages(response: &str) -> Vec<FramedSms> {
    SMS_FRAME
        .captures_iter(response)
        .map(|caps| FramedSms {
            index: caps["index"].trim().to_string(),
            sender: caps["sender"].trim().to_string(),
            time: caps["time"].trim().to_string(),
            text: caps["text"].trim().to_string(),
        })
        .collect()
}

/// Match a body against the fine-notice layout. No match is a legitimate
/// outcome, not an error.
pub fn match_fine(text: &str) -> Option<FineFields> {
    FINE_BODY.captures(text).map(|caps| FineFields {
        car_number: caps["car"].trim().to_string(),
        article: caps["article"].trim().to_string(),
        street: caps["street"].trim().to_string(),
        time: caps["time"].trim().to_string(),
        receipt_number: caps["receipt"].trim().to_string(),
        amount: caps["amount"].trim().to_string(),
        term: caps["term"].trim().to_string(),
    })
}

/// Match a body against the reminder layout.
pub fn match_reminder(text: &str) -> Option<ReminderFields> {
    REMINDER_BODY.captures(text).map(|caps| ReminderFields {
        receipt_number: caps["receipt"].trim().to_string(),
        due_date: caps["due"].trim().to_string(),
    })
}

//! Per-message classification and reminder linking.
//!
//! Each stage takes a record and returns an updated one; nothing mutates
//! shared state. The store lookup for linking happens in the ingestion
//! loop, which then hands the prior fine to [`link_reminder`].

use chrono::Duration;
use jarima_core::message::{Classification, MessageDraft, StoredMessage};
use tracing::info;

use crate::patterns::{self, FineFields, FramedSms, ReminderFields};
use crate::primitives;

/// The modem's receive-time layout, after the timezone suffix is stripped.
const RECEIVED_TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";
/// Date-time layout used inside fine-notice bodies.
const FINE_TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";
/// Reminder due dates, after dots are reformatted to slashes.
const DUE_DATE_FORMAT: &str = "%d/%m/%Y";

/// Turn a framed message into a classified draft. Fine match is tried
/// first; a fine-shaped body is never tested against the reminder pattern.
pub fn classify(frame: &FramedSms) -> MessageDraft {
    // Only the local date/time is retained from the modem's "+zz" form.
    let received_date = frame
        .time
        .split('+')
        .next()
        .and_then(|t| primitives::parse_date_time(t.trim(), Some(RECEIVED_TIME_FORMAT)));

    let draft = MessageDraft::new(&frame.sender, received_date, &frame.text);

    if frame.text.is_empty() {
        return draft;
    }

    if let Some(fields) = patterns::match_fine(&frame.text) {
        apply_fine(draft, fields)
    } else if let Some(fields) = patterns::match_reminder(&frame.text) {
        apply_reminder(draft, fields)
    } else {
        info!("message from {} did not match any known layout", frame.sender);
        draft
    }
}

fn apply_fine(mut draft: MessageDraft, fields: FineFields) -> MessageDraft {
    draft.date_of_fine = primitives::parse_date_time(&fields.time, Some(FINE_TIME_FORMAT));
    draft.amount = primitives::parse_integer(&fields.amount, None);
    draft.term_days = primitives::parse_integer(&fields.term, None);
    draft.car_number = Some(fields.car_number);
    draft.article = Some(fields.article);
    draft.street = Some(fields.street);
    draft.receipt_number = Some(fields.receipt_number);

    if let (Some(date), Some(term)) = (draft.date_of_fine, draft.term_days) {
        draft.last_date_of_payment = Some(date + Duration::days(term));
    }

    draft.classification = Classification::Fine;
    draft.parsed = true;
    draft
}

fn apply_reminder(mut draft: MessageDraft, fields: ReminderFields) -> MessageDraft {
    // "15.02.2024." → "15/02/2024": drop a trailing separator, then
    // reformat dots to slashes.
    let due = fields.due_date.trim_end_matches('.').replace('.', "/");
    draft.last_date_of_payment = primitives::parse_date_time(&due, Some(DUE_DATE_FORMAT));
    draft.receipt_number = Some(fields.receipt_number);

    // Parsed stays false until the originating fine is found; the tag is
    // kept either way.
    draft.classification = Classification::Reminder;
    draft
}

/// Backfill a reminder draft from its originating fine record. The due
/// date, once set by either path, is never overwritten.
pub fn link_reminder(mut draft: MessageDraft, fine: &StoredMessage) -> MessageDraft {
    draft.car_number = fine.car_number.clone();
    draft.article = fine.article.clone();
    draft.street = fine.street.clone();
    draft.date_of_fine = fine.date_of_fine;
    draft.amount = fine.amount;
    draft.term_days = fine.term_days;

    if draft.last_date_of_payment.is_none() {
        if let (Some(date), Some(term)) = (draft.date_of_fine, draft.term_days) {
            draft.last_date_of_payment = Some(date + Duration::days(term));
        }
    }

    draft.classification = Classification::Reminder;
    draft.parsed = true;
    draft
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const FINE_TEXT: &str = "jarima: AA-001-BB, tqven dajarimdebit-muxli 125-8 safudzvelze. quchaze:Rustaveli 12, darghvevis dro: 15/01/2024 10:30:00, qvitris nomeri: AA12345, tanxa: 50 lari. gadaixadet chabarebidan 30 dghis vadashi";

    const REMINDER_TEXT: &str =
        "shegakhsenebt rom qvitris AA12345 gadakhdis bolo vadaa 15.02.2024.";

    fn frame(text: &str) -> FramedSms {
        FramedSms {
            index: "1".to_string(),
            sender: "POLICE".to_string(),
            time: "2024/01/15 10:35:00+04".to_string(),
            text: text.to_string(),
        }
    }

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    fn stored_fine() -> StoredMessage {
        StoredMessage {
            id: 1,
            sender: "POLICE".to_string(),
            received_date: Some(dt(2024, 1, 15, 10, 35, 0)),
            text: FINE_TEXT.to_string(),
            classification: Classification::Fine,
            car_number: Some("AA-001-BB".to_string()),
            article: Some("125-8".to_string()),
            street: Some("Rustaveli 12".to_string()),
            date_of_fine: Some(dt(2024, 1, 15, 10, 30, 0)),
            receipt_number: Some("AA12345".to_string()),
            amount: Some(50),
            term_days: Some(30),
            last_date_of_payment: Some(dt(2024, 2, 14, 10, 30, 0)),
            parsed: true,
            created_date: dt(2024, 1, 15, 10, 35, 1),
            deleted: false,
        }
    }

    #[test]
    fn fine_body_classifies_as_fine() {
        let draft = classify(&frame(FINE_TEXT));
        assert_eq!(draft.classification, Classification::Fine);
        assert!(draft.parsed);
        assert_eq!(draft.car_number.as_deref(), Some("AA-001-BB"));
        assert_eq!(draft.article.as_deref(), Some("125-8"));
        assert_eq!(draft.street.as_deref(), Some("Rustaveli 12"));
        assert_eq!(draft.date_of_fine, Some(dt(2024, 1, 15, 10, 30, 0)));
        assert_eq!(draft.receipt_number.as_deref(), Some("AA12345"));
        assert_eq!(draft.amount, Some(50));
        assert_eq!(draft.term_days, Some(30));
        // date_of_fine + 30 days
        assert_eq!(draft.last_date_of_payment, Some(dt(2024, 2, 14, 10, 30, 0)));
    }

    #[test]
    fn fine_takes_precedence_over_reminder_match() {
        // A body that satisfies BOTH patterns must still classify as a fine.
        let both = format!("{FINE_TEXT} qvitris AA12345 gadakhdis bolo vadaa 15.02.2024.");
        assert!(patterns::match_reminder(&both).is_some());
        let draft = classify(&frame(&both));
        assert_eq!(draft.classification, Classification::Fine);
        assert!(draft.parsed);
    }

    #[test]
    fn received_time_strips_zone_suffix() {
        let draft = classify(&frame("whatever"));
        assert_eq!(draft.received_date, Some(dt(2024, 1, 15, 10, 35, 0)));
    }

    #[test]
    fn malformed_received_time_is_absent() {
        let mut f = frame("whatever");
        f.time = "garbage".to_string();
        let draft = classify(&f);
        assert_eq!(draft.received_date, None);
    }

    #[test]
    fn reminder_body_is_tagged_but_unparsed() {
        let draft = classify(&frame(REMINDER_TEXT));
        assert_eq!(draft.classification, Classification::Reminder);
        assert!(!draft.parsed);
        assert_eq!(draft.receipt_number.as_deref(), Some("AA12345"));
        // Dot date reformatted, trailing separator dropped, parsed to midnight.
        assert_eq!(draft.last_date_of_payment, Some(dt(2024, 2, 15, 0, 0, 0)));
        assert!(draft.car_number.is_none());
    }

    #[test]
    fn free_text_stays_unclassified() {
        let draft = classify(&frame("gamarjoba, khval shevxvdebit?"));
        assert_eq!(draft.classification, Classification::Unclassified);
        assert!(!draft.parsed);
    }

    #[test]
    fn linking_backfills_fine_fields() {
        let draft = classify(&frame(REMINDER_TEXT));
        let linked = link_reminder(draft, &stored_fine());
        assert_eq!(linked.classification, Classification::Reminder);
        assert!(linked.parsed);
        assert_eq!(linked.car_number.as_deref(), Some("AA-001-BB"));
        assert_eq!(linked.article.as_deref(), Some("125-8"));
        assert_eq!(linked.street.as_deref(), Some("Rustaveli 12"));
        assert_eq!(linked.date_of_fine, Some(dt(2024, 1, 15, 10, 30, 0)));
        assert_eq!(linked.amount, Some(50));
        assert_eq!(linked.term_days, Some(30));
        // The reminder carried its own due date; it must not be overwritten.
        assert_eq!(linked.last_date_of_payment, Some(dt(2024, 2, 15, 0, 0, 0)));
    }

    #[test]
    fn linking_derives_due_date_when_reminder_had_none() {
        // Reminder with a receipt but an unparsable due date.
        let draft = classify(&frame("qvitris AA12345 gadaukhdelia."));
        assert_eq!(draft.classification, Classification::Reminder);
        assert!(draft.last_date_of_payment.is_none());

        let linked = link_reminder(draft, &stored_fine());
        assert_eq!(linked.last_date_of_payment, Some(dt(2024, 2, 14, 10, 30, 0)));
    }
}

//! Per-run ingestion loop: frame the bulk listing, then for each message
//! classify → link → persist → delete-from-device, in listing order.

use jarima_core::message::Classification;
use jarima_core::JarimaError;
use jarima_modem::{ModemSession, SerialLink};
use jarima_parse::primitives;
use jarima_parse::{classify, frame_messages, link_reminder};
use jarima_store::Store;
use tracing::{info, warn};

/// Outcome counts for one ingestion run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub processed: usize,
    pub saved: usize,
    pub removed: usize,
}

/// Owns the serial session and the store handle for the duration of one
/// strictly sequential run.
pub struct Ingestor<L: SerialLink> {
    session: ModemSession<L>,
    store: Store,
}

impl<L: SerialLink> Ingestor<L> {
    pub fn new(session: ModemSession<L>, store: Store) -> Self {
        Self { session, store }
    }

    /// One full run. Only the liveness probe aborts; every later failure is
    /// logged and skipped. The serial line is released when the session
    /// drops, on every path.
    pub async fn run(mut self) -> Result<RunReport, JarimaError> {
        self.session.init().await?;

        let listing = self.session.list_messages().await?;
        let frames = frame_messages(&listing);

        if frames.is_empty() {
            info!("no messages found on device");
            return Ok(RunReport::default());
        }

        let mut report = RunReport::default();
        for frame in &frames {
            report.processed += 1;

            let mut draft = classify(frame);

            // Reminders resolve their originating fine by receipt number.
            if draft.classification == Classification::Reminder && !draft.parsed {
                if let Some(receipt) = draft.receipt_number.clone() {
                    match self.store.find_fine_by_receipt(&receipt).await? {
                        Some(fine) => draft = link_reminder(draft, &fine),
                        None => info!("no fine on record for receipt {receipt}"),
                    }
                }
            }

            let id = self.store.add(&draft).await?;
            report.saved += 1;
            info!("Message has successfully saved into database (id {id})");

            // Persist first, confirm the device-side delete second; the
            // soft-delete flag only flips on explicit acknowledgment.
            match primitives::parse_integer(&frame.index, None) {
                Some(index) => {
                    if self.session.delete_message(index).await? {
                        self.store.mark_deleted(id).await?;
                        report.removed += 1;
                        info!("Message has successfully removed from phone");
                    } else {
                        warn!("device did not acknowledge deletion of slot {index}");
                    }
                }
                None => warn!(
                    "slot index {:?} is not numeric, leaving message on device",
                    frame.index
                ),
            }
        }

        info!(
            "batch complete: {} processed, {} saved, {} removed",
            report.processed, report.saved, report.removed
        );
        Ok(report)
    }
}

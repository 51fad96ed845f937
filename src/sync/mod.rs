//! Sync core
//!
//! The multi-provider sync engine: status derivation, retry/enqueue
//! control, the cron-invoked batch worker, and metadata backfill.

pub mod backfill;
pub mod pacer;
pub mod retry;
pub mod status;
pub mod worker;

pub use backfill::MetadataBackfill;
pub use pacer::Pacer;
pub use retry::{RetryController, RetryOutcome};
pub use status::{DerivedSyncStatus, OverallStatus, ProviderStatus, StatusService};
pub use worker::{BatchReport, BatchWorker};

/// Canonical form of a style identifier: whitespace folded, uppercase.
///
/// Every entry point normalizes before any lookup; the catalog stores only
/// canonical ids.
pub fn normalize_style_id(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::normalize_style_id;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_style_id("  dd1391-100 "), "DD1391-100");
        assert_eq!(normalize_style_id("cw2288\t111"), "CW2288 111");
        assert_eq!(normalize_style_id("DD1391-100"), "DD1391-100");
    }
}

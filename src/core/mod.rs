/// Pure text extractors for prices, bonuses, programs and destinations
pub mod extract;
/// The ingestion cycle: fetch, deduplicate, persist, notify
pub mod ingest;
/// Promotion records and their fingerprint
pub mod promotion;
/// Dashboard read accessors
pub mod query;
/// Deduplicating store and aggregates
pub mod store;
/// Secret-guarded trigger and health probe
pub mod trigger;

pub use ingest::{CycleReport, Ingestor};
pub use promotion::PromotionRecord;

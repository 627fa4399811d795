//! Project state record and its single write path.
//!
//! The record is a flat JSON document shared with the external worker.
//! Every controller transition is one [`StateStore::merge`] call with a
//! typed [`StateUpdate`]; nothing else writes `STATE.json`.

mod phase;
mod record;
mod store;

pub use phase::Phase;
pub use record::{Field, StateRecord, StateUpdate};
pub use store::StateStore;

/// Seconds since the Unix epoch, with millisecond precision.
pub fn now_epoch() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

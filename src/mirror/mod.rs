//! The listing mirror: a best-effort local copy of one remote ad collection.

mod manager;
mod types;

pub use manager::ListingMirror;
pub use types::{LoadOutcome, LoadSource, MirrorOptions};

//! Free-text search over a mirrored listing set.

use crate::types::Listing;

/// Return the listings matching `query`, preserving input order.
///
/// A listing matches when its concert name, poster name, or price text
/// contains the query as a case-insensitive substring. The empty query
/// matches everything. Pure and synchronous; callers recompute it on every
/// keystroke.
pub fn filter(listings: &[Listing], query: &str) -> Vec<Listing> {
    if query.is_empty() {
        return listings.to_vec();
    }
    let needle = query.to_lowercase();
    listings
        .iter()
        .filter(|listing| {
            listing.concert_name.to_lowercase().contains(&needle)
                || listing.user_name.to_lowercase().contains(&needle)
                || listing.price_range.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Shared data types: collections, documents, listings, and the form/patch
//! inputs that feed mutations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::RemoteError;

/// Collection holding user profile documents (`{ "name": ... }`).
pub const USERS_COLLECTION: &str = "users";

// ============================================================================
// AdCollection
// ============================================================================

/// The two ad collections. A listing belongs to exactly one of them for its
/// whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdCollection {
    Buyer,
    Seller,
}

impl AdCollection {
    /// Remote collection name, also used as the snapshot cache key.
    pub fn wire_name(&self) -> &'static str {
        match self {
            AdCollection::Buyer => "buyerAds",
            AdCollection::Seller => "sellerAds",
        }
    }
}

impl std::fmt::Display for AdCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

// ============================================================================
// Document
// ============================================================================

/// A raw document from the remote store: server-assigned id plus a JSON
/// object of fields. The id is the document key and never appears inside
/// `fields`.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Value,
}

// ============================================================================
// Listing
// ============================================================================

/// One posted ad.
///
/// `id` and `created_at` are server-assigned. `user_name` is denormalized
/// from the poster's profile at creation time and not kept in sync with
/// later profile edits. Text fields default to empty on deserialization so
/// ragged documents from older app versions never fail to load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    #[serde(default)]
    pub concert_name: String,
    #[serde(default)]
    pub ticket_type: String,
    #[serde(default)]
    pub num_tickets: u32,
    #[serde(default)]
    pub price_range: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    /// Server-assigned creation time, epoch milliseconds, monotone per
    /// collection.
    #[serde(default)]
    pub created_at: i64,
}

impl Listing {
    /// Decode a remote document into a listing.
    pub fn from_document(collection: &str, doc: &Document) -> Result<Self, RemoteError> {
        let mut value = doc.fields.clone();
        if let Some(obj) = value.as_object_mut() {
            obj.insert("id".to_string(), json!(doc.id));
        }
        serde_json::from_value(value).map_err(|source| RemoteError::Malformed {
            collection: collection.to_string(),
            id: doc.id.clone(),
            source,
        })
    }

    /// The full field document written on create/update. The id stays out of
    /// the fields; it is the document key.
    pub fn to_fields(&self) -> Value {
        let mut fields = json!({
            "concertName": self.concert_name,
            "ticketType": self.ticket_type,
            "numTickets": self.num_tickets,
            "priceRange": self.price_range,
            "location": self.location,
            "phoneNumber": self.phone_number,
            "userId": self.user_id,
            "userName": self.user_name,
            "createdAt": self.created_at,
        });
        if let Some(date) = self.event_date {
            fields["eventDate"] = json!(date);
        }
        if let Some(ref url) = self.image_url {
            fields["imageUrl"] = json!(url);
        }
        fields
    }
}

// ============================================================================
// ListingForm
// ============================================================================

/// Raw form input for posting a new ad. Numeric fields arrive as the text
/// the user typed; `validate::validate_form` parses and checks them.
#[derive(Debug, Clone, Default)]
pub struct ListingForm {
    pub concert_name: String,
    pub ticket_type: String,
    pub num_tickets: String,
    pub price_range: String,
    pub location: String,
    pub phone_number: String,
    pub event_date: Option<NaiveDate>,
    pub image_url: Option<String>,
}

/// A validated form: same fields with `num_tickets` parsed. Produced only by
/// `validate::validate_form`.
#[derive(Debug, Clone)]
pub struct ListingDraft {
    pub concert_name: String,
    pub ticket_type: String,
    pub num_tickets: u32,
    pub price_range: String,
    pub location: String,
    pub phone_number: String,
    pub event_date: Option<NaiveDate>,
    pub image_url: Option<String>,
}

impl ListingDraft {
    /// The field document submitted on create. `createdAt` is left out; the
    /// remote store assigns it.
    pub fn to_fields(&self, user_id: &str, user_name: &str) -> Value {
        let mut fields = json!({
            "concertName": self.concert_name,
            "ticketType": self.ticket_type,
            "numTickets": self.num_tickets,
            "priceRange": self.price_range,
            "location": self.location,
            "phoneNumber": self.phone_number,
            "userId": user_id,
            "userName": user_name,
        });
        if let Some(date) = self.event_date {
            fields["eventDate"] = json!(date);
        }
        if let Some(ref url) = self.image_url {
            fields["imageUrl"] = json!(url);
        }
        fields
    }
}

// ============================================================================
// ListingPatch
// ============================================================================

/// Field-optional overlay for editing an existing listing. `None` keeps the
/// current value; there is no way to clear a field back to absent.
#[derive(Debug, Clone, Default)]
pub struct ListingPatch {
    pub concert_name: Option<String>,
    pub ticket_type: Option<String>,
    pub num_tickets: Option<u32>,
    pub price_range: Option<String>,
    pub location: Option<String>,
    pub phone_number: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub image_url: Option<String>,
}

impl ListingPatch {
    /// Overlay this patch on an existing listing. Identity and server fields
    /// (`id`, `user_id`, `user_name`, `created_at`) are never touched.
    pub fn apply(&self, current: &Listing) -> Listing {
        Listing {
            id: current.id.clone(),
            concert_name: self
                .concert_name
                .clone()
                .unwrap_or_else(|| current.concert_name.clone()),
            ticket_type: self
                .ticket_type
                .clone()
                .unwrap_or_else(|| current.ticket_type.clone()),
            num_tickets: self.num_tickets.unwrap_or(current.num_tickets),
            price_range: self
                .price_range
                .clone()
                .unwrap_or_else(|| current.price_range.clone()),
            location: self
                .location
                .clone()
                .unwrap_or_else(|| current.location.clone()),
            phone_number: self
                .phone_number
                .clone()
                .unwrap_or_else(|| current.phone_number.clone()),
            event_date: self.event_date.or(current.event_date),
            image_url: self.image_url.clone().or_else(|| current.image_url.clone()),
            user_id: current.user_id.clone(),
            user_name: current.user_name.clone(),
            created_at: current.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

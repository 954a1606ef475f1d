//! The canonical input validation policy, shared by create and update so
//! every entry point enforces the same rules.
//!
//! All checks for a submission run before any network call; failures are
//! collected into one `ValidationError` listing every bad field.

use std::sync::OnceLock;

use chrono::NaiveDate;

use crate::error::{ValidationError, ValidationIssue};
use crate::types::{Listing, ListingDraft, ListingForm};

static PHONE_REGEX: OnceLock<regex::Regex> = OnceLock::new();

fn phone_regex() -> &'static regex::Regex {
    PHONE_REGEX.get_or_init(|| regex::Regex::new(r"^[0-9]{10}$").expect("phone regex is valid"))
}

fn issue(field: &str, message: &str) -> ValidationIssue {
    ValidationIssue {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn require_text(issues: &mut Vec<ValidationIssue>, field: &str, value: &str) {
    if value.trim().is_empty() {
        issues.push(issue(field, "must not be empty"));
    }
}

fn check_phone(issues: &mut Vec<ValidationIssue>, value: &str) {
    if !phone_regex().is_match(value.trim()) {
        issues.push(issue("phoneNumber", "must be exactly 10 digits"));
    }
}

/// Validate a new-ad form. `today` is the poster's current date; when an
/// event date is given it must lie strictly after it.
pub fn validate_form(form: &ListingForm, today: NaiveDate) -> Result<ListingDraft, ValidationError> {
    let mut issues = Vec::new();

    require_text(&mut issues, "concertName", &form.concert_name);
    require_text(&mut issues, "ticketType", &form.ticket_type);
    require_text(&mut issues, "priceRange", &form.price_range);
    require_text(&mut issues, "location", &form.location);
    check_phone(&mut issues, &form.phone_number);

    let num_tickets = match form.num_tickets.trim().parse::<u32>() {
        Ok(n) if n > 0 => n,
        _ => {
            issues.push(issue("numTickets", "must be a positive number"));
            0
        }
    };

    if let Some(date) = form.event_date {
        if date <= today {
            issues.push(issue("eventDate", "must be in the future"));
        }
    }

    if !issues.is_empty() {
        return Err(ValidationError(issues));
    }

    Ok(ListingDraft {
        concert_name: form.concert_name.trim().to_string(),
        ticket_type: form.ticket_type.trim().to_string(),
        num_tickets,
        price_range: form.price_range.trim().to_string(),
        location: form.location.trim().to_string(),
        phone_number: form.phone_number.trim().to_string(),
        event_date: form.event_date,
        image_url: form.image_url.clone(),
    })
}

/// Validate an edited listing before it overwrites the remote document.
///
/// Same text and phone rules as posting. Futurity of the event date is not
/// re-checked: the concert may legitimately have passed since the ad went up.
pub fn validate_listing(listing: &Listing) -> Result<(), ValidationError> {
    let mut issues = Vec::new();

    require_text(&mut issues, "concertName", &listing.concert_name);
    require_text(&mut issues, "ticketType", &listing.ticket_type);
    require_text(&mut issues, "priceRange", &listing.price_range);
    require_text(&mut issues, "location", &listing.location);
    check_phone(&mut issues, &listing.phone_number);

    if listing.num_tickets == 0 {
        issues.push(issue("numTickets", "must be a positive number"));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError(issues))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

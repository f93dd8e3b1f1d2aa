//! Identifier allocation for new records.

use uuid::Uuid;

/// Opaque record identifier, stored as text in the persisted form.
pub type RecordId = String;

/// Allocates a fresh identifier.
///
/// Uses random UUID v4 text, so successive calls from the same process do not
/// collide in practice. This function cannot fail.
pub fn new_id() -> RecordId {
    Uuid::new_v4().to_string()
}

//! Document identifier rules.

/// Maximum size of a document ID in bytes.
pub const MAX_DOCUMENT_ID_BYTES: usize = 1500;

/// Check whether `id` can name a document in the store.
///
/// A malformed identifier is treated by callers as "no such document"
/// rather than an error, so this never needs to explain what is wrong.
pub fn is_valid_document_id(id: &str) -> bool {
    if id.is_empty() || id.len() > MAX_DOCUMENT_ID_BYTES {
        return false;
    }
    if id == "." || id == ".." || id.contains('/') {
        return false;
    }
    // Reserved by the store: __name__ style identifiers
    if id.len() >= 4 && id.starts_with("__") && id.ends_with("__") {
        return false;
    }
    !id.chars().any(|c| c.is_control())
}

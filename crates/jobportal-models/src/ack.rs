//! Write acknowledgements returned to API clients.

use serde::{Deserialize, Serialize};

/// Acknowledgement of a document insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    pub acknowledged: bool,
    /// Store-generated identifier of the new document
    pub inserted_id: String,
}

impl InsertAck {
    pub fn new(inserted_id: impl Into<String>) -> Self {
        Self {
            acknowledged: true,
            inserted_id: inserted_id.into(),
        }
    }
}

/// Acknowledgement of a single-document update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

impl UpdateAck {
    /// The target document existed and was written.
    pub fn matched() -> Self {
        Self {
            acknowledged: true,
            matched_count: 1,
            modified_count: 1,
        }
    }

    /// No document matched the identifier.
    pub fn unmatched() -> Self {
        Self {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_ack_wire_format() {
        let json = serde_json::to_value(InsertAck::new("abc")).unwrap();
        assert_eq!(json, serde_json::json!({"acknowledged": true, "insertedId": "abc"}));
    }

    #[test]
    fn test_update_ack_wire_format() {
        let json = serde_json::to_value(UpdateAck::unmatched()).unwrap();
        assert_eq!(json["matchedCount"], 0);
        assert_eq!(json["modifiedCount"], 0);
    }
}

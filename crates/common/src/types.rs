use serde::{Deserialize, Serialize};

/// Who a message is for and on whose behalf it is sent.
///
/// Both identifiers are opaque: no phone-number format validation is done.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Recipient {
    pub phone_number: String,
    pub company_id: String,
}

impl Recipient {
    pub fn new(phone_number: impl Into<String>, company_id: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            company_id: company_id.into(),
        }
    }
}

/// Fresh opaque identifier for a single send attempt.
#[must_use]
pub fn new_external_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_ids_are_unique() {
        assert_ne!(new_external_id(), new_external_id());
    }
}

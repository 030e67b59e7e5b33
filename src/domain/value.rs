use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::validation::ValidationError;

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9][0-9]{9,14}$").expect("phone pattern is a valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Recipient phone number (`phoneNumber`).
///
/// Invariant: optional leading `+`, first digit `1-9`, then 9 to 14 more ASCII digits.
/// The value is kept exactly as provided; two spellings of the same number are
/// distinct values.
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// JSON field name used on the request boundary and in outcome events.
    pub const FIELD: &'static str = "phoneNumber";

    /// Create a validated [`PhoneNumber`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        if !PHONE_PATTERN.is_match(&value) {
            return Err(ValidationError::InvalidPhoneNumber { input: value });
        }
        Ok(Self(value))
    }

    /// Borrow the number as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// SMS message body (`message`).
///
/// Invariant: non-empty after trimming. The original value (including whitespace) is preserved.
pub struct MessageText(String);

impl MessageText {
    /// JSON field name used on the request boundary and in outcome events.
    pub const FIELD: &'static str = "message";

    /// Create validated message text.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the message text as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Correlation id attached to an outcome event (`eventId`).
///
/// Invariant: non-empty after trimming. Copied into outcomes exactly as provided.
pub struct EventId(String);

impl EventId {
    /// JSON field name used in outcome events.
    pub const FIELD: &'static str = "eventId";

    /// Create a validated [`EventId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the id as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

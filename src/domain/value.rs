use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::domain::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Name of a Base/Collection within a project.
///
/// Invariant: non-empty and not a dot segment. The name is used as given,
/// surrounding whitespace included.
pub struct CollectionName(String);

impl CollectionName {
    pub const FIELD: &'static str = "collection name";

    /// Create a validated [`CollectionName`].
    ///
    /// Errors: [`ValidationError::Empty`] for `""`, `"."` and `".."`.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() || is_dot_segment(&value) {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the name as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Primary key of a stored item.
///
/// Invariant: non-empty and not `.` or `..`, which URL parsers collapse as dot
/// segments even when percent-encoded. Whitespace is preserved, the store treats
/// it as part of the key.
pub struct ItemKey(String);

impl ItemKey {
    /// Item field holding the key.
    pub const FIELD: &'static str = "key";

    /// Create a validated [`ItemKey`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() || is_dot_segment(&value) {
            return Err(ValidationError::InvalidKey { key: value });
        }
        Ok(Self(value))
    }

    /// Borrow the key as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Percent-encoded form, safe to use as a single URL path segment.
    pub fn encoded(&self) -> String {
        encode_path_segment(&self.0)
    }
}

/// Validate `key` and percent-encode it for a URL path segment.
///
/// Every character outside `[A-Za-z0-9*-._]` is escaped, including `/`.
pub fn check_key(key: &str) -> Result<String, ValidationError> {
    Ok(ItemKey::new(key)?.encoded())
}

fn is_dot_segment(value: &str) -> bool {
    matches!(value, "." | "..")
}

pub(crate) fn encode_path_segment(value: &str) -> String {
    // `form_urlencoded` writes spaces as `+` and escapes a literal `+` as `%2B`,
    // so this replacement cannot collide with user input.
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Secret key granting access to a project's collections.
///
/// Invariant: non-empty after trimming.
pub struct DataKey(String);

impl DataKey {
    pub const FIELD: &'static str = "data key";

    /// Create a validated [`DataKey`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Project identifier, the second path segment of every store URL.
///
/// Invariant: non-empty after trimming.
pub struct ProjectId(String);

impl ProjectId {
    pub const FIELD: &'static str = "project ID";

    /// Create a validated [`ProjectId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// API token for the messaging endpoints.
///
/// Invariant: non-empty after trimming.
pub struct ApiToken(String);

impl ApiToken {
    pub const FIELD: &'static str = "Contiguity token";

    /// Create a validated [`ApiToken`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Message body for text messages.
///
/// Invariant: non-empty after trimming. The original value (including whitespace) is preserved.
pub struct MessageText(String);

impl MessageText {
    pub const FIELD: &'static str = "message";

    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Identifier of a sent one-time passcode, returned by `otp/new`.
///
/// Invariant: non-empty after trimming.
pub struct OtpId(String);

impl OtpId {
    pub const FIELD: &'static str = "otp_id";

    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Sending domain registered for email.
///
/// Invariant: non-empty after trimming.
pub struct DomainName(String);

impl DomainName {
    pub const FIELD: &'static str = "domain";

    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
/// Phone number validated against E.164.
///
/// Equality and hashing are based on the E.164 form.
pub struct PhoneNumber {
    raw: String,
    e164: String,
    parsed: phonenumber::PhoneNumber,
}

impl PhoneNumber {
    pub const FIELD: &'static str = "to";

    /// Parse a number with an explicit country prefix and normalize it into E.164.
    pub fn parse(input: impl Into<String>) -> Result<Self, ValidationError> {
        let input = input.into();
        let raw = input.trim().to_owned();
        if raw.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }

        let parsed = phonenumber::parse(None, &raw)
            .map_err(|_| ValidationError::InvalidPhoneNumber { input: raw.clone() })?;
        if !phonenumber::is_valid(&parsed) {
            return Err(ValidationError::InvalidPhoneNumber { input: raw });
        }

        let e164 = phonenumber::format(&parsed)
            .mode(phonenumber::Mode::E164)
            .to_string();

        Ok(Self { raw, e164, parsed })
    }

    /// Raw input after trimming.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Normalized E.164 representation.
    pub fn e164(&self) -> &str {
        &self.e164
    }

    /// The parsed phone number from the `phonenumber` crate.
    pub fn parsed(&self) -> &phonenumber::PhoneNumber {
        &self.parsed
    }
}

impl PartialEq for PhoneNumber {
    fn eq(&self, other: &Self) -> bool {
        self.e164 == other.e164
    }
}

impl Eq for PhoneNumber {}

impl std::hash::Hash for PhoneNumber {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.e164.hash(state);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Unix timestamp in whole seconds.
pub struct UnixTimestamp(u64);

impl UnixTimestamp {
    /// Create a timestamp value (no range validation is performed).
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Current wall-clock time, truncated to whole seconds.
    pub fn now() -> Self {
        SystemTime::now().into()
    }

    /// Get the underlying timestamp in seconds.
    pub fn value(self) -> u64 {
        self.0
    }

    /// Add `duration`, dropping any sub-second remainder.
    pub fn after(self, duration: Duration) -> Self {
        Self(self.0.saturating_add(duration.as_secs()))
    }
}

impl From<SystemTime> for UnixTimestamp {
    /// Times before the epoch clamp to zero.
    fn from(value: SystemTime) -> Self {
        let secs = value
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0);
        Self(secs)
    }
}

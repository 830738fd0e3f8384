use std::time::Duration;

use serde_json::{Map, Value};

use crate::domain::validation::ValidationError;
use crate::domain::value::{DomainName, MessageText, PhoneNumber, UnixTimestamp};

/// Maximum number of items accepted by a single `put`.
pub const PUT_MAX_ITEMS: usize = 30;

/// Page size used by [`Query`] unless overridden.
pub const DEFAULT_QUERY_LIMIT: u32 = 1000;

/// Options shared by write operations (`insert`, `put`, `update`).
///
/// `expire_in` and `expire_at` are mutually exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Expire the item this long after the request is built.
    pub expire_in: Option<Duration>,
    /// Expire the item at this absolute time.
    pub expire_at: Option<UnixTimestamp>,
}

impl WriteOptions {
    pub fn expire_in(duration: Duration) -> Self {
        Self {
            expire_in: Some(duration),
            expire_at: None,
        }
    }

    pub fn expire_at(at: impl Into<UnixTimestamp>) -> Self {
        Self {
            expire_in: None,
            expire_at: Some(at.into()),
        }
    }

    /// Resolve to an absolute expiry relative to `now`, if any is requested.
    pub fn resolve(&self, now: UnixTimestamp) -> Result<Option<UnixTimestamp>, ValidationError> {
        match (self.expire_in, self.expire_at) {
            (Some(_), Some(_)) => Err(ValidationError::ConflictingExpiry),
            (Some(duration), None) => Ok(Some(now.after(duration))),
            (None, at) => Ok(at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Comparison operator usable in a query filter (`"field?op"`).
pub enum Comparator {
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    Prefix,
    Range,
    Contains,
    NotContains,
}

impl Comparator {
    /// Operator suffix used after `?` in a filter field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotEqual => "ne",
            Self::LessThan => "lt",
            Self::GreaterThan => "gt",
            Self::LessThanOrEqual => "lte",
            Self::GreaterThanOrEqual => "gte",
            Self::Prefix => "pfx",
            Self::Range => "r",
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
        }
    }
}

/// One filter object; all of its conditions must hold for an item to match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter(Map<String, Value>);

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`.
    pub fn equals(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Require `field <op> value`, encoded as `"field?op"`.
    pub fn compare(mut self, field: impl AsRef<str>, op: Comparator, value: impl Into<Value>) -> Self {
        self.0
            .insert(format!("{}?{}", field.as_ref(), op.as_str()), value.into());
        self
    }

    /// Borrow the encoded conditions.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Filter {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

/// Query request. The server requires every filter to match; with no filters the
/// whole collection is returned, bounded by the limit.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    filters: Vec<Filter>,
    limit: u32,
    last: Option<String>,
}

impl Query {
    /// Match every item, up to [`DEFAULT_QUERY_LIMIT`] per page.
    pub fn all() -> Self {
        Self::new(Vec::new())
    }

    /// Match items satisfying every filter in `filters`.
    pub fn new(filters: Vec<Filter>) -> Self {
        Self {
            filters,
            limit: DEFAULT_QUERY_LIMIT,
            last: None,
        }
    }

    /// Add another filter that items must also satisfy.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Maximum number of items in one page. Defaults to [`DEFAULT_QUERY_LIMIT`].
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Continue after the cursor returned as `last_key` by a previous page.
    pub fn after(mut self, last_key: impl Into<String>) -> Self {
        self.last = Some(last_key.into());
        self
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn page_limit(&self) -> u32 {
        self.limit
    }

    /// Pagination cursor, if any.
    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }
}

impl Default for Query {
    fn default() -> Self {
        Self::all()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendText {
    to: PhoneNumber,
    message: MessageText,
}

impl SendText {
    pub fn new(to: PhoneNumber, message: MessageText) -> Self {
        Self { to, message }
    }

    /// Validate raw inputs: `to` must be a valid E.164 number, `message` non-empty.
    pub fn parse(to: impl Into<String>, message: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self::new(PhoneNumber::parse(to)?, MessageText::new(message)?))
    }

    pub fn to(&self) -> &PhoneNumber {
        &self.to
    }

    pub fn message(&self) -> &MessageText {
        &self.message
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
/// Language of the passcode message.
pub enum OtpLanguage {
    #[default]
    English,
    Afrikaans,
    Arabic,
    Catalan,
    /// Chinese (Mandarin).
    Chinese,
    /// Chinese (Cantonese).
    Cantonese,
    Croatian,
    Czech,
    Danish,
    Dutch,
    Finnish,
    French,
    German,
    Greek,
    Hebrew,
    Hindi,
    Hungarian,
    Indonesian,
    Italian,
    Japanese,
    Korean,
    Malay,
    Norwegian,
    Polish,
    Portuguese,
    PortugueseBrazil,
    Romanian,
    Russian,
    Spanish,
    Swedish,
    Tagalog,
    Thai,
    Turkish,
    Vietnamese,
}

impl OtpLanguage {
    pub fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Afrikaans => "af",
            Self::Arabic => "ar",
            Self::Catalan => "ca",
            Self::Chinese => "zh",
            Self::Cantonese => "zh-hk",
            Self::Croatian => "hr",
            Self::Czech => "cs",
            Self::Danish => "da",
            Self::Dutch => "nl",
            Self::Finnish => "fi",
            Self::French => "fr",
            Self::German => "de",
            Self::Greek => "el",
            Self::Hebrew => "he",
            Self::Hindi => "hi",
            Self::Hungarian => "hu",
            Self::Indonesian => "id",
            Self::Italian => "it",
            Self::Japanese => "ja",
            Self::Korean => "ko",
            Self::Malay => "ms",
            Self::Norwegian => "nb",
            Self::Polish => "pl",
            Self::Portuguese => "pt",
            Self::PortugueseBrazil => "pt-br",
            Self::Romanian => "ro",
            Self::Russian => "ru",
            Self::Spanish => "es",
            Self::Swedish => "sv",
            Self::Tagalog => "tl",
            Self::Thai => "th",
            Self::Turkish => "tr",
            Self::Vietnamese => "vi",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOtp {
    to: PhoneNumber,
    language: OtpLanguage,
    name: Option<String>,
}

impl SendOtp {
    pub fn new(to: PhoneNumber) -> Self {
        Self {
            to,
            language: OtpLanguage::default(),
            name: None,
        }
    }

    pub fn language(mut self, language: OtpLanguage) -> Self {
        self.language = language;
        self
    }

    /// Application name shown in the passcode message.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn to(&self) -> &PhoneNumber {
        &self.to
    }

    pub fn otp_language(&self) -> OtpLanguage {
        self.language
    }

    pub fn app_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

pub const DEFAULT_DOMAIN_REGION: &str = "us-east-1";
pub const DEFAULT_RETURN_PATH: &str = "contiguity";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterDomain {
    domain: DomainName,
    region: String,
    custom_return_path: String,
}

impl RegisterDomain {
    pub fn new(domain: DomainName) -> Self {
        Self {
            domain,
            region: DEFAULT_DOMAIN_REGION.to_owned(),
            custom_return_path: DEFAULT_RETURN_PATH.to_owned(),
        }
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn custom_return_path(mut self, path: impl Into<String>) -> Self {
        self.custom_return_path = path.into();
        self
    }

    pub fn domain(&self) -> &DomainName {
        &self.domain
    }

    pub fn sending_region(&self) -> &str {
        &self.region
    }

    pub fn return_path(&self) -> &str {
        &self.custom_return_path
    }
}

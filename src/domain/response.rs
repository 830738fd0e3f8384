use serde::{Deserialize, Serialize};

/// Attributes attached by the server to every successful response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub id: String,
    pub timestamp: i64,
    pub api_version: String,
    pub object: String,
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResponse<T> {
    /// Number of items in this page.
    pub count: u64,
    /// Cursor for the next page; `None` when there are no further pages.
    pub last_key: Option<String>,
    pub items: Vec<T>,
}

impl<T> QueryResponse<T> {
    pub fn has_more(&self) -> bool {
        self.last_key.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TextResponse {
    pub metadata: ResponseMetadata,
    pub message_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OtpSendResponse {
    pub metadata: ResponseMetadata,
    pub otp_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OtpResendResponse {
    pub metadata: ResponseMetadata,
    pub resent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OtpVerifyResponse {
    pub metadata: ResponseMetadata,
    pub verified: bool,
}

/// Domain summary as returned by registration and listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PartialDomain {
    pub domain: String,
    pub status: String,
    pub id: String,
    pub created_at: i64,
    pub region: String,
    pub sending_allowed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DnsRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub value: String,
    pub purpose: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DomainVerifications {
    pub dkim: String,
    pub mail_from: String,
    pub domain: String,
}

/// Full domain details, including the DNS records to publish.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Domain {
    #[serde(flatten)]
    pub summary: PartialDomain,
    pub records: Vec<DnsRecord>,
    pub verifications: DomainVerifications,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeleteDomainResponse {
    pub metadata: ResponseMetadata,
    pub success: bool,
    pub message: String,
}

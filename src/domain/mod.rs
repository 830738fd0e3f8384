//! Domain layer: strong types with validation and invariants (no I/O).

mod request;
mod response;
mod update;
mod validation;
mod value;

pub use request::{
    Comparator, DEFAULT_DOMAIN_REGION, DEFAULT_QUERY_LIMIT, DEFAULT_RETURN_PATH, Filter,
    OtpLanguage, PUT_MAX_ITEMS, Query, RegisterDomain, SendOtp, SendText, WriteOptions,
};
pub use response::{
    DeleteDomainResponse, DnsRecord, Domain, DomainVerifications, OtpResendResponse,
    OtpSendResponse, OtpVerifyResponse, PartialDomain, QueryResponse, ResponseMetadata,
    TextResponse,
};
pub use update::{UpdateOperation, UpdatePayload, Updates};
pub use validation::ValidationError;
pub use value::{
    ApiToken, CollectionName, DataKey, DomainName, ItemKey, MessageText, OtpId, PhoneNumber,
    ProjectId, UnixTimestamp, check_key,
};
pub(crate) use value::encode_path_segment;

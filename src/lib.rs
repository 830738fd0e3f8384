//! Typed Rust client for the Contiguity API.
//!
//! Two clients share one stack: [`Collection`] talks to the Base key-value
//! store, [`Contiguity`] sends texts and passcodes and manages sending domains.
//! The crate is split into a domain layer of strong types, a transport layer for
//! wire formats, and a small client layer orchestrating requests.
//!
//! ```rust,no_run
//! use contiguity::{Collection, ContiguityError, Query, Updates, WriteOptions};
//! use serde_json::json;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ContiguityError> {
//!     let users: Collection = Collection::builder("users").build()?;
//!     users
//!         .insert(
//!             &json!({"key": "ada", "visits": 0}),
//!             WriteOptions::expire_in(Duration::from_secs(3600)),
//!         )
//!         .await?;
//!     users
//!         .update(&Updates::new().increment("visits", 1), "ada", WriteOptions::default())
//!         .await?;
//!     let page = users.query(&Query::all().limit(10)).await?;
//!     println!("{} users", page.count);
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

#[cfg(feature = "blocking")]
pub mod blocking;
pub mod client;
pub mod domain;
mod transport;

pub use client::{
    BoxFuture, Collection, CollectionBuilder, Contiguity, ContiguityBuilder, ContiguityError,
    CredentialSource, Environment, HttpResponse, HttpTransport, Method,
};
pub use domain::{
    Comparator, Domain, Filter, OtpLanguage, PartialDomain, PhoneNumber, Query, QueryResponse,
    RegisterDomain, ResponseMetadata, SendOtp, SendText, UnixTimestamp, UpdateOperation,
    UpdatePayload, Updates, ValidationError, WriteOptions,
};
pub use transport::{
    DecodeError, EXPIRES_ATTRIBUTE, EncodeError, JsonKind, Shape, decode_api_error, decode_item,
    decode_items, decode_response, decode_response_list, encode_item, flatten_item,
};

/// Former name of [`Collection`].
#[deprecated(note = "renamed to `Collection`")]
pub type Base<T = serde_json::Value> = Collection<T>;

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::credentials::{self, BASE_HOST_VAR, CredentialSource, DATA_KEY_VAR, PROJECT_ID_VAR};
use super::{
    ContiguityError, Environment, HttpResponse, HttpTransport, Method, ReqwestTransport,
    ensure_success, send_request,
};
use crate::domain::{
    CollectionName, DataKey, PUT_MAX_ITEMS, ProjectId, Query, QueryResponse, UnixTimestamp,
    Updates, ValidationError, WriteOptions, check_key, encode_path_segment,
};
use crate::transport;

/// Default host serving collections.
pub const DEFAULT_BASE_HOST: &str = "api.base.contiguity.co";
pub const DEFAULT_API_VERSION: &str = "v1";
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(300);

/// `tracing` target of the warning emitted by [`Collection::get`] for a missing key.
pub const DEPRECATION_TARGET: &str = "contiguity::deprecated";

const ITEMS_PATH: &str = "/items";
const QUERY_PATH: &str = "/query";

const NOT_FOUND: u16 = 404;
const CONFLICT: u16 = 409;

/// Builder for [`Collection`].
pub struct CollectionBuilder<T = Value> {
    name: String,
    data_key: Option<String>,
    project_id: Option<String>,
    host: Option<String>,
    api_version: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    item: PhantomData<fn() -> T>,
}

impl<T> CollectionBuilder<T> {
    fn new(name: String) -> Self {
        Self {
            name,
            data_key: None,
            project_id: None,
            host: None,
            api_version: DEFAULT_API_VERSION.to_owned(),
            timeout: Some(DEFAULT_STORE_TIMEOUT),
            user_agent: None,
            item: PhantomData,
        }
    }

    /// Secret key for the project. Falls back to `CONTIGUITY_DATA_KEY`.
    pub fn data_key(mut self, data_key: impl Into<String>) -> Self {
        self.data_key = Some(data_key.into());
        self
    }

    /// Falls back to `CONTIGUITY_PROJECT_ID`.
    pub fn project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Falls back to `CONTIGUITY_BASE_HOST`, then [`DEFAULT_BASE_HOST`].
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// API version path segment. Defaults to [`DEFAULT_API_VERSION`].
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Set an HTTP client timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build a [`Collection`], reading missing settings from the environment.
    ///
    /// Errors:
    /// - [`ContiguityError::InvalidConfiguration`] if the name is empty or a dot
    ///   segment, if the data key or project ID is missing, or if the resulting
    ///   base URL does not parse.
    /// - [`ContiguityError::Transport`] if the HTTP client cannot be created.
    pub fn build(self) -> Result<Collection<T>, ContiguityError> {
        self.build_with(&Environment)
    }

    /// Build a [`Collection`], reading missing settings from `source`.
    ///
    /// Errors: same as [`CollectionBuilder::build`].
    pub fn build_with(self, source: &dyn CredentialSource) -> Result<Collection<T>, ContiguityError> {
        let name = CollectionName::new(self.name.as_str()).map_err(|_| {
            ContiguityError::InvalidConfiguration {
                message: format!("invalid collection name '{}'", self.name),
            }
        })?;
        let data_key = credentials::resolve(
            self.data_key.as_deref(),
            source,
            DATA_KEY_VAR,
            DataKey::FIELD,
        )?;
        let data_key = DataKey::new(data_key)?;
        let project_id = credentials::resolve(
            self.project_id.as_deref(),
            source,
            PROJECT_ID_VAR,
            ProjectId::FIELD,
        )?;
        let project_id = ProjectId::new(project_id)?;
        let host = self
            .host
            .filter(|host| !host.trim().is_empty())
            .or_else(|| source.get(BASE_HOST_VAR).filter(|host| !host.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_BASE_HOST.to_owned());

        let base_url = format!(
            "https://{}/{}/{}/{}",
            host.trim(),
            self.api_version,
            project_id.as_str(),
            encode_path_segment(name.as_str()),
        );
        let http = ReqwestTransport::new(
            base_url.clone(),
            data_key.as_str().to_owned(),
            self.timeout,
            self.user_agent,
        )?;
        tracing::debug!(collection = name.as_str(), %base_url, "collection client ready");

        Ok(Collection {
            name: name.as_str().to_owned(),
            base_url,
            http: Arc::new(http),
            item: PhantomData,
        })
    }
}

impl<T> fmt::Debug for CollectionBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionBuilder")
            .field("name", &self.name)
            .field("data_key", &self.data_key.as_ref().map(|_| "<redacted>"))
            .field("project_id", &self.project_id)
            .field("host", &self.host)
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl<T> Clone for CollectionBuilder<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            data_key: self.data_key.clone(),
            project_id: self.project_id.clone(),
            host: self.host.clone(),
            api_version: self.api_version.clone(),
            timeout: self.timeout,
            user_agent: self.user_agent.clone(),
            item: PhantomData,
        }
    }
}

/// Client for one named collection of items.
///
/// `T` is the item type: `serde_json::Value` accepts any JSON object, a
/// `Deserialize` record additionally validates every decoded item. Each method
/// issues at most one request and keeps no state between calls.
pub struct Collection<T = Value> {
    name: String,
    base_url: String,
    http: Arc<dyn HttpTransport>,
    item: PhantomData<fn() -> T>,
}

impl<T> Collection<T> {
    /// Start configuring a client for the collection called `name`.
    ///
    /// The name is used as given and percent-encoded into the base URL.
    pub fn builder(name: impl Into<String>) -> CollectionBuilder<T> {
        CollectionBuilder::new(name.into())
    }

    /// Use a caller-provided transport. Paths passed to it are relative to `base_url`.
    pub fn with_transport(
        name: impl Into<String>,
        base_url: impl Into<String>,
        http: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            http,
            item: PhantomData,
        }
    }

    /// Collection name this client was built for.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `https://{host}/{api_version}/{project_id}/{name}`, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<HttpResponse, ContiguityError> {
        send_request(self.http.as_ref(), method, path, body).await
    }
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Fetch the item stored under `key`.
    ///
    /// A missing key returns `None` and emits a warning on [`DEPRECATION_TARGET`];
    /// a later release will fail with [`ContiguityError::ItemNotFound`] instead.
    /// Use [`Collection::get_or_none`] to keep the `None` result without the warning.
    ///
    /// Errors:
    /// - [`ContiguityError::InvalidKey`] if `key` is empty, `.` or `..` (no request is sent).
    /// - [`ContiguityError::Api`] for any non-2xx status other than 404.
    /// - [`ContiguityError::Decode`] if the body is not an item of type `T`.
    pub async fn get(&self, key: &str) -> Result<Option<T>, ContiguityError> {
        let item = self.lookup(key).await?;
        if item.is_none() {
            tracing::warn!(
                target: DEPRECATION_TARGET,
                collection = %self.name,
                key,
                "item not found; get() will return ItemNotFound in the future, use get_or_none() to receive None"
            );
        }
        Ok(item)
    }

    /// Fetch the item stored under `key`, or `default` when there is none.
    ///
    /// Errors: same as [`Collection::get`].
    pub async fn get_or(&self, key: &str, default: T) -> Result<T, ContiguityError> {
        Ok(self.lookup(key).await?.unwrap_or(default))
    }

    /// Fetch the item stored under `key`, or `None` when there is none.
    pub async fn get_or_none(&self, key: &str) -> Result<Option<T>, ContiguityError> {
        self.lookup(key).await
    }

    async fn lookup(&self, key: &str) -> Result<Option<T>, ContiguityError> {
        let path = item_path(key)?;
        let response = self.execute(Method::Get, &path, None).await?;
        if response.status == NOT_FOUND {
            return Ok(None);
        }
        let response = ensure_success(response)?;
        Ok(Some(transport::decode_item(&response.body)?))
    }

    /// Delete the item stored under `key`.
    ///
    /// Errors:
    /// - [`ContiguityError::InvalidKey`] if `key` is empty, `.` or `..`.
    /// - [`ContiguityError::Api`] for any non-2xx status, including 404.
    pub async fn delete(&self, key: &str) -> Result<(), ContiguityError> {
        let path = item_path(key)?;
        let response = self.execute(Method::Delete, &path, None).await?;
        ensure_success(response)?;
        Ok(())
    }

    /// Store a new item and return it as stored by the server.
    ///
    /// Errors:
    /// - [`ContiguityError::Validation`] for conflicting expiry options or an item
    ///   that does not serialize to a JSON object (no request is sent).
    /// - [`ContiguityError::ItemConflict`] on 409, carrying the item's key.
    /// - [`ContiguityError::Api`] for other non-2xx statuses or an empty response.
    pub async fn insert(&self, item: &T, options: WriteOptions) -> Result<T, ContiguityError> {
        let fields = transport::encode_item(item, &options, UnixTimestamp::now())?;
        let key = transport::item_key(&fields);
        let body = transport::encode_insert_body(fields);

        let response = self.execute(Method::Post, ITEMS_PATH, Some(body)).await?;
        if response.status == CONFLICT {
            return Err(ContiguityError::ItemConflict { key });
        }
        let response = ensure_success(response)?;
        transport::decode_items::<T>(&response.body)?
            .into_iter()
            .next()
            .ok_or_else(|| ContiguityError::Api {
                status: response.status,
                message: Some("expected a single item, got an empty response".to_owned()),
            })
    }

    /// Store a batch of items, overwriting existing keys.
    ///
    /// An empty batch returns immediately. More than [`PUT_MAX_ITEMS`] items fail
    /// before anything is sent.
    ///
    /// Errors:
    /// - [`ContiguityError::Validation`] for an oversized batch, conflicting expiry
    ///   options, or a non-object item.
    /// - [`ContiguityError::Api`] for any non-2xx status.
    /// - [`ContiguityError::Decode`] if the body is not an array of `T`.
    pub async fn put(&self, items: &[T], options: WriteOptions) -> Result<Vec<T>, ContiguityError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        if items.len() > PUT_MAX_ITEMS {
            return Err(ValidationError::TooManyItems {
                max: PUT_MAX_ITEMS,
                actual: items.len(),
            }
            .into());
        }

        let now = UnixTimestamp::now();
        let fields = items
            .iter()
            .map(|item| transport::encode_item(item, &options, now))
            .collect::<Result<Vec<_>, _>>()?;
        let body = transport::encode_put_body(fields);

        let response = self.execute(Method::Put, ITEMS_PATH, Some(body)).await?;
        let response = ensure_success(response)?;
        Ok(transport::decode_items(&response.body)?)
    }

    /// Apply `updates` to the item stored under `key` and return the updated item.
    ///
    /// Expiry from `options` is written into the `set` bucket.
    ///
    /// Errors:
    /// - [`ContiguityError::InvalidKey`] for an invalid key, then
    ///   [`ContiguityError::Validation`] for empty `updates` or conflicting expiry.
    /// - [`ContiguityError::ItemNotFound`] on 404.
    /// - [`ContiguityError::Api`] for other non-2xx statuses.
    pub async fn update(
        &self,
        updates: &Updates,
        key: &str,
        options: WriteOptions,
    ) -> Result<T, ContiguityError> {
        let path = item_path(key)?;
        if updates.is_empty() {
            return Err(ValidationError::NoUpdates.into());
        }

        let mut payload = updates.compile();
        if let Some(at) = options.resolve(UnixTimestamp::now())? {
            transport::set_expiry(&mut payload, at);
        }
        let body = transport::encode_update_body(&payload);

        let response = self.execute(Method::Patch, &path, Some(body)).await?;
        if response.status == NOT_FOUND {
            return Err(ContiguityError::ItemNotFound {
                key: key.to_owned(),
            });
        }
        let response = ensure_success(response)?;
        Ok(transport::decode_item(&response.body)?)
    }

    /// Fetch one page of items matching `query`.
    ///
    /// Pass the returned `last_key` to [`Query::after`] to request the next page.
    ///
    /// Errors: [`ContiguityError::Api`] for any non-2xx status,
    /// [`ContiguityError::Decode`] for a malformed page.
    pub async fn query(&self, query: &Query) -> Result<QueryResponse<T>, ContiguityError> {
        let body = transport::encode_query_body(query);
        let response = self.execute(Method::Post, QUERY_PATH, Some(body)).await?;
        let response = ensure_success(response)?;
        let page: QueryResponse<T> = transport::decode_query_response(&response.body)?;
        tracing::debug!(
            collection = %self.name,
            count = page.count,
            has_more = page.has_more(),
            "query page decoded"
        );
        Ok(page)
    }

    /// Former name of [`Collection::query`].
    #[deprecated(note = "renamed to `query`")]
    pub async fn fetch(&self, query: &Query) -> Result<QueryResponse<T>, ContiguityError> {
        self.query(query).await
    }
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            base_url: self.base_url.clone(),
            http: Arc::clone(&self.http),
            item: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

fn item_path(key: &str) -> Result<String, ContiguityError> {
    Ok(format!("{ITEMS_PATH}/{}", check_key(key)?))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde::Deserialize;
    use serde_json::json;
    use tracing_test::traced_test;

    use super::super::fake::FakeTransport;
    use super::*;
    use crate::domain::{Comparator, Filter};
    use crate::transport::EXPIRES_ATTRIBUTE;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Record {
        key: String,
        field1: i64,
        tags: Vec<String>,
    }

    fn record(key: &str, field1: i64) -> Record {
        Record {
            key: key.to_owned(),
            field1,
            tags: vec!["a".to_owned()],
        }
    }

    fn make_collection<T>(transport: FakeTransport) -> Collection<T> {
        Collection::with_transport(
            "users",
            "https://example.invalid/v1/proj/users",
            Arc::new(transport),
        )
    }

    #[tokio::test]
    async fn put_over_cap_fails_without_request() {
        let transport = FakeTransport::echo();
        let collection: Collection<Record> = make_collection(transport.clone());

        let items = (0..31).map(|i| record(&format!("k{i}"), i)).collect::<Vec<_>>();
        let err = collection
            .put(&items, WriteOptions::default())
            .await
            .unwrap_err();
        match err {
            ContiguityError::Validation(ValidationError::TooManyItems { max, actual }) => {
                assert_eq!(max, 30);
                assert_eq!(actual, 31);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn put_empty_batch_skips_request() {
        let transport = FakeTransport::echo();
        let collection: Collection<Record> = make_collection(transport.clone());

        let stored = collection.put(&[], WriteOptions::default()).await.unwrap();
        assert!(stored.is_empty());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn put_round_trips_typed_items_through_echo() {
        let transport = FakeTransport::echo();
        let collection: Collection<Record> = make_collection(transport.clone());

        let items = vec![record("k1", 1), record("k2", 2)];
        let stored = collection
            .put(&items, WriteOptions::default())
            .await
            .unwrap();
        assert_eq!(stored, items);

        let recorded = transport.last_request().unwrap();
        assert_eq!(recorded.method, Method::Put);
        assert_eq!(recorded.path, "/items");
    }

    #[tokio::test]
    async fn insert_round_trips_and_injects_expiry() {
        let transport = FakeTransport::echo();
        let collection: Collection = make_collection(transport.clone());

        let item = json!({"key": "k1", "field1": 5});
        let stored = collection
            .insert(&item, WriteOptions::expire_at(UnixTimestamp::new(1_800_000_000)))
            .await
            .unwrap();
        assert_eq!(stored["key"], json!("k1"));
        assert_eq!(stored[EXPIRES_ATTRIBUTE], json!(1_800_000_000));

        let recorded = transport.last_request().unwrap();
        assert_eq!(recorded.method, Method::Post);
        assert_eq!(recorded.path, "/items");
        assert_eq!(
            recorded.body,
            Some(json!({"item": {"key": "k1", "field1": 5, "__expires": 1_800_000_000}}))
        );
    }

    #[tokio::test]
    async fn insert_with_both_expiries_fails_locally() {
        let transport = FakeTransport::echo();
        let collection: Collection = make_collection(transport.clone());

        let options = WriteOptions {
            expire_in: Some(Duration::from_secs(10)),
            expire_at: Some(UnixTimestamp::new(1_800_000_000)),
        };
        let err = collection
            .insert(&json!({"key": "k1"}), options)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("cannot use both"));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn insert_conflict_carries_key() {
        let transport = FakeTransport::new(409, r#"{"error":"conflict"}"#);
        let collection: Collection<Record> = make_collection(transport);

        let err = collection
            .insert(&record("k1", 1), WriteOptions::default())
            .await
            .unwrap_err();
        match err {
            ContiguityError::ItemConflict { key } => assert_eq!(key, "k1"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn insert_empty_response_is_an_api_error() {
        let transport = FakeTransport::new(201, "[]");
        let collection: Collection<Record> = make_collection(transport);

        let err = collection
            .insert(&record("k1", 1), WriteOptions::default())
            .await
            .unwrap_err();
        match err {
            ContiguityError::Api { message, .. } => assert_eq!(
                message.as_deref(),
                Some("expected a single item, got an empty response")
            ),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    fn assert_api_error(err: ContiguityError, expected_status: u16, expected_message: &str) {
        match err {
            ContiguityError::Api { status, message } => {
                assert_eq!(status, expected_status);
                assert_eq!(message.as_deref(), Some(expected_message));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn insert_non_conflict_error_is_api_error() {
        let transport = FakeTransport::new(400, r#"{"error":"item too large","status":400}"#);
        let collection: Collection<Record> = make_collection(transport);

        let err = collection
            .insert(&record("k1", 1), WriteOptions::default())
            .await
            .unwrap_err();
        assert_api_error(err, 400, "item too large");
    }

    #[tokio::test]
    async fn put_server_error_is_api_error() {
        let transport = FakeTransport::new(503, r#"{"error":"unavailable","status":503}"#);
        let collection: Collection<Record> = make_collection(transport.clone());

        let err = collection
            .put(&[record("k1", 1)], WriteOptions::default())
            .await
            .unwrap_err();
        assert_api_error(err, 503, "unavailable");
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn query_server_error_is_api_error() {
        let transport = FakeTransport::new(400, r#"{"error":"invalid query","status":400}"#);
        let collection: Collection<Record> = make_collection(transport);

        let err = collection.query(&Query::all()).await.unwrap_err();
        assert_api_error(err, 400, "invalid query");
    }

    #[tokio::test]
    async fn empty_update_fails_before_request() {
        let transport = FakeTransport::echo();
        let collection: Collection = make_collection(transport.clone());

        let err = collection
            .update(&Updates::new(), "k", WriteOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ContiguityError::Validation(ValidationError::NoUpdates)
        ));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn update_sends_compiled_payload_with_expiry() {
        let transport = FakeTransport::new(200, r#"{"key":"k 1","field1":7}"#);
        let collection: Collection = make_collection(transport.clone());

        let updates = Updates::new().increment("field1", 2).trim("old");
        let updated = collection
            .update(
                &updates,
                "k 1",
                WriteOptions::expire_at(UnixTimestamp::new(1_800_000_000)),
            )
            .await
            .unwrap();
        assert_eq!(updated, json!({"key": "k 1", "field1": 7}));

        let recorded = transport.last_request().unwrap();
        assert_eq!(recorded.method, Method::Patch);
        assert_eq!(recorded.path, "/items/k%201");
        assert_eq!(
            recorded.body,
            Some(json!({
                "updates": {
                    "set": {"__expires": 1_800_000_000},
                    "increment": {"field1": 2},
                    "append": {},
                    "prepend": {},
                    "delete": ["old"],
                }
            }))
        );
    }

    #[tokio::test]
    async fn update_missing_key_is_not_found() {
        let transport = FakeTransport::new(404, r#"{"error":"not found"}"#);
        let collection: Collection = make_collection(transport);

        let err = collection
            .update(&Updates::new().set("a", 1), "a/b", WriteOptions::default())
            .await
            .unwrap_err();
        match err {
            ContiguityError::ItemNotFound { key } => assert_eq!(key, "a/b"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_keys_are_rejected_locally() {
        let transport = FakeTransport::echo();
        let collection: Collection = make_collection(transport.clone());

        for key in ["", ".", ".."] {
            assert!(matches!(
                collection.get_or_none(key).await.unwrap_err(),
                ContiguityError::InvalidKey { .. }
            ));
            assert!(matches!(
                collection.delete(key).await.unwrap_err(),
                ContiguityError::InvalidKey { .. }
            ));
            assert!(matches!(
                collection
                    .update(&Updates::new().set("a", 1), key, WriteOptions::default())
                    .await
                    .unwrap_err(),
                ContiguityError::InvalidKey { .. }
            ));
        }
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn item_paths_stay_under_items() {
        let base = url::Url::parse("https://example.invalid/v1/proj/users/").unwrap();
        for key in ["...", "a/../b", "%2e%2e", " "] {
            let path = item_path(key).unwrap();
            let url = base.join(path.trim_start_matches('/')).unwrap();
            assert!(
                url.path().starts_with("/v1/proj/users/items/"),
                "key {key:?} resolved to {url}"
            );
        }
    }

    #[tokio::test]
    async fn get_encodes_key_and_decodes_typed_item() {
        let transport = FakeTransport::new(200, r#"{"key":"a/b","field1":5,"tags":[]}"#);
        let collection: Collection<Record> = make_collection(transport.clone());

        let item = collection.get_or_none("a/b").await.unwrap().unwrap();
        assert_eq!(item.field1, 5);
        let recorded = transport.last_request().unwrap();
        assert_eq!(recorded.method, Method::Get);
        assert_eq!(recorded.path, "/items/a%2Fb");
    }

    #[tokio::test]
    async fn get_rejects_item_of_wrong_shape() {
        let transport = FakeTransport::new(200, r#"{"key":"k1","field1":"five","tags":[]}"#);
        let collection: Collection<Record> = make_collection(transport);

        let err = collection.get_or_none("k1").await.unwrap_err();
        assert!(matches!(err, ContiguityError::Decode(_)));
    }

    #[tokio::test]
    #[traced_test]
    async fn get_without_default_signals_deprecation() {
        let transport = FakeTransport::new(404, r#"{"error":"not found"}"#);
        let collection: Collection = make_collection(transport.clone());

        assert_eq!(collection.get("missing").await.unwrap(), None);
        assert_eq!(transport.last_request().unwrap().path, "/items/missing");
        assert!(logs_contain("get() will return ItemNotFound"));
    }

    #[tokio::test]
    #[traced_test]
    async fn get_with_default_returns_it_silently() {
        let transport = FakeTransport::new(404, r#"{"error":"not found"}"#);
        let collection: Collection = make_collection(transport);

        assert_eq!(collection.get_or("missing", json!(0)).await.unwrap(), json!(0));
        assert_eq!(collection.get_or_none("missing").await.unwrap(), None);
        assert!(!logs_contain("get() will return ItemNotFound"));
    }

    #[tokio::test]
    async fn get_server_error_is_api_error() {
        let transport = FakeTransport::new(500, r#"{"error":"boom","status":500}"#);
        let collection: Collection = make_collection(transport);

        match collection.get_or_none("k").await.unwrap_err() {
            ContiguityError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message.as_deref(), Some("boom"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_missing_key_is_generic_api_error() {
        let transport = FakeTransport::new(404, "item not found");
        let collection: Collection = make_collection(transport.clone());

        match collection.delete("k").await.unwrap_err() {
            ContiguityError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message.as_deref(), Some("item not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(transport.last_request().unwrap().method, Method::Delete);

        transport.respond_with(204, "");
        collection.delete("k").await.unwrap();
    }

    #[tokio::test]
    async fn query_round_trips_cursor() {
        let transport = FakeTransport::new(
            200,
            r#"{"count":2,"last_key":"k2","items":[{"key":"k1","field1":1,"tags":[]},{"key":"k2","field1":2,"tags":[]}]}"#,
        );
        let collection: Collection<Record> = make_collection(transport.clone());

        let query = Query::all().filter(Filter::new().compare("field1", Comparator::GreaterThan, 0));
        let page = collection.query(&query).await.unwrap();
        assert_eq!(page.count, 2);
        assert!(page.has_more());
        assert_eq!(page.items[1].key, "k2");
        assert_eq!(
            transport.last_request().unwrap().body,
            Some(json!({"limit": 1000, "last_key": null, "query": [{"field1?gt": 0}]}))
        );

        transport.respond_with(200, r#"{"count":0,"last_key":null,"items":[]}"#);
        let next = query.after(page.last_key.unwrap());
        let page = collection.query(&next).await.unwrap();
        assert!(!page.has_more());
        let recorded = transport.last_request().unwrap();
        assert_eq!(recorded.path, "/query");
        assert_eq!(recorded.body.unwrap()["last_key"], json!("k2"));
    }

    #[tokio::test]
    #[allow(deprecated)]
    async fn fetch_is_query() {
        let transport = FakeTransport::new(200, r#"{"count":0,"items":[]}"#);
        let collection: Collection = make_collection(transport.clone());

        let page = collection.fetch(&Query::all()).await.unwrap();
        assert_eq!(page.count, 0);
        assert_eq!(transport.last_request().unwrap().path, "/query");
    }

    fn source(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn builder_composes_base_url_from_source() {
        let src = source(&[
            (DATA_KEY_VAR, "key"),
            (PROJECT_ID_VAR, "proj"),
            (BASE_HOST_VAR, "base.example.com"),
        ]);
        let collection: Collection = Collection::builder("my users").build_with(&src).unwrap();
        assert_eq!(collection.name(), "my users");
        assert_eq!(
            collection.base_url(),
            "https://base.example.com/v1/proj/my%20users"
        );

        let collection: Collection = Collection::builder("users")
            .project_id("other")
            .api_version("v2")
            .build_with(&src)
            .unwrap();
        assert_eq!(
            collection.base_url(),
            "https://base.example.com/v2/other/users"
        );
    }

    #[test]
    fn builder_defaults_host() {
        let src = source(&[(DATA_KEY_VAR, "key"), (PROJECT_ID_VAR, "proj")]);
        let collection: Collection = Collection::builder("users").build_with(&src).unwrap();
        assert_eq!(
            collection.base_url(),
            "https://api.base.contiguity.co/v1/proj/users"
        );
    }

    #[test]
    fn builder_reports_missing_settings() {
        let err = Collection::<Value>::builder("users")
            .project_id("proj")
            .build_with(&source(&[]))
            .unwrap_err();
        match err {
            ContiguityError::InvalidConfiguration { message } => {
                assert_eq!(message, "no data key provided");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = Collection::<Value>::builder("")
            .data_key("key")
            .project_id("proj")
            .build_with(&source(&[]))
            .unwrap_err();
        match err {
            ContiguityError::InvalidConfiguration { message } => {
                assert_eq!(message, "invalid collection name ''");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

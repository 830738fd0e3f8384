use std::error::Error as StdError;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use super::{BoxFuture, HttpResponse, HttpTransport, Method};

type Responder = Arc<dyn Fn(&RecordedRequest) -> HttpResponse + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Clone)]
pub(crate) struct FakeTransport {
    state: Arc<Mutex<FakeTransportState>>,
}

struct FakeTransportState {
    requests: Vec<RecordedRequest>,
    responder: Responder,
}

impl FakeTransport {
    pub(crate) fn new(status: u16, body: impl Into<String>) -> Self {
        Self::with_responder(fixed(status, body.into()))
    }

    /// Answer every request with `f(request)`.
    pub(crate) fn with_responder(
        f: impl Fn(&RecordedRequest) -> HttpResponse + Send + Sync + 'static,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeTransportState {
                requests: Vec::new(),
                responder: Arc::new(f),
            })),
        }
    }

    /// Echo the request body back: `{"item": x}` as `[x]`, `{"items": xs}` as `xs`,
    /// PATCH `set` as the updated item.
    pub(crate) fn echo() -> Self {
        Self::with_responder(|request| {
            let body = match &request.body {
                Some(Value::Object(body)) => {
                    if let Some(item) = body.get("item") {
                        Value::Array(vec![item.clone()])
                    } else if let Some(items) = body.get("items") {
                        items.clone()
                    } else if let Some(set) = body.get("updates").and_then(|u| u.get("set")) {
                        set.clone()
                    } else {
                        Value::Object(body.clone())
                    }
                }
                _ => Value::Null,
            };
            HttpResponse::new(200, body.to_string())
        })
    }

    pub(crate) fn respond_with(&self, status: u16, body: impl Into<String>) {
        self.state.lock().unwrap().responder = Arc::new(fixed(status, body.into()));
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub(crate) fn last_request(&self) -> Option<RecordedRequest> {
        self.state.lock().unwrap().requests.last().cloned()
    }
}

fn fixed(status: u16, body: String) -> impl Fn(&RecordedRequest) -> HttpResponse + Send + Sync {
    move |_| HttpResponse::new(status, body.clone())
}

impl HttpTransport for FakeTransport {
    fn send<'a>(
        &'a self,
        method: Method,
        path: &'a str,
        body: Option<Value>,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let request = RecordedRequest {
                method,
                path: path.to_owned(),
                body,
            };
            let mut state = self.state.lock().unwrap();
            let response = (state.responder)(&request);
            state.requests.push(request);
            Ok(response)
        })
    }
}

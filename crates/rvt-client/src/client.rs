use std::{borrow::Cow, marker::PhantomData};

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    gateway::{ApiResult, Failure, Gateway, RequestOptions},
    session::Session,
};

/// Gateway plus the session whose token authenticates its calls
#[derive(Debug, Clone)]
pub struct ApiClient {
    gateway: Gateway,
    session: Session,
}

impl ApiClient {
    pub const fn new(gateway: Gateway, session: Session) -> Self {
        Self { gateway, session }
    }

    pub const fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub const fn session(&self) -> &Session {
        &self.session
    }
}

/// One remote capability: method, path, query and body, plus the type the
/// success body decodes into.
///
/// Building an endpoint does no I/O. Call [`Endpoint::send`] to issue it.
///
/// # Example
/// ```no_run
/// use rvt_client::{ApiClient, operations::topics};
///
/// async fn count_topics(client: &ApiClient) -> usize {
///     match topics::list().send(client).await {
///         Ok(topics) => topics.0.len(),
///         Err(failure) => {
///             eprintln!("{}", failure.detail());
///             0
///         }
///     }
/// }
/// ```
#[must_use = "an endpoint does nothing until it is sent"]
#[derive(Debug, Clone)]
pub struct Endpoint<T> {
    method: Method,
    path: String,
    query: Vec<(&'static str, String)>,
    body: Option<Value>,
    public: bool,
    response: PhantomData<fn() -> T>,
}

impl<T> Endpoint<T> {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            public: false,
            response: PhantomData,
        }
    }

    pub(crate) fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub(crate) fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub(crate) fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub(crate) fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Add a query parameter; `None` and empty values are left out
    pub(crate) fn with_query(mut self, key: &'static str, value: Option<&str>) -> Self {
        if let Some(value) = value.filter(|value| !value.is_empty()) {
            self.query.push((key, value.to_string()));
        }
        self
    }

    /// Add a query parameter even when its value is empty
    pub(crate) fn with_param(mut self, key: &'static str, value: &str) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    pub(crate) fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Never attach the session token
    pub(crate) fn public(mut self) -> Self {
        self.public = true;
        self
    }

    pub const fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &[(&'static str, String)] {
        &self.query
    }

    pub const fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub const fn is_public(&self) -> bool {
        self.public
    }
}

impl<T: DeserializeOwned> Endpoint<T> {
    /// Issue the call with a snapshot of the session token taken now.
    ///
    /// The client performs no authorization check of its own: a missing
    /// token simply means no credential header.
    pub async fn send(self, client: &ApiClient) -> ApiResult<T> {
        let token = if self.public {
            None
        } else {
            client.session().token()
        };
        if token.is_none() && !self.public {
            tracing::debug!(path = %self.path, "Sending without a session token");
        }

        let value = client
            .gateway()
            .send(
                &self.path,
                RequestOptions {
                    method: self.method,
                    token: token.as_deref(),
                    query: &self.query,
                    body: self.body.as_ref(),
                },
            )
            .await?;

        serde_json::from_value(value).map_err(|e| {
            tracing::warn!(path = %self.path, "Unexpected response shape: {e}");
            Failure::InvalidResponse(e.to_string())
        })
    }
}

/// Percent-encode one path segment taken from user input
pub(crate) fn segment(raw: &str) -> Cow<'_, str> {
    urlencoding::encode(raw)
}

//! Logical request descriptors and their builder.
//!
//! A [`Request`] describes one operation: method, path template, path and
//! query substitutions, header parameters, an optional body and whether the
//! request opens or closes a standing subscription. It is assembled through
//! [`RequestBuilder`] and handed to the client by value, so it cannot be
//! modified or resubmitted once sent.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::correlation::RequestId;

/// Method used when none is given.
pub const DEFAULT_METHOD: &str = "GET";

/// Media type set by [`RequestBuilder::json`].
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// How the client should treat the registry entry for a request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// The handler is removed after the first response.
    #[default]
    OneShot,
    /// The handler stays registered and receives every event for the id.
    Subscribe,
    /// Drop the local registry entry of a prior subscription when sending.
    Unsubscribe(RequestId),
}

/// Immutable description of one protocol operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    method: String,
    path_template: String,
    path_params: Vec<(String, String)>,
    query_params: Vec<(String, String)>,
    header_params: BTreeMap<String, String>,
    body: Option<String>,
    content_type: Option<String>,
    mode: Mode,
}

impl Request {
    /// Start a request for `path_template` using the default `GET` method.
    ///
    /// # Examples
    ///
    /// ```
    /// use muxframe::request::Request;
    ///
    /// let request = Request::builder("/v1/rooms").build();
    /// assert_eq!(request.method(), "GET");
    /// assert_eq!(request.resolved_path(), "/v1/rooms");
    /// ```
    #[must_use]
    pub fn builder(path_template: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(path_template)
    }

    /// Start a `GET` request.
    #[must_use]
    pub fn get(path_template: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(path_template)
    }

    /// Start a `POST` request.
    #[must_use]
    pub fn post(path_template: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(path_template).method("POST")
    }

    /// Start a `PUT` request.
    #[must_use]
    pub fn put(path_template: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(path_template).method("PUT")
    }

    /// Start a `DELETE` request.
    #[must_use]
    pub fn delete(path_template: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(path_template).method("DELETE")
    }

    /// HTTP-like method name.
    #[must_use]
    pub fn method(&self) -> &str { &self.method }

    /// Unresolved path template, e.g. `/v1/subscribe/{name}/{room}`.
    #[must_use]
    pub fn path_template(&self) -> &str { &self.path_template }

    /// Header parameters sent alongside the request.
    #[must_use]
    pub fn header_params(&self) -> &BTreeMap<String, String> { &self.header_params }

    /// Body text, if any. An empty body is reported as absent.
    #[must_use]
    pub fn body(&self) -> Option<&str> { self.body.as_deref().filter(|body| !body.is_empty()) }

    /// Media type declared for the body.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> { self.content_type.as_deref() }

    /// Registry treatment requested for this request.
    #[must_use]
    pub fn mode(&self) -> &Mode { &self.mode }

    /// Whether the request opens a standing subscription.
    #[must_use]
    pub fn is_subscribe(&self) -> bool { matches!(self.mode, Mode::Subscribe) }

    /// Expand the path template and append the query string.
    ///
    /// Every `{name}` placeholder is replaced by its URL-component-encoded
    /// value, in the order the parameters were added. Query parameters are
    /// appended as `?k=v&k2=v2` with keys and values component-encoded.
    ///
    /// # Examples
    ///
    /// ```
    /// use muxframe::request::Request;
    ///
    /// let request = Request::get("/v1/subscribe/{name}/{room}")
    ///     .path_param("name", "alice")
    ///     .path_param("room", "general chat")
    ///     .query_param("since", "10")
    ///     .build();
    /// assert_eq!(request.resolved_path(), "/v1/subscribe/alice/general%20chat?since=10");
    /// ```
    #[must_use]
    pub fn resolved_path(&self) -> String {
        let mut path = self.path_template.clone();
        for (name, value) in &self.path_params {
            path = path.replace(&format!("{{{name}}}"), &encode_component(value));
        }
        for (index, (name, value)) in self.query_params.iter().enumerate() {
            path.push(if index == 0 { '?' } else { '&' });
            path.push_str(&encode_component(name));
            path.push('=');
            path.push_str(&encode_component(value));
        }
        path
    }

    pub(crate) fn set_mode(&mut self, mode: Mode) { self.mode = mode; }
}

/// Builder collecting the parts of a [`Request`].
///
/// Each method consumes and returns the builder; [`build`](Self::build)
/// produces the immutable request.
#[derive(Clone, Debug)]
pub struct RequestBuilder {
    request: Request,
}

impl RequestBuilder {
    /// Create a builder for `path_template`.
    #[must_use]
    pub fn new(path_template: impl Into<String>) -> Self {
        Self {
            request: Request {
                method: DEFAULT_METHOD.to_owned(),
                path_template: path_template.into(),
                path_params: Vec::new(),
                query_params: Vec::new(),
                header_params: BTreeMap::new(),
                body: None,
                content_type: None,
                mode: Mode::OneShot,
            },
        }
    }

    /// Replace the method.
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.request.method = method.into();
        self
    }

    /// Substitute `{name}` in the path template with `value`.
    #[must_use]
    pub fn path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.path_params.push((name.into(), value.into()));
        self
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.query_params.push((name.into(), value.into()));
        self
    }

    /// Set a header parameter, replacing any earlier value for `name`.
    #[must_use]
    pub fn header_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.header_params.insert(name.into(), value.into());
        self
    }

    /// Attach a raw body with its media type.
    ///
    /// # Examples
    ///
    /// ```
    /// use muxframe::request::Request;
    ///
    /// let request = Request::post("/v1/echo").content("hola", "text/plain").build();
    /// assert_eq!(request.body(), Some("hola"));
    /// assert_eq!(request.content_type(), Some("text/plain"));
    /// ```
    #[must_use]
    pub fn content(mut self, body: impl Into<String>, content_type: impl Into<String>) -> Self {
        self.request.body = Some(body.into());
        self.request.content_type = Some(content_type.into());
        self
    }

    /// Serialise `value` as the JSON body.
    ///
    /// # Errors
    ///
    /// Returns the serialisation error when `value` cannot be represented as
    /// JSON.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_string(value)?;
        Ok(self.content(body, JSON_MEDIA_TYPE))
    }

    /// Mark the request as opening a standing subscription.
    ///
    /// Replaces an earlier [`unsubscribe`](Self::unsubscribe) marker.
    #[must_use]
    pub fn subscribe(mut self) -> Self {
        self.request.mode = Mode::Subscribe;
        self
    }

    /// Mark the request as cancelling the subscription `prior`.
    ///
    /// Sending it drops the local registry entry for `prior` whether or not
    /// the peer acknowledges. Replaces an earlier
    /// [`subscribe`](Self::subscribe) marker.
    #[must_use]
    pub fn unsubscribe(mut self, prior: RequestId) -> Self {
        self.request.mode = Mode::Unsubscribe(prior);
        self
    }

    /// Finish the request.
    #[must_use]
    pub fn build(self) -> Request { self.request }
}

impl From<RequestBuilder> for Request {
    fn from(builder: RequestBuilder) -> Self { builder.build() }
}

/// Percent-encode `value` the way `encodeURIComponent` does.
///
/// ASCII letters, digits and `-_.!~*'()` are kept; every other byte of the
/// UTF-8 encoding becomes `%XX`.
#[must_use]
pub fn encode_component(value: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || b"-_.!~*'()".contains(&byte) {
            encoded.push(char::from(byte));
        } else {
            encoded.push('%');
            encoded.push(char::from(HEX[usize::from(byte >> 4)]));
            encoded.push(char::from(HEX[usize::from(byte & 0x0f)]));
        }
    }
    encoded
}

//! The request descriptor and its negotiation logic.
//!
//! A [`Request`] is built with chained methods that take and return `self`.
//! Send and expect types are resolved through the mime registry as soon as
//! they are set, so [`Request::content_type`] and [`Request::expected_type`]
//! only ever hold canonical MIME strings.
//!
//! # Negotiation
//!
//! - the send type selects the codec that serializes the payload, according
//!   to the [`SerializePolicy`]; without a registered codec the payload is
//!   sent in its literal string form
//! - the expect type only becomes the `Accept` header; decoding always uses
//!   the content type the response actually declares
//!
//! # Example
//!
//! ```
//! use micro_fetch::Request;
//! use micro_fetch::codec::CodecTable;
//! use serde_json::json;
//!
//! let mut request = Request::post_with("http://example.com/users", json!({"name": "nathan"}))
//!     .sends_json()
//!     .expects("xml");
//!
//! let outgoing = request.prepare(&CodecTable::new()).unwrap();
//! assert_eq!(outgoing.body().as_ref(), br#"{"name":"nathan"}"#);
//! assert_eq!(outgoing.headers().get("accept"), Some("application/xml"));
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use http::{HeaderMap, Method};
use tracing::{debug, warn};

use micro_fetch_http::codec::HeaderEncoder;
use micro_fetch_http::protocol::{EncodeError, Headers, MimeType, mime};

use crate::codec::CodecTable;
use crate::config::{self, Config, ConfigSource, EnvSource};
use crate::error::FetchError;
use crate::response::{Response, ResponseDecoder};
use crate::transport::{OutgoingRequest, Transport, TransportError, TransportOptions};
use crate::utils::ensure;

mod auth;
mod payload;

pub use auth::{AuthMechanism, Credentials};
pub use payload::{Payload, SerializePolicy, determine_length, utf8_len};

/// `User-Agent` sent when neither the request nor the template sets one.
pub const DEFAULT_USER_AGENT: &str = concat!("micro-fetch/", env!("CARGO_PKG_VERSION"));

type BeforeSend = Arc<dyn Fn(&mut Request) + Send + Sync>;
type WhenError = Arc<dyn Fn(&TransportError) + Send + Sync>;

/// An HTTP request under construction.
#[derive(Clone)]
pub struct Request {
    method: Method,
    uri: String,
    headers: Headers,
    content_type: Option<MimeType>,
    expected_type: Option<MimeType>,
    auth: AuthMechanism,
    credentials: Option<Credentials>,
    payload: Payload,
    serialize_policy: SerializePolicy,
    auto_parse: bool,
    strict_tls: bool,
    timeout: Option<Duration>,
    proxy: Option<String>,
    default_user_agent: Option<String>,
    serialized_payload: Option<Bytes>,
    before_send: Option<BeforeSend>,
    when_error: Option<WhenError>,
    config_source: Arc<dyn ConfigSource + Send + Sync>,
}

macro_rules! method_constructors {
    ($($name:ident => $method:ident),* $(,)?) => {
        impl Request {
            $(
                #[doc = concat!("A `", stringify!($method), "` request to `uri`.")]
                pub fn $name<U: Into<String>>(uri: U) -> Self {
                    Self::new(Method::$method, uri)
                }
            )*
        }
    };
}

macro_rules! payload_constructors {
    ($($name:ident => $method:ident),* $(,)?) => {
        impl Request {
            $(
                #[doc = concat!("A `", stringify!($method), "` request to `uri` carrying `payload`.")]
                pub fn $name<U: Into<String>, P: Into<Payload>>(uri: U, payload: P) -> Self {
                    Self::new(Method::$method, uri).body(payload)
                }
            )*
        }
    };
}

macro_rules! mime_shorthands {
    ($($expects:ident, $sends:ident => $mime:path),* $(,)?) => {
        impl Request {
            $(
                #[doc = concat!("Shorthand for `expects(", stringify!($mime), ")`.")]
                pub fn $expects(self) -> Self {
                    self.expects($mime)
                }

                #[doc = concat!("Shorthand for `sends(", stringify!($mime), ")`.")]
                pub fn $sends(self) -> Self {
                    self.sends($mime)
                }
            )*
        }
    };
}

method_constructors! {
    get => GET,
    post => POST,
    put => PUT,
    delete => DELETE,
    patch => PATCH,
    head => HEAD,
    options => OPTIONS,
}

payload_constructors! {
    post_with => POST,
    put_with => PUT,
    patch_with => PATCH,
}

mime_shorthands! {
    expects_json, sends_json => mime::JSON,
    expects_xml, sends_xml => mime::XML,
    expects_csv, sends_csv => mime::CSV,
    expects_form, sends_form => mime::FORM,
    expects_html, sends_html => mime::HTML,
    expects_plain, sends_plain => mime::PLAIN,
}

impl Request {
    /// A request initialized from the process-wide template.
    pub fn init() -> Self {
        Self::from_config(&Config::global())
    }

    pub fn new<U: Into<String>>(method: Method, uri: U) -> Self {
        Self::init().with_method(method).with_uri(uri)
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            method: config.method.clone(),
            uri: String::new(),
            headers: Headers::new(),
            content_type: config.send_type.as_deref().map(MimeType::resolve),
            expected_type: config.expect_type.as_deref().map(MimeType::resolve),
            auth: AuthMechanism::None,
            credentials: None,
            payload: Payload::Empty,
            serialize_policy: config.serialize_policy,
            auto_parse: config.auto_parse,
            strict_tls: config.strict_tls,
            timeout: config.timeout,
            proxy: config.proxy.clone(),
            default_user_agent: config.user_agent.clone(),
            serialized_payload: None,
            before_send: None,
            when_error: None,
            config_source: Arc::new(EnvSource),
        }
    }

    /// Makes `template` the defaults of every later [`Request::init`].
    pub fn ini(template: &Request) {
        Config::set_global(template.to_config());
    }

    /// Restores the built-in defaults.
    pub fn reset_ini() {
        Config::reset_global();
    }

    /// The template-level settings of this request.
    pub fn to_config(&self) -> Config {
        Config {
            method: self.method.clone(),
            strict_tls: self.strict_tls,
            send_type: self.content_type.as_ref().map(|t| t.as_str().to_owned()),
            expect_type: self.expected_type.as_ref().map(|t| t.as_str().to_owned()),
            auto_parse: self.auto_parse,
            serialize_policy: self.serialize_policy,
            user_agent: self.headers.get("User-Agent").map(str::to_owned).or_else(|| self.default_user_agent.clone()),
            timeout: self.timeout,
            proxy: self.proxy.clone(),
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_uri<U: Into<String>>(mut self, uri: U) -> Self {
        self.uri = uri.into();
        self
    }

    /// Sets the send type from an alias or a MIME string.
    pub fn sends<M: AsRef<str>>(mut self, identifier: M) -> Self {
        self.content_type = Some(MimeType::resolve(identifier.as_ref()));
        self
    }

    /// Sets the expect type from an alias or a MIME string.
    ///
    /// This only drives the `Accept` header.
    pub fn expects<M: AsRef<str>>(mut self, identifier: M) -> Self {
        self.expected_type = Some(MimeType::resolve(identifier.as_ref()));
        self
    }

    pub fn sends_and_expects<M: AsRef<str>>(self, identifier: M) -> Self {
        let identifier = identifier.as_ref();
        self.sends(identifier).expects(identifier)
    }

    pub fn body<P: Into<Payload>>(mut self, payload: P) -> Self {
        self.payload = payload.into();
        self
    }

    /// Sets a structured payload from any serializable value.
    pub fn json_body<T: serde::Serialize + ?Sized>(self, value: &T) -> Result<Self, EncodeError> {
        Ok(self.body(Payload::json(value)?))
    }

    pub fn serialize_payload(mut self, policy: SerializePolicy) -> Self {
        self.serialize_policy = policy;
        self
    }

    pub fn with_auto_parse(mut self, auto_parse: bool) -> Self {
        self.auto_parse = auto_parse;
        self
    }

    /// Responses keep their body as raw text.
    pub fn without_auto_parsing(self) -> Self {
        self.with_auto_parse(false)
    }

    pub fn with_strict_tls(mut self, strict_tls: bool) -> Self {
        self.strict_tls = strict_tls;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn use_proxy<P: Into<String>>(mut self, endpoint: P) -> Self {
        self.proxy = Some(endpoint.into());
        self
    }

    /// Replaces where environment defaults, such as the proxy, are read from.
    pub fn with_config_source<C: ConfigSource + Send + Sync + 'static>(mut self, source: C) -> Self {
        self.config_source = Arc::new(source);
        self
    }

    /// Sets a header, replacing any value of the same name.
    pub fn header<N: AsRef<str>, V: Into<String>>(mut self, name: N, value: V) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Alias of [`header`](Self::header).
    pub fn add_header<N: AsRef<str>, V: Into<String>>(self, name: N, value: V) -> Self {
        self.header(name, value)
    }

    pub fn with_headers<I, N, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.headers.insert(name, value);
        }
        self
    }

    /// Sets `User-Agent`. An empty value is still sent, as `User-Agent:`.
    pub fn with_user_agent<S: Into<String>>(self, user_agent: S) -> Self {
        self.header("User-Agent", user_agent)
    }

    pub fn authenticate_with<U: Into<String>, P: Into<String>>(self, username: U, password: P) -> Self {
        self.with_basic_auth(username, password)
    }

    pub fn with_basic_auth<U: Into<String>, P: Into<String>>(mut self, username: U, password: P) -> Self {
        self.auth = AuthMechanism::Basic;
        self.credentials = Some(Credentials::new(username, password));
        self
    }

    /// Digest credentials are handed to the transport, which answers the
    /// server's challenge.
    pub fn with_digest_auth<U: Into<String>, P: Into<String>>(mut self, username: U, password: P) -> Self {
        self.auth = AuthMechanism::Digest;
        self.credentials = Some(Credentials::new(username, password));
        self
    }

    /// Attaches files as `field → path` pairs and switches to a multipart
    /// upload that is never serialized.
    pub fn attach<I, F, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = (F, P)>,
        F: Into<String>,
        P: Into<String>,
    {
        self.payload = Payload::Files(files.into_iter().map(|(field, path)| (field.into(), path.into())).collect());
        self.content_type = Some(MimeType::resolve(mime::UPLOAD));
        self.serialize_policy = SerializePolicy::Never;
        self
    }

    /// Appends `key=value` to the query string.
    ///
    /// Nothing happens when either `key` or `value` is empty.
    pub fn param<K: AsRef<str>, V: AsRef<str>>(mut self, key: K, value: V) -> Self {
        let (key, value) = (key.as_ref(), value.as_ref());
        if key.is_empty() || value.is_empty() {
            return self;
        }

        let Ok(pair) = serde_urlencoded::to_string([(key, value)]) else {
            return self;
        };
        let (base, fragment) = match self.uri.find('#') {
            Some(at) => self.uri.split_at(at),
            None => (self.uri.as_str(), ""),
        };
        let separator = match base.find('?') {
            None => "?",
            Some(_) if base.ends_with('?') || base.ends_with('&') => "",
            Some(_) => "&",
        };
        self.uri = format!("{base}{separator}{pair}{fragment}");
        self
    }

    /// Runs after the payload is serialized, right before transmission.
    ///
    /// The hook may change the request; the URI is read again afterwards.
    pub fn before_send<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Request) + Send + Sync + 'static,
    {
        self.before_send = Some(Arc::new(hook));
        self
    }

    /// Called with a transport failure before it is returned.
    pub fn when_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&TransportError) + Send + Sync + 'static,
    {
        self.when_error = Some(Arc::new(hook));
        self
    }

    pub fn set_uri<U: Into<String>>(&mut self, uri: U) {
        self.uri = uri.into();
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// The canonical send type.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_ref().map(MimeType::as_str)
    }

    /// The canonical expect type.
    pub fn expected_type(&self) -> Option<&str> {
        self.expected_type.as_ref().map(MimeType::as_str)
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn serialize_policy(&self) -> SerializePolicy {
        self.serialize_policy
    }

    /// The body bytes produced by the last [`prepare`](Self::prepare).
    pub fn serialized_payload(&self) -> Option<&Bytes> {
        self.serialized_payload.as_ref()
    }

    pub fn is_auto_parse(&self) -> bool {
        self.auto_parse
    }

    pub fn is_strict_tls(&self) -> bool {
        self.strict_tls
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn auth_mechanism(&self) -> AuthMechanism {
        self.auth
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn has_basic_auth(&self) -> bool {
        self.auth == AuthMechanism::Basic && self.credentials.is_some()
    }

    pub fn has_digest_auth(&self) -> bool {
        self.auth == AuthMechanism::Digest && self.credentials.is_some()
    }

    pub fn is_upload(&self) -> bool {
        self.content_type() == Some(mime::UPLOAD)
    }

    /// The explicit proxy, or the one configured in the environment.
    pub fn proxy(&self) -> Option<String> {
        self.proxy.clone().or_else(|| config::env_proxy(&*self.config_source))
    }

    pub fn has_proxy(&self) -> bool {
        self.proxy().is_some()
    }

    fn serialize_body(&self, codecs: &CodecTable) -> Result<Bytes, EncodeError> {
        let codec = self.content_type.as_ref().and_then(|content_type| codecs.lookup(content_type.as_str()));
        self.payload.serialize(self.serialize_policy, codec.as_deref())
    }

    fn final_headers(&self, body: &Bytes) -> Headers {
        let mut headers = self.headers.clone();

        if !headers.contains("Accept") {
            let accept = self.expected_type().unwrap_or("*/*");
            headers.insert("Accept", accept);
        }
        if let Some(content_type) = self.content_type()
            && !headers.contains("Content-Type")
        {
            headers.insert("Content-Type", content_type);
        }
        if !body.is_empty() {
            let length = std::str::from_utf8(body).map_or(body.len(), determine_length);
            headers.insert("Content-Length", length.to_string());
        }
        if !headers.contains("User-Agent") {
            headers.insert("User-Agent", self.default_user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT));
        }
        if let (AuthMechanism::Basic, Some(credentials)) = (self.auth, &self.credentials)
            && !headers.contains("Authorization")
        {
            headers.insert("Authorization", credentials.basic_authorization());
        }

        headers
    }

    /// Serializes the payload, runs the `before_send` hook and builds the
    /// request handed to the transport.
    ///
    /// Header names and values must be valid HTTP tokens and field values; a
    /// line break in a value or in the URI is rejected rather than written.
    pub fn prepare(&mut self, codecs: &CodecTable) -> Result<OutgoingRequest, FetchError> {
        ensure!(!self.uri.is_empty(), FetchError::invalid_request("missing uri"));

        let body = self.serialize_body(codecs)?;
        self.serialized_payload = Some(body.clone());

        if let Some(hook) = self.before_send.clone() {
            hook(self);
        }

        ensure!(
            !self.uri.contains(['\r', '\n']),
            FetchError::invalid_request("uri contains a line break")
        );
        let headers = self.final_headers(&body);
        if let Err(error) = HeaderMap::try_from(&headers) {
            return Err(FetchError::invalid_request(format!("invalid header: {error}")));
        }

        let mut head = BytesMut::new();
        HeaderEncoder.encode(&self.method, &self.uri, &headers, &mut head);

        let options = TransportOptions {
            strict_tls: self.strict_tls,
            timeout: self.timeout,
            proxy: self.proxy(),
            digest: self.has_digest_auth().then(|| self.credentials.clone()).flatten(),
        };

        Ok(OutgoingRequest {
            method: self.method.clone(),
            uri: self.uri.clone(),
            headers,
            raw_headers: String::from_utf8_lossy(&head).into_owned(),
            body,
            files: self.payload.files().to_vec(),
            options,
        })
    }

    /// Sends the request and decodes the response with the global codec table.
    pub fn send<T: Transport + ?Sized>(self, transport: &T) -> Result<Response, FetchError> {
        self.send_with(transport, CodecTable::global())
    }

    pub fn send_with<T: Transport + ?Sized>(mut self, transport: &T, codecs: &CodecTable) -> Result<Response, FetchError> {
        let outgoing = self.prepare(codecs)?;
        debug!(method = %outgoing.method, uri = %outgoing.uri, body_len = outgoing.body.len(), "dispatching request");

        match transport.transmit(&outgoing) {
            Ok(raw) => ResponseDecoder::new(codecs).decode(&raw.head, raw.body, &self),
            Err(error) => {
                warn!(uri = %outgoing.uri, error = %error, "transport failed");
                if let Some(hook) = &self.when_error {
                    hook(&error);
                }
                Err(error.into())
            }
        }
    }
}

impl Default for Request {
    fn default() -> Self {
        Self::init()
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("headers", &self.headers)
            .field("content_type", &self.content_type())
            .field("expected_type", &self.expected_type())
            .field("auth", &self.auth)
            .field("payload", &self.payload)
            .field("serialize_policy", &self.serialize_policy)
            .field("auto_parse", &self.auto_parse)
            .field("strict_tls", &self.strict_tls)
            .finish_non_exhaustive()
    }
}

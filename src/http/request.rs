use anyhow::{Context, Result};
use hyper::ext::ReasonPhrase;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Request, Response, StatusCode, Url};

/// A single outgoing request and, once sent, the response it received.
#[derive(Debug)]
pub struct HttpRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    response: Option<Response>,
}

impl HttpRequest {
    pub fn new(method: Method, url: &str) -> Result<Self> {
        let url = Url::parse(url).with_context(|| format!("Invalid request URL '{}'", url))?;
        Ok(Self {
            method,
            url,
            headers: HeaderMap::new(),
            response: None,
        })
    }

    pub fn get(url: &str) -> Result<Self> {
        Self::new(Method::GET, url)
    }

    pub fn head(url: &str) -> Result<Self> {
        Self::new(Method::HEAD, url)
    }

    pub fn put(url: &str) -> Result<Self> {
        Self::new(Method::PUT, url)
    }

    pub fn delete(url: &str) -> Result<Self> {
        Self::new(Method::DELETE, url)
    }

    /// Adds a header sent with this request. Repeated names are appended.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .with_context(|| format!("Invalid header name '{}'", name))?;
        let value = HeaderValue::from_str(value)
            .with_context(|| format!("Invalid value for header '{}'", name))?;
        self.headers.append(name, value);
        Ok(self)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Builds the transport-level request. A new value is produced on every call,
    /// so the same `HttpRequest` can be dispatched more than once.
    pub fn transport_request(&self) -> Request {
        let mut request = Request::new(self.method.clone(), self.url.clone());
        *request.headers_mut() = self.headers.clone();
        request
    }

    /// The received response, if the request has been sent.
    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    /// Takes ownership of the response, e.g. to read its body.
    pub fn take_response(&mut self) -> Option<Response> {
        self.response.take()
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.response.as_ref().map(Response::status)
    }

    /// Reason phrase of the response, as sent by the server.
    pub fn reason(&self) -> Option<String> {
        self.response.as_ref().map(reason_phrase)
    }

    /// URL the response was obtained from after following redirects.
    pub fn effective_url(&self) -> Option<&Url> {
        self.response.as_ref().map(Response::url)
    }

    pub(crate) fn set_response(&mut self, response: Response) {
        self.response = Some(response);
    }
}

/// Reason phrase the server sent. hyper only keeps non-canonical phrases, so
/// the canonical phrase of the status is used otherwise.
pub fn reason_phrase(response: &Response) -> String {
    match response.extensions().get::<ReasonPhrase>() {
        Some(phrase) => String::from_utf8_lossy(phrase.as_bytes()).into_owned(),
        None => response
            .status()
            .canonical_reason()
            .unwrap_or_default()
            .to_string(),
    }
}

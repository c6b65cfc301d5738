//! Read-only views of the HTTP-like messages a pact is checked against.
//!
//! Transport is out of scope: callers hand over already-materialized parts.

/// A request as seen by the matcher.
pub trait RequestMessage {
    fn method(&self) -> &str;
    fn path(&self) -> &str;
    /// Header `(name, value)` pairs in arrival order. Names may repeat.
    fn headers(&self) -> &[(String, String)];
    fn body(&self) -> &[u8];
}

/// A response as seen by the matcher.
pub trait ResponseMessage {
    fn status_code(&self) -> u16;
    fn headers(&self) -> &[(String, String)];
    fn body(&self) -> &[u8];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }
}

impl RequestMessage for HttpRequest {
    fn method(&self) -> &str {
        &self.method
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    fn body(&self) -> &[u8] {
        &self.body
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status_code: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }
}

impl ResponseMessage for HttpResponse {
    fn status_code(&self) -> u16 {
        self.status_code
    }

    fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    fn body(&self) -> &[u8] {
        &self.body
    }
}

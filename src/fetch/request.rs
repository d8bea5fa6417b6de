// src/fetch/request.rs
use std::fmt;

/// Client identity sent with every request.
pub const USER_AGENT: &str = "ServiceMonitorAgent/1.0";

/// Header attached to every request that carries a body.
pub const JSON_CONTENT_TYPE: (&str, &str) = ("Content-Type", "application/json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

/// Unknown verbs are treated as GET, never rejected.
impl From<&str> for Method {
    fn from(verb: &str) -> Self {
        match verb {
            "POST" => Method::Post,
            "PUT" => Method::Put,
            _ => Method::Get,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the caller asks for: target, verb and optional body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub url: String,
    pub method: Method,
    pub body: Option<String>,
}

impl RequestSpec {
    pub fn new(url: impl Into<String>, method: impl Into<Method>, body: Option<String>) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            body,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(url, Method::Get, None)
    }

    pub fn post(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(url, Method::Post, Some(body.into()))
    }

    pub fn put(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(url, Method::Put, Some(body.into()))
    }
}

/// The exact exchange handed to a transport handle, after the verb policy
/// has been applied to a [`RequestSpec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub url: String,
    pub verb: Method,
    pub body: Option<String>,
    pub headers: Vec<(&'static str, &'static str)>,
    pub user_agent: &'static str,
}

impl PreparedRequest {
    pub fn from_spec(spec: &RequestSpec) -> Self {
        let (body, headers) = match spec.method {
            Method::Get => (None, Vec::new()),
            // PUT reuses the POST body path with the verb overridden
            Method::Post | Method::Put => (
                Some(spec.body.clone().unwrap_or_default()),
                vec![JSON_CONTENT_TYPE],
            ),
        };

        Self {
            url: spec.url.clone(),
            verb: spec.method,
            body,
            headers,
            user_agent: USER_AGENT,
        }
    }

    pub fn header_count(&self, name: &str) -> usize {
        self.headers
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(name))
            .count()
    }
}

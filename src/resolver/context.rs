//! Read-only view of the request data the resolver needs.
//!
//! # Responsibilities
//! - Case-insensitive header lookup
//! - Join repeated header lines into one comma-separated value
//! - Expose the transport peer address (IP only, no port)

use std::borrow::Cow;
use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::{request::Parts, Extensions, HeaderMap, Request};

/// Anything that can answer "what does header X say" and "who is the peer".
pub trait RequestContext {
    /// Raw value of a header, or `None` if it is absent or not valid text.
    fn header(&self, name: &str) -> Option<Cow<'_, str>>;

    /// Address of the direct transport peer, if known.
    fn remote_addr(&self) -> Option<String>;
}

/// Look up a header in a [`HeaderMap`], joining repeated lines with `,`.
fn header_from_map<'a>(headers: &'a HeaderMap, name: &str) -> Option<Cow<'a, str>> {
    let mut values = headers.get_all(name).iter().filter_map(|v| v.to_str().ok());
    let first = values.next()?;
    match values.next() {
        None => Some(Cow::Borrowed(first)),
        Some(second) => {
            let mut joined = format!("{},{}", first, second);
            for value in values {
                joined.push(',');
                joined.push_str(value);
            }
            Some(Cow::Owned(joined))
        }
    }
}

fn remote_from_extensions(extensions: &Extensions) -> Option<String> {
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
}

impl<B> RequestContext for Request<B> {
    fn header(&self, name: &str) -> Option<Cow<'_, str>> {
        header_from_map(self.headers(), name)
    }

    fn remote_addr(&self) -> Option<String> {
        remote_from_extensions(self.extensions())
    }
}

impl RequestContext for Parts {
    fn header(&self, name: &str) -> Option<Cow<'_, str>> {
        header_from_map(&self.headers, name)
    }

    fn remote_addr(&self) -> Option<String> {
        remote_from_extensions(&self.extensions)
    }
}

/// Owned request data, for callers outside an HTTP server (CLI, tests).
#[derive(Debug, Clone, Default)]
pub struct RequestSnapshot {
    headers: Vec<(String, String)>,
    remote_addr: Option<String>,
}

impl RequestSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header line. Repeated names are kept and joined on lookup.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_remote_addr(mut self, addr: impl Into<String>) -> Self {
        self.remote_addr = Some(addr.into());
        self
    }
}

impl RequestContext for RequestSnapshot {
    fn header(&self, name: &str) -> Option<Cow<'_, str>> {
        let mut values = self
            .headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str());
        let first = values.next()?;
        let rest: Vec<&str> = values.collect();
        if rest.is_empty() {
            Some(Cow::Borrowed(first))
        } else {
            let mut joined = first.to_string();
            for value in rest {
                joined.push(',');
                joined.push_str(value);
            }
            Some(Cow::Owned(joined))
        }
    }

    fn remote_addr(&self) -> Option<String> {
        self.remote_addr.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_request_header_lookup_is_case_insensitive() {
        let req = Request::builder()
            .header("x-forwarded-for", "1.2.3.4")
            .body(Body::empty())
            .unwrap();
        assert_eq!(req.header("X-Forwarded-For").as_deref(), Some("1.2.3.4"));
        assert!(req.header("X-Real-IP").is_none());
    }

    #[test]
    fn test_repeated_header_lines_are_joined() {
        let req = Request::builder()
            .header("X-Forwarded-For", "1.2.3.4")
            .header("X-Forwarded-For", "5.6.7.8")
            .body(Body::empty())
            .unwrap();
        assert_eq!(req.header("x-forwarded-for").as_deref(), Some("1.2.3.4,5.6.7.8"));
    }

    #[test]
    fn test_remote_addr_from_connect_info() {
        let mut req = Request::builder().body(Body::empty()).unwrap();
        assert!(req.remote_addr().is_none());

        let addr: SocketAddr = "192.168.1.10:55000".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        assert_eq!(req.remote_addr().as_deref(), Some("192.168.1.10"));

        let (parts, _) = req.into_parts();
        assert_eq!(parts.remote_addr().as_deref(), Some("192.168.1.10"));
    }

    #[test]
    fn test_snapshot_lookup() {
        let snapshot = RequestSnapshot::new()
            .with_header("X-Real-IP", "10.0.0.1")
            .with_header("x-real-ip", "10.0.0.2")
            .with_remote_addr("127.0.0.1");
        assert_eq!(snapshot.header("X-REAL-IP").as_deref(), Some("10.0.0.1,10.0.0.2"));
        assert_eq!(snapshot.remote_addr().as_deref(), Some("127.0.0.1"));
    }
}

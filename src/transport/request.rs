//! Request descriptors.
//!
//! # Responsibilities
//! - Describe one logical call (method, path, body, options)
//! - Serialize GET/DELETE bodies into query pairs

use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// HTTP methods the backend API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Methods whose body travels in the query string.
    pub fn carries_query(&self) -> bool {
        matches!(self, Method::Get | Method::Delete)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            other => Err(format!("unsupported method: {}", other)),
        }
    }
}

/// Per-call overrides.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Replaces the configured API timeout.
    pub timeout: Option<Duration>,
    /// Applied after the configured defaults; same-named defaults are replaced.
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// One logical request, built fresh per call.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Path below the API root, e.g. `/users/login`.
    pub path: String,
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
    pub options: RequestOptions,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            query: Vec::new(),
            options: RequestOptions::default(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Query pairs and JSON body as they go on the wire.
    pub(crate) fn into_wire(self) -> (Vec<(String, String)>, Option<Value>) {
        let mut query = self.query;
        if !self.method.carries_query() {
            return (query, self.body);
        }
        if let Some(body) = &self.body {
            query.extend(query_pairs(body));
        }
        (query, None)
    }
}

/// Flatten an object body into query pairs.
///
/// Strings are sent raw, nulls are skipped, nested values are JSON-encoded.
/// A body that is not an object yields no pairs.
pub fn query_pairs(body: &Value) -> Vec<(String, String)> {
    let Value::Object(map) = body else {
        if !body.is_null() {
            tracing::warn!("Ignoring non-object query body");
        }
        return Vec::new();
    };

    map.iter()
        .filter_map(|(k, v)| {
            let value = match v {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                nested => nested.to_string(),
            };
            Some((k.clone(), value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_pairs() {
        let pairs = query_pairs(&json!({
            "page": 2,
            "keyword": "dragon egg",
            "onSale": true,
            "cursor": null,
            "tags": ["a", "b"],
        }));
        assert!(pairs.contains(&("page".into(), "2".into())));
        assert!(pairs.contains(&("keyword".into(), "dragon egg".into())));
        assert!(pairs.contains(&("onSale".into(), "true".into())));
        assert!(pairs.contains(&("tags".into(), "[\"a\",\"b\"]".into())));
        assert!(!pairs.iter().any(|(k, _)| k == "cursor"));

        assert!(query_pairs(&json!([1, 2])).is_empty());
    }

    #[test]
    fn test_get_and_delete_move_body_to_query() {
        let (query, body) = RequestDescriptor::get("/assets")
            .query("sort", "new")
            .body(json!({ "page": 1 }))
            .into_wire();
        assert_eq!(query, vec![("sort".into(), "new".into()), ("page".into(), "1".into())]);
        assert!(body.is_none());

        let (query, body) = RequestDescriptor::new(Method::Delete, "/offers/3")
            .body(json!({ "reason": "expired" }))
            .into_wire();
        assert_eq!(query, vec![("reason".into(), "expired".into())]);
        assert!(body.is_none());

        let (query, body) = RequestDescriptor::post("/trades").body(json!({ "id": 1 })).into_wire();
        assert!(query.is_empty());
        assert_eq!(body, Some(json!({ "id": 1 })));
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("patch".parse::<Method>().unwrap(), Method::Patch);
        assert!("TRACE".parse::<Method>().is_err());
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }
}

use serde::{Deserialize, Serialize};

/// HTTP methods the dispatcher is willing to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// Case-insensitive parse. Anything outside GET/POST/PUT/DELETE is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "DELETE" => Some(HttpMethod::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `Cookie: name=content` header pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookiePair {
    pub name: String,
    pub content: String,
}

/// Basic-auth credentials passed through to the target host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

/// One outbound HTTP call: method, absolute URL, optional cookie pair and
/// optional basic-auth pair.
///
/// The method stays a plain string at this boundary — it is validated when
/// the call is dispatched, so a stored job with a bad method fails at send
/// time rather than at deserialization time. Presence of the cookie or
/// credential pair is the authoritative flag; there is no separate boolean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSpec {
    pub method: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie: Option<CookiePair>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_auth: Option<BasicAuth>,
}

impl RequestSpec {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            cookie: None,
            basic_auth: None,
        }
    }

    pub fn with_cookie(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.cookie = Some(CookiePair {
            name: name.into(),
            content: content.into(),
        });
        self
    }

    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.basic_auth = Some(BasicAuth {
            username: username.into(),
            password: password.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parse_is_case_insensitive() {
        assert_eq!(HttpMethod::parse("get"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::parse("GET"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::parse("dElEtE"), Some(HttpMethod::Delete));
        assert_eq!(HttpMethod::parse("PATCH"), None);
        assert_eq!(HttpMethod::parse(""), None);
    }

    #[test]
    fn builder_sets_pairs() {
        let spec = RequestSpec::new("POST", "https://example.test/hook")
            .with_cookie("session", "abc123")
            .with_basic_auth("svc", "hunter2");

        let cookie = spec.cookie.as_ref().unwrap();
        assert_eq!(cookie.name, "session");
        assert_eq!(cookie.content, "abc123");
        assert_eq!(spec.basic_auth.as_ref().unwrap().username, "svc");
    }

    #[test]
    fn pairs_absent_by_default() {
        let spec = RequestSpec::new("GET", "https://example.test/");
        assert!(spec.cookie.is_none());
        assert!(spec.basic_auth.is_none());
    }
}

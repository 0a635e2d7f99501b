//! Per-call request options and query parameters.

use std::time::Duration;

use serde_json::Value;

/// Query parameters attached to a request URL.
///
/// Keys are unique: setting a key again replaces its values. A key may carry
/// several values, in which case it is repeated once per value when encoded
/// (`tag=a&tag=b`). Insertion order is preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, Vec<String>)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to a single value.
    pub fn param(self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params(key, [value])
    }

    /// Set `key` to a list of values.
    pub fn params<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        let key = key.into();
        let values: Vec<String> = values.into_iter().map(|v| v.to_string()).collect();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = values,
            None => self.pairs.push((key, values)),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `application/x-www-form-urlencoded` serialization, one pair per value.
    pub fn encode(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, values) in &self.pairs {
            for value in values {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Query {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Query::new(), |query, (key, value)| query.param(key, value))
    }
}

impl<K: Into<String>, V: ToString, const N: usize> From<[(K, V); N]> for Query {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Options recognized by `Client::dispatch`.
///
/// `query` feeds the URL builder, `data` becomes the JSON body, `timeout`
/// overrides the client default, `key`/`response_key` select the value to
/// unwrap from the response. Headers are handed to the transport untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub query: Option<Query>,
    pub data: Option<Value>,
    pub timeout: Option<Duration>,
    pub key: Option<String>,
    pub response_key: Option<String>,
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, query: impl Into<Query>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Short alias for `response_key`; takes precedence when both are set.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn response_key(mut self, key: impl Into<String>) -> Self {
        self.response_key = Some(key.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn bearer_auth(self, token: impl AsRef<str>) -> Self {
        let value = format!("Bearer {}", token.as_ref());
        self.header("authorization", value)
    }

    /// The response key in effect for this call.
    pub fn effective_response_key(&self) -> Option<&str> {
        self.key.as_deref().or(self.response_key.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_param_replaces_previous_values() {
        let query = Query::new().param("a", 1).param("a", 2);
        assert_eq!(query.get("a"), Some(&["2".to_string()][..]));
        assert_eq!(query.encode(), "a=2");
    }

    #[test]
    fn list_values_repeat_the_key() {
        let query = Query::new().params("tag", ["x", "y"]).param("page", 3);
        assert_eq!(query.encode(), "tag=x&tag=y&page=3");
    }

    #[test]
    fn encoding_escapes_reserved_characters() {
        let query = Query::from([("q", "a b&c")]);
        assert_eq!(query.encode(), "q=a+b%26c");
    }

    #[test]
    fn key_wins_over_response_key() {
        let options = RequestOptions::new().response_key("data").key("result");
        assert_eq!(options.effective_response_key(), Some("result"));

        let options = RequestOptions::new().response_key("data");
        assert_eq!(options.effective_response_key(), Some("data"));

        assert_eq!(RequestOptions::new().effective_response_key(), None);
    }

    #[test]
    fn bearer_auth_adds_authorization_header() {
        let options = RequestOptions::new().bearer_auth("t0ken");
        assert_eq!(
            options.headers,
            vec![("authorization".to_string(), "Bearer t0ken".to_string())]
        );
    }
}

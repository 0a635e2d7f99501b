//! Chained resource paths.
//!
//! `client.resource(&["users"]).resource(&["42", "posts"]).get(&[], opts)`
//! issues `GET <endpoint>/users/42/posts/`. Every `resource` call returns a
//! new value; the receiver keeps its own segments, so a base resource can be
//! reused from any number of call sites.

use serde_json::Value;

use crate::client::Client;
use crate::error::Error;
use crate::http::{HttpMethod, Transport};
use crate::types::RequestOptions;

/// Generates the explicit verb methods on top of a `call` method.
macro_rules! verb_methods {
    () => {
        verb_methods!(
            get => Get,
            post => Post,
            put => Put,
            patch => Patch,
            delete => Delete,
            head => Head,
            options => Options,
        );
    };
    ($($name:ident => $variant:ident),+ $(,)?) => {
        $(
            #[doc = concat!("Dispatch `", stringify!($variant), "` with extra trailing segments.")]
            pub fn $name(
                &self,
                segments: &[&str],
                options: $crate::types::RequestOptions,
            ) -> Result<Option<serde_json::Value>, $crate::error::Error<T::Error>> {
                self.call($crate::http::HttpMethod::$variant, segments, options)
            }
        )+
    };
}

pub(crate) use verb_methods;

/// An accumulated resource path bound to a client.
#[derive(Debug)]
pub struct Resource<'a, T> {
    client: &'a Client<T>,
    segments: Vec<String>,
}

impl<T> Clone for Resource<'_, T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client,
            segments: self.segments.clone(),
        }
    }
}

impl<'a, T: Transport> Resource<'a, T> {
    pub(crate) fn new(client: &'a Client<T>, segments: Vec<String>) -> Self {
        Self { client, segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Extend the path, leaving `self` untouched.
    pub fn resource(&self, segments: &[&str]) -> Resource<'a, T> {
        Resource::new(self.client, self.joined(segments))
    }

    /// Dispatch any verb on this path plus `segments`.
    pub fn call(
        &self,
        method: impl Into<HttpMethod>,
        segments: &[&str],
        options: RequestOptions,
    ) -> Result<Option<Value>, Error<T::Error>> {
        self.client
            .dispatch(method.into(), &self.joined(segments), options)
    }

    verb_methods!();

    fn joined(&self, extra: &[&str]) -> Vec<String> {
        self.segments
            .iter()
            .cloned()
            .chain(extra.iter().map(|s| s.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::http::{HttpRequest, HttpResponse};

    #[derive(Debug, Default)]
    struct Recorder {
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl Transport for Recorder {
        type Error = std::io::Error;

        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Self::Error> {
            self.requests.lock().unwrap().push(request);
            Ok(HttpResponse::new(200, "{}"))
        }
    }

    impl Recorder {
        fn urls(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.url.clone())
                .collect()
        }
    }

    #[test]
    fn chained_resources_accumulate_in_order() {
        let client = Client::new("http://host", Recorder::default()).unwrap();
        client
            .resource(&["a"])
            .resource(&["b", "c"])
            .get(&[], RequestOptions::new())
            .unwrap();
        assert_eq!(client.transport().urls(), vec!["http://host/a/b/c/"]);
    }

    #[test]
    fn extending_does_not_mutate_the_base() {
        let client = Client::new("http://host", Recorder::default()).unwrap();
        let users = client.resource(&["users"]);
        let one = users.resource(&["1"]);
        let two = users.resource(&["2"]);

        assert_eq!(users.segments(), ["users"]);
        assert_eq!(one.segments(), ["users", "1"]);
        assert_eq!(two.segments(), ["users", "2"]);

        users.get(&[], RequestOptions::new()).unwrap();
        one.get(&["posts"], RequestOptions::new()).unwrap();
        two.delete(&[], RequestOptions::new()).unwrap();
        assert_eq!(
            client.transport().urls(),
            vec![
                "http://host/users/",
                "http://host/users/1/posts/",
                "http://host/users/2/",
            ]
        );
    }

    #[test]
    fn verbs_map_to_methods() {
        let client = Client::new("http://host", Recorder::default()).unwrap();
        let items = client.resource(&["items"]);
        items.post(&[], RequestOptions::new()).unwrap();
        items.put(&[], RequestOptions::new()).unwrap();
        items.patch(&[], RequestOptions::new()).unwrap();
        items.head(&[], RequestOptions::new()).unwrap();
        items.options(&[], RequestOptions::new()).unwrap();
        items.call("LINK", &[], RequestOptions::new()).unwrap();

        let methods: Vec<HttpMethod> = client
            .transport()
            .requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.method.clone())
            .collect();
        assert_eq!(
            methods,
            vec![
                HttpMethod::Post,
                HttpMethod::Put,
                HttpMethod::Patch,
                HttpMethod::Head,
                HttpMethod::Options,
                HttpMethod::Other("LINK".to_string()),
            ]
        );
    }
}

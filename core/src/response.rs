//! Status-code classification and response-key extraction.
//!
//! # Design
//! `ResponsePolicy::classify` is pure: it sees a status code, an already
//! decoded body and an optional response key, and decides the outcome. The
//! order of checks matters and is part of the contract:
//!
//! 1. A falsy body (`null`, `false`, zero, `""`, `[]`, `{}`) skips every
//!    status check, so `500` with `{}` passes through as `{}`.
//! 2. With a response key and an ok status, the key is extracted.
//! 3. With a response key and a none status, the outcome is null.
//! 4. A status in neither set is rejected.
//! 5. Anything else passes through.
//! 6. With a response key and `empty_to_none`, a falsy result becomes null.
//!
//! A status listed in both sets is treated as ok when a key is requested,
//! because step 2 runs before step 3.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::error::ResponseErrorKind;

pub const DEFAULT_OK_STATUSES: [u16; 2] = [200, 202];
pub const DEFAULT_TO_NONE_STATUSES: [u16; 1] = [404];

/// Classification sets and the empty-to-null switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsePolicy {
    pub ok_statuses: BTreeSet<u16>,
    pub to_none_statuses: BTreeSet<u16>,
    pub empty_to_none: bool,
}

impl Default for ResponsePolicy {
    fn default() -> Self {
        Self {
            ok_statuses: DEFAULT_OK_STATUSES.into_iter().collect(),
            to_none_statuses: DEFAULT_TO_NONE_STATUSES.into_iter().collect(),
            empty_to_none: true,
        }
    }
}

impl ResponsePolicy {
    /// Turn a decoded body into the call outcome. `None` stands for null.
    pub fn classify(
        &self,
        status: u16,
        body: Value,
        response_key: Option<&str>,
    ) -> Result<Option<Value>, ResponseErrorKind> {
        let is_ok = self.ok_statuses.contains(&status);
        let is_none = self.to_none_statuses.contains(&status);

        let result = if is_falsy(&body) {
            body
        } else {
            match response_key {
                Some(key) if is_ok => extract(body, key)?,
                Some(_) if is_none => Value::Null,
                _ if !is_ok && !is_none => {
                    return Err(ResponseErrorKind::UnexpectedStatus {
                        status,
                        ok_statuses: self.ok_statuses.iter().copied().collect(),
                    })
                }
                _ => body,
            }
        };

        if result.is_null() || (response_key.is_some() && self.empty_to_none && is_falsy(&result)) {
            return Ok(None);
        }
        Ok(Some(result))
    }
}

fn extract(body: Value, key: &str) -> Result<Value, ResponseErrorKind> {
    match body {
        Value::Object(mut map) if map.contains_key(key) => Ok(map.remove(key).unwrap_or(Value::Null)),
        _ => Err(ResponseErrorKind::ResponseKeyNotFound {
            key: key.to_string(),
        }),
    }
}

/// `null`, `false`, any zero, and empty strings, lists and objects.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

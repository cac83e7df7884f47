use serde::Serialize;
use std::collections::HashMap;

use crate::config::AuthMethod;

/// What the HTTP layer hands over for caller verification.
///
/// Header names are lowercased by the caller.
#[derive(Debug, Clone, Default)]
pub struct CallerRequest {
    pub headers: HashMap<String, String>,
}

impl CallerRequest {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            headers: pairs
                .into_iter()
                .map(|(name, value)| (name.to_ascii_lowercase(), value.to_string()))
                .collect(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// A verified API caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Caller {
    pub id: String,
    pub method: AuthMethod,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self {
            id: "anonymous".to_string(),
            method: AuthMethod::None,
        }
    }
}

//! Transport-level request descriptors.

use serde::{Deserialize, Serialize};

/// Path and query of one feed request, independent of host and credentials.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestDescriptor {
    /// Absolute path, e.g. `/svc/mostpopular/v2/viewed/1.json`.
    pub path: String,
    /// Query parameters in order.
    pub query: Vec<(String, String)>,
}

impl RequestDescriptor {
    /// Creates a descriptor without query parameters.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Appends a query parameter.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }
}

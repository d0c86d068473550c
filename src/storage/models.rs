use serde::{Deserialize, Serialize};

/// A persisted short path and the URL it redirects to.
///
/// JSON bodies use `Path`/`Url`, seed files use `path`/`url`; either
/// spelling is accepted on input. Both fields are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    #[serde(rename = "Path", alias = "path")]
    pub path: String,
    #[serde(rename = "Url", alias = "url", alias = "URL")]
    pub url: String,
}

impl Mapping {
    pub fn new(path: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            url: url.into(),
        }
    }
}

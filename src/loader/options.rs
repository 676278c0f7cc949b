use serde::{Deserialize, Serialize};

use crate::Result;

/// What a model load does when it meets a header with an unknown type tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownLayer {
    /// Keep the layers loaded so far and stop reading.
    #[default]
    Stop,
    /// Fail with `UnknownLayerType`.
    Fail,
}

/// Options for loading a whole [`crate::Model`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    pub on_unknown: UnknownLayer,
    /// Stop after this many layers, leaving the rest of the stream unread.
    pub max_layers: Option<usize>,
}

impl LoadOptions {
    /// Parses options from JSON, missing fields taking their default value.
    ///
    /// ```
    /// use wavernn::{LoadOptions, UnknownLayer};
    ///
    /// let options = LoadOptions::from_json(r#"{ "on_unknown": "fail" }"#).unwrap();
    /// assert_eq!(options.on_unknown, UnknownLayer::Fail);
    /// assert_eq!(options.max_layers, None);
    /// ```
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

//! Blueprint naming configuration
//!
//! A blueprint name that already carries the structured-text extension is
//! used verbatim; any other name gets the binary extension appended.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlueprintNaming {
    pub text_extension: String,
    pub binary_extension: String,
}

impl BlueprintNaming {
    /// Resolve a blueprint name to the filename handed to the asset loader.
    pub fn resolve<'a>(&self, name: &'a str) -> Cow<'a, str> {
        if name.ends_with(self.text_extension.as_str()) {
            Cow::Borrowed(name)
        } else {
            Cow::Owned(format!("{name}{}", self.binary_extension))
        }
    }
}

impl Default for BlueprintNaming {
    fn default() -> Self {
        Self {
            text_extension: ".json".to_string(),
            binary_extension: ".bin".to_string(),
        }
    }
}

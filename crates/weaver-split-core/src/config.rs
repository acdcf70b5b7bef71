use serde::{Deserialize, Serialize};

use crate::error::SplitError;

/// Class names and initial state for the split layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SplitConfig {
    /// Class of the two-column wrapper element.
    pub wrapper_class: String,
    /// Class of the secondary pane element.
    pub pane_class: String,
    /// Class toggled on the pane to hide it.
    pub hidden_class: String,
    /// Start with the secondary pane hidden.
    pub start_hidden: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            wrapper_class: "weaver-two-columns-wrapper".to_owned(),
            pane_class: "weaver-split-editor".to_owned(),
            hidden_class: "hidden".to_owned(),
            start_hidden: false,
        }
    }
}

impl SplitConfig {
    /// Reject class names the DOM would refuse.
    pub fn validate(&self) -> Result<(), SplitError> {
        for (field, value) in [
            ("wrapperClass", &self.wrapper_class),
            ("paneClass", &self.pane_class),
            ("hiddenClass", &self.hidden_class),
        ] {
            if value.is_empty() || value.chars().any(char::is_whitespace) {
                return Err(SplitError::Config(format!(
                    "{field} must be a single non-empty class name, got {value:?}"
                )));
            }
        }
        if self.wrapper_class == self.pane_class {
            return Err(SplitError::Config(
                "wrapperClass and paneClass must differ".to_owned(),
            ));
        }
        Ok(())
    }
}

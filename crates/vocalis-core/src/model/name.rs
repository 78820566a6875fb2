use crate::error::{Result, VocalisError};
use std::fmt;

/// Longest accepted model name, in UTF-8 bytes. Keeps `choose_model|<name>`
/// within the 64-byte callback payload limit of the transport.
pub const MAX_MODEL_NAME_BYTES: usize = 48;

/// A validated, user-supplied model name.
///
/// The name doubles as the blob file name (`<name>.ogg`), so anything that
/// could leave the user's directory is rejected here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelName(String);

impl ModelName {
    /// Trims `raw` and validates it.
    ///
    /// # Errors
    ///
    /// - `EmptyModelName` if nothing but whitespace was supplied
    /// - `InvalidModelName` for over-long names, path separators, a leading
    ///   dot or control characters
    pub fn parse(raw: &str) -> Result<Self> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(VocalisError::EmptyModelName);
        }

        let invalid = |reason| VocalisError::InvalidModelName {
            name: name.to_string(),
            reason,
        };

        if name.len() > MAX_MODEL_NAME_BYTES {
            return Err(invalid("name is too long"));
        }
        if name.contains(['/', '\\']) {
            return Err(invalid("name must not contain path separators"));
        }
        if name.starts_with('.') {
            return Err(invalid("name must not start with a dot"));
        }
        if name.chars().any(char::is_control) {
            return Err(invalid("name must not contain control characters"));
        }

        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

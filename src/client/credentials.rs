use std::collections::{BTreeMap, HashMap};

use super::ContiguityError;

/// Environment variable holding the messaging API token.
pub const TOKEN_VAR: &str = "CONTIGUITY_TOKEN";
/// Environment variable holding the collection data key.
pub const DATA_KEY_VAR: &str = "CONTIGUITY_DATA_KEY";
/// Environment variable holding the project id.
pub const PROJECT_ID_VAR: &str = "CONTIGUITY_PROJECT_ID";
/// Environment variable overriding the collection host.
pub const BASE_HOST_VAR: &str = "CONTIGUITY_BASE_HOST";

/// Named configuration values consulted by the client builders for anything
/// not passed explicitly.
pub trait CredentialSource {
    fn get(&self, name: &str) -> Option<String>;

    /// Look up `name`, failing with a message naming `description` when absent or blank.
    fn require(&self, name: &str, description: &str) -> Result<String, ContiguityError> {
        self.get(name)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ContiguityError::InvalidConfiguration {
                message: format!("no {description} provided"),
            })
    }
}

/// Reads process environment variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct Environment;

impl CredentialSource for Environment {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl CredentialSource for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}

impl CredentialSource for BTreeMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        BTreeMap::get(self, name).cloned()
    }
}

/// Resolve an explicit value, falling back to `source`.
pub(crate) fn resolve(
    explicit: Option<&str>,
    source: &dyn CredentialSource,
    name: &str,
    description: &str,
) -> Result<String, ContiguityError> {
    match explicit {
        Some(value) if !value.trim().is_empty() => Ok(value.to_owned()),
        _ => source.require(name, description),
    }
}

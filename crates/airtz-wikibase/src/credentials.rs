use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::WikibaseError;

/// Owner-only OAuth credentials for the write API.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub access_token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn from_json_str(text: &str) -> Result<Self, WikibaseError> {
        let creds: Credentials = serde_json::from_str(text)?;
        if creds.access_token.trim().is_empty() {
            return Err(WikibaseError::MissingAccessToken);
        }
        Ok(creds)
    }
}

pub fn load_credentials(path: &Path) -> Result<Credentials, WikibaseError> {
    let text = fs::read_to_string(path).map_err(|source| WikibaseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Credentials::from_json_str(&text)
}

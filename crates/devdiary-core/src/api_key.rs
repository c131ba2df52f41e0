//! Credential management
//!
//! Backend and destination credentials come from the environment, never from
//! the configuration file. Values are wrapped in [`SecretApiKey`] so they do
//! not leak into logs.

use std::collections::HashMap;
use std::env;
use std::fmt;

use thiserror::Error;

pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const NOTION_API_KEY_ENV: &str = "NOTION_API_KEY";
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const TELEGRAM_BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub const PIECES_API_KEY_ENV: &str = "PIECES_API_KEY";

/// A wrapper for secrets that prevents accidental logging
///
/// The `Debug` and `Display` implementations mask the actual value.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretApiKey {
    key: String,
}

impl SecretApiKey {
    /// Returns `None` for empty or whitespace-only input; the value is trimmed.
    pub fn new(key: String) -> Option<Self> {
        let trimmed = key.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self {
                key: trimmed.to_string(),
            })
        }
    }

    /// Returns the actual value. Use only when making requests; never log it.
    pub fn expose(&self) -> &str {
        &self.key
    }
}

impl fmt::Debug for SecretApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretApiKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for SecretApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED API KEY]")
    }
}

/// Credentials the application can use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Credential {
    Gemini,
    OpenAI,
    Notion,
    GitHub,
    Telegram,
    Pieces,
}

impl Credential {
    pub const ALL: [Credential; 6] = [
        Credential::Gemini,
        Credential::OpenAI,
        Credential::Notion,
        Credential::GitHub,
        Credential::Telegram,
        Credential::Pieces,
    ];

    pub fn env_var_name(&self) -> &'static str {
        match self {
            Credential::Gemini => GEMINI_API_KEY_ENV,
            Credential::OpenAI => OPENAI_API_KEY_ENV,
            Credential::Notion => NOTION_API_KEY_ENV,
            Credential::GitHub => GITHUB_TOKEN_ENV,
            Credential::Telegram => TELEGRAM_BOT_TOKEN_ENV,
            Credential::Pieces => PIECES_API_KEY_ENV,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Credential::Gemini => "Google Gemini",
            Credential::OpenAI => "OpenAI",
            Credential::Notion => "Notion",
            Credential::GitHub => "GitHub",
            Credential::Telegram => "Telegram",
            Credential::Pieces => "Pieces",
        }
    }

    /// Credential for a configured backend name
    pub fn for_provider(provider: &str) -> Option<Self> {
        match provider.to_lowercase().as_str() {
            "gemini" | "google" => Some(Credential::Gemini),
            "openai" => Some(Credential::OpenAI),
            _ => None,
        }
    }
}

/// Raised when a required credential is not set
#[derive(Debug, Error)]
#[error("{} credential is not configured (set {})", .0.display_name(), .0.env_var_name())]
pub struct MissingCredential(pub Credential);

/// Resolves credentials from the environment or a fixed map
pub struct CredentialManager {
    overrides: Option<HashMap<Credential, String>>,
}

impl CredentialManager {
    /// Reads credentials from process environment variables
    pub fn from_env() -> Self {
        Self { overrides: None }
    }

    /// Uses only the given values; the environment is ignored
    pub fn from_map(values: HashMap<Credential, String>) -> Self {
        Self {
            overrides: Some(values),
        }
    }

    fn raw(&self, credential: Credential) -> Option<String> {
        match &self.overrides {
            Some(map) => map.get(&credential).cloned(),
            None => env::var(credential.env_var_name()).ok(),
        }
    }

    /// The credential, or `None` when unset or blank
    pub fn get(&self, credential: Credential) -> Option<SecretApiKey> {
        self.raw(credential).and_then(SecretApiKey::new)
    }

    /// The credential, or an error naming the variable to set
    pub fn require(&self, credential: Credential) -> Result<SecretApiKey, MissingCredential> {
        self.get(credential).ok_or(MissingCredential(credential))
    }

    pub fn is_available(&self, credential: Credential) -> bool {
        self.get(credential).is_some()
    }

    /// User-facing setup instructions for a missing credential
    pub fn missing_key_guidance(credential: Credential) -> String {
        let env_var = credential.env_var_name();
        let name = credential.display_name();

        format!(
            r#"{name} credential is not configured.

Set the environment variable before running devdiary:
   export {env_var}=your-key-here"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(pairs: &[(Credential, &str)]) -> CredentialManager {
        CredentialManager::from_map(
            pairs
                .iter()
                .map(|(c, v)| (*c, v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_secret_api_key_new() {
        assert!(SecretApiKey::new("".to_string()).is_none());
        assert!(SecretApiKey::new("  \t ".to_string()).is_none());
        let key = SecretApiKey::new("  sk-test  ".to_string()).unwrap();
        assert_eq!(key.expose(), "sk-test");
    }

    #[test]
    fn test_secret_api_key_redacted() {
        let key = SecretApiKey::new("super-secret".to_string()).unwrap();
        assert!(!format!("{:?}", key).contains("super-secret"));
        assert!(!key.to_string().contains("super-secret"));
        assert!(format!("{:?}", key).contains("REDACTED"));
    }

    #[test]
    fn test_env_var_names() {
        assert_eq!(Credential::Gemini.env_var_name(), "GEMINI_API_KEY");
        assert_eq!(Credential::GitHub.env_var_name(), "GITHUB_TOKEN");
        assert_eq!(Credential::Telegram.env_var_name(), "TELEGRAM_BOT_TOKEN");
    }

    #[test]
    fn test_for_provider() {
        assert_eq!(Credential::for_provider("Gemini"), Some(Credential::Gemini));
        assert_eq!(Credential::for_provider("openai"), Some(Credential::OpenAI));
        assert_eq!(Credential::for_provider("claude"), None);
    }

    #[test]
    fn test_manager_from_map() {
        let creds = manager(&[(Credential::Notion, "secret_abc"), (Credential::GitHub, " ")]);
        assert_eq!(creds.get(Credential::Notion).unwrap().expose(), "secret_abc");
        assert!(!creds.is_available(Credential::GitHub));
        assert!(!creds.is_available(Credential::Telegram));
    }

    #[test]
    fn test_require_missing_names_variable() {
        let creds = manager(&[]);
        let err = creds.require(Credential::OpenAI).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
        assert!(err.to_string().contains("OpenAI"));
    }

    #[test]
    fn test_missing_key_guidance() {
        let guidance = CredentialManager::missing_key_guidance(Credential::Telegram);
        assert!(guidance.contains("TELEGRAM_BOT_TOKEN"));
        assert!(guidance.contains("export"));
    }
}

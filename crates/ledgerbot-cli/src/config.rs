use ledgerbot_core::{LedgerbotError, LedgerbotResult};
use serde::Deserialize;
use std::path::PathBuf;

/// Top-level TOML configuration.
#[derive(Debug, Deserialize)]
pub struct BotConfig {
    /// Google Sheets spreadsheet id holding the ledger.
    pub spreadsheet_id: String,
    /// Worksheet (tab) name inside the spreadsheet.
    #[serde(default = "default_worksheet")]
    pub worksheet: String,
    /// Google Drive folder receiving receipt uploads.
    pub drive_folder_id: String,
    /// Idle lifetime of a pending expense, in minutes.
    #[serde(default = "default_ttl_minutes")]
    pub pending_ttl_minutes: u64,
    /// Capacity of the inbound event buffer.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
    #[serde(default)]
    pub credentials: CredentialConfig,
}

/// Optional file locations for credential resolution.
#[derive(Debug, Deserialize, Default)]
pub struct CredentialConfig {
    /// File holding the Telegram bot token.
    #[serde(default)]
    pub telegram_token_file: Option<PathBuf>,
    /// File holding the Google OAuth access token.
    #[serde(default)]
    pub google_token_file: Option<PathBuf>,
    /// Directory of secret files (one secret per file, named after the
    /// credential), e.g. a mounted `/run/secrets`.
    #[serde(default)]
    pub secrets_dir: Option<PathBuf>,
}

fn default_worksheet() -> String {
    "Expenses".to_string()
}
fn default_ttl_minutes() -> u64 {
    30
}
fn default_event_buffer() -> usize {
    64
}

/// One place a credential can come from. Chains are tried in order and
/// the first hit wins; resolution happens exactly once at startup.
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// An environment variable.
    Env(String),
    /// A file whose trimmed contents are the credential.
    File(PathBuf),
    /// A named file inside a secrets directory.
    SecretsDir {
        /// The secrets directory.
        dir: PathBuf,
        /// Filename inside the directory.
        name: String,
    },
}

impl CredentialSource {
    fn read(&self) -> Option<String> {
        let value = match self {
            Self::Env(var) => std::env::var(var).ok(),
            Self::File(path) => std::fs::read_to_string(path).ok(),
            Self::SecretsDir { dir, name } => std::fs::read_to_string(dir.join(name)).ok(),
        }?;
        let value = value.trim().to_string();
        (!value.is_empty()).then_some(value)
    }
}

/// Resolve a credential from an ordered source chain.
pub fn resolve_chain(label: &str, sources: &[CredentialSource]) -> LedgerbotResult<String> {
    for source in sources {
        if let Some(value) = source.read() {
            tracing::debug!(credential = label, source = ?source, "Credential resolved");
            return Ok(value);
        }
    }
    Err(LedgerbotError::Config(format!(
        "no source yielded the '{label}' credential (tried {sources:?})"
    )))
}

/// Credentials the bot runs with, resolved once into an immutable struct.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Telegram bot token.
    pub telegram_token: String,
    /// Google OAuth access token covering Sheets and Drive.
    pub google_token: String,
}

impl Credentials {
    /// Build both credential chains (env var, then configured file, then
    /// secrets directory) and resolve them.
    pub fn resolve(config: &CredentialConfig) -> LedgerbotResult<Self> {
        let telegram_token = resolve_chain(
            "telegram bot token",
            &chain(
                "TELEGRAM_BOT_TOKEN",
                config.telegram_token_file.as_ref(),
                config.secrets_dir.as_ref(),
                "telegram_bot_token",
            ),
        )?;
        let google_token = resolve_chain(
            "google access token",
            &chain(
                "GOOGLE_ACCESS_TOKEN",
                config.google_token_file.as_ref(),
                config.secrets_dir.as_ref(),
                "google_access_token",
            ),
        )?;
        Ok(Self {
            telegram_token,
            google_token,
        })
    }
}

fn chain(
    env_var: &str,
    file: Option<&PathBuf>,
    secrets_dir: Option<&PathBuf>,
    secret_name: &str,
) -> Vec<CredentialSource> {
    let mut sources = vec![CredentialSource::Env(env_var.to_string())];
    if let Some(path) = file {
        sources.push(CredentialSource::File(path.clone()));
    }
    if let Some(dir) = secrets_dir {
        sources.push(CredentialSource::SecretsDir {
            dir: dir.clone(),
            name: secret_name.to_string(),
        });
    }
    sources
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config: BotConfig = toml::from_str(
            r#"
            spreadsheet_id = "sheet-1"
            drive_folder_id = "folder-1"
            "#,
        )
        .unwrap();
        assert_eq!(config.worksheet, "Expenses");
        assert_eq!(config.pending_ttl_minutes, 30);
        assert_eq!(config.event_buffer, 64);
        assert!(config.credentials.secrets_dir.is_none());
    }

    #[test]
    fn test_env_source_wins_over_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("token");
        std::fs::write(&file, "from-file\n").unwrap();

        std::env::set_var("LEDGERBOT_TEST_TOKEN_A", "from-env");
        let value = resolve_chain(
            "test",
            &[
                CredentialSource::Env("LEDGERBOT_TEST_TOKEN_A".to_string()),
                CredentialSource::File(file),
            ],
        )
        .unwrap();
        std::env::remove_var("LEDGERBOT_TEST_TOKEN_A");
        assert_eq!(value, "from-env");
    }

    #[test]
    fn test_file_source_is_trimmed() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("token");
        std::fs::write(&file, "  secret-value \n").unwrap();

        let value = resolve_chain(
            "test",
            &[
                CredentialSource::Env("LEDGERBOT_TEST_TOKEN_UNSET".to_string()),
                CredentialSource::File(file),
            ],
        )
        .unwrap();
        assert_eq!(value, "secret-value");
    }

    #[test]
    fn test_secrets_dir_source() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("google_access_token"), "ya29.abc").unwrap();

        let value = resolve_chain(
            "test",
            &[CredentialSource::SecretsDir {
                dir: tmp.path().to_path_buf(),
                name: "google_access_token".to_string(),
            }],
        )
        .unwrap();
        assert_eq!(value, "ya29.abc");
    }

    #[test]
    fn test_exhausted_chain_is_a_config_error() {
        let err = resolve_chain(
            "test",
            &[CredentialSource::Env("LEDGERBOT_TEST_TOKEN_UNSET".to_string())],
        )
        .unwrap_err();
        assert!(err.to_string().contains("config error"));
    }

    #[test]
    fn test_empty_file_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let empty = tmp.path().join("empty");
        std::fs::write(&empty, "   \n").unwrap();
        let fallback = tmp.path().join("fallback");
        std::fs::write(&fallback, "real").unwrap();

        let value = resolve_chain(
            "test",
            &[
                CredentialSource::File(empty),
                CredentialSource::File(fallback),
            ],
        )
        .unwrap();
        assert_eq!(value, "real");
    }
}

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::{KdfParams, DEFAULT_ITERATIONS};
use crate::errors::{Result, VaultError};
use crate::throttle::{ThrottlePolicy, ThrottleScope};
use crate::vault::engine::{EngineConfig, DEFAULT_MAX_CODE_ATTEMPTS};

/// Deployment configuration, loaded from `.oncevault.toml`.
///
/// Every field has a sensible default so OnceVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Database file, relative to the project directory unless absolute.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// PBKDF2 round count (default: 480 000).
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// How many codes to try before giving up on a submit (default: 16).
    #[serde(default = "default_max_code_attempts")]
    pub max_code_attempts: u32,

    /// Unlock attempts allowed per window (default: 3).
    #[serde(default = "default_throttle_max_attempts")]
    pub throttle_max_attempts: u32,

    /// Throttle window length in seconds (default: 60).
    #[serde(default = "default_throttle_window_secs")]
    pub throttle_window_secs: u64,

    /// What a throttle bucket is keyed on: "client" or "code".
    #[serde(default)]
    pub throttle_scope: ThrottleScope,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_database_path() -> String {
    ".oncevault/vault.db".to_string()
}

fn default_kdf_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

fn default_max_code_attempts() -> u32 {
    DEFAULT_MAX_CODE_ATTEMPTS
}

fn default_throttle_max_attempts() -> u32 {
    3
}

fn default_throttle_window_secs() -> u64 {
    60
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            kdf_iterations: default_kdf_iterations(),
            max_code_attempts: default_max_code_attempts(),
            throttle_max_attempts: default_throttle_max_attempts(),
            throttle_window_secs: default_throttle_window_secs(),
            throttle_scope: ThrottleScope::default(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    const FILE_NAME: &'static str = ".oncevault.toml";

    /// Load settings from `<project_dir>/.oncevault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Resolve the database path against `project_dir`.
    pub fn database_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.database_path)
    }

    /// Convert into engine tuning.  Validation happens in `VaultEngine::with_config`.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            kdf: KdfParams {
                iterations: self.kdf_iterations,
            },
            max_code_attempts: self.max_code_attempts,
            throttle_scope: self.throttle_scope,
        }
    }

    /// Convert the throttle settings into a policy.
    pub fn throttle_policy(&self) -> Result<ThrottlePolicy> {
        if self.throttle_max_attempts == 0 {
            return Err(VaultError::ConfigError(
                "throttle_max_attempts must be at least 1".into(),
            ));
        }
        if self.throttle_window_secs == 0 {
            return Err(VaultError::ConfigError(
                "throttle_window_secs must be at least 1".into(),
            ));
        }
        Ok(ThrottlePolicy {
            max_attempts: self.throttle_max_attempts,
            window: Duration::from_secs(self.throttle_window_secs),
        })
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.database_path, ".oncevault/vault.db");
        assert_eq!(s.kdf_iterations, 480_000);
        assert_eq!(s.max_code_attempts, 16);
        assert_eq!(s.throttle_max_attempts, 3);
        assert_eq!(s.throttle_window_secs, 60);
        assert_eq!(s.throttle_scope, ThrottleScope::Client);
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.kdf_iterations, 480_000);
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
database_path = "data/secrets.db"
kdf_iterations = 600000
max_code_attempts = 4
throttle_max_attempts = 5
throttle_window_secs = 300
throttle_scope = "code"
"#;
        fs::write(tmp.path().join(".oncevault.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.database_path, "data/secrets.db");
        assert_eq!(settings.kdf_iterations, 600_000);
        assert_eq!(settings.max_code_attempts, 4);
        assert_eq!(settings.throttle_max_attempts, 5);
        assert_eq!(settings.throttle_window_secs, 300);
        assert_eq!(settings.throttle_scope, ThrottleScope::Code);
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".oncevault.toml"), "kdf_iterations = 500000\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.kdf_iterations, 500_000);
        assert_eq!(settings.database_path, ".oncevault/vault.db");
        assert_eq!(settings.throttle_max_attempts, 3);
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".oncevault.toml"), "not valid {{toml").unwrap();

        let result = Settings::load(tmp.path());
        assert!(matches!(result, Err(VaultError::ConfigError(_))));
    }

    #[test]
    fn load_errors_on_unknown_scope() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".oncevault.toml"), "throttle_scope = \"ip\"\n").unwrap();
        assert!(Settings::load(tmp.path()).is_err());
    }

    #[test]
    fn database_path_is_relative_to_project() {
        let s = Settings::default();
        let path = s.database_path(Path::new("/srv/app"));
        assert_eq!(path, PathBuf::from("/srv/app/.oncevault/vault.db"));
    }

    #[test]
    fn absolute_database_path_wins() {
        let s = Settings {
            database_path: "/var/lib/oncevault/vault.db".to_string(),
            ..Settings::default()
        };
        let path = s.database_path(Path::new("/srv/app"));
        assert_eq!(path, PathBuf::from("/var/lib/oncevault/vault.db"));
    }

    #[test]
    fn engine_config_carries_tuning() {
        let s = Settings {
            kdf_iterations: 2_000,
            max_code_attempts: 2,
            throttle_scope: ThrottleScope::Code,
            ..Settings::default()
        };
        let c = s.engine_config();
        assert_eq!(c.kdf.iterations, 2_000);
        assert_eq!(c.max_code_attempts, 2);
        assert_eq!(c.throttle_scope, ThrottleScope::Code);
    }

    #[test]
    fn zero_attempt_budget_is_rejected() {
        let s = Settings {
            throttle_max_attempts: 0,
            ..Settings::default()
        };
        let err = s.throttle_policy().unwrap_err();
        assert!(matches!(err, VaultError::ConfigError(ref m) if m.contains("throttle_max_attempts")));

        let one = Settings {
            throttle_max_attempts: 1,
            ..Settings::default()
        };
        assert_eq!(one.throttle_policy().unwrap().max_attempts, 1);
    }

    #[test]
    fn zero_window_is_rejected() {
        let s = Settings {
            throttle_window_secs: 0,
            ..Settings::default()
        };
        assert!(s.throttle_policy().is_err());
        assert_eq!(
            Settings::default().throttle_policy().unwrap(),
            ThrottlePolicy::default()
        );
    }
}

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GreenlightSettings {
    pub application: ApplicationSettings,
    pub session: SessionSettings,
    pub cookies: CookieSettings,
    pub http: HttpSettings,
    pub logging: LoggingSettings,
    pub github: Option<ProviderSettings>,
    pub google: Option<GoogleSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    /// Externally visible origin used to build callback URLs
    pub redirect_base_url: String,
    /// Path prefix under which the auth routes are mounted
    pub mount_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub max_age_hours: u64,
    /// Base64 HMAC key, at least 64 bytes decoded. Empty means generate at startup.
    pub hash_key: String,
    /// Base64 AES-256 key, exactly 32 bytes decoded. Empty means generate at startup.
    pub block_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieSettings {
    pub secure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

/// Client credentials for a provider, given directly or through environment variables
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProviderSettings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub client_id_env: Option<String>,
    pub client_secret_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GoogleSettings {
    /// Path to a client credentials JSON file; takes precedence over direct credentials
    pub credentials_file: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub client_id_env: Option<String>,
    pub client_secret_env: Option<String>,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            redirect_base_url: "http://localhost:8080".to_string(),
            mount_path: "/auth".to_string(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_age_hours: 24,
            hash_key: String::new(),
            block_key: String::new(),
        }
    }
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self { secure: true }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self { timeout_seconds: 10 }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl GreenlightSettings {
    /// Load settings from configuration files and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Logger initialization fails
    /// - Settings file cannot be read or parsed
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        Self::load_env_file();

        let secrets_dir = std::env::var("GREENLIGHT_SECRETS_DIR").ok();
        let mut settings =
            Self::load_base_settings(Path::new("Settings.toml"), secrets_dir.as_deref())?;

        Self::apply_env_overrides(&mut settings);
        settings.initialize_logging()?;
        log::info!("✓ Settings loaded, log filter: {}", settings.log_filter());

        Ok(settings)
    }

    /// Initialize logging with the configured filter
    ///
    /// # Errors
    ///
    /// Returns an error if a logger is already installed
    fn initialize_logging(&self) -> Result<(), Box<dyn std::error::Error>> {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(self.log_filter()),
        )
        .try_init()?;
        Ok(())
    }

    /// The `env_logger` filter from `logging.level`, `info` when unset
    #[must_use]
    pub fn log_filter(&self) -> &str {
        match self.logging.level.trim() {
            "" => "info",
            level => level,
        }
    }

    /// Load base settings from TOML file(s) or use defaults
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (applied separately after loading base settings)
    /// 2. Settings.toml in `secrets_dir` (if given and it exists)
    /// 3. `base_path` (if it exists)
    /// 4. Default settings
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file exists but cannot be read or parsed
    pub fn load_base_settings(
        base_path: &Path,
        secrets_dir: Option<&str>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mut settings = Self::default();

        if base_path.exists() {
            let toml_content = fs::read_to_string(base_path)?;
            settings = basic_toml::from_str(&toml_content)?;
            log::info!("✓ Loaded base settings from {}", base_path.display());
        }

        if let Some(secrets_dir) = secrets_dir {
            let secrets_path = Path::new(secrets_dir).join("Settings.toml");
            if secrets_path.exists() {
                let secrets_toml_content = fs::read_to_string(&secrets_path)?;
                settings = basic_toml::from_str(&secrets_toml_content)?;
                log::info!("✓ Overriding settings from {}", secrets_path.display());
            } else {
                log::info!(
                    "ℹ GREENLIGHT_SECRETS_DIR set but no Settings.toml found at: {}",
                    secrets_path.display()
                );
            }
        }

        Ok(settings)
    }

    /// Apply environment variable overrides to settings
    pub fn apply_env_overrides(settings: &mut Self) {
        let app = &mut settings.application;
        if let Ok(host) = std::env::var("HOST") {
            app.host = host;
        }
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(port) = port.parse::<u16>() {
                app.port = port;
            }
        }
        if let Ok(url) = std::env::var("REDIRECT_BASE_URL") {
            app.redirect_base_url = url;
        }
        if let Ok(mount_path) = std::env::var("AUTH_MOUNT_PATH") {
            app.mount_path = mount_path;
        }

        Self::apply_numeric_env_override("SESSION_MAX_AGE_HOURS", &mut settings.session.max_age_hours);
        if let Ok(key) = std::env::var("SESSION_HASH_KEY") {
            settings.session.hash_key = key;
        }
        if let Ok(key) = std::env::var("SESSION_BLOCK_KEY") {
            settings.session.block_key = key;
        }

        if let Ok(secure) = std::env::var("COOKIE_SECURE") {
            if let Ok(secure) = secure.parse::<bool>() {
                settings.cookies.secure = secure;
            }
        }

        Self::apply_numeric_env_override("HTTP_TIMEOUT_SECONDS", &mut settings.http.timeout_seconds);

        if let Ok(log_level) = std::env::var("RUST_LOG") {
            settings.logging.level = log_level;
        }
    }

    fn apply_numeric_env_override(env_var: &str, target: &mut u64) {
        if let Ok(value_str) = std::env::var(env_var) {
            if let Ok(value) = value_str.parse::<u64>() {
                *target = value;
            }
        }
    }

    /// Load environment variables from .env file
    fn load_env_file() {
        if let Ok(contents) = std::fs::read_to_string(".env") {
            for line in contents.lines() {
                let line = line.trim();
                if line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    std::env::set_var(key.trim(), value.trim());
                }
            }
        }
    }

    #[must_use]
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }

    /// Mount path normalized to a leading slash and no trailing slash
    #[must_use]
    pub fn mount_path(&self) -> String {
        normalize_mount_path(&self.application.mount_path)
    }

    #[must_use]
    pub fn http_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.http.timeout_seconds.max(1))
    }
}

/// `"api/auth/"` becomes `"/api/auth"`; `"/"` and `""` become `""`
#[must_use]
pub fn normalize_mount_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

impl ProviderSettings {
    /// Get the client ID, checking environment variable first, then falling back to direct value
    #[must_use]
    pub fn get_client_id(&self) -> Option<String> {
        if let Some(env_var) = &self.client_id_env {
            if let Ok(value) = std::env::var(env_var) {
                return Some(value);
            }
        }
        self.client_id.clone()
    }

    /// Get the client secret, checking environment variable first, then falling back to direct value
    #[must_use]
    pub fn get_client_secret(&self) -> Option<String> {
        if let Some(env_var) = &self.client_secret_env {
            if let Ok(value) = std::env::var(env_var) {
                return Some(value);
            }
        }
        self.client_secret.clone()
    }
}

impl GoogleSettings {
    /// Direct client credentials, used when no credentials file is configured
    #[must_use]
    pub fn credentials(&self) -> ProviderSettings {
        ProviderSettings {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            client_id_env: self.client_id_env.clone(),
            client_secret_env: self.client_secret_env.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn clean_env_vars() {
        for var in [
            "HOST",
            "PORT",
            "REDIRECT_BASE_URL",
            "AUTH_MOUNT_PATH",
            "SESSION_MAX_AGE_HOURS",
            "SESSION_HASH_KEY",
            "SESSION_BLOCK_KEY",
            "COOKIE_SECURE",
            "HTTP_TIMEOUT_SECONDS",
            "TEST_GITHUB_CLIENT_ID",
            "RUST_LOG",
        ] {
            std::env::remove_var(var);
        }
    }

    fn write_settings(dir: &Path, content: &str) -> std::path::PathBuf {
        let path = dir.join("Settings.toml");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let settings = GreenlightSettings::default();
        assert_eq!(settings.session.max_age_hours, 24);
        assert_eq!(settings.http.timeout_seconds, 10);
        assert_eq!(settings.mount_path(), "/auth");
        assert!(settings.cookies.secure);
        assert!(settings.github.is_none());
        assert!(settings.google.is_none());
    }

    #[test]
    fn test_normalize_mount_path() {
        assert_eq!(normalize_mount_path("/api/auth"), "/api/auth");
        assert_eq!(normalize_mount_path("api/auth/"), "/api/auth");
        assert_eq!(normalize_mount_path("/"), "");
        assert_eq!(normalize_mount_path(""), "");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_settings(
            dir.path(),
            r#"
[application]
mount_path = "/api/auth"

[github]
client_id = "gh-id"
client_secret = "gh-secret"

[google]
credentials_file = "google.json"
"#,
        );

        let settings = GreenlightSettings::load_base_settings(&path, None).unwrap();
        assert_eq!(settings.application.mount_path, "/api/auth");
        assert_eq!(settings.application.port, 8080);
        assert_eq!(settings.session.max_age_hours, 24);

        let github = settings.github.unwrap();
        assert_eq!(github.get_client_id().as_deref(), Some("gh-id"));
        assert_eq!(github.get_client_secret().as_deref(), Some("gh-secret"));
        assert_eq!(
            settings.google.unwrap().credentials_file.as_deref(),
            Some("google.json")
        );
    }

    #[test]
    fn test_secrets_dir_takes_precedence() {
        let base_dir = tempfile::tempdir().unwrap();
        let secrets_dir = tempfile::tempdir().unwrap();
        let base = write_settings(base_dir.path(), "[session]\nmax_age_hours = 1\n");
        write_settings(secrets_dir.path(), "[session]\nmax_age_hours = 2\n");

        let settings = GreenlightSettings::load_base_settings(
            &base,
            Some(secrets_dir.path().to_str().unwrap()),
        )
        .unwrap();
        assert_eq!(settings.session.max_age_hours, 2);

        let missing = tempfile::tempdir().unwrap();
        let settings =
            GreenlightSettings::load_base_settings(&base, Some(missing.path().to_str().unwrap()))
                .unwrap();
        assert_eq!(settings.session.max_age_hours, 1);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_settings(dir.path(), "[session\nmax_age_hours = ");
        assert!(GreenlightSettings::load_base_settings(&path, None).is_err());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clean_env_vars();
        std::env::set_var("PORT", "9090");
        std::env::set_var("AUTH_MOUNT_PATH", "/api/auth");
        std::env::set_var("SESSION_MAX_AGE_HOURS", "48");
        std::env::set_var("COOKIE_SECURE", "false");
        std::env::set_var("HTTP_TIMEOUT_SECONDS", "not-a-number");

        let mut settings = GreenlightSettings::default();
        GreenlightSettings::apply_env_overrides(&mut settings);

        assert_eq!(settings.application.port, 9090);
        assert_eq!(settings.mount_path(), "/api/auth");
        assert_eq!(settings.session.max_age_hours, 48);
        assert!(!settings.cookies.secure);
        assert_eq!(settings.http.timeout_seconds, 10);
        assert_eq!(settings.get_bind_address(), "0.0.0.0:9090");

        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_log_filter_follows_logging_level() {
        clean_env_vars();
        let dir = tempfile::tempdir().unwrap();
        let path = write_settings(
            dir.path(),
            r#"
[logging]
level = "greenlight=debug,actix_web=warn"
"#,
        );

        let mut settings = GreenlightSettings::load_base_settings(&path, None).unwrap();
        GreenlightSettings::apply_env_overrides(&mut settings);
        assert_eq!(settings.log_filter(), "greenlight=debug,actix_web=warn");

        std::env::set_var("RUST_LOG", "trace");
        GreenlightSettings::apply_env_overrides(&mut settings);
        assert_eq!(settings.log_filter(), "trace");

        settings.logging.level = "  ".to_string();
        assert_eq!(settings.log_filter(), "info");

        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_client_id_env_takes_precedence() {
        clean_env_vars();
        let provider = ProviderSettings {
            client_id: Some("direct-id".to_string()),
            client_id_env: Some("TEST_GITHUB_CLIENT_ID".to_string()),
            ..Default::default()
        };
        assert_eq!(provider.get_client_id().as_deref(), Some("direct-id"));

        std::env::set_var("TEST_GITHUB_CLIENT_ID", "env-id");
        assert_eq!(provider.get_client_id().as_deref(), Some("env-id"));

        clean_env_vars();
    }
}

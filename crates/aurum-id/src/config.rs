use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use thiserror::Error;

/// Version string reported to the provider with every authorization and
/// token request.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Errors that can occur while resolving per-user storage paths.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to determine a home directory for this platform")]
    MissingProjectDirs,
    #[error("failed to create config directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Partner application identity registered with Aurum ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// Client identifier issued at partner registration.
    pub client_id: String,
    /// Redirect URI registered for this client; completion targets are
    /// matched against it as a string prefix.
    pub redirect_uri: String,
    /// Package or bundle identifier of the host application, reported to the
    /// companion app as `package_name`.
    pub caller_identity: String,
}

impl AuthConfig {
    pub fn new(
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
        caller_identity: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            caller_identity: caller_identity.into(),
        }
    }
}

/// Locates per-user storage paths for pending authorization state.
#[derive(Debug, Clone)]
pub struct ConfigLocator {
    root: PathBuf,
}

impl ConfigLocator {
    /// Resolve the default storage root, creating it if needed.
    pub fn new() -> Result<Self, ConfigError> {
        let dirs = ProjectDirs::from("finance", "aurum", "aurum-id")
            .ok_or(ConfigError::MissingProjectDirs)?;
        Self::at_root(dirs.config_dir().to_path_buf())
    }

    fn at_root(root: PathBuf) -> Result<Self, ConfigError> {
        if !root.exists() {
            fs::create_dir_all(&root).map_err(|source| ConfigError::CreateDir {
                path: root.clone(),
                source,
            })?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&root, fs::Permissions::from_mode(0o700))?;
            }
        }
        Ok(Self { root })
    }

    #[cfg(test)]
    pub(crate) fn from_root_for_tests(root: &std::path::Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// File holding the pending code verifier.
    pub fn verifier_file(&self) -> PathBuf {
        self.root.join("code_verifier")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifier_file_lives_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let locator = ConfigLocator::from_root_for_tests(dir.path());
        assert_eq!(locator.verifier_file(), dir.path().join("code_verifier"));
    }

    #[test]
    fn at_root_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let locator = ConfigLocator::at_root(nested.clone()).unwrap();
        assert!(nested.is_dir());
        assert_eq!(locator.verifier_file(), nested.join("code_verifier"));
    }

    #[test]
    fn config_holds_caller_identity() {
        let config = AuthConfig::new("c1", "mobile://", "com.partner.app");
        assert_eq!(config.client_id, "c1");
        assert_eq!(config.redirect_uri, "mobile://");
        assert_eq!(config.caller_identity, "com.partner.app");
    }
}

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::config::ConfigLocator;
use crate::error::AuthError;

/// Persistence for the pending code verifier.
///
/// A single mutable slot: `put` replaces whatever verifier an earlier attempt
/// left behind, and `get` returns the empty string until something is stored.
/// Implementations must survive process restarts so that an authorization
/// started before a kill can still complete its token exchange.
pub trait VerifierStore {
    fn put(&self, verifier: &str) -> Result<(), AuthError>;
    fn get(&self) -> Result<String, AuthError>;
}

/// Verifier slot backed by a file under the per-user config directory.
#[derive(Debug, Clone)]
pub struct FileVerifierStore {
    locator: ConfigLocator,
}

impl FileVerifierStore {
    pub fn new(locator: ConfigLocator) -> Self {
        Self { locator }
    }

    /// Store rooted at the platform default location.
    pub fn with_default_locator() -> Result<Self, AuthError> {
        Ok(Self::new(ConfigLocator::new()?))
    }

    fn write_file(path: &Path, payload: &str) -> Result<(), AuthError> {
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(path)?;
        file.write_all(payload.as_bytes())?;
        Ok(())
    }
}

impl VerifierStore for FileVerifierStore {
    fn put(&self, verifier: &str) -> Result<(), AuthError> {
        Self::write_file(&self.locator.verifier_file(), verifier)
    }

    fn get(&self) -> Result<String, AuthError> {
        let path = self.locator.verifier_file();
        if !path.exists() {
            return Ok(String::new());
        }
        Ok(fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> FileVerifierStore {
        FileVerifierStore::new(ConfigLocator::from_root_for_tests(dir.path()))
    }

    #[test]
    fn get_returns_empty_string_when_nothing_stored() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(store_in(&dir).get().unwrap(), "");
    }

    #[test]
    fn put_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.put("some-verifier").unwrap();
        assert_eq!(store.get().unwrap(), "some-verifier");
    }

    #[test]
    fn put_overwrites_the_previous_verifier() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.put("first").unwrap();
        store.put("second").unwrap();
        assert_eq!(store.get().unwrap(), "second");
    }

    #[cfg(unix)]
    #[test]
    fn verifier_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.put("v").unwrap();
        let mode = fs::metadata(dir.path().join("code_verifier"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

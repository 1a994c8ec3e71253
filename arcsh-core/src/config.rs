//! Startup configuration loaded from YAML.
//!
//! ```yaml
//! archive_path: ./virtual_fs.tar
//! hostname: my_host
//! startup_script: ./startup.sh      # optional
//! parent_resolution: cursor         # optional: cursor | walk
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{ShellError, ShellResult};
use crate::fs::ParentResolution;

/// Shell configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShellConfig {
    /// Archive to mount as the root filesystem.
    pub archive_path: PathBuf,
    /// Name shown in the prompt.
    pub hostname: String,
    /// Commands run once before the interactive loop.
    #[serde(default)]
    pub startup_script: Option<PathBuf>,
    #[serde(default)]
    pub parent_resolution: ParentResolution,
}

impl ShellConfig {
    /// Parse configuration from YAML text.
    pub fn from_yaml(text: &str) -> ShellResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load configuration from a file. The file must exist and be a regular file.
    pub fn load(path: &Path) -> ShellResult<Self> {
        if !path.is_file() {
            return Err(ShellError::ConfigNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&text)?;
        debug!(?config, path = %path.display(), "loaded configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_minimal_config() {
        let config = ShellConfig::from_yaml(
            "archive_path: /tmp/virtual_fs.tar\nhostname: test_host\n",
        )
        .unwrap();
        assert_eq!(config.archive_path, PathBuf::from("/tmp/virtual_fs.tar"));
        assert_eq!(config.hostname, "test_host");
        assert_eq!(config.startup_script, None);
        assert_eq!(config.parent_resolution, ParentResolution::Cursor);
    }

    #[test]
    fn test_full_config() {
        let config = ShellConfig::from_yaml(
            r#"
            archive_path: fs.zip
            hostname: box
            startup_script: start.sh
            parent_resolution: walk
            "#,
        )
        .unwrap();
        assert_eq!(config.startup_script, Some(PathBuf::from("start.sh")));
        assert_eq!(config.parent_resolution, ParentResolution::Walk);
    }

    #[test]
    fn test_missing_hostname_is_error() {
        let err = ShellConfig::from_yaml("archive_path: fs.tar\n").unwrap_err();
        assert!(matches!(err, ShellError::Yaml(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "archive_path: fs.tar").unwrap();
        writeln!(file, "hostname: test_host").unwrap();

        let config = ShellConfig::load(file.path()).unwrap();
        assert_eq!(config.hostname, "test_host");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(matches!(
            ShellConfig::load(&missing),
            Err(ShellError::ConfigNotFound(_))
        ));
        // directories are not config files either
        assert!(ShellConfig::load(dir.path()).is_err());
    }
}

//! Type checker configuration for LHC.
//!
//! [`Options`] controls how a compilation unit is checked: how fresh type
//! variables are named and whether the checker keeps going after a
//! definition fails. Options are usually built with [`Options::default`]
//! and optionally read from the `[typeck]` table of an `lhc.toml` file:
//!
//! ```toml
//! [typeck]
//! fresh-var-prefix = "t"
//! continue-after-error = true
//! error-limit = 50
//! ```

#![warn(missing_docs)]

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// Options for one type checking session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Options {
    /// Prefix of fresh type variable names (`t0`, `t1`, ...).
    ///
    /// Must start with a lowercase letter.
    pub fresh_var_prefix: String,
    /// Keep checking sibling definitions after one of them fails.
    pub continue_after_error: bool,
    /// Stop after this many failing definitions.
    pub error_limit: Option<usize>,
    /// Treat warnings as errors.
    pub deny_warnings: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            fresh_var_prefix: "t".to_string(),
            continue_after_error: true,
            error_limit: None,
            deny_warnings: false,
        }
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    #[serde(default)]
    typeck: Options,
}

impl Options {
    /// Parse options from the `[typeck]` table of a TOML document.
    ///
    /// A document without a `[typeck]` table yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Toml`] for malformed TOML and
    /// [`SessionError::InvalidConfig`] when a value is out of range.
    pub fn from_toml_str(content: &str) -> Result<Self, SessionError> {
        let file: ConfigFile = toml::from_str(content)?;
        file.typeck.validate()?;
        Ok(file.typeck)
    }

    /// Read options from a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ConfigNotFound`] if the file does not exist,
    /// otherwise the errors of [`Options::from_toml_str`].
    pub fn load(path: &Utf8Path) -> Result<Self, SessionError> {
        if !path.exists() {
            return Err(SessionError::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Check that option values are usable.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidConfig`] describing the first bad value.
    pub fn validate(&self) -> Result<(), SessionError> {
        let starts_lower = self
            .fresh_var_prefix
            .chars()
            .next()
            .is_some_and(|c| c.is_lowercase() || c == '_');
        if !starts_lower {
            return Err(SessionError::InvalidConfig(format!(
                "fresh-var-prefix `{}` must start with a lowercase letter",
                self.fresh_var_prefix
            )));
        }
        if self.error_limit == Some(0) {
            return Err(SessionError::InvalidConfig(
                "error-limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns true once `failures` failing definitions should stop checking.
    #[must_use]
    pub fn should_stop(&self, failures: usize) -> bool {
        if failures == 0 {
            return false;
        }
        !self.continue_after_error || self.error_limit.is_some_and(|limit| failures >= limit)
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The configuration file does not exist.
    #[error("configuration file not found: {0}")]
    ConfigNotFound(Utf8PathBuf),
    /// A value is syntactically valid but unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The file is not valid TOML for [`Options`].
    #[error("malformed configuration: {0}")]
    Toml(#[from] toml::de::Error),
    /// Reading the file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = Options::default();
        assert_eq!(opts.fresh_var_prefix, "t");
        assert!(opts.continue_after_error);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let opts = Options::from_toml_str(
            r#"
[typeck]
fresh-var-prefix = "u"
error-limit = 3
"#,
        )
        .unwrap();
        assert_eq!(opts.fresh_var_prefix, "u");
        assert_eq!(opts.error_limit, Some(3));
        assert!(opts.continue_after_error);
    }

    #[test]
    fn test_missing_table_is_default() {
        let opts = Options::from_toml_str("[package]\nname = \"demo\"\n").unwrap();
        assert_eq!(opts, Options::default());
    }

    #[test]
    fn test_rejects_uppercase_prefix() {
        let err = Options::from_toml_str("[typeck]\nfresh-var-prefix = \"T\"\n").unwrap_err();
        assert!(matches!(err, SessionError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = Options::from_toml_str("[typeck\n").unwrap_err();
        assert!(matches!(err, SessionError::Toml(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Options::load(Utf8Path::new("/nonexistent/lhc.toml")).unwrap_err();
        assert!(matches!(err, SessionError::ConfigNotFound(_)));
    }

    #[test]
    fn test_should_stop() {
        let mut opts = Options::default();
        assert!(!opts.should_stop(0));
        assert!(!opts.should_stop(10));

        opts.error_limit = Some(2);
        assert!(!opts.should_stop(1));
        assert!(opts.should_stop(2));

        opts.continue_after_error = false;
        assert!(opts.should_stop(1));
    }
}

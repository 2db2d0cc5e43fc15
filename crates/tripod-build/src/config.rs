//! Generator configuration, usually loaded from a `tripod.toml`.

use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use thiserror::Error as ThisError;
use tripod_schema::naming;

pub const DEFAULT_PACKAGE: &str = "api.v1";
pub const DEFAULT_FILE_NAME: &str = "dtos_gen.proto";

///
/// ConfigError
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum ConfigError {
    #[error("invalid proto file name '{0}'")]
    InvalidFileName(String),

    #[error("invalid proto package '{0}'")]
    InvalidPackage(String),

    #[error("invalid {key} '{value}': expected a Rust module path")]
    InvalidPath { key: &'static str, value: String },

    #[error("failed to read config '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

///
/// Mode
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Every node in one file.
    #[default]
    Single,

    /// One file per node, named after it.
    PerEntity,
}

///
/// Validator
/// which validation extension the rule bodies target
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Validator {
    None,
    #[default]
    ProtoValidate,
    Pgv,
}

impl Validator {
    /// Import a file needs once any of its fields carries a rule.
    #[must_use]
    pub const fn import(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::ProtoValidate => Some("buf/validate/validate.proto"),
            Self::Pgv => Some("validate/validate.proto"),
        }
    }

    #[must_use]
    pub const fn is_enabled(self) -> bool {
        !matches!(self, Self::None)
    }
}

///
/// Config
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub package: String,

    // derived from the package when unset
    pub go_package: Option<String>,

    pub mode: Mode,

    // single mode only
    pub file_name: String,

    pub validator: Validator,

    // module paths the generated conversions refer to
    pub storage_path: String,
    pub domain_path: String,
    pub wire_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            package: DEFAULT_PACKAGE.to_string(),
            go_package: None,
            mode: Mode::default(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            validator: Validator::default(),
            storage_path: "crate::storage".to_string(),
            domain_path: "crate::domain".to_string(),
            wire_path: "crate::wire".to_string(),
        }
    }
}

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;

        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let package_ok = !self.package.is_empty()
            && self.package.split('.').all(naming::is_ident);
        if !package_ok {
            return Err(ConfigError::InvalidPackage(self.package.clone()));
        }

        let file_ok = self.file_name.ends_with(".proto")
            && !self.file_name.contains(['/', '\\'])
            && self.file_name.len() > ".proto".len();
        if !file_ok {
            return Err(ConfigError::InvalidFileName(self.file_name.clone()));
        }

        self.paths().map(|_| ())
    }

    /// Go package option, `api.v1` becoming `api/v1;v1`.
    #[must_use]
    pub fn go_package(&self) -> String {
        self.go_package.clone().unwrap_or_else(|| {
            let last = self.package.rsplit('.').next().unwrap_or_default();
            format!("{};{last}", self.package.replace('.', "/"))
        })
    }

    /// Parsed module paths for generated code.
    pub fn paths(&self) -> Result<Paths, ConfigError> {
        Ok(Paths {
            storage: parse_path("storage_path", &self.storage_path)?,
            domain: parse_path("domain_path", &self.domain_path)?,
            wire: parse_path("wire_path", &self.wire_path)?,
        })
    }
}

fn parse_path(key: &'static str, value: &str) -> Result<syn::Path, ConfigError> {
    syn::parse_str(value).map_err(|_| ConfigError::InvalidPath {
        key,
        value: value.to_string(),
    })
}

///
/// Paths
///

#[derive(Clone, Debug)]
pub struct Paths {
    pub storage: syn::Path,
    pub domain: syn::Path,
    pub wire: syn::Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_TOML: &str = r#"
package = "shop.api.v2"
mode = "per_entity"
validator = "pgv"
domain_path = "crate::biz"
"#;

    #[test]
    fn defaults_apply_to_missing_keys() {
        let config = Config::from_toml(SAMPLE_TOML).expect("config");

        assert_eq!(config.package, "shop.api.v2");
        assert_eq!(config.mode, Mode::PerEntity);
        assert_eq!(config.validator, Validator::Pgv);
        assert_eq!(config.file_name, DEFAULT_FILE_NAME);
        assert_eq!(config.storage_path, "crate::storage");
        assert_eq!(config.go_package(), "shop/api/v2;v2");
    }

    #[test]
    fn empty_document_is_the_default() {
        assert_eq!(Config::from_toml("").expect("config"), Config::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml("pakage = \"x\"").expect_err("typo");

        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(matches!(
            Config::from_toml("package = \"api..v1\""),
            Err(ConfigError::InvalidPackage(_))
        ));
        assert!(matches!(
            Config::from_toml("file_name = \"out/dtos.proto\""),
            Err(ConfigError::InvalidFileName(_))
        ));
        assert!(matches!(
            Config::from_toml("wire_path = \"crate::\""),
            Err(ConfigError::InvalidPath { key: "wire_path", .. })
        ));
    }

    #[test]
    fn validator_imports() {
        assert_eq!(Validator::None.import(), None);
        assert_eq!(
            Validator::default().import(),
            Some("buf/validate/validate.proto")
        );
    }

    #[test]
    fn round_trips_toml() {
        let config = Config::from_toml(SAMPLE_TOML).expect("config");
        let text = config.to_toml().expect("serialize");

        assert_eq!(Config::from_toml(&text).expect("reparse"), config);
    }
}

use crate::classify::Bucket;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "autoref.toml";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub module: ModuleConfig,
    pub output: OutputConfig,
    pub index: IndexConfig,
}

/// Root namespace and its special sub-namespaces
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    /// Root namespace name; derived from the source path when unset
    pub name: Option<String>,
    pub private_marker: String,
    pub constants: String,
    pub exceptions: String,
    /// Sub-namespace of wrapped standard-library constructs
    pub native: String,
    /// Glob patterns over qualified names to leave undocumented
    pub exclude: Vec<String>,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    /// File name of the aggregate index page
    pub index: String,
    /// Directory of `*.tera` templates overriding the embedded ones
    pub templates: Option<PathBuf>,
}

/// Index page text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub label: String,
    pub title: String,
    /// Description paragraph; `{module}` is replaced with the root name
    pub description: Option<String>,
    pub native_title: String,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            name: None,
            private_marker: "_".to_string(),
            constants: "constants".to_string(),
            exceptions: "exceptions".to_string(),
            native: "cpp".to_string(),
            exclude: vec![],
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            index: "quickref.rst".to_string(),
            templates: None,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            label: "quickref_label".to_string(),
            title: "Quick Reference".to_string(),
            description: None,
            native_title: "C++ Standard library wrappers".to_string(),
        }
    }
}

impl IndexConfig {
    /// Section heading for a bucket
    pub fn section_title(&self, bucket: Bucket) -> &str {
        match bucket {
            Bucket::Classes => "Classes",
            Bucket::Functions => "Functions",
            Bucket::Constants => "Constants",
            Bucket::Exceptions => "Exceptions",
            Bucket::Native => self.native_title.as_str(),
        }
    }

    /// Description paragraph for a root namespace
    pub fn description_for(&self, module: &str) -> String {
        match &self.description {
            Some(text) => text.replace("{module}", module),
            None => format!(
                "Here we provide a list of all members avaliable in the {module} namespace.\
                 This is not meant to be complete documentation. Refer to the C++ API and \
                 the additional changes pages for more information. \n\
                 You should also try to use the help(x) function, where x is the object \
                 that you are interested in.\n\n\
                 This is completely AUTO-GENERATED documentation. All text on the functions \
                 and classes is originally derived from the C++ source files."
            ),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file, falling back to defaults when the file is absent.
    ///
    /// A file that exists but does not parse or validate is an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Merge CLI arguments into config (CLI takes precedence)
    pub fn merge_cli(
        &mut self,
        output: Option<PathBuf>,
        module: Option<String>,
        exclude: Vec<String>,
        templates: Option<PathBuf>,
    ) {
        if let Some(out) = output {
            self.output.directory = out;
        }

        if let Some(dir) = templates {
            self.output.templates = Some(dir);
        }

        if let Some(name) = module {
            self.module.name = Some(name);
        }

        if !exclude.is_empty() {
            self.module.exclude.extend(exclude);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let module = &self.module;

        if let Some(name) = &module.name {
            if name.is_empty() || name.starts_with('.') || name.ends_with('.') {
                return Err(Error::config_validation(format!(
                    "invalid module name '{}'",
                    name
                )));
            }
        }

        if module.private_marker.is_empty() {
            return Err(Error::config_validation("private_marker must not be empty"));
        }

        let specials = [
            ("constants", &module.constants),
            ("exceptions", &module.exceptions),
            ("native", &module.native),
        ];
        for (key, value) in &specials {
            if value.is_empty() {
                return Err(Error::config_validation(format!(
                    "{} name must not be empty",
                    key
                )));
            }
            if value.contains('.') {
                return Err(Error::config_validation(format!(
                    "{} name must be a single attribute, got '{}'",
                    key, value
                )));
            }
        }
        for (i, (key, value)) in specials.iter().enumerate() {
            if let Some((other, _)) = specials[i + 1..].iter().find(|(_, v)| v == value) {
                return Err(Error::config_validation(format!(
                    "{} and {} both name '{}'",
                    key, other, value
                )));
            }
        }

        for pattern in &module.exclude {
            glob::Pattern::new(pattern)?;
        }

        if !self.output.index.ends_with(".rst") {
            return Err(Error::config_validation("index file name must end in .rst"));
        }

        if let Some(dir) = &self.output.templates {
            if !dir.is_dir() {
                return Err(Error::PathNotFound(dir.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.module.name, None);
        assert_eq!(config.module.private_marker, "_");
        assert_eq!(config.module.constants, "constants");
        assert_eq!(config.module.exceptions, "exceptions");
        assert_eq!(config.module.native, "cpp");
        assert_eq!(config.output.directory, PathBuf::from("."));
        assert_eq!(config.output.index, "quickref.rst");
        assert_eq!(config.index.label, "quickref_label");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_valid_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[module]
name = "gpstk"
native = "std"
exclude = ["*_swigregister"]

[output]
directory = "docs/api"

[index]
title = "API Overview"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.module.name.as_deref(), Some("gpstk"));
        assert_eq!(config.module.native, "std");
        assert_eq!(config.module.constants, "constants");
        assert_eq!(config.module.exclude, vec!["*_swigregister".to_string()]);
        assert_eq!(config.output.directory, PathBuf::from("docs/api"));
        assert_eq!(config.index.title, "API Overview");
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Path::new("/nonexistent/autoref.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default(Path::new("/nonexistent/autoref.toml")).unwrap();
        assert_eq!(config.output.index, "quickref.rst");
    }

    #[test]
    fn test_load_or_default_invalid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[module]\nconstants = \"\"").unwrap();
        assert!(Config::load_or_default(file.path()).is_err());
    }

    #[test]
    fn test_validation_empty_special_name() {
        let mut config = Config::default();
        config.module.exceptions.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_dotted_special_name() {
        let mut config = Config::default();
        config.module.native = "cpp.std".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_colliding_special_names() {
        let mut config = Config::default();
        config.module.native = "constants".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("constants and native"));
    }

    #[test]
    fn test_validation_bad_glob() {
        let mut config = Config::default();
        config.module.exclude.push("[".to_string());
        assert!(matches!(config.validate(), Err(Error::GlobPattern(_))));
    }

    #[test]
    fn test_validation_index_extension() {
        let mut config = Config::default();
        config.output.index = "quickref.txt".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_module_name() {
        let mut config = Config::default();
        config.module.name = Some("gpstk.".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge_cli_output() {
        let mut config = Config::default();
        config.merge_cli(Some(PathBuf::from("/custom/output")), None, vec![], None);
        assert_eq!(config.output.templates, None);
        assert_eq!(config.output.directory, PathBuf::from("/custom/output"));
    }

    #[test]
    fn test_merge_cli_module_and_exclude() {
        let mut config = Config::default();
        config.module.exclude.push("*.cpp.*".to_string());
        config.merge_cli(
            None,
            Some("gpstk".to_string()),
            vec!["*_swigregister".to_string()],
            Some(PathBuf::from("templates")),
        );
        assert_eq!(config.output.templates, Some(PathBuf::from("templates")));
        assert_eq!(config.module.name.as_deref(), Some("gpstk"));
        assert_eq!(config.module.exclude.len(), 2);
    }

    #[test]
    fn test_default_description_mentions_module() {
        let index = IndexConfig::default();
        let text = index.description_for("gpstk");
        assert!(text.starts_with("Here we provide a list of all members avaliable in the gpstk namespace."));
        assert!(text.contains("help(x)"));
        assert!(text.ends_with("derived from the C++ source files."));
    }

    #[test]
    fn test_section_titles() {
        let mut index = IndexConfig::default();
        assert_eq!(index.section_title(Bucket::Classes), "Classes");
        assert_eq!(index.section_title(Bucket::Native), "C++ Standard library wrappers");
        index.native_title = "STL".to_string();
        assert_eq!(index.section_title(Bucket::Native), "STL");
    }

    #[test]
    fn test_custom_description_substitutes_module() {
        let index = IndexConfig {
            description: Some("Members of {module}.".to_string()),
            ..IndexConfig::default()
        };
        assert_eq!(index.description_for("pkg"), "Members of pkg.");
    }
}

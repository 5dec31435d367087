use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// The `ferrule.toml` project manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub package: Package,
    /// Named configurations, e.g. `[configurations.compile]`.
    #[serde(default)]
    pub configurations: BTreeMap<String, ConfigurationSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    /// Glob patterns (relative to the project root) for the files this project
    /// publishes to projects that depend on it.
    #[serde(default = "default_artifacts")]
    pub artifacts: Vec<String>,
}

fn default_artifacts() -> Vec<String> {
    vec!["build/libs/*.jar".to_owned()]
}

/// A declared configuration: ordered dependencies plus a transitivity flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationSpec {
    #[serde(default = "default_transitive")]
    pub transitive: bool,
    #[serde(default)]
    pub dependencies: Vec<DependencySpec>,
}

fn default_transitive() -> bool {
    true
}

/// A single dependency declaration. Exactly one of `files`, `glob`, `module`,
/// or `project` must be set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DependencySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glob: Option<String>,
    /// Maven coordinate `group:artifact:version[:packaging]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// Path to another project, relative to this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Configuration of the target project; defaults to the same name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<String>,
    /// Per-dependency transitivity override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transitive: Option<bool>,
}

/// The validated source of a [`DependencySpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencySource<'a> {
    Files(&'a [String]),
    Glob(&'a str),
    Module(&'a str),
    Project {
        path: &'a str,
        configuration: Option<&'a str>,
    },
}

impl DependencySpec {
    /// Classify this declaration.
    ///
    /// # Errors
    /// Returns an error if zero or more than one source is set.
    pub fn source(&self) -> Result<DependencySource<'_>, ManifestError> {
        let mut sources = Vec::new();
        if let Some(files) = &self.files {
            sources.push(DependencySource::Files(files));
        }
        if let Some(glob) = &self.glob {
            sources.push(DependencySource::Glob(glob));
        }
        if let Some(module) = &self.module {
            sources.push(DependencySource::Module(module));
        }
        if let Some(project) = &self.project {
            sources.push(DependencySource::Project {
                path: project,
                configuration: self.configuration.as_deref(),
            });
        }
        match sources.as_slice() {
            [single] => Ok(*single),
            [] => Err(ManifestError::Invalid {
                message: "dependency must set one of `files`, `glob`, `module`, or `project`"
                    .to_owned(),
            }),
            _ => Err(ManifestError::Invalid {
                message: "dependency sets more than one of `files`, `glob`, `module`, `project`"
                    .to_owned(),
            }),
        }
    }
}

impl Manifest {
    /// Read and parse a `ferrule.toml` from the given path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// declares a malformed dependency.
    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|e| ManifestError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let manifest: Manifest = toml::from_str(&content).map_err(|e| ManifestError::Parse {
            path: path.display().to_string(),
            source: e,
        })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Check every dependency declaration names exactly one source.
    ///
    /// # Errors
    /// Returns the first invalid declaration, prefixed with its configuration.
    pub fn validate(&self) -> Result<(), ManifestError> {
        for (name, config) in &self.configurations {
            for (index, dep) in config.dependencies.iter().enumerate() {
                if let Err(ManifestError::Invalid { message }) = dep.source() {
                    return Err(ManifestError::Invalid {
                        message: format!("configuration `{name}`, dependency #{}: {message}", index + 1),
                    });
                }
            }
        }
        Ok(())
    }

    /// Look up a configuration by name.
    ///
    /// # Errors
    /// Returns an error naming the package if the configuration is not declared.
    pub fn configuration(&self, name: &str) -> Result<&ConfigurationSpec, ManifestError> {
        self.configurations
            .get(name)
            .ok_or_else(|| ManifestError::UnknownConfiguration {
                package: self.package.name.clone(),
                name: name.to_owned(),
            })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid ferrule.toml at {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid ferrule.toml: {message}")]
    Invalid { message: String },
    #[error("project `{package}` has no configuration named `{name}`")]
    UnknownConfiguration { package: String, name: String },
}

//! The resolved view of a configuration and the backend resolver boundary.

use std::fmt;
use std::path::PathBuf;

use ferrule_util::MavenCoordinate;
use indexmap::IndexSet;
use serde::Serialize;

use crate::configuration::Configuration;
use crate::error::ResolveError;

/// `group:name:version` of a resolved module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ModuleId {
    pub group: String,
    pub name: String,
    pub version: String,
}

impl ModuleId {
    pub fn new(group: &str, name: &str, version: &str) -> Self {
        Self {
            group: group.to_owned(),
            name: name.to_owned(),
            version: version.to_owned(),
        }
    }
}

impl From<&MavenCoordinate> for ModuleId {
    fn from(coord: &MavenCoordinate) -> Self {
        Self::new(&coord.group_id, &coord.artifact_id, &coord.version)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.name, self.version)
    }
}

/// A file published by a resolved module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedArtifact {
    pub module: ModuleId,
    pub name: String,
    pub extension: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    pub file: PathBuf,
}

impl fmt::Display for ResolvedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}", self.module, self.name)?;
        if let Some(classifier) = &self.classifier {
            write!(f, "-{classifier}")?;
        }
        write!(f, ".{})", self.extension)
    }
}

/// A node of the resolved module graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedDependency {
    pub module: ModuleId,
    /// Configuration the module was resolved for.
    pub configuration: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ResolvedDependency>,
    pub artifacts: Vec<ResolvedArtifact>,
}

impl ResolvedDependency {
    /// This module's artifacts followed by its children's, depth-first.
    pub fn all_artifacts(&self) -> Vec<&ResolvedArtifact> {
        let mut out = Vec::new();
        self.collect_artifacts(&mut out);
        out
    }

    fn collect_artifacts<'a>(&'a self, out: &mut Vec<&'a ResolvedArtifact>) {
        out.extend(self.artifacts.iter());
        for child in &self.children {
            child.collect_artifacts(out);
        }
    }
}

/// A predicate selecting which backend artifacts contribute files.
pub trait ArtifactSpec {
    /// # Errors
    /// Returns an error if the predicate cannot be evaluated for `artifact`.
    fn is_satisfied_by(&self, artifact: &ResolvedArtifact) -> Result<bool, ResolveError>;
}

impl<F> ArtifactSpec for F
where
    F: Fn(&ResolvedArtifact) -> Result<bool, ResolveError>,
{
    fn is_satisfied_by(&self, artifact: &ResolvedArtifact) -> Result<bool, ResolveError> {
        self(artifact)
    }
}

/// Accepts every artifact.
#[derive(Debug, Clone, Copy, Default)]
pub struct SatisfiesAll;

impl ArtifactSpec for SatisfiesAll {
    fn is_satisfied_by(&self, _artifact: &ResolvedArtifact) -> Result<bool, ResolveError> {
        Ok(true)
    }
}

/// Rejects every artifact.
#[derive(Debug, Clone, Copy, Default)]
pub struct SatisfiesNone;

impl ArtifactSpec for SatisfiesNone {
    fn is_satisfied_by(&self, _artifact: &ResolvedArtifact) -> Result<bool, ResolveError> {
        Ok(false)
    }
}

/// An infallible predicate, e.g. `Predicate(|a: &ResolvedArtifact| a.extension == "jar")`.
#[derive(Debug, Clone, Copy)]
pub struct Predicate<F>(pub F);

impl<F> ArtifactSpec for Predicate<F>
where
    F: Fn(&ResolvedArtifact) -> bool,
{
    fn is_satisfied_by(&self, artifact: &ResolvedArtifact) -> Result<bool, ResolveError> {
        Ok((self.0)(artifact))
    }
}

/// The queryable result of resolving a configuration.
pub trait ResolvedConfiguration {
    /// Files of the configuration, in order, without duplicates.
    ///
    /// # Errors
    /// Returns any failure raised while enumerating files or evaluating `spec`.
    fn files(&self, spec: &dyn ArtifactSpec) -> Result<IndexSet<PathBuf>, ResolveError>;

    /// The modules declared directly by the configuration.
    ///
    /// # Errors
    /// Returns any failure raised by the resolver that produced this view.
    fn first_level_module_dependencies(&self) -> Result<IndexSet<ResolvedDependency>, ResolveError>;

    /// Every artifact of the resolved module graph.
    ///
    /// # Errors
    /// Returns any failure raised by the resolver that produced this view.
    fn resolved_artifacts(&self) -> Result<IndexSet<ResolvedArtifact>, ResolveError>;
}

impl<T: ResolvedConfiguration + ?Sized> ResolvedConfiguration for Box<T> {
    fn files(&self, spec: &dyn ArtifactSpec) -> Result<IndexSet<PathBuf>, ResolveError> {
        (**self).files(spec)
    }

    fn first_level_module_dependencies(&self) -> Result<IndexSet<ResolvedDependency>, ResolveError> {
        (**self).first_level_module_dependencies()
    }

    fn resolved_artifacts(&self) -> Result<IndexSet<ResolvedArtifact>, ResolveError> {
        (**self).resolved_artifacts()
    }
}

/// Resolves a configuration's module graph.
pub trait ArtifactDependencyResolver {
    type Resolved: ResolvedConfiguration;

    /// # Errors
    /// Returns an error if the configuration cannot be resolved.
    fn resolve(&self, configuration: &Configuration) -> Result<Self::Resolved, ResolveError>;
}

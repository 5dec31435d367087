//! A backend resolver that reads the module graph from `ferrule.lock`.
//!
//! The graph is already resolved: this backend only looks modules up, builds
//! the tree rooted at each declared module, and maps artifacts to files in a
//! local Maven-layout repository. It never contacts a remote repository.

use std::path::{Path, PathBuf};

use ferrule_config::lockfile::{Lockfile, ModuleLock};
use ferrule_util::MavenCoordinate;
use indexmap::IndexSet;
use tracing::debug;

use crate::configuration::Configuration;
use crate::dependency::Dependency;
use crate::error::ResolveError;
use crate::resolved::{
    ArtifactDependencyResolver, ArtifactSpec, ModuleId, ResolvedArtifact, ResolvedConfiguration,
    ResolvedDependency,
};

/// Resolves module dependencies against a lockfile and a local repository.
#[derive(Debug, Clone)]
pub struct LockfileResolver {
    lockfile: Lockfile,
    repository: PathBuf,
}

impl LockfileResolver {
    pub fn new(lockfile: Lockfile, repository: &Path) -> Self {
        Self {
            lockfile,
            repository: repository.to_path_buf(),
        }
    }

    /// Build the resolved tree for one declared module.
    ///
    /// `stack` holds the ids on the current path for cycle detection.
    fn resolve_module(
        &self,
        coordinate: &MavenCoordinate,
        configuration: &str,
        transitive: bool,
        stack: &mut Vec<String>,
    ) -> Result<ResolvedDependency, ResolveError> {
        let id = coordinate.to_string();
        if let Some(start) = stack.iter().position(|s| *s == id) {
            let mut cycle: Vec<&str> = stack
                .get(start..)
                .unwrap_or_default()
                .iter()
                .map(String::as_str)
                .collect();
            cycle.push(&id);
            return Err(ResolveError::DependencyCycle {
                cycle: cycle.join(" -> "),
            });
        }

        let locked = self
            .lockfile
            .module(&id)
            .ok_or_else(|| ResolveError::UnresolvedModule {
                module: id.clone(),
                configuration: configuration.to_owned(),
            })?;

        let mut children = Vec::new();
        if transitive {
            stack.push(id.clone());
            for child_id in &locked.dependencies {
                let child = MavenCoordinate::parse(child_id)?;
                children.push(self.resolve_module(&child, configuration, true, stack)?);
            }
            stack.pop();
        }

        Ok(ResolvedDependency {
            module: ModuleId::from(coordinate),
            configuration: configuration.to_owned(),
            children,
            artifacts: self.artifacts(coordinate, locked),
        })
    }

    fn artifacts(&self, coordinate: &MavenCoordinate, locked: &ModuleLock) -> Vec<ResolvedArtifact> {
        let module = ModuleId::from(coordinate);
        if locked.artifacts.is_empty() {
            return vec![ResolvedArtifact {
                module,
                name: coordinate.artifact_id.clone(),
                extension: coordinate.packaging.clone(),
                classifier: None,
                file: coordinate.local_path(&self.repository),
            }];
        }

        locked
            .artifacts
            .iter()
            .map(|artifact| {
                let name = artifact
                    .name
                    .clone()
                    .unwrap_or_else(|| coordinate.artifact_id.clone());
                let file = coordinate.artifact_path(
                    &self.repository,
                    &name,
                    artifact.classifier.as_deref(),
                    &artifact.extension,
                );
                ResolvedArtifact {
                    module: module.clone(),
                    name,
                    extension: artifact.extension.clone(),
                    classifier: artifact.classifier.clone(),
                    file,
                }
            })
            .collect()
    }
}

impl ArtifactDependencyResolver for LockfileResolver {
    type Resolved = LockfileResolvedConfiguration;

    /// Only `Module` dependencies are looked up; file and project
    /// dependencies are not this resolver's concern.
    fn resolve(&self, configuration: &Configuration) -> Result<Self::Resolved, ResolveError> {
        let configuration_transitive = configuration.is_transitive();
        let mut first_level = IndexSet::new();

        for dependency in configuration.dependencies() {
            let Dependency::Module(module) = dependency else {
                continue;
            };
            let transitive = configuration_transitive && module.transitive().unwrap_or(true);
            let resolved = self.resolve_module(
                module.coordinate(),
                configuration.name(),
                transitive,
                &mut Vec::new(),
            )?;
            first_level.insert(resolved);
        }

        debug!(
            configuration = %configuration.name(),
            modules = first_level.len(),
            "resolved module graph from lockfile"
        );
        Ok(LockfileResolvedConfiguration { first_level })
    }
}

/// The module graph of one configuration, resolved from a lockfile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockfileResolvedConfiguration {
    first_level: IndexSet<ResolvedDependency>,
}

impl LockfileResolvedConfiguration {
    fn artifacts(&self) -> impl Iterator<Item = &ResolvedArtifact> {
        self.first_level
            .iter()
            .flat_map(ResolvedDependency::all_artifacts)
    }
}

impl ResolvedConfiguration for LockfileResolvedConfiguration {
    fn files(&self, spec: &dyn ArtifactSpec) -> Result<IndexSet<PathBuf>, ResolveError> {
        let mut files = IndexSet::new();
        for artifact in self.artifacts() {
            if spec.is_satisfied_by(artifact)? {
                files.insert(artifact.file.clone());
            }
        }
        Ok(files)
    }

    fn first_level_module_dependencies(&self) -> Result<IndexSet<ResolvedDependency>, ResolveError> {
        Ok(self.first_level.clone())
    }

    fn resolved_artifacts(&self) -> Result<IndexSet<ResolvedArtifact>, ResolveError> {
        Ok(self.artifacts().cloned().collect())
    }
}

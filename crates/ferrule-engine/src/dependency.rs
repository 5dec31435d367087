//! Declared dependencies and their self-resolution hook.

use std::sync::Arc;

use ferrule_util::{FileCollection, MavenCoordinate};
use tracing::debug;

use crate::configuration::Configuration;
use crate::context::DependencyResolveContext;
use crate::error::ResolveError;

/// A declared dependency of a [`Configuration`].
///
/// Every variant answers [`Dependency::contribute_files`]. Variants that can
/// produce their files directly add them to the context; module dependencies
/// are left to the backend resolver and contribute nothing.
#[derive(Debug, Clone)]
pub enum Dependency {
    /// Files referenced directly, e.g. `libs/*.jar`.
    Files(FileDependency),
    /// The published output of another project.
    Project(ProjectDependency),
    /// A module resolved through the backend's metadata graph.
    Module(ModuleDependency),
}

impl Dependency {
    pub fn files(collection: impl FileCollection + 'static) -> Self {
        Self::Files(FileDependency::new(Arc::new(collection)))
    }

    pub fn module(coordinate: MavenCoordinate) -> Self {
        Self::Module(ModuleDependency::new(coordinate))
    }

    pub fn project(
        name: &str,
        configuration: Configuration,
        artifacts: impl FileCollection + 'static,
    ) -> Self {
        Self::Project(ProjectDependency::new(name, configuration, Arc::new(artifacts)))
    }

    /// Whether this dependency can produce its files without the backend.
    pub fn is_self_resolving(&self) -> bool {
        !matches!(self, Self::Module(_))
    }

    /// A short human-readable label for logs and errors.
    pub fn display_name(&self) -> String {
        match self {
            Self::Files(_) => "files".to_owned(),
            Self::Project(p) => format!("project {}", p.name),
            Self::Module(m) => format!("module {}", m.coordinate),
        }
    }

    /// Add the files this dependency resolves to without the backend.
    ///
    /// Safe to call repeatedly: the only effect is on `context`. Module
    /// dependencies are a no-op.
    ///
    /// # Errors
    /// Returns an error if a project dependency cycles back onto a project
    /// that is already being resolved.
    pub fn contribute_files(&self, context: &mut DependencyResolveContext) -> Result<(), ResolveError> {
        match self {
            Self::Files(dep) => {
                context.add(Arc::clone(&dep.files));
                Ok(())
            }
            Self::Project(dep) => dep.contribute_files(context),
            Self::Module(_) => Ok(()),
        }
    }
}

/// A dependency on a fixed collection of files.
#[derive(Debug, Clone)]
pub struct FileDependency {
    files: Arc<dyn FileCollection>,
}

impl FileDependency {
    pub fn new(files: Arc<dyn FileCollection>) -> Self {
        Self { files }
    }

    pub fn files(&self) -> &Arc<dyn FileCollection> {
        &self.files
    }
}

/// A dependency on another project's published artifacts.
#[derive(Debug, Clone)]
pub struct ProjectDependency {
    name: String,
    configuration: Configuration,
    artifacts: Arc<dyn FileCollection>,
    transitive: Option<bool>,
}

impl ProjectDependency {
    pub fn new(name: &str, configuration: Configuration, artifacts: Arc<dyn FileCollection>) -> Self {
        Self {
            name: name.to_owned(),
            configuration,
            artifacts,
            transitive: None,
        }
    }

    /// Override the context's transitivity for this dependency only.
    pub fn with_transitive(mut self, transitive: bool) -> Self {
        self.transitive = Some(transitive);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn transitive(&self) -> Option<bool> {
        self.transitive
    }

    /// When transitive, the target configuration's own self-resolving
    /// dependencies come first, followed by the project's artifacts.
    fn contribute_files(&self, context: &mut DependencyResolveContext) -> Result<(), ResolveError> {
        let transitive = self.transitive.unwrap_or(context.is_transitive());
        debug!(
            project = %self.name,
            configuration = %self.configuration.name(),
            transitive,
            "resolving project dependency"
        );

        if transitive {
            let label = format!("{}:{}", self.name, self.configuration.name());
            context.enter_project(&self.configuration, &label)?;
            let result = self
                .configuration
                .dependencies()
                .iter()
                .try_for_each(|dep| dep.contribute_files(context));
            context.leave_project();
            result?;
        }

        context.add_with_transitivity(Arc::clone(&self.artifacts), transitive);
        Ok(())
    }
}

/// A module coordinate left to the backend resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDependency {
    coordinate: MavenCoordinate,
    transitive: Option<bool>,
}

impl ModuleDependency {
    pub fn new(coordinate: MavenCoordinate) -> Self {
        Self {
            coordinate,
            transitive: None,
        }
    }

    /// Override the configuration's transitivity for this module only.
    pub fn with_transitive(mut self, transitive: bool) -> Self {
        self.transitive = Some(transitive);
        self
    }

    pub fn coordinate(&self) -> &MavenCoordinate {
        &self.coordinate
    }

    pub fn transitive(&self) -> Option<bool> {
        self.transitive
    }
}

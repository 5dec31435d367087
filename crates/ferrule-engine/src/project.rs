//! Build [`Configuration`]s from `ferrule.toml` manifests.
//!
//! Project dependencies are followed recursively: the target project's
//! manifest is loaded and its configuration becomes part of the
//! [`ProjectDependency`]. Each `(project, configuration)` pair is loaded once
//! per call, so diamonds share one `Configuration` handle.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use ferrule_config::manifest::{DependencySource, DependencySpec, Manifest};
use ferrule_util::fs::resolve_relative;
use ferrule_util::{FileCollection, FileList, FileUnion, GlobFiles, MavenCoordinate};
use tracing::debug;

use crate::configuration::Configuration;
use crate::dependency::{Dependency, ModuleDependency, ProjectDependency};
use crate::error::ResolveError;

/// Manifest filename at the root of every project.
pub const MANIFEST_FILE: &str = "ferrule.toml";

/// Maximum number of `..` components a project dependency may start with.
///
/// This allows sibling projects (e.g. `../core`) and reasonable workspace
/// layouts while blocking traversals that escape the project tree.
const MAX_PARENT_TRAVERSAL: usize = 3;

/// Load configuration `name` of the project at `project_root`.
///
/// # Errors
/// Returns an error if a manifest is missing or invalid, a configuration is
/// not declared, a module coordinate is malformed, a project path escapes
/// the tree, or project dependencies form a cycle.
pub fn load_configuration(project_root: &Path, name: &str) -> Result<Configuration, ResolveError> {
    let root = project_root
        .canonicalize()
        .map_err(|_| ResolveError::ProjectNotFound {
            name: project_root.display().to_string(),
            path: project_root.display().to_string(),
        })?;
    let mut loader = ProjectLoader::default();
    let loaded = loader.load(&root, name, &mut Vec::new())?;
    Ok(loaded.configuration)
}

/// The files a project publishes, from its `[package] artifacts` globs.
pub fn published_artifacts(project_root: &Path, manifest: &Manifest) -> FileUnion {
    let members = manifest
        .package
        .artifacts
        .iter()
        .map(|pattern| Arc::new(GlobFiles::new(project_root, pattern)) as Arc<dyn FileCollection>)
        .collect();
    FileUnion::new(members)
}

#[derive(Debug, Clone)]
struct LoadedProject {
    name: String,
    artifacts: Arc<dyn FileCollection>,
    configuration: Configuration,
}

#[derive(Debug, Default)]
struct ProjectLoader {
    loaded: HashMap<(PathBuf, String), LoadedProject>,
}

impl ProjectLoader {
    /// Depth-first load; `stack` holds `(root, configuration, label)` for the
    /// projects on the current path.
    fn load(
        &mut self,
        root: &Path,
        configuration: &str,
        stack: &mut Vec<(PathBuf, String, String)>,
    ) -> Result<LoadedProject, ResolveError> {
        let key = (root.to_path_buf(), configuration.to_owned());
        if let Some(project) = self.loaded.get(&key) {
            return Ok(project.clone());
        }

        let manifest_path = root.join(MANIFEST_FILE);
        if !manifest_path.exists() {
            return Err(ResolveError::ProjectNotFound {
                name: root
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                path: root.display().to_string(),
            });
        }
        let manifest = Manifest::from_path(&manifest_path)?;
        let label = format!("{}:{configuration}", manifest.package.name);

        if let Some(start) = stack
            .iter()
            .position(|(r, c, _)| r == root && c == configuration)
        {
            let mut cycle: Vec<&str> = stack
                .get(start..)
                .unwrap_or_default()
                .iter()
                .map(|(_, _, l)| l.as_str())
                .collect();
            cycle.push(&label);
            return Err(ResolveError::DependencyCycle {
                cycle: cycle.join(" -> "),
            });
        }

        let spec = manifest.configuration(configuration)?;
        let config = Configuration::new(configuration).with_transitive(spec.transitive);
        debug!(project = %label, dependencies = spec.dependencies.len(), "loading configuration");

        stack.push((root.to_path_buf(), configuration.to_owned(), label));
        for dep in &spec.dependencies {
            let dependency = self.dependency(root, configuration, dep, stack)?;
            config.add_dependency(dependency);
        }
        stack.pop();

        let project = LoadedProject {
            name: manifest.package.name.clone(),
            artifacts: Arc::new(published_artifacts(root, &manifest)),
            configuration: config,
        };
        self.loaded.insert(key, project.clone());
        Ok(project)
    }

    fn dependency(
        &mut self,
        root: &Path,
        configuration: &str,
        spec: &DependencySpec,
        stack: &mut Vec<(PathBuf, String, String)>,
    ) -> Result<Dependency, ResolveError> {
        let dependency = match spec.source()? {
            DependencySource::Files(files) => Dependency::files(FileList::new(
                files.iter().map(|f| resolve_relative(root, f)),
            )),
            DependencySource::Glob(pattern) => Dependency::files(GlobFiles::new(root, pattern)),
            DependencySource::Module(coordinate) => {
                let module = ModuleDependency::new(MavenCoordinate::parse(coordinate)?);
                Dependency::Module(match spec.transitive {
                    Some(transitive) => module.with_transitive(transitive),
                    None => module,
                })
            }
            DependencySource::Project {
                path,
                configuration: target_configuration,
            } => {
                let target_root = resolve_project_path(root, path)?;
                let target = self.load(
                    &target_root,
                    target_configuration.unwrap_or(configuration),
                    stack,
                )?;
                let project =
                    ProjectDependency::new(&target.name, target.configuration, target.artifacts);
                Dependency::Project(match spec.transitive {
                    Some(transitive) => project.with_transitive(transitive),
                    None => project,
                })
            }
        };
        Ok(dependency)
    }
}

/// Resolve a project dependency path relative to the depending project's root.
fn resolve_project_path(parent_root: &Path, rel_path: &str) -> Result<PathBuf, ResolveError> {
    if Path::new(rel_path).is_absolute() {
        return Err(ResolveError::ProjectPathEscape {
            name: rel_path.to_owned(),
            path: rel_path.to_owned(),
        });
    }

    let parent_escapes = Path::new(rel_path)
        .components()
        .take_while(|c| matches!(c, Component::ParentDir))
        .count();
    if parent_escapes > MAX_PARENT_TRAVERSAL {
        return Err(ResolveError::ProjectPathEscape {
            name: rel_path.to_owned(),
            path: parent_root.join(rel_path).display().to_string(),
        });
    }

    let resolved = parent_root.join(rel_path);
    resolved
        .canonicalize()
        .map_err(|_| ResolveError::ProjectNotFound {
            name: rel_path.to_owned(),
            path: resolved.display().to_string(),
        })
}

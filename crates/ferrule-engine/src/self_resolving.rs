//! Merge self-resolving dependencies ahead of a backend resolver's output.
//!
//! [`SelfResolvingDependencyResolver`] decorates any [`ArtifactDependencyResolver`].
//! `resolve` runs the backend once, eagerly; every later
//! [`files`](ResolvedConfiguration::files) query walks the configuration's
//! *current* dependencies, lets each contribute files to a fresh
//! [`DependencyResolveContext`], and merges the result in front of the
//! backend's filtered files.

use std::path::PathBuf;

use indexmap::IndexSet;
use tracing::{debug, trace};

use crate::configuration::Configuration;
use crate::context::DependencyResolveContext;
use crate::error::ResolveError;
use crate::resolved::{
    ArtifactDependencyResolver, ArtifactSpec, ResolvedArtifact, ResolvedConfiguration,
    ResolvedDependency,
};

/// Decorates a backend resolver with direct resolution of file and project
/// dependencies.
#[derive(Debug, Clone)]
pub struct SelfResolvingDependencyResolver<R> {
    backend: R,
}

impl<R> SelfResolvingDependencyResolver<R> {
    pub fn new(backend: R) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &R {
        &self.backend
    }
}

impl<R: ArtifactDependencyResolver> ArtifactDependencyResolver for SelfResolvingDependencyResolver<R> {
    type Resolved = SelfResolvedConfiguration<R::Resolved>;

    /// Resolve the backend's view now; self-resolving dependencies are
    /// deferred to each `files` query. Backend errors are returned as-is.
    fn resolve(&self, configuration: &Configuration) -> Result<Self::Resolved, ResolveError> {
        debug!(
            configuration = %configuration.name(),
            dependencies = configuration.len(),
            "resolving configuration"
        );
        let backend = self.backend.resolve(configuration)?;
        Ok(SelfResolvedConfiguration {
            configuration: configuration.clone(),
            backend,
        })
    }
}

/// A backend result combined with the configuration's self-resolving
/// dependencies.
///
/// Always a distinct value from the backend result it wraps. Nothing is
/// cached: each `files` query reflects the configuration as it is at call time.
#[derive(Debug)]
pub struct SelfResolvedConfiguration<C> {
    configuration: Configuration,
    backend: C,
}

impl<C> SelfResolvedConfiguration<C> {
    /// The wrapped backend result.
    pub fn backend(&self) -> &C {
        &self.backend
    }

    /// The live configuration handle this view reads from.
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Files contributed by self-resolving dependencies alone, in declaration
    /// order and without duplicates. No filter applies to these.
    ///
    /// # Errors
    /// Returns the first failure raised by a dependency hook or by enumerating
    /// a contributed collection.
    pub fn self_resolved_files(&self) -> Result<IndexSet<PathBuf>, ResolveError> {
        let mut context = DependencyResolveContext::new(self.configuration.is_transitive());
        for dependency in self.configuration.dependencies() {
            if dependency.is_self_resolving() {
                trace!(dependency = %dependency.display_name(), "contributing files");
            }
            dependency.contribute_files(&mut context)?;
        }
        context.resolve()
    }
}

impl<C: ResolvedConfiguration> ResolvedConfiguration for SelfResolvedConfiguration<C> {
    /// Self-resolved files first, then the backend's files for `spec`. A
    /// backend file already present keeps its earlier position.
    fn files(&self, spec: &dyn ArtifactSpec) -> Result<IndexSet<PathBuf>, ResolveError> {
        let mut files = self.self_resolved_files()?;
        let self_resolved = files.len();

        for file in self.backend.files(spec)? {
            if files.contains(&file) {
                trace!(file = %file.display(), "backend file already self-resolved");
            } else {
                files.insert(file);
            }
        }

        debug!(
            configuration = %self.configuration.name(),
            self_resolved,
            total = files.len(),
            "merged configuration files"
        );
        Ok(files)
    }

    fn first_level_module_dependencies(&self) -> Result<IndexSet<ResolvedDependency>, ResolveError> {
        self.backend.first_level_module_dependencies()
    }

    fn resolved_artifacts(&self) -> Result<IndexSet<ResolvedArtifact>, ResolveError> {
        self.backend.resolved_artifacts()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::cell::Cell;

    use ferrule_util::{ExtensionFiles, FileList, MavenCoordinate};

    use super::*;
    use crate::dependency::Dependency;
    use crate::resolved::{ModuleId, Predicate, SatisfiesAll, SatisfiesNone};

    /// Backend result with a fixed module graph; every artifact is one file.
    #[derive(Debug, Clone, Default)]
    struct StubResolved {
        artifacts: Vec<ResolvedArtifact>,
        first_level: Vec<ResolvedDependency>,
    }

    impl StubResolved {
        fn with_files(names: &[&str]) -> Self {
            Self {
                artifacts: names.iter().map(|n| stub_artifact(n)).collect(),
                first_level: Vec::new(),
            }
        }
    }

    fn stub_artifact(file: &str) -> ResolvedArtifact {
        ResolvedArtifact {
            module: ModuleId::new("g", file, "1"),
            name: file.to_owned(),
            extension: "jar".to_owned(),
            classifier: None,
            file: PathBuf::from(file),
        }
    }

    impl ResolvedConfiguration for StubResolved {
        fn files(&self, spec: &dyn ArtifactSpec) -> Result<IndexSet<PathBuf>, ResolveError> {
            let mut out = IndexSet::new();
            for artifact in &self.artifacts {
                if spec.is_satisfied_by(artifact)? {
                    out.insert(artifact.file.clone());
                }
            }
            Ok(out)
        }

        fn first_level_module_dependencies(
            &self,
        ) -> Result<IndexSet<ResolvedDependency>, ResolveError> {
            Ok(self.first_level.iter().cloned().collect())
        }

        fn resolved_artifacts(&self) -> Result<IndexSet<ResolvedArtifact>, ResolveError> {
            Ok(self.artifacts.iter().cloned().collect())
        }
    }

    #[derive(Debug, Default)]
    struct StubResolver {
        result: StubResolved,
        calls: Cell<usize>,
        fail: bool,
    }

    impl ArtifactDependencyResolver for StubResolver {
        type Resolved = StubResolved;

        fn resolve(&self, configuration: &Configuration) -> Result<StubResolved, ResolveError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(ResolveError::Backend {
                    configuration: configuration.name().to_owned(),
                    message: "metadata unavailable".to_owned(),
                });
            }
            Ok(self.result.clone())
        }
    }

    fn resolver(result: StubResolved) -> SelfResolvingDependencyResolver<StubResolver> {
        SelfResolvingDependencyResolver::new(StubResolver {
            result,
            ..StubResolver::default()
        })
    }

    fn names(files: &IndexSet<PathBuf>) -> Vec<String> {
        files.iter().map(|p| p.display().to_string()).collect()
    }

    #[test]
    fn empty_configuration_matches_backend() {
        let resolver = resolver(StubResolved::with_files(&["file"]));
        let config = Configuration::new("compile");
        let resolved = resolver.resolve(&config).unwrap();

        let expected = resolved.backend().files(&SatisfiesAll).unwrap();
        assert_eq!(resolved.files(&SatisfiesAll).unwrap(), expected);
        assert_eq!(names(&expected), vec!["file"]);
    }

    #[test]
    fn resolve_wraps_backend_result() {
        let resolver = resolver(StubResolved::with_files(&["file"]));
        let config = Configuration::new("compile");
        let resolved: SelfResolvedConfiguration<StubResolved> = resolver.resolve(&config).unwrap();
        assert_eq!(resolved.backend().artifacts.len(), 1);
        assert!(resolved.configuration().same_as(&config));
    }

    #[test]
    fn backend_resolved_exactly_once_and_eagerly() {
        let resolver = resolver(StubResolved::with_files(&["file"]));
        let config = Configuration::new("compile");
        config.add_dependency(Dependency::files(FileList::new(["dep"])));

        let resolved = resolver.resolve(&config).unwrap();
        assert_eq!(resolver.backend().calls.get(), 1);

        resolved.files(&SatisfiesAll).unwrap();
        resolved.files(&SatisfiesAll).unwrap();
        assert_eq!(resolver.backend().calls.get(), 1);
    }

    #[test]
    fn resolve_does_not_touch_self_resolving_dependencies() {
        let tmp = tempfile::tempdir().unwrap();
        let resolver = resolver(StubResolved::default());
        let config = Configuration::new("compile");
        config.add_dependency(Dependency::files(ExtensionFiles::new(
            &tmp.path().join("absent"),
            "jar",
        )));

        // The broken collection only fails once files are queried.
        let resolved = resolver.resolve(&config).unwrap();
        assert!(resolved.files(&SatisfiesAll).is_err());
    }

    #[test]
    fn self_resolved_files_come_before_backend_files() {
        let resolver = resolver(StubResolved::with_files(&["from config"]));
        let config = Configuration::new("compile");
        config.add_dependency(Dependency::files(FileList::new(["from dep"])));

        let resolved = resolver.resolve(&config).unwrap();
        assert_eq!(
            names(&resolved.files(&SatisfiesAll).unwrap()),
            vec!["from dep", "from config"]
        );
    }

    #[test]
    fn backend_duplicate_of_self_resolved_file_is_dropped() {
        let resolver = resolver(StubResolved::with_files(&["a", "b"]));
        let config = Configuration::new("compile");
        config.add_dependency(Dependency::files(FileList::new(["a"])));

        let resolved = resolver.resolve(&config).unwrap();
        assert_eq!(names(&resolved.files(&SatisfiesAll).unwrap()), vec!["a", "b"]);
    }

    #[test]
    fn self_resolved_files_follow_declaration_order() {
        let resolver = resolver(StubResolved::with_files(&["backend.jar"]));
        let config = Configuration::new("compile");
        config.add_dependency(Dependency::files(FileList::new(["second.jar", "shared.jar"])));
        config.add_dependency(Dependency::module(MavenCoordinate::new("g", "m", "1")));
        config.add_dependency(Dependency::files(FileList::new(["shared.jar", "first.jar"])));

        let resolved = resolver.resolve(&config).unwrap();
        assert_eq!(
            names(&resolved.files(&SatisfiesAll).unwrap()),
            vec!["second.jar", "shared.jar", "first.jar", "backend.jar"]
        );
    }

    #[test]
    fn end_to_end_self_dependency_and_module() {
        let resolver = resolver(StubResolved::with_files(&["y.jar", "x.jar"]));
        let config = Configuration::new("compile");
        config.add_dependency(Dependency::files(FileList::new(["x.jar"])));
        config.add_dependency(Dependency::module(MavenCoordinate::new("g", "y", "1")));

        let resolved = resolver.resolve(&config).unwrap();
        assert_eq!(names(&resolved.files(&SatisfiesAll).unwrap()), vec!["x.jar", "y.jar"]);
    }

    #[test]
    fn filter_never_applies_to_self_resolved_files() {
        let resolver = resolver(StubResolved::with_files(&["backend.jar"]));
        let config = Configuration::new("compile");
        config.add_dependency(Dependency::files(FileList::new(["local.jar"])));

        let resolved = resolver.resolve(&config).unwrap();
        assert_eq!(names(&resolved.files(&SatisfiesNone).unwrap()), vec!["local.jar"]);
    }

    #[test]
    fn filter_is_forwarded_to_backend() {
        let resolver = resolver(StubResolved::with_files(&["keep.jar", "drop.jar"]));
        let resolved = resolver.resolve(&Configuration::new("compile")).unwrap();
        let spec = Predicate(|a: &ResolvedArtifact| a.name != "drop.jar");
        assert_eq!(names(&resolved.files(&spec).unwrap()), vec!["keep.jar"]);
    }

    #[test]
    fn repeated_queries_are_deterministic() {
        let resolver = resolver(StubResolved::with_files(&["c", "a"]));
        let config = Configuration::new("compile");
        config.add_dependency(Dependency::files(FileList::new(["b", "a"])));

        let resolved = resolver.resolve(&config).unwrap();
        let first = resolved.files(&SatisfiesAll).unwrap();
        let second = resolved.files(&SatisfiesAll).unwrap();
        assert_eq!(names(&first), names(&second));
    }

    #[test]
    fn later_dependencies_are_reflected_without_re_resolving() {
        let resolver = resolver(StubResolved::with_files(&["backend.jar"]));
        let config = Configuration::new("compile");
        let resolved = resolver.resolve(&config).unwrap();
        assert_eq!(names(&resolved.files(&SatisfiesAll).unwrap()), vec!["backend.jar"]);

        config.add_dependency(Dependency::files(FileList::new(["late.jar"])));
        assert_eq!(
            names(&resolved.files(&SatisfiesAll).unwrap()),
            vec!["late.jar", "backend.jar"]
        );
        assert_eq!(resolver.backend().calls.get(), 1);
    }

    #[test]
    fn transitivity_is_read_at_query_time() {
        let core = Configuration::new("compile");
        core.add_dependency(Dependency::files(FileList::new(["core-dep.jar"])));

        let resolver = resolver(StubResolved::default());
        let config = Configuration::new("compile");
        config.add_dependency(Dependency::project("core", core, FileList::new(["core.jar"])));

        let resolved = resolver.resolve(&config).unwrap();
        assert_eq!(
            names(&resolved.files(&SatisfiesAll).unwrap()),
            vec!["core-dep.jar", "core.jar"]
        );

        config.set_transitive(false);
        assert_eq!(names(&resolved.files(&SatisfiesAll).unwrap()), vec!["core.jar"]);
    }

    #[test]
    fn module_views_pass_through() {
        let dependency = ResolvedDependency {
            module: ModuleId::new("g", "m", "1"),
            configuration: "compile".to_owned(),
            children: Vec::new(),
            artifacts: vec![stub_artifact("m.jar")],
        };
        let backend = StubResolved {
            artifacts: vec![stub_artifact("m.jar")],
            first_level: vec![dependency],
        };
        let resolver = resolver(backend.clone());
        let config = Configuration::new("compile");
        config.add_dependency(Dependency::files(FileList::new(["local.jar"])));

        let resolved = resolver.resolve(&config).unwrap();
        assert_eq!(
            resolved.first_level_module_dependencies().unwrap(),
            backend.first_level_module_dependencies().unwrap()
        );
        assert_eq!(
            resolved.resolved_artifacts().unwrap(),
            backend.resolved_artifacts().unwrap()
        );
    }

    #[test]
    fn backend_failure_propagates_unchanged() {
        let resolver = SelfResolvingDependencyResolver::new(StubResolver {
            fail: true,
            ..StubResolver::default()
        });
        let err = resolver.resolve(&Configuration::new("compile")).unwrap_err();
        assert!(
            matches!(&err, ResolveError::Backend { message, .. } if message == "metadata unavailable"),
            "error was: {err}"
        );
    }

    #[test]
    fn filter_failure_propagates() {
        let resolver = resolver(StubResolved::with_files(&["a.jar"]));
        let resolved = resolver.resolve(&Configuration::new("compile")).unwrap();
        let failing = |a: &ResolvedArtifact| -> Result<bool, ResolveError> {
            Err(ResolveError::Filter {
                artifact: a.to_string(),
                message: "unreadable attribute".to_owned(),
            })
        };
        let err = resolved.files(&failing).unwrap_err().to_string();
        assert!(err.contains("unreadable attribute"), "error was: {err}");
    }

    #[test]
    fn self_resolution_failure_returns_no_partial_result() {
        let tmp = tempfile::tempdir().unwrap();
        let resolver = resolver(StubResolved::with_files(&["backend.jar"]));
        let config = Configuration::new("compile");
        config.add_dependency(Dependency::files(FileList::new(["ok.jar"])));
        config.add_dependency(Dependency::files(ExtensionFiles::new(
            &tmp.path().join("absent"),
            "jar",
        )));

        let resolved = resolver.resolve(&config).unwrap();
        let err = resolved.files(&SatisfiesAll).unwrap_err();
        assert!(matches!(err, ResolveError::Util(_)), "error was: {err}");
    }

    #[test]
    fn dependency_hook_failure_aborts_files() {
        let resolver = resolver(StubResolved::with_files(&["backend.jar"]));
        let core = Configuration::new("compile");
        core.add_dependency(Dependency::project(
            "core",
            core.clone(),
            FileList::new(["core.jar"]),
        ));
        let config = Configuration::new("compile");
        config.add_dependency(Dependency::files(FileList::new(["ok.jar"])));
        config.add_dependency(Dependency::project(
            "core",
            core,
            FileList::new(["core.jar"]),
        ));

        let resolved = resolver.resolve(&config).unwrap();
        let err = resolved.files(&SatisfiesAll).unwrap_err();
        match &err {
            ResolveError::DependencyCycle { cycle } => {
                assert_eq!(cycle, "core:compile -> core:compile");
            }
            other => panic!("expected a dependency cycle, got {other:?}"),
        }
        assert!(resolved.self_resolved_files().is_err());
        assert_eq!(names(&resolved.backend().files(&SatisfiesAll).unwrap()), vec!["backend.jar"]);
    }

    #[test]
    fn boxed_backend_results_compose() {
        struct BoxedResolver;
        impl ArtifactDependencyResolver for BoxedResolver {
            type Resolved = Box<dyn ResolvedConfiguration>;
            fn resolve(&self, _: &Configuration) -> Result<Self::Resolved, ResolveError> {
                Ok(Box::new(StubResolved::with_files(&["boxed.jar"])))
            }
        }

        let resolver = SelfResolvingDependencyResolver::new(BoxedResolver);
        let config = Configuration::new("compile");
        config.add_dependency(Dependency::files(FileList::new(["local.jar"])));
        let resolved = resolver.resolve(&config).unwrap();
        assert_eq!(
            names(&resolved.files(&SatisfiesAll).unwrap()),
            vec!["local.jar", "boxed.jar"]
        );
    }
}

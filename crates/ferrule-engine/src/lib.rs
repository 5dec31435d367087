//! Configuration resolution for Ferrule.
//!
//! A [`Configuration`] declares dependencies; an [`ArtifactDependencyResolver`]
//! turns it into a [`ResolvedConfiguration`]. The
//! [`SelfResolvingDependencyResolver`] decorates any backend so that file and
//! project dependencies are resolved directly and merged ahead of the
//! backend's module files.

pub mod configuration;
pub mod context;
pub mod dependency;
pub mod error;
pub mod locked;
pub mod project;
pub mod resolved;
pub mod self_resolving;

pub use configuration::Configuration;
pub use context::DependencyResolveContext;
pub use dependency::{Dependency, FileDependency, ModuleDependency, ProjectDependency};
pub use error::ResolveError;
pub use locked::{LockfileResolvedConfiguration, LockfileResolver};
pub use project::load_configuration;
pub use resolved::{
    ArtifactDependencyResolver, ArtifactSpec, ModuleId, Predicate, ResolvedArtifact,
    ResolvedConfiguration, ResolvedDependency, SatisfiesAll, SatisfiesNone,
};
pub use self_resolving::{SelfResolvedConfiguration, SelfResolvingDependencyResolver};

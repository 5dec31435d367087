//! Accumulator for files contributed by self-resolving dependencies.

use std::path::PathBuf;
use std::sync::Arc;

use ferrule_util::FileCollection;
use indexmap::IndexSet;
use tracing::trace;

use crate::configuration::Configuration;
use crate::error::ResolveError;

/// Collects the file collections contributed while resolving one configuration.
///
/// A context is created per [`files`](crate::resolved::ResolvedConfiguration::files)
/// query and dropped afterwards. Contributions keep the order they were added in.
#[derive(Debug)]
pub struct DependencyResolveContext {
    transitive: bool,
    entries: Vec<ContextEntry>,
    project_stack: Vec<(Configuration, String)>,
}

/// One contributed collection and the transitivity it was added with.
#[derive(Debug, Clone)]
pub struct ContextEntry {
    files: Arc<dyn FileCollection>,
    transitive: bool,
}

impl ContextEntry {
    pub fn files(&self) -> &Arc<dyn FileCollection> {
        &self.files
    }

    pub fn transitive(&self) -> bool {
        self.transitive
    }
}

impl DependencyResolveContext {
    /// Create a context whose default transitivity is `transitive`, normally
    /// the owning configuration's flag.
    pub fn new(transitive: bool) -> Self {
        Self {
            transitive,
            entries: Vec::new(),
            project_stack: Vec::new(),
        }
    }

    pub fn is_transitive(&self) -> bool {
        self.transitive
    }

    /// Record a contribution with the context's default transitivity.
    pub fn add(&mut self, files: Arc<dyn FileCollection>) {
        let transitive = self.transitive;
        self.add_with_transitivity(files, transitive);
    }

    /// Record a contribution with an explicit transitivity.
    pub fn add_with_transitivity(&mut self, files: Arc<dyn FileCollection>, transitive: bool) {
        self.entries.push(ContextEntry { files, transitive });
    }

    pub fn entries(&self) -> &[ContextEntry] {
        &self.entries
    }

    /// Enumerate every recorded collection, in the order added, into one
    /// ordered set. The first occurrence of a file fixes its position.
    ///
    /// # Errors
    /// Returns the first enumeration failure; no partial set is returned.
    pub fn resolve(&self) -> Result<IndexSet<PathBuf>, ResolveError> {
        let mut resolved = IndexSet::new();
        for entry in &self.entries {
            for file in entry.files.files()? {
                if resolved.contains(&file) {
                    trace!(file = %file.display(), "skipping duplicate self-resolved file");
                } else {
                    resolved.insert(file);
                }
            }
        }
        Ok(resolved)
    }

    /// Mark `configuration` as being resolved on the current path.
    ///
    /// Configurations are compared by identity; `label` only names them in
    /// the cycle message.
    ///
    /// # Errors
    /// Returns `ResolveError::DependencyCycle` if `configuration` is already on the path.
    pub(crate) fn enter_project(
        &mut self,
        configuration: &Configuration,
        label: &str,
    ) -> Result<(), ResolveError> {
        if let Some(start) = self
            .project_stack
            .iter()
            .position(|(entered, _)| entered.same_as(configuration))
        {
            let mut cycle: Vec<&str> = self
                .project_stack
                .get(start..)
                .unwrap_or_default()
                .iter()
                .map(|(_, label)| label.as_str())
                .collect();
            cycle.push(label);
            return Err(ResolveError::DependencyCycle {
                cycle: cycle.join(" -> "),
            });
        }
        self.project_stack.push((configuration.clone(), label.to_owned()));
        Ok(())
    }

    pub(crate) fn leave_project(&mut self) {
        self.project_stack.pop();
    }
}

#![forbid(unsafe_code)]
//! File collections, filesystem helpers, and Maven coordinates for Ferrule.

pub mod error;
pub mod files;
pub mod fs;
pub mod maven;

pub use error::UtilError;
pub use files::{ExtensionFiles, FileCollection, FileList, FileUnion, GlobFiles};
pub use maven::MavenCoordinate;

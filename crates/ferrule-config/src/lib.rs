//! Parse and validate `ferrule.toml` and `ferrule.lock`.

pub mod lockfile;
pub mod manifest;

pub use lockfile::Lockfile;
pub use manifest::Manifest;

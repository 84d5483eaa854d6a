/*!
# Background

The template catalog holds every stored application template, keyed by
name.  The catalog is deliberately simple: one JSON document mapping
template names to [`libtemplate::ApplicationTemplate`] values, read and
written whole.

# Library

This library provides a trait defining the exact requirements, along with a
flat-file implementation used by the CLI and a memory implementation for
use in testing consumers.

# Current Limitations

* The file store reads and rewrites the entire catalog on every operation;
  catalogs are operator-authored and small, so that's acceptable.
* The caller needs to handle locking if several processes share a catalog
  file.
*/

pub mod file;
pub mod memory;

pub use error::{Error, Result};
pub use file::FileCatalog;
pub use memory::MemoryCatalog;

use libtemplate::object::Service;
use libtemplate::{ApplicationTemplate, DeploymentConfig};
use std::collections::BTreeMap;

/// The catalog file the CLI uses unless told otherwise.
pub const DEFAULT_CATALOG_FILE: &str = ".templates.json";

pub trait Catalog {
    /// Returns every stored template, keyed by name.
    fn list(&self) -> Result<BTreeMap<String, ApplicationTemplate>>;

    /// Retrieves one template, or None if the name isn't stored.
    fn get(&self, name: &str) -> Result<Option<ApplicationTemplate>>;

    /// Stores a template under the given name, replacing any previous one.
    fn save<S: Into<String>>(&mut self, name: S, template: ApplicationTemplate) -> Result<()>;

    /// Stores a deployment config inside the named template.  Errors if the
    /// template doesn't exist.
    fn save_deployment(
        &mut self,
        template_name: &str,
        deployment_name: &str,
        config: DeploymentConfig,
    ) -> Result<()>;

    /// Stores a service inside the named template.  Errors if the template
    /// doesn't exist.
    fn save_service(
        &mut self,
        template_name: &str,
        service_name: &str,
        service: Service,
    ) -> Result<()>;

    /// Removes a template.  Returns whether the name was stored.
    fn delete(&mut self, name: &str) -> Result<bool>;
}

mod error {
    use snafu::Snafu;
    use std::path::PathBuf;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub))]
    pub enum Error {
        #[snafu(display(
            "Failed to read catalog file '{}': {}",
            path.to_string_lossy(), source
        ))]
        ReadCatalog {
            source: std::io::Error,
            path: PathBuf,
        },

        #[snafu(display(
            "Failed to parse catalog file '{}': {}",
            path.to_string_lossy(), source
        ))]
        ParseCatalog {
            source: serde_json::Error,
            path: PathBuf,
        },

        #[snafu(display("Failed to serialize catalog contents: {}", source))]
        SerializeCatalog { source: serde_json::Error },

        #[snafu(display(
            "Failed to write catalog file '{}': {}",
            path.to_string_lossy(), source
        ))]
        WriteCatalog {
            source: std::io::Error,
            path: PathBuf,
        },

        #[snafu(display("No template named '{}' in the catalog", name))]
        UnknownTemplate { name: String },
    }

    pub type Result<T> = std::result::Result<T, Error>;
}

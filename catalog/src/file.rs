//! This implementation of the Catalog trait keeps the whole catalog in one
//! JSON file, read and rewritten per operation.

use crate::{error, Catalog, Result};
use libtemplate::object::Service;
use libtemplate::{ApplicationTemplate, DeploymentConfig};
use log::debug;
use snafu::{OptionExt, ResultExt};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new<P: AsRef<Path>>(path: P) -> FileCatalog {
        FileCatalog {
            path: path.as_ref().to_owned(),
        }
    }

    /// Reads the whole catalog.  A file that doesn't exist yet reads as an
    /// empty catalog, so the first `save` works without any setup step.
    fn load(&self) -> Result<BTreeMap<String, ApplicationTemplate>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(
                    "catalog file '{}' not found, treating as empty",
                    self.path.to_string_lossy()
                );
                return Ok(BTreeMap::new());
            }
            Err(e) => {
                return Err(e).context(error::ReadCatalogSnafu {
                    path: self.path.clone(),
                })
            }
        };

        let templates: BTreeMap<String, ApplicationTemplate> = serde_json::from_str(&contents)
            .context(error::ParseCatalogSnafu {
                path: self.path.clone(),
            })?;
        debug!(
            "loaded {} template(s) from '{}'",
            templates.len(),
            self.path.to_string_lossy()
        );
        Ok(templates)
    }

    fn store(&self, templates: &BTreeMap<String, ApplicationTemplate>) -> Result<()> {
        let contents =
            serde_json::to_string_pretty(templates).context(error::SerializeCatalogSnafu)?;
        fs::write(&self.path, contents).context(error::WriteCatalogSnafu {
            path: self.path.clone(),
        })
    }
}

impl Catalog for FileCatalog {
    fn list(&self) -> Result<BTreeMap<String, ApplicationTemplate>> {
        self.load()
    }

    fn get(&self, name: &str) -> Result<Option<ApplicationTemplate>> {
        Ok(self.load()?.remove(name))
    }

    fn save<S: Into<String>>(&mut self, name: S, template: ApplicationTemplate) -> Result<()> {
        let mut templates = self.load()?;
        templates.insert(name.into(), template);
        self.store(&templates)
    }

    fn save_deployment(
        &mut self,
        template_name: &str,
        deployment_name: &str,
        config: DeploymentConfig,
    ) -> Result<()> {
        let mut templates = self.load()?;
        let template = templates
            .get_mut(template_name)
            .context(error::UnknownTemplateSnafu {
                name: template_name,
            })?;
        template
            .deployment_configs
            .insert(deployment_name.to_owned(), config);
        self.store(&templates)
    }

    fn save_service(
        &mut self,
        template_name: &str,
        service_name: &str,
        service: Service,
    ) -> Result<()> {
        let mut templates = self.load()?;
        let template = templates
            .get_mut(template_name)
            .context(error::UnknownTemplateSnafu {
                name: template_name,
            })?;
        template.services.insert(service_name.to_owned(), service);
        self.store(&templates)
    }

    fn delete(&mut self, name: &str) -> Result<bool> {
        let mut templates = self.load()?;
        let removed = templates.remove(name).is_some();
        if removed {
            self.store(&templates)?;
        }
        Ok(removed)
    }
}

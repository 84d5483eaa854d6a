//! In-memory catalog for use in testing other modules.
//!
//! Mimics the behavior of FileCatalog, e.g. unknown template names erroring
//! on member writes.

use crate::{error, Catalog, Result};
use libtemplate::object::Service;
use libtemplate::{ApplicationTemplate, DeploymentConfig};
use snafu::OptionExt;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct MemoryCatalog {
    templates: BTreeMap<String, ApplicationTemplate>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Catalog for MemoryCatalog {
    fn list(&self) -> Result<BTreeMap<String, ApplicationTemplate>> {
        Ok(self.templates.clone())
    }

    fn get(&self, name: &str) -> Result<Option<ApplicationTemplate>> {
        Ok(self.templates.get(name).cloned())
    }

    fn save<S: Into<String>>(&mut self, name: S, template: ApplicationTemplate) -> Result<()> {
        self.templates.insert(name.into(), template);
        Ok(())
    }

    fn save_deployment(
        &mut self,
        template_name: &str,
        deployment_name: &str,
        config: DeploymentConfig,
    ) -> Result<()> {
        let template =
            self.templates
                .get_mut(template_name)
                .context(error::UnknownTemplateSnafu {
                    name: template_name,
                })?;
        template
            .deployment_configs
            .insert(deployment_name.to_owned(), config);
        Ok(())
    }

    fn save_service(
        &mut self,
        template_name: &str,
        service_name: &str,
        service: Service,
    ) -> Result<()> {
        let template =
            self.templates
                .get_mut(template_name)
                .context(error::UnknownTemplateSnafu {
                    name: template_name,
                })?;
        template.services.insert(service_name.to_owned(), service);
        Ok(())
    }

    fn delete(&mut self, name: &str) -> Result<bool> {
        Ok(self.templates.remove(name).is_some())
    }
}

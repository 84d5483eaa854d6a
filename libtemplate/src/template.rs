//! The application template stored in the catalog, and the generated
//! template it is assembled into.

use crate::deployment::DeploymentConfig;
use crate::expand::{expand, ExpansionSettings};
use crate::object::{ObjectMeta, Parameter, PersistentVolumeClaim, Service};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A stored application description: deployment configs and services keyed
/// by name, plus any claims and parameters attached to the application.
///
/// The maps are ordered by name so assembly and serialization are
/// deterministic across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationTemplate {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,

    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub services: BTreeMap<String, Service>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub deployment_configs: BTreeMap<String, DeploymentConfig>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub persistent_volumes: BTreeMap<String, PersistentVolumeClaim>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
}

impl ApplicationTemplate {
    /// A fresh, empty application template with the given name.
    pub fn new<S: Into<String>>(name: S) -> Self {
        let name = name.into();
        let mut metadata = ObjectMeta::named(name.clone());
        metadata.annotations.insert(
            "description".to_string(),
            format!("a generated template for {}", name),
        );
        ApplicationTemplate {
            api_version: "v1".to_string(),
            kind: "Template".to_string(),
            metadata,
            ..Default::default()
        }
    }
}

/// The generated output object: expansion results plus the untouched
/// services, under the application template's own metadata.
///
/// Serialize-only; generated templates are printed once and never read
/// back by this tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_version: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub kind: String,

    pub metadata: ObjectMeta,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<TemplateObject>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub object_labels: BTreeMap<String, String>,
}

/// One concrete object in a generated template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TemplateObject {
    DeploymentConfig(Box<DeploymentConfig>),
    Service(Box<Service>),
}

impl Template {
    /// Assembles a generated template: every deployment config is expanded
    /// under the given settings and emitted in name order, followed by the
    /// services in name order.  Parameters are carried through unmodified.
    pub fn assemble(template: &ApplicationTemplate, settings: &ExpansionSettings) -> Self {
        let mut objects = Vec::new();
        for config in template.deployment_configs.values() {
            objects.extend(
                expand(config, settings)
                    .into_iter()
                    .map(|concrete| TemplateObject::DeploymentConfig(Box::new(concrete))),
            );
        }
        objects.extend(
            template
                .services
                .values()
                .cloned()
                .map(|service| TemplateObject::Service(Box::new(service))),
        );

        Template {
            api_version: template.api_version.clone(),
            kind: template.kind.clone(),
            metadata: template.metadata.clone(),
            objects,
            parameters: template.parameters.clone(),
            object_labels: BTreeMap::new(),
        }
    }
}

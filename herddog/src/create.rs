//! The create commands: a bare template, or a wizard-driven deployment
//! config with an optional exposed service.
//!
//! The wizard asks for everything expansion consumes — containers,
//! claim-backed volumes, node selector, replica and deployment strategies —
//! so a template authored here generates without further editing.

use crate::error::{self, Result};
use crate::wizard::Wizard;
use catalog::Catalog;
use libtemplate::deployment::UpgradeStrategy;
use libtemplate::object::{
    Container, ContainerPort, EnvVar, PersistentVolumeClaimSource, Service, ServicePort, Volume,
    VolumeMount,
};
use libtemplate::{ApplicationTemplate, DeploymentConfig};
use log::info;
use snafu::ResultExt;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};

pub(crate) fn create_template<C: Catalog>(catalog: &mut C, name: &str) -> Result<()> {
    catalog
        .save(name, ApplicationTemplate::new(name))
        .context(error::CatalogSnafu)?;
    info!("stored template '{}'", name);
    Ok(())
}

pub(crate) fn create_deployment<C, R, W>(
    catalog: &mut C,
    wizard: &mut Wizard<R, W>,
    name: &str,
    template_name: &str,
) -> Result<()>
where
    C: Catalog,
    R: BufRead,
    W: Write,
{
    let config = build_deployment(wizard, name)?;
    let service = build_service(wizard, name)?;

    catalog
        .save_deployment(template_name, name, config)
        .context(error::CatalogSnafu)?;
    info!("stored deployment '{}' in template '{}'", name, template_name);

    if let Some(service) = service {
        let service_name = service.metadata.name.clone();
        catalog
            .save_service(template_name, &service_name, service)
            .context(error::CatalogSnafu)?;
        info!("stored service '{}' in template '{}'", service_name, template_name);
    }
    Ok(())
}

fn build_deployment<R: BufRead, W: Write>(
    wizard: &mut Wizard<R, W>,
    name: &str,
) -> Result<DeploymentConfig> {
    let mut config = DeploymentConfig::new(name);

    if wizard.confirm("Do you want to add a container? (y/n):")? {
        loop {
            let container = build_container(wizard)?;
            config.spec.template.spec.containers.push(container);
            if !wizard.confirm("Add another container? (y/n):")? {
                break;
            }
        }
    }

    while wizard.confirm("Add a persistent volume? (y/n):")? {
        let volume_name = wizard.ask("Volume name:")?;
        let claim_name = wizard.ask("Claim name (use %d for a per-volume index):")?;
        config.spec.template.spec.volumes.push(Volume {
            name: volume_name,
            persistent_volume_claim: Some(PersistentVolumeClaimSource { claim_name }),
        });
    }

    config.spec.template.spec.node_selector =
        parse_label_pairs(&wizard.ask_list("Node selector labels (zone=east,disk=ssd):")?);

    let replicas = wizard.ask("How many replicas should run (default 1):")?;
    if !replicas.is_empty() {
        config.spec.replicas = parse_number(&replicas)?;
    }

    config.spec.replica_strategy = wizard
        .ask("How should replicas be counted? (single/equal-to-nodes):")?
        .as_str()
        .into();
    config.spec.deployment_strategy = wizard
        .ask("How should configs be generated? (single-config/per-node-config):")?
        .as_str()
        .into();

    let upgrade = wizard.ask("What kind of upgrade strategy do you want to use? (rolling/recreate):")?;
    config.spec.strategy = match upgrade.to_lowercase().as_str() {
        "rolling" => Some(UpgradeStrategy::rolling()),
        "recreate" => Some(UpgradeStrategy::recreate()),
        _ => None,
    };

    Ok(config)
}

fn build_container<R: BufRead, W: Write>(wizard: &mut Wizard<R, W>) -> Result<Container> {
    let mut container = Container {
        name: wizard.ask("What is the container name:")?,
        image: wizard.ask("What image do you want to use:")?,
        ..Default::default()
    };

    for port in wizard.ask_list("What ports do you want to expose (8080,8443):")? {
        container.ports.push(ContainerPort {
            container_port: parse_number(&port)?,
            protocol: "TCP".to_string(),
        });
    }

    if wizard.confirm("Do you need to set resource limits? (y/n):")? {
        let max_cpu = wizard.ask("What's the max cpu shares:")?;
        if !max_cpu.is_empty() {
            container
                .resources
                .limits
                .insert("cpu".to_string(), max_cpu);
        }
        let min_cpu = wizard.ask("What's the min cpu shares:")?;
        if !min_cpu.is_empty() {
            container
                .resources
                .requests
                .insert("cpu".to_string(), min_cpu);
        }
        let max_memory = wizard.ask("What is the max memory:")?;
        if !max_memory.is_empty() {
            container
                .resources
                .limits
                .insert("memory".to_string(), max_memory);
        }
    }

    for pair in wizard.ask_list("Any env vars? (NAME=value,OTHER=value):")? {
        if let Some((name, value)) = pair.split_once('=') {
            container.env.push(EnvVar {
                name: name.trim().to_string(),
                value: value.trim().to_string(),
            });
        }
    }

    while wizard.confirm("Mount a volume into this container? (y/n):")? {
        container.volume_mounts.push(VolumeMount {
            name: wizard.ask("Volume name:")?,
            mount_path: wizard.ask("Mount path:")?,
        });
    }

    Ok(container)
}

fn build_service<R: BufRead, W: Write>(
    wizard: &mut Wizard<R, W>,
    selects: &str,
) -> Result<Option<Service>> {
    if !wizard.confirm("Do you want to expose a service for this deployment? (y/n):")? {
        return Ok(None);
    }

    let mut service = Service::new(selects);
    service.metadata.name = wizard.ask("Name the service:")?;

    for (index, port) in wizard
        .ask_list("Which ports do you want to expose (8080,3000):")?
        .iter()
        .enumerate()
    {
        let target = wizard.ask(&format!("What is the target port for {}:", port))?;
        service.spec.ports.push(ServicePort {
            name: format!("{}-port-{}", service.metadata.name, index),
            protocol: "TCP".to_string(),
            port: parse_number(port)?,
            target_port: if target.is_empty() {
                None
            } else {
                Some(parse_number(&target)?)
            },
        });
    }

    Ok(Some(service))
}

/// Parses `key=value` entries; entries without `=` are dropped.
fn parse_label_pairs(pairs: &[String]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect()
}

fn parse_number<N>(given: &str) -> Result<N>
where
    N: std::str::FromStr<Err = std::num::ParseIntError>,
{
    given
        .trim()
        .parse()
        .context(error::ParseNumberSnafu { given })
}

#[cfg(test)]
mod test {
    use super::*;
    use catalog::MemoryCatalog;
    use libtemplate::{DeploymentStrategy, ReplicaStrategy};
    use maplit::btreemap;
    use std::io::Cursor;

    fn wizard(script: &[&str]) -> Wizard<Cursor<String>, Vec<u8>> {
        let mut input = script.join("\n");
        input.push('\n');
        Wizard::new(Cursor::new(input), Vec::new())
    }

    #[test]
    fn builds_a_full_deployment() {
        let mut wizard = wizard(&[
            "y",                // add a container
            "store",            // container name
            "registry.example.com/store:2.1", // image
            "8080,8443",        // ports
            "y",                // resource limits
            "500m",             // max cpu
            "250m",             // min cpu
            "1Gi",              // max memory
            "MODE=fast",        // env vars
            "y",                // mount a volume
            "data",             // mount name
            "/var/lib/store",   // mount path
            "n",                // no more mounts
            "n",                // no more containers
            "y",                // add a volume
            "data",             // volume name
            "store-claim-%d",   // claim name
            "n",                // no more volumes
            "disk=ssd",         // node selector
            "2",                // replicas
            "equal-to-nodes",   // replica strategy
            "per-node-config",  // deployment strategy
            "rolling",          // upgrade strategy
        ]);

        let config = build_deployment(&mut wizard, "store-%d").unwrap();
        assert_eq!(config.metadata.name, "store-%d");
        assert_eq!(config.spec.replicas, 2);
        assert_eq!(config.spec.replica_strategy, ReplicaStrategy::EqualToNodes);
        assert_eq!(
            config.spec.deployment_strategy,
            DeploymentStrategy::PerNodeConfig
        );
        assert_eq!(
            config.spec.strategy.as_ref().unwrap().strategy_type,
            "Rolling"
        );

        let container = &config.spec.template.spec.containers[0];
        assert_eq!(container.name, "store");
        assert_eq!(container.ports.len(), 2);
        assert_eq!(container.ports[0].container_port, 8080);
        assert_eq!(container.resources.limits["cpu"], "500m");
        assert_eq!(container.resources.requests["cpu"], "250m");
        assert_eq!(container.env[0].name, "MODE");
        assert_eq!(container.volume_mounts[0].mount_path, "/var/lib/store");

        let volume = &config.spec.template.spec.volumes[0];
        assert_eq!(
            volume.persistent_volume_claim.as_ref().unwrap().claim_name,
            "store-claim-%d"
        );
        assert_eq!(
            config.spec.template.spec.node_selector,
            btreemap! { "disk".to_string() => "ssd".to_string() }
        );
    }

    #[test]
    fn minimal_answers_build_a_minimal_deployment() {
        let mut wizard = wizard(&[
            "n", // no containers
            "n", // no volumes
            "",  // no node selector
            "",  // default replicas
            "",  // default replica strategy
            "",  // default deployment strategy
            "",  // no upgrade strategy
        ]);

        let config = build_deployment(&mut wizard, "web").unwrap();
        assert!(config.spec.template.spec.containers.is_empty());
        assert!(config.spec.template.spec.volumes.is_empty());
        assert_eq!(config.spec.replicas, 1);
        assert_eq!(config.spec.replica_strategy, ReplicaStrategy::Single);
        assert_eq!(
            config.spec.deployment_strategy,
            DeploymentStrategy::Unspecified
        );
        assert!(config.spec.strategy.is_none());
    }

    #[test]
    fn bad_port_is_an_error() {
        let mut wizard = wizard(&["y", "web", "nginx", "eighty", "n", "", "n", "n"]);
        let result = build_deployment(&mut wizard, "web");
        assert!(matches!(
            result.unwrap_err(),
            crate::error::Error::ParseNumber { .. }
        ));
    }

    #[test]
    fn declining_the_service_returns_none() {
        let mut wizard = wizard(&["n"]);
        assert!(build_service(&mut wizard, "web").unwrap().is_none());
    }

    #[test]
    fn builds_an_exposed_service() {
        let mut wizard = wizard(&[
            "y",        // expose a service
            "web-svc",  // service name
            "8080,3000", // ports
            "8081",     // target for 8080
            "",         // no target for 3000
        ]);

        let service = build_service(&mut wizard, "web").unwrap().unwrap();
        assert_eq!(service.metadata.name, "web-svc");
        assert_eq!(service.spec.selector["name"], "web");
        assert_eq!(service.spec.ports.len(), 2);
        assert_eq!(service.spec.ports[0].name, "web-svc-port-0");
        assert_eq!(service.spec.ports[0].port, 8080);
        assert_eq!(service.spec.ports[0].target_port, Some(8081));
        assert_eq!(service.spec.ports[1].target_port, None);
    }

    #[test]
    fn create_deployment_stores_config_and_service() {
        let mut catalog = MemoryCatalog::new();
        create_template(&mut catalog, "shop").unwrap();

        let mut wizard = wizard(&[
            "n", "n", "", "", "", "", "", // minimal deployment
            "y", "web-svc", "8080", "", // exposed service
        ]);
        create_deployment(&mut catalog, &mut wizard, "web", "shop").unwrap();

        let template = catalog.get("shop").unwrap().unwrap();
        assert!(template.deployment_configs.contains_key("web"));
        assert!(template.services.contains_key("web-svc"));
    }

    #[test]
    fn create_deployment_requires_the_template() {
        let mut catalog = MemoryCatalog::new();
        let mut wizard = wizard(&["n", "n", "", "", "", "", "", "n"]);
        let result = create_deployment(&mut catalog, &mut wizard, "web", "missing");
        assert!(matches!(
            result.unwrap_err(),
            crate::error::Error::Catalog { .. }
        ));
    }
}

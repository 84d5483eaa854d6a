//! The expansion engine: turns one stored deployment config into the
//! concrete configs for a specific cluster size.
//!
//! Expansion is a pure function over its inputs.  The caller's config is
//! cloned before anything is touched, and each emitted config owns its own
//! collections outright, so mutating one result never shows up in another.
//! There is no shared state between invocations; callers may expand many
//! configs concurrently.

use crate::deployment::{DeploymentConfig, DeploymentStrategy, ReplicaStrategy};
use crate::placeholder;
use log::{debug, trace};

/// The per-run expansion parameters: how many nodes to target and which
/// optional manifest fields survive into the output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpansionSettings {
    /// Number of cluster nodes the generated objects target.
    pub node_count: u32,

    /// When false, volumes and volume mounts are pruned from the output.
    pub storage_enabled: bool,

    /// When false, node selectors are pruned from the output.
    pub node_selector_enabled: bool,
}

/// Expands one deployment config into zero or more concrete configs.
///
/// The config's deployment strategy picks the fan-out: `PerNodeConfig`
/// emits one config per node in increasing node order (none at all for a
/// zero node count), `SingleConfig` emits exactly one, and `Unspecified`
/// passes the config through untouched apart from pruning.  The replica
/// strategy is applied to everything emitted by the first two.
///
/// Expansion never fails.  A name template with no `%d` placeholder means
/// every per-node config gets the same name; that is the operator's
/// authoring choice and is emitted as-is.
pub fn expand(config: &DeploymentConfig, settings: &ExpansionSettings) -> Vec<DeploymentConfig> {
    let mut working = config.clone();
    prune(&mut working, settings);

    debug!(
        "expanding '{}' ({}) for {} node(s)",
        working.metadata.name,
        working.spec.deployment_strategy.as_str(),
        settings.node_count
    );

    match working.spec.deployment_strategy {
        DeploymentStrategy::PerNodeConfig => {
            let mut configs = Vec::with_capacity(settings.node_count as usize);
            for node in 0..settings.node_count {
                let mut concrete = working.clone();
                concrete.metadata.name =
                    placeholder::substitute(&working.metadata.name, node as usize);
                if settings.storage_enabled {
                    substitute_claim_names(&mut concrete);
                }
                if working.spec.replica_strategy == ReplicaStrategy::EqualToNodes {
                    concrete.spec.replicas = settings.node_count;
                }
                trace!("node {}: emitting '{}'", node, concrete.metadata.name);
                resolve(&mut concrete);
                configs.push(concrete);
            }
            configs
        }
        DeploymentStrategy::SingleConfig => {
            if working.spec.replica_strategy == ReplicaStrategy::EqualToNodes {
                working.spec.replicas = settings.node_count;
            }
            resolve(&mut working);
            vec![working]
        }
        DeploymentStrategy::Unspecified => {
            resolve(&mut working);
            vec![working]
        }
    }
}

/// Strips the fields that the current settings disable.
fn prune(config: &mut DeploymentConfig, settings: &ExpansionSettings) {
    let pod = &mut config.spec.template.spec;
    if !settings.storage_enabled {
        pod.volumes.clear();
        for container in &mut pod.containers {
            container.volume_mounts.clear();
        }
    }
    if !settings.node_selector_enabled {
        pod.node_selector.clear();
    }
}

/// Substitutes each claim-backed volume's index into its claim-name
/// template.  The index is the volume's position in the list, so a config
/// with several claims gets distinct claim names per volume.
fn substitute_claim_names(config: &mut DeploymentConfig) {
    for (index, volume) in config.spec.template.spec.volumes.iter_mut().enumerate() {
        if let Some(claim) = volume.persistent_volume_claim.as_mut() {
            claim.claim_name = placeholder::substitute(&claim.claim_name, index);
        }
    }
}

/// Marks a concrete config as fully expanded by resetting the strategy
/// fields to their defaults.  Defaults are skipped on serialize, so the
/// markers never reach generated manifests.
fn resolve(config: &mut DeploymentConfig) {
    config.spec.replica_strategy = ReplicaStrategy::Single;
    config.spec.deployment_strategy = DeploymentStrategy::Unspecified;
}

//! The deployment config: the unit the expansion engine operates on.
//!
//! Besides the manifest-shaped payload, each config carries two expansion
//! knobs — a [`ReplicaStrategy`] and a [`DeploymentStrategy`].  Both are
//! closed enums: stored strings that match no known variant fall back to
//! the variant's default at the parse boundary rather than failing, so
//! catalogs written by newer versions of the tool still load.  The knobs
//! serialize only when set to a non-default value, which also keeps them
//! out of generated manifests (expansion resets them before emitting).

use crate::object::{ObjectMeta, PodTemplateSpec};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// How the replica count of a config is set at expansion time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReplicaStrategy {
    /// Pin the replica count to the number of target nodes.
    EqualToNodes,
    /// Leave the replica count exactly as authored.
    #[default]
    Single,
}

impl ReplicaStrategy {
    const EQUAL_TO_NODES: &'static str = "equal-to-nodes";
    const SINGLE: &'static str = "single";

    pub fn as_str(&self) -> &'static str {
        match self {
            ReplicaStrategy::EqualToNodes => Self::EQUAL_TO_NODES,
            ReplicaStrategy::Single => Self::SINGLE,
        }
    }

    pub fn is_single(&self) -> bool {
        *self == ReplicaStrategy::Single
    }
}

impl From<&str> for ReplicaStrategy {
    /// Unrecognized values degrade to `Single`, which leaves the authored
    /// replica count alone.
    fn from(value: &str) -> Self {
        match value {
            Self::EQUAL_TO_NODES => ReplicaStrategy::EqualToNodes,
            _ => ReplicaStrategy::Single,
        }
    }
}

impl Serialize for ReplicaStrategy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ReplicaStrategy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(value.as_str().into())
    }
}

/// How many concrete configs a single stored config expands into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeploymentStrategy {
    /// One concrete config regardless of the number of target nodes.
    SingleConfig,
    /// One concrete config per target node.
    PerNodeConfig,
    /// No strategy chosen; expansion passes the config through unchanged.
    #[default]
    Unspecified,
}

impl DeploymentStrategy {
    const SINGLE_CONFIG: &'static str = "single-config";
    const PER_NODE_CONFIG: &'static str = "per-node-config";
    const UNSPECIFIED: &'static str = "unspecified";

    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentStrategy::SingleConfig => Self::SINGLE_CONFIG,
            DeploymentStrategy::PerNodeConfig => Self::PER_NODE_CONFIG,
            DeploymentStrategy::Unspecified => Self::UNSPECIFIED,
        }
    }

    pub fn is_unspecified(&self) -> bool {
        *self == DeploymentStrategy::Unspecified
    }
}

impl From<&str> for DeploymentStrategy {
    /// Unrecognized values degrade to `Unspecified`, the pass-through
    /// fallback, so a config authored with a strategy this version doesn't
    /// know still expands.
    fn from(value: &str) -> Self {
        match value {
            Self::SINGLE_CONFIG => DeploymentStrategy::SingleConfig,
            Self::PER_NODE_CONFIG => DeploymentStrategy::PerNodeConfig,
            _ => DeploymentStrategy::Unspecified,
        }
    }
}

impl Serialize for DeploymentStrategy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DeploymentStrategy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(value.as_str().into())
    }
}

/// One deployable unit: a pod template plus replication settings.
///
/// `Clone` copies the config to full depth, nested collections included.
/// Expansion relies on that: every concrete config it emits owns its own
/// volumes, containers, and label maps outright.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfig {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,

    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: DeploymentConfigSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfigSpec {
    /// How a rollout of this config is executed on the cluster.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<UpgradeStrategy>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<TriggerPolicy>,

    #[serde(default)]
    pub replicas: u32,

    /// Label query over the pods that count toward `replicas`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub selector: BTreeMap<String, String>,

    #[serde(default)]
    pub template: PodTemplateSpec,

    #[serde(default, skip_serializing_if = "ReplicaStrategy::is_single")]
    pub replica_strategy: ReplicaStrategy,

    #[serde(default, skip_serializing_if = "DeploymentStrategy::is_unspecified")]
    pub deployment_strategy: DeploymentStrategy,
}

/// How a rollout replaces the running pods of an earlier version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeStrategy {
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub strategy_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolling_params: Option<RollingParams>,
}

impl UpgradeStrategy {
    /// A rolling upgrade with the stock pacing parameters.
    pub fn rolling() -> Self {
        UpgradeStrategy {
            strategy_type: "Rolling".to_string(),
            rolling_params: Some(RollingParams {
                update_period_seconds: Some(1),
                interval_seconds: Some(1),
                timeout_seconds: Some(300),
            }),
        }
    }

    pub fn recreate() -> Self {
        UpgradeStrategy {
            strategy_type: "Recreate".to_string(),
            rolling_params: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollingParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_period_seconds: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_seconds: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<i64>,
}

/// A policy describing what kicks off a new rollout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerPolicy {
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub trigger_type: String,
}

impl DeploymentConfig {
    /// A fresh deployment config with the given name: one replica, a
    /// config-change trigger, and the pod template labeled and selected by
    /// name.
    pub fn new<S: Into<String>>(name: S) -> Self {
        let name = name.into();
        let mut labels = BTreeMap::new();
        labels.insert("name".to_string(), name.clone());

        let mut config = DeploymentConfig {
            api_version: "v1".to_string(),
            kind: "DeploymentConfig".to_string(),
            metadata: ObjectMeta::named(name.clone()),
            spec: DeploymentConfigSpec {
                replicas: 1,
                triggers: vec![TriggerPolicy {
                    trigger_type: "ConfigChange".to_string(),
                }],
                selector: labels.clone(),
                ..Default::default()
            },
        };
        config.metadata.labels = labels.clone();
        config.spec.template.metadata = ObjectMeta::named(name);
        config.spec.template.metadata.labels = labels;
        config.spec.template.spec.restart_policy = "Always".to_string();
        config.spec.template.spec.dns_policy = "ClusterFirst".to_string();
        config
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn new_config_defaults() {
        let config = DeploymentConfig::new("web");
        assert_eq!(config.kind, "DeploymentConfig");
        assert_eq!(config.metadata.name, "web");
        assert_eq!(config.spec.replicas, 1);
        assert_eq!(config.spec.selector.get("name").unwrap(), "web");
        assert_eq!(config.spec.template.metadata.labels.get("name").unwrap(), "web");
        assert_eq!(config.spec.template.spec.restart_policy, "Always");
        assert_eq!(config.spec.template.spec.dns_policy, "ClusterFirst");
        assert_eq!(config.spec.triggers[0].trigger_type, "ConfigChange");
        assert_eq!(config.spec.replica_strategy, ReplicaStrategy::Single);
        assert_eq!(
            config.spec.deployment_strategy,
            DeploymentStrategy::Unspecified
        );
    }

    #[test]
    fn replica_strategy_parses_known_values() {
        assert_eq!(
            ReplicaStrategy::from("equal-to-nodes"),
            ReplicaStrategy::EqualToNodes
        );
        assert_eq!(ReplicaStrategy::from("single"), ReplicaStrategy::Single);
    }

    #[test]
    fn replica_strategy_degrades_to_single() {
        assert_eq!(
            ReplicaStrategy::from("#EqualToNode"),
            ReplicaStrategy::Single
        );
        assert_eq!(ReplicaStrategy::from(""), ReplicaStrategy::Single);
    }

    #[test]
    fn deployment_strategy_parses_known_values() {
        assert_eq!(
            DeploymentStrategy::from("per-node-config"),
            DeploymentStrategy::PerNodeConfig
        );
        assert_eq!(
            DeploymentStrategy::from("single-config"),
            DeploymentStrategy::SingleConfig
        );
    }

    #[test]
    fn deployment_strategy_degrades_to_unspecified() {
        assert_eq!(
            DeploymentStrategy::from("per-node"),
            DeploymentStrategy::Unspecified
        );
        assert_eq!(DeploymentStrategy::from(""), DeploymentStrategy::Unspecified);
    }

    #[test]
    fn strategies_roundtrip_through_json() {
        let mut config = DeploymentConfig::new("db");
        config.spec.replica_strategy = ReplicaStrategy::EqualToNodes;
        config.spec.deployment_strategy = DeploymentStrategy::PerNodeConfig;

        let rendered = serde_json::to_string(&config).unwrap();
        assert!(rendered.contains("\"replicaStrategy\":\"equal-to-nodes\""));
        assert!(rendered.contains("\"deploymentStrategy\":\"per-node-config\""));

        let parsed: DeploymentConfig = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn default_strategies_are_not_serialized() {
        let config = DeploymentConfig::new("db");
        let rendered = serde_json::to_string(&config).unwrap();
        assert!(!rendered.contains("replicaStrategy"));
        assert!(!rendered.contains("deploymentStrategy"));
    }

    #[test]
    fn unknown_stored_strategy_loads_as_unspecified() {
        let stored = r#"{"spec": {"deploymentStrategy": "some-future-strategy"}}"#;
        let parsed: DeploymentConfig = serde_json::from_str(stored).unwrap();
        assert_eq!(
            parsed.spec.deployment_strategy,
            DeploymentStrategy::Unspecified
        );
    }
}

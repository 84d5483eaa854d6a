/*!
# Background

An application template describes an application once: a named set of
deployment configs plus the services that expose them.  Templates are
authored ahead of time and stored in a catalog; at generation time they are
expanded into concrete, ready-to-serialize manifest objects for a specific
cluster size.

# Library

This library provides the template data model and the expansion engine.

The model mirrors the manifest wire shapes (`apiVersion`/`kind`/`metadata`
and a pod template under `spec`), with two extra per-config knobs that never
appear in generated output:

* a replica strategy, deciding whether the replica count is pinned to the
  number of target nodes, and
* a deployment strategy, deciding whether one config is emitted per target
  node or a single config covers them all.

Expansion itself is a pure function over one deployment config and one set
of [`expand::ExpansionSettings`]; assembling a whole template is mechanical
concatenation on top of it, see [`template::Template::assemble`].

# Current Limitations

* Template parameters are carried through untouched; `${NAME}`-style
  substitution is left to the consuming cluster.
* Generated output is serialize-only; the library never re-reads what it
  emitted.
*/

pub mod deployment;
pub mod expand;
pub mod object;
pub mod placeholder;
pub mod template;

pub use deployment::{DeploymentConfig, DeploymentStrategy, ReplicaStrategy};
pub use expand::{expand, ExpansionSettings};
pub use template::{ApplicationTemplate, Template, TemplateObject};

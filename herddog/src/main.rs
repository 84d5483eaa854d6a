/*!
herddog manages a catalog of application templates and generates concrete
cluster manifests from them.

An application is described once, through the create wizard, as a set of
deployment configs and services stored in a flat-file catalog.  `generate`
then expands that description for a specific cluster: a target node count
plus toggles deciding whether persistent storage and node selectors survive
into the output.  Generated manifests are printed to stdout as JSON.
 */
use argh::FromArgs;
use catalog::{Catalog, FileCatalog, DEFAULT_CATALOG_FILE};
use libtemplate::{ExpansionSettings, Template};
use log::LevelFilter;
use simplelog::{ColorChoice, Config as LogConfig, TermLogger, TerminalMode};
use snafu::{ensure, OptionExt, ResultExt};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

mod create;
mod wizard;

use crate::error::Result;
use crate::wizard::Wizard;

#[derive(FromArgs)]
#[argh(description = "application template catalog and manifest generator")]
struct Args {
    #[argh(option, default = "PathBuf::from(DEFAULT_CATALOG_FILE)")]
    #[argh(description = "path to the template catalog file")]
    catalog: PathBuf,

    #[argh(option, default = "LevelFilter::Info")]
    #[argh(description = "logging verbosity (off, error, warn, info, debug, trace)")]
    log_level: LevelFilter,

    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Create(CreateCommand),
    Read(ReadCommand),
    Delete(DeleteCommand),
    Generate(GenerateCommand),
}

#[derive(FromArgs)]
#[argh(subcommand, name = "create")]
#[argh(description = "create a template, or a deployment inside one")]
struct CreateCommand {
    #[argh(subcommand)]
    target: CreateTarget,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum CreateTarget {
    Template(CreateTemplate),
    Deployment(CreateDeployment),
}

#[derive(FromArgs)]
#[argh(subcommand, name = "template")]
#[argh(description = "store a fresh, empty application template")]
struct CreateTemplate {
    #[argh(positional)]
    #[argh(description = "name of the new template")]
    name: String,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "deployment")]
#[argh(description = "add a deployment config to a stored template (interactive)")]
struct CreateDeployment {
    #[argh(positional)]
    #[argh(description = "name of the new deployment config; may carry %d")]
    name: String,

    #[argh(positional)]
    #[argh(description = "template to store the deployment in")]
    template: String,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "read")]
#[argh(description = "list stored templates, or print one as JSON")]
struct ReadCommand {
    #[argh(positional)]
    #[argh(description = "template to print; omit to list all names")]
    name: Option<String>,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "delete")]
#[argh(description = "remove a stored template")]
struct DeleteCommand {
    #[argh(positional)]
    #[argh(description = "template to remove")]
    name: String,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "generate")]
#[argh(description = "expand a stored template into concrete manifest objects")]
struct GenerateCommand {
    #[argh(positional)]
    #[argh(description = "template to generate from")]
    template: String,

    #[argh(option, default = "0")]
    #[argh(description = "number of cluster nodes to target")]
    nodes: u32,

    #[argh(switch)]
    #[argh(description = "keep persistent storage in the generated objects")]
    storage: bool,

    #[argh(switch)]
    #[argh(description = "keep node selectors in the generated objects")]
    node_selector: bool,
}

fn main() -> ExitCode {
    let args: Args = argh::from_env();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    TermLogger::init(
        args.log_level,
        LogConfig::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .context(error::LoggerSnafu)?;

    let mut catalog = FileCatalog::new(&args.catalog);
    match args.command {
        Command::Create(cmd) => match cmd.target {
            CreateTarget::Template(cmd) => create::create_template(&mut catalog, &cmd.name),
            CreateTarget::Deployment(cmd) => {
                let stdin = io::stdin();
                let mut wizard = Wizard::new(stdin.lock(), io::stdout());
                create::create_deployment(&mut catalog, &mut wizard, &cmd.name, &cmd.template)
            }
        },
        Command::Read(cmd) => read_template(&catalog, cmd.name.as_deref(), &mut io::stdout()),
        Command::Delete(cmd) => delete_template(&mut catalog, &cmd.name),
        Command::Generate(cmd) => {
            let settings = ExpansionSettings {
                node_count: cmd.nodes,
                storage_enabled: cmd.storage,
                node_selector_enabled: cmd.node_selector,
            };
            generate_template(&catalog, &cmd.template, &settings, &mut io::stdout())
        }
    }
}

fn read_template<C: Catalog, W: Write>(catalog: &C, name: Option<&str>, out: &mut W) -> Result<()> {
    match name {
        None => {
            for name in catalog.list().context(error::CatalogSnafu)?.keys() {
                writeln!(out, "{}", name).context(error::WriteOutputSnafu)?;
            }
            Ok(())
        }
        Some(name) => {
            let template = catalog
                .get(name)
                .context(error::CatalogSnafu)?
                .context(error::UnknownTemplateSnafu { name })?;
            let rendered =
                serde_json::to_string_pretty(&template).context(error::SerializeOutputSnafu)?;
            writeln!(out, "{}", rendered).context(error::WriteOutputSnafu)
        }
    }
}

fn delete_template<C: Catalog>(catalog: &mut C, name: &str) -> Result<()> {
    let removed = catalog.delete(name).context(error::CatalogSnafu)?;
    ensure!(removed, error::UnknownTemplateSnafu { name });
    log::info!("deleted template '{}'", name);
    Ok(())
}

fn generate_template<C: Catalog, W: Write>(
    catalog: &C,
    name: &str,
    settings: &ExpansionSettings,
    out: &mut W,
) -> Result<()> {
    let template = catalog
        .get(name)
        .context(error::CatalogSnafu)?
        .context(error::UnknownTemplateSnafu { name })?;
    let generated = Template::assemble(&template, settings);
    let rendered =
        serde_json::to_string_pretty(&generated).context(error::SerializeOutputSnafu)?;
    writeln!(out, "{}", rendered).context(error::WriteOutputSnafu)
}

pub(crate) mod error {
    use snafu::Snafu;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(crate)))]
    pub(crate) enum Error {
        #[snafu(display("Failed to access the template catalog: {}", source))]
        Catalog { source: catalog::Error },

        #[snafu(display("Failed to initialize logger: {}", source))]
        Logger { source: log::SetLoggerError },

        #[snafu(display("Could not parse '{}' as a number: {}", given, source))]
        ParseNumber {
            given: String,
            source: std::num::ParseIntError,
        },

        #[snafu(display("Failed to read answer: {}", source))]
        ReadAnswer { source: std::io::Error },

        #[snafu(display("Failed to serialize output: {}", source))]
        SerializeOutput { source: serde_json::Error },

        #[snafu(display("No template named '{}' in the catalog", name))]
        UnknownTemplate { name: String },

        #[snafu(display("Failed to write output: {}", source))]
        WriteOutput { source: std::io::Error },

        #[snafu(display("Failed to write prompt: {}", source))]
        WritePrompt { source: std::io::Error },
    }

    pub(crate) type Result<T> = std::result::Result<T, Error>;
}

#[cfg(test)]
mod test {
    use super::*;
    use catalog::MemoryCatalog;
    use libtemplate::{ApplicationTemplate, DeploymentConfig, DeploymentStrategy};

    fn seeded_catalog() -> MemoryCatalog {
        let mut catalog = MemoryCatalog::new();
        let mut template = ApplicationTemplate::new("shop");
        let mut config = DeploymentConfig::new("web-%d");
        config.spec.deployment_strategy = DeploymentStrategy::PerNodeConfig;
        template
            .deployment_configs
            .insert("web".to_string(), config);
        catalog.save("shop", template).unwrap();
        catalog.save("blog", ApplicationTemplate::new("blog")).unwrap();
        catalog
    }

    #[test]
    fn read_without_name_lists_templates() {
        let catalog = seeded_catalog();
        let mut out = Vec::new();
        read_template(&catalog, None, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "blog\nshop\n");
    }

    #[test]
    fn read_prints_one_template_as_json() {
        let catalog = seeded_catalog();
        let mut out = Vec::new();
        read_template(&catalog, Some("shop"), &mut out).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed["metadata"]["name"], "shop");
        assert!(parsed["deploymentConfigs"]["web"].is_object());
    }

    #[test]
    fn read_unknown_template_errors() {
        let catalog = seeded_catalog();
        let mut out = Vec::new();
        let result = read_template(&catalog, Some("nope"), &mut out);
        assert!(matches!(
            result.unwrap_err(),
            error::Error::UnknownTemplate { name } if name == "nope"
        ));
    }

    #[test]
    fn delete_unknown_template_errors() {
        let mut catalog = seeded_catalog();
        assert!(delete_template(&mut catalog, "shop").is_ok());
        assert!(matches!(
            delete_template(&mut catalog, "shop").unwrap_err(),
            error::Error::UnknownTemplate { .. }
        ));
    }

    #[test]
    fn generate_expands_the_template() {
        let catalog = seeded_catalog();
        let settings = ExpansionSettings {
            node_count: 2,
            storage_enabled: false,
            node_selector_enabled: false,
        };
        let mut out = Vec::new();
        generate_template(&catalog, "shop", &settings, &mut out).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed["kind"], "Template");
        let objects = parsed["objects"].as_array().unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0]["metadata"]["name"], "web-0");
        assert_eq!(objects[1]["metadata"]["name"], "web-1");
    }

    #[test]
    fn generate_unknown_template_errors() {
        let catalog = seeded_catalog();
        let mut out = Vec::new();
        let result =
            generate_template(&catalog, "nope", &ExpansionSettings::default(), &mut out);
        assert!(matches!(
            result.unwrap_err(),
            error::Error::UnknownTemplate { .. }
        ));
    }
}

mod cli;

use confspan::providers::analyzer::AccessAnalyzer;
use confspan::providers::firewall::Firewall;
use confspan::providers::storage::Storage;
use confspan::types::{Range, Source};
use confspan::{adapt, hcl, template};
use serde::Serialize;
use std::path::Path;

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("CONFSPAN_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let command_result = match cli.command {
        cli::Command::Resources(resources_cli) => resources(resources_cli),
        cli::Command::Adapt(adapt_cli) => adapt(adapt_cli),
        cli::Command::Dev(dev_cli) => dev(dev_cli),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
    }
}

/// One resource declaration, for the `resources` listing.
#[derive(Serialize, Debug)]
struct ResourceRow {
    notation: &'static str,
    type_name: String,
    id: String,
    source: Source,
    range: Range,
}

pub fn resources(cli: cli::ResourcesCommand) -> anyhow::Result<()> {
    let (modules, documents) = load(&cli.input)?;

    let mut rows = Vec::new();
    for resource in modules.resources() {
        rows.push(ResourceRow {
            notation: "hcl",
            type_name: resource.type_name().to_string(),
            id: resource.id().to_string(),
            source: resource.metadata().source().clone(),
            range: resource.metadata().range(),
        });
    }
    for document in documents.iter() {
        for resource in document.resources() {
            rows.push(ResourceRow {
                notation: "template",
                type_name: resource.type_name().as_str().to_string(),
                id: resource.id().to_string(),
                source: resource.metadata().source().clone(),
                range: resource.metadata().range(),
            });
        }
    }

    if let Some(type_name) = &cli.type_name {
        rows.retain(|row| row.type_name == *type_name);
    }

    output(&cli.output, &rows)?;
    Ok(())
}

/// The adapted model across every loaded source.
#[derive(Serialize, Debug, Default)]
struct Model {
    firewall: Firewall,
    storage: Storage,
    access_analyzers: AccessAnalyzer,
}

pub fn adapt(cli: cli::AdaptCommand) -> anyhow::Result<()> {
    let (modules, documents) = load(&cli.input)?;

    let mut model = Model {
        firewall: adapt::hcl::adapt_firewall(&modules),
        storage: adapt::hcl::adapt_storage(&modules),
        ..Model::default()
    };

    for document in documents.iter() {
        model
            .storage
            .buckets
            .extend(adapt::template::adapt_storage(document).buckets);
        model
            .access_analyzers
            .analyzers
            .extend(adapt::template::adapt_access_analyzer(document).analyzers);
    }

    output(&cli.output, &model)?;
    Ok(())
}

fn load(input: &cli::InputArgs) -> anyhow::Result<(hcl::Modules, template::Documents)> {
    let mut modules = hcl::Modules::default();
    let mut documents = template::Documents::default();

    if input.workdir {
        load_directory(&std::env::current_dir()?, &mut modules, &mut documents)?;
    }

    for file_path in &input.files {
        load_file(file_path, &mut modules, &mut documents)?;
    }

    for dir_path in &input.directories {
        load_directory(dir_path, &mut modules, &mut documents)?;
    }

    anyhow::ensure!(
        modules.source_count() > 0 || !documents.is_empty(),
        "No files loaded"
    );

    Ok((modules, documents))
}

fn load_file(
    file_path: &Path,
    modules: &mut hcl::Modules,
    documents: &mut template::Documents,
) -> anyhow::Result<()> {
    let file_name = file_path.to_string_lossy();
    if file_name.ends_with(".tf") {
        modules.load_file(file_path)?;
    } else if file_name.ends_with(".json") || file_name.ends_with(".template") {
        documents.load_file(file_path)?;
    } else {
        anyhow::bail!("Unsupported file type: {}", file_path.display());
    }
    Ok(())
}

/// Loads both notations from the directory; a notation with no matching
/// files is fine as long as the other finds some.
fn load_directory(
    dir_path: &Path,
    modules: &mut hcl::Modules,
    documents: &mut template::Documents,
) -> anyhow::Result<()> {
    let hcl_result = modules.load_directory(dir_path);
    if let Err(error) = hcl_result {
        if !matches!(error, hcl::LoadError::NoFilesFound) {
            return Err(error.into());
        }
    }

    let template_result = documents.load_directory(dir_path);
    if let Err(error) = template_result {
        if !matches!(error, template::LoadError::NoFilesFound) {
            return Err(error.into());
        }
    }

    Ok(())
}

fn output<T: Serialize>(output: &cli::OutputArgs, value: &T) -> anyhow::Result<()> {
    match output.format {
        cli::OutputFormat::Yaml => serde_yaml::to_writer(std::io::stdout(), value)?,
        cli::OutputFormat::Json => serde_json::to_writer_pretty(std::io::stdout(), value)?,
    };

    Ok(())
}

/// (confspan-)developer utilities
///
/// A quick way to expose internal structures for debugging purposes
pub fn dev(cli: cli::DevCommand) -> anyhow::Result<()> {
    use cli::DevSubCommand::*;

    let (modules, documents) = load(&cli.input)?;

    match cli.command {
        Modules => println!("{modules:#?}"),
        Documents => println!("{documents:#?}"),
    }

    Ok(())
}

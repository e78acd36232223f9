//! CLI module for autoref

mod args;

pub use args::{Args, Command, ListFormat};

use crate::classify::{Bucket, Buckets, Classifier};
use crate::config::{Config, IndexConfig, DEFAULT_CONFIG_FILE};
use crate::error::Result;
use crate::loader;
use crate::output::IndexWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Run the CLI application
pub fn run() -> ExitCode {
    let args = Args::parse_args();
    init_logging(args.verbose);

    match execute(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn execute(args: Args) -> Result<()> {
    match args.command {
        Command::Generate {
            source,
            output,
            config,
            module,
            exclude,
            templates,
        } => {
            let cfg = load_config(config.as_deref(), output, module, exclude, templates)?;

            let root = loader::load(&source, cfg.module.name.as_deref())?;
            let buckets = Classifier::new(&cfg.module)?.classify(&root);
            println!("Classified {} names in {}", buckets.total(), root.name());

            let report = IndexWriter::new(&cfg)?.write(&root, &buckets)?;

            println!("{}", report.summary());
            if !report.skipped.is_empty() {
                println!("\nSkipped (neither class nor callable):");
                for name in &report.skipped {
                    println!("  {}", name);
                }
            }
            println!("Index written to: {}", report.index_path.display());
            Ok(())
        }

        Command::Classify {
            source,
            config,
            module,
            exclude,
            format,
        } => {
            let cfg = load_config(config.as_deref(), None, module, exclude, None)?;

            let root = loader::load(&source, cfg.module.name.as_deref())?;
            let buckets = Classifier::new(&cfg.module)?.classify(&root);

            match format {
                ListFormat::Text => print!("{}", format_buckets(&buckets, &cfg.index)),
                ListFormat::Json => println!("{}", serde_json::to_string_pretty(&buckets)?),
            }
            Ok(())
        }

        Command::Version => {
            println!("autoref {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Load the config file, then apply CLI overrides
fn load_config(
    path: Option<&Path>,
    output: Option<PathBuf>,
    module: Option<String>,
    exclude: Vec<String>,
    templates: Option<PathBuf>,
) -> Result<Config> {
    // An explicit config path must exist; the default one is optional
    let mut cfg = match path {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(Path::new(DEFAULT_CONFIG_FILE))?,
    };

    cfg.merge_cli(output, module, exclude, templates);
    cfg.validate()?;
    Ok(cfg)
}

/// Plain-text listing of the buckets
fn format_buckets(buckets: &Buckets, index: &IndexConfig) -> String {
    let mut out = String::new();

    for bucket in Bucket::ALL {
        let names = buckets.get(bucket);
        out.push_str(&format!("{} ({})\n", index.section_title(bucket), names.len()));
        for name in names {
            out.push_str(&format!("  {}\n", name));
        }
    }

    out
}

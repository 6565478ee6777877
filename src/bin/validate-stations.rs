use anyhow::{Context, Result};
use clap::Parser;
use jsonschema::JSONSchema;
use serde_json::Value;
use std::{fs, path::PathBuf};

const RAW_STATION_SCHEMA: &str = include_str!("../../schemas/raw_station.v1.json");

/// Validate provider station documents against the raw station schema.
#[derive(Parser, Debug)]
#[command(name = "validate-stations", version, about = "Validate provider station JSON against schema")]
struct Cli {
    /// Provider JSON documents to validate
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Optional path to a schema file (defaults to the bundled raw_station.v1 schema)
    #[arg(long)]
    schema: Option<PathBuf>,
}

fn load_json(path: &PathBuf) -> Result<Value> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let json: Value = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse JSON in {}", path.display()))?;
    Ok(json)
}

/// Every schema violation in `instance`, rendered as `<error> at <path>`.
fn validation_errors(compiled: &JSONSchema, instance: &Value) -> Vec<String> {
    let result = compiled.validate(instance);
    match result {
        Ok(_) => Vec::new(),
        Err(errors) => errors
            .map(|error| format!("{} at {}", error, error.instance_path))
            .collect(),
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let schema_json = match &args.schema {
        Some(path) => load_json(path)?,
        None => serde_json::from_str(RAW_STATION_SCHEMA).context("Bundled schema is not valid JSON")?,
    };

    // jsonschema 0.17 expects a schema with 'static lifetime; leak the parsed schema for CLI lifetime
    let schema_static: &'static Value = Box::leak(Box::new(schema_json));

    let compiled = JSONSchema::options()
        .compile(schema_static)
        .context("Failed to compile JSON Schema")?;

    let mut invalid_files = 0;
    for path in &args.paths {
        let instance = load_json(path)?;
        let problems = validation_errors(&compiled, &instance);
        if problems.is_empty() {
            println!("{}: valid", path.display());
        } else {
            invalid_files += 1;
            eprintln!("{}: invalid", path.display());
            for problem in &problems {
                eprintln!("- {}", problem);
            }
        }
    }

    if invalid_files > 0 {
        std::process::exit(1)
    }
    Ok(())
}

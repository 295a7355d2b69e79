//! daogen CLI - generate entity and DAO sources from a declarative schema
//!
//! Without a subcommand the built-in campus schema is generated into
//! `../project/src-gen`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use daogen::campus;
use daogen::schema::{load_schema, Schema};
use daogen::CodegenPipeline;

#[derive(Parser)]
#[command(name = "daogen")]
#[command(version, about = "Generate entity and DAO sources from a declarative schema", long_about = None)]
struct Cli {
    /// Enable debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate entity, DAO and test sources
    Generate {
        /// Schema YAML file (default: built-in campus schema)
        #[arg(short, long)]
        schema: Option<PathBuf>,

        /// Output directory (default: `output` from the schema file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip generated DAO tests
        #[arg(long)]
        no_tests: bool,
    },

    /// Validate a schema YAML file without generating code
    Validate {
        /// Schema YAML file
        #[arg(short, long)]
        schema: PathBuf,
    },

    /// Print the entities and relationships of a schema
    Describe {
        /// Schema YAML file (default: built-in campus schema)
        #[arg(short, long)]
        schema: Option<PathBuf>,

        /// Print the finished schema as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("daogen=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("daogen=info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        None => generate(None, None, false),
        Some(Commands::Generate { schema, output, no_tests }) => generate(schema, output, no_tests),
        Some(Commands::Validate { schema }) => validate(schema),
        Some(Commands::Describe { schema, json }) => describe(schema, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Load a schema file, or the built-in campus schema when no file is given.
///
/// Also returns the output directory the schema asks for, if any.
fn load(path: Option<PathBuf>) -> daogen::Result<(Schema, Option<PathBuf>)> {
    match path {
        Some(path) => {
            let file = load_schema(&path)?;
            let output = file.schema.output.clone();
            Ok((file.build()?, output))
        }
        None => Ok((campus::campus_schema()?, Some(PathBuf::from(campus::OUTPUT_DIR)))),
    }
}

/// `--output` wins over the schema file's `output`, then the campus default.
fn output_dir(cli: Option<PathBuf>, schema: Option<PathBuf>) -> PathBuf {
    cli.or(schema).unwrap_or_else(|| PathBuf::from(campus::OUTPUT_DIR))
}

fn generate(schema: Option<PathBuf>, output: Option<PathBuf>, no_tests: bool) -> daogen::Result<()> {
    let (schema, schema_output) = load(schema)?;
    let output = output_dir(output, schema_output);

    let report = CodegenPipeline::new(&schema, &output)
        .with_tests(!no_tests)
        .run()?;

    println!(
        "✓ {} files in {} ({} written, {} unchanged)",
        report.len(),
        output.display(),
        report.written.len(),
        report.unchanged.len()
    );
    Ok(())
}

fn validate(path: PathBuf) -> daogen::Result<()> {
    let (schema, _) = load(Some(path.clone()))?;
    let relations: usize = schema
        .entities()
        .map(|e| e.to_ones().len() + e.to_manys().len())
        .sum();

    println!(
        "✓ {} is valid: {} entities, {} relationships",
        path.display(),
        schema.entity_count(),
        relations
    );
    Ok(())
}

fn describe(path: Option<PathBuf>, json: bool) -> daogen::Result<()> {
    let (schema, _) = load(path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    println!(
        "Schema v{} (entities: {}, DAOs: {})",
        schema.version(),
        schema.modules().default_module,
        schema.modules().dao_module
    );
    for entity in schema.entities() {
        println!("\n{} ({})", entity.name(), entity.table_name());
        for property in entity.properties() {
            let mut flags = Vec::new();
            if property.primary_key {
                flags.push("pk");
            }
            if property.not_null {
                flags.push("not null");
            }
            if entity.is_foreign_key(&property.name) {
                flags.push("fk");
            }
            println!(
                "  {:<20} {:<10} {}",
                property.name,
                format!("{:?}", property.property_type),
                flags.join(", ")
            );
        }
        for to_one in entity.to_ones() {
            println!("  {} -> {} via {}", to_one.name, to_one.target, to_one.fk_property);
        }
        for to_many in entity.to_manys() {
            let order: Vec<String> = to_many
                .order
                .iter()
                .map(|t| format!("{} {}", t.property, t.direction.as_sql()))
                .collect();
            print!(
                "  {} ->> {} via {}.{}",
                to_many.name, to_many.target, to_many.target, to_many.target_property
            );
            if order.is_empty() {
                println!();
            } else {
                println!(" order by {}", order.join(", "));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_is_campus_schema() {
        let (schema, output) = load(None).unwrap();
        assert_eq!(schema, campus::campus_schema().unwrap());
        assert_eq!(output, Some(PathBuf::from("../project/src-gen")));
    }

    #[test]
    fn test_output_precedence() {
        let cli = Some(PathBuf::from("cli"));
        let file = Some(PathBuf::from("file"));

        assert_eq!(output_dir(cli, file.clone()), PathBuf::from("cli"));
        assert_eq!(output_dir(None, file), PathBuf::from("file"));
        assert_eq!(output_dir(None, None), PathBuf::from(campus::OUTPUT_DIR));
    }

    #[test]
    fn test_generate_campus_into_output() {
        let dir = tempfile::tempdir().unwrap();
        generate(None, Some(dir.path().to_path_buf()), false).unwrap();

        assert!(dir.path().join("dao/building.rs").exists());
        assert!(dir.path().join("dao/test/building_dao_test.rs").exists());
    }

    #[test]
    fn test_generate_uses_schema_file_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("gen");
        let schema_path = dir.path().join("faculty.yaml");
        let yaml = r#"
schema:
  version: 1
  output: OUTPUT
entities:
  - name: Faculty
    properties:
      - { name: name, type: String, not_null: true }
"#;
        let output_yaml = format!("{:?}", output.display().to_string());
        fs::write(&schema_path, yaml.replace("OUTPUT", &output_yaml)).unwrap();

        generate(Some(schema_path.clone()), None, true).unwrap();
        assert!(output.join("dao/faculty_dao.rs").exists());

        validate(schema_path).unwrap();
    }
}

//! Minimal CLI: type definitions in, wire-format schema JSON out.
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::typedef::{self, Document};
use crate::visitor::GeneratorConfig;

// ------------------------------- Types ------------------------------------ //

/// derive an Avro wire-format schema from JSON type-definition documents
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// generate and print the schema for a root type
    Schema(SchemaOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug)]
struct SchemaOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// root type name (defaults to the last document's "root")
    #[arg(long)]
    root: Option<String>,

    /// tag temporal and UUID types with logical types
    #[arg(long, default_value_t = false)]
    logical_types: bool,

    /// emit enumerated types as plain strings instead of native enums
    #[arg(long, default_value_t = false)]
    enum_as_string: bool,

    /// output .avsc file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ---------------------------- Implementation -------------------------------- //

impl InputSettings {
    fn load(&self) -> Result<Vec<Document>> {
        let source_paths = resolve_file_path_patterns(&self.input)?;
        let mut docs = Vec::with_capacity(source_paths.len());
        for source_path in source_paths {
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read {}", source_path.display()))?;
            let mut de = serde_json::Deserializer::from_str(&source);
            // serde_path_to_error so a bad node reports its JSON path.
            let doc: Document = serde_path_to_error::deserialize(&mut de)
                .with_context(|| format!("failed to parse {}", source_path.display()))?;
            docs.push(doc);
        }
        Ok(docs)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Schema(target) => {
                // 1) load and convert the type model
                let docs = target.input_settings.load()?;
                let registry = typedef::build_registry(&docs)?;
                let root = typedef::root_descriptor(&docs, target.root.as_deref())?;

                // 2) generate
                let config = GeneratorConfig {
                    logical_types: target.logical_types,
                    write_enum_as_string: target.enum_as_string,
                };
                let schema = crate::generate::generate(Rc::new(registry), &root, config)
                    .with_context(|| format!("schema generation failed for `{}`", root.name))?;

                // 3) emit
                let schema_src = serde_json::to_string_pretty(&schema.to_json())?;
                match target.out.as_ref() {
                    Some(out) => {
                        if let Some(parent) = out.parent() {
                            std::fs::create_dir_all(parent)?;
                        }
                        std::fs::write(out, &schema_src)
                            .with_context(|| format!("failed to write {}", out.display()))?;
                    }
                    None => println!("{schema_src}"),
                }
                Ok(())
            }
        }
    }
}

// --------------------------- Internal helpers ------------------------------- //

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            // Treat as a glob pattern
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                // An explicit glob that matched nothing is an input error.
                anyhow::bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            // Treat as a literal path
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_paths_pass_through() {
        let out = resolve_file_path_patterns(["types.json"]).unwrap();
        assert_eq!(out, vec![PathBuf::from("types.json")]);
    }

    #[test]
    fn empty_glob_is_an_error() {
        let err = resolve_file_path_patterns(["no/such/dir/*.json"]).unwrap_err();
        assert!(err.to_string().contains("matched no files"));
    }
}

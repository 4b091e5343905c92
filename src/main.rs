use std::{fs, io::Read, path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use filtertext::{ColumnSchema, ColumnType, Filter};

/// Validate, parse and render column filter expressions
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// debug logging on stderr (RUST_LOG overrides)
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that a filter is valid for the given columns
    Check {
        expr: String,
        #[clap(flatten)]
        columns: ColumnArgs,
    },
    /// Print the structured form of a filter as JSON
    Parse {
        expr: String,
        #[clap(flatten)]
        columns: ColumnArgs,
    },
    /// Render filter JSON from FILE, or stdin, as filter text
    Render { file: Option<PathBuf> },
}

#[derive(Args, Debug)]
struct ColumnArgs {
    /// column declaration as NAME:TYPE, type is string, number or boolean
    #[clap(short, long = "column", value_parser = parse_column)]
    column: Vec<(String, ColumnType)>,

    /// JSON schema file: {"columns": [{"name": "age", "type": "number"}]}
    #[clap(short, long)]
    schema: Option<PathBuf>,
}

fn parse_column(s: &str) -> Result<(String, ColumnType), String> {
    let (name, ty) = s
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:TYPE, got '{}'", s))?;
    let ty = ty.parse::<ColumnType>().map_err(|e| e.to_string())?;
    Ok((name.trim().to_string(), ty))
}

impl ColumnArgs {
    fn schema(&self) -> anyhow::Result<ColumnSchema> {
        let mut schema = match &self.schema {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("reading schema {}", path.display()))?;
                ColumnSchema::from_json_str(&json)
                    .with_context(|| format!("parsing schema {}", path.display()))?
            }
            None => ColumnSchema::default(),
        };

        for (name, ty) in &self.column {
            schema.insert(name.clone(), *ty);
        }

        log::debug!("columns: {:?}", schema.names());
        Ok(schema)
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();

    match cli.command {
        Command::Check { expr, columns } => {
            let schema = columns.schema()?;
            match filtertext::check(&expr, &schema) {
                Ok(()) => {
                    println!("valid");
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    eprintln!("{:?}", miette::Report::new(e));
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Parse { expr, columns } => {
            let schema = columns.schema()?;
            match filtertext::parse(&expr, &schema) {
                Ok(filter) => {
                    println!("{}", serde_json::to_string_pretty(&filter)?);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    eprintln!("{:?}", miette::Report::new(e));
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Render { file } => {
            let json = match file {
                Some(path) => fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("reading stdin")?;
                    buf
                }
            };

            let value: serde_json::Value =
                serde_json::from_str(&json).context("filter input is not JSON")?;
            println!("{}", Filter::from_json_lenient(&value));
            Ok(ExitCode::SUCCESS)
        }
    }
}

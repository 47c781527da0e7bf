//! sqlbind: inspect SQL templates and mapper configurations
//!
//! # Usage
//!
//! ```bash
//! # Compile a template
//! sqlbind compile "select * from blog where id = #{id}"
//!
//! # Load a configuration and list its statements
//! sqlbind check sqlbind.toml
//!
//! # Show the SQL and bound values of one statement
//! sqlbind explain blog.findById --params '{"id": 7}'
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use sqlbind::executor::ParameterBinder;
use sqlbind::mapping::{ParameterMapping, StaticSql};
use sqlbind::prelude::*;
use sqlbind::session::{ConfigFile, Placeholder};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sqlbind")]
#[command(version)]
#[command(about = "Compile SQL templates and inspect mapper configurations", long_about = None)]
#[command(after_help = "EXAMPLES:
    sqlbind compile 'select * from blog where id = #{id}'
    sqlbind compile 'update blog set title = #{title} where id = #{id}' --placeholder dollar
    sqlbind check sqlbind.toml
    sqlbind explain blog.findById --params '{\"id\": 7}'")]
struct Cli {
    /// Log at debug level (overrides SQLBIND_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum PlaceholderArg {
    Question,
    Dollar,
}

impl From<PlaceholderArg> for Placeholder {
    fn from(arg: PlaceholderArg) -> Self {
        match arg {
            PlaceholderArg::Question => Placeholder::Question,
            PlaceholderArg::Dollar => Placeholder::Dollar,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a template and show its parameter mappings
    Compile {
        /// The SQL template
        template: String,

        /// Placeholder style of the compiled SQL
        #[arg(short, long, value_enum, default_value = "question")]
        placeholder: PlaceholderArg,
    },
    /// Load a configuration and list its statements
    Check {
        /// Configuration file (defaults to <config dir>/sqlbind/sqlbind.toml)
        config: Option<PathBuf>,
    },
    /// Show the compiled SQL and bound values of one statement
    Explain {
        /// Statement id, e.g. blog.findById
        id: String,

        /// Configuration file
        #[arg(short, long, env = "SQLBIND_CONFIG")]
        config: Option<PathBuf>,

        /// Parameter object as JSON
        #[arg(short, long, default_value = "null")]
        params: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Commands::Compile {
            template,
            placeholder,
        } => compile_template(template, (*placeholder).into()),
        Commands::Check { config } => check_config(config.as_deref()),
        Commands::Explain { id, config, params } => explain_statement(id, config.as_deref(), params),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("sqlbind=debug")
    } else {
        EnvFilter::try_from_env("SQLBIND_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn compile_template(template: &str, placeholder: Placeholder) -> Result<()> {
    let settings = Settings::builder().placeholder(placeholder).build();
    let config = Configuration::new(settings);
    let sql = sqlbind::builder::SqlSourceBuilder::new(&config).parse(template, None)?;
    print_sql(&sql);
    Ok(())
}

fn print_sql(sql: &StaticSql) {
    println!("{}", "Compiled SQL:".green().bold());
    println!("  {}", sql.sql().white());

    if sql.parameter_mappings().is_empty() {
        return;
    }
    println!();
    println!("{}", "Parameters:".cyan());
    for (i, mapping) in sql.parameter_mappings().iter().enumerate() {
        println!("  {:>3}. {}", i + 1, describe_mapping(mapping));
    }
}

fn describe_mapping(mapping: &ParameterMapping) -> String {
    let mut parts = vec![
        format!("{}", mapping.property().yellow()),
        format!("type={}", mapping.value_type()),
        format!("mode={}", mapping.mode()),
    ];
    if let Some(sql_type) = mapping.sql_type() {
        parts.push(format!("jdbcType={}", sql_type));
    }
    if let Some(scale) = mapping.numeric_scale() {
        parts.push(format!("numericScale={}", scale));
    }
    parts.push(format!("handler={}", mapping.type_handler().name().dimmed()));
    parts.join(" ")
}

fn resolve_config_path(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path.to_path_buf()),
        None => ConfigFile::default_path()
            .ok_or_else(|| anyhow!("No configuration file given and no config directory found")),
    }
}

fn load_configuration(path: Option<&Path>) -> Result<(PathBuf, Configuration)> {
    let path = resolve_config_path(path)?;
    let file = ConfigFile::load(&path).with_context(|| format!("Failed to load {}", path.display()))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let config = Configuration::from_config_file(&file, base_dir)?;
    Ok((path, config))
}

fn check_config(path: Option<&Path>) -> Result<()> {
    let (path, config) = load_configuration(path)?;
    println!("{} {}", "✓".green(), path.display().to_string().cyan());
    println!();

    let mut count = 0;
    for statement in config.mapped_statements() {
        count += 1;
        let result = statement
            .result_maps()
            .first()
            .map(|rm| format!(" -> {}", rm.value_type()))
            .unwrap_or_default();
        println!(
            "  {:6} {}{}",
            statement.command_type().to_string().cyan(),
            statement.id().white(),
            result.dimmed()
        );
    }
    println!();
    println!("{} statement(s) loaded", count.to_string().cyan());
    Ok(())
}

fn explain_statement(id: &str, path: Option<&Path>, params: &str) -> Result<()> {
    let (_, config) = load_configuration(path)?;
    let statement = config.mapped_statement(id)?;
    let json: serde_json::Value = serde_json::from_str(params).context("Invalid --params JSON")?;
    let parameter = Value::from_json(json);

    println!("{} {}", "Statement:".dimmed(), statement.id().yellow());
    println!("{} {}", "Kind:".dimmed(), statement.command_type().to_string().cyan());
    println!();
    print_sql(statement.sql());

    let bound = statement.bound_sql(parameter);
    let values = ParameterBinder::new(&config).bind(&bound)?;
    println!();
    println!("{}", "Bound values:".cyan());
    if values.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for (i, value) in values.iter().enumerate() {
        println!("  {:>3}. {} {}", i + 1, value.to_string().white(), format!("({})", value.type_label()).dimmed());
    }
    Ok(())
}

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glaze_core::DialectConfig;
use glaze_lang::{
    default_value, remap_diagnostics, Declaration, MaskMode, Transpiler, UniformParser,
    UniformValue,
};
use serde::Serialize;

#[derive(Parser)]
#[command(
    name = "glaze",
    version,
    about = "Glaze: AGSL shaders in the browser",
    long_about = "Glaze reads Android AGSL runtime shaders, lists their user uniforms\nand transpiles them to WebGL-compatible GLSL ES."
)]
struct Cli {
    /// Dialect configuration file (TOML). Built-in AGSL defaults when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the user uniforms declared in an AGSL file
    Uniforms {
        /// Path to the AGSL source
        #[arg()]
        file: PathBuf,

        /// Print a JSON array instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Transpile an AGSL file to GLSL ES
    Transpile {
        /// Path to the AGSL source
        #[arg()]
        file: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the preamble line offset to stderr
        #[arg(long)]
        show_offset: bool,
    },

    /// Report constructs that are likely to fail in WebGL
    Check {
        /// Path to the AGSL source
        #[arg()]
        file: PathBuf,
    },

    /// Map GLSL compiler log line numbers back to AGSL source lines
    Remap {
        /// Line offset reported by `glaze transpile --show-offset`
        #[arg(long)]
        offset: usize,

        /// Compiler log file (default: stdin)
        #[arg()]
        file: Option<PathBuf>,
    },

    /// Display version and dialect info
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries GLSL and JSON; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Uniforms { file, json } => cmd_uniforms(&config, &file, json),
        Commands::Transpile {
            file,
            output,
            show_offset,
        } => cmd_transpile(&config, &file, output, show_offset),
        Commands::Check { file } => cmd_check(&config, &file),
        Commands::Remap { offset, file } => cmd_remap(offset, file),
        Commands::Info => cmd_info(&config),
    }
}

fn load_config(path: Option<&Path>) -> Result<DialectConfig> {
    match path {
        Some(path) => {
            let config = DialectConfig::load_from_file(path)
                .with_context(|| format!("failed to load config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded dialect config");
            Ok(config)
        }
        None => Ok(DialectConfig::default()),
    }
}

fn read_source(file: &Path) -> Result<String> {
    std::fs::read_to_string(file)
        .with_context(|| format!("failed to read file: {}", file.display()))
}

/// A declaration plus the value a host control would start at.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UniformRow<'a> {
    #[serde(flatten)]
    declaration: &'a Declaration,
    default_value: Option<UniformValue>,
}

fn cmd_uniforms(config: &DialectConfig, file: &Path, json: bool) -> Result<()> {
    let source = read_source(file)?;
    let declarations = UniformParser::new(config).parse(&source);

    if json {
        let rows: Vec<UniformRow<'_>> = declarations
            .iter()
            .map(|declaration| UniformRow {
                declaration,
                default_value: default_value(declaration.semantic_type),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if declarations.is_empty() {
        println!("No user uniforms in {}", file.display());
        return Ok(());
    }
    print!("{}", format_table(&declarations));
    Ok(())
}

fn format_table(declarations: &[Declaration]) -> String {
    let name_width = declarations
        .iter()
        .map(|d| d.name.len())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    let mut out = format!(
        "{:<4}  {:<name_width$}  {:<9}  {:<6}  DEFAULT\n",
        "LINE", "NAME", "DECLARED", "TYPE"
    );
    for d in declarations {
        out.push_str(&format!(
            "{:<4}  {:<name_width$}  {:<9}  {:<6}  {}\n",
            d.line,
            d.name,
            d.raw_type.as_str(),
            d.semantic_type.as_str(),
            format_value(default_value(d.semantic_type).as_ref()),
        ));
    }
    out
}

fn format_value(value: Option<&UniformValue>) -> String {
    match value {
        None => "-".to_string(),
        Some(UniformValue::Float(v)) => format!("{v:?}"),
        Some(UniformValue::Int(v)) => v.to_string(),
        Some(UniformValue::Bool(v)) => v.to_string(),
        Some(UniformValue::Vector(vs)) => {
            let parts: Vec<String> = vs.iter().map(|v| format!("{v:?}")).collect();
            format!("[{}]", parts.join(", "))
        }
    }
}

fn cmd_transpile(
    config: &DialectConfig,
    file: &Path,
    output: Option<PathBuf>,
    show_offset: bool,
) -> Result<()> {
    let source = read_source(file)?;
    let result = Transpiler::new(config).transpile(&source);

    for warning in &result.warnings {
        tracing::warn!("{}: {}", file.display(), warning);
    }
    if result.mask_mode == MaskMode::Manual {
        tracing::info!(
            "{} samples {} itself; automatic masking disabled",
            file.display(),
            config.mask_uniform
        );
    }

    match output {
        Some(path) => {
            std::fs::write(&path, &result.generated_source)
                .with_context(|| format!("failed to write file: {}", path.display()))?;
            tracing::info!("wrote {}", path.display());
        }
        None => print!("{}", result.generated_source),
    }

    if show_offset {
        eprintln!("line offset: {}", result.line_offset);
    }
    Ok(())
}

fn cmd_check(config: &DialectConfig, file: &Path) -> Result<()> {
    let source = read_source(file)?;

    println!("Checking {}", file.display());

    let declarations = UniformParser::new(config).parse(&source);
    println!("   ✓ {} user uniform(s)", declarations.len());

    let result = Transpiler::new(config).transpile(&source);
    if !result.textures.is_empty() {
        println!("   ✓ textures: {}", result.textures.join(", "));
    }
    let mask = match result.mask_mode {
        MaskMode::Automatic => "automatic",
        MaskMode::Manual => "manual",
    };
    println!("   ✓ mask: {}", mask);

    if result.warnings.is_empty() {
        println!("   ✓ No warnings");
    } else {
        for warning in &result.warnings {
            println!("   ⚠ {}", warning);
        }
    }
    Ok(())
}

fn cmd_remap(offset: usize, file: Option<PathBuf>) -> Result<()> {
    let log = match file {
        Some(path) => read_source(&path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read compiler log from stdin")?;
            buf
        }
    };
    print!("{}", remap_diagnostics(&log, offset));
    Ok(())
}

fn cmd_info(config: &DialectConfig) -> Result<()> {
    println!("Glaze AGSL Toolkit");
    println!("   Version:     {}", env!("CARGO_PKG_VERSION"));
    println!("   Target:      GLSL ES 1.00 (WebGL)");
    println!(
        "   Entry point: {} → {}",
        config.entry_point, config.renamed_entry_point
    );
    println!(
        "   Built-ins:   {}, {}, {}, {}",
        config.resolution_uniform, config.time_uniform, config.mouse_uniform, config.mask_uniform
    );
    println!("   Mask cutoff: {}", config.mask_threshold);
    println!("   Reserved:    {}", config.reserved_names.join(", "));
    Ok(())
}

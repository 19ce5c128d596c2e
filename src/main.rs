use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thriftfmt::ast;
use thriftfmt::formatter::{format_source, Mode};
use thriftfmt::options::FormatOptions;
use thriftfmt::parser;
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "thriftfmt", version, about = "Thrift IDL formatter")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Fmt {
        /// Paths (files or directories) to format (defaults to current dir)
        paths: Vec<PathBuf>,
        /// Write the formatted content back to the files
        #[arg(long)]
        write: bool,
        /// Check if files are formatted; non-zero exit if changes needed
        #[arg(long)]
        check: bool,
        /// Indent width
        #[arg(long)]
        indent: Option<usize>,
        /// Config file with formatter options (thriftfmt.toml)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    Debug {
        /// File to debug
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Fmt {
            paths,
            write,
            check,
            indent,
            config,
        } => {
            if write && check {
                bail!("--write and --check are mutually exclusive");
            }
            let mode = if write {
                Mode::Write
            } else if check {
                Mode::Check
            } else {
                Mode::Stdout
            };
            let mut opts = match config {
                Some(path) => FormatOptions::load_from_path(&path)?,
                None => load_default_config()?,
            };
            if let Some(indent) = indent {
                opts.indent_size = indent;
            }
            let targets = if paths.is_empty() {
                vec![PathBuf::from(".")]
            } else {
                paths
            };
            let mut thrift_files = Vec::new();
            for p in targets {
                collect_thrift_files(&p, &mut thrift_files);
            }

            let results: Vec<_> = thrift_files
                .par_iter()
                .map(|path| process_file(path, &opts, mode))
                .collect();
            let mut had_change = false;
            for r in results {
                match r {
                    Ok(changed) => had_change |= changed,
                    Err(e) => eprintln!("{e}"),
                }
            }
            if matches!(mode, Mode::Check) && had_change {
                std::process::exit(1);
            }
        }
        Commands::Debug { file } => {
            debug_file(&file)?;
        }
    }
    Ok(())
}

fn load_default_config() -> Result<FormatOptions> {
    let path = Path::new("thriftfmt.toml");
    if path.exists() {
        Ok(FormatOptions::load_from_path(path)?)
    } else {
        Ok(FormatOptions::default())
    }
}

fn debug_file(path: &Path) -> Result<()> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let ast = parser::parse(&content);
    println!("===== {} =====", path.display());
    for def in &ast.body {
        let range = def.range();
        println!(
            "{}@{}:{}-{}:{} {}",
            def.kind_name(),
            range.start.line,
            range.start.character,
            range.end.line,
            range.end.character,
            def.name().unwrap_or("<unnamed>")
        );
        print_members(def);
    }
    Ok(())
}

fn print_members(def: &ast::Definition) {
    match def {
        ast::Definition::Struct(s) => {
            for f in &s.fields {
                println!(
                    "  field@{}:{} {}: {} {}",
                    f.range.start.line,
                    f.range.start.character,
                    f.id.map_or("?".to_string(), |id| id.to_string()),
                    f.field_type,
                    f.name
                );
            }
        }
        ast::Definition::Enum(e) => {
            for m in &e.members {
                println!(
                    "  member@{}:{} {}{}",
                    m.name_range.start.line,
                    m.name_range.start.character,
                    m.name,
                    m.initializer
                        .as_deref()
                        .map(|v| format!(" = {v}"))
                        .unwrap_or_default()
                );
            }
        }
        ast::Definition::Service(svc) => {
            for f in &svc.functions {
                println!(
                    "  function@{}:{} {} {}({} args, {} throws)",
                    f.range.start.line,
                    f.range.start.character,
                    f.return_type,
                    f.name,
                    f.arguments.len(),
                    f.throws.len()
                );
            }
        }
        _ => {}
    }
}

fn collect_thrift_files(path: &Path, out: &mut Vec<PathBuf>) {
    if path.is_file() {
        if path.extension().and_then(|s| s.to_str()) == Some("thrift") {
            out.push(path.to_path_buf());
        }
        return;
    }
    for entry in WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
        let p = entry.path();
        if p.is_file() && p.extension().and_then(|s| s.to_str()) == Some("thrift") {
            out.push(p.to_path_buf());
        }
    }
}

fn process_file(path: &Path, opts: &FormatOptions, mode: Mode) -> Result<bool> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let formatted = format_source(&content, opts);
    let changed = formatted != content;
    match mode {
        Mode::Stdout => {
            println!("===== {} =====", path.display());
            print!("{formatted}");
        }
        Mode::Write => {
            if changed {
                fs::write(path, formatted)
                    .with_context(|| format!("failed to write {}", path.display()))?;
            }
        }
        Mode::Check => {}
    }
    Ok(changed)
}

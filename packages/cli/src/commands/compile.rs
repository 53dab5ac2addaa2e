use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use voltron_codegen::{generate, CodegenWarning, Emitter, Target};
use voltron_compiler_react::{CompileOptions as ReactOptions, ReactEmitter};
use voltron_compiler_vue::{CompileOptions as VueOptions, VueEmitter};
use voltron_schema::{PageDocument, StaticRegistry};
use walkdir::WalkDir;

#[derive(Debug, Args)]
pub struct CompileArgs {
    /// Page file or directory (defaults to the configured page directory)
    pub path: Option<PathBuf>,

    /// Target frameworks, comma separated (overrides config)
    #[arg(short, long, value_delimiter = ',')]
    pub target: Vec<Target>,

    /// Output to stdout instead of files
    #[arg(long)]
    pub stdout: bool,

    /// Output directory (overrides config)
    #[arg(short, long)]
    pub out_dir: Option<String>,

    /// Emit a companion store module for React pages
    #[arg(long)]
    pub extract_store: bool,

    /// Emit JavaScript instead of TypeScript
    #[arg(long)]
    pub js: bool,
}

pub fn compile(args: CompileArgs, cwd: &Path) -> Result<()> {
    let mut config = Config::load(cwd)?;
    if !args.target.is_empty() {
        config.targets = args.target.clone();
    }
    if let Some(out_dir) = &args.out_dir {
        config.out_dir = out_dir.clone();
    }
    config.extract_store |= args.extract_store;
    config.typescript &= !args.js;

    let input = match &args.path {
        Some(path) => cwd.join(path),
        None => config.page_dir(cwd),
    };
    if !input.exists() {
        return Err(anyhow!("Page path does not exist: {}", input.display()));
    }

    let registry = config.load_registry(cwd)?;

    println!("{}", "🔨 Compiling Voltron pages...".bright_blue().bold());

    let pages = find_page_files(&input)?;
    if pages.is_empty() {
        println!("{}", "⚠️  No page documents found".yellow());
        return Ok(());
    }

    println!("Found {} pages", pages.len());

    let mut success_count = 0;
    let mut error_count = 0;

    for page in &pages {
        let relative_path = page.strip_prefix(&input).unwrap_or(page);
        match compile_page(page, &config, &registry, args.stdout, cwd) {
            Ok(outputs) => {
                success_count += 1;
                for (output_path, warnings) in outputs {
                    println!(
                        "  {} {} → {}",
                        "✓".green(),
                        relative_path.display(),
                        output_path
                    );
                    for warning in warnings {
                        println!("    {} {}", "warning:".yellow().bold(), warning);
                    }
                }
            }
            Err(e) => {
                error_count += 1;
                eprintln!(
                    "  {} {} - {}",
                    "✗".red(),
                    relative_path.display(),
                    e.to_string().red()
                );
            }
        }
    }

    println!();
    if error_count == 0 {
        println!(
            "{} Compiled {} pages successfully",
            "✅".green(),
            success_count
        );
        Ok(())
    } else {
        println!(
            "{} Compiled {} pages, {} errors",
            "⚠️".yellow(),
            success_count,
            error_count
        );
        Err(anyhow!("{} pages failed to compile", error_count))
    }
}

pub(crate) fn find_page_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && p.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    files.sort();

    Ok(files)
}

fn emitter_for(target: Target, config: &Config) -> Box<dyn Emitter> {
    match target {
        Target::React => Box::new(ReactEmitter::new(ReactOptions {
            use_typescript: config.typescript,
            extract_store: config.extract_store,
        })),
        Target::Vue => Box::new(VueEmitter::new(VueOptions {
            use_typescript: config.typescript,
        })),
    }
}

/// Compile one page for every configured target, returning
/// `(output location, warnings)` per target
fn compile_page(
    file_path: &Path,
    config: &Config,
    registry: &StaticRegistry,
    stdout: bool,
    cwd: &Path,
) -> Result<Vec<(String, Vec<CodegenWarning>)>> {
    let source = fs::read_to_string(file_path)?;
    let document = PageDocument::from_json(&source)?;

    let page_name = document
        .page_name()
        .map(str::to_string)
        .or_else(|| file_path.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "page".to_string());

    let mut outputs = Vec::new();
    for target in &config.targets {
        let emitter = emitter_for(*target, config);
        let output = generate(&document, registry, emitter.as_ref())?;
        debug!(page = %page_name, target = %target, "Compiled page");

        if stdout {
            println!("{}", output.source);
            if let Some(store) = &output.store {
                println!("{}", store);
            }
            outputs.push(("stdout".to_string(), output.warnings));
            continue;
        }

        let page_dir = config.out_dir(cwd).join(target.to_string()).join(&page_name);
        fs::create_dir_all(&page_dir)?;

        let output_file = page_dir.join(target.file_name(config.typescript));
        fs::write(&output_file, &output.source)?;

        if let Some(store) = &output.store {
            let extension = if config.typescript { "ts" } else { "js" };
            fs::write(page_dir.join("store").with_extension(extension), store)?;
        }

        outputs.push((output_file.display().to_string(), output.warnings));
    }

    Ok(outputs)
}

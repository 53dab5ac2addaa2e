use super::compile::find_page_files;
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use voltron_codegen::{Analyzer, CodegenWarning};
use voltron_schema::{check_integrity, IntegrityViolation, PageDocument, StaticRegistry};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Page file or directory to check (defaults to the configured page directory)
    pub input: Option<PathBuf>,

    /// List pages without issues too
    #[arg(short, long)]
    pub all: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

/// Problems found in one page
#[derive(Debug, Default)]
struct PageReport {
    errors: Vec<String>,
    warnings: Vec<String>,
}

pub fn check(args: CheckArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let input = match &args.input {
        Some(path) => cwd.join(path),
        None => config.page_dir(cwd),
    };
    if !input.exists() {
        return Err(anyhow!("Input path does not exist: {}", input.display()));
    }
    let registry = config.load_registry(cwd)?;

    println!("🔍 {} Voltron page check", "Starting".green().bold());
    println!("   Input: {}", input.display());
    println!();

    let pages = find_page_files(&input)?;
    let mut total_errors = 0;
    let mut total_warnings = 0;

    for page in &pages {
        let report = check_page(page, &registry);
        total_errors += report.errors.len();
        total_warnings += report.warnings.len();
        print_report(page, &report, &args)?;
    }

    println!();
    println!(
        "✨ {} Check complete!",
        if total_errors > 0 {
            "Done".red().bold()
        } else {
            "Done".green().bold()
        }
    );
    println!("   Pages checked: {}", pages.len());
    if total_errors > 0 {
        println!("   {} {}", "Errors:".red(), total_errors);
    }
    if total_warnings > 0 {
        println!("   {} {}", "Warnings:".yellow(), total_warnings);
    }
    if total_errors == 0 && total_warnings == 0 {
        println!("   {} No issues found!", "✓".green());
    }

    if total_errors > 0 {
        return Err(anyhow!("{} integrity errors", total_errors));
    }
    Ok(())
}

/// Integrity violations are errors; codegen warnings (dangling refs,
/// unknown components) are reported as warnings
fn check_page(path: &Path, registry: &StaticRegistry) -> PageReport {
    let mut report = PageReport::default();

    let document = match fs::read_to_string(path)
        .map_err(anyhow::Error::from)
        .and_then(|source| Ok(PageDocument::from_json(&source)?))
    {
        Ok(document) => document,
        Err(err) => {
            report.errors.push(format!("Failed to load: {}", err));
            return report;
        }
    };

    report.errors.extend(
        check_integrity(&document)
            .into_iter()
            .filter(|v| !matches!(v, IntegrityViolation::DanglingReference { .. }))
            .map(|v| v.to_string()),
    );

    match Analyzer::new(&document, registry).analyze(None) {
        Ok(ir) => report
            .warnings
            .extend(ir.warnings.iter().map(CodegenWarning::to_string)),
        Err(err) => report.errors.push(err.to_string()),
    }

    report
}

fn print_report(path: &Path, report: &PageReport, args: &CheckArgs) -> Result<()> {
    if args.format == "json" {
        let json = serde_json::json!({
            "page": path.display().to_string(),
            "errors": report.errors,
            "warnings": report.warnings,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    if report.errors.is_empty() && report.warnings.is_empty() {
        if args.all {
            println!("{} {}", "✓".green(), path.display());
        }
        return Ok(());
    }

    println!("{}", path.display());
    for error in &report.errors {
        println!("  {} {}", "error".red().bold(), error);
    }
    for warning in &report.warnings {
        println!("  {} {}", "warning".yellow().bold(), warning);
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAB_CASE: &str = include_str!("../../../../fixtures/tab-case.json");

    #[test]
    fn test_clean_page_has_no_issues() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("home.json");
        fs::write(&path, TAB_CASE).unwrap();

        let report = check_page(&path, &StaticRegistry::builtin().unwrap());
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_dangling_reference_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("home.json");
        let mut page = PageDocument::from_json(TAB_CASE).unwrap();
        page.nodes.remove("slot");
        fs::write(&path, page.to_json().unwrap()).unwrap();

        let report = check_page(&path, &StaticRegistry::builtin().unwrap());
        assert!(report.errors.is_empty());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_check_fails_on_broken_structure() {
        let dir = tempfile::tempdir().unwrap();
        let mut page = PageDocument::from_json(TAB_CASE).unwrap();
        if let Some(node) = page.node_mut("btn") {
            node.parent_id = Some("tabs".into());
        }
        fs::create_dir_all(dir.path().join("pages")).unwrap();
        fs::write(dir.path().join("pages/home.json"), page.to_json().unwrap()).unwrap();

        let args = CheckArgs {
            input: None,
            all: false,
            format: "text".into(),
        };
        assert!(check(args, dir.path()).is_err());
    }
}

use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::Path;
use voltron_codegen::Target;
use voltron_editor::{Document, EditSession, PageDocument, StaticRegistry};

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Target frameworks (react, vue, all)
    #[arg(short, long, default_value = "react")]
    pub target: String,

    /// Page directory
    #[arg(short, long, default_value = "pages")]
    pub page_dir: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let targets = match args.target.as_str() {
        "all" => Target::all().to_vec(),
        target => vec![target.parse::<Target>().map_err(|e| anyhow!(e))?],
    };

    println!("{}", "📝 Initializing Voltron project...".bright_blue().bold());

    let page_dir = cwd.join(&args.page_dir);
    if !page_dir.exists() {
        fs::create_dir_all(&page_dir)?;
        println!("  {} Created {}/", "✓".green(), args.page_dir);
    }

    let example_file = page_dir.join("home.json");
    if !example_file.exists() {
        fs::write(&example_file, example_page()?)?;
        println!("  {} Created home.json", "✓".green());
    }

    let config = Config {
        page_dir: args.page_dir.clone(),
        targets,
        ..Config::default()
    };
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit {}/home.json", args.page_dir);
    println!("  2. Run: voltron compile");
    println!("  3. Check output in {}/", config.out_dir);

    Ok(())
}

/// Starter page: a heading text and a primary button
fn example_page() -> Result<String> {
    let registry = StaticRegistry::builtin()?;
    let document = Document::new("home.json", PageDocument::new("home"));
    let mut session = EditSession::new(document, Box::new(registry));

    let root = session
        .document
        .page()
        .root_id()
        .ok_or_else(|| anyhow!("New page has no root"))?
        .to_string();
    session.insert_component(&root, "text", "html", None)?;
    session.insert_component(&root, "Button", "antd", None)?;

    Ok(session.document.to_json()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use voltron_schema::check_integrity;

    #[test]
    fn test_init_writes_config_and_page() {
        let dir = tempfile::tempdir().unwrap();
        let args = InitArgs {
            target: "all".into(),
            page_dir: "pages".into(),
            force: false,
        };
        init(args, dir.path()).unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.targets, vec![Target::React, Target::Vue]);

        let source = fs::read_to_string(dir.path().join("pages/home.json")).unwrap();
        let page = PageDocument::from_json(&source).unwrap();
        assert_eq!(page.nodes.len(), 3);
        assert!(check_integrity(&page).is_empty());
    }

    #[test]
    fn test_unknown_target_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let args = InitArgs {
            target: "svelte".into(),
            page_dir: "pages".into(),
            force: false,
        };
        assert!(init(args, dir.path()).is_err());
        assert!(!dir.path().join(DEFAULT_CONFIG_NAME).exists());
    }
}

//! CLI command definitions and handlers

use clap::{Args, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::core::audit::AuditLog;
use crate::core::config::AppPaths;
use crate::core::errors::TranslationError;
use crate::core::models::{is_supported_language, language_name, Mode, TranslationRequest, SUPPORTED_LANGUAGES};
use crate::core::orchestrator::{TranslationOrchestrator, TranslationOutcome};
use crate::core::settings::{SettingsStore, Theme};
use crate::core::usage::{is_metered, ThresholdStatus, UsageBand, UsageLedger, MAX_LIMIT};
use crate::providers::ProviderRegistry;

/// File extensions picked up by batch translation
const TEXT_EXTENSIONS: &[&str] = &["txt", "rpy"];

/// Commands for Quote Translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate text given inline, from a file, or from stdin
    Translate {
        /// Text to translate
        text: Option<String>,

        /// Read the text from a file instead
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Also save the translation to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        options: TranslateOptions,
    },

    /// Translate every .txt/.rpy file in a directory
    Batch {
        /// Input directory (required)
        #[arg(short, long)]
        dir: PathBuf,

        /// Output directory (default: <dir>/translated)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Recursively translate subdirectories
        #[arg(short, long)]
        recursive: bool,

        #[command(flatten)]
        options: TranslateOptions,
    },

    /// Show this month's usage of the metered provider
    Usage,

    /// Show or change saved settings
    Settings {
        /// Colour theme (dark or light)
        #[arg(long)]
        theme: Option<Theme>,

        /// Default mode (quotes or full)
        #[arg(long)]
        mode: Option<Mode>,

        /// Default engine
        #[arg(long)]
        engine: Option<String>,

        /// Track usage of the metered provider
        #[arg(long)]
        limit: Option<bool>,
    },

    /// List available translation engines
    Engines,

    /// List supported languages
    Langs,
}

/// Options shared by the translating commands
#[derive(Args, Debug, Clone)]
pub struct TranslateOptions {
    /// Source language
    #[arg(long, default_value = "en")]
    pub from: String,

    /// Target language
    #[arg(long, default_value = "ru")]
    pub to: String,

    /// Engine for this run (default: saved setting)
    #[arg(short, long)]
    pub engine: Option<String>,

    /// Mode for this run (default: saved setting)
    #[arg(short, long)]
    pub mode: Option<Mode>,

    /// Skip usage tracking for this run
    #[arg(long)]
    pub no_limit: bool,
}

impl TranslateOptions {
    fn validate(&self) -> anyhow::Result<()> {
        for code in [&self.from, &self.to] {
            if !is_supported_language(code) {
                anyhow::bail!("Unsupported language '{}'. Use `langs` to list supported codes", code);
            }
        }
        Ok(())
    }
}

/// Orchestrator wired to the files under `paths`
fn build_orchestrator(paths: &AppPaths) -> anyhow::Result<TranslationOrchestrator<ProviderRegistry>> {
    let registry = ProviderRegistry::with_defaults(paths.backend_config())?;
    Ok(TranslationOrchestrator::new(
        registry,
        UsageLedger::new(paths.usage()),
        AuditLog::new(paths.logs_dir()),
    ))
}

/// Read input the way the editor widget would hand it over: trimmed
fn read_input(text: Option<String>, file: Option<&Path>) -> anyhow::Result<String> {
    let raw = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?,
        (None, None) => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    Ok(raw.trim().to_string())
}

/// Split `content` into leading whitespace, body and trailing whitespace
fn split_padding(content: &str) -> (&str, &str, &str) {
    let body_start = content.len() - content.trim_start().len();
    let body_end = content.trim_end().len().max(body_start);
    (
        &content[..body_start],
        &content[body_start..body_end],
        &content[body_end..],
    )
}

/// Format a count with thin thousands separators, e.g. `1 800 000`
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

fn report_usage(outcome: &TranslationOutcome) {
    if let Some(usage) = &outcome.usage {
        if usage.status == ThresholdStatus::Warn {
            eprintln!(
                "⚠️  Limit nearly exhausted: {} of {} characters used this month",
                format_count(usage.record.used),
                format_count(MAX_LIMIT)
            );
        }
    }
}

/// Handle translate command
pub async fn handle_translate(
    paths: &AppPaths,
    text: Option<String>,
    file: Option<PathBuf>,
    output: Option<PathBuf>,
    options: TranslateOptions,
) -> anyhow::Result<()> {
    use tracing::{debug, info};

    options.validate()?;
    let raw_text = read_input(text, file.as_deref())?;

    let mut store = SettingsStore::open(paths.settings());
    let settings = store.get().clone();
    let engine = options.engine.clone().unwrap_or(settings.engine.clone());
    let mode = options.mode.unwrap_or(settings.mode);
    let limit_enabled = settings.limit_enabled && !options.no_limit;

    info!(
        "Translating {} -> {} with {} ({} mode)",
        language_name(&options.from).unwrap_or(options.from.as_str()),
        language_name(&options.to).unwrap_or(options.to.as_str()),
        engine,
        mode
    );

    let orchestrator = build_orchestrator(paths)?;
    let request = TranslationRequest::new(raw_text, options.from.clone(), options.to.clone())
        .with_mode(mode)
        .with_engine(engine);

    let outcome = match orchestrator.run_translation(&request, limit_enabled).await {
        Ok(outcome) => outcome,
        Err(TranslationError::EmptyInput) => {
            println!("Empty input: enter some text to translate.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if outcome.mode_changed {
        store.update(|s| s.mode = outcome.mode)?;
        println!("ℹ️  Quotes detected: switched default mode to '{}'", outcome.mode);
    }

    debug!("{} highlighted segments", outcome.result.highlight_spans.len());
    println!("{}", outcome.result.text);

    if let Some(output) = output {
        tokio::fs::write(&output, outcome.result.text.trim())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", output.display(), e))?;
        println!("\n✅ Saved to {}", output.display());
    }

    report_usage(&outcome);
    Ok(())
}

/// Collect text files under `dir`, skipping anything inside `exclude`
fn find_text_files(dir: &Path, recursive: bool, exclude: &Path) -> Vec<PathBuf> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|path| path.is_file() && !path.starts_with(exclude))
        .filter(|path| {
            path.extension()
                .map(|ext| {
                    let ext = ext.to_string_lossy().to_lowercase();
                    TEXT_EXTENSIONS.contains(&ext.as_str())
                })
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}

/// Handle batch translation command
pub async fn handle_batch(
    paths: &AppPaths,
    dir: PathBuf,
    output: Option<PathBuf>,
    recursive: bool,
    options: TranslateOptions,
) -> anyhow::Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};
    use std::time::Instant;
    use tracing::{info, warn};

    options.validate()?;
    if !dir.is_dir() {
        anyhow::bail!("{} is not a directory", dir.display());
    }

    let start_time = Instant::now();
    let output = output.unwrap_or_else(|| dir.join("translated"));

    let mut store = SettingsStore::open(paths.settings());
    let settings = store.get().clone();
    let engine = options.engine.clone().unwrap_or(settings.engine.clone());
    let mut mode = options.mode.unwrap_or(settings.mode);
    let limit_enabled = settings.limit_enabled && !options.no_limit;

    info!("Starting batch translation");
    info!("Input: {}", dir.display());
    info!("Output: {}", output.display());
    info!("Engine: {} ({} mode)", engine, mode);

    let files = find_text_files(&dir, recursive, &output);
    if files.is_empty() {
        anyhow::bail!("No .txt or .rpy files found");
    }

    let orchestrator = build_orchestrator(paths)?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("=>-"),
    );

    let mut processed = 0;
    let mut skipped = 0;
    let mut failed = 0;
    let mut mode_changed = false;
    let mut last_outcome = None;

    for file_path in files {
        pb.set_message(format!("Processing: {}", file_path.display()));

        let content = match tokio::fs::read_to_string(&file_path).await {
            Ok(content) => content,
            Err(e) => {
                failed += 1;
                warn!("Failed to read {}: {}", file_path.display(), e);
                pb.inc(1);
                continue;
            }
        };

        let (leading, body, trailing) = split_padding(&content);
        let request = TranslationRequest::new(body, options.from.clone(), options.to.clone())
            .with_mode(mode)
            .with_engine(engine.clone());

        match orchestrator.run_translation(&request, limit_enabled).await {
            Ok(outcome) => {
                if outcome.mode_changed {
                    mode = outcome.mode;
                    mode_changed = true;
                }

                let relative = file_path.strip_prefix(&dir).unwrap_or(&file_path);
                let target = output.join(relative);
                if let Some(parent) = target.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                let translated = format!("{}{}{}", leading, outcome.result.text, trailing);
                tokio::fs::write(&target, translated).await?;

                processed += 1;
                last_outcome = Some(outcome);
            }
            Err(TranslationError::EmptyInput) => {
                skipped += 1;
            }
            Err(e) => {
                failed += 1;
                pb.set_message(format!("Failed: {} - {}", file_path.display(), e));
                eprintln!("Error processing {}: {}", file_path.display(), e);
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("Completed");

    if mode_changed {
        store.update(|s| s.mode = mode)?;
    }

    let duration = start_time.elapsed();
    info!(
        "Completed: {} processed, {} skipped, {} failed in {:?}",
        processed, skipped, failed, duration
    );

    println!("\n✅ Batch translation completed!");
    println!("   Processed: {}", processed);
    println!("   Skipped (empty): {}", skipped);
    println!("   Failed: {}", failed);
    println!("   Time: {:?}", duration);

    if let Some(outcome) = last_outcome {
        report_usage(&outcome);
    }

    Ok(())
}

/// Handle usage command
pub async fn handle_usage(paths: &AppPaths) -> anyhow::Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};

    let report = UsageLedger::new(paths.usage()).report();

    let colour = match report.band {
        UsageBand::Normal => "green",
        UsageBand::Elevated => "yellow",
        UsageBand::Critical => "red",
    };
    let bar = ProgressBar::new(report.limit);
    bar.set_style(
        ProgressStyle::default_bar()
            .template(&format!("{{msg}} [{{bar:40.{}}}] {{percent}}%", colour))?
            .progress_chars("=>-"),
    );
    bar.set_position(report.used);
    bar.abandon_with_message("Usage");

    println!("Month: {}", report.month);
    println!("Used: {} / {} characters", format_count(report.used), format_count(report.limit));
    println!("Remaining: {}", format_count(report.remaining));
    println!("Percent: {:.1}%", report.percent);

    Ok(())
}

/// Handle settings command
pub async fn handle_settings(
    paths: &AppPaths,
    theme: Option<Theme>,
    mode: Option<Mode>,
    engine: Option<String>,
    limit: Option<bool>,
) -> anyhow::Result<()> {
    if let Some(engine) = &engine {
        let registry = ProviderRegistry::with_defaults(paths.backend_config())?;
        if registry.get(engine).is_none() {
            anyhow::bail!(
                "Unknown engine '{}'. Available: {}",
                engine,
                registry.ids().join(", ")
            );
        }
    }

    let mut store = SettingsStore::open(paths.settings());
    let changed = store.update(|s| {
        if let Some(theme) = theme {
            s.theme = theme;
        }
        if let Some(mode) = mode {
            s.mode = mode;
        }
        if let Some(engine) = engine {
            s.engine = engine.to_lowercase();
        }
        if let Some(limit) = limit {
            s.limit_enabled = limit;
        }
    })?;

    let settings = store.get();
    println!("Theme: {}", settings.theme);
    println!("Mode: {}", settings.mode);
    println!("Engine: {}", settings.engine);
    println!("Limit tracking: {}", if settings.limit_enabled { "on" } else { "off" });
    if changed {
        println!("\n✅ Saved to {}", store.path().display());
    }

    Ok(())
}

/// Handle engines command
pub async fn handle_engines(paths: &AppPaths) -> anyhow::Result<()> {
    let registry = ProviderRegistry::with_defaults(paths.backend_config())?;
    let current = SettingsStore::open(paths.settings()).get().engine.clone();

    for provider in registry.providers() {
        let marker = if provider.id() == current { "*" } else { " " };
        let metered = if is_metered(provider.id()) { " (metered)" } else { "" };
        println!("{} {:<10} {}{}", marker, provider.id(), provider.display_name(), metered);
    }

    Ok(())
}

/// Handle langs command
pub async fn handle_langs() -> anyhow::Result<()> {
    for (code, name) in SUPPORTED_LANGUAGES {
        println!("{}  {}", code, name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn options() -> TranslateOptions {
        TranslateOptions {
            from: "en".to_string(),
            to: "ru".to_string(),
            engine: Some("local".to_string()),
            mode: None,
            no_limit: false,
        }
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_800_000), "1 800 000");
        assert_eq!(format_count(12_345), "12 345");
    }

    #[test]
    fn test_split_padding() {
        assert_eq!(
            split_padding("  \n  e \"Hi\"\n\n"),
            ("  \n  ", "e \"Hi\"", "\n\n")
        );
        assert_eq!(split_padding("plain"), ("", "plain", ""));
        assert_eq!(split_padding("   "), ("   ", "", ""));
    }

    #[test]
    fn test_language_validation() {
        assert!(options().validate().is_ok());
        let bad = TranslateOptions {
            to: "fr".to_string(),
            ..options()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_find_text_files() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        std::fs::write(root.join("a.rpy"), "x").unwrap();
        std::fs::write(root.join("b.TXT"), "x").unwrap();
        std::fs::write(root.join("c.md"), "x").unwrap();
        std::fs::create_dir_all(root.join("sub")).unwrap();
        std::fs::write(root.join("sub/d.txt"), "x").unwrap();
        std::fs::create_dir_all(root.join("translated")).unwrap();
        std::fs::write(root.join("translated/a.rpy"), "x").unwrap();

        let out = root.join("translated");
        assert_eq!(find_text_files(root, false, &out).len(), 2);
        assert_eq!(find_text_files(root, true, &out).len(), 3);
    }

    #[tokio::test]
    async fn test_translate_switches_saved_mode_on_quotes() {
        let dir = TempDir::new().unwrap();
        let paths = AppPaths::new(dir.path());
        let mut store = SettingsStore::open(paths.settings());
        store.update(|s| s.mode = Mode::WholeText).unwrap();

        handle_translate(&paths, Some(r#"e "Hi""#.to_string()), None, None, options())
            .await
            .unwrap();

        assert_eq!(SettingsStore::open(paths.settings()).get().mode, Mode::QuotesOnly);
        assert!(paths.logs_dir().exists());
    }

    #[tokio::test]
    async fn test_translate_saves_output() {
        let dir = TempDir::new().unwrap();
        let paths = AppPaths::new(dir.path());
        let out = dir.path().join("out.rpy");

        handle_translate(&paths, Some(r#"mc "Hello""#.to_string()), None, Some(out.clone()), options())
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(out).unwrap(), r#"mc "[en→ru] Hello""#);
    }

    #[tokio::test]
    async fn test_batch_mirrors_tree() {
        let dir = TempDir::new().unwrap();
        let paths = AppPaths::new(dir.path().join("data"));
        let input = dir.path().join("game");
        std::fs::create_dir_all(input.join("chapter1")).unwrap();
        std::fs::write(input.join("intro.rpy"), "e \"Welcome\"").unwrap();
        std::fs::write(input.join("chapter1/one.rpy"), "e \"Again\"").unwrap();
        std::fs::write(input.join("empty.txt"), "   ").unwrap();

        let output = dir.path().join("out");
        handle_batch(&paths, input, Some(output.clone()), true, options())
            .await
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(output.join("chapter1/one.rpy")).unwrap(),
            "e \"[en→ru] Again\""
        );
        assert!(output.join("intro.rpy").exists());
        assert!(!output.join("empty.txt").exists());
    }

    #[tokio::test]
    async fn test_batch_keeps_indentation_and_final_newline() {
        let dir = TempDir::new().unwrap();
        let paths = AppPaths::new(dir.path().join("data"));
        let input = dir.path().join("game");
        std::fs::create_dir_all(&input).unwrap();
        std::fs::write(input.join("script.rpy"), "    e \"Hi\"\n    e \"Bye\"\n").unwrap();

        let output = dir.path().join("out");
        handle_batch(&paths, input, Some(output.clone()), false, options())
            .await
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(output.join("script.rpy")).unwrap(),
            "    e \"[en→ru] Hi\"\n    e \"[en→ru] Bye\"\n"
        );
    }

    #[tokio::test]
    async fn test_settings_rejects_unknown_engine() {
        let dir = TempDir::new().unwrap();
        let paths = AppPaths::new(dir.path());
        let result = handle_settings(&paths, None, None, Some("babelfish".to_string()), None).await;
        assert!(result.is_err());
        assert!(!paths.settings().exists());
    }

    #[tokio::test]
    async fn test_settings_updates_file() {
        let dir = TempDir::new().unwrap();
        let paths = AppPaths::new(dir.path());
        handle_settings(&paths, Some(Theme::Light), None, Some("DeepL".to_string()), Some(false))
            .await
            .unwrap();

        let settings = SettingsStore::open(paths.settings()).get().clone();
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.engine, "deepl");
        assert!(!settings.limit_enabled);
    }
}

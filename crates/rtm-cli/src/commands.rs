use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, bail, Context};
use colored::Colorize;
use rtm_diff::{InlineSegment, RedlineResult};
use rtm_versioning::{
    ChangeType, EntityFields, EntityKey, EntityKind, FileVersionStore, RequirementFields,
    TestCaseFields, UserId, VersionNumber, VersionStore, VersionedSnapshot, VersioningConfig,
    VersioningService,
};

use crate::cli::*;

type Service = VersioningService<FileVersionStore>;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => VersioningConfig::load(path)?,
        None => VersioningConfig::default(),
    };
    if let Some(log) = cli.log {
        config.log_path = log;
    }

    let store = FileVersionStore::open(&config.log_path, config.sync_mode.clone())
        .with_context(|| format!("opening version log {}", config.log_path.display()))?;
    let service = VersioningService::with_config(store, config);

    match cli.command {
        Command::Record(args) => cmd_record(&service, args, &cli.format).await,
        Command::Redline(args) => cmd_redline(&service, args, &cli.format).await,
        Command::History(args) => cmd_history(&service, args, &cli.format).await,
        Command::Verify(args) => cmd_verify(&service, args, &cli.format).await,
    }
}

async fn cmd_record(service: &Service, args: RecordArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let text = read_input(&args.fields)?;
    let fields = parse_fields(args.key.kind, &text)?;
    let snapshot = service
        .record_version_with_retry(args.key, fields, UserId::new(args.user))
        .await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshot)?),
        OutputFormat::Text => println!(
            "{} Recorded {} version {}",
            "✓".green().bold(),
            snapshot.key.to_string().yellow(),
            snapshot.version.to_string().bold()
        ),
    }
    Ok(())
}

async fn cmd_redline(service: &Service, args: RedlineArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let key = args.key;
    let result = match args.from {
        Some(from) => {
            let to = match args.to {
                Some(to) => VersionNumber::new(to)?,
                None => service
                    .latest(key)
                    .await?
                    .map(|s| s.version)
                    .ok_or_else(|| anyhow!("{key} has no versions"))?,
            };
            service.get_redline(key, VersionNumber::new(from)?, to).await?
        }
        None => match service.redline_latest(key).await? {
            Some(result) => result,
            None => {
                println!("{key} has fewer than two versions.");
                return Ok(());
            }
        },
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => {
            for line in render_redline(key, &result, args.inline) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

async fn cmd_history(service: &Service, args: HistoryArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let history = service.history(args.key).await?;
    let skip = args
        .limit
        .map_or(0, |limit| history.len().saturating_sub(limit));
    let shown = &history[skip..];

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(shown)?),
        OutputFormat::Text => {
            if shown.is_empty() {
                println!("No versions recorded for {}.", args.key);
            }
            for snapshot in shown.iter().rev() {
                println!("{}", render_history_line(snapshot));
            }
        }
    }
    Ok(())
}

async fn cmd_verify(service: &Service, args: VerifyArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let keys = match args.key {
        Some(key) => vec![key],
        None => service.store().keys().await?,
    };

    let mut failed = 0usize;
    let mut summaries = Vec::new();
    for key in keys {
        let report = service.validate_history(key).await?;
        if !report.is_valid() {
            failed += 1;
        }
        match format {
            OutputFormat::Json => summaries.push(serde_json::json!({
                "key": key.to_string(),
                "versions": report.version_count,
                "valid": report.is_valid(),
                "violations": report
                    .violations
                    .iter()
                    .map(|v| v.description.clone())
                    .collect::<Vec<_>>(),
            })),
            OutputFormat::Text => {
                if report.is_valid() {
                    println!(
                        "{} {} ({} versions)",
                        "✓".green().bold(),
                        key.to_string().yellow(),
                        report.version_count
                    );
                } else {
                    println!("{} {}", "✗".red().bold(), key.to_string().yellow());
                    for violation in &report.violations {
                        println!(
                            "  {} #{}: {}",
                            format!("{:?}", violation.kind).red(),
                            violation.position,
                            violation.description
                        );
                    }
                }
            }
        }
    }

    if *format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    }
    if failed > 0 {
        bail!("{failed} version histories failed verification");
    }
    Ok(())
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }
}

/// Parse the JSON field set matching `kind`.
fn parse_fields(kind: EntityKind, text: &str) -> anyhow::Result<EntityFields> {
    let fields = match kind {
        EntityKind::Requirement => {
            EntityFields::from(serde_json::from_str::<RequirementFields>(text)?)
        }
        EntityKind::TestCase => EntityFields::from(serde_json::from_str::<TestCaseFields>(text)?),
    };
    Ok(fields)
}

fn render_redline(key: EntityKey, result: &RedlineResult, inline: bool) -> Vec<String> {
    let mut lines = vec![format!(
        "Redline {} v{} → v{} ({} {})",
        key.to_string().yellow().bold(),
        result.old_version,
        result.new_version,
        result.len(),
        if result.len() == 1 { "change" } else { "changes" }
    )];
    if result.is_empty() {
        lines.push("  No changes.".dimmed().to_string());
    }

    for change in &result.changes {
        let old = change.old_value.as_deref().unwrap_or("");
        let new = change.new_value.as_deref().unwrap_or("");
        let line = match change.change_type {
            ChangeType::Added => format!("  {} {}: {}", "+".green().bold(), change.field.bold(), new.green()),
            ChangeType::Removed => format!("  {} {}: {}", "-".red().bold(), change.field.bold(), old.red()),
            ChangeType::Modified => format!(
                "  {} {}: {} → {}",
                "~".yellow().bold(),
                change.field.bold(),
                old.red(),
                new.green()
            ),
        };
        lines.push(line);

        if let Some(redline) = change.inline().filter(|_| inline) {
            let rendered: String = redline
                .segments
                .iter()
                .map(|segment| match segment {
                    InlineSegment::Equal(t) => t.normal().to_string(),
                    InlineSegment::Inserted(t) => t.green().underline().to_string(),
                    InlineSegment::Deleted(t) => t.red().strikethrough().to_string(),
                })
                .collect();
            lines.push(format!("      {rendered}"));
        }
    }
    lines
}

fn render_history_line(snapshot: &VersionedSnapshot) -> String {
    format!(
        "{}  {}  {}  {}",
        format!("v{}", snapshot.version).yellow().bold(),
        snapshot.modified_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
        snapshot.modified_by.as_str().cyan(),
        snapshot.fields.title()
    )
}

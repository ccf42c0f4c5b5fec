use anyhow::Context;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use apteczka_core::constants::DEFAULT_DATA_DIR_NAME;
use apteczka_core::payload::{decode_payload, export_backup, parse_payload, validate_payload};
use apteczka_core::vocabulary::{is_known_tag, TAG_CATEGORIES};
use apteczka_core::{
    find_duplicates, remove_record, CollectionStore, CoreConfig, DuplicateAction,
    DuplicateDecisions, DuplicateMatch, ImportPayload, ImportService, JsonFileStore,
    MedicineRecord,
};
use apteczka_types::{NonEmptyText, RecordId};

#[derive(Parser)]
#[command(name = "apteczka")]
#[command(about = "Personal medicine-cabinet tracker")]
struct Cli {
    /// Data directory holding the collection (defaults to APTECZKA_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the stored collection
    List,
    /// Preview name collisions between a payload and the collection
    Duplicates {
        /// Payload file (import or backup format)
        file: PathBuf,
    },
    /// Import a payload, resolving duplicates per the given decisions
    Import {
        /// Payload file (import or backup format)
        file: PathBuf,
        /// Per-name decision, e.g. --decision "apap=replace"; names without
        /// a decision default to add
        #[arg(long = "decision", value_name = "NAME=ACTION")]
        decisions: Vec<String>,
    },
    /// Export the collection as a backup payload
    Export {
        /// Destination file
        file: PathBuf,
    },
    /// Delete a record by id
    Delete {
        /// Record id
        id: String,
    },
    /// Print the controlled tag vocabulary
    Vocabulary,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("apteczka=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = resolve_config(cli.data_dir)?;

    match cli.command {
        Commands::List => list(&config),
        Commands::Duplicates { file } => duplicates(&config, &file),
        Commands::Import { file, decisions } => import(&config, &file, &decisions),
        Commands::Export { file } => export(&config, &file),
        Commands::Delete { id } => delete(&config, &id),
        Commands::Vocabulary => {
            vocabulary();
            Ok(())
        }
    }
}

fn resolve_config(flag: Option<PathBuf>) -> anyhow::Result<CoreConfig> {
    let data_dir = flag
        .or_else(|| std::env::var("APTECZKA_DATA_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR_NAME));
    CoreConfig::new(data_dir).context("invalid data directory")
}

fn list(config: &CoreConfig) -> anyhow::Result<()> {
    let store = JsonFileStore::new(config);
    let records = store.load();
    if records.is_empty() {
        println!("The cabinet is empty.");
        return Ok(());
    }
    for record in &records {
        print_record(record);
    }
    println!("{} record(s).", records.len());
    Ok(())
}

fn print_record(record: &MedicineRecord) {
    println!(
        "{}  {}  [{}]  added {}",
        record.id,
        record.name.as_deref().unwrap_or("(unnamed)"),
        record.tags.join(", "),
        record.date_added.format("%Y-%m-%d")
    );
}

fn print_matches(matches: &[DuplicateMatch]) {
    for duplicate in matches {
        println!(
            "{} already exists (id {})",
            duplicate.name, duplicate.existing_id
        );
    }
}

fn duplicates(config: &CoreConfig, file: &PathBuf) -> anyhow::Result<()> {
    let raw = fs::read_to_string(file)
        .with_context(|| format!("failed to read payload {}", file.display()))?;
    let payload = parse_payload(&raw)?;

    let store = JsonFileStore::new(config);
    let existing = store.load();
    let matches = match &payload {
        ImportPayload::Fresh(drafts) => find_duplicates(drafts, &existing),
        ImportPayload::Backup(drafts) => find_duplicates(drafts, &existing),
    };

    if matches.is_empty() {
        println!("No duplicates: {} candidate(s), all new.", payload.len());
    } else {
        print_matches(&matches);
    }
    Ok(())
}

fn parse_decision(spec: &str) -> anyhow::Result<(NonEmptyText, DuplicateAction)> {
    let (name, action) = spec
        .split_once('=')
        .with_context(|| format!("decision '{spec}' must have the form NAME=ACTION"))?;
    let name = NonEmptyText::new(name)
        .with_context(|| format!("decision '{spec}' has an empty name"))?;
    let action = action
        .parse::<DuplicateAction>()
        .map_err(anyhow::Error::msg)?;
    Ok((name, action))
}

fn import(config: &CoreConfig, file: &PathBuf, decision_specs: &[String]) -> anyhow::Result<()> {
    let raw = fs::read_to_string(file)
        .with_context(|| format!("failed to read payload {}", file.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw).context("payload is not valid JSON")?;

    let issues = validate_payload(&value);
    if !issues.is_empty() {
        for issue in &issues {
            eprintln!("  - {issue}");
        }
        anyhow::bail!("payload failed validation with {} issue(s)", issues.len());
    }

    let mut decisions = DuplicateDecisions::new();
    for spec in decision_specs {
        let (name, action) = parse_decision(spec)?;
        decisions.set(name.as_str(), action);
    }

    let payload = decode_payload(value)?;
    let store = JsonFileStore::new(config);
    let existing = store.load();
    let service = ImportService::new(store);

    let outcome = match &payload {
        ImportPayload::Fresh(drafts) => {
            service.import_with_duplicate_handling(drafts, existing, &decisions)
        }
        ImportPayload::Backup(drafts) => service.import_backup(drafts, existing, &decisions),
    };

    for record in &outcome.inserted {
        for tag in &record.tags {
            if !is_known_tag(tag) {
                tracing::debug!(tag = %tag, "tag outside the controlled vocabulary");
            }
        }
    }

    println!(
        "Imported {} new record(s); collection now holds {}.",
        outcome.inserted.len(),
        outcome.collection.len()
    );
    Ok(())
}

fn export(config: &CoreConfig, file: &PathBuf) -> anyhow::Result<()> {
    let store = JsonFileStore::new(config);
    let records = store.load();
    let raw = export_backup(&records)?;
    fs::write(file, raw).with_context(|| format!("failed to write {}", file.display()))?;
    println!("Exported {} record(s) to {}.", records.len(), file.display());
    Ok(())
}

fn delete(config: &CoreConfig, id: &str) -> anyhow::Result<()> {
    let id = RecordId::parse(id).context("invalid record id")?;
    let store = JsonFileStore::new(config);
    let records = store.load();
    let before = records.len();
    let remaining = remove_record(records, &id);
    if remaining.len() == before {
        anyhow::bail!("no record with id {id}");
    }
    store.save(&remaining);
    println!("Deleted {id}.");
    Ok(())
}

fn vocabulary() {
    for category in TAG_CATEGORIES {
        println!("{}:", category.name);
        for tag in category.tags {
            println!("  {tag}");
        }
    }
}

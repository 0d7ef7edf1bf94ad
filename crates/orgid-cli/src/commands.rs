use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use colored::Colorize;
use orgid_content::{
    extract_profile, ContentFetcher, ContentResolver, DirectoryContentFetcher, IpfsGatewayFetcher,
    Profile,
};
use orgid_indexer::{Indexer, IndexerConfig, ReplayReport};
use orgid_ledger::InMemoryRegistry;
use orgid_store::{EntityKind, InMemoryEntityStore, OrganizationType};
use orgid_types::{ContentId, JsonHash};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::*;
use crate::fixture::Fixture;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Replay(args) => cmd_replay(args, cli.verbose, cli.format).await,
        Command::Cid(args) => {
            init_tracing("warn", cli.verbose);
            cmd_cid(args, cli.format)
        }
        Command::Profile(args) => {
            init_tracing("warn", cli.verbose);
            cmd_profile(args, cli.format)
        }
    }
}

fn init_tracing(default_filter: &str, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn cmd_replay(args: ReplayArgs, verbose: bool, format: OutputFormat) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => IndexerConfig::load(path)?,
        None => IndexerConfig::default(),
    };
    init_tracing(&config.log_filter, verbose);

    let fixture = Fixture::load(&args.fixture)?;
    info!(
        fixture = %args.fixture.display(),
        events = fixture.events.len(),
        documents = fixture.documents.len(),
        "fixture loaded"
    );
    let registry = fixture.registry();
    let output = args.output.as_deref();

    if let Some(dir) = &args.documents {
        let fetcher = DirectoryContentFetcher::new(dir);
        replay_with(config, registry, fetcher, &fixture, output, format).await
    } else if args.gateway {
        let fetcher = IpfsGatewayFetcher::new(config.content.clone())?;
        replay_with(config, registry, fetcher, &fixture, output, format).await
    } else {
        let fetcher = fixture.document_fetcher()?;
        replay_with(config, registry, fetcher, &fixture, output, format).await
    }
}

async fn replay_with<F: ContentFetcher>(
    config: IndexerConfig,
    registry: InMemoryRegistry,
    fetcher: F,
    fixture: &Fixture,
    output: Option<&Path>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut indexer = Indexer::new(
        config,
        InMemoryEntityStore::new(),
        registry,
        ContentResolver::new(fetcher),
    );
    let report = indexer.replay(&fixture.events).await?;
    let store = indexer.store();

    if let Some(path) = output {
        store
            .save_snapshot(path)
            .with_context(|| format!("cannot write snapshot {}", path.display()))?;
    }

    match format {
        OutputFormat::Json => {
            let entities: serde_json::Map<String, serde_json::Value> = EntityKind::ALL
                .iter()
                .map(|kind| (kind.to_string(), store.count(*kind).into()))
                .collect();
            let summary = serde_json::json!({ "report": report, "entities": entities });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Text => print_report(&report, store, output),
    }
    Ok(())
}

fn print_report(report: &ReplayReport, store: &InMemoryEntityStore, output: Option<&Path>) {
    println!(
        "{} Replayed {} events: {} applied, {} skipped",
        "✓".green().bold(),
        report.total().to_string().bold(),
        report.applied.to_string().green(),
        report.skipped.to_string().yellow(),
    );
    if report.redelivered > 0 {
        println!("  Redelivered: {}", report.redelivered.to_string().yellow());
    }
    for kind in EntityKind::ALL {
        println!("  {:<34} {}", kind.to_string(), store.count(kind));
    }
    if let Some(path) = output {
        println!("  Snapshot: {}", path.display().to_string().cyan());
    }
}

fn cmd_cid(args: CidArgs, format: OutputFormat) -> anyhow::Result<()> {
    let hash = JsonHash::from_str(&args.hash)
        .with_context(|| format!("invalid document hash {}", args.hash))?;
    let cid = ContentId::from_hash(&hash);
    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "hash": hash, "cid": cid })),
        OutputFormat::Text => println!("{}", cid),
    }
    Ok(())
}

fn cmd_profile(args: ProfileArgs, format: OutputFormat) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.path)
        .with_context(|| format!("cannot read {}", args.path.display()))?;
    let kind = match args.kind {
        ProfileKind::LegalEntity => OrganizationType::LegalEntity,
        ProfileKind::Unit => OrganizationType::OrganizationalUnit,
    };
    let document = match extract_profile(&bytes, kind) {
        Ok(document) => document,
        Err(e) => {
            println!("{} {}", "✗".red().bold(), e);
            anyhow::bail!("{} rejected", args.path.display());
        }
    };

    match format {
        OutputFormat::Json => {
            let value = match &document.profile {
                Profile::LegalEntity(le) => serde_json::to_value(le)?,
                Profile::OrganizationalUnit(unit) => serde_json::to_value(unit)?,
            };
            let summary = serde_json::json!({ "profile": value, "address": document.address });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Text => {
            println!(
                "{} {} {}",
                "✓".green().bold(),
                document.profile.kind(),
                document.profile.did().cyan()
            );
            match &document.profile {
                Profile::LegalEntity(le) => {
                    println!("  Legal name: {}", le.legal_name.as_deref().unwrap_or("-"));
                    println!("  Legal type: {}", le.legal_type.as_deref().unwrap_or("-"));
                }
                Profile::OrganizationalUnit(unit) => {
                    println!("  Name: {}", unit.name.as_deref().unwrap_or("-"));
                    println!("  Types: {}", unit.unit_type.join(", "));
                }
            }
            if let Some(country) = document.address.as_ref().and_then(|a| a.country.as_deref()) {
                println!("  Country: {}", country.yellow());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use orgid_store::{EntityRepository, Organization};
    use orgid_types::OrgId;

    use super::*;

    fn fixture() -> Fixture {
        Fixture::from_json(include_str!("../../../demos/acme.fixture.json")).unwrap()
    }

    #[tokio::test]
    async fn demo_fixture_replays() {
        let fixture = fixture();
        let mut indexer = Indexer::new(
            IndexerConfig::default(),
            InMemoryEntityStore::new(),
            fixture.registry(),
            ContentResolver::new(fixture.document_fetcher().unwrap()),
        );
        let report = indexer.replay(&fixture.events).await.unwrap();
        assert_eq!(report.total(), fixture.events.len());
        assert_eq!(report.skipped, 1);

        let org = indexer
            .store()
            .load::<Organization>(&Organization::key(&OrgId::from_bytes([0xaa; 32])))
            .unwrap()
            .unwrap();
        assert_eq!(org.profile().map(|p| p.did()), Some("did:orgid:0xaaaa"));
        assert_eq!(indexer.store().count(EntityKind::RegisteredDirectoryOrganization), 1);
        assert_eq!(indexer.store().count(EntityKind::RequestedDirectoryOrganization), 1);
    }

    #[tokio::test]
    async fn snapshot_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        let fixture = fixture();
        replay_with(
            IndexerConfig::default(),
            fixture.registry(),
            fixture.document_fetcher().unwrap(),
            &fixture,
            Some(&path),
            OutputFormat::Json,
        )
        .await
        .unwrap();
        let restored = InMemoryEntityStore::load_snapshot(&path).unwrap();
        assert_eq!(restored.count(EntityKind::Organization), 2);
    }

    #[test]
    fn cid_rejects_bad_hash() {
        let err = cmd_cid(CidArgs { hash: "0x1234".into() }, OutputFormat::Text).unwrap_err();
        assert!(err.to_string().contains("invalid document hash"));
    }
}

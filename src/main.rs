use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use doi_identity::authors::{author_list_text, ListOptions, ListStyle};
use doi_identity::identity::{single_lookup, LookupBy, MemoryStore};
use doi_identity::record::BiblioRecord;
use doi_identity::remote::{PubMed, Registries, CROSSREF_URL, DATACITE_URL, PUBMED_URL};
use doi_identity::{batch, cite, sync, Org};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "doi-identity")]
#[command(about = "Normalize Crossref/DataCite records and resolve authors against the identity registry")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve authors in local .jsonl.gz record dumps
    Batch(batch::BatchArgs),
    /// Fetch DOIs from the citation registries and resolve their authors
    Sync(sync::SyncArgs),
    /// Print a short citation for a DOI
    Cite(CiteArgs),
    /// Print the author list for a DOI
    Authors(AuthorsArgs),
    /// Look up a single identity record in a snapshot
    Lookup(LookupArgs),
}

#[derive(Args)]
struct CiteArgs {
    /// DOI to cite
    doi: String,

    /// Include title and journal
    #[arg(short, long)]
    expanded: bool,

    /// Crossref API base URL
    #[arg(long, default_value = CROSSREF_URL)]
    crossref_url: String,

    /// DataCite API base URL
    #[arg(long, default_value = DATACITE_URL)]
    datacite_url: String,

    /// PubMed id conversion base URL
    #[arg(long, default_value = PUBMED_URL)]
    pubmed_url: String,

    /// Request timeout in seconds
    #[arg(short, long, default_value = "30")]
    timeout: u64,
}

#[derive(Args)]
struct AuthorsArgs {
    /// DOI to list authors for
    doi: String,

    /// Author list style
    #[arg(long, value_enum, default_value = "dis")]
    style: ListStyle,

    /// Wrap authors carrying an ORCID in link markup
    #[arg(long)]
    orcid_links: bool,

    /// Crossref API base URL
    #[arg(long, default_value = CROSSREF_URL)]
    crossref_url: String,

    /// DataCite API base URL
    #[arg(long, default_value = DATACITE_URL)]
    datacite_url: String,

    /// Request timeout in seconds
    #[arg(short, long, default_value = "30")]
    timeout: u64,
}

#[derive(Args)]
struct LookupArgs {
    /// ORCID or employee id to look up
    val: String,

    /// Identifier kind to look up by
    #[arg(long, value_enum, default_value = "orcid")]
    by: LookupBy,

    /// Identity registry snapshot (JSONL, one record per line)
    #[arg(short, long)]
    snapshot: PathBuf,
}

fn run_cite(args: CiteArgs) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let registries = Registries::new(args.crossref_url, args.datacite_url, 1, args.timeout);
        let pubmed = PubMed::new(args.pubmed_url, args.timeout);
        let org = Org::default();
        match cite::short_citation(&args.doi, args.expanded, &registries, &pubmed, &org).await? {
            Some(citation) => println!("{citation}"),
            None => println!("No citation available for {}", args.doi),
        }
        Ok(())
    })
}

fn run_authors(args: AuthorsArgs) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let registries = Registries::new(args.crossref_url, args.datacite_url, 1, args.timeout);
        let fetched = if cite::is_datacite(&args.doi) {
            registries.fetch_datacite(&args.doi).await?
        } else {
            registries.fetch_crossref(&args.doi).await?
        };
        let Some(value) = fetched else {
            println!("No record found for {}", args.doi);
            return Ok(());
        };
        let record = BiblioRecord::new(value);
        let opts = ListOptions {
            style: args.style,
            orcid_links: args.orcid_links,
            projects: None,
        };
        match author_list_text(&record, &opts, &Org::default()) {
            Some(text) => println!("{text}"),
            None => println!("No authors found for {}", args.doi),
        }
        Ok(())
    })
}

fn run_lookup(args: LookupArgs) -> Result<()> {
    let store = MemoryStore::load_jsonl(&args.snapshot)?;
    match single_lookup(&args.val, args.by, &store)? {
        Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
        None => println!("No identity record for {}", args.val),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }

    match cli.command {
        Commands::Batch(args) => batch::run(args),
        Commands::Sync(args) => sync::run(args),
        Commands::Cite(args) => run_cite(args),
        Commands::Authors(args) => run_authors(args),
        Commands::Lookup(args) => run_lookup(args),
    }
}

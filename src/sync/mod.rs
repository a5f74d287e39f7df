use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

mod checkpoint;
pub use checkpoint::Checkpoint;

use crate::authors::build_author_details;
use crate::cite::is_datacite;
use crate::hash_key;
use crate::identity::MemoryStore;
use crate::record::BiblioRecord;
use crate::remote::{Registries, CROSSREF_URL, DATACITE_URL};
use crate::{Org, ResolvedAuthor};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncedRecord {
    pub doi: String,
    pub authors: Vec<ResolvedAuthor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncFailed {
    pub doi: String,
    pub error: String,
}

#[derive(Args)]
pub struct SyncArgs {
    /// File of DOIs to fetch, one per line
    #[arg(short, long)]
    pub dois: PathBuf,

    /// Identity registry snapshot (JSONL, one record per line)
    #[arg(short, long)]
    pub snapshot: PathBuf,

    /// Working directory for output files
    #[arg(short, long)]
    pub output: PathBuf,

    /// Crossref API base URL
    #[arg(long, default_value = CROSSREF_URL)]
    pub crossref_url: String,

    /// DataCite API base URL
    #[arg(long, default_value = DATACITE_URL)]
    pub datacite_url: String,

    /// Organization name matched in asserted affiliations
    #[arg(long, default_value = "Janelia")]
    pub org_name: String,

    /// Concurrent requests
    #[arg(short, long, default_value = "20")]
    pub concurrency: usize,

    /// Request timeout in seconds
    #[arg(short, long, default_value = "30")]
    pub timeout: u64,

    /// Resume from checkpoint
    #[arg(short, long)]
    pub resume: bool,
}

pub fn run(args: SyncArgs) -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_async(args))
}

pub async fn run_async(args: SyncArgs) -> Result<()> {
    fs::create_dir_all(&args.output).context("Failed to create output directory")?;

    let dois: Vec<String> = fs::read_to_string(&args.dois)
        .with_context(|| format!("Failed to read {}", args.dois.display()))?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();
    info!("Loaded {} DOIs", dois.len());

    let store = Arc::new(MemoryStore::load_jsonl(&args.snapshot).with_context(|| {
        format!("Failed to load identity snapshot {}", args.snapshot.display())
    })?);
    info!("Loaded {} identity records", store.len());

    let org = Org {
        name: args.org_name.clone(),
        ..Org::default()
    };

    let checkpoint_path = args.output.join("sync.checkpoint");
    let checkpoint =
        Checkpoint::open(&checkpoint_path, args.resume).context("Failed to load checkpoint")?;

    let to_process: Vec<(String, String)> = dois
        .into_iter()
        .map(|doi| {
            let key = hash_key(&doi);
            (doi, key)
        })
        .filter(|(_, key)| !checkpoint.contains(key))
        .collect();

    let total = to_process.len();
    let already_processed = checkpoint.len();

    if already_processed > 0 {
        info!(
            "Resuming: {} already processed, {} remaining",
            already_processed, total
        );
    }

    if total == 0 {
        info!("No DOIs to process");
        return Ok(());
    }

    let resolved_path = args.output.join("resolved.jsonl");
    let failed_path = args.output.join("failed.jsonl");

    let resolved_file = if args.resume && resolved_path.exists() {
        fs::OpenOptions::new()
            .append(true)
            .open(&resolved_path)
            .context("Failed to open resolved file for append")?
    } else {
        File::create(&resolved_path).context("Failed to create resolved file")?
    };

    let failed_file = if args.resume && failed_path.exists() {
        fs::OpenOptions::new()
            .append(true)
            .open(&failed_path)
            .context("Failed to open failed file for append")?
    } else {
        File::create(&failed_path).context("Failed to create failed file")?
    };

    let resolved_writer = Arc::new(Mutex::new(BufWriter::new(resolved_file)));
    let failed_writer = Arc::new(Mutex::new(BufWriter::new(failed_file)));
    let checkpoint = Arc::new(Mutex::new(checkpoint));

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );

    let client = Arc::new(Registries::new(
        args.crossref_url.clone(),
        args.datacite_url.clone(),
        args.concurrency,
        args.timeout,
    ));

    let mut handles = Vec::with_capacity(total);

    for (doi, key) in to_process {
        let client = Arc::clone(&client);
        let store = Arc::clone(&store);
        let resolved_writer = Arc::clone(&resolved_writer);
        let failed_writer = Arc::clone(&failed_writer);
        let checkpoint = Arc::clone(&checkpoint);
        let org = org.clone();
        let pb = pb.clone();

        let handle = tokio::spawn(async move {
            let fetched = if is_datacite(&doi) {
                client.fetch_datacite(&doi).await
            } else {
                client.fetch_crossref(&doi).await
            };

            let outcome: std::result::Result<SyncedRecord, String> = match fetched {
                Ok(Some(value)) => {
                    let record = BiblioRecord::new(value);
                    match build_author_details(&record, Some(store.as_ref()), &org) {
                        Ok(Some(authors)) => Ok(SyncedRecord {
                            doi: doi.clone(),
                            authors,
                        }),
                        Ok(None) => Err("No authors found".to_string()),
                        Err(err) => Err(err.to_string()),
                    }
                }
                Ok(None) => Err("No record found".to_string()),
                Err(err) => Err(err.to_string()),
            };

            match outcome {
                Ok(synced) => {
                    let mut writer = resolved_writer.lock().await;
                    if let Err(e) =
                        writeln!(writer, "{}", serde_json::to_string(&synced).unwrap())
                    {
                        error!("Failed to write resolved record: {}", e);
                    }
                }
                Err(reason) => {
                    let failed = SyncFailed {
                        doi: doi.clone(),
                        error: reason,
                    };
                    let mut writer = failed_writer.lock().await;
                    if let Err(e) =
                        writeln!(writer, "{}", serde_json::to_string(&failed).unwrap())
                    {
                        error!("Failed to write failure: {}", e);
                    }
                }
            }

            {
                let mut cp = checkpoint.lock().await;
                cp.mark(&key);
            }

            pb.inc(1);
        });

        handles.push(handle);
    }

    for handle in handles {
        if let Err(e) = handle.await {
            error!("Task failed: {}", e);
        }
    }

    pb.finish_with_message("Done");

    {
        let mut writer = resolved_writer.lock().await;
        writer.flush().context("Failed to flush resolved file")?;
    }
    {
        let mut writer = failed_writer.lock().await;
        writer.flush().context("Failed to flush failed file")?;
    }
    {
        let cp = checkpoint.lock().await;
        cp.save().context("Failed to save checkpoint")?;
    }

    info!("Sync complete");

    Ok(())
}

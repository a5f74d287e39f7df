use anyhow::{Context, Result};
use clap::Args;
use crossbeam_channel::bounded;
use flate2::read::GzDecoder;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{error, info};

use crate::authors::build_author_details;
use crate::identity::MemoryStore;
use crate::record::BiblioRecord;
use crate::{Org, ResolvedAuthorRecord};

#[derive(Args)]
pub struct BatchArgs {
    /// Directory containing .jsonl.gz record dumps
    #[arg(short, long)]
    pub input: PathBuf,

    /// Identity registry snapshot (JSONL, one record per line)
    #[arg(short, long)]
    pub snapshot: PathBuf,

    /// Working directory for output files
    #[arg(short, long)]
    pub output: PathBuf,

    /// Organization name matched in asserted affiliations
    #[arg(long, default_value = "Janelia")]
    pub org_name: String,

    /// Number of threads (0 = auto)
    #[arg(short, long, default_value = "0")]
    pub threads: usize,

    /// Records per batch
    #[arg(short, long, default_value = "5000")]
    pub batch_size: usize,
}

pub fn find_dump_files<P: AsRef<Path>>(directory: P) -> Result<Vec<PathBuf>> {
    let pattern = directory.as_ref().join("**/*.jsonl.gz");
    let pattern_str = pattern.to_string_lossy();
    Ok(glob(&pattern_str)?.filter_map(std::result::Result::ok).collect())
}

fn process_file(
    filepath: &Path,
    store: &MemoryStore,
    org: &Org,
    unmatched: &Mutex<BTreeSet<String>>,
    tx: &crossbeam_channel::Sender<Vec<ResolvedAuthorRecord>>,
    batch_size: usize,
) -> Result<()> {
    let file =
        File::open(filepath).with_context(|| format!("Failed to open {}", filepath.display()))?;
    let decoder = GzDecoder::new(file);
    let reader = BufReader::new(decoder);

    let mut batch = Vec::with_capacity(batch_size);

    for line in reader.lines() {
        let line_str = line?;
        if line_str.trim().is_empty() {
            continue;
        }
        let Ok(value) = serde_json::from_str::<Value>(&line_str) else {
            continue;
        };
        let record = BiblioRecord::new(value);
        let Some(doi) = record.doi().map(String::from) else {
            continue;
        };

        let authors = match build_author_details(&record, Some(store), org) {
            Ok(Some(authors)) => authors,
            Ok(None) => continue,
            Err(err) => {
                error!("Skipping record {}: {}", doi, err);
                continue;
            }
        };

        {
            let mut unknown = unmatched.lock().unwrap();
            for author in &authors {
                if !author.in_database {
                    if let Some(family) = &author.family {
                        unknown.insert(format!("{} {family}", author.given).trim().to_string());
                    }
                }
            }
        }

        for (author_idx, author) in authors.into_iter().enumerate() {
            batch.push(ResolvedAuthorRecord {
                doi: doi.clone(),
                author_idx,
                author,
            });
        }

        if batch.len() >= batch_size && tx.send(std::mem::take(&mut batch)).is_err() {
            break;
        }
    }

    if !batch.is_empty() {
        let _ = tx.send(batch);
    }

    Ok(())
}

pub fn run(args: BatchArgs) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("doi_identity=info".parse().unwrap()),
        )
        .try_init()
        .ok();

    fs::create_dir_all(&args.output)?;

    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        num_cpus::get()
    };
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .ok();
    info!("Using {} threads", num_threads);

    let store = Arc::new(MemoryStore::load_jsonl(&args.snapshot).with_context(|| {
        format!("Failed to load identity snapshot {}", args.snapshot.display())
    })?);
    info!("Loaded {} identity records", store.len());

    let org = Org {
        name: args.org_name.clone(),
        ..Org::default()
    };

    let files = find_dump_files(&args.input)?;
    info!("Found {} files to process", files.len());
    if files.is_empty() {
        return Ok(());
    }

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let unmatched: Arc<Mutex<BTreeSet<String>>> = Arc::new(Mutex::new(BTreeSet::new()));
    let (tx, rx) = bounded::<Vec<ResolvedAuthorRecord>>(num_threads * 4);

    let output_path = args.output.join("resolved_authors.jsonl");
    let writer_handle = std::thread::spawn(move || -> Result<()> {
        let file = File::create(&output_path)?;
        let mut writer = BufWriter::new(file);

        while let Ok(batch) = rx.recv() {
            for record in batch {
                serde_json::to_writer(&mut writer, &record)?;
                writer.write_all(b"\n")?;
            }
        }

        writer.flush()?;
        Ok(())
    });

    let unmatched_ref = Arc::clone(&unmatched);
    let store_ref = Arc::clone(&store);
    files.par_iter().for_each_with(tx.clone(), |tx, filepath| {
        if let Err(e) = process_file(filepath, &store_ref, &org, &unmatched_ref, tx, args.batch_size)
        {
            error!("Error processing {}: {}", filepath.display(), e);
        }
        progress.inc(1);
    });

    drop(tx);
    writer_handle.join().unwrap()?;
    progress.finish();

    let unknown = unmatched.lock().unwrap();
    let names: Vec<&String> = unknown.iter().collect();
    let unmatched_path = args.output.join("unmatched_authors.json");
    let file = File::create(&unmatched_path)?;
    serde_json::to_writer(file, &names)?;

    info!("{} authors not found in the identity registry", names.len());
    info!("Output: {}", args.output.display());

    Ok(())
}

use anyhow::Result;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Tracks hashed DOI keys that already went through a sync run so an
/// interrupted pull can resume without refetching.
pub struct Checkpoint {
    path: PathBuf,
    done: HashSet<String>,
}

impl Checkpoint {
    /// Open a checkpoint file, loading prior state only when resuming.
    pub fn open<P: AsRef<Path>>(path: P, resume: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut done = HashSet::new();
        if resume && path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            for line in reader.lines() {
                let key = line?;
                if !key.is_empty() {
                    done.insert(key);
                }
            }
        }
        Ok(Self { path, done })
    }

    pub fn mark(&mut self, key: &str) {
        self.done.insert(key.to_string());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.done.contains(key)
    }

    pub fn len(&self) -> usize {
        self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.done.is_empty()
    }

    pub fn save(&self) -> Result<()> {
        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        for key in &self.done {
            writeln!(writer, "{key}")?;
        }
        writer.flush()?;
        Ok(())
    }
}

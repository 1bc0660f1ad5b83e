use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{PipelineError, Result};

/// CSV writer that publishes its file only on [`commit`](Self::commit).
///
/// Dropping the writer without committing removes the temporary file.
pub struct AtomicCsvWriter {
    writer: Option<csv::Writer<File>>,
    tmp_path: PathBuf,
    final_path: PathBuf,
    rows: usize,
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

impl AtomicCsvWriter {
    /// Creates the temporary file and writes `header`.
    pub fn create(path: &Path, header: &[&str]) -> Result<Self> {
        let tmp_path = tmp_path_for(path);
        let file = File::create(&tmp_path).map_err(|e| PipelineError::File {
            message: format!("failed to create output file: {e}"),
            path: tmp_path.display().to_string(),
        })?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(header)?;
        Ok(Self {
            writer: Some(writer),
            tmp_path,
            final_path: path.to_path_buf(),
            rows: 0,
        })
    }

    /// Appends one data row.
    pub fn write_row<I, T>(&mut self, row: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let writer = self.writer.as_mut().ok_or_else(|| PipelineError::File {
            message: "writer already committed".to_string(),
            path: self.final_path.display().to_string(),
        })?;
        writer.write_record(row)?;
        self.rows += 1;
        Ok(())
    }

    /// Data rows written so far, excluding the header.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flushes, syncs and renames the file into place. On failure the
    /// temporary file is removed.
    pub fn commit(mut self) -> Result<PathBuf> {
        let Some(writer) = self.writer.take() else {
            return Ok(self.final_path.clone());
        };
        if let Err(e) = publish(writer, &self.tmp_path, &self.final_path) {
            let _ = fs::remove_file(&self.tmp_path);
            return Err(e);
        }
        debug!(path = %self.final_path.display(), rows = self.rows, "output committed");
        Ok(self.final_path.clone())
    }
}

fn publish(writer: csv::Writer<File>, tmp_path: &Path, final_path: &Path) -> Result<()> {
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    drop(file);

    fs::rename(tmp_path, final_path).map_err(|e| PipelineError::File {
        message: format!("failed to rename '{}' into place: {e}", tmp_path.display()),
        path: final_path.display().to_string(),
    })
}

/// Checks that `path` can be written by creating and removing the temporary
/// file [`AtomicCsvWriter::create`] would use.
pub fn check_writable(path: &Path) -> Result<()> {
    let tmp_path = tmp_path_for(path);
    File::create(&tmp_path).map_err(|e| PipelineError::File {
        message: format!("output is not writable: {e}"),
        path: path.display().to_string(),
    })?;
    fs::remove_file(&tmp_path)?;
    Ok(())
}

impl Drop for AtomicCsvWriter {
    fn drop(&mut self) {
        if self.writer.take().is_some() {
            let _ = fs::remove_file(&self.tmp_path);
        }
    }
}

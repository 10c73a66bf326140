//! Destination for command output: a file or stdout.
//!
//! File output goes to a temp file next to the destination and is renamed
//! into place by [`Output::finish`]. If a command fails first, the temp file
//! is dropped and the destination is never created or truncated.

use anyhow::{Context, Result};
use std::io::{self, BufWriter, StdoutLock, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub enum Output {
    Stdout(StdoutLock<'static>),
    File {
        tmp: BufWriter<NamedTempFile>,
        dest: PathBuf,
    },
}

impl Output {
    /// Opens `path` for writing, or stdout when `None`.
    pub fn open(path: Option<&Path>) -> Result<Self> {
        let Some(dest) = path else {
            return Ok(Output::Stdout(io::stdout().lock()));
        };
        let dir = match dest.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("create temp file in {}", dir.display()))?;
        Ok(Output::File {
            tmp: BufWriter::new(tmp),
            dest: dest.to_path_buf(),
        })
    }

    /// Flushes and, for file output, moves the temp file onto the destination.
    pub fn finish(self) -> Result<()> {
        match self {
            Output::Stdout(mut out) => out.flush().context("flush output"),
            Output::File { tmp, dest } => {
                let tmp = tmp.into_inner().map_err(|e| e.into_error()).context("flush output")?;
                tmp.as_file().sync_all().context("sync output")?;
                tmp.persist(&dest)
                    .map_err(|e| e.error)
                    .with_context(|| format!("write {}", dest.display()))?;
                Ok(())
            }
        }
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout(out) => out.write(buf),
            Output::File { tmp, .. } => tmp.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout(out) => out.flush(),
            Output::File { tmp, .. } => tmp.flush(),
        }
    }
}

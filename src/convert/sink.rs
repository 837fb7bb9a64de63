//! Row externalization: inline accumulation vs delimited side-car files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::{CellValue, DataPayload, DataRow};
use crate::error::AtomlensError;

/// Absolute form of `path` with forward slashes, as the visualizer expects.
pub(crate) fn portable_absolute(path: &Path) -> Result<String, AtomlensError> {
    let absolute = std::path::absolute(path).map_err(|e| AtomlensError::io(path, e))?;
    Ok(absolute.to_string_lossy().replace('\\', "/"))
}

/// Destination for converted per-entity rows.
///
/// With an output path, the header and every row are streamed straight to a
/// buffered file handle; otherwise rows are materialized in memory. The two
/// outcomes are mutually exclusive by construction: [`RowSink::finish`]
/// yields either inline rows or a file reference, never both. The handle is
/// flushed in `finish` and closed on drop, including error paths.
#[derive(Debug)]
pub(crate) struct RowSink {
    columns: Vec<String>,
    kind: SinkKind,
}

#[derive(Debug)]
enum SinkKind {
    Inline(Vec<DataRow>),
    Delimited {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl RowSink {
    /// Sink over the given ordered columns. When `output` is set, the file
    /// is created (truncating any previous content) and the header row is
    /// written immediately.
    pub(crate) fn create(
        columns: Vec<String>,
        output: Option<&Path>,
    ) -> Result<Self, AtomlensError> {
        let kind = match output {
            Some(path) => {
                let file = File::create(path).map_err(|e| AtomlensError::io(path, e))?;
                let mut writer = BufWriter::new(file);
                writeln!(writer, "{}", columns.join(","))
                    .map_err(|e| AtomlensError::io(path, e))?;
                SinkKind::Delimited {
                    writer,
                    path: path.to_path_buf(),
                }
            }
            None => SinkKind::Inline(Vec::new()),
        };
        Ok(Self { columns, kind })
    }

    /// The ordered columns rows must align with.
    pub(crate) fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Append one row. `values` must align with [`RowSink::columns`].
    pub(crate) fn push(&mut self, values: Vec<CellValue>) -> Result<(), AtomlensError> {
        debug_assert_eq!(values.len(), self.columns.len());
        match &mut self.kind {
            SinkKind::Inline(rows) => {
                rows.push(self.columns.iter().cloned().zip(values).collect());
            }
            SinkKind::Delimited { writer, path } => {
                let line = values
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                writeln!(writer, "{line}").map_err(|e| AtomlensError::io(&*path, e))?;
            }
        }
        Ok(())
    }

    /// Close out the sink, flushing the file handle if one is open.
    pub(crate) fn finish(self) -> Result<DataPayload, AtomlensError> {
        match self.kind {
            SinkKind::Inline(rows) => Ok(DataPayload::Inline(rows)),
            SinkKind::Delimited { mut writer, path } => {
                writer.flush().map_err(|e| AtomlensError::io(&path, e))?;
                Ok(DataPayload::File(portable_absolute(&path)?))
            }
        }
    }
}

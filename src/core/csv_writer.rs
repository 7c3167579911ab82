use crate::core::flatten::python_repr;
use crate::domain::model::FlatRecord;
use crate::domain::ports::RecordSink;
use crate::utils::error::Result;
use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use serde_json::Value;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvDialect {
    pub delimiter: u8,
    pub quote: u8,
}

impl Default for CsvDialect {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
        }
    }
}

/// 每個 stream 附加寫入一個 CSV 檔
///
/// 欄位表頭在一次執行中對每個 stream 只決定一次：
/// 既有的非空檔案沿用第一行，否則使用第一筆記錄的欄位。
/// 之後的記錄多出的欄位會被忽略，缺少的欄位寫成空字串。
#[derive(Debug, Clone)]
pub struct CsvFileSink {
    destination: PathBuf,
    output_file: Option<PathBuf>,
    dialect: CsvDialect,
    headers: HashMap<String, Vec<String>>,
}

impl CsvFileSink {
    pub fn new(destination: impl Into<PathBuf>, dialect: CsvDialect) -> Self {
        Self {
            destination: destination.into(),
            output_file: None,
            dialect,
            headers: HashMap::new(),
        }
    }

    /// 所有 stream 都寫到同一個檔案
    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self
    }

    pub fn dialect(&self) -> CsvDialect {
        self.dialect
    }

    pub fn resolve_path(&self, stream: &str) -> PathBuf {
        match &self.output_file {
            Some(path) => path.clone(),
            None => self.destination.join(format!("{}.csv", stream)),
        }
    }

    pub fn header(&self, stream: &str) -> Option<&[String]> {
        self.headers.get(stream).map(Vec::as_slice)
    }
}

impl RecordSink for CsvFileSink {
    fn write_record(&mut self, stream: &str, record: &FlatRecord) -> Result<()> {
        let path = self.resolve_path(stream);
        let file_is_empty = file_is_empty(&path)?;
        let dialect = self.dialect;

        let header: &[String] = match self.headers.entry(stream.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                entry.insert(initial_header(stream, &path, dialect, file_is_empty, record)?)
            }
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .delimiter(dialect.delimiter)
            .quote(dialect.quote)
            .terminator(Terminator::CRLF)
            .from_writer(file);

        if file_is_empty {
            tracing::info!("📝 Creating {} for stream '{}'", path.display(), stream);
            writer.write_record(header)?;
        }

        let row = header
            .iter()
            .map(|column| record.get(column).map(render_cell).unwrap_or_default());
        writer.write_record(row)?;
        writer.flush()?;

        Ok(())
    }
}

/// 非空檔案沿用第一行，否則用記錄本身的欄位
fn initial_header(
    stream: &str,
    path: &Path,
    dialect: CsvDialect,
    file_is_empty: bool,
    record: &FlatRecord,
) -> Result<Vec<String>> {
    if file_is_empty {
        return Ok(record_columns(record));
    }

    let existing = read_header_line(path, dialect)?;
    if existing.is_empty() {
        tracing::debug!(
            "First line of {} is empty, using record fields for stream '{}'",
            path.display(),
            stream
        );
        Ok(record_columns(record))
    } else {
        tracing::debug!(
            "Reusing {} existing columns from {} for stream '{}'",
            existing.len(),
            path.display(),
            stream
        );
        Ok(existing)
    }
}

/// 檔案不存在、不是一般檔案或大小為零
fn file_is_empty(path: &Path) -> Result<bool> {
    match fs::metadata(path) {
        Ok(metadata) => Ok(!metadata.is_file() || metadata.len() == 0),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(true),
        Err(e) => Err(e.into()),
    }
}

/// 讀取檔案第一個實體行，並依分隔符號/引號規則切成欄位
fn read_header_line(path: &Path, dialect: CsvDialect) -> Result<Vec<String>> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut line = String::new();
    reader.read_line(&mut line)?;

    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return Ok(Vec::new());
    }

    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(dialect.delimiter)
        .quote(dialect.quote)
        .from_reader(line.as_bytes());

    let mut row = StringRecord::new();
    if csv_reader.read_record(&mut row)? {
        Ok(row.iter().map(str::to_string).collect())
    } else {
        Ok(Vec::new())
    }
}

fn record_columns(record: &FlatRecord) -> Vec<String> {
    record.keys().cloned().collect()
}

/// 單一欄位的文字：null 為空字串，字串原樣，其餘與舊版 Python target 寫出的格式相同
pub fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => python_repr(other),
    }
}

use super::ReportRow;
use anyhow::{Context, Result};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
    str::FromStr,
};

/// Report serialisation format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    /// One JSON object per line
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" | "jsonl" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {s}")),
        }
    }
}

enum Sink<W: Write> {
    Csv(csv::Writer<W>),
    Json(W),
}

/// Writes report rows to a file or any `Write`
pub struct ReportWriter<W: Write> {
    sink: Sink<W>,
    rows: usize,
}

impl ReportWriter<BufWriter<File>> {
    /// Create `path`, and its parent directory when missing
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be created
    pub fn create(path: &Path, format: OutputFormat, header: bool) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }

        let file = File::create(path)
            .with_context(|| format!("failed to create report {}", path.display()))?;

        Ok(Self::new(BufWriter::new(file), format, header))
    }
}

impl<W: Write> ReportWriter<W> {
    /// `header` writes the column names first; ignored for JSON
    #[must_use]
    pub fn new(writer: W, format: OutputFormat, header: bool) -> Self {
        let sink = match format {
            OutputFormat::Csv => Sink::Csv(
                csv::WriterBuilder::new()
                    .has_headers(header)
                    .from_writer(writer),
            ),
            OutputFormat::Json => Sink::Json(writer),
        };

        Self { sink, rows: 0 }
    }

    /// # Errors
    ///
    /// Returns an error if the row cannot be serialised or written
    pub fn write_row(&mut self, row: &ReportRow) -> Result<()> {
        match &mut self.sink {
            Sink::Csv(writer) => writer
                .serialize(row)
                .with_context(|| format!("failed to write row for {}", row.hostname))?,
            Sink::Json(writer) => {
                serde_json::to_writer(&mut *writer, row)
                    .with_context(|| format!("failed to write row for {}", row.hostname))?;
                writer.write_all(b"\n")?;
            }
        }

        self.rows += 1;
        Ok(())
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Flush and hand back the underlying writer
    ///
    /// # Errors
    ///
    /// Returns an error if buffered rows cannot be flushed
    pub fn finish(self) -> Result<W> {
        let mut writer = match self.sink {
            Sink::Csv(writer) => writer
                .into_inner()
                .map_err(|e| anyhow::anyhow!("failed to flush report: {}", e.error()))?,
            Sink::Json(writer) => writer,
        };
        writer.flush().context("failed to flush report")?;

        Ok(writer)
    }
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::indexing_slicing
    )]

    use super::*;
    use crate::zone::RecordType;
    use chrono::NaiveDate;

    fn rows() -> Vec<ReportRow> {
        vec![
            ReportRow {
                hostname: "www.example.com".to_string(),
                record_type: RecordType::A,
                common_name: "www.example.com".to_string(),
                issued_name: "Example, Inc.".to_string(),
                expiration_date: NaiveDate::from_ymd_opt(2030, 1, 1),
                serial_number: "0A1B".to_string(),
                status: "200".to_string(),
            },
            ReportRow {
                hostname: "*.example.com".to_string(),
                record_type: RecordType::Cname,
                common_name: String::new(),
                issued_name: String::new(),
                expiration_date: None,
                serial_number: String::new(),
                status: "ERROR: Connection error for example.com: refused.".to_string(),
            },
        ]
    }

    fn render(format: OutputFormat, header: bool) -> String {
        let mut writer = ReportWriter::new(Vec::new(), format, header);
        for row in rows() {
            writer.write_row(&row).unwrap();
        }
        assert_eq!(writer.rows(), 2);
        String::from_utf8(writer.finish().unwrap()).unwrap()
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_csv_without_header() {
        assert_eq!(
            render(OutputFormat::Csv, false),
            "www.example.com,A,www.example.com,\"Example, Inc.\",2030-01-01,0A1B,200\n\
             *.example.com,CNAME,,,,,ERROR: Connection error for example.com: refused.\n"
        );
    }

    #[test]
    fn test_csv_with_header() {
        let output = render(OutputFormat::Csv, true);
        assert!(output.starts_with(
            "hostname,record_type,common_name,issued_name,expiration_date,serial_number,status\n"
        ));
        assert_eq!(output.lines().count(), 3);
    }

    #[test]
    fn test_json_lines() {
        let output = render(OutputFormat::Json, true);
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["expiration_date"], "2030-01-01");
        assert_eq!(lines[1]["record_type"], "CNAME");
    }

    #[test]
    fn test_create_makes_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output").join("domains.csv");
        let mut writer = ReportWriter::create(&path, OutputFormat::Csv, false).unwrap();
        writer.write_row(&rows()[0]).unwrap();
        writer.finish().unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("www.example.com,A,"));
    }
}

//! CSV reading and writing for lot spreadsheets.
//!
//! All file I/O flows through this module: delimiter resolution (this
//! toolkit's spreadsheets default to `;`), input decoding via `encoding_rs`
//! (UTF-8 with BOM tolerance, plus legacy encodings for sheets exported from
//! older spreadsheet software), the stdin/stdout `-` path convention, and
//! raw-table materialization for the loader.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};

/// Lot spreadsheets are `;`-separated by convention.
pub const DEFAULT_DELIMITER: u8 = b';';

/// An imported sheet before canonical mapping: one header row plus raw
/// string cells. Blank lines are skipped by the reader; fully-blank rows are
/// the loader's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_delimiter(provided: Option<u8>) -> u8 {
    provided.unwrap_or(DEFAULT_DELIMITER)
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

/// Reads an entire spreadsheet into memory as decoded strings.
pub fn read_raw_table(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<RawTable> {
    let reader: Box<dyn Read> = if is_dash(path) {
        Box::new(std::io::stdin().lock())
    } else {
        Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Opening input file {path:?}"))?,
        ))
    };
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let headers = decode_record(&csv_reader.byte_headers()?.clone(), encoding)
        .with_context(|| format!("Decoding header row of {path:?}"))?;

    let mut rows = Vec::new();
    for (row_idx, record) in csv_reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
        let mut decoded = decode_record(&record, encoding)
            .with_context(|| format!("Decoding row {}", row_idx + 2))?;
        // Short rows pad out so column indexes stay valid.
        decoded.resize(headers.len().max(decoded.len()), String::new());
        rows.push(decoded);
    }
    Ok(RawTable { headers, rows })
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

/// Opens a CSV writer targeting a file or stdout.
///
/// Cells are quoted only when needed so exports read the way the original
/// spreadsheets do.
pub fn open_csv_writer(path: Option<&Path>, delimiter: u8) -> Result<csv::Writer<Box<dyn Write>>> {
    let target: Box<dyn Write> = match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(std::io::stdout()),
    };
    let mut builder = csv::WriterBuilder::new();
    builder.delimiter(delimiter).quote_style(QuoteStyle::Necessary);
    Ok(builder.from_writer(target))
}

/// Writes a header row plus data rows and flushes.
pub fn write_table(
    path: Option<&Path>,
    delimiter: u8,
    headers: &[String],
    rows: &[Vec<String>],
) -> Result<()> {
    let mut writer = open_csv_writer(path, delimiter)?;
    writer.write_record(headers).context("Writing header row")?;
    for row in rows {
        writer.write_record(row).context("Writing data row")?;
    }
    writer.flush().context("Flushing output")?;
    Ok(())
}

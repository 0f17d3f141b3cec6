//! Integration tests for reading data files from disk.

use std::fs;
use std::path::PathBuf;

use icd_ingest::{Row, open_data_rows, read_icd_rows};
use icd_model::{DataFormat, DataFormatKind, ErrorKind, Result};
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write file");
    path
}

#[test]
fn reads_delimited_file_with_declared_dialect() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(&dir, "customers.csv", b"id;name\n1;'Hugo; Jr.'\n2;Sepp\n");
    let mut data_format = DataFormat::new(DataFormatKind::Delimited);
    data_format.set("item delimiter", ";", None).unwrap();
    data_format.set("quote character", "'", None).unwrap();
    data_format.set("escape character", "'", None).unwrap();
    data_format.set("header", "1", None).unwrap();

    let rows: Vec<Row> = open_data_rows(&path, &data_format, &[])
        .expect("open")
        .collect::<Result<_>>()
        .expect("rows");

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].cells, vec!["1", "Hugo; Jr."]);
    assert_eq!(rows[1].location.to_string(), "customers.csv (R3C1)");
}

#[test]
fn reads_fixed_file_in_declared_encoding() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(&dir, "fixed.txt", b"M\xfcller042\nHuber 017\n");
    let mut data_format = DataFormat::new(DataFormatKind::Fixed);
    data_format.set("encoding", "cp1252", None).unwrap();

    let rows: Vec<Row> = open_data_rows(&path, &data_format, &[6, 3])
        .expect("open")
        .collect::<Result<_>>()
        .expect("rows");

    assert_eq!(rows[0].cells, vec!["Müller", "042"]);
    assert_eq!(rows[1].cells, vec!["Huber ", "017"]);
}

#[test]
fn broken_encoding_ends_rows_after_the_readable_ones() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(&dir, "broken.csv", b"1,ok\n2,\xff\n");
    let data_format = DataFormat::new(DataFormatKind::Delimited);

    let rows: Vec<Result<Row>> = open_data_rows(&path, &data_format, &[])
        .expect("open")
        .collect();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].as_ref().expect("first row").cells, vec!["1", "ok"]);
    let error = rows[1].as_ref().expect_err("decode error");
    assert_eq!(error.kind(), ErrorKind::UnicodeDecode);
    assert_eq!(error.location().map(|location| location.line()), Some(1));
}

#[test]
fn large_file_is_read_in_chunks() {
    let dir = TempDir::new().expect("temp dir");
    let mut contents = Vec::new();
    for index in 0..20_000 {
        contents.extend_from_slice(format!("{index},Gr\u{fc}\u{df}e\n").as_bytes());
    }
    contents.extend_from_slice(b"20000,\xc3\n");
    let path = write_file(&dir, "large.csv", &contents);
    let data_format = DataFormat::new(DataFormatKind::Delimited);

    let mut rows = open_data_rows(&path, &data_format, &[]).expect("open");
    let valid: Vec<Row> = rows.by_ref().take(20_000).collect::<Result<_>>().expect("rows");
    let error = rows.next().expect("error row").expect_err("decode error");

    assert_eq!(valid[19_999].cells, vec!["19999", "Grüße"]);
    assert_eq!(error.kind(), ErrorKind::UnicodeDecode);
    assert_eq!(error.location().map(|location| location.line()), Some(20_000));
    assert!(rows.next().is_none());
}

#[test]
fn spreadsheet_data_is_not_implemented() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(&dir, "data.ods", b"PK\x03\x04");
    let data_format = DataFormat::new(DataFormatKind::Ods);

    let error = open_data_rows(&path, &data_format, &[]).err().expect("error");

    assert_eq!(error.kind(), ErrorKind::DataFormatSyntax);
    assert!(error.message().contains("not implemented"));
}

#[test]
fn missing_file_is_a_data_format_error() {
    let dir = TempDir::new().expect("temp dir");
    let data_format = DataFormat::new(DataFormatKind::Delimited);

    let error = open_data_rows(&dir.path().join("missing.csv"), &data_format, &[])
        .err()
        .expect("error");

    assert_eq!(error.kind(), ErrorKind::DataFormatValue);
    assert!(std::error::Error::source(&error).is_some());
}

#[test]
fn zipped_icd_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(&dir, "icd.ods", b"PK\x03\x04rest");

    let error = read_icd_rows(&path).err().expect("error");

    assert_eq!(error.kind(), ErrorKind::DataFormatSyntax);
}

#[test]
fn icd_file_with_semicolons() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(
        &dir,
        "icd.csv",
        b"d;format;delimited\n;comment\nf;age;Integer;;;0...150\n",
    );

    let rows: Vec<Row> = read_icd_rows(&path)
        .expect("open")
        .collect::<Result<_>>()
        .expect("rows");

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2].cells[5], "0...150");
}

//! Integration tests for the `icd validate` and `icd describe` commands.

use std::fs;
use std::path::{Path, PathBuf};

use icd_cli::commands::{ValidateOptions, describe, run_validate};
use icd_cli::summary::{
    checks_table, data_format_table, fields_table, rejected_table, summary_table,
};
use tempfile::TempDir;

const ICD: &str = "\
,Customers
d,format,delimited
d,header,1
f,customer_id,Integer,,,0...99999
f,surname,Text,,1...60
f,gender,Choice,x,,\"male, female\"
f,date_of_birth,DateTime,,,DD.MM.YYYY
c,customer must be unique,IsUnique,customer_id
c,at most 3 customers,RowCount,...3
";

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write test file");
    path
}

fn setup() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("temp dir");
    let icd = write(&dir, "customers_icd.csv", ICD);
    (dir, icd)
}

fn options(report: Option<&Path>) -> ValidateOptions {
    ValidateOptions {
        report: report.map(Path::to_path_buf),
        show_progress: false,
    }
}

#[test]
fn valid_data_has_no_failures() {
    let (dir, icd) = setup();
    let data = write(
        &dir,
        "customers.csv",
        "id,surname,gender,born\n1,Huber,male,24.12.1963\n2,Müller,,01.05.1980\n",
    );
    let run = run_validate(&icd, &[data], &options(None)).unwrap();
    assert!(!run.has_failures());
    assert_eq!(run.files[0].summary.accepted, 2);
}

#[test]
fn failures_are_collected_per_file() {
    let (dir, icd) = setup();
    let good = write(&dir, "good.csv", "header\n1,Huber,male,24.12.1963\n");
    let bad = write(
        &dir,
        "bad.csv",
        "header\n1,Huber,male,24.12.1963\n1,Meier,female,02.02.1972\n2,Bauer,other,03.03.1973\n",
    );
    let missing = dir.path().join("missing.csv");
    let report_path = dir.path().join("report.json");
    let run = run_validate(&icd, &[good, bad, missing], &options(Some(&report_path))).unwrap();

    assert!(run.has_failures());
    assert!(run.files[0].summary.is_valid());
    let bad = &run.files[1];
    assert_eq!((bad.summary.accepted, bad.summary.rejected), (1, 2));
    assert_eq!(bad.summary.row_check_failures, 1);
    assert!(run.files[2].summary.data_format_failure.is_some());

    let table = rejected_table(bad, 1).expect("rejected rows").to_string();
    assert!(table.contains("customer must be unique"), "{table}");
    assert!(rejected_table(&run.files[0], 20).is_none());
    assert!(summary_table(&run).to_string().contains("TOTAL"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(json["files"][1]["summary"]["rejected"], 2);
    assert_eq!(json["files"][1]["report"]["rejected"][1]["cells"][2], "other");
}

#[test]
fn end_check_failures_fail_the_run() {
    let (dir, icd) = setup();
    let data = write(
        &dir,
        "many.csv",
        "header\n1,A,,01.01.2000\n2,B,,01.01.2000\n3,C,,01.01.2000\n4,D,,01.01.2000\n",
    );
    let run = run_validate(&icd, &[data], &options(None)).unwrap();
    assert!(run.has_failures());
    assert_eq!(run.files[0].summary.end_check_failures, 1);
    assert_eq!(run.files[0].summary.rejected, 0);
}

#[test]
fn broken_icd_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let icd = write(&dir, "broken_icd.csv", "d,format,delimited\nz,surname,Text\n");
    let error = run_validate(&icd, &[], &options(None)).unwrap_err();
    let message = format!("{error:#}");
    assert!(message.contains("broken_icd.csv"), "{message}");
    assert!(message.contains("must be empty or one of: c, d, f"), "{message}");
}

#[test]
fn describe_lists_declarations() {
    let (_dir, icd) = setup();
    let icd = describe(&icd).unwrap();
    let data_format = data_format_table(&icd).to_string();
    assert!(data_format.contains("delimited") && data_format.contains("header"));
    let fields = fields_table(&icd).to_string();
    for expected in ["customer_id", "0...99999", "DD.MM.YYYY", "gender"] {
        assert!(fields.contains(expected), "{expected} missing in {fields}");
    }
    let checks = checks_table(&icd).to_string();
    assert!(checks.contains("IsUnique"), "{checks}");
}

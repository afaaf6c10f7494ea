//! Spreadsheet export written to disk

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::{Cursor, Read};
use std::sync::Arc;

use chrono::FixedOffset;
use inscripciones::export::{
    build_workbook, render_rows, DownloadTrigger, ExportError, ExportFile, ExportSettings, InscriptionExporter,
    SaveToDirectory, HEADERS,
};
use inscripciones::mocks::inscription;
use inscripciones_testing::test_clock;

fn lima() -> ExportSettings {
    ExportSettings::new("%d/%m/%Y")
        .unwrap()
        .with_utc_offset(FixedOffset::west_opt(5 * 3600).unwrap())
}

/// The worksheet XML inside an `.xlsx` buffer
fn sheet_xml(bytes: &[u8]) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut sheet = archive.by_name("xl/worksheets/sheet1.xml").unwrap();
    let mut xml = String::new();
    sheet.read_to_string(&mut xml).unwrap();
    xml
}

/// The `<c>` element for `reference`, if the sheet has one
fn cell<'a>(xml: &'a str, reference: &str) -> Option<&'a str> {
    let start = xml.find(&format!("<c r=\"{reference}\""))?;
    let rest = &xml[start..];
    let open_end = rest.find('>')?;
    if rest[..open_end].ends_with('/') {
        return Some(&rest[..=open_end]);
    }
    let close = rest.find("</c>")?;
    Some(&rest[..close + "</c>".len()])
}

#[test]
fn empty_export_has_only_the_header_row() {
    let xml = sheet_xml(&build_workbook(&[], &lima()).unwrap());

    assert_eq!(xml.matches("<row ").count(), 1);
    assert!(xml.contains("<row r=\"2\""));
    assert!(cell(&xml, "A2").is_none());
    assert!(cell(&xml, "B2").is_some());
    assert!(cell(&xml, "P2").is_some());
    assert!(cell(&xml, "Q2").is_none());
}

#[test]
fn missing_values_are_blank_cells() {
    let mut blank = inscription(1, "Ana", "Rojas");
    blank.person.age = None;
    blank.checkinat = Some("not a date".into());
    let aged = inscription(2, "Luis", "Paz");

    let xml = sheet_xml(&build_workbook(&[blank, aged], &lima()).unwrap());

    assert_eq!(xml.matches("<row ").count(), 3);
    let age = cell(&xml, "H3").unwrap();
    assert!(age.ends_with("/>"), "{age}");
    let check_in = cell(&xml, "N3").unwrap();
    assert!(check_in.ends_with("/>"), "{check_in}");

    let age = cell(&xml, "H4").unwrap();
    assert!(age.contains("<v>30</v>"), "{age}");
    assert!(!age.contains("t=\"s\""), "{age}");
}

#[test]
fn workbook_lands_in_output_directory() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = InscriptionExporter::new(lima(), Arc::new(test_clock()));
    let trigger = SaveToDirectory::new(dir.path().join("reports"));
    let records = vec![inscription(1, "Ana", "Rojas"), inscription(2, "Luis", "Paz")];

    let delivered = exporter.export(&records, &trigger).unwrap();

    assert_eq!(delivered.rows, 2);
    assert_eq!(delivered.file_name, "Inscripciones_2024-05-01.xlsx");
    assert_eq!(
        delivered.location,
        dir.path().join("reports").join("Inscripciones_2024-05-01.xlsx")
    );
    let bytes = std::fs::read(&delivered.location).unwrap();
    assert_eq!(&bytes[..4], b"PK\x03\x04");
}

#[test]
fn export_overwrites_same_day_file() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = InscriptionExporter::new(lima(), Arc::new(test_clock()));
    let trigger = SaveToDirectory::new(dir.path());

    let first = exporter.export(&[], &trigger).unwrap();
    let second = exporter
        .export(&[inscription(1, "Ana", "Rojas")], &trigger)
        .unwrap();

    assert_eq!(first.location, second.location);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn check_in_is_shown_in_local_date() {
    let mut late = inscription(1, "Ana", "Rojas");
    late.checkinat = Some("2024-05-02T03:00:00Z".into());
    let mut missing = inscription(2, "Luis", "Paz");
    missing.checkinat = None;

    let rows = render_rows(&[late, missing], &lima());

    let check_in = HEADERS.iter().position(|h| *h == "Check-in").unwrap();
    assert_eq!(rows[0][check_in], "01/05/2024");
    assert_eq!(rows[1][check_in], "");
}

struct ReadOnlyTarget;

impl DownloadTrigger for ReadOnlyTarget {
    fn deliver(&self, _file: &ExportFile) -> Result<std::path::PathBuf, ExportError> {
        Err(ExportError::Delivery(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only",
        )))
    }
}

#[test]
fn delivery_failure_is_reported() {
    let exporter = InscriptionExporter::new(lima(), Arc::new(test_clock()));

    let error = exporter
        .export(&[inscription(1, "Ana", "Rojas")], &ReadOnlyTarget)
        .unwrap_err();

    assert!(matches!(error, ExportError::Delivery(_)));
}

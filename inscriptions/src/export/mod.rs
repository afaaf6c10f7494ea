//! Spreadsheet export of stored inscriptions
//!
//! Rendering, workbook building and delivery are separate steps:
//!
//! - [`render_rows`] turns records into the text grid shown in the sheet
//! - [`build_workbook`] lays the grid out and returns the `.xlsx` bytes
//! - a [`DownloadTrigger`] hands the bytes to the user
//!
//! [`InscriptionExporter`] runs the three in order and names the file from
//! its clock.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, Utc};
use inscripciones_core::environment::Clock;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatPattern, Workbook, XlsxError};
use thiserror::Error;

use crate::config::DEFAULT_DATE_FORMAT;
use crate::types::InscriptionRecord;

mod download;

pub use download::{DownloadTrigger, SaveToDirectory};

/// Name of the single worksheet
pub const WORKSHEET_NAME: &str = "Inscripciones";

/// Column headers, in sheet order
pub const HEADERS: [&str; COLUMN_COUNT] = [
    "Nombres",
    "Apellidos",
    "Documento",
    "Género",
    "Teléfono",
    "Correo",
    "Edad",
    "Tipo de Miembro",
    "Iglesia",
    "Actividad",
    "Monto",
    "Método de Pago",
    "Check-in",
    "Estado",
    "Observaciones",
];

/// Number of exported columns
pub const COLUMN_COUNT: usize = 15;

/// Header fill color (`#FFC600`)
pub const HEADER_FILL: u32 = 0x00FF_C600;

/// Zero-based row of the header (sheet row 2)
pub const HEADER_ROW: u32 = 1;

/// Zero-based column of the first value (sheet column B)
pub const FIRST_COLUMN: u16 = 1;

const AGE_COLUMN: usize = 6;
const MIN_COLUMN_WIDTH: usize = 12;
const EMPTY_CELL_WIDTH: usize = 10;
const WIDTH_PADDING: usize = 2;

/// One rendered sheet row
pub type RenderedRow = [String; COLUMN_COUNT];

/// Export failures
#[derive(Error, Debug)]
pub enum ExportError {
    /// The workbook could not be built
    #[error("workbook could not be built: {0}")]
    Workbook(#[from] XlsxError),

    /// The configured date pattern is not a valid `strftime` pattern
    #[error("invalid date format {0:?}")]
    InvalidDateFormat(String),

    /// The built file could not be handed over
    #[error("export could not be delivered: {0}")]
    Delivery(#[from] std::io::Error),
}

/// How values are rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    date_format: String,
    utc_offset: FixedOffset,
}

impl ExportSettings {
    /// Settings with the given check-in date pattern and the local offset
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InvalidDateFormat`] if `date_format` contains an
    /// unknown `strftime` specifier.
    pub fn new(date_format: impl Into<String>) -> Result<Self, ExportError> {
        let date_format = date_format.into();
        if StrftimeItems::new(&date_format).any(|item| matches!(item, Item::Error)) {
            return Err(ExportError::InvalidDateFormat(date_format));
        }
        Ok(Self {
            date_format,
            utc_offset: *Local::now().offset(),
        })
    }

    /// Render check-in instants in `offset` instead of the local offset
    #[must_use]
    pub const fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    /// Check-in date pattern
    #[must_use]
    pub fn date_format(&self) -> &str {
        &self.date_format
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            utc_offset: *Local::now().offset(),
        }
    }
}

/// Format a raw check-in timestamp as a date
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS[.f]` and `YYYY-MM-DD`. Anything
/// else, including a missing value, renders as an empty string.
#[must_use]
pub fn format_check_in(raw: Option<&str>, settings: &ExportSettings) -> String {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return String::new();
    };

    let date = DateTime::parse_from_rfc3339(raw)
        .map(|instant| instant.with_timezone(&settings.utc_offset).date_naive())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"));

    let Ok(date) = date else {
        tracing::debug!(raw, "Unparsable check-in left blank");
        return String::new();
    };

    let mut out = String::new();
    if write!(out, "{}", date.format(&settings.date_format)).is_err() {
        return String::new();
    }
    out
}

/// Render one record into sheet columns
#[must_use]
pub fn render_row(record: &InscriptionRecord, settings: &ExportSettings) -> RenderedRow {
    let person = &record.person;
    [
        person.names.clone(),
        person.lastnames.clone(),
        person.doc_num.clone(),
        person.gender.clone(),
        person.phone.clone(),
        person.email.clone(),
        person.age.map(|age| age.to_string()).unwrap_or_default(),
        person.kind_description.clone(),
        person.church_description.clone(),
        record.group.vouchergroup.clone(),
        record.amount.clone(),
        record.group.paymentmethod.description.clone(),
        format_check_in(record.checkinat.as_deref(), settings),
        record.status_description.clone(),
        record.observations.clone(),
    ]
}

/// Render every record, preserving order
#[must_use]
pub fn render_rows(records: &[InscriptionRecord], settings: &ExportSettings) -> Vec<RenderedRow> {
    records.iter().map(|r| render_row(r, settings)).collect()
}

/// Width of each exported column, headers included
///
/// `max(12, longest value + 2)`; an empty value counts as 10.
#[must_use]
pub fn column_widths(rows: &[RenderedRow]) -> [usize; COLUMN_COUNT] {
    let cell_width = |value: &str| {
        if value.is_empty() {
            EMPTY_CELL_WIDTH
        } else {
            value.chars().count() + WIDTH_PADDING
        }
    };

    let mut widths = HEADERS.map(cell_width);
    for row in rows {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell_width(value));
        }
    }
    widths.map(|width| width.max(MIN_COLUMN_WIDTH))
}

/// Name of the exported file: `Inscripciones_YYYY-MM-DD.xlsx`
#[must_use]
pub fn file_name(now: DateTime<Utc>) -> String {
    format!("{WORKSHEET_NAME}_{}.xlsx", now.format("%Y-%m-%d"))
}

/// Build the `.xlsx` workbook for `records`
///
/// # Errors
///
/// Returns [`ExportError::Workbook`] if the writer rejects a value or the
/// workbook cannot be serialized.
#[allow(clippy::cast_precision_loss)] // widths are tiny
pub fn build_workbook(
    records: &[InscriptionRecord],
    settings: &ExportSettings,
) -> Result<Vec<u8>, ExportError> {
    let rows = render_rows(records, settings);
    let widths = column_widths(&rows);

    let header_format = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_pattern(FormatPattern::Solid)
        .set_background_color(Color::RGB(HEADER_FILL));
    let cell_format = Format::new()
        .set_align(FormatAlign::Left)
        .set_align(FormatAlign::VerticalCenter);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(WORKSHEET_NAME)?;

    for (offset, header) in (0_u16..).zip(HEADERS) {
        worksheet.write_string_with_format(HEADER_ROW, FIRST_COLUMN + offset, header, &header_format)?;
    }

    for ((row, record), rendered) in (HEADER_ROW + 1..).zip(records).zip(&rows) {
        for ((offset, value), index) in (0_u16..).zip(rendered).zip(0..) {
            let column = FIRST_COLUMN + offset;
            match record.person.age {
                Some(age) if index == AGE_COLUMN => {
                    worksheet.write_number_with_format(row, column, age, &cell_format)?;
                },
                _ => {
                    worksheet.write_string_with_format(row, column, value, &cell_format)?;
                },
            }
        }
    }

    for (offset, width) in (0_u16..).zip(widths) {
        worksheet.set_column_width(FIRST_COLUMN + offset, width as f64)?;
    }

    Ok(workbook.save_to_buffer()?)
}

/// A built workbook ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    /// Suggested file name
    pub file_name: String,
    /// Workbook bytes
    pub bytes: Vec<u8>,
    /// Data rows in the sheet
    pub rows: usize,
}

/// A delivered export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredExport {
    /// File name used
    pub file_name: String,
    /// Where the trigger put the file
    pub location: PathBuf,
    /// Data rows in the sheet
    pub rows: usize,
}

/// Builds, names and delivers inscription workbooks
#[derive(Clone)]
pub struct InscriptionExporter {
    settings: ExportSettings,
    clock: Arc<dyn Clock>,
}

impl InscriptionExporter {
    /// Create an exporter rendering with `settings` and naming files from `clock`
    #[must_use]
    pub fn new(settings: ExportSettings, clock: Arc<dyn Clock>) -> Self {
        Self { settings, clock }
    }

    /// Rendering settings
    #[must_use]
    pub const fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Build the workbook and name it, without delivering
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Workbook`] if the workbook cannot be built.
    pub fn build(&self, records: &[InscriptionRecord]) -> Result<ExportFile, ExportError> {
        Ok(ExportFile {
            file_name: file_name(self.clock.now()),
            bytes: build_workbook(records, &self.settings)?,
            rows: records.len(),
        })
    }

    /// Build the workbook and hand it to `trigger`
    ///
    /// Nothing is delivered when the build fails.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Workbook`] if the build fails, or the trigger's
    /// error if delivery fails.
    #[tracing::instrument(skip_all, fields(rows = records.len()))]
    pub fn export(
        &self,
        records: &[InscriptionRecord],
        trigger: &dyn DownloadTrigger,
    ) -> Result<DeliveredExport, ExportError> {
        let file = self.build(records).inspect_err(|error| {
            tracing::error!(%error, "Export failed");
        })?;
        let location = trigger.deliver(&file)?;
        tracing::info!(file = %file.file_name, location = %location.display(), "Export delivered");
        Ok(DeliveredExport {
            file_name: file.file_name,
            location,
            rows: file.rows,
        })
    }
}

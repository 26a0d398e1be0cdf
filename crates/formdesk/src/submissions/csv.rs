use chrono::NaiveDate;

use super::domain::SubmissionRecord;

/// Column order expected by downstream spreadsheet tooling.
pub const CSV_HEADER: [&str; 11] = [
    "ID",
    "First Name",
    "Middle Name",
    "Surname",
    "Gender",
    "Date of Birth",
    "Email",
    "Phone Number",
    "Employment Status",
    "State of Origin",
    "Submitted At",
];

/// CSV rendering error.
#[derive(Debug, thiserror::Error)]
pub enum CsvError {
    #[error("csv row write failed: {0}")]
    Write(#[from] ::csv::Error),
    #[error("csv output could not be finalized: {0}")]
    Render(String),
}

/// Render an already-fetched record list as CSV: one header row, one row per
/// submission, every field double-quoted, dates in short `%m/%d/%Y` form.
pub fn render_csv(records: &[SubmissionRecord]) -> Result<String, CsvError> {
    let mut writer = ::csv::WriterBuilder::new()
        .quote_style(::csv::QuoteStyle::Always)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;

    for record in records {
        let form = &record.form;
        writer.write_record([
            record.id.0.as_str(),
            form.first_name.as_str(),
            form.middle_name.as_deref().unwrap_or(""),
            form.surname.as_str(),
            form.gender.as_str(),
            short_date(&form.date_of_birth).as_str(),
            form.email.as_str(),
            form.phone_number.as_str(),
            form.employment_status.as_str(),
            form.state_of_origin.as_str(),
            record.submitted_at.format("%m/%d/%Y").to_string().as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| CsvError::Render(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| CsvError::Render(err.to_string()))
}

/// Dates of birth arrive as `YYYY-MM-DD` strings; render the short form when
/// they parse and pass them through untouched otherwise.
fn short_date(raw: &str) -> String {
    match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        Ok(date) => date.format("%m/%d/%Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

//! Loosely typed spreadsheet cells and their coercion rules.

use chrono::{Datelike, Days, NaiveDate};

/// Years outside this window indicate a number that is not a date
/// serial, e.g. a bare quantity landing in the date column.
const MIN_PLAUSIBLE_YEAR: i32 = 1950;
const MAX_PLAUSIBLE_YEAR: i32 = 2100;

/// A raw spreadsheet cell as delivered by the file parser.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Blank or null cell.
    Empty,
    /// Numeric cell, including date serials.
    Number(f64),
    /// Text cell, kept verbatim.
    Text(String),
    /// Cell the parser already resolved to a calendar date.
    Date(NaiveDate),
}

impl CellValue {
    /// Render the cell as display text; `Empty` renders as `""`.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

/// Parse a cell into a calendar date.
///
/// Accepts native date cells; spreadsheet serial numbers (serial `n` is
/// `n` days after 1899-12-31, filtered to plausible years so small
/// integers are not misread as dates); digit-only strings coerced to
/// serials; ISO `YYYY-MM-DD`; and day-first `DD.MM.YYYY` with 2- or
/// 4-digit years. `-`, `/` and `.` all work as separators.
pub fn parse_date_cell(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Date(d) => Some(*d),
        CellValue::Number(n) => serial_to_date(*n),
        CellValue::Text(s) => parse_date_text(s.trim()),
        CellValue::Empty => None,
    }
}

/// Parse a cell into a finite quantity.
pub fn parse_quantity(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Number(n) if n.is_finite() => Some(*n),
        CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|q| q.is_finite()),
        _ => None,
    }
}

fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial <= 0.0 {
        return None;
    }
    // The fractional part is the time of day; the grid only needs the day.
    let days = serial.trunc() as u64;
    let date = NaiveDate::from_ymd_opt(1899, 12, 31)?.checked_add_days(Days::new(days))?;
    if (MIN_PLAUSIBLE_YEAR..=MAX_PLAUSIBLE_YEAR).contains(&date.year()) {
        Some(date)
    } else {
        None
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }
    if text.bytes().all(|b| b.is_ascii_digit()) {
        return serial_to_date(text.parse::<f64>().ok()?);
    }

    let parts: Vec<&str> = text.split(['-', '/', '.']).collect();
    if parts.len() != 3 {
        return None;
    }
    let mut fields = [0u32; 3];
    for (field, part) in fields.iter_mut().zip(&parts) {
        *field = part.parse().ok()?;
    }

    if parts[0].len() == 4 {
        NaiveDate::from_ymd_opt(fields[0] as i32, fields[1], fields[2])
    } else {
        let year = if parts[2].len() == 2 {
            2000 + fields[2]
        } else {
            fields[2]
        };
        NaiveDate::from_ymd_opt(year as i32, fields[1], fields[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn native_date_cells_pass_through() {
        let cell = CellValue::Date(date(2023, 7, 17));
        assert_eq!(parse_date_cell(&cell), Some(date(2023, 7, 17)));
    }

    #[test]
    fn excel_serial_maps_to_calendar_date() {
        assert_eq!(
            parse_date_cell(&CellValue::Number(45123.0)),
            Some(date(2023, 7, 17))
        );
    }

    #[test]
    fn serial_time_fraction_is_dropped() {
        assert_eq!(
            parse_date_cell(&CellValue::Number(45123.75)),
            Some(date(2023, 7, 17))
        );
    }

    #[test]
    fn implausible_serials_are_rejected() {
        // Serial 33 would be 1900-02-02, far outside the plausible window.
        assert_eq!(parse_date_cell(&CellValue::Number(33.0)), None);
        assert_eq!(parse_date_cell(&CellValue::Number(0.0)), None);
        assert_eq!(parse_date_cell(&CellValue::Number(-5.0)), None);
        assert_eq!(parse_date_cell(&CellValue::Number(9_000_000.0)), None);
        assert_eq!(parse_date_cell(&CellValue::Number(f64::NAN)), None);
    }

    #[test]
    fn digit_strings_parse_as_serials() {
        assert_eq!(
            parse_date_cell(&CellValue::from("45123")),
            Some(date(2023, 7, 17))
        );
        // Not digit-only, and not a date format either.
        assert_eq!(parse_date_cell(&CellValue::from("120.5")), None);
    }

    #[test]
    fn iso_dates_parse_with_any_separator() {
        for text in ["2023-07-17", "2023/07/17", "2023.07.17"] {
            assert_eq!(parse_date_cell(&CellValue::from(text)), Some(date(2023, 7, 17)));
        }
    }

    #[test]
    fn day_first_dates_parse() {
        assert_eq!(
            parse_date_cell(&CellValue::from("17.07.2023")),
            Some(date(2023, 7, 17))
        );
        assert_eq!(
            parse_date_cell(&CellValue::from("17/07/23")),
            Some(date(2023, 7, 17))
        );
    }

    #[test]
    fn invalid_date_text_is_rejected() {
        assert_eq!(parse_date_cell(&CellValue::from("not a date")), None);
        assert_eq!(parse_date_cell(&CellValue::from("2023-02-30")), None);
        assert_eq!(parse_date_cell(&CellValue::from("")), None);
        assert_eq!(parse_date_cell(&CellValue::Empty), None);
    }

    #[test]
    fn quantities_parse_from_numbers_and_text() {
        assert_eq!(parse_quantity(&CellValue::Number(12.5)), Some(12.5));
        assert_eq!(parse_quantity(&CellValue::from(" 7 ")), Some(7.0));
        assert_eq!(parse_quantity(&CellValue::from("3.25")), Some(3.25));
        assert_eq!(parse_quantity(&CellValue::Number(-2.0)), Some(-2.0));
    }

    #[test]
    fn non_numeric_quantities_are_rejected() {
        assert_eq!(parse_quantity(&CellValue::from("oops")), None);
        assert_eq!(parse_quantity(&CellValue::from("")), None);
        assert_eq!(parse_quantity(&CellValue::Number(f64::INFINITY)), None);
        assert_eq!(parse_quantity(&CellValue::Empty), None);
        assert_eq!(parse_quantity(&CellValue::Date(date(2023, 1, 1))), None);
    }

    #[test]
    fn to_text_renders_each_variant() {
        assert_eq!(CellValue::Empty.to_text(), "");
        assert_eq!(CellValue::Number(10.0).to_text(), "10");
        assert_eq!(CellValue::from("abc").to_text(), "abc");
        assert_eq!(CellValue::Date(date(2023, 1, 5)).to_text(), "2023-01-05");
    }
}

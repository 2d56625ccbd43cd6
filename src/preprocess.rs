//! Feature derivation for raw flight-search records.
//!
//! [`preprocess`] is a pure transformation from an uploaded [`RawTable`] to a
//! [`FeatureTable`]: date, time, and duration strings become numeric columns,
//! stop counts are decoded, and the categorical columns are one-hot encoded
//! with `Column_Value` names. Individual values that fail to parse clean to
//! zero; raw columns that are missing entirely are simply not derived, and
//! schema alignment zero-fills the gap downstream. Row order is preserved
//! 1:1 with the input.

use crate::features::FeatureTable;
use crate::table::{Cell, RawTable};

/// Raw columns that are one-hot encoded rather than parsed numerically.
const CATEGORICAL_COLUMNS: [&str; 3] = ["Airline", "Source", "Destination"];

/// Derive model features from a raw flight table.
#[must_use]
pub fn preprocess(table: &RawTable) -> FeatureTable {
    let rows = table.row_count();
    let mut features = FeatureTable::new(rows);

    if let Some(cells) = table.column("Date_of_Journey") {
        let (days, months) = split_pairs(&cells, parse_journey_date);
        features.push_column("journey_day", days);
        features.push_column("journey_month", months);
    }

    if let Some(cells) = table.column("Dep_Time") {
        let (hours, mins) = split_pairs(&cells, parse_clock);
        features.push_column("dep_hour", hours);
        features.push_column("dep_min", mins);
    }

    if let Some(cells) = table.column("Arrival_Time") {
        let (hours, mins) = split_pairs(&cells, parse_clock);
        features.push_column("arrival_hour", hours);
        features.push_column("arrival_min", mins);
    }

    if let Some(cells) = table.column("Duration") {
        let values = cells
            .iter()
            .map(|cell| parse_value(cell, parse_duration_mins))
            .collect();
        features.push_column("duration_mins", values);
    }

    if let Some(cells) = table.column("Total_Stops") {
        let values = cells
            .iter()
            .map(|cell| parse_value(cell, parse_stops))
            .collect();
        features.push_column("total_stops", values);
    }

    for column in CATEGORICAL_COLUMNS {
        if let Some(cells) = table.column(column) {
            one_hot_encode(&mut features, column, &cells);
        }
    }

    // Numeric columns that were not consumed above pass through unchanged.
    for header in table.headers() {
        if is_consumed_column(header) || features.column(header).is_some() {
            continue;
        }
        if let Some(cells) = table.column(header) {
            let numeric: Vec<Option<f64>> = cells.iter().map(|c| c.as_number()).collect();
            if !numeric.is_empty() && numeric.iter().all(Option::is_some) {
                features.push_column(
                    header.clone(),
                    numeric.into_iter().map(|v| v.unwrap_or(0.0)).collect(),
                );
            }
        }
    }

    features
}

fn is_consumed_column(header: &str) -> bool {
    const CONSUMED: [&str; 5] = [
        "Date_of_Journey",
        "Dep_Time",
        "Arrival_Time",
        "Duration",
        "Total_Stops",
    ];
    CONSUMED
        .iter()
        .chain(CATEGORICAL_COLUMNS.iter())
        .any(|c| c.eq_ignore_ascii_case(header))
}

/// One-hot encode a categorical column as `Column_Value` features, category
/// order being first-seen order. Blank cells contribute zero everywhere.
fn one_hot_encode(features: &mut FeatureTable, column: &str, cells: &[&Cell]) {
    let values: Vec<Option<String>> = cells
        .iter()
        .map(|cell| {
            cell.as_text()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .collect();

    let mut categories: Vec<String> = Vec::new();
    for value in values.iter().flatten() {
        if !categories.contains(value) {
            categories.push(value.clone());
        }
    }

    for category in categories {
        let indicator = values
            .iter()
            .map(|v| {
                if v.as_deref() == Some(category.as_str()) {
                    1.0
                } else {
                    0.0
                }
            })
            .collect();
        features.push_column(format!("{column}_{category}"), indicator);
    }
}

fn parse_value(cell: &Cell, parser: impl Fn(&str) -> Option<f64>) -> f64 {
    match cell {
        Cell::Text(s) => parser(s).unwrap_or(0.0),
        Cell::Number(n) => *n,
        _ => 0.0,
    }
}

fn split_pairs(
    cells: &[&Cell],
    parser: impl Fn(&str) -> Option<(f64, f64)>,
) -> (Vec<f64>, Vec<f64>) {
    cells
        .iter()
        .map(|cell| match cell {
            Cell::Text(s) => parser(s).unwrap_or((0.0, 0.0)),
            _ => (0.0, 0.0),
        })
        .unzip()
}

/// `"24/03/2019"` → `(24, 3)`.
fn parse_journey_date(s: &str) -> Option<(f64, f64)> {
    let mut parts = s.trim().split('/');
    let day: u32 = parts.next()?.trim().parse().ok()?;
    let month: u32 = parts.next()?.trim().parse().ok()?;
    if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
        return None;
    }
    Some((f64::from(day), f64::from(month)))
}

/// `"22:20"` → `(22, 20)`. Arrival times carry a trailing date
/// (`"04:25 10 Jun"`); only the leading clock is read.
fn parse_clock(s: &str) -> Option<(f64, f64)> {
    let clock = s.trim().split_whitespace().next()?;
    let (hour, min) = clock.split_once(':')?;
    let hour: u32 = hour.parse().ok()?;
    let min: u32 = min.parse().ok()?;
    if hour > 23 || min > 59 {
        return None;
    }
    Some((f64::from(hour), f64::from(min)))
}

/// `"2h 50m"` → `170`. Accepts hour-only (`"19h"`) and minute-only
/// (`"45m"`) forms.
fn parse_duration_mins(s: &str) -> Option<f64> {
    let mut total: u32 = 0;
    let mut matched = false;
    for token in s.trim().split_whitespace() {
        if let Some(hours) = token.strip_suffix('h') {
            total += hours.parse::<u32>().ok()?.checked_mul(60)?;
            matched = true;
        } else if let Some(mins) = token.strip_suffix('m') {
            total += mins.parse::<u32>().ok()?;
            matched = true;
        } else {
            return None;
        }
    }
    matched.then_some(f64::from(total))
}

/// `"non-stop"` → `0`, `"1 stop"` → `1`, `"2 stops"` → `2`.
fn parse_stops(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("non-stop") {
        return Some(0.0);
    }
    let count = s.split_whitespace().next()?;
    count.parse::<u32>().ok().map(f64::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::RawTable;

    fn text_row(values: &[&str]) -> Vec<Cell> {
        values
            .iter()
            .map(|v| Cell::Text((*v).to_string()))
            .collect()
    }

    fn flight_table() -> RawTable {
        RawTable::new(
            vec![
                "Airline".to_string(),
                "Date_of_Journey".to_string(),
                "Source".to_string(),
                "Destination".to_string(),
                "Dep_Time".to_string(),
                "Arrival_Time".to_string(),
                "Duration".to_string(),
                "Total_Stops".to_string(),
            ],
            vec![
                text_row(&[
                    "IndiGo",
                    "24/03/2019",
                    "Banglore",
                    "New Delhi",
                    "22:20",
                    "01:10 22 Mar",
                    "2h 50m",
                    "non-stop",
                ]),
                text_row(&[
                    "Air India",
                    "1/05/2019",
                    "Kolkata",
                    "Banglore",
                    "05:50",
                    "13:15",
                    "7h 25m",
                    "2 stops",
                ]),
            ],
        )
    }

    #[test]
    fn test_preprocess_preserves_row_count() {
        let features = preprocess(&flight_table());
        assert_eq!(features.row_count(), 2);
    }

    #[test]
    fn test_date_and_time_derivation() {
        let features = preprocess(&flight_table());
        assert_eq!(features.column("journey_day"), Some(&[24.0, 1.0][..]));
        assert_eq!(features.column("journey_month"), Some(&[3.0, 5.0][..]));
        assert_eq!(features.column("dep_hour"), Some(&[22.0, 5.0][..]));
        assert_eq!(features.column("arrival_hour"), Some(&[1.0, 13.0][..]));
        assert_eq!(features.column("arrival_min"), Some(&[10.0, 15.0][..]));
    }

    #[test]
    fn test_duration_and_stops_derivation() {
        let features = preprocess(&flight_table());
        assert_eq!(features.column("duration_mins"), Some(&[170.0, 445.0][..]));
        assert_eq!(features.column("total_stops"), Some(&[0.0, 2.0][..]));
    }

    #[test]
    fn test_one_hot_encoding_uses_column_value_names() {
        let features = preprocess(&flight_table());
        assert_eq!(features.column("Airline_IndiGo"), Some(&[1.0, 0.0][..]));
        assert_eq!(features.column("Airline_Air India"), Some(&[0.0, 1.0][..]));
        assert_eq!(features.column("Source_Kolkata"), Some(&[0.0, 1.0][..]));
        assert_eq!(
            features.column("Destination_New Delhi"),
            Some(&[1.0, 0.0][..])
        );
    }

    #[test]
    fn test_unparsable_values_clean_to_zero() {
        let table = RawTable::new(
            vec!["Duration".to_string(), "Total_Stops".to_string()],
            vec![text_row(&["soon", "several"])],
        );
        let features = preprocess(&table);
        assert_eq!(features.column("duration_mins"), Some(&[0.0][..]));
        assert_eq!(features.column("total_stops"), Some(&[0.0][..]));
    }

    #[test]
    fn test_missing_raw_columns_derive_nothing() {
        let table = RawTable::new(
            vec!["origin".to_string(), "destination".to_string()],
            vec![text_row(&["BLR", "DEL"])],
        );
        let features = preprocess(&table);
        assert!(features.column("duration_mins").is_none());
        assert_eq!(features.row_count(), 1);
    }

    #[test]
    fn test_numeric_columns_pass_through() {
        let table = RawTable::new(
            vec!["Duration".to_string(), "bag_count".to_string()],
            vec![
                vec![Cell::Text("2h".to_string()), Cell::Number(1.0)],
                vec![Cell::Text("3h".to_string()), Cell::Number(2.0)],
            ],
        );
        let features = preprocess(&table);
        assert_eq!(features.column("bag_count"), Some(&[1.0, 2.0][..]));
    }

    #[test]
    fn test_duration_parser_forms() {
        assert_eq!(parse_duration_mins("2h 50m"), Some(170.0));
        assert_eq!(parse_duration_mins("19h"), Some(1140.0));
        assert_eq!(parse_duration_mins("45m"), Some(45.0));
        assert_eq!(parse_duration_mins(""), None);
        assert_eq!(parse_duration_mins("2 hours"), None);
    }

    #[test]
    fn test_clock_parser_ignores_trailing_date() {
        assert_eq!(parse_clock("04:25 10 Jun"), Some((4.0, 25.0)));
        assert_eq!(parse_clock("23:59"), Some((23.0, 59.0)));
        assert_eq!(parse_clock("24:00"), None);
    }

    #[test]
    fn test_journey_date_parser_bounds() {
        assert_eq!(parse_journey_date("24/03/2019"), Some((24.0, 3.0)));
        assert_eq!(parse_journey_date("32/03/2019"), None);
        assert_eq!(parse_journey_date("12/13/2019"), None);
        assert_eq!(parse_journey_date("March 24"), None);
    }

    #[test]
    fn test_stops_parser() {
        assert_eq!(parse_stops("non-stop"), Some(0.0));
        assert_eq!(parse_stops("1 stop"), Some(1.0));
        assert_eq!(parse_stops("4 stops"), Some(4.0));
        assert_eq!(parse_stops("direct"), None);
    }
}

use chrono::NaiveDate;

const ISO_DATE: &str = "%Y-%m-%d";
const PT_BR_DATE: &str = "%d/%m/%Y";

/// Returns the calendar date portion of a backend date field.
///
/// The backend may answer with a full timestamp (`2024-01-15T00:00:00.000Z`);
/// everything from the first `T` on is dropped. No timezone conversion happens.
pub fn date_only(value: &str) -> &str {
    value.split_once('T').map_or(value, |(date, _)| date)
}

/// Parses the date portion of a backend date field, if it is a valid ISO date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date_only(value).trim(), ISO_DATE).ok()
}

/// Renders a backend date field as `dd/mm/yyyy` (pt-BR).
///
/// Unparseable input is returned untouched so the renderer never loses data.
pub fn display_date(value: &str) -> String {
    parse_date(value).map_or_else(
        || value.to_string(),
        |date| date.format(PT_BR_DATE).to_string(),
    )
}

//! Publish-date resolution for generated posts.
//!
//! Category files carry dates in three shapes: an exact `YYYY-MM-DD`
//! string, a free-text `"Month DD, YYYY"` string, or just a `year` field.
//! [`parse_date`] normalizes all of them to `YYYY-MM-DD`; records where
//! nothing resolves get no date (the caller skips them with a warning).

/// Month-name lookup for the free-text date format, compared
/// case-insensitively.
const MONTHS: [(&str, u32); 12] = [
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("august", 8),
    ("september", 9),
    ("october", 10),
    ("november", 11),
    ("december", 12),
];

/// Resolve a publish date to `YYYY-MM-DD`.
///
/// Accepts, in order: a verbatim `YYYY-MM-DD` string, a `"Month DD, YYYY"`
/// string (month name case-insensitive, comma optional), or a bare year
/// which becomes `YYYY-01-01`. Returns `None` when neither a date string
/// nor a year yields anything usable.
pub fn parse_date(date: Option<&str>, year: Option<i64>) -> Option<String> {
    if let Some(s) = date {
        let s = s.trim();
        if is_ymd(s) {
            return Some(s.to_string());
        }
        if let Some(resolved) = parse_month_name(s) {
            return Some(resolved);
        }
    }
    year.map(|y| format!("{y}-01-01"))
}

/// Estimated publish date for a publication, from its year and type.
///
/// Conferences land mid-year, journals default to January, preprints to
/// July, theses to mid-May. The estimates only exist so posts sort
/// plausibly within a year.
pub fn publication_date(year: i64, pub_type: &str) -> String {
    let month_day = match pub_type {
        "conference" => "06-01",
        "journal" => "01-01",
        "arxiv" | "preprint" => "07-01",
        "thesis" => "05-15",
        _ => "01-01",
    };
    format!("{year}-{month_day}")
}

/// Check for the exact `YYYY-MM-DD` shape (digits and dashes only).
pub(crate) fn is_ymd(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && [0, 1, 2, 3, 5, 6, 8, 9]
            .iter()
            .all(|&i| bytes[i].is_ascii_digit())
}

/// Parse `"Month DD, YYYY"` (e.g. "October 29, 2025", comma optional).
fn parse_month_name(s: &str) -> Option<String> {
    let mut parts = s.split_whitespace();
    let month_word = parts.next()?;
    let day_word = parts.next()?.trim_end_matches(',');
    let year_word = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let month = MONTHS
        .iter()
        .find(|(name, _)| month_word.eq_ignore_ascii_case(name))
        .map(|&(_, n)| n)?;
    let day: u32 = day_word.parse().ok()?;
    let year: i64 = year_word.parse().ok()?;
    if !(1..=31).contains(&day) || year_word.len() != 4 {
        return None;
    }

    Some(format!("{year}-{month:02}-{day:02}"))
}

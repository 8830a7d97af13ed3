use chrono::NaiveDate;

use crate::normalize::coerce_text;

/// Accepted `signing_date` layouts, tried in order. Several are ambiguous
/// against each other (`%d-%m-%y` vs `%m-%d-%y`), so the order decides the
/// result and must not change.
pub const SIGNING_DATE_FORMATS: [&str; 11] = [
    "%d-%m-%y",
    "%d-%m-%Y",
    "%Y.%m.%d",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d/%m/%y",
    "%Y/%m/%d",
    "%d %B %Y",
    "%m-%d-%y",
    "%m/%d/%y",
    "%d/%m/%Y",
];

const MONTHS_FULL: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const MONTHS_ABBR: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Parse a raw signing date cell. Missing cells and strings matching none of
/// [`SIGNING_DATE_FORMATS`] yield `None`.
pub fn parse_signing_date(raw: Option<&str>) -> Option<NaiveDate> {
    let text = coerce_text(raw);
    SIGNING_DATE_FORMATS
        .iter()
        .find_map(|fmt| parse_with_format(text, fmt))
}

/// Index into [`SIGNING_DATE_FORMATS`] of the layout that wins for `text`.
pub fn matching_format(text: &str) -> Option<usize> {
    SIGNING_DATE_FORMATS
        .iter()
        .position(|fmt| parse_with_format(text, fmt).is_some())
}

/// Match `input` against one strptime-style layout. Supports `%d %m %y %Y %b %B`;
/// a space matches one or more whitespace characters and the whole input must
/// be consumed.
pub fn parse_with_format(input: &str, format: &str) -> Option<NaiveDate> {
    let mut rest = input;
    let mut year = None;
    let mut month = None;
    let mut day = None;

    let mut fmt = format.chars();
    while let Some(fc) = fmt.next() {
        if fc == '%' {
            match fmt.next()? {
                'd' => {
                    let (v, r) = take_bounded(rest, 1, 31)?;
                    day = Some(v);
                    rest = r;
                }
                'm' => {
                    let (v, r) = take_bounded(rest, 1, 12)?;
                    month = Some(v);
                    rest = r;
                }
                'y' => {
                    let (v, r) = take_exact_digits(rest, 2)?;
                    // Two-digit pivot: 00-68 is 20xx, 69-99 is 19xx.
                    let century = if v <= 68 { 2000 } else { 1900 };
                    year = Some((century + v) as i32);
                    rest = r;
                }
                'Y' => {
                    let (v, r) = take_exact_digits(rest, 4)?;
                    year = Some(v as i32);
                    rest = r;
                }
                'b' => {
                    let (v, r) = take_month_name(rest, &MONTHS_ABBR)?;
                    month = Some(v);
                    rest = r;
                }
                'B' => {
                    let (v, r) = take_month_name(rest, &MONTHS_FULL)?;
                    month = Some(v);
                    rest = r;
                }
                '%' => rest = rest.strip_prefix('%')?,
                _ => return None,
            }
        } else if fc.is_whitespace() {
            let trimmed = rest.trim_start();
            if trimmed.len() == rest.len() {
                return None;
            }
            rest = trimmed;
        } else {
            rest = rest.strip_prefix(fc)?;
        }
    }

    if !rest.is_empty() {
        return None;
    }
    NaiveDate::from_ymd_opt(year?, month?, day?)
}

// One or two digits whose value lies in [min, max]; prefers two digits.
// A space-padded single digit (" 7") is not accepted.
fn take_bounded(s: &str, min: u32, max: u32) -> Option<(u32, &str)> {
    let digits = s.bytes().take(2).take_while(u8::is_ascii_digit).count();
    for len in (1..=digits).rev() {
        let Ok(v) = s[..len].parse::<u32>() else {
            continue;
        };
        if (min..=max).contains(&v) {
            return Some((v, &s[len..]));
        }
    }
    None
}

fn take_exact_digits(s: &str, len: usize) -> Option<(u32, &str)> {
    let head = s.get(..len)?;
    if !head.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((head.parse().ok()?, &s[len..]))
}

// Longest case-insensitive month-name prefix wins.
fn take_month_name<'a>(s: &'a str, names: &[&str; 12]) -> Option<(u32, &'a str)> {
    names
        .iter()
        .enumerate()
        .filter(|(_, name)| {
            s.get(..name.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(name))
        })
        .max_by_key(|(_, name)| name.len())
        .map(|(idx, name)| (idx as u32 + 1, &s[name.len()..]))
}

//! Parsing and validation of individual raw parameter values.
//!
//! Every function takes the name of the parameter it is validating so that
//! a failure can be reported against that exact field.

use chrono::NaiveDate;

use crate::errors::ValidationError;
use crate::types::Money;

pub const MAX_SEARCH_LENGTH: usize = 500;
pub const MAX_TEXT_FILTER_LENGTH: usize = 200;
pub const MIN_ELECTION_YEAR: i32 = 1900;
pub const MAX_ELECTION_YEAR: i32 = 2100;

/// US states, DC and territories with their names.
pub const STATES: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
    ("DC", "District of Columbia"),
    ("PR", "Puerto Rico"),
    ("VI", "Virgin Islands"),
    ("GU", "Guam"),
    ("AS", "American Samoa"),
    ("MP", "Northern Mariana Islands"),
];

/// Party shorthands accepted on input, mapped to FEC party codes.
const PARTY_ALIASES: &[(&str, &str)] = &[
    ("d", "DEM"),
    ("democrat", "DEM"),
    ("democratic", "DEM"),
    ("r", "REP"),
    ("republican", "REP"),
    ("l", "LIB"),
    ("libertarian", "LIB"),
    ("g", "GRE"),
    ("green", "GRE"),
    ("i", "IND"),
    ("independent", "IND"),
];

/// Name of a state code, falling back to the code itself.
pub fn state_name(code: &str) -> &str {
    STATES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
        .unwrap_or(code)
}

/// Strip ASCII control characters (0x00-0x1F except space 0x20), trim whitespace,
/// and enforce a byte-length limit.
pub fn sanitize_text(field: &str, input: &str, max_len: usize) -> Result<String, ValidationError> {
    if input.len() > max_len {
        return Err(ValidationError::invalid(
            field,
            format!("exceeds maximum length of {} bytes", max_len),
        ));
    }
    let sanitized: String = input
        .chars()
        .filter(|c| !c.is_ascii_control() || *c == ' ')
        .collect::<String>()
        .trim()
        .to_string();
    if sanitized.is_empty() {
        return Err(ValidationError::invalid(field, "must not be empty"));
    }
    Ok(sanitized)
}

/// Validate a search string: enforce length, strip control chars, trim.
pub fn validate_search(input: &str) -> Result<String, ValidationError> {
    sanitize_text("q", input, MAX_SEARCH_LENGTH)
}

/// Validate a free-text partial-match filter value.
pub fn validate_text(field: &str, input: &str) -> Result<String, ValidationError> {
    sanitize_text(field, input, MAX_TEXT_FILTER_LENGTH)
}

/// Validate a US state code: uppercase, check against known states + territories.
pub fn validate_state(field: &str, input: &str) -> Result<String, ValidationError> {
    let upper = input.trim().to_uppercase();
    if STATES.iter().any(|(code, _)| *code == upper) {
        Ok(upper)
    } else {
        Err(ValidationError::invalid(
            field,
            format!(
                "unknown state code '{}'. Valid codes: AL, AK, AZ, ... DC, PR, VI (50 states + DC + territories)",
                input
            ),
        ))
    }
}

/// Validate a value against a closed set of upper-case codes.
pub fn validate_code<'a>(
    field: &str,
    input: &str,
    allowed: impl IntoIterator<Item = &'a str>,
) -> Result<String, ValidationError> {
    let upper = input.trim().to_uppercase();
    let allowed: Vec<&str> = allowed.into_iter().collect();
    if allowed.contains(&upper.as_str()) {
        Ok(upper)
    } else {
        Err(ValidationError::invalid(
            field,
            format!("unknown value '{}'. Valid values: {}", input, allowed.join(", ")),
        ))
    }
}

/// Validate a party: FEC three-letter code or a shorthand like `d`, `republican`.
pub fn validate_party(field: &str, input: &str) -> Result<String, ValidationError> {
    let lower = input.trim().to_lowercase();
    if let Some((_, code)) = PARTY_ALIASES.iter().find(|(alias, _)| *alias == lower) {
        return Ok(code.to_string());
    }
    if lower.len() == 3 && lower.chars().all(|c| c.is_ascii_alphabetic()) {
        return Ok(lower.to_uppercase());
    }
    Err(ValidationError::invalid(
        field,
        format!(
            "unknown party '{}'. Use a three-letter code (DEM, REP, LIB, ...) or democrat (d), republican (r)",
            input
        ),
    ))
}

/// Validate a House district: one to three ASCII alphanumerics (e.g. `07`, `AL`).
/// Numeric districts are zero-padded to two digits, as they are stored.
pub fn validate_district(field: &str, input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if (1..=3).contains(&trimmed.len()) && trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        match trimmed.parse::<u16>() {
            Ok(n) => Ok(format!("{:02}", n)),
            Err(_) => Ok(trimmed.to_uppercase()),
        }
    } else {
        Err(ValidationError::invalid(
            field,
            format!("'{}' is not a district code", input),
        ))
    }
}

/// Validate a record identifier: a positive integer. Existence is not checked.
pub fn validate_id(field: &str, input: &str) -> Result<i64, ValidationError> {
    match input.trim().parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(ValidationError::invalid(
            field,
            format!("'{}' is not a valid identifier (positive integer)", input),
        )),
    }
}

/// Parse an ISO-8601 calendar date (`YYYY-MM-DD`).
pub fn parse_date(field: &str, input: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|e| {
        ValidationError::invalid(field, format!("'{}' is not a YYYY-MM-DD date: {}", input, e))
    })
}

/// Parse a non-negative dollar amount.
pub fn parse_amount(field: &str, input: &str) -> Result<Money, ValidationError> {
    input
        .parse::<Money>()
        .map_err(|e| ValidationError::invalid(field, format!("'{}': {}", input, e)))
}

/// Parse a boolean flag: true/false, 1/0, yes/no.
pub fn parse_bool(field: &str, input: &str) -> Result<bool, ValidationError> {
    match input.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ValidationError::invalid(
            field,
            format!("'{}' is not a boolean (true/false)", input),
        )),
    }
}

/// Parse an election year within the supported range.
pub fn parse_year(field: &str, input: &str) -> Result<i32, ValidationError> {
    match input.trim().parse::<i32>() {
        Ok(year) if (MIN_ELECTION_YEAR..=MAX_ELECTION_YEAR).contains(&year) => Ok(year),
        _ => Err(ValidationError::invalid(
            field,
            format!(
                "'{}' is not a year between {} and {}",
                input, MIN_ELECTION_YEAR, MAX_ELECTION_YEAR
            ),
        )),
    }
}

/// Validate page number (must be >= 1).
pub fn validate_page(page: i64) -> Result<u32, ValidationError> {
    if page < 1 {
        return Err(ValidationError::invalid("page", "must be >= 1"));
    }
    u32::try_from(page).map_err(|_| ValidationError::invalid("page", "is too large"))
}

/// Validate page size (must be >= 1). Values above the configured maximum are
/// clamped later by the paginator rather than rejected here.
pub fn validate_page_size(page_size: i64) -> Result<u32, ValidationError> {
    if page_size < 1 {
        return Err(ValidationError::invalid("page_size", "must be >= 1"));
    }
    Ok(u32::try_from(page_size).unwrap_or(u32::MAX))
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;

use super::*;

// -- State validation --

#[test]
fn state_valid_uppercase() {
    assert_eq!(validate_state("state", "MD").unwrap(), "MD");
}

#[test]
fn state_valid_lowercase() {
    assert_eq!(validate_state("state", "md").unwrap(), "MD");
}

#[test]
fn state_valid_territory() {
    assert_eq!(validate_state("state", "pr").unwrap(), "PR");
    assert_eq!(validate_state("state", "gu").unwrap(), "GU");
}

#[test]
fn state_invalid_names_field() {
    let err = validate_state("contributor_state", "XX").unwrap_err();
    assert_eq!(err.field(), "contributor_state");
}

#[test]
fn state_too_long() {
    assert!(validate_state("state", "MARYLAND").is_err());
}

#[test]
fn state_names() {
    assert_eq!(state_name("MD"), "Maryland");
    assert_eq!(state_name("ZZ"), "ZZ");
}

// -- Codes --

#[test]
fn code_case_insensitive() {
    assert_eq!(
        validate_code("office", "s", ["H", "S", "P"]).unwrap(),
        "S"
    );
}

#[test]
fn code_unknown_lists_valid_values() {
    let err = validate_code("office", "governor", ["H", "S", "P"]).unwrap_err();
    assert_eq!(err.field(), "office");
    assert!(err.to_string().contains("H, S, P"));
}

// -- Party --

#[test]
fn party_shorthand() {
    assert_eq!(validate_party("party", "d").unwrap(), "DEM");
    assert_eq!(validate_party("party", "Republican").unwrap(), "REP");
}

#[test]
fn party_three_letter_code() {
    assert_eq!(validate_party("party", "wfp").unwrap(), "WFP");
}

#[test]
fn party_invalid() {
    assert!(validate_party("party", "whig party").is_err());
    assert!(validate_party("party", "d3m").is_err());
}

// -- District --

#[test]
fn district_values() {
    assert_eq!(validate_district("district", "07").unwrap(), "07");
    assert_eq!(validate_district("district", "al").unwrap(), "AL");
    assert_eq!(validate_district("district", "7").unwrap(), "07");
    assert_eq!(validate_district("district", " 007 ").unwrap(), "07");
    assert_eq!(validate_district("district", "12").unwrap(), "12");
    assert!(validate_district("district", "").is_err());
    assert!(validate_district("district", "1234").is_err());
    assert!(validate_district("district", "1;").is_err());
}

// -- Identifiers --

#[test]
fn id_positive() {
    assert_eq!(validate_id("committee_id", "42").unwrap(), 42);
}

#[test]
fn id_rejects_zero_negative_and_text() {
    assert!(validate_id("committee_id", "0").is_err());
    assert!(validate_id("committee_id", "-3").is_err());
    assert!(validate_id("committee_id", "C00123").is_err());
    assert!(validate_id("committee_id", "1 OR 1=1").is_err());
}

// -- Dates --

#[test]
fn date_iso() {
    assert_eq!(
        parse_date("start_date", "2024-02-29").unwrap(),
        NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
    );
}

#[test]
fn date_invalid() {
    assert!(parse_date("start_date", "2023-02-29").is_err());
    assert!(parse_date("start_date", "02/01/2024").is_err());
    assert_eq!(
        parse_date("end_date", "yesterday").unwrap_err().field(),
        "end_date"
    );
}

// -- Amounts --

#[test]
fn amount_parses() {
    assert_eq!(parse_amount("min_amount", "200").unwrap().cents(), 20_000);
}

#[test]
fn amount_negative_rejected() {
    let err = parse_amount("min_amount", "-1").unwrap_err();
    assert_eq!(err.field(), "min_amount");
}

// -- Booleans and years --

#[test]
fn bool_variants() {
    assert!(parse_bool("is_active", "TRUE").unwrap());
    assert!(parse_bool("is_active", "1").unwrap());
    assert!(!parse_bool("is_active", "no").unwrap());
    assert!(parse_bool("is_active", "maybe").is_err());
}

#[test]
fn year_range() {
    assert_eq!(parse_year("election_year", "2024").unwrap(), 2024);
    assert!(parse_year("election_year", "1776").is_err());
    assert!(parse_year("election_year", "twenty").is_err());
}

// -- Text --

#[test]
fn sanitize_strips_control_chars() {
    assert_eq!(
        sanitize_text("name", "  Smi\u{0007}th \n", 100).unwrap(),
        "Smith"
    );
}

#[test]
fn sanitize_rejects_whitespace_only() {
    let err = validate_search("   \t ").unwrap_err();
    assert_eq!(err.field(), "q");
}

#[test]
fn sanitize_rejects_too_long() {
    let long = "a".repeat(MAX_SEARCH_LENGTH + 1);
    assert!(validate_search(&long).is_err());
}

// -- Pagination --

#[test]
fn page_must_be_positive() {
    assert_eq!(validate_page(1).unwrap(), 1);
    assert!(validate_page(0).is_err());
    assert!(validate_page(-4).is_err());
}

#[test]
fn page_size_must_be_positive() {
    assert_eq!(validate_page_size(25).unwrap(), 25);
    assert_eq!(validate_page_size(0).unwrap_err().field(), "page_size");
    assert_eq!(validate_page_size(i64::MAX).unwrap(), u32::MAX);
}

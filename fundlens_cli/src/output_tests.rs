use super::*;
use chrono::NaiveDate;
use fundlens_lib::types::{CandidateTotals, Fundraiser};
use serde_json::json;

fn sample_candidate() -> Candidate {
    Candidate {
        id: 1,
        name: "Jane Smith".into(),
        office: "H".into(),
        state: Some("MD".into()),
        district: Some("07".into()),
        party: Some("DEM".into()),
        election_year: 2024,
        is_active: true,
    }
}

fn sample_contribution() -> Contribution {
    Contribution {
        id: 1000,
        contributor_id: 100,
        committee_id: 10,
        amount: Money::from_cents(1_234_567),
        date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
        contribution_type: "DIRECT".into(),
        election_type: Some("PRIMARY".into()),
        election_year: 2024,
        memo_text: None,
    }
}

fn csv_from_rows<T: Serialize>(rows: &[T]) -> String {
    let mut buf = Vec::new();
    write_csv(&mut buf, rows).unwrap();
    String::from_utf8(buf).unwrap()
}

// -- format_money tests --

#[test]
fn test_format_money_groups_thousands() {
    assert_eq!(format_money(Money::from_cents(1_234_567)), "$12,345.67");
    assert_eq!(format_money(Money::from_dollars(1_000_000)), "$1,000,000.00");
}

#[test]
fn test_format_money_small() {
    assert_eq!(format_money(Money::from_cents(5)), "$0.05");
    assert_eq!(format_money(Money::from_dollars(999)), "$999.00");
}

#[test]
fn test_format_money_zero() {
    assert_eq!(format_money(Money::ZERO), "$0.00");
}

// -- Row builder tests --

#[test]
fn test_build_candidate_rows_mapping() {
    let rows = build_candidate_rows(&[sample_candidate()]);
    let row = &rows[0];
    assert_eq!(row.name, "Jane Smith");
    assert_eq!(row.state, "MD");
    assert_eq!(row.district, "07");
    assert_eq!(row.active, "yes");
}

#[test]
fn test_build_contribution_rows_mapping() {
    let rows = build_contribution_rows(&[sample_contribution()]);
    let row = &rows[0];
    assert_eq!(row.date, "2024-03-05");
    assert_eq!(row.amount, "$12,345.67");
    assert_eq!(row.election, "PRIMARY 2024");
    assert_eq!(row.committee_id, 10);
}

#[test]
fn test_build_committee_rows_without_candidate() {
    let committee = Committee {
        id: 12,
        name: "Good Government PAC".into(),
        committee_type: "Q".into(),
        state: None,
        city: None,
        party: None,
        candidate_id: None,
        is_active: false,
    };
    let rows = build_committee_rows(&[committee]);
    assert_eq!(rows[0].candidate_id, "");
    assert_eq!(rows[0].active, "no");
}

#[test]
fn test_build_race_rows_uses_top_fundraiser() {
    let race = RaceSummary {
        office: "H".into(),
        office_label: "U.S. House".into(),
        candidate_count: 2,
        active_candidate_count: 1,
        total_raised: Money::from_dollars(1500),
        top_fundraisers: vec![Fundraiser {
            candidate: sample_candidate(),
            total_raised: Money::from_dollars(1000),
        }],
    };
    let rows = build_race_rows(&[race]);
    assert_eq!(rows[0].office, "U.S. House");
    assert_eq!(rows[0].raised, "$1,500.00");
    assert_eq!(rows[0].top_fundraiser, "Jane Smith ($1,000.00)");
}

#[test]
fn test_build_race_candidate_rows_formats_average() {
    let candidate = RaceCandidate {
        id: 1,
        name: "Jane Smith".into(),
        party: Some("DEM".into()),
        is_active: true,
        stats: CandidateTotals {
            total_contributions: 3,
            total_amount: Money::from_cents(1_034_900),
            unique_contributors: 2,
            average_amount: Some(3449.6666),
        },
    };
    let rows = build_race_candidate_rows(&[candidate]);
    assert_eq!(rows[0].raised, "$10,349.00");
    assert_eq!(rows[0].average, "$3,449.67");
    assert_eq!(rows[0].contributors, 2);
}

#[test]
fn test_build_race_candidate_rows_without_money() {
    let candidate = RaceCandidate {
        id: 2,
        name: "Bob Jones".into(),
        party: None,
        is_active: false,
        stats: CandidateTotals::zero(),
    };
    let rows = build_race_candidate_rows(&[candidate]);
    assert_eq!(rows[0].raised, "$0.00");
    assert_eq!(rows[0].average, "");
    assert_eq!(rows[0].active, "no");
}

#[test]
fn test_build_top_contributor_rows_mapping() {
    let ranked = TopContributor {
        contributor: Contributor {
            id: 100,
            name: "MARÍA MUÑOZ".into(),
            entity_type: "IND".into(),
            employer: None,
            occupation: None,
            city: Some("Baltimore".into()),
            state: Some("MD".into()),
            zip: None,
        },
        total_amount: Money::from_cents(1_059_900),
        total_contributions: 3,
        unique_recipients: 2,
    };
    let rows = build_top_contributor_rows(&[ranked]);
    assert_eq!(rows[0].name, "MARÍA MUÑOZ");
    assert_eq!(rows[0].total, "$10,599.00");
    assert_eq!(rows[0].recipients, 2);
}

#[test]
fn test_build_recipient_rows_dates() {
    let recipient = Recipient {
        committee: Committee {
            id: 10,
            name: "Smith for Congress".into(),
            committee_type: "H".into(),
            state: Some("MD".into()),
            city: None,
            party: Some("DEM".into()),
            candidate_id: Some(1),
            is_active: true,
        },
        total_contributions: 2,
        total_amount: Money::from_cents(1_009_900),
        first_date: NaiveDate::from_ymd_opt(2024, 1, 15),
        last_date: None,
    };
    let rows = build_recipient_rows(&[recipient]);
    assert_eq!(rows[0].name, "Smith for Congress");
    assert_eq!(rows[0].first_date, "2024-01-15");
    assert_eq!(rows[0].last_date, "");
}

#[test]
fn test_build_rows_empty() {
    assert!(build_candidate_rows(&[]).is_empty());
    assert!(build_contribution_rows(&[]).is_empty());
}

// -- CSV output tests --

#[test]
fn test_csv_contribution_headers() {
    let rows = build_contribution_rows(&[sample_contribution()]);
    let csv = csv_from_rows(&rows);
    let header = csv.lines().next().unwrap();
    assert_eq!(header, "ID,Date,Amount,Type,Election,Contributor,Committee");
}

#[test]
fn test_csv_quotes_commas_in_amount() {
    let rows = build_contribution_rows(&[sample_contribution()]);
    let csv = csv_from_rows(&rows);
    assert!(csv.contains("\"$12,345.67\""));
}

#[test]
fn test_csv_candidate_headers() {
    let rows = build_candidate_rows(&[sample_candidate()]);
    let csv = csv_from_rows(&rows);
    let header = csv.lines().next().unwrap();
    assert_eq!(header, "ID,Name,Office,State,District,Party,Year,Active");
}

// -- Key/value flattening --

#[test]
fn test_key_value_rows_flatten_nested() {
    let value = json!({
        "total": "10.00",
        "by_type": [{"key": "DIRECT", "count": 2}],
        "first_date": null
    });
    let rows = key_value_rows(&value);
    let fields: Vec<&str> = rows.iter().map(|r| r.field.as_str()).collect();
    assert!(fields.contains(&"total"));
    assert!(fields.contains(&"by_type[0].key"));
    assert!(fields.contains(&"by_type[0].count"));
    let first = rows.iter().find(|r| r.field == "first_date").unwrap();
    assert_eq!(first.value, "");
}

// -- Field selection --

#[test]
fn test_parse_fields_trims_and_skips_empty() {
    assert_eq!(
        parse_fields(" id, name,,meta.total_items "),
        vec!["id", "name", "meta.total_items"]
    );
}

#[test]
fn test_select_fields_on_page() {
    let page = json!({
        "items": [
            {"id": 1, "name": "Jane Smith", "office": "H"},
            {"id": 2, "name": "John Smithers", "office": "S"}
        ],
        "meta": {"page": 1, "total_items": 2, "has_next": false}
    });
    let fields = parse_fields("id,name,meta.total_items");
    assert_eq!(
        select_fields(&page, &fields),
        json!({
            "items": [
                {"id": 1, "name": "Jane Smith"},
                {"id": 2, "name": "John Smithers"}
            ],
            "meta": {"total_items": 2}
        })
    );
}

#[test]
fn test_select_fields_meta_only_drops_items() {
    let page = json!({"items": [{"id": 1}], "meta": {"page": 1, "total_pages": 1}});
    let selected = select_fields(&page, &parse_fields("meta.total_pages"));
    assert_eq!(selected, json!({"meta": {"total_pages": 1}}));
}

#[test]
fn test_select_fields_listing_stats() {
    let listing = json!({
        "items": [{"id": 1, "amount": "5.00"}],
        "meta": {"total_items": 1},
        "stats": {"total_amount": "5.00", "total_contributions": 1}
    });
    let selected = select_fields(&listing, &parse_fields("amount,stats.total_amount"));
    assert_eq!(
        selected,
        json!({"items": [{"amount": "5.00"}], "stats": {"total_amount": "5.00"}})
    );
}

#[test]
fn test_select_fields_nested_record() {
    let record = json!({
        "contribution": {"id": 5, "amount": "1.00"},
        "committee": {"id": 10, "name": "Smith for Congress"},
        "candidate": null
    });
    let selected = select_fields(&record, &parse_fields("contribution.amount,committee.name"));
    assert_eq!(
        selected,
        json!({
            "contribution": {"amount": "1.00"},
            "committee": {"name": "Smith for Congress"}
        })
    );
}

#[test]
fn test_select_fields_unknown_paths_dropped() {
    let record = json!({"id": 1});
    assert_eq!(select_fields(&record, &parse_fields("nope.deeper")), json!({}));
}

#[test]
fn test_output_format_parse() {
    assert_eq!(OutputFormat::parse("json"), OutputFormat::Json);
    assert_eq!(OutputFormat::parse("markdown"), OutputFormat::Markdown);
    assert_eq!(OutputFormat::parse("xml"), OutputFormat::Xml);
    assert_eq!(OutputFormat::parse("anything"), OutputFormat::Table);
}

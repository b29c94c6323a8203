//! End-to-end tests of the entity services over a seeded in-memory database.

use chrono::NaiveDate;
use fundlens_lib::types::{Candidate, Committee, Contribution, Contributor, Money};
use fundlens_lib::{
    Aggregation, CandidateFilter, CandidateService, CommitteeFilter, CommitteeService,
    ContributionFilter, ContributionService, ContributionSortBy, ContributorFilter,
    ContributorService, Criteria, Db, FilterSpec, FundLensError, MetadataService, PageRequest,
    PaginationConfig, Paginator, RaceService, RecipientSortBy, SearchQuery, SearchScope, Sort,
    SortDirection, StateService, ValidationError,
};

fn candidate(id: i64, name: &str, office: &str, state: Option<&str>, active: bool) -> Candidate {
    Candidate {
        id,
        name: name.into(),
        office: office.into(),
        state: state.map(Into::into),
        district: None,
        party: Some("DEM".into()),
        election_year: 2024,
        is_active: active,
    }
}

fn committee(id: i64, name: &str, kind: &str, candidate_id: Option<i64>) -> Committee {
    Committee {
        id,
        name: name.into(),
        committee_type: kind.into(),
        state: Some("MD".into()),
        city: Some("Baltimore".into()),
        party: None,
        candidate_id,
        is_active: true,
    }
}

fn contributor(id: i64, name: &str, state: &str, employer: Option<&str>) -> Contributor {
    Contributor {
        id,
        name: name.into(),
        entity_type: "IND".into(),
        employer: employer.map(Into::into),
        occupation: None,
        city: None,
        state: Some(state.into()),
        zip: None,
    }
}

fn contribution(
    id: i64,
    contributor_id: i64,
    committee_id: i64,
    dollars: i64,
    date: &str,
    kind: &str,
) -> Contribution {
    Contribution {
        id,
        contributor_id,
        committee_id,
        amount: Money::from_dollars(dollars),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        contribution_type: kind.into(),
        election_type: Some("PRIMARY".into()),
        election_year: 2024,
        memo_text: None,
    }
}

fn seeded() -> Db {
    let db = Db::open_in_memory().expect("open db");
    db.init().expect("init db");

    let mut jane = candidate(1, "Jane Smith", "H", Some("MD"), true);
    jane.district = Some("07".into());
    for c in [
        jane,
        candidate(2, "John Smithers", "S", Some("MD"), true),
        candidate(3, "Smith", "P", None, false),
        candidate(4, "Smithfield Adams", "S", Some("VA"), true),
    ] {
        db.upsert_candidate(&c).unwrap();
    }
    for c in [
        committee(10, "Smith for Congress", "H", Some(1)),
        committee(11, "Smithers Victory Fund", "S", Some(2)),
        committee(12, "Good Government PAC", "Q", None),
        committee(13, "Adams for Senate", "S", Some(4)),
    ] {
        db.upsert_committee(&c).unwrap();
    }
    for c in [
        contributor(100, "Alice Donor", "MD", Some("Acme Corp")),
        contributor(101, "Bob Giver", "VA", Some("Smith & Sons")),
        contributor(102, "Carol Payer", "MD", None),
        contributor(103, "Sam Smith", "VA", None),
    ] {
        db.upsert_contributor(&c).unwrap();
    }
    let mut rows = vec![
        contribution(1000, 100, 10, 100, "2024-01-15", "DIRECT"),
        contribution(1001, 101, 10, 250, "2024-02-10", "DIRECT"),
        contribution(1002, 100, 10, 9999, "2024-03-05", "EARMARKED"),
        contribution(1003, 100, 11, 500, "2024-04-01", "DIRECT"),
        contribution(1004, 102, 12, 75, "2024-05-01", "IN_KIND"),
        contribution(1005, 101, 13, 1000, "2024-06-01", "DIRECT"),
    ];
    rows[4].amount = Money::from_cents(7_550);
    for c in &rows {
        db.upsert_contribution(c).unwrap();
    }
    db
}

fn paginator() -> Paginator {
    Paginator::new(PaginationConfig::default())
}

fn criteria(pairs: &[(&str, &str)]) -> Criteria {
    Criteria::from_pairs(pairs.iter().copied()).unwrap()
}

fn page(n: i64, size: i64) -> PageRequest {
    PageRequest::new(n, Some(size)).unwrap()
}

#[test]
fn committee_min_amount_scenario() {
    let db = seeded();
    let p = paginator();
    let svc = ContributionService::new(&db, &p);
    let filter =
        ContributionFilter::from_criteria(&criteria(&[("committee_id", "10"), ("min_amount", "200")]))
            .unwrap();

    let listed = svc.list(&filter, &Sort::default(), PageRequest::first()).unwrap();
    let amounts: Vec<Money> = listed.items.iter().map(|c| c.amount).collect();
    assert_eq!(amounts, vec![Money::from_dollars(250), Money::from_dollars(9999)]);
    assert_eq!(listed.meta.total_items, 2);

    let stats = svc.stats(&filter, &Aggregation::all()).unwrap();
    assert_eq!(stats.total_contributions, 2);
    assert_eq!(stats.total_amount, Money::from_dollars(10_249));
}

#[test]
fn pagination_metadata_and_past_end() {
    let db = seeded();
    let p = paginator();
    let svc = ContributionService::new(&db, &p);
    let filter = ContributionFilter::default();

    let first = svc.list(&filter, &Sort::default(), page(1, 4)).unwrap();
    assert_eq!(first.items.len(), 4);
    assert_eq!(first.meta.total_items, 6);
    assert_eq!(first.meta.total_pages, 2);
    assert!(first.meta.has_next);
    assert!(!first.meta.has_prev);

    let second = svc.list(&filter, &Sort::default(), page(2, 4)).unwrap();
    assert_eq!(second.items.len(), 2);
    assert!(!second.meta.has_next);

    let beyond = svc.list(&filter, &Sort::default(), page(9, 4)).unwrap();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.meta.total_items, 6);
    assert_eq!(beyond.meta.total_pages, 2);
    assert!(!beyond.meta.has_next);
    assert!(beyond.meta.has_prev);
}

#[test]
fn page_size_above_maximum_is_clamped() {
    let db = seeded();
    let p = Paginator::new(PaginationConfig {
        default_page_size: 2,
        max_page_size: 3,
    });
    let svc = CandidateService::new(&db, &p);
    let result = svc
        .list(&CandidateFilter::default(), &Sort::default(), page(1, 100))
        .unwrap();
    assert_eq!(result.meta.page_size, 3);
    assert_eq!(result.items.len(), 3);

    let defaulted = svc
        .list(&CandidateFilter::default(), &Sort::default(), PageRequest::first())
        .unwrap();
    assert_eq!(defaulted.items.len(), 2);
}

#[test]
fn sum_over_all_pages_equals_stats_total() {
    let db = seeded();
    let p = paginator();
    let svc = ContributionService::new(&db, &p);
    let filter = ContributionFilter::default();

    let mut sum = 0i64;
    let mut seen = Vec::new();
    let mut n = 1;
    loop {
        let result = svc.list(&filter, &Sort::default(), page(n, 2)).unwrap();
        for c in &result.items {
            sum += c.amount.cents();
            seen.push(c.id);
        }
        if !result.meta.has_next {
            break;
        }
        n += 1;
    }
    let stats = svc.stats(&filter, &[Aggregation::Total]).unwrap();
    assert_eq!(Money::from_cents(sum), stats.total_amount);
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), 6);
}

#[test]
fn unknown_key_and_inverted_range_fail_validation() {
    let err = ContributionFilter::from_criteria(&criteria(&[("satate", "MD")])).unwrap_err();
    assert!(matches!(err, ValidationError::UnknownFilter { .. }));
    assert_eq!(err.field(), "satate");

    let err = ContributionFilter::from_criteria(&criteria(&[
        ("min_amount", "500"),
        ("max_amount", "100"),
    ]))
    .unwrap_err();
    assert_eq!(err.field(), "min_amount");
}

#[test]
fn whitespace_search_is_rejected() {
    let err = SearchQuery::parse("   ").unwrap_err();
    assert_eq!(err.field(), "q");
}

#[test]
fn search_ranks_exact_then_prefix_then_substring() {
    let db = seeded();
    let p = paginator();
    let svc = CandidateService::new(&db, &p);
    let q = SearchQuery::parse("smith").unwrap();
    let result = svc
        .search(&q, &CandidateFilter::default(), PageRequest::first())
        .unwrap();
    let ids: Vec<i64> = result.items.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![3, 4, 1, 2]);
}

#[test]
fn contributor_wide_search_ranks_employer_matches_last() {
    let db = seeded();
    let p = paginator();
    let svc = ContributorService::new(&db, &p);
    let q = SearchQuery::parse("smith").unwrap();

    let wide = svc
        .search(
            &q,
            SearchScope::NameEmployerOccupation,
            &ContributorFilter::default(),
            PageRequest::first(),
        )
        .unwrap();
    let ids: Vec<i64> = wide.items.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![103, 101]);

    let narrow = svc
        .search(&q, SearchScope::Name, &ContributorFilter::default(), PageRequest::first())
        .unwrap();
    assert_eq!(narrow.meta.total_items, 1);
}

#[test]
fn contribution_search_matches_contributor_name() {
    let db = seeded();
    let p = paginator();
    let svc = ContributionService::new(&db, &p);
    let q = SearchQuery::parse("alice").unwrap();
    let result = svc
        .search(&q, &ContributionFilter::default(), PageRequest::first())
        .unwrap();
    let ids: Vec<i64> = result.items.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![1000, 1002, 1003]);
}

#[test]
fn missing_records_are_not_found() {
    let db = seeded();
    let p = paginator();
    let err = CandidateService::new(&db, &p).get(999).unwrap_err();
    assert!(matches!(err, FundLensError::NotFound { entity: "candidate", .. }));
    let err = ContributorService::new(&db, &p).giving(999).unwrap_err();
    assert!(matches!(err, FundLensError::NotFound { .. }));
}

#[test]
fn repeated_list_is_identical() {
    let db = seeded();
    let p = paginator();
    let svc = ContributionService::new(&db, &p);
    let filter = ContributionFilter::default().with_contribution_type("DIRECT");
    let sort = Sort::new(ContributionSortBy::Date, SortDirection::Desc);
    let a = svc.list(&filter, &sort, page(1, 2)).unwrap();
    let b = svc.list(&filter, &sort, page(1, 2)).unwrap();
    assert_eq!(a, b);
    let dates: Vec<String> = a.items.iter().map(|c| c.date.to_string()).collect();
    assert_eq!(dates, vec!["2024-06-01", "2024-04-01"]);
}

#[test]
fn relation_scopes_never_duplicate_parents() {
    let db = seeded();
    let p = paginator();

    // Alice gave to committee 10 twice.
    let donors = ContributorService::new(&db, &p)
        .by_committee(10, PageRequest::first())
        .unwrap();
    let ids: Vec<i64> = donors.items.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![100, 101]);
    assert_eq!(donors.meta.total_items, 2);

    let candidates = CandidateService::new(&db, &p)
        .by_contributor(100, PageRequest::first())
        .unwrap();
    let ids: Vec<i64> = candidates.items.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![1, 2]);

    let committees = CommitteeService::new(&db, &p)
        .by_contributor(100, PageRequest::first())
        .unwrap();
    assert_eq!(committees.meta.total_items, 2);

    let by_candidate = ContributorService::new(&db, &p)
        .by_candidate(1, PageRequest::first())
        .unwrap();
    assert_eq!(by_candidate.meta.total_items, 2);
}

#[test]
fn by_relation_listings() {
    let db = seeded();
    let p = paginator();
    let contributions = ContributionService::new(&db, &p);
    assert_eq!(
        contributions
            .by_candidate(1, PageRequest::first())
            .unwrap()
            .meta
            .total_items,
        3
    );
    assert_eq!(
        contributions
            .by_contributor(101, PageRequest::first())
            .unwrap()
            .meta
            .total_items,
        2
    );
    let committees = CommitteeService::new(&db, &p)
        .by_candidate(2, PageRequest::first())
        .unwrap();
    assert_eq!(committees.items[0].id, 11);
}

#[test]
fn get_full_expands_one_level() {
    let db = seeded();
    let p = paginator();
    let svc = ContributionService::new(&db, &p);

    let full = svc.get_full(1003).unwrap();
    assert_eq!(full.contributor.id, 100);
    assert_eq!(full.committee.id, 11);
    assert_eq!(full.candidate.map(|c| c.id), Some(2));

    let pac = svc.get_full(1004).unwrap();
    assert!(pac.candidate.is_none());
}

#[test]
fn stats_over_empty_set_are_zero() {
    let db = seeded();
    let p = paginator();
    let svc = ContributionService::new(&db, &p);
    let filter =
        ContributionFilter::from_criteria(&criteria(&[("min_amount", "1000000")])).unwrap();
    let stats = svc.stats(&filter, &Aggregation::all()).unwrap();
    assert_eq!(stats.total_contributions, 0);
    assert_eq!(stats.total_amount, Money::ZERO);
    assert_eq!(stats.average_amount, None);
    assert_eq!(stats.min_amount, None);
    assert_eq!(stats.max_amount, None);
    assert_eq!(stats.unique_contributors, Some(0));
    assert_eq!(stats.first_date, None);
    assert!(stats.by_contribution_type.is_empty());
}

#[test]
fn list_with_stats_agree() {
    let db = seeded();
    let p = paginator();
    let svc = ContributionService::new(&db, &p);
    let filter = ContributionFilter::default().with_committee_id(10);
    let listing = svc
        .list_with_stats(&filter, &Sort::default(), PageRequest::first(), &Aggregation::all())
        .unwrap();
    let hand_sum: i64 = listing.page.items.iter().map(|c| c.amount.cents()).sum();
    assert_eq!(Money::from_cents(hand_sum), listing.stats.total_amount);
    assert_eq!(listing.page.meta.total_items, listing.stats.total_contributions);

    let direct = listing
        .stats
        .by_contribution_type
        .iter()
        .find(|r| r.key.as_deref() == Some("DIRECT"))
        .unwrap();
    assert_eq!(direct.count, 2);
    assert_eq!(direct.total_amount, Some(Money::from_dollars(350)));
}

#[test]
fn fundraising_for_candidate() {
    let db = seeded();
    let p = paginator();
    let stats = CandidateService::new(&db, &p).fundraising(1).unwrap();
    assert_eq!(stats.total_contributions, 3);
    assert_eq!(stats.total_amount, Money::from_dollars(10_349));
    assert_eq!(stats.unique_contributors, Some(2));
    assert_eq!(stats.min_amount, Some(Money::from_dollars(100)));
    assert_eq!(stats.max_amount, Some(Money::from_dollars(9999)));
    assert_eq!(stats.first_date, NaiveDate::from_ymd_opt(2024, 1, 15));
    assert_eq!(stats.last_date, NaiveDate::from_ymd_opt(2024, 3, 5));

    let none = CandidateService::new(&db, &p).fundraising(3).unwrap();
    assert_eq!(none.total_contributions, 0);
}

#[test]
fn cross_entity_contribution_filters() {
    let db = seeded();
    let p = paginator();
    let svc = ContributionService::new(&db, &p);

    let md_donors =
        ContributionFilter::from_criteria(&criteria(&[("contributor_state", "md")])).unwrap();
    assert_eq!(
        svc.list(&md_donors, &Sort::default(), PageRequest::first())
            .unwrap()
            .meta
            .total_items,
        4
    );

    let senate =
        ContributionFilter::from_criteria(&criteria(&[("candidate_office", "S")])).unwrap();
    let ids: Vec<i64> = svc
        .list(&senate, &Sort::default(), PageRequest::first())
        .unwrap()
        .items
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec![1003, 1005]);
}

#[test]
fn like_metacharacters_match_literally() {
    let db = seeded();
    let p = paginator();
    let svc = CommitteeService::new(&db, &p);
    for term in ["%", "_", "\\"] {
        let filter = CommitteeFilter::default().with_name(term);
        let result = svc
            .list(&filter, &Sort::default(), PageRequest::first())
            .unwrap();
        assert_eq!(result.meta.total_items, 0, "term {:?}", term);
    }
    let ampersand = ContributorFilter::default().with_employer("Smith & S");
    let result = ContributorService::new(&db, &p)
        .list(&ampersand, &Sort::default(), PageRequest::first())
        .unwrap();
    assert_eq!(result.items[0].id, 101);
}

#[test]
fn set_stats_break_down_candidates() {
    let db = seeded();
    let p = paginator();
    let stats = CandidateService::new(&db, &p)
        .stats(&CandidateFilter::default())
        .unwrap();
    assert_eq!(stats.total_items, 4);
    let offices = stats.breakdown("office").unwrap();
    let senate = offices
        .rows
        .iter()
        .find(|r| r.key.as_deref() == Some("S"))
        .unwrap();
    assert_eq!(senate.count, 2);
}

#[test]
fn state_summary_by_race() {
    let db = seeded();
    let summary = StateService::new(&db).summary("md").unwrap();
    assert_eq!(summary.state, "MD");
    assert_eq!(summary.state_name, "Maryland");
    assert_eq!(summary.total_candidates, 2);
    assert_eq!(summary.active_candidates, 2);
    assert_eq!(summary.total_contributions, 4);
    assert_eq!(summary.total_raised, Money::from_dollars(10_849));

    let offices: Vec<&str> = summary.races.iter().map(|r| r.office.as_str()).collect();
    assert_eq!(offices, vec!["H", "S"]);
    let house = &summary.races[0];
    assert_eq!(house.office_label, "U.S. House");
    assert_eq!(house.total_raised, Money::from_dollars(10_349));
    assert_eq!(house.top_fundraisers[0].candidate.id, 1);
}

#[test]
fn state_summary_errors() {
    let db = seeded();
    let svc = StateService::new(&db);
    assert!(matches!(
        svc.summary("WY").unwrap_err(),
        FundLensError::NotFound { entity: "state", .. }
    ));
    assert!(matches!(
        svc.summary("XX").unwrap_err(),
        FundLensError::Validation(_)
    ));
}

#[test]
fn metadata_labels() {
    let db = seeded();
    let meta = MetadataService::new(&db);

    let offices = meta.offices().unwrap();
    let codes: Vec<&str> = offices.iter().map(|v| v.code.as_str()).collect();
    assert_eq!(codes, vec!["H", "P", "S"]);
    assert_eq!(offices[2].label, "U.S. Senate");
    assert_eq!(offices[2].count, 2);

    let states = meta.candidate_states().unwrap();
    assert_eq!(states.len(), 2);
    assert_eq!(states[0].label, "Maryland");

    let types = meta.committee_types().unwrap();
    assert!(types.iter().any(|t| t.code == "Q" && t.label == "PAC - Qualified"));
}

#[test]
fn non_ascii_names_match_case_insensitively() {
    let db = seeded();
    db.upsert_contributor(&contributor(104, "MARÍA MUÑOZ", "MD", None))
        .unwrap();
    let p = paginator();
    let svc = ContributorService::new(&db, &p);

    let q = SearchQuery::parse("maría muñoz").unwrap();
    let hits = svc
        .search(&q, SearchScope::Name, &ContributorFilter::default(), PageRequest::first())
        .unwrap();
    assert_eq!(hits.meta.total_items, 1);
    assert_eq!(hits.items[0].id, 104);

    let filter = ContributorFilter::from_criteria(&criteria(&[("name", "Muñoz")])).unwrap();
    let page = svc.list(&filter, &Sort::default(), PageRequest::first()).unwrap();
    assert_eq!(page.meta.total_items, 1);
}

#[test]
fn numeric_district_matches_padded_value() {
    let db = seeded();
    let p = paginator();
    let filter = CandidateFilter::from_criteria(&criteria(&[("district", "7")])).unwrap();
    let page = CandidateService::new(&db, &p)
        .list(&filter, &Sort::default(), PageRequest::first())
        .unwrap();
    let ids: Vec<i64> = page.items.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![1]);
}

#[test]
fn house_race_totals_per_candidate() {
    let db = seeded();
    let race = RaceService::new(&db).house("md", "7").unwrap();
    assert_eq!(race.office, "H");
    assert_eq!(race.office_label, "U.S. House");
    assert_eq!(race.state.as_deref(), Some("MD"));
    assert_eq!(race.district.as_deref(), Some("07"));
    assert_eq!(race.summary.total_candidates, 1);
    assert_eq!(race.summary.total_raised, Money::from_dollars(10_349));
    assert_eq!(race.summary.total_contributions, 3);
    assert_eq!(race.summary.unique_contributors, 2);

    let jane = &race.candidates[0];
    assert_eq!(jane.id, 1);
    assert_eq!(jane.stats.total_contributions, 3);
    assert_eq!(jane.stats.total_amount, Money::from_dollars(10_349));
    assert_eq!(jane.stats.unique_contributors, 2);
    let avg = jane.stats.average_amount.unwrap();
    assert!((avg - 3449.666).abs() < 0.01);
}

#[test]
fn senate_race_lists_active_candidates_first() {
    let db = seeded();
    db.upsert_candidate(&candidate(5, "Aaron Zed", "S", Some("MD"), false))
        .unwrap();
    let race = RaceService::new(&db).senate("MD").unwrap();
    let ids: Vec<i64> = race.candidates.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![2, 5]);
    assert_eq!(race.summary.total_candidates, 2);
    assert_eq!(race.summary.active_candidates, 1);
    assert_eq!(race.summary.total_raised, Money::from_dollars(500));
    assert_eq!(race.candidates[0].stats.total_amount, Money::from_dollars(500));
    assert_eq!(race.candidates[1].stats.total_contributions, 0);
    assert_eq!(race.candidates[1].stats.average_amount, None);
}

#[test]
fn presidential_race_without_money_is_zero() {
    let db = seeded();
    let race = RaceService::new(&db).presidential().unwrap();
    assert_eq!(race.state, None);
    assert_eq!(race.summary.total_candidates, 1);
    assert_eq!(race.summary.active_candidates, 0);
    assert_eq!(race.summary.total_raised, Money::ZERO);
    assert_eq!(race.summary.unique_contributors, 0);
    assert_eq!(race.candidates[0].id, 3);
}

#[test]
fn race_errors() {
    let db = seeded();
    let svc = RaceService::new(&db);
    assert!(matches!(
        svc.house("MD", "08").unwrap_err(),
        FundLensError::NotFound { entity: "race", .. }
    ));
    assert!(matches!(
        svc.senate("WY").unwrap_err(),
        FundLensError::NotFound { entity: "race", .. }
    ));
    assert!(matches!(svc.senate("XX").unwrap_err(), FundLensError::Validation(_)));
    assert!(matches!(
        svc.house("MD", "1;").unwrap_err(),
        FundLensError::Validation(_)
    ));
}

#[test]
fn top_contributors_ranked_by_total() {
    let db = seeded();
    let p = paginator();
    let svc = ContributorService::new(&db, &p);

    let top = svc.top(None, None, PageRequest::first()).unwrap();
    let ids: Vec<i64> = top.items.iter().map(|t| t.contributor.id).collect();
    assert_eq!(ids, vec![100, 101, 102]);
    assert_eq!(top.meta.total_items, 3);
    assert_eq!(top.items[0].total_amount, Money::from_dollars(10_599));
    assert_eq!(top.items[0].total_contributions, 3);
    assert_eq!(top.items[0].unique_recipients, 2);
    assert_eq!(top.items[2].total_amount, Money::from_cents(7_550));

    let second = svc.top(None, None, page(2, 2)).unwrap();
    assert_eq!(second.meta.total_pages, 2);
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].contributor.id, 102);

    let past_end = svc.top(None, None, page(3, 2)).unwrap();
    assert!(past_end.items.is_empty());
    assert_eq!(past_end.meta.total_items, 3);
}

#[test]
fn top_contributors_filter_by_state_and_type() {
    let db = seeded();
    let p = paginator();
    let svc = ContributorService::new(&db, &p);

    let va = svc.top(Some("va"), None, PageRequest::first()).unwrap();
    let ids: Vec<i64> = va.items.iter().map(|t| t.contributor.id).collect();
    assert_eq!(ids, vec![101]);

    let md = svc.top(Some("MD"), Some("ind"), PageRequest::first()).unwrap();
    let ids: Vec<i64> = md.items.iter().map(|t| t.contributor.id).collect();
    assert_eq!(ids, vec![100, 102]);

    let err = svc.top(None, Some("XYZ"), PageRequest::first()).unwrap_err();
    assert!(matches!(err, FundLensError::Validation(ref e) if e.field() == "entity_type"));
}

#[test]
fn contributor_recipients_sorted() {
    let db = seeded();
    let p = paginator();
    let svc = ContributorService::new(&db, &p);
    let ids = |by: RecipientSortBy, dir: SortDirection| -> Vec<i64> {
        svc.recipients(100, by, dir, PageRequest::first())
            .unwrap()
            .items
            .iter()
            .map(|r| r.committee.id)
            .collect()
    };

    assert_eq!(ids(RecipientSortBy::TotalAmount, SortDirection::Desc), vec![10, 11]);
    assert_eq!(ids(RecipientSortBy::CommitteeName, SortDirection::Desc), vec![11, 10]);
    assert_eq!(ids(RecipientSortBy::FirstDate, SortDirection::Desc), vec![11, 10]);
    assert_eq!(ids(RecipientSortBy::ContributionCount, SortDirection::Asc), vec![11, 10]);

    let page = svc
        .recipients(100, RecipientSortBy::default(), SortDirection::Desc, PageRequest::first())
        .unwrap();
    assert_eq!(page.meta.total_items, 2);
    let smith = &page.items[0];
    assert_eq!(smith.committee.name, "Smith for Congress");
    assert_eq!(smith.total_contributions, 2);
    assert_eq!(smith.total_amount, Money::from_dollars(10_099));
    assert_eq!(smith.first_date, NaiveDate::from_ymd_opt(2024, 1, 15));
    assert_eq!(smith.last_date, NaiveDate::from_ymd_opt(2024, 3, 5));
}

#[test]
fn recipients_of_missing_or_idle_contributor() {
    let db = seeded();
    let p = paginator();
    let svc = ContributorService::new(&db, &p);
    let err = svc
        .recipients(999, RecipientSortBy::default(), SortDirection::Desc, PageRequest::first())
        .unwrap_err();
    assert!(matches!(err, FundLensError::NotFound { entity: "contributor", .. }));

    let idle = svc
        .recipients(103, RecipientSortBy::default(), SortDirection::Desc, PageRequest::first())
        .unwrap();
    assert!(idle.items.is_empty());
    assert_eq!(idle.meta.total_items, 0);
}

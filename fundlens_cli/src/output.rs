use anyhow::Result;
use fundlens_lib::types::{
    Candidate, Committee, Contribution, Contributor, LabeledValue, Money, Page, RaceCandidate,
    RaceSummary, Recipient, TopContributor,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::xml_output;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
    Xml,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Self {
        match s {
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            "md" | "markdown" => OutputFormat::Markdown,
            "xml" => OutputFormat::Xml,
            _ => OutputFormat::Table,
        }
    }
}

/// Where and how command results are printed.
#[derive(Clone, Debug)]
pub struct Output {
    pub format: OutputFormat,
    /// Dot-notation paths kept in JSON output; empty keeps everything.
    pub fields: Vec<String>,
}

#[derive(Tabled, Serialize)]
pub(crate) struct CandidateRow {
    #[tabled(rename = "ID")]
    #[serde(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
    #[tabled(rename = "Office")]
    #[serde(rename = "Office")]
    office: String,
    #[tabled(rename = "State")]
    #[serde(rename = "State")]
    state: String,
    #[tabled(rename = "District")]
    #[serde(rename = "District")]
    district: String,
    #[tabled(rename = "Party")]
    #[serde(rename = "Party")]
    party: String,
    #[tabled(rename = "Year")]
    #[serde(rename = "Year")]
    election_year: i32,
    #[tabled(rename = "Active")]
    #[serde(rename = "Active")]
    active: String,
}

#[derive(Tabled, Serialize)]
pub(crate) struct CommitteeRow {
    #[tabled(rename = "ID")]
    #[serde(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    #[serde(rename = "Type")]
    committee_type: String,
    #[tabled(rename = "State")]
    #[serde(rename = "State")]
    state: String,
    #[tabled(rename = "City")]
    #[serde(rename = "City")]
    city: String,
    #[tabled(rename = "Party")]
    #[serde(rename = "Party")]
    party: String,
    #[tabled(rename = "Candidate")]
    #[serde(rename = "Candidate")]
    candidate_id: String,
    #[tabled(rename = "Active")]
    #[serde(rename = "Active")]
    active: String,
}

#[derive(Tabled, Serialize)]
pub(crate) struct ContributorRow {
    #[tabled(rename = "ID")]
    #[serde(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    #[serde(rename = "Type")]
    entity_type: String,
    #[tabled(rename = "Employer")]
    #[serde(rename = "Employer")]
    employer: String,
    #[tabled(rename = "Occupation")]
    #[serde(rename = "Occupation")]
    occupation: String,
    #[tabled(rename = "City")]
    #[serde(rename = "City")]
    city: String,
    #[tabled(rename = "State")]
    #[serde(rename = "State")]
    state: String,
}

#[derive(Tabled, Serialize)]
pub(crate) struct ContributionRow {
    #[tabled(rename = "ID")]
    #[serde(rename = "ID")]
    id: i64,
    #[tabled(rename = "Date")]
    #[serde(rename = "Date")]
    date: String,
    #[tabled(rename = "Amount")]
    #[serde(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Type")]
    #[serde(rename = "Type")]
    contribution_type: String,
    #[tabled(rename = "Election")]
    #[serde(rename = "Election")]
    election: String,
    #[tabled(rename = "Contributor")]
    #[serde(rename = "Contributor")]
    contributor_id: i64,
    #[tabled(rename = "Committee")]
    #[serde(rename = "Committee")]
    committee_id: i64,
}

#[derive(Tabled, Serialize)]
pub(crate) struct LabeledRow {
    #[tabled(rename = "Code")]
    #[serde(rename = "Code")]
    code: String,
    #[tabled(rename = "Label")]
    #[serde(rename = "Label")]
    label: String,
    #[tabled(rename = "Count")]
    #[serde(rename = "Count")]
    count: u64,
}

#[derive(Tabled, Serialize)]
pub(crate) struct RaceRow {
    #[tabled(rename = "Office")]
    #[serde(rename = "Office")]
    office: String,
    #[tabled(rename = "Candidates")]
    #[serde(rename = "Candidates")]
    candidates: u64,
    #[tabled(rename = "Active")]
    #[serde(rename = "Active")]
    active: u64,
    #[tabled(rename = "Raised")]
    #[serde(rename = "Raised")]
    raised: String,
    #[tabled(rename = "Top Fundraiser")]
    #[serde(rename = "Top Fundraiser")]
    top_fundraiser: String,
}

#[derive(Tabled, Serialize)]
pub(crate) struct RaceCandidateRow {
    #[tabled(rename = "ID")]
    #[serde(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
    #[tabled(rename = "Party")]
    #[serde(rename = "Party")]
    party: String,
    #[tabled(rename = "Active")]
    #[serde(rename = "Active")]
    active: String,
    #[tabled(rename = "Raised")]
    #[serde(rename = "Raised")]
    raised: String,
    #[tabled(rename = "Contributions")]
    #[serde(rename = "Contributions")]
    contributions: u64,
    #[tabled(rename = "Contributors")]
    #[serde(rename = "Contributors")]
    contributors: u64,
    #[tabled(rename = "Average")]
    #[serde(rename = "Average")]
    average: String,
}

#[derive(Tabled, Serialize)]
pub(crate) struct TopContributorRow {
    #[tabled(rename = "ID")]
    #[serde(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    #[serde(rename = "Type")]
    entity_type: String,
    #[tabled(rename = "State")]
    #[serde(rename = "State")]
    state: String,
    #[tabled(rename = "Total")]
    #[serde(rename = "Total")]
    total: String,
    #[tabled(rename = "Contributions")]
    #[serde(rename = "Contributions")]
    contributions: u64,
    #[tabled(rename = "Recipients")]
    #[serde(rename = "Recipients")]
    recipients: u64,
}

#[derive(Tabled, Serialize)]
pub(crate) struct RecipientRow {
    #[tabled(rename = "ID")]
    #[serde(rename = "ID")]
    id: i64,
    #[tabled(rename = "Committee")]
    #[serde(rename = "Committee")]
    name: String,
    #[tabled(rename = "Type")]
    #[serde(rename = "Type")]
    committee_type: String,
    #[tabled(rename = "Total")]
    #[serde(rename = "Total")]
    total: String,
    #[tabled(rename = "Contributions")]
    #[serde(rename = "Contributions")]
    contributions: u64,
    #[tabled(rename = "First")]
    #[serde(rename = "First")]
    first_date: String,
    #[tabled(rename = "Last")]
    #[serde(rename = "Last")]
    last_date: String,
}

/// One hit in a unified search listing.
#[derive(Tabled, Serialize)]
pub(crate) struct SearchHitRow {
    #[tabled(rename = "Category")]
    #[serde(rename = "Category")]
    pub category: String,
    #[tabled(rename = "ID")]
    #[serde(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Detail")]
    #[serde(rename = "Detail")]
    pub detail: String,
}

/// A flattened `path = value` pair, used to print single records and stats as a table.
#[derive(Tabled, Serialize, Debug, PartialEq)]
pub(crate) struct KeyValueRow {
    #[tabled(rename = "Field")]
    #[serde(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    #[serde(rename = "Value")]
    value: String,
}

// -- Row builders --

pub(crate) fn build_candidate_rows(candidates: &[Candidate]) -> Vec<CandidateRow> {
    candidates
        .iter()
        .map(|c| CandidateRow {
            id: c.id,
            name: c.name.clone(),
            office: c.office.clone(),
            state: c.state.clone().unwrap_or_default(),
            district: c.district.clone().unwrap_or_default(),
            party: c.party.clone().unwrap_or_default(),
            election_year: c.election_year,
            active: yes_no(c.is_active),
        })
        .collect()
}

pub(crate) fn build_committee_rows(committees: &[Committee]) -> Vec<CommitteeRow> {
    committees
        .iter()
        .map(|c| CommitteeRow {
            id: c.id,
            name: c.name.clone(),
            committee_type: c.committee_type.clone(),
            state: c.state.clone().unwrap_or_default(),
            city: c.city.clone().unwrap_or_default(),
            party: c.party.clone().unwrap_or_default(),
            candidate_id: c.candidate_id.map(|id| id.to_string()).unwrap_or_default(),
            active: yes_no(c.is_active),
        })
        .collect()
}

pub(crate) fn build_contributor_rows(contributors: &[Contributor]) -> Vec<ContributorRow> {
    contributors
        .iter()
        .map(|c| ContributorRow {
            id: c.id,
            name: c.name.clone(),
            entity_type: c.entity_type.clone(),
            employer: c.employer.clone().unwrap_or_default(),
            occupation: c.occupation.clone().unwrap_or_default(),
            city: c.city.clone().unwrap_or_default(),
            state: c.state.clone().unwrap_or_default(),
        })
        .collect()
}

pub(crate) fn build_contribution_rows(contributions: &[Contribution]) -> Vec<ContributionRow> {
    contributions
        .iter()
        .map(|c| ContributionRow {
            id: c.id,
            date: c.date.to_string(),
            amount: format_money(c.amount),
            contribution_type: c.contribution_type.clone(),
            election: match &c.election_type {
                Some(kind) => format!("{} {}", kind, c.election_year),
                None => c.election_year.to_string(),
            },
            contributor_id: c.contributor_id,
            committee_id: c.committee_id,
        })
        .collect()
}

pub(crate) fn build_labeled_rows(values: &[LabeledValue]) -> Vec<LabeledRow> {
    values
        .iter()
        .map(|v| LabeledRow {
            code: v.code.clone(),
            label: v.label.clone(),
            count: v.count,
        })
        .collect()
}

pub(crate) fn build_race_rows(races: &[RaceSummary]) -> Vec<RaceRow> {
    races
        .iter()
        .map(|r| RaceRow {
            office: r.office_label.clone(),
            candidates: r.candidate_count,
            active: r.active_candidate_count,
            raised: format_money(r.total_raised),
            top_fundraiser: r
                .top_fundraisers
                .first()
                .map(|f| format!("{} ({})", f.candidate.name, format_money(f.total_raised)))
                .unwrap_or_default(),
        })
        .collect()
}

pub(crate) fn build_race_candidate_rows(candidates: &[RaceCandidate]) -> Vec<RaceCandidateRow> {
    candidates
        .iter()
        .map(|c| RaceCandidateRow {
            id: c.id,
            name: c.name.clone(),
            party: c.party.clone().unwrap_or_default(),
            active: yes_no(c.is_active),
            raised: format_money(c.stats.total_amount),
            contributions: c.stats.total_contributions,
            contributors: c.stats.unique_contributors,
            average: c
                .stats
                .average_amount
                .map(|avg| format_money(Money::from_cents((avg * 100.0).round() as i64)))
                .unwrap_or_default(),
        })
        .collect()
}

pub(crate) fn build_top_contributor_rows(ranked: &[TopContributor]) -> Vec<TopContributorRow> {
    ranked
        .iter()
        .map(|t| TopContributorRow {
            id: t.contributor.id,
            name: t.contributor.name.clone(),
            entity_type: t.contributor.entity_type.clone(),
            state: t.contributor.state.clone().unwrap_or_default(),
            total: format_money(t.total_amount),
            contributions: t.total_contributions,
            recipients: t.unique_recipients,
        })
        .collect()
}

pub(crate) fn build_recipient_rows(recipients: &[Recipient]) -> Vec<RecipientRow> {
    recipients
        .iter()
        .map(|r| RecipientRow {
            id: r.committee.id,
            name: r.committee.name.clone(),
            committee_type: r.committee.committee_type.clone(),
            total: format_money(r.total_amount),
            contributions: r.total_contributions,
            first_date: r.first_date.map(|d| d.to_string()).unwrap_or_default(),
            last_date: r.last_date.map(|d| d.to_string()).unwrap_or_default(),
        })
        .collect()
}

/// Flatten a JSON value into `a.b[0].c = value` rows.
pub(crate) fn key_value_rows(value: &Value) -> Vec<KeyValueRow> {
    let mut out = Vec::new();
    flatten("", value, &mut out);
    out
}

fn flatten(prefix: &str, value: &Value, out: &mut Vec<KeyValueRow>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten(&path, val, out);
            }
        }
        Value::Array(items) => {
            for (i, val) in items.iter().enumerate() {
                flatten(&format!("{}[{}]", prefix, i), val, out);
            }
        }
        Value::Null => out.push(KeyValueRow {
            field: prefix.to_string(),
            value: String::new(),
        }),
        Value::String(s) => out.push(KeyValueRow {
            field: prefix.to_string(),
            value: s.clone(),
        }),
        other => out.push(KeyValueRow {
            field: prefix.to_string(),
            value: other.to_string(),
        }),
    }
}

// -- Field selection --

/// Split a `--fields` argument into trimmed, non-empty paths.
pub fn parse_fields(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(String::from)
        .collect()
}

/// Keep only the requested dot-notation paths.
///
/// On a page (an object with an `items` array), unprefixed paths apply to
/// each item and `meta.*` / `stats.*` paths to the sibling objects.
/// Paths that do not resolve are dropped.
pub fn select_fields(value: &Value, fields: &[String]) -> Value {
    match value {
        Value::Object(map) if map.get("items").is_some_and(Value::is_array) => {
            let mut out = Map::new();
            let item_paths: Vec<&str> = fields
                .iter()
                .map(String::as_str)
                .filter(|f| {
                    !map.keys()
                        .any(|k| k != "items" && f.starts_with(&format!("{}.", k)))
                })
                .collect();
            if let Some(Value::Array(items)) = map.get("items") {
                if !item_paths.is_empty() {
                    out.insert(
                        "items".to_string(),
                        Value::Array(items.iter().map(|i| project(i, &item_paths)).collect()),
                    );
                }
            }
            for (key, val) in map.iter().filter(|(k, _)| *k != "items") {
                let prefix = format!("{}.", key);
                let paths: Vec<&str> = fields
                    .iter()
                    .filter_map(|f| f.strip_prefix(&prefix))
                    .collect();
                if !paths.is_empty() {
                    out.insert(key.clone(), project(val, &paths));
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => {
            let paths: Vec<&str> = fields.iter().map(String::as_str).collect();
            Value::Array(items.iter().map(|i| project(i, &paths)).collect())
        }
        other => {
            let paths: Vec<&str> = fields.iter().map(String::as_str).collect();
            project(other, &paths)
        }
    }
}

fn project(value: &Value, paths: &[&str]) -> Value {
    let mut out = Map::new();
    for path in paths {
        if let Some(found) = lookup(value, path) {
            insert_path(&mut out, path, found.clone());
        }
    }
    Value::Object(out)
}

fn lookup<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.').try_fold(value, |v, segment| v.get(segment))
}

fn insert_path(out: &mut Map<String, Value>, path: &str, leaf: Value) {
    match path.split_once('.') {
        None => {
            out.insert(path.to_string(), leaf);
        }
        Some((head, rest)) => {
            let child = out
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(map) = child {
                insert_path(map, rest, leaf);
            }
        }
    }
}

// -- Printing --

impl Output {
    /// Print a page of records. Table formats get `rows`; JSON and XML get the page itself.
    pub fn page<T, R>(&self, noun: &str, item: &str, page: &Page<T>, rows: Vec<R>) -> Result<()>
    where
        T: Serialize,
        R: Tabled + Serialize,
    {
        eprintln!(
            "Page {}/{} ({} total {})",
            page.meta.page,
            page.meta.total_pages.max(1),
            page.meta.total_items,
            noun
        );
        match self.format {
            OutputFormat::Json => self.json(page),
            OutputFormat::Xml => {
                println!("{}", xml_output::items_to_xml(noun, item, &page.items)?);
                Ok(())
            }
            _ => self.rows(rows),
        }
    }

    /// Print a single record, stats object or summary.
    pub fn record<T: Serialize>(&self, tag: &str, value: &T) -> Result<()> {
        match self.format {
            OutputFormat::Json => self.json(value),
            OutputFormat::Xml => {
                println!("{}", xml_output::value_to_xml(tag, value)?);
                Ok(())
            }
            _ => self.rows(key_value_rows(&serde_json::to_value(value)?)),
        }
    }

    /// Print a list of records without paging metadata.
    pub fn list<T, R>(&self, noun: &str, item: &str, values: &[T], rows: Vec<R>) -> Result<()>
    where
        T: Serialize,
        R: Tabled + Serialize,
    {
        match self.format {
            OutputFormat::Json => self.json(&values),
            OutputFormat::Xml => {
                println!("{}", xml_output::items_to_xml(noun, item, values)?);
                Ok(())
            }
            _ => self.rows(rows),
        }
    }

    pub fn rows<R: Tabled + Serialize>(&self, rows: Vec<R>) -> Result<()> {
        match self.format {
            OutputFormat::Table => println!("{}", Table::new(rows)),
            OutputFormat::Markdown => {
                let mut table = Table::new(rows);
                table.with(Style::markdown());
                println!("{}", table);
            }
            OutputFormat::Csv => write_csv(std::io::stdout(), &rows)?,
            OutputFormat::Json => self.json(&rows)?,
            OutputFormat::Xml => println!("{}", xml_output::items_to_xml("rows", "row", &rows)?),
        }
        Ok(())
    }

    pub fn json<T: Serialize>(&self, data: &T) -> Result<()> {
        let value = serde_json::to_value(data)?;
        let value = if self.fields.is_empty() {
            value
        } else {
            select_fields(&value, &self.fields)
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        Ok(())
    }
}

pub(crate) fn write_csv<W: std::io::Write, R: Serialize>(writer: W, rows: &[R]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn yes_no(flag: bool) -> String {
    if flag { "yes" } else { "no" }.to_string()
}

/// `$1,234.56`
pub(crate) fn format_money(amount: Money) -> String {
    let cents = amount.cents();
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let dollars = (abs / 100).to_string();
    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, c) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{}${}.{:02}", sign, grouped, abs % 100)
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

use std::time::Instant;

use fundlens_query::query::{Field, QueryPlan};
use fundlens_query::types::{
    committee_type_label, entity_type_label, office_label, EntityKind, LabeledValue,
};
use fundlens_query::validation::state_name;

use crate::aggregation;
use crate::error::FundLensError;
use crate::store::DataStore;

/// Distinct codes present in the data, with display labels and record counts.
pub struct MetadataService<'a, S> {
    store: &'a S,
}

impl<'a, S: DataStore> MetadataService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        MetadataService { store }
    }

    /// States that have at least one candidate.
    pub fn candidate_states(&self) -> Result<Vec<LabeledValue>, FundLensError> {
        self.labeled(Field::CandidateState, state_name)
    }

    pub fn offices(&self) -> Result<Vec<LabeledValue>, FundLensError> {
        self.labeled(Field::CandidateOffice, office_label)
    }

    pub fn committee_types(&self) -> Result<Vec<LabeledValue>, FundLensError> {
        self.labeled(Field::CommitteeType, committee_type_label)
    }

    pub fn entity_types(&self) -> Result<Vec<LabeledValue>, FundLensError> {
        self.labeled(Field::ContributorEntityType, entity_type_label)
    }

    pub fn contributor_states(&self) -> Result<Vec<LabeledValue>, FundLensError> {
        self.labeled(Field::ContributorState, state_name)
    }

    fn labeled(
        &self,
        field: Field,
        label: fn(&str) -> &str,
    ) -> Result<Vec<LabeledValue>, FundLensError> {
        let started = Instant::now();
        let plan = unfiltered(field.entity())?;
        let rows = aggregation::breakdown(self.store, &plan, field, None)?;
        let values: Vec<LabeledValue> = rows
            .into_iter()
            .filter_map(|row| {
                let code = row.key?;
                Some(LabeledValue {
                    label: label(&code).to_string(),
                    code,
                    count: row.count,
                })
            })
            .collect();
        tracing::info!(
            entity = %field.entity(),
            field = field.name(),
            filters = 0,
            results = values.len(),
            elapsed_ms = super::elapsed_ms(started),
            "metadata"
        );
        Ok(values)
    }
}

fn unfiltered(entity: EntityKind) -> Result<QueryPlan, FundLensError> {
    Ok(QueryPlan::builder(entity).build()?)
}

use anyhow::Result;
use clap::{Args, ValueEnum};
use fundlens_lib::MetadataService;

use super::Context;
use crate::output::{build_labeled_rows, Output};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum MetadataKind {
    /// States with at least one candidate
    CandidateStates,
    /// Offices held or sought by candidates
    Offices,
    /// FEC committee types
    CommitteeTypes,
    /// Contributor entity types
    EntityTypes,
    /// States with at least one contributor
    ContributorStates,
}

#[derive(Args)]
pub struct MetadataArgs {
    /// Which set of codes to list
    #[arg(value_enum)]
    pub kind: MetadataKind,
}

pub fn run(args: &MetadataArgs, ctx: &Context, out: &Output) -> Result<()> {
    let db = ctx.open_db()?;
    let service = MetadataService::new(&db);
    let (noun, values) = match args.kind {
        MetadataKind::CandidateStates => ("states", service.candidate_states()?),
        MetadataKind::Offices => ("offices", service.offices()?),
        MetadataKind::CommitteeTypes => ("committee_types", service.committee_types()?),
        MetadataKind::EntityTypes => ("entity_types", service.entity_types()?),
        MetadataKind::ContributorStates => ("states", service.contributor_states()?),
    };
    out.list(noun, "value", &values, build_labeled_rows(&values))
}

mod entity;
pub use self::entity::EntityKind;

mod money;
pub use self::money::{Money, ParseMoneyError};

mod meta;
pub use self::meta::{Page, PageMeta};

mod candidate;
pub use self::candidate::{office_label, Candidate, CandidateId, OFFICES};

mod committee;
pub use self::committee::{committee_type_label, Committee, CommitteeId, COMMITTEE_TYPES};

mod contributor;
pub use self::contributor::{entity_type_label, Contributor, ContributorId, ENTITY_TYPES};

mod contribution;
pub use self::contribution::{
    Contribution, ContributionId, ContributionWithRelations, CONTRIBUTION_TYPES, ELECTION_TYPES,
};

mod stats;
pub use self::stats::{
    Breakdown, BreakdownRow, ContributionStats, Fundraiser, LabeledValue, RaceSummary, SetStats,
    StateSummary,
};

mod race;
pub use self::race::{
    CandidateTotals, Race, RaceCandidate, RaceTotals, Recipient, TopContributor,
};

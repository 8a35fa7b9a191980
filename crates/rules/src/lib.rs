//! `qekit-rules`: quality-engineering checks built on `qekit-merge`.
//!
//! Rule drift: pair legacy and new rule text by key and score how far each
//! rule moved. Claims: illustrative member/plan cost-sharing arithmetic.

pub mod claims;
pub mod drift;
pub mod error;
pub mod similarity;

pub use claims::{adjudicate, adjudicate_claims, outcomes_table, Adjudication, ClaimColumns, ClaimOutcome, PlanTerms};
pub use drift::{detect_drift, DriftOptions, DriftReport, DriftStatus};
pub use error::RulesError;
pub use similarity::ratio;

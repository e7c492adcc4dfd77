// rule-logic/src/lib.rs
// ============================================================================
// Crate: rule-logic
// Description: Tri-state predicate algebra for policy rule evaluation.
// ============================================================================

//! ## Overview
//! `rule-logic` provides a domain-agnostic Boolean requirement tree
//! ([`requirement::Requirement`]) evaluated with tri-state (Kleene) logic so
//! that missing evidence yields `Unknown` rather than a silent `false`.
//! Domain crates implement [`traits::TriPredicate`] for their atomic
//! predicate types and compose them with `Requirement`'s And/Or/Not/
//! `RequireGroup` constructors.

pub mod requirement;
pub mod traits;
pub mod tristate;

pub use requirement::Requirement;
pub use traits::TriPredicate;
pub use tristate::GroupCounts;
pub use tristate::KleeneLogic;
pub use tristate::LogicMode;
pub use tristate::NoopTrace;
pub use tristate::RequirementTrace;
pub use tristate::TriLogic;
pub use tristate::TriState;

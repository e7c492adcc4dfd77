// rule-logic/src/requirement.rs
// ============================================================================
// Module: Requirement Core Types
// Description: Universal Boolean algebra over typed predicates.
// Purpose: Define `Requirement` and its tri-state evaluation.
// Dependencies: serde::{Deserialize, Serialize}, smallvec::SmallVec
// ============================================================================

//! ## Overview
//! This module defines the core requirement tree and the grouped logical
//! operators that power the predicate algebra used by policy rule groups.
//! The logical operators (And, Or, Not, `RequireGroup`) are universal and
//! domain-agnostic; the `Predicate` variant is the boundary where
//! domain-specific semantics are injected.

use serde::Deserialize;
use serde::Serialize;
use smallvec::SmallVec;

use crate::traits::TriPredicate;
use crate::tristate::GroupCounts;
use crate::tristate::NoopTrace;
use crate::tristate::RequirementTrace;
use crate::tristate::TriLogic;
use crate::tristate::TriState;

/// Universal requirement tree with domain-specific leaves.
///
/// This enum represents a composable Boolean algebra that works over any
/// domain-specific predicate type. The logical operators are universal and
/// domain-agnostic, while `Predicate` is where domain semantics are injected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Requirement<P> {
    /// Logical AND: all sub-requirements must be satisfied.
    And(SmallVec<[Box<Self>; 4]>),
    /// Logical OR: at least one sub-requirement must be satisfied.
    Or(SmallVec<[Box<Self>; 4]>),
    /// Logical NOT: inverts the result of the sub-requirement.
    Not(Box<Self>),
    /// Group requirement: at least `min` of the sub-requirements must be satisfied.
    RequireGroup {
        /// Minimum number of sub-requirements that must be satisfied.
        min: u8,
        /// The sub-requirements to choose from.
        reqs: SmallVec<[Box<Self>; 8]>,
    },
    /// Domain-specific atomic predicate.
    Predicate(P),
}

impl<P> Requirement<P> {
    /// Evaluates this requirement with tri-state semantics, preserving
    /// `Unknown` when evidence is insufficient.
    pub fn eval<L>(&self, ctx: &P::Context<'_>, logic: &L) -> TriState
    where
        P: TriPredicate,
        L: TriLogic,
    {
        let mut trace = NoopTrace;
        self.eval_with_trace(ctx, logic, &mut trace)
    }

    /// Evaluates this requirement with tri-state semantics and a trace hook.
    pub fn eval_with_trace<L, T>(&self, ctx: &P::Context<'_>, logic: &L, trace: &mut T) -> TriState
    where
        P: TriPredicate,
        L: TriLogic,
        T: RequirementTrace<P>,
    {
        match self {
            Self::Predicate(predicate) => {
                let result = predicate.evaluate(ctx);
                trace.on_predicate_evaluated(predicate, result);
                result
            }
            Self::Not(requirement) => logic.not(requirement.eval_with_trace(ctx, logic, trace)),
            Self::And(requirements) => {
                let mut acc = TriState::True;
                for req in requirements {
                    acc = logic.and(acc, req.eval_with_trace(ctx, logic, trace));
                }
                acc
            }
            Self::Or(requirements) => {
                let mut acc = TriState::False;
                for req in requirements {
                    acc = logic.or(acc, req.eval_with_trace(ctx, logic, trace));
                }
                acc
            }
            Self::RequireGroup { min, reqs } => {
                let mut satisfied = 0usize;
                let mut unknown = 0usize;
                for req in reqs {
                    match req.eval_with_trace(ctx, logic, trace) {
                        TriState::True => satisfied += 1,
                        TriState::Unknown => unknown += 1,
                        TriState::False => {}
                    }
                }
                logic.require_group(*min, GroupCounts { satisfied, unknown, total: reqs.len() })
            }
        }
    }

    /// Creates a logical AND of the given requirements.
    pub fn and(requirements: Vec<Self>) -> Self {
        Self::And(requirements.into_iter().map(Box::new).collect())
    }

    /// Creates a logical OR of the given requirements.
    pub fn or(requirements: Vec<Self>) -> Self {
        Self::Or(requirements.into_iter().map(Box::new).collect())
    }

    /// Creates a logical NOT of the given requirement.
    pub fn negate(requirement: Self) -> Self {
        Self::Not(Box::new(requirement))
    }

    /// Creates a group requirement with minimum satisfaction count.
    pub fn require_group(min: u8, requirements: Vec<Self>) -> Self {
        Self::RequireGroup { min, reqs: requirements.into_iter().map(Box::new).collect() }
    }

    /// Creates a requirement from a predicate.
    pub const fn predicate(predicate: P) -> Self {
        Self::Predicate(predicate)
    }
}

impl<P> std::ops::Not for Requirement<P> {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::Not(Box::new(self))
    }
}

impl<P> Default for Requirement<P> {
    /// Creates an empty And requirement (trivially satisfied).
    fn default() -> Self {
        Self::And(SmallVec::new())
    }
}

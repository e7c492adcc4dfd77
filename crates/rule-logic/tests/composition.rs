// rule-logic/tests/composition.rs
// ============================================================================
// Integration tests for Requirement composition against a toy predicate.
// ============================================================================

use rule_logic::KleeneLogic;
use rule_logic::Requirement;
use rule_logic::TriPredicate;
use rule_logic::TriState;

#[derive(Debug, Clone, PartialEq)]
struct Threshold {
    field: &'static str,
    min: f64,
}

struct Scores {
    values: std::collections::HashMap<&'static str, f64>,
}

impl TriPredicate for Threshold {
    type Context<'a> = Scores;

    fn evaluate(&self, ctx: &Self::Context<'_>) -> TriState {
        match ctx.values.get(self.field) {
            Some(value) => TriState::from(*value >= self.min),
            None => TriState::Unknown,
        }
    }
}

fn scores(pairs: &[(&'static str, f64)]) -> Scores {
    Scores { values: pairs.iter().copied().collect() }
}

#[test]
fn and_of_two_known_thresholds_is_true_when_both_pass() {
    let req = Requirement::and(vec![
        Requirement::predicate(Threshold { field: "graph", min: 0.5 }),
        Requirement::predicate(Threshold { field: "network", min: 0.3 }),
    ]);
    let ctx = scores(&[("graph", 0.9), ("network", 0.4)]);
    assert_eq!(req.eval(&ctx, &KleeneLogic), TriState::True);
}

#[test]
fn missing_field_propagates_unknown_through_and() {
    let req = Requirement::and(vec![
        Requirement::predicate(Threshold { field: "graph", min: 0.5 }),
        Requirement::predicate(Threshold { field: "missing", min: 0.3 }),
    ]);
    let ctx = scores(&[("graph", 0.9)]);
    assert_eq!(req.eval(&ctx, &KleeneLogic), TriState::Unknown);
}

#[test]
fn or_short_circuits_true_even_with_unknown_sibling() {
    let req = Requirement::or(vec![
        Requirement::predicate(Threshold { field: "graph", min: 0.5 }),
        Requirement::predicate(Threshold { field: "missing", min: 0.3 }),
    ]);
    let ctx = scores(&[("graph", 0.9)]);
    assert_eq!(req.eval(&ctx, &KleeneLogic), TriState::True);
}

#[test]
fn require_group_passes_with_two_of_three() {
    let req = Requirement::require_group(
        2,
        vec![
            Requirement::predicate(Threshold { field: "graph", min: 0.5 }),
            Requirement::predicate(Threshold { field: "network", min: 0.5 }),
            Requirement::predicate(Threshold { field: "rules", min: 0.9 }),
        ],
    );
    let ctx = scores(&[("graph", 0.9), ("network", 0.6), ("rules", 0.1)]);
    assert_eq!(req.eval(&ctx, &KleeneLogic), TriState::True);
}

#[test]
fn negated_failing_predicate_is_true() {
    let req = Requirement::negate(Requirement::predicate(Threshold { field: "graph", min: 0.9 }));
    let ctx = scores(&[("graph", 0.1)]);
    assert_eq!(req.eval(&ctx, &KleeneLogic), TriState::True);
}

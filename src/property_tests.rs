//! Property-based tests for the evaluator and the text grammar.

use crate::{eval_expr, Expr, ExprNode};
use proptest::prelude::*;

// Leaves are bounded so that no generated tree can overflow `i64`.
fn arb_expr() -> impl Strategy<Value = Expr> {
    let leaf = (-1_000_000_i64..1_000_000).prop_map(Expr::num);
    leaf.prop_recursive(6, 64, 2, |inner| {
        (inner.clone(), inner).prop_map(|(left, right)| Expr::sum(left, right))
    })
}

proptest! {
    #[test]
    fn literal_evaluates_to_itself(v: i64) {
        prop_assert_eq!(eval_expr(&Expr::num(v)).unwrap(), v);
    }

    #[test]
    fn sum_is_sum_of_parts(a in arb_expr(), b in arb_expr()) {
        let expected = eval_expr(&a).unwrap() + eval_expr(&b).unwrap();
        prop_assert_eq!(eval_expr(&Expr::sum(a, b)).unwrap(), expected);
    }

    #[test]
    fn nesting_is_associative(a in arb_expr(), b in arb_expr(), c in arb_expr()) {
        let left = Expr::sum(Expr::sum(a.clone(), b.clone()), c.clone());
        let right = Expr::sum(a, Expr::sum(b, c));
        prop_assert_eq!(eval_expr(&left).unwrap(), eval_expr(&right).unwrap());
    }

    #[test]
    fn evaluation_is_idempotent(e in arb_expr()) {
        let first = eval_expr(&e).unwrap();
        prop_assert_eq!(eval_expr(&e).unwrap(), first);
    }

    #[test]
    fn display_parses_back(e in arb_expr()) {
        prop_assert_eq!(Expr::parse(&e.to_string()).unwrap(), e);
    }

    #[test]
    fn unknown_kinds_never_evaluate(kind in "[a-z]{1,8}", v: i64) {
        prop_assume!(kind != "num" && kind != "sum");
        let node = ExprNode::Tagged { kind, value: Some(v), left: None, right: None };
        prop_assert!(matches!(
            crate::eval_node(&node),
            Err(crate::Error::UnrecognizedExpressionKind(_))
        ));
    }
}

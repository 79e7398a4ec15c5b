//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use std::collections::HashMap;

use cleanup_directives::block::{clean, Options};
use cleanup_directives::expr::Expr;
use cleanup_directives::fold::{resolve, Assignment, Resolution, Substitution};
use cleanup_directives::parser::parse_expression;
use proptest::prelude::*;
use proptest::test_runner::{TestCaseError, TestRunner};

const SYMBOLS: [&str; 4] = ["A", "B", "C", "D"];

fn get_test_runner(cases: u32) -> TestRunner {
    TestRunner::new(proptest::test_runner::Config {
        cases,
        failure_persistence: None,

        ..proptest::test_runner::Config::default()
    })
}

fn arb_expr() -> impl Strategy<Value = Expr> {
    let leaf = proptest::sample::select(SYMBOLS.to_vec()).prop_map(|name| Expr::symbol(name));
    leaf.prop_recursive(5, 48, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(Expr::not),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Expr::and(l, r)),
            (inner.clone(), inner).prop_map(|(l, r)| Expr::or(l, r)),
        ]
    })
}

/// Every total assignment of [`SYMBOLS`], in symbol order.
fn all_assignments() -> Vec<Vec<Assignment>> {
    (0..1u32 << SYMBOLS.len())
        .map(|bits| {
            SYMBOLS
                .iter()
                .enumerate()
                .map(|(i, name)| Assignment::new(*name, bits & (1 << i) != 0))
                .collect()
        })
        .collect()
}

fn evaluate(expr: &Expr, assignments: &[Assignment]) -> Option<bool> {
    let values: HashMap<&str, bool> = assignments
        .iter()
        .map(|a| (a.symbol.as_str(), a.value))
        .collect();
    expr.evaluate(&|name: &str| values.get(name).copied())
}

#[test]
fn test_canonical_form_is_idempotent() {
    get_test_runner(256)
        .run(&arb_expr(), |expr| {
            let rendered = expr.to_string();
            let reparsed = parse_expression(&rendered)
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert_eq!(reparsed.to_string(), rendered);
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_rendering_preserves_truth_table() {
    let assignments = all_assignments();
    get_test_runner(256)
        .run(&arb_expr(), |expr| {
            let reparsed = parse_expression(&expr.to_string())
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            for sigma in &assignments {
                prop_assert_eq!(evaluate(&reparsed, sigma), evaluate(&expr, sigma));
            }
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_fold_is_sound() {
    let assignments = all_assignments();
    get_test_runner(256)
        .run(&arb_expr(), |expr| {
            for sigma in &assignments {
                let expected = evaluate(&expr, sigma);
                prop_assert!(expected.is_some());

                for known in 0..=sigma.len() {
                    match resolve(&expr, &sigma[..known]) {
                        Resolution::Constant(c) => prop_assert_eq!(Some(c), expected),
                        Resolution::Expr { expr: rest, .. } => {
                            prop_assert!(known < sigma.len());
                            for assigned in &sigma[..known] {
                                prop_assert!(!rest.symbols().any(|s| s == assigned.symbol));
                            }
                            prop_assert_eq!(evaluate(&rest, sigma), expected);
                        }
                    }
                }
            }
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_short_circuit_drops_other_operand() {
    get_test_runner(128)
        .run(&arb_expr(), |expr| {
            let guarded = Expr::and(Expr::symbol("GATE"), expr.clone());
            prop_assert_eq!(
                guarded.substitute("GATE", false),
                Substitution::Constant(false)
            );

            let guarded = Expr::or(expr.clone(), Expr::symbol("GATE"));
            prop_assert_eq!(
                guarded.substitute("GATE", true),
                Substitution::Constant(true)
            );
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_cleaning_without_assignments_keeps_text() {
    get_test_runner(64)
        .run(&(arb_expr(), arb_expr()), |(first, second)| {
            let text = format!("#if {first}\na\n#elif {second}\nb\n#else\nc\n#endif\n");
            let cleaned = clean(&text, &Options::default())
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert!(!cleaned.changed);
            prop_assert_eq!(cleaned.text, text);
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_known_first_branch_keeps_only_its_content() {
    get_test_runner(64)
        .run(&(arb_expr(), proptest::bool::ANY), |(rest, value)| {
            let text = format!("x\n#if GATE\na\n#elif {rest}\nb\n#else\nc\n#endif\ny\n");
            let options = Options {
                assignments: vec![Assignment::new("GATE", value)],
                format: false,
            };
            let cleaned = clean(&text, &options).map_err(|e| TestCaseError::fail(e.to_string()))?;
            if value {
                prop_assert_eq!(cleaned.text, "x\na\ny\n");
            } else {
                prop_assert_eq!(
                    cleaned.text,
                    format!("x\n#elif {rest}\nb\n#else\nc\n#endif\ny\n")
                );
            }
            Ok(())
        })
        .unwrap();
}

use crate::{dialect::Dialect, parser, util::tree};

/// Each variant contains the dialect and the input.
pub enum Test {
    Unit(Dialect, &'static str),
    Expr(Dialect, &'static str),
}

pub enum Assertion {
    TreeOk(&'static str),
    Error(&'static str),
    ErrorContains(&'static str),
}

/// Returns the rendered tree, or the rendered error.
#[track_caller]
pub fn run_pipeline(test: Test) -> Result<String, String> {
    match test {
        Test::Unit(dialect, input) => parser::parse_str(dialect, "test", input)
            .map(|unit| unit.as_ref().map(tree::print_unit_string).unwrap_or_default())
            .map_err(|e| e.to_string()),
        Test::Expr(dialect, input) => parser::parse_expr_str(dialect, input)
            .map(|expr| tree::print_expr_string(&expr))
            .map_err(|e| e.to_string()),
    }
}

#[track_caller]
pub fn run_assertion(assertion: Assertion, actual: &Result<String, String>) {
    match (assertion, actual) {
        (Assertion::TreeOk(expected_tree), Ok(actual_tree)) => {
            ::pretty_assertions::assert_eq!(actual_tree.trim(), expected_tree.trim());
        }
        (Assertion::TreeOk(_), Err(error)) => panic!("expected a tree, got error: {error}"),
        (Assertion::Error(expected), Err(error)) => {
            ::pretty_assertions::assert_eq!(error.as_str(), expected);
        }
        (Assertion::ErrorContains(expected), Err(error)) => {
            assert!(error.contains(expected), "{error:?} does not contain {expected:?}");
        }
        (Assertion::Error(_) | Assertion::ErrorContains(_), Ok(tree)) => {
            panic!("expected an error, got tree:\n{tree}")
        }
    }
}

macro_rules! tree_tests {
    (
        use $dialect:ident;

        $(
            fn $test_name:ident() {
                let $source_kind:ident = $source:expr;
                $($assertions_tt:tt)*
            }
        )*
    ) => {
        $(
            #[test]
            fn $test_name() {
                let test: crate::util::test_utils::Test =
                    tree_tests!(@@get_test($dialect, $source_kind), $source);
                let actual = crate::util::test_utils::run_pipeline(test);
                tree_tests!(@@expand_assertions, &actual, [$($assertions_tt)*]);
            }
        )*
    };

    (@@expand_assertions, $actual:expr, []) => {};
    (@@expand_assertions, $actual:expr, [
        let $assertion:ident = $assertion_expected:expr;
        $($rest_assertions_tt:tt)*
    ]) => {
        crate::util::test_utils::run_assertion(
            tree_tests!(@@assertion, $assertion, $assertion_expected),
            $actual,
        );
        tree_tests!(@@expand_assertions, $actual, [$($rest_assertions_tt)*]);
    };

    (@@assertion, tree_ok, $expected:expr) => {
        crate::util::test_utils::Assertion::TreeOk(::indoc::indoc! { $expected })
    };
    (@@assertion, error, $expected:expr) => {
        crate::util::test_utils::Assertion::Error($expected)
    };
    (@@assertion, error_contains, $expected:expr) => {
        crate::util::test_utils::Assertion::ErrorContains($expected)
    };

    (@@get_test($dialect:ident, unit), $source:expr) => {
        crate::util::test_utils::Test::Unit(tree_tests!(@@dialect $dialect), ::indoc::indoc! { $source })
    };
    (@@get_test($dialect:ident, expr), $source:expr) => {
        crate::util::test_utils::Test::Expr(tree_tests!(@@dialect $dialect), $source)
    };

    (@@dialect brace) => { crate::dialect::Dialect::Brace };
    (@@dialect block) => { crate::dialect::Dialect::Block };
}
pub(crate) use tree_tests;

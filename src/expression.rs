// Expression classification
//
// Every string handed to the engine is either a function call such as
// `concat($.a, $.b)`, a plain path such as `$.a.b`, or something that is not an
// expression at all. `get` and the template resolver both decide through
// `Expression::classify`, so the two can never disagree.

use std::sync::LazyLock;

use regex::Regex;

/// `name(arg, arg, ...)` where the name does not start with the root sigil.
static FUNCTION_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^$]\w+)\((.*)\)$").expect("valid regex"));

/// The root sigil every plain path starts with.
pub const ROOT: char = '$';

/// A classified expression string.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression<'a> {
    /// Function call: lower-cased name plus trimmed argument paths
    Call { name: String, args: Vec<&'a str> },
    /// Plain path rooted at `$`
    Path(&'a str),
    /// Not an expression; used verbatim
    Literal(&'a str),
}

impl<'a> Expression<'a> {
    pub fn classify(text: &'a str) -> Self {
        if let Some(caps) = FUNCTION_CALL.captures(text) {
            let name = caps.get(1).map_or("", |m| m.as_str()).to_lowercase();
            let raw_args = caps.get(2).map_or("", |m| m.as_str());
            let args = if raw_args.trim().is_empty() {
                Vec::new()
            } else {
                raw_args.split(',').map(str::trim).collect()
            };
            return Expression::Call { name, args };
        }

        if is_path(text) {
            Expression::Path(text)
        } else {
            Expression::Literal(text)
        }
    }

    /// True for calls and plain paths.
    pub fn is_expression(&self) -> bool {
        !matches!(self, Expression::Literal(_))
    }
}

/// True when `text` should be resolved rather than copied.
pub fn is_expression(text: &str) -> bool {
    Expression::classify(text).is_expression()
}

fn is_path(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next() == Some(ROOT) && matches!(chars.next(), None | Some('.') | Some('['))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_function_call() {
        assert_eq!(
            Expression::classify("concat($.test, $.test2)"),
            Expression::Call {
                name: "concat".to_string(),
                args: vec!["$.test", "$.test2"],
            }
        );
    }

    #[test]
    fn test_function_name_is_lower_cased() {
        match Expression::classify("UNIQ( $.a ,$.b )") {
            Expression::Call { name, args } => {
                assert_eq!(name, "uniq");
                assert_eq!(args, vec!["$.a", "$.b"]);
            }
            other => panic!("expected a call, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_argument_list() {
        assert_eq!(
            Expression::classify("keys()"),
            Expression::Call {
                name: "keys".to_string(),
                args: vec![],
            }
        );
    }

    #[test]
    fn test_name_cannot_start_with_root() {
        // `$x(...)` is not a call; it is not a usable path either
        assert_eq!(Expression::classify("$keys($.a)"), Expression::Literal("$keys($.a)"));
        // a single-character name does not satisfy the grammar
        assert_eq!(Expression::classify("f($.a)"), Expression::Literal("f($.a)"));
    }

    #[test]
    fn test_classify_paths() {
        assert_eq!(Expression::classify("$"), Expression::Path("$"));
        assert_eq!(Expression::classify("$.a.b"), Expression::Path("$.a.b"));
        assert_eq!(Expression::classify("$['a']"), Expression::Path("$['a']"));
        assert_eq!(Expression::classify("$..a"), Expression::Path("$..a"));
    }

    #[test]
    fn test_classify_literals() {
        for text in ["hello", "", "$5.00", "a.b", "price: $.x"] {
            assert!(!is_expression(text), "{text} should be a literal");
        }
        assert!(is_expression("KEYS($.names)"));
        assert!(is_expression("$.names"));
    }
}

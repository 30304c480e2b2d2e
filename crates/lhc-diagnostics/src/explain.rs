//! Long-form explanations for type checker error codes.
//!
//! - `E0001`: structural type mismatch
//! - `E0002`: infinite type (circular reference)
//! - `E0003`: missing type-class instance (context mismatch)

use std::fmt::Write;
use std::sync::LazyLock;

use rustc_hash::FxHashMap;

/// Explanation of one error code.
#[derive(Clone, Debug)]
pub struct ErrorExplanation {
    /// The code, e.g. `E0001`.
    pub code: &'static str,
    /// One-line title.
    pub title: &'static str,
    /// Prose explanation.
    pub explanation: &'static str,
    /// Program fragment that triggers the error.
    pub example: Option<&'static str>,
    /// The same fragment, fixed.
    pub correct_example: Option<&'static str>,
    /// Codes that are often confused with this one.
    pub related_codes: &'static [&'static str],
}

static ERROR_REGISTRY: LazyLock<FxHashMap<&'static str, ErrorExplanation>> =
    LazyLock::new(|| {
        let entries = [
            ErrorExplanation {
                code: "E0001",
                title: "Type mismatch",
                explanation: r"
Two types were required to be equal but have different shapes: different
type constructor names, a different number of type arguments, or a function
where a non-function was expected (or the other way around).
",
                example: Some(
                    r"
not :: Bool -> Bool
x = not 'c'
",
                ),
                correct_example: Some(
                    r"
not :: Bool -> Bool
x = not True
",
                ),
                related_codes: &["E0003"],
            },
            ErrorExplanation {
                code: "E0002",
                title: "Infinite type",
                explanation: r"
A type variable would have to be equal to a type that contains the variable
itself, for example `a ~ Bit -> a`. No finite type satisfies that equation,
so the binding is rejected instead of constructing an infinite type.
",
                example: Some(
                    r"
f x = f
",
                ),
                correct_example: None,
                related_codes: &["E0001"],
            },
            ErrorExplanation {
                code: "E0003",
                title: "Missing instance",
                explanation: r"
A type variable carries a context (a set of type classes such as `Eq` or
`Show`) and was resolved to a type that does not implement every class in
that context. The message lists the classes that are not implemented.
",
                example: Some(
                    r"
data Token = Token
same :: Eq a => a -> a -> Bool
x = same Token Token
",
                ),
                correct_example: Some(
                    r"
data Token = Token deriving Eq
same :: Eq a => a -> a -> Bool
x = same Token Token
",
                ),
                related_codes: &["E0001"],
            },
        ];
        entries.into_iter().map(|e| (e.code, e)).collect()
    });

/// Look up the explanation for a code.
#[must_use]
pub fn get_explanation(code: &str) -> Option<&'static ErrorExplanation> {
    ERROR_REGISTRY.get(code)
}

/// Every registered code, sorted.
#[must_use]
pub fn all_error_codes() -> Vec<&'static str> {
    let mut codes: Vec<_> = ERROR_REGISTRY.keys().copied().collect();
    codes.sort_unstable();
    codes
}

/// Format an explanation as Markdown.
#[must_use]
pub fn format_explanation(explanation: &ErrorExplanation) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {} - {}\n", explanation.code, explanation.title);
    out.push_str(explanation.explanation.trim());
    out.push_str("\n\n");

    if let Some(example) = explanation.example {
        let _ = writeln!(out, "## Example of erroneous code:\n```haskell{example}```\n");
    }
    if let Some(correct) = explanation.correct_example {
        let _ = writeln!(out, "## Corrected code:\n```haskell{correct}```\n");
    }
    if !explanation.related_codes.is_empty() {
        let related: Vec<String> = explanation
            .related_codes
            .iter()
            .map(|c| format!("`{c}`"))
            .collect();
        let _ = writeln!(out, "See also: {}", related.join(", "));
    }
    out
}

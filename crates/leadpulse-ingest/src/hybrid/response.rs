//! Classification of free-text follow-up responses.

use leadpulse_core::fold_label;
use serde::Serialize;

use crate::parse_helpers::is_yes;

const NEGATIVE_FRAGMENTS: &[&str] = &[
    "negativ",
    "sem interesse",
    "nao tenho interesse",
    "nao tem interesse",
    "not interested",
];
/// Bare refusals. Only matched against the whole cell, since `no` is also
/// the Portuguese contraction for "in the".
const NEGATION_WORDS: &[&str] = &["nao", "no", "n", "not", "never", "nunca"];
const POSITIVE_FRAGMENTS: &[&str] = &["positiv", "interes"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseClass {
    Positive,
    Negative,
    None,
}

impl ResponseClass {
    #[must_use]
    pub fn is_some(self) -> bool {
        self != ResponseClass::None
    }
}

/// Classifies a `Resposta` cell.
///
/// Negative phrases are checked first so that `"Sem interesse"` and
/// `"Não tenho interesse"` are negative even though they contain `interes`.
/// A bare refusal such as `"Não"` is negative only when it is the entire
/// cell.
#[must_use]
pub fn classify_response(text: &str) -> ResponseClass {
    let folded = fold_label(text);
    if folded.is_empty() {
        return ResponseClass::None;
    }

    let bare = folded.trim_end_matches(|c: char| !c.is_alphanumeric());
    let negated = NEGATIVE_FRAGMENTS.iter().any(|f| folded.contains(f))
        || NEGATION_WORDS.contains(&bare);
    if negated {
        return ResponseClass::Negative;
    }

    if POSITIVE_FRAGMENTS.iter().any(|f| folded.contains(f)) || is_yes(&folded) {
        return ResponseClass::Positive;
    }

    ResponseClass::None
}

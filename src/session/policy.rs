use serde::{Deserialize, Serialize};

/// Rules used to grade a typed character against the expected one.
///
/// Supplied by the caller and treated as an immutable value: swapping the
/// policy mid-session only affects comparisons made after the swap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPolicy {
    #[serde(default = "default_true")]
    pub case_sensitive: bool,
    #[serde(default)]
    pub ignore_whitespace_errors: bool,
    #[serde(default = "default_true")]
    pub allow_backspace: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            ignore_whitespace_errors: false,
            allow_backspace: true,
        }
    }
}

impl MatchPolicy {
    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }

    pub fn lenient_whitespace(mut self) -> Self {
        self.ignore_whitespace_errors = true;
        self
    }

    pub fn without_backspace(mut self) -> Self {
        self.allow_backspace = false;
        self
    }

    pub fn matches(&self, typed: char, expected: char) -> bool {
        if self.case_sensitive {
            return self.compare_folded(typed, expected);
        }
        // Some code points lower-case to several chars (e.g. 'İ'), so compare
        // the full folded sequences rather than the first char only.
        let typed_lower: Vec<char> = typed.to_lowercase().collect();
        let expected_lower: Vec<char> = expected.to_lowercase().collect();
        if typed_lower.len() == 1 && expected_lower.len() == 1 {
            self.compare_folded(typed_lower[0], expected_lower[0])
        } else {
            typed_lower == expected_lower
        }
    }

    fn compare_folded(&self, typed: char, expected: char) -> bool {
        if self.ignore_whitespace_errors && (typed.is_whitespace() || expected.is_whitespace()) {
            return typed.is_whitespace() && expected.is_whitespace();
        }
        typed == expected
    }
}

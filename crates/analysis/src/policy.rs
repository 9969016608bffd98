use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Source classification
// ---------------------------------------------------------------------------

/// Who caused a moment: the person themself, or anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Internal,
    External,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::External => "external",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The internal/external rule. Exact, case-sensitive equality with
/// `internal_label`; every other cause is external.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePolicy {
    pub internal_label: String,
}

impl Default for SourcePolicy {
    fn default() -> Self {
        Self { internal_label: "Self".to_string() }
    }
}

impl SourcePolicy {
    pub fn classify(&self, cause: &str) -> Source {
        if cause == self.internal_label {
            Source::Internal
        } else {
            Source::External
        }
    }
}

// ---------------------------------------------------------------------------
// Filtering + grouping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MomentFilter {
    All,
    /// Keep rows with a present score strictly greater than zero.
    #[default]
    PositiveOnly,
}

impl MomentFilter {
    pub fn from_positive_only(positive_only: bool) -> Self {
        if positive_only {
            Self::PositiveOnly
        } else {
            Self::All
        }
    }

    pub fn keeps(&self, score: Option<f64>) -> bool {
        match self {
            Self::All => true,
            Self::PositiveOnly => matches!(score, Some(s) if s > 0.0),
        }
    }

    pub fn needs_score(&self) -> bool {
        matches!(self, Self::PositiveOnly)
    }
}

/// Whether the daily and word summaries split each group by source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Breakdown {
    #[default]
    BySource,
    Combined,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisPolicy {
    pub source: SourcePolicy,
    pub filter: MomentFilter,
    pub breakdown: Breakdown,
}

impl AnalysisPolicy {
    pub fn with_filter(mut self, filter: MomentFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_breakdown(mut self, breakdown: Breakdown) -> Self {
        self.breakdown = breakdown;
        self
    }
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

pub const DEFAULT_DATE_COLUMN: &str = "Date (dd/mm/yy)";
pub const DEFAULT_SCORE_COLUMN: &str = "PANAS Score";
pub const DEFAULT_CAUSE_COLUMN: &str =
    "Who/what caused this significant moment (e.g. Self, someone, something)?";
pub const DEFAULT_REASON_AND_WORD_COLUMN: &str =
    "Why did this situation cause a significant moment?, Relevant PANAS word";

/// Header names of the four event fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub date: String,
    pub score: String,
    pub cause: String,
    pub reason_and_word: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            date: DEFAULT_DATE_COLUMN.to_string(),
            score: DEFAULT_SCORE_COLUMN.to_string(),
            cause: DEFAULT_CAUSE_COLUMN.to_string(),
            reason_and_word: DEFAULT_REASON_AND_WORD_COLUMN.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_exact_label_is_internal() {
        let p = SourcePolicy::default();
        assert_eq!(p.classify("Self"), Source::Internal);
        assert_eq!(p.classify("self"), Source::External);
        assert_eq!(p.classify(" Self"), Source::External);
        assert_eq!(p.classify("Friend"), Source::External);
        assert_eq!(p.classify(""), Source::External);
    }

    #[test]
    fn custom_label() {
        let p = SourcePolicy { internal_label: "Me".into() };
        assert_eq!(p.classify("Me"), Source::Internal);
        assert_eq!(p.classify("Self"), Source::External);
    }

    #[test]
    fn positive_only_drops_zero_negative_and_missing() {
        let f = MomentFilter::PositiveOnly;
        assert!(f.keeps(Some(0.5)));
        assert!(!f.keeps(Some(0.0)));
        assert!(!f.keeps(Some(-3.0)));
        assert!(!f.keeps(None));
        assert!(MomentFilter::All.keeps(None));
    }

    #[test]
    fn internal_sorts_before_external() {
        assert!(Source::Internal < Source::External);
    }
}

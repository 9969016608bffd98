use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::chart::{
    Channel, ChartSpec, ColorEncoding, Encoding, Facet, FacetLayout, Mark, Selection, UNSELECTED_COLOR,
};
use crate::model::{SummaryTable, SummaryValue, Table};
use crate::moment::{packed_word, read_score, read_text, split_packed};
use crate::policy::{AnalysisPolicy, Breakdown, ColumnMapping, Source};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCount {
    /// `None` under `Breakdown::Combined`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    pub word: String,
    pub count: usize,
}

/// Occurrences per (source, affect word), ascending by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WordFrequencies {
    pub rows: Vec<WordCount>,
}

impl WordFrequencies {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total(&self) -> usize {
        self.rows.iter().map(|r| r.count).sum()
    }

    pub fn to_table(&self, breakdown: Breakdown) -> SummaryTable {
        let by_source = breakdown == Breakdown::BySource;
        let mut table = if by_source {
            SummaryTable::new(&["source", "word", "count"])
        } else {
            SummaryTable::new(&["word", "count"])
        };
        for r in &self.rows {
            let mut row = Vec::with_capacity(3);
            if by_source {
                let source = r.source.map(|s| s.to_string()).unwrap_or_default();
                row.push(SummaryValue::Text(source));
            }
            row.push(SummaryValue::Text(r.word.clone()));
            row.push(SummaryValue::Count(r.count));
            table.push(row);
        }
        table
    }
}

/// Count affect words, taken from the packed reason/word field.
pub fn word_frequencies(
    table: &Table,
    columns: &ColumnMapping,
    policy: &AnalysisPolicy,
) -> Result<WordFrequencies> {
    let packed_col = table.column(&columns.reason_and_word)?;
    let cause_col = match policy.breakdown {
        Breakdown::BySource => Some(table.column(&columns.cause)?),
        Breakdown::Combined => None,
    };
    let score_col = if policy.filter.needs_score() {
        Some(table.column(&columns.score)?)
    } else {
        None
    };

    let mut groups: BTreeMap<(Option<Source>, String), usize> = BTreeMap::new();
    let mut undelimited = 0usize;
    for row in 0..table.len() {
        let source = cause_col.map(|col| policy.source.classify(&read_text(table, row, col)));
        let packed = read_text(table, row, packed_col);
        if let Some(col) = score_col {
            if !policy.filter.keeps(read_score(table, row, col)?) {
                continue;
            }
        }
        if split_packed(&packed).1.is_none() {
            undelimited += 1;
        }
        *groups.entry((source, packed_word(&packed))).or_insert(0) += 1;
    }

    if undelimited > 0 {
        warn!(
            table = %table.name,
            rows = undelimited,
            "reason/word field without a comma; counted under the empty word"
        );
    }
    debug!(table = %table.name, groups = groups.len(), "word frequencies");

    Ok(WordFrequencies {
        rows: groups
            .into_iter()
            .map(|((source, word), count)| WordCount { source, word, count })
            .collect(),
    })
}

pub const SOURCE_SELECTION: &str = "source_select";
pub const WORD_SELECTION: &str = "word_select";

/// Bars of count per word, sorted by descending count, with click /
/// shift-click highlighting.
pub fn chart(words: &WordFrequencies, breakdown: Breakdown) -> ChartSpec {
    let (color_field, selection_field, facet) = match breakdown {
        Breakdown::BySource => (
            Channel::nominal("source"),
            "source",
            Some(Facet { field: Channel::nominal("word"), layout: FacetLayout::Columns }),
        ),
        Breakdown::Combined => (Channel::nominal("word"), "word", None),
    };
    let selection_name = match breakdown {
        Breakdown::BySource => SOURCE_SELECTION,
        Breakdown::Combined => WORD_SELECTION,
    };
    let x = match breakdown {
        Breakdown::BySource => Channel::nominal("source"),
        Breakdown::Combined => Channel::nominal("word").sorted("-y"),
    };

    let mut tooltip = Vec::new();
    if breakdown == Breakdown::BySource {
        tooltip.push(Channel::nominal("source"));
    }
    tooltip.push(Channel::nominal("word"));
    tooltip.push(Channel::quantitative("count"));

    ChartSpec {
        title: "Relevant PANAS words".to_string(),
        mark: Mark::Bar,
        data: words.to_table(breakdown),
        encoding: Encoding {
            x: Some(x),
            y: Some(Channel::quantitative("count")),
            color: Some(ColorEncoding::Conditional {
                selection: selection_name.to_string(),
                field: color_field,
                otherwise: UNSELECTED_COLOR.to_string(),
            }),
            tooltip,
            ..Default::default()
        },
        facet,
        selection: Some(Selection::Multi {
            name: selection_name.to_string(),
            fields: vec![selection_field.to_string()],
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellValue;
    use crate::policy::MomentFilter;

    fn moments(rows: &[(&str, f64, &str)]) -> Table {
        let c = ColumnMapping::default();
        Table::new(
            "t",
            vec![c.cause.clone(), c.score.clone(), c.reason_and_word.clone()],
            rows.iter()
                .map(|(cause, score, packed)| {
                    vec![CellValue::from(*cause), CellValue::Number(*score), CellValue::from(*packed)]
                })
                .collect(),
        )
    }

    fn all() -> AnalysisPolicy {
        AnalysisPolicy::default().with_filter(MomentFilter::All)
    }

    fn wc(source: Option<Source>, word: &str, count: usize) -> WordCount {
        WordCount { source, word: word.to_string(), count }
    }

    #[test]
    fn counts_per_source_and_word() {
        let t = moments(&[
            ("Self", 2.0, "Finished the run, Proud"),
            ("Friend", 1.0, "Call with Sam, Enthusiastic"),
            ("Self", 3.0, "Cooked dinner, Proud"),
            ("Boss", -2.0, "Deadline moved, Upset"),
        ]);
        let words = word_frequencies(&t, &ColumnMapping::default(), &all()).unwrap();
        assert_eq!(
            words.rows,
            vec![
                wc(Some(Source::Internal), "Proud", 2),
                wc(Some(Source::External), "Enthusiastic", 1),
                wc(Some(Source::External), "Upset", 1),
            ]
        );
        assert_eq!(words.total(), 4);
    }

    #[test]
    fn only_first_comma_splits() {
        let t = moments(&[("Self", 1.0, "a,b,c")]);
        let words = word_frequencies(&t, &ColumnMapping::default(), &all()).unwrap();
        assert_eq!(words.rows, vec![wc(Some(Source::Internal), "b,c", 1)]);
    }

    #[test]
    fn missing_delimiter_lands_in_empty_bucket() {
        let t = moments(&[("Self", 1.0, "no comma here"), ("Self", 1.0, "")]);
        let words = word_frequencies(&t, &ColumnMapping::default(), &all()).unwrap();
        assert_eq!(words.rows, vec![wc(Some(Source::Internal), "", 2)]);
    }

    #[test]
    fn positive_only_by_default() {
        let t = moments(&[("Self", 1.0, "x, Alert"), ("Self", -1.0, "y, Afraid")]);
        let words = word_frequencies(&t, &ColumnMapping::default(), &AnalysisPolicy::default()).unwrap();
        assert_eq!(words.rows, vec![wc(Some(Source::Internal), "Alert", 1)]);
    }

    #[test]
    fn combined_counts_across_sources() {
        let t = moments(&[("Self", 1.0, "x, Alert"), ("Work", 1.0, "y, Alert")]);
        let policy = all().with_breakdown(Breakdown::Combined);
        let words = word_frequencies(&t, &ColumnMapping::default(), &policy).unwrap();
        assert_eq!(words.rows, vec![wc(None, "Alert", 2)]);

        let spec = chart(&words, Breakdown::Combined);
        assert_eq!(spec.encoding.x.unwrap().sort.as_deref(), Some("-y"));
        assert!(spec.facet.is_none());
    }

    #[test]
    fn selection_named_after_its_field() {
        let words = WordFrequencies { rows: vec![wc(None, "Alert", 1)] };
        match chart(&words, Breakdown::Combined).selection {
            Some(Selection::Multi { name, fields }) => {
                assert_eq!(name, WORD_SELECTION);
                assert_eq!(fields, vec!["word"]);
            }
            other => panic!("expected multi selection, got {other:?}"),
        }
        let spec = chart(&words, Breakdown::BySource);
        assert_eq!(spec.selection.unwrap().name(), SOURCE_SELECTION);
        match spec.encoding.color {
            Some(ColorEncoding::Conditional { selection, .. }) => assert_eq!(selection, SOURCE_SELECTION),
            other => panic!("expected conditional color, got {other:?}"),
        }
    }

    #[test]
    fn empty_table_gives_empty_frequencies() {
        let words = word_frequencies(&moments(&[]), &ColumnMapping::default(), &all()).unwrap();
        assert!(words.is_empty());
    }

    #[test]
    fn missing_packed_column() {
        let c = ColumnMapping::default();
        let t = Table::new("t", vec![c.cause.clone()], vec![]);
        assert!(word_frequencies(&t, &c, &all()).is_err());
    }
}

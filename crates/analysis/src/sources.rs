use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::chart::{Channel, ChartSpec, ColorEncoding, Encoding, Mark};
use crate::model::{SummaryTable, SummaryValue, Table};
use crate::moment::{read_score, read_text};
use crate::policy::{AnalysisPolicy, ColumnMapping, MomentFilter, Source};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceCount {
    pub source: Source,
    pub count: usize,
}

/// Moments per source class. Internal first; a class with no moments is
/// absent rather than zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceCounts {
    pub rows: Vec<SourceCount>,
}

impl SourceCounts {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total(&self) -> usize {
        self.rows.iter().map(|r| r.count).sum()
    }

    pub fn get(&self, source: Source) -> Option<usize> {
        self.rows.iter().find(|r| r.source == source).map(|r| r.count)
    }

    pub fn to_table(&self) -> SummaryTable {
        let mut table = SummaryTable::new(&["source", "count"]);
        for r in &self.rows {
            table.push(vec![
                SummaryValue::Text(r.source.to_string()),
                SummaryValue::Count(r.count),
            ]);
        }
        table
    }
}

/// Count moments per cause, then fold the causes into internal/external.
pub fn source_counts(
    table: &Table,
    columns: &ColumnMapping,
    policy: &AnalysisPolicy,
) -> Result<SourceCounts> {
    let cause_col = table.column(&columns.cause)?;
    let score_col = if policy.filter.needs_score() {
        Some(table.column(&columns.score)?)
    } else {
        None
    };

    let mut by_cause: BTreeMap<String, usize> = BTreeMap::new();
    for row in 0..table.len() {
        if let Some(col) = score_col {
            if !policy.filter.keeps(read_score(table, row, col)?) {
                continue;
            }
        }
        *by_cause.entry(read_text(table, row, cause_col)).or_insert(0) += 1;
    }

    let mut by_source: BTreeMap<Source, usize> = BTreeMap::new();
    for (cause, count) in &by_cause {
        *by_source.entry(policy.source.classify(cause)).or_insert(0) += count;
    }

    debug!(
        table = %table.name,
        causes = by_cause.len(),
        rows = table.len(),
        "source counts"
    );

    Ok(SourceCounts {
        rows: by_source
            .into_iter()
            .map(|(source, count)| SourceCount { source, count })
            .collect(),
    })
}

pub fn chart_title(filter: MomentFilter) -> &'static str {
    match filter {
        MomentFilter::PositiveOnly => "Internal versus external sources (positive moments)",
        MomentFilter::All => "Internal versus external sources (all moments)",
    }
}

/// Pie of count by source, with source and count on hover.
pub fn chart(counts: &SourceCounts, filter: MomentFilter) -> ChartSpec {
    ChartSpec {
        title: chart_title(filter).to_string(),
        mark: Mark::Arc,
        data: counts.to_table(),
        encoding: Encoding {
            theta: Some(Channel::quantitative("count")),
            color: Some(ColorEncoding::Field(Channel::nominal("source"))),
            tooltip: vec![Channel::nominal("source"), Channel::quantitative("count")],
            ..Default::default()
        },
        facet: None,
        selection: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellValue;

    fn moments(rows: &[(&str, f64)]) -> Table {
        let columns = ColumnMapping::default();
        Table::new(
            "t",
            vec![columns.cause.clone(), columns.score.clone()],
            rows.iter()
                .map(|(cause, score)| vec![CellValue::from(*cause), CellValue::Number(*score)])
                .collect(),
        )
    }

    #[test]
    fn folds_external_causes() {
        let t = moments(&[("Self", 2.0), ("Friend", 1.0), ("Work", 3.0), ("Self", 4.0)]);
        let counts = source_counts(&t, &ColumnMapping::default(), &AnalysisPolicy::default()).unwrap();
        assert_eq!(
            counts.rows,
            vec![
                SourceCount { source: Source::Internal, count: 2 },
                SourceCount { source: Source::External, count: 2 },
            ]
        );
    }

    #[test]
    fn positive_only_is_the_default() {
        let t = moments(&[("Self", -2.0), ("Friend", 1.0), ("Self", 0.0)]);
        let counts = source_counts(&t, &ColumnMapping::default(), &AnalysisPolicy::default()).unwrap();
        assert_eq!(counts.get(Source::Internal), None);
        assert_eq!(counts.get(Source::External), Some(1));
        assert_eq!(counts.len(), 1);

        let all = AnalysisPolicy::default().with_filter(MomentFilter::All);
        let counts = source_counts(&t, &ColumnMapping::default(), &all).unwrap();
        assert_eq!(counts.get(Source::Internal), Some(2));
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn score_column_only_needed_when_filtering() {
        let columns = ColumnMapping::default();
        let t = Table::new("t", vec![columns.cause.clone()], vec![vec![CellValue::from("Self")]]);
        let all = AnalysisPolicy::default().with_filter(MomentFilter::All);
        assert_eq!(source_counts(&t, &columns, &all).unwrap().total(), 1);
        assert!(source_counts(&t, &columns, &AnalysisPolicy::default()).is_err());
    }

    #[test]
    fn missing_cause_column() {
        let t = Table::new("panas", vec!["Interested".into()], vec![]);
        let err = source_counts(&t, &ColumnMapping::default(), &AnalysisPolicy::default()).unwrap_err();
        assert!(err.to_string().contains("missing column 'Who/what caused"));
    }

    #[test]
    fn empty_table_gives_empty_counts() {
        let t = moments(&[]);
        let counts = source_counts(&t, &ColumnMapping::default(), &AnalysisPolicy::default()).unwrap();
        assert!(counts.is_empty());
    }

    #[test]
    fn chart_title_tracks_filter() {
        let spec = chart(&SourceCounts::default(), MomentFilter::All);
        assert!(spec.title.contains("all moments"));
        assert_eq!(spec.mark, Mark::Arc);
        assert_eq!(spec.data.columns, vec!["source", "count"]);
    }
}

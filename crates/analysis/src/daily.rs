use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use crate::chart::{
    Channel, ChartSpec, ColorEncoding, Encoding, Facet, FacetLayout, Mark, Selection, UNSELECTED_COLOR,
};
use crate::model::{SummaryTable, SummaryValue, Table};
use crate::moment::{read_date, read_score, read_text};
use crate::policy::{AnalysisPolicy, Breakdown, ColumnMapping, Source};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyScore {
    pub date: NaiveDate,
    /// `None` under `Breakdown::Combined`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    pub score: f64,
}

/// Summed score per (date, source), ascending by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailyScores {
    pub rows: Vec<DailyScore>,
}

impl DailyScores {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_table(&self, breakdown: Breakdown) -> SummaryTable {
        let by_source = breakdown == Breakdown::BySource;
        let mut table = if by_source {
            SummaryTable::new(&["date", "source", "score"])
        } else {
            SummaryTable::new(&["date", "score"])
        };
        for r in &self.rows {
            let mut row = vec![SummaryValue::Text(r.date.format("%Y-%m-%d").to_string())];
            if by_source {
                let source = r.source.map(|s| s.to_string()).unwrap_or_default();
                row.push(SummaryValue::Text(source));
            }
            row.push(SummaryValue::Number(r.score));
            table.push(row);
        }
        table
    }
}

/// Group moments by (date, source) and sum their scores. A missing score
/// adds nothing to its group; a row with a blank date belongs to no group.
pub fn daily_scores(
    table: &Table,
    columns: &ColumnMapping,
    policy: &AnalysisPolicy,
) -> Result<DailyScores> {
    let date_col = table.column(&columns.date)?;
    let score_col = table.column(&columns.score)?;
    let cause_col = match policy.breakdown {
        Breakdown::BySource => Some(table.column(&columns.cause)?),
        Breakdown::Combined => None,
    };

    let mut groups: BTreeMap<(NaiveDate, Option<Source>), f64> = BTreeMap::new();
    let mut undated = 0usize;
    for row in 0..table.len() {
        let source = cause_col.map(|col| policy.source.classify(&read_text(table, row, col)));
        let score = read_score(table, row, score_col)?;
        if !policy.filter.keeps(score) {
            continue;
        }
        if read_text(table, row, date_col).trim().is_empty() {
            undated += 1;
            continue;
        }
        let date = read_date(table, row, date_col)?;
        *groups.entry((date, source)).or_insert(0.0) += score.unwrap_or(0.0);
    }

    if undated > 0 {
        warn!(table = %table.name, rows = undated, "rows without a date; left out of daily scores");
    }
    debug!(table = %table.name, groups = groups.len(), "daily scores");

    Ok(DailyScores {
        rows: groups
            .into_iter()
            .map(|((date, source), score)| DailyScore { date, source, score })
            .collect(),
    })
}

pub const DATE_SELECTION: &str = "date_select";

/// Horizontal bars of score, one panel per date, with a drop-down that
/// highlights the chosen date.
pub fn chart(scores: &DailyScores, breakdown: Breakdown) -> ChartSpec {
    let data = scores.to_table(breakdown);
    let options = data.distinct("date");
    let selection = Selection::Dropdown {
        name: DATE_SELECTION.to_string(),
        field: "date".to_string(),
        options,
    };

    let (y, color_field, facet) = match breakdown {
        Breakdown::BySource => (
            Channel::nominal("source"),
            Channel::nominal("source"),
            Some(Facet { field: Channel::ordinal("date"), layout: FacetLayout::Rows }),
        ),
        Breakdown::Combined => (Channel::ordinal("date"), Channel::nominal("date"), None),
    };

    let mut tooltip = vec![Channel::ordinal("date")];
    if breakdown == Breakdown::BySource {
        tooltip.push(Channel::nominal("source"));
    }
    tooltip.push(Channel::quantitative("score"));

    ChartSpec {
        title: "PANAS score by date".to_string(),
        mark: Mark::Bar,
        data,
        encoding: Encoding {
            x: Some(Channel::quantitative("score")),
            y: Some(y),
            color: Some(ColorEncoding::Conditional {
                selection: DATE_SELECTION.to_string(),
                field: color_field,
                otherwise: UNSELECTED_COLOR.to_string(),
            }),
            tooltip,
            ..Default::default()
        },
        facet,
        selection: Some(selection),
    }
}

use moodgrid_analysis::SummaryTable;
use unicode_width::UnicodeWidthStr;

/// Display width of a string, accounting for CJK double-width, emoji, etc.
pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

fn pad(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(s));
    format!("{s}{}", " ".repeat(fill))
}

/// Left-aligned columns separated by two spaces; trailing spaces trimmed.
pub(crate) fn format_table(table: &SummaryTable) -> String {
    let cells: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(|v| v.display()).collect())
        .collect();

    let mut widths: Vec<usize> = table.columns.iter().map(|c| display_width(c)).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(display_width(cell));
        }
    }

    let mut out = String::new();
    let mut push_line = |fields: &[String]| {
        let line: Vec<String> = fields.iter().zip(&widths).map(|(f, w)| pad(f, *w)).collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    };
    push_line(&table.columns);
    for row in &cells {
        push_line(row);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodgrid_analysis::SummaryValue;

    #[test]
    fn aligns_columns() {
        let mut t = SummaryTable::new(&["source", "count"]);
        t.push(vec![SummaryValue::Text("internal".into()), SummaryValue::Count(12)]);
        t.push(vec![SummaryValue::Text("external".into()), SummaryValue::Count(3)]);
        assert_eq!(format_table(&t), "source    count\ninternal  12\nexternal  3\n");
    }

    #[test]
    fn header_only_when_empty() {
        let t = SummaryTable::new(&["word", "count"]);
        assert_eq!(format_table(&t), "word  count\n");
    }

    #[test]
    fn wide_characters_count_double() {
        assert_eq!(display_width("日本"), 4);
        assert_eq!(pad("日本", 5), "日本 ");
    }
}

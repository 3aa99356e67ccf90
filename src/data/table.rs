//! Result Table Module
//! In-memory rows behind the result grid: classification, highlighting,
//! sorting and selection.

use std::cmp::Ordering;

pub const COLUMNS: [&str; 3] = ["Test", "Result", "Notes"];
pub const TEST_COLUMN: usize = 0;
pub const RESULT_COLUMN: usize = 1;
pub const NOTES_COLUMN: usize = 2;

/// Literal marking an informational row.
pub const MSG_MARKER: &str = "Msg";

/// Classification of the Result field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultKind {
    Pass,
    Fail,
    Msg,
    Other(String),
}

impl ResultKind {
    pub fn classify(result: &str) -> Self {
        match result {
            "Pass" => ResultKind::Pass,
            "Fail" => ResultKind::Fail,
            MSG_MARKER => ResultKind::Msg,
            other => ResultKind::Other(other.to_string()),
        }
    }
}

/// Cell background tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Message,
    Pass,
    Fail,
}

impl Highlight {
    /// Semi-transparent Material colors, unmultiplied RGBA.
    pub fn rgba(self) -> [u8; 4] {
        match self {
            Highlight::Message => [33, 150, 243, 64],
            Highlight::Pass => [76, 175, 80, 64],
            Highlight::Fail => [244, 67, 54, 64],
        }
    }
}

/// One test result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub test: String,
    pub result: String,
    pub notes: String,
    is_message: bool,
}

impl Row {
    pub fn new(test: impl Into<String>, result: impl Into<String>, notes: impl Into<String>) -> Self {
        let (test, result, notes) = (test.into(), result.into(), notes.into());
        let is_message = [&test, &result, &notes].iter().any(|f| *f == MSG_MARKER);
        Self {
            test,
            result,
            notes,
            is_message,
        }
    }

    pub fn field(&self, column: usize) -> &str {
        match column {
            TEST_COLUMN => &self.test,
            RESULT_COLUMN => &self.result,
            _ => &self.notes,
        }
    }

    pub fn kind(&self) -> ResultKind {
        ResultKind::classify(&self.result)
    }

    /// True when any field of the source record was exactly "Msg".
    pub fn is_message(&self) -> bool {
        self.is_message
    }

    /// Highlight for one cell. The Test column is never styled.
    pub fn highlight(&self, column: usize) -> Option<Highlight> {
        match column {
            RESULT_COLUMN if self.is_message => Some(Highlight::Message),
            RESULT_COLUMN => match self.kind() {
                ResultKind::Pass => Some(Highlight::Pass),
                ResultKind::Fail => Some(Highlight::Fail),
                _ => None,
            },
            NOTES_COLUMN if self.is_message => Some(Highlight::Message),
            _ => None,
        }
    }

    /// Height of the tallest cell in text lines.
    pub fn line_count(&self) -> usize {
        [&self.test, &self.result, &self.notes]
            .iter()
            .map(|f| f.lines().count().max(1))
            .max()
            .unwrap_or(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn reversed(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

/// Ordered rows plus selection and per-load counters.
#[derive(Debug, Default)]
pub struct ResultTable {
    rows: Vec<Row>,
    selected: Option<usize>,
    sort: Option<(usize, SortOrder)>,
    messages_count: usize,
    invalid_count: usize,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all rows and reset the counters.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.selected = None;
        self.sort = None;
        self.messages_count = 0;
        self.invalid_count = 0;
    }

    /// Append one record.
    ///
    /// Records without exactly three fields are padded or truncated and
    /// counted as invalid. Returns false for such records.
    pub fn add_row<I, S>(&mut self, fields: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        let well_formed = fields.len() == COLUMNS.len();
        if !well_formed {
            self.invalid_count += 1;
        }
        let any_msg = fields.iter().any(|f| f == MSG_MARKER);
        if any_msg {
            self.messages_count += 1;
        }

        fields.resize(COLUMNS.len(), String::new());
        let mut fields = fields.into_iter();
        let (test, result, notes) = (
            fields.next().unwrap_or_default(),
            fields.next().unwrap_or_default(),
            fields.next().unwrap_or_default(),
        );
        let mut row = Row::new(test, result, notes);
        // Extra fields beyond Notes still mark the record as a message.
        row.is_message |= any_msg;
        self.rows.push(row);
        self.sort = None;
        well_formed
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn messages_count(&self) -> usize {
        self.messages_count
    }

    pub fn invalid_count(&self) -> usize {
        self.invalid_count
    }

    /// Select a row by position. Out-of-range indices clear the selection.
    pub fn select(&mut self, index: usize) -> Option<&Row> {
        self.selected = (index < self.rows.len()).then_some(index);
        self.selected.and_then(|i| self.rows.get(i))
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn sort_state(&self) -> Option<(usize, SortOrder)> {
        self.sort
    }

    /// Stable sort on one column; the selection follows its row.
    pub fn sort_by(&mut self, column: usize, order: SortOrder) {
        let column = column.min(COLUMNS.len() - 1);
        let mut order_idx: Vec<usize> = (0..self.rows.len()).collect();
        order_idx.sort_by(|&a, &b| {
            let ord = compare_rows(&self.rows[a], &self.rows[b], column);
            match order {
                SortOrder::Ascending => ord,
                SortOrder::Descending => ord.reverse(),
            }
        });

        self.selected = self
            .selected
            .and_then(|old| order_idx.iter().position(|&i| i == old));
        let mut old_rows: Vec<Option<Row>> = self.rows.drain(..).map(Some).collect();
        self.rows = order_idx
            .into_iter()
            .filter_map(|i| old_rows[i].take())
            .collect();
        self.sort = Some((column, order));
    }

    /// Header click: ascending first, then flip on repeated clicks.
    pub fn toggle_sort(&mut self, column: usize) {
        let order = match self.sort {
            Some((current, order)) if current == column => order.reversed(),
            _ => SortOrder::Ascending,
        };
        self.sort_by(column, order);
    }
}

/// Compare two rows the way the grid does for `column`.
pub fn compare_rows(a: &Row, b: &Row, column: usize) -> Ordering {
    a.field(column).cmp(b.field(column))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with(rows: &[[&str; 3]]) -> ResultTable {
        let mut table = ResultTable::new();
        for r in rows {
            table.add_row(r.iter().copied());
        }
        table
    }

    #[test]
    fn pass_and_fail_are_highlighted_on_result_only() {
        let pass = Row::new("T1", "Pass", "ok");
        let fail = Row::new("T2", "Fail", "out of tolerance");
        let other = Row::new("T3", "Skipped", "");

        assert_eq!(pass.highlight(RESULT_COLUMN), Some(Highlight::Pass));
        assert_eq!(pass.highlight(NOTES_COLUMN), None);
        assert_eq!(fail.highlight(RESULT_COLUMN), Some(Highlight::Fail));
        assert_eq!(other.highlight(RESULT_COLUMN), None);
        assert_eq!(other.kind(), ResultKind::Other("Skipped".to_string()));
        assert_eq!(pass.highlight(TEST_COLUMN), None);
    }

    #[test]
    fn msg_in_any_field_wins_over_result() {
        let row = Row::new("Msg", "Pass", "Operator changed cable");
        assert!(row.is_message());
        assert_eq!(row.highlight(RESULT_COLUMN), Some(Highlight::Message));
        assert_eq!(row.highlight(NOTES_COLUMN), Some(Highlight::Message));
        assert_eq!(row.highlight(TEST_COLUMN), None);

        // Substring matches do not count.
        assert!(!Row::new("T1", "Msgs", "Msg:").is_message());
    }

    #[test]
    fn counts_messages_and_invalid_records() {
        let mut table = ResultTable::new();
        assert!(table.add_row(["T1", "Msg", "hello"]));
        assert!(!table.add_row(["T2", "Pass"]));
        assert!(!table.add_row(["T3", "Fail", "n", "Msg"]));

        assert_eq!(table.len(), 3);
        assert_eq!(table.messages_count(), 2);
        assert_eq!(table.invalid_count(), 2);
        assert_eq!(table.row(1).unwrap().notes, "");
        assert!(table.row(2).unwrap().is_message());

        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.messages_count(), 0);
        assert_eq!(table.invalid_count(), 0);
    }

    #[test]
    fn sort_is_stable_and_selection_follows_row() {
        let mut table = table_with(&[
            ["C", "Pass", "first c"],
            ["A", "Fail", "a"],
            ["C", "Pass", "second c"],
            ["B", "Pass", "b"],
        ]);
        table.select(1);

        table.sort_by(TEST_COLUMN, SortOrder::Ascending);
        let notes: Vec<&str> = table.rows().iter().map(|r| r.notes.as_str()).collect();
        assert_eq!(notes, vec!["a", "b", "first c", "second c"]);
        assert_eq!(table.selected(), Some(0));

        table.toggle_sort(TEST_COLUMN);
        assert_eq!(table.sort_state(), Some((TEST_COLUMN, SortOrder::Descending)));
        assert_eq!(table.rows()[0].test, "C");
        assert_eq!(table.selected(), Some(3));
    }

    #[test]
    fn select_out_of_range_clears_selection() {
        let mut table = table_with(&[["A", "Pass", ""]]);
        assert!(table.select(0).is_some());
        assert!(table.select(5).is_none());
        assert_eq!(table.selected(), None);
    }

    #[test]
    fn line_count_uses_tallest_cell() {
        assert_eq!(Row::new("T", "Pass", "").line_count(), 1);
        assert_eq!(Row::new("T", "Pass", "one\ntwo\nthree").line_count(), 3);
    }

    #[test]
    fn highlight_colors_are_translucent() {
        assert_eq!(Highlight::Message.rgba(), [33, 150, 243, 64]);
        assert_eq!(Highlight::Pass.rgba()[3], 64);
    }
}

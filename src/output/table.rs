use crate::partition::Entry;
use comfy_table::{Table, presets::NOTHING};

/// Column headers for the entry listing.
const HEADERS: [&str; 5] = ["GROUP", "PREFIX", "TYPE", "NAME", "VALUE"];

/// Gap between columns.
const COLUMN_GAP: u16 = 2;

/// Renders entries as a borderless table aligned by display width.
///
/// GROUP and PREFIX cells that repeat the row above are left blank, so each
/// group reads as one block. Entries are expected to be sorted already.
#[must_use]
pub fn render_entries(entries: &[Entry]) -> String {
    let mut table = Table::new();
    table.load_preset(NOTHING).set_header(HEADERS);

    let mut previous: Option<(&str, &str)> = None;
    for entry in entries {
        let current = (entry.group.as_str(), entry.prefix.as_str());
        let (group, prefix) = if previous == Some(current) {
            (String::new(), String::new())
        } else {
            (entry.group.clone(), entry.prefix.clone())
        };
        previous = Some(current);
        table.add_row(vec![
            group,
            prefix,
            entry.kind.to_string(),
            entry.name.clone(),
            entry.value.clone(),
        ]);
    }

    let last = HEADERS.len() - 1;
    for (i, column) in table.column_iter_mut().enumerate() {
        column.set_padding((0, if i == last { 0 } else { COLUMN_GAP }));
    }

    let mut out = String::new();
    for line in table.lines() {
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Plain-text rendering of the visible rows.
///
/// One line per visible row: tree indentation, an expander (`+` collapsed,
/// `-` expanded), the check marker and icon kind, then every registry column
/// padded to a common width. Byte counts go through `format_size`.
use crate::session::BrowseSession;
use lookfor_core::index::FieldValue;
use lookfor_core::model::size::format_size;
use lookfor_core::Role;
use std::io::{self, Write};

const COLUMN_GAP: &str = "  ";

/// Write the header line and every visible row to `out`.
pub fn render_rows<W: Write>(session: &BrowseSession, out: &mut W) -> io::Result<()> {
    let model = session.model();
    let columns = model.column_count();

    let header: Vec<String> = (0..columns)
        .map(|c| model.header_data(c).unwrap_or_default().to_string())
        .collect();

    let mut lines: Vec<Vec<String>> = Vec::with_capacity(session.rows().len());
    for row in session.rows() {
        let mut cells = Vec::with_capacity(columns);
        for column in 0..columns {
            let index = row.index.sibling_at_column(column);
            let text = model
                .data(&index, Role::Display)
                .map(|value| cell_text(&value))
                .unwrap_or_default();
            if column == 0 {
                let expander = if row.expanded {
                    '-'
                } else if model.has_children(Some(&row.index)) {
                    '+'
                } else {
                    ' '
                };
                let marker = model
                    .check_state(&row.index)
                    .map(|state| state.marker())
                    .unwrap_or(' ');
                let icon = model
                    .data(&row.index, Role::Decoration)
                    .and_then(|value| value.as_icon())
                    .map(|icon| icon.label())
                    .unwrap_or("");
                let indent = "  ".repeat(usize::from(row.depth));
                cells.push(format!("{indent}{expander} [{marker}] {icon:<4} {text}"));
            } else {
                cells.push(text);
            }
        }
        lines.push(cells);
    }

    let widths: Vec<usize> = (0..columns)
        .map(|c| {
            lines
                .iter()
                .map(|cells| cells[c].chars().count())
                .chain(std::iter::once(header[c].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    write_line(out, &header, &widths)?;
    for cells in &lines {
        write_line(out, cells, &widths)?;
    }
    Ok(())
}

/// Render the visible rows into a `String`.
pub fn render_to_string(session: &BrowseSession) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = render_rows(session, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

fn cell_text(value: &FieldValue) -> String {
    match value {
        FieldValue::Bytes(bytes) => format_size(*bytes),
        other => other.to_string(),
    }
}

fn write_line<W: Write>(out: &mut W, cells: &[String], widths: &[usize]) -> io::Result<()> {
    let mut line = String::new();
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i > 0 {
            line.push_str(COLUMN_GAP);
        }
        line.push_str(cell);
        if i + 1 < cells.len() {
            let pad = width.saturating_sub(cell.chars().count());
            line.extend(std::iter::repeat(' ').take(pad));
        }
    }
    writeln!(out, "{}", line.trim_end())
}

//! Plain-text rendering of result sets

use std::io::{self, Write};

use crate::sql::{cache::CacheStatus, executor::ResultSet, types::Row};

/// Draws rows as an ASCII table with one column per name, in order
pub fn render_table(columns: &[String], rows: &[Row]) -> String {
    let cells = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|c| row.get(c).map(|v| v.to_string()).unwrap_or_default())
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let widths = columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain([name.chars().count()])
                .max()
                .unwrap_or(0)
        })
        .collect::<Vec<_>>();

    let border = widths
        .iter()
        .map(|w| "-".repeat(w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let border = format!("+{}+", border);

    let line = |values: &[String]| {
        let inner = values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!(" {}{} ", v, " ".repeat(w - v.chars().count())))
            .collect::<Vec<_>>()
            .join("|");
        format!("|{}|", inner)
    };

    let mut out = vec![border.clone(), line(columns), border.clone()];
    out.extend(cells.iter().map(|r| line(r.as_slice())));
    if !cells.is_empty() {
        out.push(border);
    }
    out.join("\n")
}

/// Writes the user-facing report of a successful statement
pub fn write_result(out: &mut impl Write, result: &ResultSet) -> io::Result<()> {
    match result {
        ResultSet::ListTables { tables } if tables.is_empty() => writeln!(out, "No tables."),
        ResultSet::ListTables { tables } => {
            for table in tables {
                writeln!(out, "- {}", table)?;
            }
            Ok(())
        }
        ResultSet::CreateTable { table_name, columns } => {
            let columns = columns
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(out, "Table \"{}\" created with columns: {}", table_name, columns)
        }
        ResultSet::DropTable { table_name } => writeln!(out, "Table \"{}\" dropped.", table_name),
        ResultSet::Insert { table_name, id } => {
            writeln!(out, "Row with ID={} added to table \"{}\".", id, table_name)
        }
        ResultSet::Scan { columns, rows, cache, .. } => {
            match cache {
                CacheStatus::Hit => writeln!(out, "Cache: using stored result.")?,
                CacheStatus::Miss => writeln!(out, "Cache: computing result.")?,
            }
            writeln!(out, "{}", render_table(columns, rows))
        }
        ResultSet::Update { table_name, count } => {
            writeln!(out, "Rows updated: {} in table \"{}\".", count, table_name)
        }
        ResultSet::Delete { table_name, count } => {
            writeln!(out, "Rows deleted: {} from table \"{}\".", count, table_name)
        }
    }
}

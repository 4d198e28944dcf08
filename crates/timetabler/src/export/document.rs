/// Paginated HTML document export, one page per resource
use super::ExportError;
use crate::grid::{DisplayTable, ResourceView, Selection, FREE_MARKER};
use std::fmt::{self, Write};

const STYLE: &str = "\
body { font-family: sans-serif; margin: 0; }
section.page { page-break-after: always; break-after: page; padding: 24px; }
section.page:last-child { page-break-after: auto; break-after: auto; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #444; padding: 4px 6px; text-align: center; font-size: 11px; }
th { background: #eee; }
span.free { color: #999; }
";

/// Builds an HTML document with one page per resource in scope.
///
/// Cells carry the same text the screen shows; free cells are marked with
/// a `free` class so they stay distinguishable from populated ones.
pub fn build_document(view: &ResourceView<'_>, selection: &Selection) -> Result<String, ExportError> {
    let tables = view.display_tables(selection);
    if tables.is_empty() {
        return Err(ExportError::NoData);
    }

    let mut html = String::new();
    write_head(&mut html, view.kind().label())?;
    for table in &tables {
        write_page(&mut html, table)?;
    }
    html.write_str("</body>\n</html>\n")?;
    Ok(html)
}

fn write_head<W: Write>(out: &mut W, label: &str) -> fmt::Result {
    out.write_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n")?;
    writeln!(out, "<title>{} timetables</title>", label)?;
    writeln!(out, "<style>\n{}</style>\n</head>\n<body>", STYLE)
}

fn write_page<W: Write>(out: &mut W, table: &DisplayTable) -> fmt::Result {
    writeln!(out, "<section class=\"page\">")?;
    writeln!(out, "<h2>{}</h2>", escape(&table.heading))?;
    out.write_str("<table>\n<thead>\n<tr><th>Day/Period</th>")?;
    for label in &table.period_labels {
        write!(out, "<th>{}</th>", escape(label))?;
    }
    out.write_str("</tr>\n</thead>\n<tbody>\n")?;

    for row in &table.rows {
        write!(out, "<tr><th>{}</th>", escape(&row.day))?;
        for cell in &row.cells {
            if cell == FREE_MARKER {
                write!(out, "<td><span class=\"free\">{}</span></td>", FREE_MARKER)?;
            } else {
                write!(out, "<td>{}</td>", escape(cell))?;
            }
        }
        out.write_str("</tr>\n")?;
    }

    out.write_str("</tbody>\n</table>\n</section>\n")
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

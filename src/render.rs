//! Human readable rendering of replies.

use std::io::{self, Write};

use crate::Reply;

/// Write the reply as one line per value.
/// Array elements are numbered from 1 and nested arrays are indented under their parent element.
pub fn render<W: Write>(w: &mut W, reply: &Reply) -> io::Result<()> {
    match reply {
        Reply::Array(items) => write_items(w, items, 0),
        reply => write_line(w, reply, 0),
    }
}

/// Render the reply into a string.
pub fn to_text(reply: &Reply) -> String {
    let mut buf = Vec::new();
    // Writing to a Vec never fails.
    let _ = render(&mut buf, reply);
    String::from_utf8_lossy(&buf).into_owned()
}

fn write_line<W: Write>(w: &mut W, reply: &Reply, indent: usize) -> io::Result<()> {
    match reply {
        Reply::Error(message) | Reply::Status(message) => writeln!(w, "{}", message),
        Reply::Integer(n) => writeln!(w, "{}", n),
        Reply::Bulk(bytes) => writeln!(w, "{}", String::from_utf8_lossy(bytes)),
        Reply::Nil => writeln!(w, "nil"),
        Reply::Array(items) if items.is_empty() => writeln!(w, "(empty list)"),
        Reply::Array(items) => write_items(w, items, indent),
    }
}

fn write_items<W: Write>(w: &mut W, items: &[Reply], indent: usize) -> io::Result<()> {
    for (i, item) in items.iter().enumerate() {
        let prefix = format!("{}) ", i + 1);
        // The first element continues the parent's line.
        if i > 0 {
            write!(w, "{:width$}", "", width = indent)?;
        }
        write!(w, "{}", prefix)?;
        write_line(w, item, indent + prefix.len())?;
    }
    Ok(())
}

//! XML encoding of the directory structure

use crate::structure::DirectoryStructure;

/// `<structure>` document with one `<directory path="...">` per entry in
/// structure order. Subdirectory children are bare names, matching the
/// `dirs` field of the other formats.
pub fn encode(structure: &DirectoryStructure) -> String {
    let mut out = String::from("<structure>\n");
    for (path, entry) in structure.iter() {
        out.push_str(&format!("  <directory path=\"{}\">\n", escape(path)));

        if entry.files.is_empty() {
            out.push_str("    <files />\n");
        } else {
            out.push_str("    <files>\n");
            for name in &entry.files {
                out.push_str(&format!("      <file>{}</file>\n", escape(name)));
            }
            out.push_str("    </files>\n");
        }

        if entry.dirs.is_empty() {
            out.push_str("    <subdirectories />\n");
        } else {
            out.push_str("    <subdirectories>\n");
            for name in &entry.dirs {
                out.push_str(&format!("      <directory>{}</directory>\n", escape(name)));
            }
            out.push_str("    </subdirectories>\n");
        }

        out.push_str("  </directory>\n");
    }
    out.push_str("</structure>\n");
    out
}

/// Escape the five XML-reserved characters.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

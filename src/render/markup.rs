//! HTML serialization of generated pages

/// Escape text for use inside a double-quoted attribute
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Write one page container: the container element, then a table holding the
/// cloned header section and a body of cloned rows
pub fn write_page<S: AsRef<str>>(
    out: &mut String,
    attributes: &[(&str, String)],
    table_classes: &[String],
    header_html: &str,
    rows_html: &[S],
) {
    out.push_str("<div");
    for (name, value) in attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
    out.push('>');

    if table_classes.is_empty() {
        out.push_str("<table>");
    } else {
        out.push_str("<table class=\"");
        out.push_str(&escape_attr(&table_classes.join(" ")));
        out.push_str("\">");
    }

    out.push_str(header_html);
    out.push_str("<tbody>");
    for row in rows_html {
        out.push_str(row.as_ref());
    }
    out.push_str("</tbody></table></div>");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_attr() {
        assert_eq!(escape_attr(r#"a "b" <c> & d"#), "a &quot;b&quot; &lt;c&gt; &amp; d");
    }

    #[test]
    fn test_write_page() {
        let mut out = String::new();
        write_page(
            &mut out,
            &[("id", "page_1".to_string()), ("data-folio", "1".to_string())],
            &["report".to_string(), "dense".to_string()],
            "<thead><tr><th>h</th></tr></thead>",
            &["<tr><td>1</td></tr>"],
        );

        assert_eq!(
            out,
            "<div id=\"page_1\" data-folio=\"1\"><table class=\"report dense\">\
             <thead><tr><th>h</th></tr></thead><tbody><tr><td>1</td></tr></tbody></table></div>"
        );
    }
}

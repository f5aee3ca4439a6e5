//! Plain aligned-column table rendering.

/// Render headers and string rows as an aligned table with a divider.
#[must_use]
pub fn render(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(String::len)
                .max()
                .unwrap_or(0)
                .max(header.len())
        })
        .collect();

    let mut lines = Vec::with_capacity(rows.len() + 2);

    let header_line = headers
        .iter()
        .zip(&widths)
        .map(|(header, width)| pad(header, *width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string();
    lines.push("-".repeat(header_line.len()));
    lines.insert(0, header_line);

    for row in rows {
        let line = widths
            .iter()
            .enumerate()
            .map(|(index, width)| {
                let value = row.get(index).map_or("-", String::as_str);
                pad(value, *width)
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string();
        lines.push(line);
    }

    lines.join("\n")
}

fn pad(value: &str, width: usize) -> String {
    format!("{value:<width$}")
}

use terminal_size::{terminal_size, Height, Width};

use crate::pages::{Block, LinkTarget, View};

/// Print a page view to stdout, sized to the terminal.
pub fn print_view(view: &View) {
    let termw = get_terminal_width();
    tracing::trace!(target: "libris::cli", termw, "terminal width");
    print!("{}", render_view(view, termw, true));
}

/// Render a page view as plain text lines no wider than `termw`.
pub fn render_view(view: &View, termw: usize, color: bool) -> String {
    let mut out = String::new();
    let rule = "=".repeat(visible_len(&view.title).min(termw));
    out.push_str(&view.title);
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');
    for block in &view.blocks {
        match block {
            Block::Text(t) => push_line(&mut out, t, termw),
            Block::Placeholder(t) => push_line(&mut out, t, termw),
            Block::Notice(t) => push_line(&mut out, &format!("* {}", t), termw),
            Block::Error(t) => {
                let line = truncate(&format!("error: {}", t), termw);
                if color {
                    out.push_str(&format!("\x1b[31m{}\x1b[0m\n", line));
                } else {
                    out.push_str(&line);
                    out.push('\n');
                }
            }
            Block::Fields(fields) => {
                let keyw = fields.iter().map(|(k, _)| visible_len(k)).max().unwrap_or(0);
                for (k, v) in fields {
                    let pad = keyw.saturating_sub(visible_len(k));
                    push_line(&mut out, &format!("{}:{} {}", k, " ".repeat(pad), v), termw);
                }
            }
            Block::Table { columns, rows } => {
                for line in render_table(columns, rows, termw, color) {
                    out.push_str(&line);
                    out.push('\n');
                }
            }
            Block::Links(links) => {
                for l in links {
                    let line = match &l.target {
                        LinkTarget::Path(p) => format!("  [{}] go {}", l.label, p),
                        LinkTarget::Command(c) => format!("  [{}] type '{}'", l.label, c),
                    };
                    push_line(&mut out, &line, termw);
                }
            }
            Block::Pager { page, has_prev, has_next } => {
                let mut line = String::new();
                if *has_prev { line.push_str("« prev  "); }
                line.push_str(&format!("Page {}", page));
                if *has_next { line.push_str("  next »"); }
                push_line(&mut out, &line, termw);
            }
        }
    }
    out
}

fn push_line(out: &mut String, s: &str, maxw: usize) {
    out.push_str(&truncate(s, maxw));
    out.push('\n');
}

/// ASCII table with a rule above and below the header and at the end.
pub fn render_table(cols: &[String], rows: &[Vec<String>], termw: usize, color: bool) -> Vec<String> {
    // Share the width left after borders and padding among columns
    let budget = termw.saturating_sub(1 + cols.len() * 3).max(cols.len());
    let cap = (budget / cols.len().max(1)).max(4);
    let mut widths: Vec<usize> = cols.iter().map(|s| visible_len(s).min(cap)).collect();
    for r in rows {
        for (i, cell) in r.iter().enumerate().take(cols.len()) {
            let w = visible_len(cell);
            if w > widths[i] { widths[i] = w.min(cap); }
        }
    }
    let rule = table_rule(&widths);
    let mut lines = Vec::with_capacity(rows.len() + 4);
    lines.push(rule.clone());
    lines.push(table_row(cols, &widths, color));
    lines.push(rule.clone());
    lines.extend(rows.iter().map(|r| table_row(r, &widths, false)));
    lines.push(rule);
    lines
}

fn table_rule(widths: &[usize]) -> String {
    widths.iter().fold("+".to_string(), |acc, w| acc + &"-".repeat(w + 2) + "+")
}

// Header cells are left-aligned and painted when `header` is set; body cells
// holding numbers align right.
fn table_row(cells: &[String], widths: &[usize], header: bool) -> String {
    let mut line = String::from("|");
    for (i, &w) in widths.iter().enumerate() {
        let raw = cells.get(i).map(String::as_str).unwrap_or("");
        let text = truncate(raw, w);
        let pad = " ".repeat(w.saturating_sub(visible_len(&text)));
        let cell = match (header, is_numeric_like(raw)) {
            (true, _) => format!("\x1b[32m{}\x1b[0m{}", text, pad),
            (false, true) => format!("{}{}", pad, text),
            (false, false) => format!("{}{}", text, pad),
        };
        line.push_str(&format!(" {} |", cell));
    }
    line
}

fn truncate(s: &str, max: usize) -> String {
    if visible_len(s) <= max {
        return s.to_string();
    }
    let mut cut: String = s.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

// Cells that read as a number (sign, separators, exponent allowed) align right.
fn is_numeric_like(s: &str) -> bool {
    let st = s.trim();
    st.chars().any(|c| c.is_ascii_digit()) && st.chars().all(|c| c.is_ascii_digit() || ".-+eE,_".contains(c))
}

fn visible_len(s: &str) -> usize { s.chars().count() }

fn get_terminal_width() -> usize {
    if let Some((Width(w), Height(_h))) = terminal_size() {
        return (w as usize).saturating_sub(4).max(20);
    }
    80
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::Link;

    fn s(v: &[&str]) -> Vec<String> { v.iter().map(|x| x.to_string()).collect() }

    #[test]
    fn table_has_borders_and_aligned_cells() {
        let lines = render_table(&s(&["Title", "Copies"]), &[s(&["Dune", "3"]), s(&["Emma", "12"])], 80, false);
        assert_eq!(lines[0], "+-------+--------+");
        assert_eq!(lines[1], "| Title | Copies |");
        assert_eq!(lines[3], "| Dune  |      3 |");
        assert_eq!(lines[4], "| Emma  |     12 |");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn colored_header_keeps_plain_width() {
        let lines = render_table(&s(&["Title", "Copies"]), &[s(&["Dune", "3"])], 80, true);
        assert_eq!(lines[1], "| \x1b[32mTitle\x1b[0m | \x1b[32mCopies\x1b[0m |");
        assert_eq!(lines[3], "| Dune  |      3 |");
    }

    #[test]
    fn long_cells_are_truncated() {
        let long = "x".repeat(100);
        let lines = render_table(&s(&["A"]), &[vec![long]], 30, false);
        assert!(lines[3].chars().count() <= 30);
        assert!(lines[3].contains('…'));
    }

    #[test]
    fn view_renders_blocks() {
        let view = View::new("Home")
            .with(Block::Error("Login failed.".into()))
            .with(Block::Links(vec![Link::path("Login", "/login"), Link::command("Logout", "logout")]))
            .with(Block::Pager { page: 2, has_prev: true, has_next: false });
        let out = render_view(&view, 80, false);
        assert!(out.starts_with("Home\n====\n"));
        assert!(out.contains("error: Login failed.\n"));
        assert!(out.contains("  [Login] go /login\n"));
        assert!(out.contains("  [Logout] type 'logout'\n"));
        assert!(out.contains("« prev  Page 2\n"));
    }

    #[test]
    fn long_colored_error_still_resets_color() {
        let view = View::new("Orders").with(Block::Error("x".repeat(200)));
        let out = render_view(&view, 40, true);
        let line = out.lines().find(|l| l.starts_with("\x1b[31m")).unwrap();
        assert!(line.ends_with("\x1b[0m"));
        let inner = line.trim_start_matches("\x1b[31m").trim_end_matches("\x1b[0m");
        assert_eq!(inner.chars().count(), 40);
        assert!(inner.starts_with("error: x") && inner.ends_with('…'));
    }
}

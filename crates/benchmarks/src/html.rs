//! HTML leaderboard page.
//!
//! The page is a single self-contained file: styles and scripts are embedded,
//! links point back into the repository (`../results/...`, `../benchmarks/...`)
//! so the site must live one level below the repository root.

use crate::meta::SETUP_KEY;
use crate::rank::{BenchmarkBoard, Leaderboard, RankedRow, FIXED_COLUMNS};
use crate::result::{COMMIT_KEY, DATE_KEY};
use astrobench_core::Settings;
use chrono::{DateTime, Utc};
use serde_json::Value;

const STYLE: &str = include_str!("../assets/leaderboard.css");
const SCRIPT: &str = include_str!("../assets/leaderboard.js");

const SUN_ICON: &str = concat!(
    r#"<svg class="sun" viewBox="0 0 24 24" aria-hidden="true"><circle cx="12" cy="12" r="4"></circle>"#,
    r#"<path d="M12 2v2M12 20v2M4.93 4.93l1.41 1.41M17.66 17.66l1.41 1.41M2 12h2M20 12h2M4.93 19.07l1.41-1.41M17.66 6.34l1.41-1.41"></path></svg>"#
);
const MOON_ICON: &str = r#"<svg class="moon" viewBox="0 0 24 24" aria-hidden="true"><path d="M21 12.79A9 9 0 1 1 11.21 3a7 7 0 0 0 9.79 9.79Z"></path></svg>"#;
const LINK_ICON: &str = concat!(
    r#"<svg viewBox="0 0 24 24" aria-hidden="true">"#,
    r#"<path d="M10 14a5 5 0 0 0 7.07 0l2.12-2.12A5 5 0 0 0 14.1 4.9L13 6" />"#,
    r#"<path d="M14 10a5 5 0 0 0-7.07 0L4.8 12.12A5 5 0 0 0 9.9 19.2L11 18" />"#,
    "</svg>"
);

/// Characters of a commit shown in the table.
const COMMIT_DISPLAY_LEN: usize = 8;

/// Escape text for use in HTML content and quoted attributes.
pub fn escape(text: &str) -> String {
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

/// Column label for a result key: `l1_error` becomes `L1 Error`.
///
/// A letter is upper-cased when it follows a non-letter and lower-cased
/// otherwise.
pub fn column_label(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut prev_alpha = false;
    for c in key.replace('_', " ").chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Text shown for a JSON value: strings raw, `null` empty, the rest as JSON.
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

struct Page {
    buf: String,
}

impl Page {
    fn line(&mut self, s: impl AsRef<str>) {
        self.buf.push_str(s.as_ref());
        self.buf.push('\n');
    }
}

/// Render the full leaderboard page.
pub fn render_html(board: &Leaderboard, generated_at: DateTime<Utc>, settings: &Settings) -> String {
    let mut page = Page {
        buf: String::with_capacity(16 * 1024),
    };
    let title = escape(&settings.site_title);
    let logo = escape(
        &settings
            .logo
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    );

    page.line("<!DOCTYPE html>");
    page.line(r#"<html lang="en">"#);
    page.line("<head>");
    page.line(r#"  <meta charset="utf-8">"#);
    page.line(r#"  <meta name="viewport" content="width=device-width, initial-scale=1">"#);
    page.line(format!("  <title>{title}</title>"));
    page.line(format!(r#"  <link rel="icon" type="image/png" href="{logo}">"#));
    page.line(format!("  <style>\n{STYLE}</style>"));
    page.line(format!("  <script>\n{SCRIPT}</script>"));
    page.line("</head>");
    page.line("<body>");

    render_topbar(&mut page, &title, &logo, generated_at);
    page.line(r#"  <div class="container">"#);
    render_stats(&mut page, board);

    page.line(r#"  <div class="layout">"#);
    page.line(r#"    <aside class="sidebar">"#);
    page.line("      <h3>Tests</h3>");
    page.line(r#"      <ul class="nav">"#);
    for b in &board.boards {
        let id = escape(&b.meta.id);
        page.line(format!(r##"        <li><a href="#{id}">{id}</a></li>"##));
    }
    page.line("      </ul>");
    page.line("    </aside>");
    page.line("    <main>");

    if board.boards.is_empty() {
        page.line("  <p>No results found in <code>results/</code>.</p>");
    } else {
        for b in &board.boards {
            render_board(&mut page, board, b);
        }
    }

    page.line("    </main>");
    page.line("  </div>");
    page.line("  </div>");
    page.line(format!(
        r#"  <div class="footer container">Built with ❤️ by the {title} community</div>"#
    ));
    page.line("</body>");
    page.buf.push_str("</html>");
    page.buf
}

fn render_topbar(page: &mut Page, title: &str, logo: &str, generated_at: DateTime<Utc>) {
    let updated = escape(&generated_at.format("%Y-%m-%d %H:%M:%SZ").to_string());
    page.line(r#"  <div class="topbar"><div class="topbar-inner">"#);
    page.line(format!(
        r#"    <div class="brand"><img src="{logo}" alt="{title} Logo"><h1>{title}</h1><span class="muted">Updated {updated}</span></div>"#
    ));
    page.line(r#"    <div class="controls">"#);
    page.line(
        r#"      <input id="global-search" class="search" placeholder="Search code, machine, test, commit..." oninput="filterRows(this.value)">"#,
    );
    page.line(format!(
        r#"      <button class="btn icon-btn" onclick="toggleTheme()" title="Toggle theme" aria-label="Toggle theme">{SUN_ICON}{MOON_ICON}</button>"#
    ));
    page.line("    </div>");
    page.line("  </div></div>");
}

fn render_stats(page: &mut Page, board: &Leaderboard) {
    let stats = &board.stats;
    let cards = [
        ("Tests", stats.benchmarks.to_string()),
        ("Results", stats.results.to_string()),
        ("Codes", stats.codes.len().to_string()),
        ("Machines", stats.machines.len().to_string()),
        ("Last result", stats.last_result_display()),
    ];
    page.line(r#"  <div class="stats">"#);
    for (label, value) in cards {
        page.line(format!(
            r#"    <div class="card"><div class="label">{label}</div><div class="value">{}</div></div>"#,
            escape(&value)
        ));
    }
    page.line("  </div>");
}

fn render_board(page: &mut Page, board: &Leaderboard, b: &BenchmarkBoard) {
    let meta = &b.meta;
    let id = escape(&meta.id);

    page.line(r#"  <div class="test-header">"#);
    page.line(format!(r#"    <h2 id="{id}">{}</h2>"#, escape(&meta.name)));
    if let Some(readme) = &meta.readme {
        page.line(format!(
            r#"    <a class="small" href="../{}" target="_blank">README</a>"#,
            escape(readme)
        ));
    }
    page.line("  </div>");
    if !meta.description.is_empty() {
        page.line(format!(r#"  <div class="muted">{}</div>"#, escape(&meta.description)));
    }
    if !meta.tags.is_empty() {
        let chips: Vec<String> = meta
            .tags
            .iter()
            .map(|t| format!(r#"<span class="chip">{}</span>"#, escape(t)))
            .collect();
        page.line(format!("  <div>{}</div>", chips.join(" ")));
    }

    let table_id = format!("table-{id}");
    let mut attrs = format!(r#"id="{table_id}""#);
    if let Some(col) = b.initial_sort_col {
        attrs.push_str(&format!(
            r#" data-sort-col="{col}" data-sort-asc="{}""#,
            meta.sort_dir.is_asc()
        ));
    }
    page.line(format!("  <table {attrs}>"));

    let sortable = |col: usize, label: &str, class: &str| {
        format!(
            r#"<th class="sortable{class}" onclick="onHeaderClick('{table_id}',{col},this)">{label}</th>"#
        )
    };
    let mut header = vec![
        "<th>Rank</th>".to_string(),
        sortable(1, "Code", ""),
        sortable(2, "Machine", ""),
    ];
    for (i, key) in b.columns.iter().enumerate() {
        let label = escape(&column_label(key));
        if key == SETUP_KEY {
            header.push(format!("<th>{label}</th>"));
        } else {
            let class = if meta.ranking_key() == Some(key.as_str()) {
                if meta.sort_dir.is_asc() {
                    " sort-asc"
                } else {
                    " sort-desc"
                }
            } else {
                ""
            };
            header.push(sortable(FIXED_COLUMNS + i, &label, class));
        }
    }
    if meta.data_file {
        header.push("<th>Plot</th>".to_string());
    }
    page.line(format!("    <thead><tr>{}</tr></thead>", header.concat()));

    page.line("    <tbody>");
    for row in &b.rows {
        page.line(render_row(board, b, row));
    }
    page.line("    </tbody>");
    page.line("  </table>");
}

fn render_row(board: &Leaderboard, b: &BenchmarkBoard, row: &RankedRow) -> String {
    let r = &row.record;
    let code = escape(&r.code);
    let machine = escape(&r.machine);
    let mut cells = Vec::with_capacity(b.columns.len() + 4);

    cells.push(format!(r#"<td data-sort="{0}">{0}</td>"#, row.rank));
    cells.push(match board.code_url(&r.code) {
        Some(url) => format!(
            r#"<td data-sort="{code}"><a href="{}" target="_blank">{code}</a></td>"#,
            escape(url)
        ),
        None => format!(r#"<td data-sort="{code}">{code}</td>"#),
    });
    cells.push(format!(
        r#"<td data-sort="{machine}"><a href="../results/{code}/{machine}/machine.json" target="_blank">{machine}</a></td>"#
    ));

    for key in &b.columns {
        let mut text = display_value(r.fields.get(key));
        if key == DATE_KEY {
            if let Some(date) = r.date {
                text = date.format("%Y-%m-%d").to_string();
            }
        }
        let class = if key == DATE_KEY || key == COMMIT_KEY {
            r#" class="nowrap""#
        } else {
            ""
        };

        if key == SETUP_KEY && !text.is_empty() {
            let url = escape(&text);
            cells.push(format!(
                r#"<td{class} data-sort="{url}"><a class="link-icon" href="{url}" target="_blank" rel="noopener noreferrer" aria-label="Open link">{LINK_ICON}</a></td>"#
            ));
            continue;
        }

        let shown = if key == COMMIT_KEY {
            text.chars().take(COMMIT_DISPLAY_LEN).collect()
        } else {
            text.clone()
        };
        cells.push(format!(
            r#"<td{class} data-sort="{}">{}</td>"#,
            escape(&text),
            escape(&shown)
        ));
    }

    if b.meta.data_file {
        cells.push(match &r.plot {
            Some(plot) => {
                let plot = escape(plot);
                format!(
                    r#"<td><a href="{plot}" target="_blank"><img class="plot-thumb" src="{plot}" alt="Plot"></a></td>"#
                )
            }
            None => "<td>—</td>".to_string(),
        });
    }

    let best = if row.is_best() { " best" } else { "" };
    format!(
        r#"      <tr class="result-row{best}" data-test="{}" data-code="{code}" data-machine="{machine}">{}</tr>"#,
        escape(&b.meta.id),
        cells.concat()
    )
}

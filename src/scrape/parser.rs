//! HTML extraction helpers
//!
//! All functions here are synchronous and return owned data, so no parsed
//! document is ever held across an await point (the scraper DOM types are
//! not Send).

use crate::model::ProblemStub;
use crate::scrape::selectors;
use scraper::{ElementRef, Html, Selector};

/// One parsed listing page: its stubs in page order, plus the next-page link
#[derive(Debug, Clone)]
pub struct ListingPage {
    pub stubs: Vec<ProblemStub>,
    pub next: Option<String>,
}

/// The result of scanning a statistics page's fastest-solutions leaderboard
#[derive(Debug, Clone)]
pub struct ToplistScan {
    /// Runtime cell of the leaderboard's first row; empty if it has no rows
    pub fastest_global: String,

    /// The user's own row, if their name appeared on the leaderboard
    pub own_row: Option<OwnRow>,
}

/// The user's row on a leaderboard
#[derive(Debug, Clone)]
pub struct OwnRow {
    pub rank: String,
    pub runtime: String,
}

/// Parses one listing page into problem stubs and the next-page link
///
/// Stub order follows page order. The next link is None when the control is
/// absent or carries no usable href, which terminates pagination.
pub fn parse_listing(html: &str) -> ListingPage {
    let document = Html::parse_document(html);
    let mut stubs = Vec::new();

    if let Ok(sel) = Selector::parse(selectors::LISTING_NAME_LINKS) {
        for element in document.select(&sel) {
            let name = element.text().collect::<String>().trim().to_string();
            if name.is_empty() {
                continue;
            }
            if let Some(href) = element.value().attr("href") {
                stubs.push(ProblemStub {
                    name,
                    href: href.to_string(),
                });
            }
        }
    }

    // An empty href would resolve back to the current page and loop the
    // pager forever, so it counts as "no link"
    let next = Selector::parse(selectors::LISTING_NEXT).ok().and_then(|sel| {
        document
            .select(&sel)
            .next()
            .and_then(|el| el.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .map(|href| href.to_string())
    });

    ListingPage { stubs, next }
}

/// Whether the page carries the logged-in marker fragment
pub fn is_logged_in(html: &str) -> bool {
    let document = Html::parse_document(html);
    Selector::parse(selectors::LOGGED_IN_MARKER)
        .map(|sel| document.select(&sel).next().is_some())
        .unwrap_or(false)
}

/// Extracts the CSRF token value from a login page
pub fn extract_csrf_token(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let sel = Selector::parse(selectors::CSRF_INPUT).ok()?;
    document
        .select(&sel)
        .next()
        .and_then(|el| el.value().attr("value"))
        .map(|value| value.to_string())
}

/// Scans the first fastest-solutions leaderboard of a statistics page
///
/// The fastest global time is the runtime cell of the first row (empty
/// string if the table has no rows). If a row's name cell equals
/// `full_name`, that row's rank and runtime are returned as well.
pub fn scan_toplist(html: &str, full_name: &str) -> ToplistScan {
    let document = Html::parse_document(html);
    let mut scan = ToplistScan {
        fastest_global: String::new(),
        own_row: None,
    };

    let (Ok(table_sel), Ok(row_sel)) = (
        Selector::parse(selectors::TOPLIST_TABLE),
        Selector::parse(selectors::TABLE_ROWS),
    ) else {
        return scan;
    };

    // Only the first leaderboard table counts
    let Some(table) = document.select(&table_sel).next() else {
        return scan;
    };

    for (index, row) in table.select(&row_sel).enumerate() {
        let runtime = cell_text(row, selectors::CELL_RUNTIME).unwrap_or_default();
        if index == 0 {
            scan.fastest_global = runtime.clone();
        }

        if scan.own_row.is_none() {
            let name = cell_text(row, selectors::CELL_NAME).unwrap_or_default();
            if name == full_name {
                scan.own_row = Some(OwnRow {
                    rank: cell_text(row, selectors::CELL_RANK).unwrap_or_default(),
                    runtime,
                });
            }
        }
    }

    scan
}

/// Finds the user's best accepted time on a submissions page
///
/// Rows whose status cell does not mark an accepted submission are skipped.
/// Among the rest, the CPU-time cell with the minimum parsed seconds value
/// wins; ties go to the first occurrence. Returns the winning cell's text,
/// or the empty string if no accepted row exists.
pub fn best_accepted_time(html: &str) -> String {
    let document = Html::parse_document(html);

    let (Ok(table_sel), Ok(row_sel)) = (
        Selector::parse(selectors::SUBMISSIONS_TABLE),
        Selector::parse(selectors::TABLE_ROWS),
    ) else {
        return String::new();
    };

    let Some(table) = document.select(&table_sel).next() else {
        return String::new();
    };

    let mut best: Option<(f64, String)> = None;
    for row in table.select(&row_sel) {
        let status = cell_text(row, selectors::CELL_STATUS).unwrap_or_default();
        if !status.contains(selectors::ACCEPTED_STATUS) {
            continue;
        }

        let Some(text) = cell_text(row, selectors::CELL_RUNTIME) else {
            continue;
        };
        let Some(seconds) = parse_cpu_seconds(&text) else {
            continue;
        };

        // Strict comparison keeps the first occurrence on ties
        let better = match &best {
            Some((current, _)) => seconds < *current,
            None => true,
        };
        if better {
            best = Some((seconds, text));
        }
    }

    best.map(|(_, text)| text).unwrap_or_default()
}

/// Parses a CPU-time cell like `"0.87s"` or `"1.23 s"` into seconds
pub fn parse_cpu_seconds(text: &str) -> Option<f64> {
    let numeric: String = text
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if numeric.is_empty() {
        return None;
    }
    numeric.parse().ok()
}

/// Text of the first cell matching `css` within a row, trimmed
fn cell_text(row: ElementRef, css: &str) -> Option<String> {
    let sel = Selector::parse(css).ok()?;
    row.select(&sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}

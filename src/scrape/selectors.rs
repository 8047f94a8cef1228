//! Fixed site constants: paths and CSS selectors
//!
//! These describe one specific judge site and are deliberately not
//! configurable. If the site redesigns its markup, this is the one file to
//! update.

/// Path of the solved-problems listing, filtered to solved only
pub const LISTING_PATH: &str = "/problems?show_solved=on&show_tried=off&show_untried=off";

/// Path of the login form
pub const LOGIN_PATH: &str = "/login/email";

/// Anchor inside the listing's name column; text is the problem name,
/// href the canonical problem link
pub const LISTING_NAME_LINKS: &str = "td.name_column > a";

/// The "next page" control of the paginated listing
pub const LISTING_NEXT: &str = "#problem_list_next";

/// CSRF token input on the login page
pub const CSRF_INPUT: &str = r#"input[name="csrf_token"]"#;

/// Fragment only present while logged in
pub const LOGGED_IN_MARKER: &str = r#"a[href^="/logout"]"#;

/// The fastest-solutions leaderboard on a statistics page (first match wins)
pub const TOPLIST_TABLE: &str = "table.toplist";

/// Rows within a leaderboard or submissions table
pub const TABLE_ROWS: &str = "tbody tr";

/// Rank cell within a leaderboard row
pub const CELL_RANK: &str = "td.rank";

/// Name cell within a leaderboard row
pub const CELL_NAME: &str = "td.name";

/// Runtime / CPU-time cell within a leaderboard or submission row
pub const CELL_RUNTIME: &str = "td.runtime";

/// The submissions table on a problem's submissions page
pub const SUBMISSIONS_TABLE: &str = "table.submissions";

/// Status cell within a submission row
pub const CELL_STATUS: &str = "td.status";

/// Status text marking an accepted submission
pub const ACCEPTED_STATUS: &str = "Accepted";

/// Statistics page path for a problem href
pub fn statistics_path(problem_href: &str) -> String {
    format!("{}/statistics", problem_href)
}

/// Submissions page path for a problem href and username
pub fn submissions_path(problem_href: &str, username: &str) -> String {
    format!("{}?tab=submissions&user={}", problem_href, username)
}

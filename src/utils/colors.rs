//! ANSI color helper utilities for terminal output.

use regex::Regex;
use std::sync::LazyLock;

pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Free seats: none → red, last few → yellow, otherwise green.
pub fn color_for_available(available: u32, capacity: u32) -> &'static str {
    if available == 0 {
        RED
    } else if available * 10 <= capacity {
        YELLOW
    } else {
        GREEN
    }
}

/// Grey out "no" flags so confirmed/attended rows stand out.
pub fn colorize_flag(value: bool) -> String {
    if value {
        format!("{GREEN}yes{RESET}")
    } else {
        format!("{GREY}no{RESET}")
    }
}

static ANSI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1B\[[0-9;]*[mK]").expect("valid ANSI escape pattern"));

/// Remove ANSI escape sequences (for width computations).
pub fn strip_ansi(s: &str) -> String {
    ANSI_RE.replace_all(s, "").into_owned()
}

// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Terminal display utilities for the storefront CLI.
//!
//! OneDark colors on dark terminals, One Light on light ones. Detection
//! tries `STOREFRONT_THEME` first, then `COLORFGBG`, then falls back to
//! dark. `NO_COLOR` and non-TTY stdout turn styling off entirely, so piping
//! the output into something else gets plain text.

use std::io::IsTerminal;
use std::sync::OnceLock;

use serde_json::Value;

use storefront::{Collection, LoadOutcome, SearchDocument};

// Width between │ and │ (excluding border chars)
pub const BOX_WIDTH: usize = 80;

// ═══════════════════════════════════════════════════════════════════════════
// THEME
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

static THEME: OnceLock<Theme> = OnceLock::new();

fn detect_theme() -> Theme {
    if let Ok(theme) = std::env::var("STOREFRONT_THEME") {
        match theme.to_lowercase().as_str() {
            "light" | "l" => return Theme::Light,
            "dark" | "d" => return Theme::Dark,
            _ => {}
        }
    }

    // "fg;bg": 7 and up (except 8, dark gray) is a light background
    if let Ok(colorfgbg) = std::env::var("COLORFGBG") {
        let bg = colorfgbg.split(';').next_back().and_then(|bg| bg.parse::<u8>().ok());
        if bg.is_some_and(|bg| bg >= 7 && bg != 8) {
            return Theme::Light;
        }
    }

    Theme::Dark
}

pub fn theme() -> Theme {
    *THEME.get_or_init(detect_theme)
}

fn rgb((r, g, b): (u8, u8, u8)) -> String {
    format!("\x1b[38;2;{};{};{}m", r, g, b)
}

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

/// What a piece of output means; each theme maps it to one color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Box borders, ids, empty states
    Frame,
    /// Section labels
    Heading,
    /// Top hit, loaded products
    Good,
    /// Titles and runner-up hits
    Title,
    /// More pages, busy handles
    Warn,
    /// Unknown handles
    Bad,
}

impl Role {
    /// OneDark (dark) and One Light (light) values.
    fn rgb(self, theme: Theme) -> (u8, u8, u8) {
        match (self, theme) {
            (Role::Frame, Theme::Dark) => (92, 99, 112),
            (Role::Frame, Theme::Light) => (160, 161, 167),
            (Role::Heading, Theme::Dark) => (86, 182, 194),
            (Role::Heading, Theme::Light) => (1, 132, 188),
            (Role::Good, Theme::Dark) => (152, 195, 121),
            (Role::Good, Theme::Light) => (80, 161, 79),
            (Role::Title, Theme::Dark) => (97, 175, 239),
            (Role::Title, Theme::Light) => (64, 120, 242),
            (Role::Warn, Theme::Dark) => (229, 192, 123),
            (Role::Warn, Theme::Light) => (193, 132, 1),
            (Role::Bad, Theme::Dark) => (224, 108, 117),
            (Role::Bad, Theme::Light) => (228, 86, 73),
        }
    }

    pub fn escape(self) -> String {
        rgb(self.rgb(theme()))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// CORE UTILITIES
// ═══════════════════════════════════════════════════════════════════════════

pub fn use_colors() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    std::io::stdout().is_terminal()
}

/// Color `text` for its role, with optional modifiers
pub fn themed(role: Role, modifiers: &[&str], text: &str) -> String {
    if use_colors() {
        format!("{}{}{}{}", modifiers.join(""), role.escape(), text, RESET)
    } else {
        text.to_string()
    }
}

/// Visible length, excluding ANSI escapes
pub fn visible_len(s: &str) -> usize {
    let mut in_escape = false;
    let mut len = 0;
    for c in s.chars() {
        if c == '\x1b' {
            in_escape = true;
        } else if in_escape && c == 'm' {
            in_escape = false;
        } else if !in_escape {
            len += 1;
        }
    }
    len
}

/// Cut to `max` visible chars, marking the cut with an ellipsis.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

// ═══════════════════════════════════════════════════════════════════════════
// BOX DRAWING
// ═══════════════════════════════════════════════════════════════════════════

/// │ content          │
pub fn row(content: &str) {
    let border = themed(Role::Frame, &[], "│");
    let pad = BOX_WIDTH.saturating_sub(visible_len(content));
    println!("{border}{content}{}{border}", " ".repeat(pad));
}

/// ┌─ LABEL ──────────┐
pub fn section_top(label: &str) {
    let label_part = format!("─ {} ", themed(Role::Heading, &[BOLD], label));
    let remaining = BOX_WIDTH.saturating_sub(visible_len(&label_part));
    println!(
        "{}{}{}",
        themed(Role::Frame, &[], "┌"),
        label_part,
        themed(Role::Frame, &[], &format!("{}┐", "─".repeat(remaining)))
    );
}

/// └──────────────────┘
pub fn section_bot() {
    println!("{}", themed(Role::Frame, &[], &format!("└{}┘", "─".repeat(BOX_WIDTH))));
}

// ═══════════════════════════════════════════════════════════════════════════
// SEMANTIC FORMATTERS
// ═══════════════════════════════════════════════════════════════════════════

/// Best-effort display label for a document or product.
pub fn label(fields: &serde_json::Map<String, Value>) -> String {
    for key in ["title", "name", "handle", "id"] {
        match fields.get(key) {
            Some(Value::String(s)) => return s.clone(),
            Some(Value::Number(n)) => return n.to_string(),
            _ => {}
        }
    }
    "(untitled)".to_string()
}

/// Rank badge: top three stand out.
pub fn rank_badge(rank: usize) -> String {
    let text = format!("{:>3}.", rank);
    match rank {
        1 => themed(Role::Good, &[BOLD], &text),
        2 | 3 => themed(Role::Title, &[], &text),
        _ => themed(Role::Frame, &[], &text),
    }
}

pub fn outcome_label(outcome: LoadOutcome) -> String {
    match outcome {
        LoadOutcome::Loaded { count } => themed(Role::Good, &[], &format!("+{count}")),
        LoadOutcome::Exhausted => themed(Role::Frame, &[DIM], "done"),
        LoadOutcome::Unknown => themed(Role::Bad, &[], "unknown"),
        LoadOutcome::InFlight => themed(Role::Warn, &[], "busy"),
    }
}

pub fn print_results(query: &str, results: &[SearchDocument]) {
    section_top(&format!("SEARCH \"{}\"", truncate(query, 40)));
    if results.is_empty() {
        row(&themed(Role::Frame, &[DIM], " no matches"));
    }
    for (i, doc) in results.iter().enumerate() {
        row(&format!(" {} {}", rank_badge(i + 1), truncate(&label(doc), BOX_WIDTH - 8)));
    }
    section_bot();
}

pub fn print_collection(collection: &Collection) {
    let more = if collection.has_more_products() {
        themed(Role::Warn, &[], " (more)")
    } else {
        String::new()
    };
    section_top(&format!("{} · {} products", collection.handle, collection.products.len()));
    if let Some(title) = collection.fields.get("title").and_then(Value::as_str) {
        row(&format!(" {}{}", themed(Role::Title, &[BOLD], title), more));
    } else if !more.is_empty() {
        row(&more);
    }
    for product in &collection.products {
        let id = themed(Role::Frame, &[], &format!("{:<12}", truncate(&product.id, 12)));
        row(&format!("  {} {}", id, truncate(&label(&product.fields), BOX_WIDTH - 17)));
    }
    section_bot();
}

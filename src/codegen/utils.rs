//! Naming helpers shared by the schema model and the generators.

use std::path::PathBuf;

use convert_case::{Case, Casing};

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "static", "struct", "super", "trait", "true", "type",
    "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final", "macro",
    "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// Convert a string to snake_case
pub fn to_snake_case(s: &str) -> String {
    s.to_case(Case::Snake)
}

/// Convert a string to SCREAMING_SNAKE_CASE
pub fn to_screaming_snake_case(s: &str) -> String {
    s.to_case(Case::ScreamingSnake)
}

/// Whether `s` is a strict or reserved Rust keyword
pub fn is_keyword(s: &str) -> bool {
    RUST_KEYWORDS.contains(&s)
}

/// snake_case identifier, raw-escaped when it is a Rust keyword
pub fn rust_ident(s: &str) -> String {
    let snake = to_snake_case(s);
    if is_keyword(&snake) {
        format!("r#{}", snake)
    } else {
        snake
    }
}

/// Directory of a `::`-separated module path, relative to the output root
pub fn module_dir(module_path: &str) -> PathBuf {
    module_path.split("::").collect()
}

/// `crate::`-rooted path of an item inside a generated module
pub fn crate_path(module_path: &str, item: &str) -> String {
    format!("crate::{}::{}", module_path, item)
}

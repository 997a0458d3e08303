//! Identifier conversion for generated Rust source.

use std::collections::HashSet;

/// Strict and reserved keywords. `self`, `Self`, `super` and `crate` cannot
/// be raw identifiers and are handled separately in [`rust_ident`].
const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "union", "unsafe",
    "unsized", "use", "virtual", "where", "while", "yield",
];

const NON_RAW_KEYWORDS: &[&str] = &["self", "Self", "super", "crate", "_"];

/// Replace every character that cannot appear in an identifier with `_` and
/// prefix a leading digit.
fn sanitize(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// A snake_case identifier usable in Rust source, escaped as a raw
/// identifier when it collides with a keyword.
pub fn rust_ident(name: &str) -> String {
    let ident = sanitize(name);
    if ident.is_empty() {
        return "value".to_string();
    }
    if NON_RAW_KEYWORDS.contains(&ident.as_str()) {
        format!("{}_", ident)
    } else if RUST_KEYWORDS.contains(&ident.as_str()) {
        format!("r#{}", ident)
    } else {
        ident
    }
}

/// Convert snake_case to PascalCase.
pub fn to_pascal_case(s: &str) -> String {
    let pascal: String = sanitize(s)
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect();
    if pascal.is_empty() || pascal.starts_with(|c: char| c.is_ascii_digit()) {
        format!("T{}", pascal)
    } else if pascal == "Self" {
        "Self_".to_string()
    } else {
        pascal
    }
}

/// Module name for a generated file. Never collides with the fixed modules
/// of the output directory.
pub fn module_name(interface: &str) -> String {
    let ident = rust_ident(&interface.to_ascii_lowercase());
    match ident.as_str() {
        "messages" | "registry" | "r#mod" => format!("{}_binding", ident.trim_start_matches("r#")),
        _ => ident,
    }
}

/// File stem matching [`module_name`].
pub fn module_file(interface: &str) -> String {
    format!("{}.rs", module_name(interface).trim_start_matches("r#"))
}

/// Hands out identifiers that are unique within one scope by appending a
/// numeric suffix on collision.
#[derive(Debug, Default)]
pub struct Namer {
    taken: HashSet<String>,
}

impl Namer {
    pub fn with_reserved(reserved: &[&str]) -> Self {
        Self {
            taken: reserved.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn claim(&mut self, candidate: String) -> String {
        if self.taken.insert(candidate.clone()) {
            return candidate;
        }
        let base = candidate.trim_start_matches("r#").to_string();
        let mut n = 2;
        loop {
            let next = format!("{}_{}", base, n);
            if self.taken.insert(next.clone()) {
                return next;
            }
            n += 1;
        }
    }
}

//! Harvesting import specifiers from Solidity source text.
//!
//! Only path strings are collected; imported symbols are never checked.
//! Comments are blanked out first so commented-out imports are not followed,
//! and an `import` keyword only counts when it appears outside string
//! literals.

use once_cell::sync::Lazy;
use regex::Regex;

static KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bimport\b").expect("import keyword pattern is valid"));

static IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\Aimport\s*(?:(?:\{[^}]*\}|\*\s*as\s+[A-Za-z_$][\w$]*|[A-Za-z_$][\w$]*)\s*from\s*)?["']([^"']+)["']"#,
    )
    .expect("import pattern is valid")
});

/// Returns the path of every import statement in `text`, in source order.
///
/// Recognizes `import "p";`, `import "p" as X;`, `import {A, B} from "p";`,
/// `import * as X from "p";` and `import X from "p";`. Repeated imports of
/// the same path are reported each time they appear.
pub fn extract_imports(text: &str) -> Vec<String> {
    let code = mask(text, false);
    let bare = mask(text, true);
    KEYWORD
        .find_iter(&bare)
        .filter_map(|keyword| IMPORT.captures(&code[keyword.start()..]))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Replaces `//` and `/* */` comments with spaces and, with `strings` set,
/// does the same to the contents of string literals.
///
/// Quote characters, newlines and the byte length of the text are kept, so
/// offsets into the result are offsets into `text`.
fn mask(text: &str, strings: bool) -> String {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Code,
        Line,
        Block,
        Str(char),
    }

    let mut out = String::with_capacity(text.len());
    let mut state = State::Code;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Code => match c {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    out.push_str("  ");
                    state = State::Line;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    out.push_str("  ");
                    state = State::Block;
                }
                '"' | '\'' => {
                    out.push(c);
                    state = State::Str(c);
                }
                _ => out.push(c),
            },
            State::Line => {
                if c == '\n' {
                    out.push('\n');
                    state = State::Code;
                } else {
                    blank(&mut out, c);
                }
            }
            State::Block => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("  ");
                    state = State::Code;
                } else {
                    blank(&mut out, c);
                }
            }
            State::Str(quote) => {
                if c == quote || c == '\n' {
                    out.push(c);
                    state = State::Code;
                    continue;
                }
                let escaped = if c == '\\' { chars.next() } else { None };
                for ch in std::iter::once(c).chain(escaped) {
                    if strings {
                        blank(&mut out, ch);
                    } else {
                        out.push(ch);
                    }
                }
            }
        }
    }
    out
}

fn blank(out: &mut String, c: char) {
    if c == '\n' {
        out.push('\n');
    } else {
        for _ in 0..c.len_utf8() {
            out.push(' ');
        }
    }
}

//! # Header Module
//!
//! Turns a license template into a tolerant matcher.
//!
//! The template text is matched literally, with two kinds of holes:
//!
//! * `%year%` accepts any four ASCII digits, so a header written in 2019 still
//!   matches a template maintained in 2025.
//! * `%regexp:\d{N}%` accepts exactly `N` ASCII digits.
//!
//! ```rust
//! use licheck::header::HeaderPattern;
//!
//! let pattern = HeaderPattern::compile("Copyright (c) %year% ETH Zurich").unwrap();
//! assert!(pattern.is_match("// Copyright (c) 2024 ETH Zurich\n"));
//! assert!(!pattern.is_match("// Copyright (c) ETH Zurich\n"));
//! ```

use std::sync::LazyLock;

use regex::Regex;

/// Token replaced by a four-digit year.
pub const YEAR_TOKEN: &str = "%year%";

/// ASCII digits only; `\d` would also accept digits from other scripts.
const YEAR_REGEX: &str = "[0-9]{4}";

/// Characters that carry a meaning inside a regex and are escaped before the
/// template is compiled.
const METACHARACTERS: &[char] = &['.', '*', '+', '-', '?', '^', '$', '{', '}', '(', ')', '|', '[', ']', '\\'];

/// `%regexp:\d{N}%` as it reads once the template has been escaped.
static ESCAPED_DIGITS_DIRECTIVE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"%regexp:\\\\d\\\{(\d+)\\\}%").expect("directive regex is valid"));

/// Compiled matcher derived from a license template.
#[derive(Debug, Clone)]
pub struct HeaderPattern {
  regex: Regex,
}

impl HeaderPattern {
  /// Compile `template` into a header pattern.
  ///
  /// Fails only when a `%regexp:%` directive yields an invalid repetition
  /// (e.g. a count beyond the regex engine's limits).
  pub fn compile(template: &str) -> Result<Self, regex::Error> {
    let regex = Regex::new(&template_to_regex(template))?;
    Ok(Self { regex })
  }

  /// Whether `content` contains the header anywhere.
  pub fn is_match(&self, content: &str) -> bool {
    self.regex.is_match(content)
  }
}

/// Build the regex source for a license template.
///
/// Directives are restored after escaping, and before `%year%` is replaced,
/// so neither substitution site is escaped twice.
pub fn template_to_regex(template: &str) -> String {
  let escaped = escape_literal(template);
  let with_directives = ESCAPED_DIGITS_DIRECTIVE.replace_all(&escaped, "[0-9]{${1}}");
  with_directives.replace(YEAR_TOKEN, YEAR_REGEX)
}

fn escape_literal(text: &str) -> String {
  let mut escaped = String::with_capacity(text.len() + text.len() / 8);
  for c in text.chars() {
    if METACHARACTERS.contains(&c) {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  escaped
}

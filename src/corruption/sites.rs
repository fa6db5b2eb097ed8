//! Locating the places in a program where a fault class can be applied.

use crate::corruption::FaultClass;
use regex::Regex;

/// A single-site text edit: replace `start..end` with `replacement`.
///
/// Every edit the locator produces either deletes text or changes letter
/// case, so the result never contains anything new.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
}

impl Edit {
    fn delete(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            replacement: String::new(),
        }
    }

    pub fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        out.push_str(&text[..self.start]);
        out.push_str(&self.replacement);
        out.push_str(&text[self.end..]);
        out
    }
}

/// Compiled site patterns, one or two per fault class.
#[derive(Debug, Clone)]
pub struct SiteLocator {
    double_quoted: Regex,
    single_quoted: Regex,
    builtin_call: Regex,
    block_header: Regex,
    indented_line: Regex,
    call: Regex,
}

impl SiteLocator {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            double_quoted: Regex::new(r#""[^"\n]*""#)?,
            single_quoted: Regex::new(r"'[^'\n]*'")?,
            builtin_call: Regex::new(
                r"\b(print|len|range|list|dict|str|int|float|bool|sum|max|min|abs|round|sorted|reversed|enumerate|zip|map|filter|any|all|type|isinstance|hasattr|getattr|setattr|open|input)\s*\(",
            )?,
            block_header: Regex::new(r"(?m)^[ \t]*(?:def|if|for|while|else|elif)\b[^\n]*(:)[ \t]*$")?,
            indented_line: Regex::new(r"(?m)^( {4}[ \t]*)\S")?,
            call: Regex::new(r"[A-Za-z_][A-Za-z0-9_]*\s*\([^)]*\)")?,
        })
    }

    /// All sites in `text` where `class` applies, in text order.
    pub fn locate(&self, class: FaultClass, text: &str) -> Vec<Edit> {
        match class {
            FaultClass::MissingQuote => {
                let mut sites: Vec<Edit> = self
                    .double_quoted
                    .find_iter(text)
                    .chain(self.single_quoted.find_iter(text))
                    .map(|m| Edit::delete(m.end() - 1, m.end()))
                    .collect();
                sites.sort_by_key(|edit| edit.start);
                sites
            }
            FaultClass::WrongCapitalization => self
                .builtin_call
                .captures_iter(text)
                .filter_map(|caps| caps.get(1))
                .map(|name| Edit {
                    start: name.start(),
                    end: name.end(),
                    replacement: name.as_str().to_uppercase(),
                })
                .collect(),
            FaultClass::MissingColon => self
                .block_header
                .captures_iter(text)
                .filter_map(|caps| caps.get(1))
                .map(|colon| Edit::delete(colon.start(), colon.end()))
                .collect(),
            FaultClass::WrongIndentation => self
                .indented_line
                .captures_iter(text)
                .filter_map(|caps| caps.get(1))
                .map(|indent| Edit::delete(indent.start(), indent.end()))
                .collect(),
            FaultClass::MismatchedBrackets => self
                .call
                .find_iter(text)
                .map(|m| Edit::delete(m.end() - 1, m.end()))
                .collect(),
        }
    }
}

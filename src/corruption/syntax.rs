//! Conservative Python syntax checker.
//!
//! Only detects the structural problems that single-site faults can cause:
//! unterminated string literals, unbalanced brackets, broken indentation and
//! compound statements without their colon. Anything this checker rejects is
//! also rejected by CPython; the reverse does not hold.

use thiserror::Error;

/// A structural problem found in program text. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxIssue {
    #[error("line {line}: unterminated string literal")]
    UnterminatedString { line: usize },

    #[error("line {line}: closing '{close}' does not match opening '{open}'")]
    MismatchedBracket { line: usize, open: char, close: char },

    #[error("line {line}: '{open}' was never closed")]
    UnclosedBracket { line: usize, open: char },

    #[error("line {line}: unmatched '{close}'")]
    UnmatchedBracket { line: usize, close: char },

    #[error("line {line}: unexpected indent")]
    UnexpectedIndent { line: usize },

    #[error("line {line}: unindent does not match any outer indentation level")]
    InconsistentDedent { line: usize },

    #[error("line {line}: expected an indented block")]
    ExpectedIndentedBlock { line: usize },

    #[error("line {line}: expected ':' after '{keyword}'")]
    MissingColon { line: usize, keyword: String },
}

const COMPOUND_KEYWORDS: &[&str] = &[
    "if", "elif", "else", "for", "while", "def", "class", "try", "except", "finally", "with",
];

const TAB_WIDTH: usize = 8;

/// One logical line: physical lines joined across brackets and backslash
/// continuations, string literals collapsed to `""`, comments removed.
#[derive(Debug, PartialEq, Eq)]
struct LogicalLine {
    number: usize,
    indent: usize,
    code: String,
}

/// Returns `Ok(())` when no structural problem is found.
pub fn check(source: &str) -> Result<(), SyntaxIssue> {
    let lines = logical_lines(source)?;
    check_blocks(&lines)
}

pub fn parses(source: &str) -> bool {
    check(source).is_ok()
}

fn logical_lines(source: &str) -> Result<Vec<LogicalLine>, SyntaxIssue> {
    let chars: Vec<char> = source.chars().collect();
    let mut lines = Vec::new();
    let mut brackets: Vec<(char, usize)> = Vec::new();
    let mut code = String::new();
    let mut line = 1;
    let mut start = 1;
    let mut indent = 0;
    let mut at_line_start = true;
    let mut i = 0;

    while i < chars.len() {
        if at_line_start {
            let mut width = 0;
            while i < chars.len() && (chars[i] == ' ' || chars[i] == '\t') {
                width = if chars[i] == '\t' {
                    (width / TAB_WIDTH + 1) * TAB_WIDTH
                } else {
                    width + 1
                };
                i += 1;
            }
            match chars.get(i) {
                None => break,
                // blank and comment-only lines do not affect indentation
                Some('\n') | Some('\r') | Some('#') => {
                    while i < chars.len() && chars[i] != '\n' {
                        i += 1;
                    }
                    i += 1;
                    line += 1;
                    continue;
                }
                Some(_) => {
                    indent = width;
                    start = line;
                    at_line_start = false;
                }
            }
        }

        let c = chars[i];
        match c {
            '#' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
                continue;
            }
            '"' | '\'' => {
                i = skip_string(&chars, i, &mut line)?;
                code.push_str("\"\"");
                continue;
            }
            '(' | '[' | '{' => {
                brackets.push((c, line));
                code.push(c);
            }
            ')' | ']' | '}' => {
                match brackets.pop() {
                    None => return Err(SyntaxIssue::UnmatchedBracket { line, close: c }),
                    Some((open, _)) if closer(open) != c => {
                        return Err(SyntaxIssue::MismatchedBracket { line, open, close: c })
                    }
                    Some(_) => {}
                }
                code.push(c);
            }
            '\\' if chars.get(i + 1) == Some(&'\n') => {
                code.push(' ');
                line += 1;
                i += 2;
                continue;
            }
            '\n' => {
                line += 1;
                if brackets.is_empty() {
                    finish_line(&mut lines, &mut code, start, indent);
                    at_line_start = true;
                } else {
                    code.push(' ');
                }
            }
            '\r' => {}
            _ => code.push(c),
        }
        i += 1;
    }

    if let Some(&(open, opened_at)) = brackets.first() {
        return Err(SyntaxIssue::UnclosedBracket {
            line: opened_at,
            open,
        });
    }
    finish_line(&mut lines, &mut code, start, indent);
    Ok(lines)
}

fn finish_line(lines: &mut Vec<LogicalLine>, code: &mut String, number: usize, indent: usize) {
    let text = code.trim();
    if !text.is_empty() {
        lines.push(LogicalLine {
            number,
            indent,
            code: text.to_string(),
        });
    }
    code.clear();
}

fn closer(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

/// Skips a string literal starting at `start` and returns the index just past
/// its closing quote.
fn skip_string(chars: &[char], start: usize, line: &mut usize) -> Result<usize, SyntaxIssue> {
    let quote = chars[start];
    let opened_at = *line;
    let triple = chars.get(start + 1) == Some(&quote) && chars.get(start + 2) == Some(&quote);
    let mut i = if triple { start + 3 } else { start + 1 };

    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            if chars.get(i + 1) == Some(&'\n') {
                *line += 1;
            }
            i += 2;
            continue;
        }
        if c == '\n' {
            if !triple {
                return Err(SyntaxIssue::UnterminatedString { line: opened_at });
            }
            *line += 1;
        }
        if c == quote {
            if !triple {
                return Ok(i + 1);
            }
            if chars.get(i + 1) == Some(&quote) && chars.get(i + 2) == Some(&quote) {
                return Ok(i + 3);
            }
        }
        i += 1;
    }
    Err(SyntaxIssue::UnterminatedString { line: opened_at })
}

fn leading_word(code: &str) -> &str {
    let end = code
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(code.len());
    &code[..end]
}

/// Keyword that opens a compound statement on this line, if any.
fn compound_keyword(code: &str) -> Option<&str> {
    let mut word = leading_word(code);
    if word == "async" {
        word = leading_word(code[word.len()..].trim_start());
    }
    COMPOUND_KEYWORDS.iter().copied().find(|k| *k == word)
}

/// Byte offset of the first colon outside brackets that is not part of `:=`.
fn header_colon(code: &str) -> Option<usize> {
    let bytes = code.as_bytes();
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) != Some(&b'=') => return Some(i),
            _ => {}
        }
    }
    None
}

fn check_blocks(lines: &[LogicalLine]) -> Result<(), SyntaxIssue> {
    let mut indents = vec![0usize];
    let mut expecting_block = false;

    for line in lines {
        let current = indents.last().copied().unwrap_or(0);
        if expecting_block {
            if line.indent <= current {
                return Err(SyntaxIssue::ExpectedIndentedBlock { line: line.number });
            }
            indents.push(line.indent);
            expecting_block = false;
        } else if line.indent > current {
            return Err(SyntaxIssue::UnexpectedIndent { line: line.number });
        } else if line.indent < current {
            while indents.last().is_some_and(|&level| level > line.indent) {
                indents.pop();
            }
            if indents.last() != Some(&line.indent) {
                return Err(SyntaxIssue::InconsistentDedent { line: line.number });
            }
        }

        if let Some(keyword) = compound_keyword(&line.code) {
            let colon = header_colon(&line.code).ok_or_else(|| SyntaxIssue::MissingColon {
                line: line.number,
                keyword: keyword.to_string(),
            })?;
            expecting_block = line.code[colon + 1..].trim().is_empty();
        }
    }

    if expecting_block {
        let last = lines.last().map(|l| l.number).unwrap_or(0);
        return Err(SyntaxIssue::ExpectedIndentedBlock { line: last + 1 });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "def process_files():\n    files_count = 42\n    if files_count > 0:\n        print(f\"Processing files...\")\n        print(f\"Complete: {files_count} files processed\")\n    else:\n        print('none')\n\nprocess_files()";

    #[test]
    fn test_accepts_valid_program() {
        assert_eq!(check(VALID), Ok(()));
        assert!(parses("x = {'a': [1, 2], 'b': (3,)}\nprint(x['a'][0])"));
        assert!(parses("if (n := 10) > 5: print(n)"));
    }

    #[test]
    fn test_comments_and_blank_lines_are_ignored() {
        let source = "# header\n\nx = 1  # trailing (\n    # indented comment\nprint(x)\n";
        assert!(parses(source));
    }

    #[test]
    fn test_missing_colon() {
        let broken = VALID.replacen("if files_count > 0:", "if files_count > 0", 1);
        assert_eq!(
            check(&broken),
            Err(SyntaxIssue::MissingColon {
                line: 3,
                keyword: "if".to_string()
            })
        );
    }

    #[test]
    fn test_colon_inside_brackets_does_not_count() {
        let err = check("for k in {'a': 1}\n    print(k)").unwrap_err();
        assert!(matches!(err, SyntaxIssue::MissingColon { .. }));
    }

    #[test]
    fn test_unterminated_string() {
        let broken = "print(\"Processing files...)\nx = 1";
        assert_eq!(check(broken), Err(SyntaxIssue::UnterminatedString { line: 1 }));
        assert!(parses("s = \"\"\"multi\nline\"\"\"\nprint(s)"));
        assert!(!parses("s = '''never closed\n"));
    }

    #[test]
    fn test_escaped_quote_stays_inside_string() {
        assert!(parses("print(\"say \\\"hi\\\"\")"));
        assert!(!parses("print(\"say \\\")"));
    }

    #[test]
    fn test_brackets() {
        assert_eq!(
            check("print(len(items)\nx = 1"),
            Err(SyntaxIssue::UnclosedBracket { line: 1, open: '(' })
        );
        assert_eq!(
            check("x = [1, 2)"),
            Err(SyntaxIssue::MismatchedBracket {
                line: 1,
                open: '[',
                close: ')'
            })
        );
        assert_eq!(
            check("x = 1)"),
            Err(SyntaxIssue::UnmatchedBracket { line: 1, close: ')' })
        );
        assert!(parses("total = sum(\n    [1, 2, 3]\n)"));
    }

    #[test]
    fn test_indentation() {
        assert_eq!(
            check("x = 1\n    y = 2"),
            Err(SyntaxIssue::UnexpectedIndent { line: 2 })
        );
        assert_eq!(
            check("if x:\ny = 2"),
            Err(SyntaxIssue::ExpectedIndentedBlock { line: 2 })
        );
        assert_eq!(
            check("if x:\n        a = 1\n    b = 2"),
            Err(SyntaxIssue::InconsistentDedent { line: 3 })
        );
        assert_eq!(
            check("while True:"),
            Err(SyntaxIssue::ExpectedIndentedBlock { line: 2 })
        );
    }

    #[test]
    fn test_dedenting_last_line_of_block_still_parses() {
        // legal Python with different meaning, so not a parse failure
        assert!(parses("if x:\n    a = 1\nb = 2"));
    }

    #[test]
    fn test_backslash_continuation() {
        assert!(parses("total = 1 + \\\n    2\nprint(total)"));
    }

    #[test]
    fn test_keyword_prefix_is_not_a_keyword() {
        assert!(parses("if_count = 3\nclass_name = 'x'\nformat_value = 1"));
        assert_eq!(compound_keyword("async for x in y:"), Some("for"));
    }
}

//! Delimited-text tokenizer.
//!
//! One left-to-right scan per line with a single `inside_quotes` flag. A
//! double quote toggles the flag and is never part of a token, so both
//! `"b,c"` and doubled `""` quotes work as escapes. Unbalanced quotes keep
//! the flag set to the end of the line; that is accepted, not repaired.

/// Field delimiter for sheet exports and pasted text.
pub const DELIMITER: char = ',';

const QUOTE: char = '"';

/// Split one line into fields.
///
/// A line with N unquoted delimiters yields N+1 tokens, empty ones
/// included. Never fails.
pub fn tokenize_line(line: &str, delimiter: char) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut inside_quotes = false;

    for ch in line.chars() {
        if ch == QUOTE {
            inside_quotes = !inside_quotes;
        } else if ch == delimiter && !inside_quotes {
            tokens.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    tokens.push(current);

    tokens
}

/// Non-blank lines of `text` with their 1-based line numbers.
///
/// Handles `\n` and `\r\n` endings. Whitespace-only lines are skipped and
/// never reach the tokenizer.
pub fn split_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| (idx + 1, line))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(line: &str) -> Vec<String> {
        tokenize_line(line, DELIMITER)
    }

    #[test]
    fn plain_row_matches_split() {
        let row = "Freddy,45000,5,Eins";
        let expected: Vec<String> = row.split(',').map(str::to_string).collect();
        assert_eq!(tok(row), expected);
    }

    #[test]
    fn quoted_tokens_lose_their_quotes() {
        assert_eq!(tok(r#""Freddy Krueger","45000""#), vec!["Freddy Krueger", "45000"]);
    }

    #[test]
    fn quoted_delimiter_is_preserved() {
        assert_eq!(tok(r#"a,"b,c",d"#), vec!["a", "b,c", "d"]);
    }

    #[test]
    fn empty_fields_are_kept() {
        assert_eq!(tok("Jason,38000,"), vec!["Jason", "38000", ""]);
        assert_eq!(tok(",,"), vec!["", "", ""]);
        assert_eq!(tok(""), vec![""]);
    }

    #[test]
    fn doubled_quotes_vanish() {
        assert_eq!(tok(r#""say ""hi"", ok",x"#), vec!["say hi, ok", "x"]);
    }

    #[test]
    fn unbalanced_quote_swallows_rest_of_line() {
        assert_eq!(tok(r#"a,"b,c,d"#), vec!["a", "b,c,d"]);
    }

    #[test]
    fn whitespace_is_not_trimmed() {
        assert_eq!(tok(" a , b "), vec![" a ", " b "]);
    }

    #[test]
    fn other_delimiters() {
        assert_eq!(tokenize_line("a;b;\"c;d\"", ';'), vec!["a", "b", "c;d"]);
    }

    #[test]
    fn split_lines_skips_blank_and_strips_cr() {
        let text = "h1,h2\r\n\r\n   \nv1,v2\r\n";
        let lines: Vec<_> = split_lines(text).collect();
        assert_eq!(lines, vec![(1, "h1,h2"), (4, "v1,v2")]);
    }
}

//! Interactive questions for the operator, over any reader/writer pair.

use anyhow::{anyhow, Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Strips surrounding whitespace and quotes from a pasted path.
pub fn clean_path(input: &str) -> PathBuf {
    PathBuf::from(input.trim().trim_matches('"').trim_matches('\''))
}

pub fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<String> {
    write!(output, "{}", question)?;
    output.flush()?;

    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        return Err(anyhow!("no answer to '{}' (end of input)", question.trim()));
    }
    Ok(answer.trim().to_string())
}

pub fn ask_path<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<PathBuf> {
    let answer = ask(input, output, question)?;
    let path = clean_path(&answer);
    if path.as_os_str().is_empty() {
        return Err(anyhow!("empty path"));
    }
    Ok(path)
}

/// Asks for the first and last row to fix (1-based, inclusive).
pub fn ask_range<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<(i64, i64)> {
    let mut ask_row = |question: &str| -> Result<i64> {
        let answer = ask(input, output, question)?;
        answer
            .parse::<i64>()
            .with_context(|| format!("'{}' is not a row number", answer))
    };
    let start = ask_row("First row to fix (1-based): ")?;
    let end = ask_row("Last row to fix (1-based): ")?;
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn cleans_quoted_paths() {
        assert_eq!(clean_path("  \"/tmp/a b.cif\"  \n"), PathBuf::from("/tmp/a b.cif"));
        assert_eq!(clean_path("'slab.cif'"), PathBuf::from("slab.cif"));
        assert_eq!(clean_path("plain.cif"), PathBuf::from("plain.cif"));
    }

    #[test]
    fn reads_range() {
        let mut input = Cursor::new("2\n 5 \n");
        let mut output = Vec::new();
        assert_eq!(ask_range(&mut input, &mut output).unwrap(), (2, 5));
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("First row") && shown.contains("Last row"));
    }

    #[test]
    fn non_numeric_row_is_an_error() {
        let mut input = Cursor::new("two\n5\n");
        let err = ask_range(&mut input, &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("'two'"));
    }

    #[test]
    fn end_of_input_is_an_error() {
        let mut input = Cursor::new("");
        assert!(ask_path(&mut input, &mut Vec::new(), "Path: ").is_err());
    }
}

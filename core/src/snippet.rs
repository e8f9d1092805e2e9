use crate::index::LineNo;
use anyhow::Result;
use std::io::BufRead;

/// Stream `reader` and return the lines whose numbers appear in `wanted`.
///
/// `wanted` must be ascending without duplicates. Reading stops as soon as the
/// last wanted line has been emitted.
pub fn extract_lines<R: BufRead>(reader: R, wanted: &[LineNo]) -> Result<Vec<String>> {
    let mut out = Vec::with_capacity(wanted.len());
    let mut pending = wanted.iter().copied().peekable();
    for (line_no, line) in reader.lines().enumerate() {
        let Some(&next) = pending.peek() else { break };
        let line = line?;
        if line_no as LineNo == next {
            out.push(line);
            pending.next();
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_only_wanted_lines_in_order() {
        let text = "zero\none\ntwo\nthree\nfour\n";
        assert_eq!(extract_lines(text.as_bytes(), &[1, 3]).unwrap(), vec!["one", "three"]);
    }

    #[test]
    fn nothing_wanted_reads_nothing() {
        assert!(extract_lines("a\nb".as_bytes(), &[]).unwrap().is_empty());
    }

    #[test]
    fn lines_past_the_end_are_ignored() {
        assert_eq!(extract_lines("a\nb".as_bytes(), &[1, 7]).unwrap(), vec!["b"]);
    }

    #[test]
    fn stops_before_unreadable_tail() {
        // invalid UTF-8 after the last wanted line is never decoded
        let mut bytes = b"keep\n".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);
        assert_eq!(extract_lines(&bytes[..], &[0]).unwrap(), vec!["keep"]);
    }
}

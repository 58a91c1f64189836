use std::io::{BufRead, Read};

use crate::error::SortError;

/// Reads newline terminated lines as raw bytes, keeping the terminator.
///
/// An unterminated last line is returned as is. A line longer than `max_line_length`
/// (terminator included, a missing terminator counts as present) fails with [SortError::LineTooLong] instead of being truncated.
#[derive(Debug)]
pub(crate) struct LineReader<R: BufRead> {
    reader: R,
    max_line_length: usize,
}

impl<R: BufRead> LineReader<R> {
    pub(crate) fn new(reader: R, max_line_length: usize) -> LineReader<R> {
        LineReader {
            reader,
            max_line_length,
        }
    }

    /// Read the next line, None at end of stream
    pub(crate) fn read_line(&mut self) -> Result<Option<Vec<u8>>, anyhow::Error> {
        let mut line = Vec::new();
        let limit = (self.max_line_length as u64).saturating_add(1);
        let bytes = self.reader.by_ref().take(limit).read_until(b'\n', &mut line)?;
        if bytes == 0 {
            Ok(None)
        } else if line.len() > self.max_line_length
            || (line.len() == self.max_line_length && line.last() != Some(&b'\n')) {
            Err(SortError::LineTooLong { limit: self.max_line_length }.into())
        } else {
            Ok(Some(line))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::BufReader;

    use crate::error::SortError;
    use crate::line_reader::LineReader;

    #[test]
    fn test_read_lines() -> Result<(), anyhow::Error> {
        let data = b"banana\napple\ncherry";
        let mut reader = LineReader::new(BufReader::new(&data[..]), 1024);
        assert_eq!(reader.read_line()?, Some(b"banana\n".to_vec()));
        assert_eq!(reader.read_line()?, Some(b"apple\n".to_vec()));
        assert_eq!(reader.read_line()?, Some(b"cherry".to_vec()));
        assert_eq!(reader.read_line()?, None);
        assert_eq!(reader.read_line()?, None);
        Ok(())
    }

    #[test]
    fn test_empty_lines_are_lines() -> Result<(), anyhow::Error> {
        let data = b"\n\nx\n";
        let mut reader = LineReader::new(BufReader::new(&data[..]), 1024);
        assert_eq!(reader.read_line()?, Some(b"\n".to_vec()));
        assert_eq!(reader.read_line()?, Some(b"\n".to_vec()));
        assert_eq!(reader.read_line()?, Some(b"x\n".to_vec()));
        assert_eq!(reader.read_line()?, None);
        Ok(())
    }

    #[test]
    fn test_line_at_limit() -> Result<(), anyhow::Error> {
        let data = b"abcd\nabc";
        let mut reader = LineReader::new(BufReader::new(&data[..]), 5);
        assert_eq!(reader.read_line()?, Some(b"abcd\n".to_vec()));
        assert_eq!(reader.read_line()?, Some(b"abc".to_vec()));
        Ok(())
    }

    #[test]
    fn test_line_too_long() -> Result<(), anyhow::Error> {
        let data = b"ok\nabcdef\n";
        let mut reader = LineReader::new(BufReader::new(&data[..]), 5);
        assert_eq!(reader.read_line()?, Some(b"ok\n".to_vec()));
        let error = reader.read_line().unwrap_err();
        assert!(matches!(error.downcast_ref::<SortError>(), Some(SortError::LineTooLong { limit: 5 })));
        Ok(())
    }

    #[test]
    fn test_unterminated_line_counts_missing_terminator() -> Result<(), anyhow::Error> {
        let data = b"abcd\nabcde";
        let mut reader = LineReader::new(BufReader::new(&data[..]), 5);
        assert_eq!(reader.read_line()?, Some(b"abcd\n".to_vec()));
        let error = reader.read_line().unwrap_err();
        assert!(matches!(error.downcast_ref::<SortError>(), Some(SortError::LineTooLong { limit: 5 })));
        Ok(())
    }

    #[test]
    fn test_unterminated_line_too_long() {
        let data = b"abcdefgh";
        let mut reader = LineReader::new(BufReader::new(&data[..]), 4);
        assert!(reader.read_line().is_err());
    }

    #[test]
    fn test_non_utf8_bytes() -> Result<(), anyhow::Error> {
        let data = [0xff, 0xfe, b'\n', 0x00];
        let mut reader = LineReader::new(BufReader::new(&data[..]), 16);
        assert_eq!(reader.read_line()?, Some(vec![0xff, 0xfe, b'\n']));
        assert_eq!(reader.read_line()?, Some(vec![0x00]));
        Ok(())
    }
}

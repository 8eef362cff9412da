use std::io::{Read, Seek, SeekFrom};

/// Size of the blocks read backwards from the end of a file
const TAIL_CHUNK_SIZE: u64 = 4096;

/// Read the last line of a seekable reader without scanning the whole thing.
///
/// Blocks are read backwards from the end until a newline is found (or the start of the reader
/// is reached), then the line is read forward from just after that newline. A single trailing
/// line terminator is not considered the start of a new line. Returns None for an empty reader.
///
/// The returned line does not include its terminator.
pub fn read_last_line<R: Read + Seek>(reader: &mut R) -> std::io::Result<Option<Vec<u8>>> {
    let total_len = reader.seek(SeekFrom::End(0))?;
    if total_len == 0 {
        return Ok(None);
    }

    let mut line_end = total_len;
    let mut last_byte = [0u8; 1];
    reader.seek(SeekFrom::Start(total_len - 1))?;
    reader.read_exact(&mut last_byte)?;
    if last_byte[0] == b'\n' {
        line_end -= 1;
    }

    let mut line_start: u64 = 0;
    let mut chunk_end = line_end;
    let mut chunk: Vec<u8> = Vec::with_capacity(TAIL_CHUNK_SIZE as usize);
    while chunk_end > 0 {
        let chunk_start = chunk_end.saturating_sub(TAIL_CHUNK_SIZE);
        chunk.resize((chunk_end - chunk_start) as usize, 0);
        reader.seek(SeekFrom::Start(chunk_start))?;
        reader.read_exact(&mut chunk)?;
        if let Some(pos) = chunk.iter().rposition(|b| *b == b'\n') {
            line_start = chunk_start + pos as u64 + 1;
            break;
        }
        chunk_end = chunk_start;
    }

    let mut line = vec![0u8; (line_end - line_start) as usize];
    reader.seek(SeekFrom::Start(line_start))?;
    reader.read_exact(&mut line)?;
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    Ok(Some(line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn last_line(data: &[u8]) -> Option<String> {
        read_last_line(&mut Cursor::new(data.to_vec()))
            .unwrap()
            .map(|l| String::from_utf8(l).unwrap())
    }

    #[test]
    fn test_empty_reader() {
        assert_eq!(last_line(b""), None);
    }

    #[test]
    fn test_trailing_newline() {
        assert_eq!(last_line(b"a,1\nb,2\nc,3\n").as_deref(), Some("c,3"));
    }

    #[test]
    fn test_no_trailing_newline() {
        assert_eq!(last_line(b"a,1\nb,2\nc,3").as_deref(), Some("c,3"));
    }

    #[test]
    fn test_single_line() {
        assert_eq!(last_line(b"only\n").as_deref(), Some("only"));
        assert_eq!(last_line(b"only").as_deref(), Some("only"));
    }

    #[test]
    fn test_crlf_terminators() {
        assert_eq!(last_line(b"a,1\r\nb,2\r\n").as_deref(), Some("b,2"));
    }

    #[test]
    fn test_trailing_blank_line() {
        assert_eq!(last_line(b"a,1\n\n").as_deref(), Some(""));
        assert_eq!(last_line(b"\n").as_deref(), Some(""));
    }

    #[test]
    fn test_line_longer_than_chunk() {
        let long = "x".repeat(3 * TAIL_CHUNK_SIZE as usize + 17);
        let data = format!("first\n{long}\n");
        assert_eq!(last_line(data.as_bytes()), Some(long.clone()));

        let data = format!("{long}\n");
        assert_eq!(last_line(data.as_bytes()), Some(long));
    }

    #[test]
    fn test_newline_on_chunk_boundary() {
        let tail = "y".repeat(TAIL_CHUNK_SIZE as usize);
        let data = format!("head\n{tail}");
        assert_eq!(last_line(data.as_bytes()), Some(tail));
    }
}

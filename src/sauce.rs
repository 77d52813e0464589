//! SAUCE metadata trailer.
//!
//! A SAUCE record is a fixed 128-byte block at the very end of the file,
//! optionally preceded by a `COMNT` block of 64-byte comment lines. It never
//! affects pixel output, but its length (plus the EOF byte the scene tools
//! wrote before it) must be subtracted before decoding so trailer bytes are
//! not interpreted as art.

use tracing::debug;

pub const SAUCE_ID: &[u8; 5] = b"SAUCE";
pub const COMMENT_ID: &[u8; 5] = b"COMNT";

const RECORD_SIZE: usize = 128;
const COMMENT_SIZE: usize = 64;

/// A parsed SAUCE record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sauce {
    pub version: String,
    pub title: String,
    pub author: String,
    pub group: String,
    pub date: String,
    pub file_size: u32,
    pub data_type: u8,
    pub file_type: u8,
    pub tinfo: [u16; 4],
    pub comments: u8,
    pub flags: u8,
    pub comment_lines: Vec<String>,
}

/// Fixed-width CP437 text field: high bytes mapped through Latin-1, right
/// side trimmed of padding.
fn field(bytes: &[u8]) -> String {
    let s: String = bytes.iter().map(|&b| b as char).collect();
    s.trim_end_matches([' ', '\0']).to_string()
}

/// Parse the SAUCE record from the tail of `data`, if present.
pub fn read(data: &[u8]) -> Option<Sauce> {
    if data.len() < RECORD_SIZE {
        return None;
    }
    let rec = &data[data.len() - RECORD_SIZE..];
    if &rec[0..5] != SAUCE_ID {
        return None;
    }

    let u16_at = |o: usize| u16::from_le_bytes([rec[o], rec[o + 1]]);
    let mut sauce = Sauce {
        version: field(&rec[5..7]),
        title: field(&rec[7..42]),
        author: field(&rec[42..62]),
        group: field(&rec[62..82]),
        date: field(&rec[82..90]),
        file_size: u32::from_le_bytes([rec[90], rec[91], rec[92], rec[93]]),
        data_type: rec[94],
        file_type: rec[95],
        tinfo: [u16_at(96), u16_at(98), u16_at(100), u16_at(102)],
        comments: rec[104],
        flags: rec[105],
        comment_lines: Vec::new(),
    };
    sauce.comment_lines = read_comments(data, sauce.comments);
    debug!(
        title = %sauce.title,
        author = %sauce.author,
        comments = sauce.comments,
        "found SAUCE record"
    );
    Some(sauce)
}

fn read_comments(data: &[u8], count: u8) -> Vec<String> {
    if count == 0 {
        return Vec::new();
    }
    let block = 5 + COMMENT_SIZE * count as usize;
    let Some(start) = data.len().checked_sub(RECORD_SIZE + block) else {
        return Vec::new();
    };
    if &data[start..start + 5] != COMMENT_ID {
        return Vec::new();
    }
    (0..count as usize)
        .map(|i| {
            let o = start + 5 + i * COMMENT_SIZE;
            field(&data[o..o + COMMENT_SIZE])
        })
        .collect()
}

/// Length of the art content with any SAUCE trailer stripped: the record
/// plus its EOF byte (129), plus `5 + 64 * comments` when a comment block
/// is declared.
pub fn effective_length(data: &[u8]) -> usize {
    match read(data) {
        None => data.len(),
        Some(rec) => {
            let mut adjusted = data.len().saturating_sub(RECORD_SIZE + 1);
            if rec.comments > 0 {
                adjusted = adjusted.saturating_sub(5 + COMMENT_SIZE * rec.comments as usize);
            }
            adjusted
        }
    }
}

#[cfg(test)]
pub(crate) fn test_record(title: &str, comments: u8) -> Vec<u8> {
    let mut rec = vec![0u8; RECORD_SIZE];
    rec[0..5].copy_from_slice(SAUCE_ID);
    rec[5..7].copy_from_slice(b"00");
    let title = title.as_bytes();
    rec[7..42].fill(b' ');
    rec[7..7 + title.len()].copy_from_slice(title);
    rec[104] = comments;
    rec
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_record_means_full_length() {
        assert_eq!(effective_length(b"hello"), 5);
        assert!(read(b"hello").is_none());
        let long = vec![b'x'; 300];
        assert_eq!(effective_length(&long), 300);
    }

    #[test]
    fn record_fields_parse() {
        let mut data = b"ART".to_vec();
        data.push(0x1A);
        data.extend(test_record("Blocktronics", 0));
        let rec = read(&data).unwrap();
        assert_eq!(rec.title, "Blocktronics");
        assert_eq!(rec.comments, 0);
        assert!(rec.comment_lines.is_empty());
        // 3 art bytes + EOF byte + 128 record, minus 129
        assert_eq!(effective_length(&data), 3);
    }

    #[test]
    fn comment_block_is_stripped() {
        let mut data = b"AB".to_vec();
        data.push(0x1A);
        data.extend(COMMENT_ID);
        let mut line = [b' '; COMMENT_SIZE];
        line[..5].copy_from_slice(b"hello");
        data.extend(line);
        data.extend(test_record("t", 1));
        let rec = read(&data).unwrap();
        assert_eq!(rec.comment_lines, vec!["hello".to_string()]);
        assert_eq!(effective_length(&data), 2);
    }

    #[test]
    fn missing_comment_id_yields_no_lines() {
        let mut data = vec![0u8; 80];
        data.extend(test_record("t", 1));
        let rec = read(&data).unwrap();
        assert!(rec.comment_lines.is_empty());
        // length math still trusts the declared count
        assert_eq!(effective_length(&data), 208 - 129 - 69);
    }

    #[test]
    fn truncated_adjustment_saturates() {
        let data = test_record("t", 4);
        assert_eq!(effective_length(&data), 0);
    }
}

// src/wordlist.rs
// =============================================================================
// Loads the wordlist: one word per line.
//
// Lines are taken as-is. Only the line terminator ("\n" or "\r\n") is
// stripped; blank lines stay in the list as empty words and duplicates are
// kept, so every line becomes exactly one target.
//
// Wordlists are not always UTF-8 (Latin-1 entries are common). Bytes that
// are not valid UTF-8 are percent-encoded, so the request still carries the
// original byte values instead of failing the whole load.
// =============================================================================

use crate::error::ScanError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

// Reads every line of the file at `path` into a Vec
pub fn load_wordlist(path: &Path) -> Result<Vec<String>, ScanError> {
    let wrap = |source| ScanError::Wordlist {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = BufReader::new(File::open(path).map_err(wrap)?);
    let mut words = Vec::new();
    let mut line = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).map_err(wrap)? == 0 {
            break;
        }
        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        words.push(decode_word(&line));
    }

    Ok(words)
}

// Valid UTF-8 passes through unchanged, every invalid byte becomes %XX
fn decode_word(mut bytes: &[u8]) -> String {
    let mut word = String::with_capacity(bytes.len());
    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                word.push_str(valid);
                return word;
            }
            Err(e) => {
                let (valid, rest) = bytes.split_at(e.valid_up_to());
                word.push_str(std::str::from_utf8(valid).unwrap_or_default());

                let invalid = e.error_len().unwrap_or(rest.len());
                for byte in &rest[..invalid] {
                    word.push_str(&format!("%{:02X}", byte));
                }
                bytes = &rest[invalid..];
            }
        }
    }
}

//! Reading and rewriting the `TEMPO` line of a project file.

use riff_common_fs as fs;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

use crate::error::{ProjectError, ProjectResult};

/// How far into a file the scanner looks for a tempo.
pub const TEMPO_SCAN_LINES: usize = 100;

const TEMPO_PREFIX: &[u8] = b"TEMPO ";

fn strip_indent(line: &[u8]) -> (&[u8], &[u8]) {
    let n = line
        .iter()
        .take_while(|b| **b == b' ' || **b == b'\t')
        .count();
    line.split_at(n)
}

fn fields(line: &[u8]) -> Vec<&[u8]> {
    line.split(|b| b.is_ascii_whitespace())
        .filter(|f| !f.is_empty())
        .collect()
}

/// Read the tempo from the first `TEMPO` line within `max_lines` lines.
///
/// Only the first `TEMPO` line counts, as in [`patch_tempo`]. Returns
/// `Ok(None)` when there is no such line or it has no tempo field, and an
/// error when the tempo field is not a number.
pub fn extract_tempo(path: &Path, max_lines: usize) -> ProjectResult<Option<f64>> {
    let file = std::fs::File::open(path).map_err(|source| fs::FsError::Io {
        action: "open",
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    for line in reader.split(b'\n').take(max_lines) {
        let line = line.map_err(|source| fs::FsError::Io {
            action: "read",
            path: path.to_path_buf(),
            source,
        })?;
        let (_, content) = strip_indent(&line);
        if !content.starts_with(TEMPO_PREFIX) {
            continue;
        }

        let parts = fields(content);
        let Some(value) = parts.get(1) else {
            return Ok(None);
        };

        let raw = String::from_utf8_lossy(value);
        return raw
            .parse::<f64>()
            .map(Some)
            .map_err(|_| ProjectError::Tempo {
                path: path.to_path_buf(),
                value: raw.into_owned(),
            });
    }

    Ok(None)
}

/// Replace the tempo on the first `TEMPO` line of `content`.
///
/// The indentation and a trailing `\r` are kept, the remaining fields are
/// re-joined with single spaces. Returns the new bytes and whether a line
/// was rewritten.
pub fn patch_tempo(content: &[u8], bpm: u32) -> (Vec<u8>, bool) {
    let mut out = Vec::with_capacity(content.len() + 8);
    let mut patched = false;
    let mut searching = true;

    let mut lines = content.split(|b| *b == b'\n').peekable();
    while let Some(line) = lines.next() {
        let mut replaced = None;

        if searching {
            let (body, cr) = match line.strip_suffix(b"\r") {
                Some(body) => (body, true),
                None => (line, false),
            };
            let (indent, rest) = strip_indent(body);
            if rest.starts_with(TEMPO_PREFIX) {
                searching = false;
                let mut parts = fields(rest);
                if parts.len() >= 2 {
                    let tempo = bpm.to_string();
                    parts[1] = tempo.as_bytes();
                    let mut rewritten = indent.to_vec();
                    rewritten.extend_from_slice(&parts.join(&b' '));
                    if cr {
                        rewritten.push(b'\r');
                    }
                    replaced = Some(rewritten);
                    patched = true;
                }
            }
        }

        match replaced {
            Some(line) => out.extend_from_slice(&line),
            None => out.extend_from_slice(line),
        }
        if lines.peek().is_some() {
            out.push(b'\n');
        }
    }

    (out, patched)
}

/// Rewrite the tempo of the project file at `path` in place. The file is
/// only written when a `TEMPO` line was patched.
pub fn apply_tempo(path: &Path, bpm: u32) -> ProjectResult<bool> {
    let content = fs::read_bytes(path)?;
    let (content, patched) = patch_tempo(&content, bpm);
    if patched {
        fs::write_atomic(path, &content)?;
    }
    debug!(path = %path.display(), bpm, patched, "Applied tempo");
    Ok(patched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use test_case::test_case;

    const PROJECT: &str = "<REAPER_PROJECT 0.1 \"7.0/linux\" 1700000000\n  RIPPLE 0\n  TEMPO 120.0 4 4\n  PLAYRATE 1 0 0.25 4\n>\n";

    fn file_with(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_patch_preserves_indent_and_other_lines() {
        let (out, patched) = patch_tempo(PROJECT.as_bytes(), 140);
        assert!(patched);
        let out = String::from_utf8(out).unwrap();
        assert_eq!(out, PROJECT.replace("  TEMPO 120.0 4 4", "  TEMPO 140 4 4"));
    }

    #[test]
    fn test_patch_only_first_tempo_line() {
        let content = "\tTEMPO 90 4 4\nTEMPO 100 3 4\n";
        let (out, _) = patch_tempo(content.as_bytes(), 128);
        assert_eq!(out, b"\tTEMPO 128 4 4\nTEMPO 100 3 4\n");
    }

    #[test]
    fn test_patch_keeps_crlf() {
        let content = "<P\r\n  TEMPO   120   4 4\r\n>\r\n";
        let (out, patched) = patch_tempo(content.as_bytes(), 96);
        assert!(patched);
        assert_eq!(out, b"<P\r\n  TEMPO 96 4 4\r\n>\r\n");
    }

    #[test_case("TEMPO \nTEMPO 100 4 4\n" ; "single field stops search")]
    #[test_case("TEMPOX 100\n" ; "no space after keyword")]
    #[test_case("tempo 100\n" ; "lowercase")]
    #[test_case("" ; "empty file")]
    fn test_patch_leaves_content_untouched(content: &str) {
        let (out, patched) = patch_tempo(content.as_bytes(), 140);
        assert!(!patched);
        assert_eq!(out, content.as_bytes());
    }

    #[test]
    fn test_patch_preserves_non_utf8_bytes() {
        let mut content = b"NAME \xff\xfe\n  TEMPO 120 4 4\n".to_vec();
        content.extend_from_slice(b"\x80end");
        let (out, patched) = patch_tempo(&content, 80);
        assert!(patched);
        assert_eq!(out, b"NAME \xff\xfe\n  TEMPO 80 4 4\n\x80end");
    }

    #[test]
    fn test_extract_reads_second_field() {
        let f = file_with(PROJECT);
        assert_eq!(extract_tempo(f.path(), TEMPO_SCAN_LINES).unwrap(), Some(120.0));
    }

    #[test]
    fn test_first_tempo_line_decides_for_both_directions() {
        let content = "TEMPO \n  TEMPO 100 4 4\n";
        let f = file_with(content);
        assert_eq!(extract_tempo(f.path(), TEMPO_SCAN_LINES).unwrap(), None);

        assert!(!apply_tempo(f.path(), 140).unwrap());
        assert_eq!(std::fs::read_to_string(f.path()).unwrap(), content);
    }

    #[test]
    fn test_extract_respects_line_limit() {
        let mut content = "FILLER\n".repeat(100);
        content.push_str("TEMPO 99 4 4\n");
        let f = file_with(&content);
        assert_eq!(extract_tempo(f.path(), 100).unwrap(), None);
        assert_eq!(extract_tempo(f.path(), 101).unwrap(), Some(99.0));
    }

    #[test]
    fn test_extract_bad_number_is_error() {
        let f = file_with("  TEMPO fast 4 4\n");
        let err = extract_tempo(f.path(), TEMPO_SCAN_LINES).unwrap_err();
        assert!(matches!(err, ProjectError::Tempo { ref value, .. } if value == "fast"));
    }

    #[test]
    fn test_extract_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(extract_tempo(&dir.path().join("gone.RPP"), 10).is_err());
    }

    #[test]
    fn test_apply_rewrites_file() {
        let f = file_with(PROJECT);
        assert!(apply_tempo(f.path(), 140).unwrap());
        assert_eq!(extract_tempo(f.path(), TEMPO_SCAN_LINES).unwrap(), Some(140.0));
    }
}

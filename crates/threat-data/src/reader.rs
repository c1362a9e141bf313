//! Line-by-line access to feed files.
//!
//! Opening a feed and every read error are fatal for the file; what to do with
//! the content of each line is the caller's concern.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use threat_core::error::{Result, ThreatError};

/// Lines of a feed file, numbered from 1, newline stripped.
pub struct FeedLines {
    path: PathBuf,
    lines: std::io::Lines<BufReader<File>>,
    line_no: usize,
}

impl Iterator for FeedLines {
    type Item = Result<(usize, String)>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.next()?;
        self.line_no += 1;
        Some(
            line.map(|l| (self.line_no, l))
                .map_err(|source| ThreatError::FileRead {
                    path: self.path.clone(),
                    source,
                }),
        )
    }
}

/// Open `path` for line-by-line reading.
pub fn feed_lines(path: &Path) -> Result<FeedLines> {
    let file = File::open(path).map_err(|source| ThreatError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(FeedLines {
        path: path.to_path_buf(),
        lines: BufReader::new(file).lines(),
        line_no: 0,
    })
}

/// Read every line of `path` into memory.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    feed_lines(path)?
        .map(|line| line.map(|(_, l)| l))
        .collect()
}

/// Write one line per item to `path`, replacing any existing file.
pub fn write_lines<I, S>(path: &Path, lines: I) -> Result<usize>
where
    I: IntoIterator<Item = S>,
    S: std::fmt::Display,
{
    let to_write_err = |source| ThreatError::FileWrite {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(to_write_err)?;
    let mut writer = BufWriter::new(file);
    let mut written = 0usize;
    for line in lines {
        writeln!(writer, "{}", line).map_err(to_write_err)?;
        written += 1;
    }
    writer.flush().map_err(to_write_err)?;
    Ok(written)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_feed_lines_numbers_from_one() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("feed.txt");
        std::fs::write(&path, "a\n\nb\n").unwrap();

        let lines: Vec<(usize, String)> = feed_lines(&path)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(
            lines,
            vec![
                (1, "a".to_string()),
                (2, String::new()),
                (3, "b".to_string())
            ]
        );
    }

    #[test]
    fn test_feed_lines_missing_file() {
        let err = feed_lines(Path::new("/tmp/does-not-exist-threat-feed-xyz.txt"))
            .err()
            .unwrap();
        assert!(matches!(err, ThreatError::FileRead { .. }));
    }

    #[test]
    fn test_read_lines_handles_crlf() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("feed.txt");
        std::fs::write(&path, "x,y\r\nz\r\n").unwrap();

        let lines = read_lines(&path).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].trim(), "x,y");
    }

    #[test]
    fn test_write_lines_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "stale\n").unwrap();

        let n = write_lines(&path, ["one", "two"]).unwrap();
        assert_eq!(n, 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_write_lines_missing_dir() {
        let err = write_lines(Path::new("/tmp/no-such-dir-threat-xyz/out.txt"), ["x"]).unwrap_err();
        assert!(matches!(err, ThreatError::FileWrite { .. }));
    }
}

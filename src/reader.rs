use crate::error::ReadError;
use crate::types::GameRecord;
use crate::visitor::GameVisitor;

use pgn_reader::Reader;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use zstd::stream::read::Decoder as ZstdDecoder;

pub type PgnInput = Box<dyn Read + Send>;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Compression {
    #[default]
    Plain,
    Zstd,
}

impl Compression {
    pub fn parse(raw: &str) -> Result<Self, ReadError> {
        let normalized = raw.trim();
        if normalized.eq_ignore_ascii_case("zstd") {
            Ok(Self::Zstd)
        } else {
            Err(ReadError::Compression(normalized.to_string()))
        }
    }

    /// Explicit choice wins; otherwise a `.zst` extension selects zstd.
    pub fn for_path(path: &Path, requested: Option<Self>) -> Self {
        requested.unwrap_or_else(|| {
            let is_zst = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("zst"));
            if is_zst { Self::Zstd } else { Self::Plain }
        })
    }
}

/// Expand a path or glob pattern into the files to read, in sorted order.
pub fn resolve_paths(pattern: &str) -> Result<Vec<PathBuf>, ReadError> {
    if !pattern.contains(['*', '?', '[']) {
        return Ok(vec![PathBuf::from(pattern)]);
    }

    let entries = glob::glob(pattern).map_err(|source| ReadError::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;
    let mut paths: Vec<PathBuf> = entries.filter_map(Result::ok).collect();
    if paths.is_empty() {
        return Err(ReadError::NoInputs(pattern.to_string()));
    }
    paths.sort();
    Ok(paths)
}

pub fn open_input(path: &Path, compression: Compression) -> Result<PgnInput, ReadError> {
    let file = File::open(path).map_err(|source| ReadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    match compression {
        Compression::Plain => Ok(Box::new(file)),
        Compression::Zstd => ZstdDecoder::new(file)
            .map(|decoder| Box::new(decoder) as PgnInput)
            .map_err(|source| ReadError::Zstd {
                path: path.to_path_buf(),
                source,
            }),
    }
}

/// One game together with where it came from.
#[derive(Debug, Clone)]
pub struct SourcedGame {
    pub source: PathBuf,
    /// 1-based position of the game within its file.
    pub game_index: usize,
    pub record: GameRecord,
}

struct FileReader {
    pgn_reader: Reader<PgnInput>,
    path_idx: usize,
    next_game_index: usize,
    visitor: GameVisitor,
}

impl FileReader {
    fn new(input: PgnInput, path_idx: usize) -> Self {
        Self {
            pgn_reader: Reader::new(input),
            path_idx,
            next_game_index: 1,
            visitor: GameVisitor::new(),
        }
    }
}

enum NextGame {
    Ready(usize, GameRecord),
    /// The record is usable but the stream cannot be trusted any further.
    Last(usize, GameRecord),
    Finished,
}

/// Streams every game from a list of PGN files, file after file.
pub struct PgnGames {
    paths: Vec<PathBuf>,
    compression: Option<Compression>,
    next_path_idx: usize,
    current: Option<FileReader>,
}

impl PgnGames {
    /// Resolve `pattern` and prepare to read the matching files.
    ///
    /// With `compression` unset, each file is decoded according to its
    /// extension.
    pub fn open(pattern: &str, compression: Option<Compression>) -> Result<Self, ReadError> {
        Self::from_paths(resolve_paths(pattern)?, compression)
    }

    /// A single input is opened eagerly so an unreadable file is an error;
    /// among several inputs, unreadable files are logged and skipped.
    pub fn from_paths(
        paths: Vec<PathBuf>,
        compression: Option<Compression>,
    ) -> Result<Self, ReadError> {
        let mut games = Self {
            paths,
            compression,
            next_path_idx: 0,
            current: None,
        };

        if let [path] = games.paths.as_slice() {
            let input = open_input(path, Compression::for_path(path, compression))?;
            games.current = Some(FileReader::new(input, 0));
            games.next_path_idx = 1;
        }
        Ok(games)
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    fn acquire_reader(&mut self) -> Option<FileReader> {
        while self.next_path_idx < self.paths.len() {
            let path_idx = self.next_path_idx;
            self.next_path_idx += 1;

            let path = &self.paths[path_idx];
            match open_input(path, Compression::for_path(path, self.compression)) {
                Ok(input) => {
                    debug!(path = %path.display(), "reading PGN file");
                    return Some(FileReader::new(input, path_idx));
                }
                Err(err) => warn!("{err}"),
            }
        }
        None
    }
}

fn read_next_game(reader: &mut FileReader, source_path: &Path) -> NextGame {
    let game_index = reader.next_game_index;

    match reader.pgn_reader.read_game(&mut reader.visitor) {
        Ok(Some(())) => {
            reader.next_game_index += 1;
            match reader.visitor.current_game.take() {
                Some(record) => NextGame::Ready(game_index, record),
                None => NextGame::Finished,
            }
        }
        Ok(None) => NextGame::Finished,
        Err(error) => {
            reader.next_game_index += 1;
            let error_msg = format!(
                "Parser-stage error: stage=read_game; file='{}'; game_index={}; error={}",
                source_path.display(),
                game_index,
                error
            );
            warn!("{error_msg}");
            reader.visitor.finalize_game_with_error(error_msg);

            let Some(record) = reader.visitor.current_game.take() else {
                return NextGame::Finished;
            };
            if error.kind() == io::ErrorKind::InvalidData {
                NextGame::Ready(game_index, record)
            } else {
                NextGame::Last(game_index, record)
            }
        }
    }
}

impl Iterator for PgnGames {
    type Item = SourcedGame;

    fn next(&mut self) -> Option<SourcedGame> {
        loop {
            let mut reader = match self.current.take() {
                Some(reader) => reader,
                None => self.acquire_reader()?,
            };
            let source = self.paths[reader.path_idx].clone();

            let (game_index, record) = match read_next_game(&mut reader, &source) {
                NextGame::Ready(index, record) => {
                    self.current = Some(reader);
                    (index, record)
                }
                NextGame::Last(index, record) => (index, record),
                NextGame::Finished => continue,
            };

            return Some(SourcedGame {
                source,
                game_index,
                record,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    const TWO_GAMES: &str = r#"[Event "Rated Blitz game"]
[Site "https://lichess.org/abc"]
[White "alice"]
[Black "bob"]
[Result "1-0"]

1. e4 { [%eval 0.17] [%clk 0:03:00] } 1... e5 { [%eval 0.2] [%clk 0:03:00] } 1-0

[Event "Rated Blitz game"]
[Site "https://lichess.org/def"]
[White "carol"]
[Black "dave"]
[Result "0-1"]

1. d4 { [%clk 0:05:00] } 1... d5 { [%clk 0:05:00] } 2. c4 0-1
"#;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("chess-tilt-{}-{}", std::process::id(), name))
    }

    fn write_plain(name: &str, contents: &str) -> PathBuf {
        let path = temp_path(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn write_zstd(name: &str, contents: &str) -> PathBuf {
        let path = temp_path(name);
        let file = File::create(&path).unwrap();
        let mut encoder = zstd::stream::write::Encoder::new(file, 0).unwrap();
        encoder.write_all(contents.as_bytes()).unwrap();
        encoder.finish().unwrap();
        path
    }

    #[test]
    fn test_parse_compression_case_insensitive() {
        assert_eq!(Compression::parse("zstd").unwrap(), Compression::Zstd);
        assert_eq!(Compression::parse(" ZsTd ").unwrap(), Compression::Zstd);
    }

    #[test]
    fn test_parse_compression_rejects_other_values() {
        let err = Compression::parse("gzip").unwrap_err().to_string();
        assert!(err.contains("'gzip'"));
        assert!(Compression::parse("").is_err());
    }

    #[test]
    fn test_compression_from_extension() {
        assert_eq!(
            Compression::for_path(Path::new("games.pgn.zst"), None),
            Compression::Zstd
        );
        assert_eq!(
            Compression::for_path(Path::new("games.pgn"), None),
            Compression::Plain
        );
        assert_eq!(
            Compression::for_path(Path::new("games.pgn"), Some(Compression::Zstd)),
            Compression::Zstd
        );
    }

    #[test]
    fn test_plain_path_is_not_globbed() {
        let paths = resolve_paths("/no/such/dir/games.pgn").unwrap();
        assert_eq!(paths, vec![PathBuf::from("/no/such/dir/games.pgn")]);
    }

    #[test]
    fn test_glob_without_matches_is_an_error() {
        let err = resolve_paths("/no/such/dir/*.pgn").unwrap_err();
        assert!(matches!(err, ReadError::NoInputs(_)));
    }

    #[test]
    fn test_missing_single_file_is_an_error() {
        let err = PgnGames::open("/no/such/dir/games.pgn", None).err().unwrap();
        assert!(matches!(err, ReadError::Open { .. }));
    }

    #[test]
    fn test_reads_all_games_in_order() {
        let path = write_plain("order.pgn", TWO_GAMES);
        let games: Vec<SourcedGame> = PgnGames::open(path.to_str().unwrap(), None)
            .unwrap()
            .collect();
        fs::remove_file(&path).unwrap();

        assert_eq!(games.len(), 2);
        assert_eq!(games[0].game_index, 1);
        assert_eq!(games[1].game_index, 2);
        assert_eq!(games[0].source, path);

        let first = &games[0].record.game;
        assert_eq!(first.headers().white.as_deref(), Some("alice"));
        assert_eq!(first.len(), 2);
        let e4 = first.node(0).unwrap();
        assert_eq!(e4.comment(), Some("[%eval 0.17] [%clk 0:03:00]"));
        assert!(games[0].record.parse_error.is_none());

        assert_eq!(games[1].record.game.headers().site.as_deref(), Some("https://lichess.org/def"));
        assert_eq!(games[1].record.game.len(), 3);
    }

    #[test]
    fn test_reads_zstd_by_extension() {
        let path = write_zstd("compressed.pgn.zst", TWO_GAMES);
        let games: Vec<SourcedGame> = PgnGames::open(path.to_str().unwrap(), None)
            .unwrap()
            .collect();
        fs::remove_file(&path).unwrap();

        assert_eq!(games.len(), 2);
        assert_eq!(games[1].record.game.headers().black.as_deref(), Some("dave"));
    }

    #[test]
    fn test_unreadable_file_among_several_is_skipped() {
        let good = write_plain("skip-good.pgn", TWO_GAMES);
        let missing = temp_path("skip-missing.pgn");
        let games: Vec<SourcedGame> =
            PgnGames::from_paths(vec![missing, good.clone()], None)
                .unwrap()
                .collect();
        fs::remove_file(&good).unwrap();

        assert_eq!(games.len(), 2);
        assert!(games.iter().all(|g| g.source == good));
    }

    #[test]
    fn test_glob_reads_every_match() {
        let dir = temp_path("glob-dir");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("a.pgn"), TWO_GAMES).unwrap();
        fs::write(dir.join("b.pgn"), TWO_GAMES).unwrap();

        let pattern = format!("{}/*.pgn", dir.display());
        let games = PgnGames::open(&pattern, None).unwrap();
        assert_eq!(games.paths().len(), 2);
        let sources: Vec<PathBuf> = games.map(|g| g.source).collect();
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(sources.len(), 4);
        assert!(sources[0].ends_with("a.pgn"));
        assert!(sources[3].ends_with("b.pgn"));
    }
}

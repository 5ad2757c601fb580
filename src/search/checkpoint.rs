//! Periodic progress dumps for long searches.
//!
//! A checkpoint file is a move-list record preceded by comment lines:
//!
//! ```text
//! # seen_states: 40000
//! # depth: 17
//! car,move
//! A,1
//! ...
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::mover::Move;
use crate::record::write_moves;

/// Where a search stands when a checkpoint is taken.
#[derive(Clone, Copy, Debug)]
pub struct Progress<'a> {
    pub seen_states: usize,
    pub depth: usize,
    /// Move list of the state that triggered the checkpoint.
    pub moves: &'a [Move],
}

/// Receives progress from a running search. Failures are logged by the
/// search and do not stop it.
pub trait Checkpoint {
    fn save(&mut self, progress: &Progress<'_>) -> io::Result<()>;
}

impl<F> Checkpoint for F
where
    F: FnMut(&Progress<'_>) -> io::Result<()>,
{
    fn save(&mut self, progress: &Progress<'_>) -> io::Result<()> {
        self(progress)
    }
}

/// Overwrites a single file with the latest progress.
#[derive(Clone, Debug)]
pub struct FileCheckpoint {
    path: PathBuf,
    saved: usize,
}

impl FileCheckpoint {
    pub fn new(path: impl Into<PathBuf>) -> FileCheckpoint {
        FileCheckpoint {
            path: path.into(),
            saved: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of checkpoints written so far.
    pub fn saved(&self) -> usize {
        self.saved
    }
}

impl Checkpoint for FileCheckpoint {
    fn save(&mut self, progress: &Progress<'_>) -> io::Result<()> {
        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "# seen_states: {}", progress.seen_states)?;
        writeln!(writer, "# depth: {}", progress.depth)?;
        writer.write_all(write_moves(progress.moves).as_bytes())?;
        writer.flush()?;

        self.saved += 1;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::record::parse_moves;

    #[test]
    fn file_checkpoint_is_a_readable_move_list() {
        let path = std::env::temp_dir()
            .join(format!("rush-hour-checkpoint-{}.csv", std::process::id()));
        let mut checkpoint = FileCheckpoint::new(&path);

        let moves = [Move::new("A", 1), Move::new("X", -2)];
        checkpoint
            .save(&Progress {
                seen_states: 12,
                depth: 2,
                moves: &moves,
            })
            .unwrap();

        let text = std::fs::read_to_string(checkpoint.path()).unwrap();
        assert!(text.starts_with("# seen_states: 12\n# depth: 2\n"));
        assert_eq!(parse_moves(&text).unwrap(), moves);
        assert_eq!(checkpoint.saved(), 1);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn closures_are_checkpoints() {
        let mut depths = Vec::new();
        let mut sink = |progress: &Progress<'_>| -> io::Result<()> {
            depths.push(progress.depth);
            Ok(())
        };

        sink.save(&Progress {
            seen_states: 1,
            depth: 3,
            moves: &[],
        })
        .unwrap();
        assert_eq!(depths, vec![3]);
    }
}

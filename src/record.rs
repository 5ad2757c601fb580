//! Text records exchanged with the outside world: board layouts and move
//! lists.
//!
//! Layouts are CSV with a `car,orientation,col,row,length` header and
//! 1-indexed coordinates. Move lists are CSV with a `car,move` header.
//! For fixtures there is also a plain grid format:
//!
//! ```text
//! ..AA..
//! ...B..
//! XX.B..
//! ```
//!
//! where `.` is free space and every letter run is one vehicle.

use std::path::Path;

use itertools::Itertools;

use crate::error::{Error, RecordError};
use crate::mover::Move;
use crate::vehicle::{Orientation, VehicleData};

const LAYOUT_HEADER: &str = "car,orientation,col,row,length";
const MOVES_HEADER: &str = "car,move";

fn malformed(line: usize, message: impl Into<String>) -> RecordError {
    RecordError::Malformed {
        line,
        message: message.into(),
    }
}

/// Splits a CSV line, trimming the whitespace around every field.
fn fields(line: &str) -> Vec<&str> {
    line.split(',').map(str::trim).collect()
}

/// Non-empty lines that are not `#` comments, numbered from 1.
fn data_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(ix, line)| (ix + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn parse_number<T: std::str::FromStr>(
    line: usize,
    what: &str,
    value: &str,
) -> Result<T, RecordError> {
    value
        .parse()
        .map_err(|_| malformed(line, format!("{} '{}' is not a number", what, value)))
}

/// A 1-indexed coordinate, converted to 0-indexed.
fn parse_coordinate(line: usize, what: &str, value: &str) -> Result<i32, RecordError> {
    parse_number::<i32>(line, what, value)?
        .checked_sub(1)
        .ok_or_else(|| malformed(line, format!("{} '{}' is out of range", what, value)))
}

/// Reads a layout. Coordinates in the text are 1-indexed and converted to
/// 0-indexed; names are upper-cased.
pub fn parse_layout(text: &str) -> Result<Vec<VehicleData>, RecordError> {
    let mut lines = data_lines(text);

    match lines.next() {
        Some((_, header)) if fields(header).join(",").eq_ignore_ascii_case(LAYOUT_HEADER) => {}
        _ => return Err(RecordError::MissingHeader(LAYOUT_HEADER)),
    }

    lines
        .map(|(line, row)| {
            let fields = fields(row);
            let [name, orientation, col, row, length] = fields[..] else {
                return Err(malformed(line, format!("expected 5 fields, found {}", fields.len())));
            };

            let orientation = orientation
                .parse::<Orientation>()
                .map_err(|message| malformed(line, message))?;

            Ok(VehicleData::new(
                name.to_uppercase(),
                orientation,
                parse_coordinate(line, "col", col)?,
                parse_coordinate(line, "row", row)?,
                parse_number(line, "length", length)?,
            ))
        })
        .collect()
}

/// Reads a square grid of `.` and vehicle letters into a board size and a
/// layout, vehicles ordered by first appearance.
pub fn parse_grid(text: &str) -> Result<(usize, Vec<VehicleData>), RecordError> {
    let rows: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let size = rows.len();

    let mut vehicles: Vec<(char, Vec<(i32, i32)>)> = Vec::new();
    for (row, line) in rows.iter().enumerate() {
        let found = line.chars().count();
        if found != size {
            return Err(RecordError::NotSquare {
                row,
                found,
                expected: size,
            });
        }

        for (col, c) in line.chars().enumerate() {
            if c == '.' {
                continue;
            }

            let cell = (col as i32, row as i32);
            match vehicles.iter_mut().find(|(name, _)| *name == c) {
                Some((_, cells)) => cells.push(cell),
                None => vehicles.push((c, vec![cell])),
            }
        }
    }

    let layout = vehicles
        .into_iter()
        .map(|(name, cells)| {
            let (col, row) = cells[0];
            let straight = |dc: i32, dr: i32| {
                cells
                    .iter()
                    .tuple_windows()
                    .all(|(a, b)| b.0 - a.0 == dc && b.1 - a.1 == dr)
            };

            let orientation = if cells.len() < 2 {
                return Err(RecordError::BrokenVehicle(name));
            } else if straight(1, 0) {
                Orientation::Horizontal
            } else if straight(0, 1) {
                Orientation::Vertical
            } else {
                return Err(RecordError::BrokenVehicle(name));
            };

            Ok(VehicleData::new(name.to_string(), orientation, col, row, cells.len()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok((size, layout))
}

/// Board size from a file named like `Rushhour6x6_1.csv`.
pub fn board_size_from_file_name(path: impl AsRef<Path>) -> Option<usize> {
    let name = path.as_ref().file_name()?.to_str()?;
    let dims = name.split('_').next()?.to_lowercase();
    dims.split('x').nth(1)?.parse().ok()
}

/// Loads a layout file, taking the board size from its name.
pub fn read_layout(path: impl AsRef<Path>) -> Result<(usize, Vec<VehicleData>), Error> {
    let path = path.as_ref();
    let Some(size) = board_size_from_file_name(path) else {
        let message = format!("no board size in file name '{}'", path.display());
        return Err(malformed(0, message).into());
    };

    let text = std::fs::read_to_string(path)?;
    Ok((size, parse_layout(&text)?))
}

/// Renders a move list with a `car,move` header.
pub fn write_moves(moves: &[Move]) -> String {
    let mut out = String::from(MOVES_HEADER);
    out.push('\n');
    for mv in moves {
        out.push_str(&format!("{},{}\n", mv.vehicle, mv.steps));
    }
    out
}

/// Reads a move list written by [`write_moves`]. `#` comment lines are
/// skipped.
pub fn parse_moves(text: &str) -> Result<Vec<Move>, RecordError> {
    let mut lines = data_lines(text);

    match lines.next() {
        Some((_, header)) if fields(header).join(",").eq_ignore_ascii_case(MOVES_HEADER) => {}
        _ => return Err(RecordError::MissingHeader(MOVES_HEADER)),
    }

    lines
        .map(|(line, row)| {
            let fields = fields(row);
            let [name, steps] = fields[..] else {
                return Err(malformed(line, format!("expected 2 fields, found {}", fields.len())));
            };
            Ok(Move::new(name, parse_number(line, "move", steps)?))
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    const LAYOUT: &str = "car,orientation,col,row,length
A, H, 2, 1, 2
b, V, 4, 1, 3
X, H, 1, 3, 2
";

    #[test]
    fn layout_is_zero_indexed() {
        let layout = parse_layout(LAYOUT).unwrap();
        assert_eq!(
            layout,
            vec![
                VehicleData::new("A", Orientation::Horizontal, 1, 0, 2),
                VehicleData::new("B", Orientation::Vertical, 3, 0, 3),
                VehicleData::new("X", Orientation::Horizontal, 0, 2, 2),
            ]
        );
    }

    #[test]
    fn layout_errors() {
        assert_eq!(
            parse_layout("A,H,1,1,2\n"),
            Err(RecordError::MissingHeader(LAYOUT_HEADER))
        );
        assert_eq!(
            parse_layout("car,orientation,col,row,length\nA,H,1,1\n"),
            Err(malformed(2, "expected 5 fields, found 4"))
        );
        assert_eq!(
            parse_layout("car,orientation,col,row,length\nA,D,1,1,2\n"),
            Err(malformed(2, "unknown orientation 'D'"))
        );
        assert_eq!(
            parse_layout("car,orientation,col,row,length\nA,H,one,1,2\n"),
            Err(malformed(2, "col 'one' is not a number"))
        );
        assert_eq!(
            parse_layout("car,orientation,col,row,length\nA,H,-2147483648,1,2\n"),
            Err(malformed(2, "col '-2147483648' is out of range"))
        );
        assert_eq!(
            parse_layout("car,orientation,col,row,length\nA,V,1,-2147483648,2\n"),
            Err(malformed(2, "row '-2147483648' is out of range"))
        );
    }

    #[test]
    fn grid_matches_layout() {
        let (size, layout) = parse_grid(
            "
            .AAB..
            ...B..
            XX.B..
            ......
            ......
            ......
            ",
        )
        .unwrap();

        assert_eq!(size, 6);
        assert_eq!(layout, parse_layout(LAYOUT).unwrap());
    }

    #[test]
    fn grid_errors() {
        assert_eq!(
            parse_grid("...\n..\n...\n"),
            Err(RecordError::NotSquare {
                row: 1,
                found: 2,
                expected: 3
            })
        );
        for grid in ["A..\n...\n..A\n", "A..\n...\n...\n", "AA.\n.A.\n...\n"] {
            assert_eq!(parse_grid(grid), Err(RecordError::BrokenVehicle('A')));
        }
    }

    #[test]
    fn size_from_file_name() {
        assert_eq!(board_size_from_file_name("Rushhour6x6_1.csv"), Some(6));
        assert_eq!(
            board_size_from_file_name("data/RushHour12x12_7.csv"),
            Some(12)
        );
        assert_eq!(board_size_from_file_name("board.csv"), None);
    }

    #[test]
    fn move_lists() {
        let moves = vec![Move::new("A", 1), Move::new("X", -3)];
        let text = write_moves(&moves);
        assert_eq!(text, "car,move\nA,1\nX,-3\n");
        assert_eq!(parse_moves(&text).unwrap(), moves);

        assert_eq!(
            parse_moves("A,1\n"),
            Err(RecordError::MissingHeader(MOVES_HEADER))
        );
        assert_eq!(
            parse_moves("car,move\nA,up\n"),
            Err(malformed(2, "move 'up' is not a number"))
        );
    }
}

//! Rectangular grid of tiles with wall queries and laser tracing.

use std::collections::BTreeMap;

use factory_floor_core::{CellCoord, Direction};

use crate::{
    error::BoardError,
    tile::{FloorDevice, Tile, WallDevice, Walls},
};

/// Outcome of checking a single step from one cell toward a direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveTarget {
    /// Destination cell, or `None` when the step leaves the board.
    pub target: Option<CellCoord>,
    /// Whether the step may be committed.
    pub allowed: bool,
    /// Whether a wall on either side of the shared edge stopped the step.
    pub blocked_by_wall: bool,
}

/// Immutable factory floor built once per game.
#[derive(Clone, Debug)]
pub struct Board {
    columns: u32,
    rows: u32,
    tiles: Vec<Tile>,
    flags: Vec<CellCoord>,
    total_checkpoints: u32,
}

impl Board {
    /// Assembles a board from rows of tiles.
    ///
    /// Every row must have the same length, every tile must sit at the cell it
    /// declares, and checkpoint orders must form the sequence `1..=n`.
    pub fn from_rows(rows: Vec<Vec<Tile>>) -> Result<Self, BoardError> {
        let expected = rows.first().map_or(0, Vec::len);
        if expected == 0 {
            return Err(BoardError::Empty);
        }

        let row_count = rows.len();
        let mut tiles = Vec::with_capacity(expected * row_count);
        for (row_index, row) in rows.into_iter().enumerate() {
            if row.len() != expected {
                return Err(BoardError::RaggedRow {
                    row: to_u32(row_index),
                    expected: to_u32(expected),
                    found: to_u32(row.len()),
                });
            }
            for (column_index, tile) in row.into_iter().enumerate() {
                let placed = CellCoord::new(to_u32(column_index), to_u32(row_index));
                if tile.cell() != placed {
                    return Err(BoardError::MisplacedTile {
                        declared: tile.cell(),
                        placed,
                    });
                }
                tiles.push(tile);
            }
        }

        let (flags, total_checkpoints) = index_flags(&tiles)?;

        Ok(Self {
            columns: to_u32(expected),
            rows: to_u32(row_count),
            tiles,
            flags,
            total_checkpoints,
        })
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the cell lies on the board.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Tile at the provided cell, or `None` when the cell is off the board.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<&Tile> {
        self.index(cell).and_then(|index| self.tiles.get(index))
    }

    /// Iterates every tile in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Reports whether the tile at `cell` has a wall on `side`.
    ///
    /// Cells off the board have no walls.
    #[must_use]
    pub fn has_wall(&self, cell: CellCoord, side: Direction) -> bool {
        self.tile(cell).is_some_and(|tile| tile.has_wall(side))
    }

    /// Adjacent on-board cell in the provided direction.
    #[must_use]
    pub fn neighbor(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        cell.neighbor(direction, self.columns, self.rows)
    }

    /// Checks a single step from `from` toward `direction`.
    ///
    /// The board edge is checked first, then the wall on the exit side of
    /// `from` and the wall on the entry side of the destination; either wall
    /// blocks the step.
    #[must_use]
    pub fn step_target(&self, from: CellCoord, direction: Direction) -> MoveTarget {
        let Some(target) = self.neighbor(from, direction) else {
            return MoveTarget {
                target: None,
                allowed: false,
                blocked_by_wall: false,
            };
        };

        let blocked_by_wall =
            self.has_wall(from, direction) || self.has_wall(target, direction.opposite());

        MoveTarget {
            target: Some(target),
            allowed: !blocked_by_wall,
            blocked_by_wall,
        }
    }

    /// Traces the cells a laser beam crosses when fired from `origin`.
    ///
    /// The emitter's own cell is never part of the path. For each candidate
    /// cell, in priority order: the beam stops at the board edge; it stops on
    /// the robot's cell, including it; it stops before leaving a cell other
    /// than the origin through a wall; and it stops on a cell whose wall faces
    /// the incoming beam, including that cell.
    #[must_use]
    pub fn trace_laser_path(
        &self,
        origin: CellCoord,
        direction: Direction,
        robot: Option<CellCoord>,
    ) -> Vec<CellCoord> {
        let mut path = Vec::new();
        let mut current = origin;

        loop {
            let Some(next) = self.neighbor(current, direction) else {
                break;
            };

            if robot == Some(next) {
                path.push(next);
                break;
            }

            if current != origin && self.has_wall(current, direction) {
                break;
            }

            path.push(next);
            if self.has_wall(next, direction.opposite()) {
                break;
            }

            current = next;
        }

        path
    }

    /// Iterates every mounted laser as `(emitter cell, beam direction)` in
    /// row-major order.
    pub fn laser_emitters(&self) -> impl Iterator<Item = (CellCoord, Direction)> + '_ {
        self.tiles
            .iter()
            .flat_map(|tile| tile.lasers().map(move |direction| (tile.cell(), direction)))
    }

    /// Goal cells: checkpoints by ascending order, then repair stations in
    /// row-major order.
    #[must_use]
    pub fn flags(&self) -> &[CellCoord] {
        &self.flags
    }

    /// Number of checkpoints that must be visited to win.
    #[must_use]
    pub const fn total_checkpoints(&self) -> u32 {
        self.total_checkpoints
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }
}

/// Incremental, programmatic construction of a [`Board`].
///
/// Devices are validated when [`BoardBuilder::build`] assembles the tiles.
#[derive(Clone, Debug)]
pub struct BoardBuilder {
    columns: u32,
    rows: u32,
    drafts: Vec<TileDraft>,
}

#[derive(Clone, Debug, Default)]
struct TileDraft {
    walls: Walls,
    floor: FloorDevice,
    wall_devices: Vec<WallDevice>,
}

impl BoardBuilder {
    /// Starts a board of plain floor tiles.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        let count = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            columns,
            rows,
            drafts: vec![TileDraft::default(); count],
        }
    }

    /// Adds a wall on `side` of the tile at `cell`.
    #[must_use]
    pub fn wall(mut self, cell: CellCoord, side: Direction) -> Self {
        if let Some(draft) = self.draft_mut(cell) {
            draft.walls = draft.walls.with(side);
        }
        self
    }

    /// Replaces the floor device of the tile at `cell`.
    #[must_use]
    pub fn floor(mut self, cell: CellCoord, floor: FloorDevice) -> Self {
        if let Some(draft) = self.draft_mut(cell) {
            draft.floor = floor;
        }
        self
    }

    /// Mounts a wall device on the tile at `cell`.
    #[must_use]
    pub fn wall_device(mut self, cell: CellCoord, device: WallDevice) -> Self {
        if let Some(draft) = self.draft_mut(cell) {
            draft.wall_devices.push(device);
        }
        self
    }

    /// Validates every tile and assembles the board.
    pub fn build(self) -> Result<Board, BoardError> {
        let columns = usize::try_from(self.columns).unwrap_or(0);
        if columns == 0 || self.rows == 0 {
            return Err(BoardError::Empty);
        }

        let mut rows: Vec<Vec<Tile>> = Vec::new();
        for (index, draft) in self.drafts.into_iter().enumerate() {
            let cell = CellCoord::new(to_u32(index % columns), to_u32(index / columns));
            let tile = Tile::new(cell, draft.walls, draft.floor, draft.wall_devices)
                .map_err(|source| BoardError::Tile { cell, source })?;
            if index % columns == 0 {
                rows.push(Vec::with_capacity(columns));
            }
            if let Some(row) = rows.last_mut() {
                row.push(tile);
            }
        }

        Board::from_rows(rows)
    }

    fn draft_mut(&mut self, cell: CellCoord) -> Option<&mut TileDraft> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        let index = usize::try_from(u64::from(cell.row()) * u64::from(self.columns)
            + u64::from(cell.column()))
        .ok()?;
        self.drafts.get_mut(index)
    }
}

fn index_flags(tiles: &[Tile]) -> Result<(Vec<CellCoord>, u32), BoardError> {
    let mut checkpoints: BTreeMap<u32, CellCoord> = BTreeMap::new();
    let mut stations = Vec::new();

    for tile in tiles {
        match tile.floor() {
            FloorDevice::Checkpoint { order } => {
                if let Some(first) = checkpoints.insert(order, tile.cell()) {
                    return Err(BoardError::DuplicateCheckpoint {
                        order,
                        first,
                        second: tile.cell(),
                    });
                }
            }
            FloorDevice::RepairStation => stations.push(tile.cell()),
            _ => {}
        }
    }

    let total = to_u32(checkpoints.len());
    if let Some(missing) = (1..=total).find(|order| !checkpoints.contains_key(order)) {
        return Err(BoardError::CheckpointGap { missing });
    }

    let mut flags: Vec<CellCoord> = checkpoints.into_values().collect();
    flags.extend(stations);
    Ok((flags, total))
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::ConveyorSpeed;

    fn open_board(columns: u32, rows: u32) -> Board {
        BoardBuilder::new(columns, rows).build().expect("board")
    }

    #[test]
    fn has_wall_is_false_off_the_board() {
        let board = BoardBuilder::new(2, 2)
            .wall(CellCoord::new(1, 1), Direction::East)
            .build()
            .expect("board");

        assert!(board.has_wall(CellCoord::new(1, 1), Direction::East));
        assert!(!board.has_wall(CellCoord::new(1, 1), Direction::West));
        assert!(!board.has_wall(CellCoord::new(5, 5), Direction::East));
        assert!(board.tile(CellCoord::new(2, 0)).is_none());
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let rows = vec![
            vec![
                Tile::plain(CellCoord::new(0, 0)),
                Tile::plain(CellCoord::new(1, 0)),
            ],
            vec![Tile::plain(CellCoord::new(0, 1))],
        ];

        assert_eq!(
            Board::from_rows(rows).unwrap_err(),
            BoardError::RaggedRow {
                row: 1,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn empty_board_is_rejected() {
        assert_eq!(Board::from_rows(Vec::new()).unwrap_err(), BoardError::Empty);
        assert_eq!(
            BoardBuilder::new(0, 3).build().unwrap_err(),
            BoardError::Empty
        );
    }

    #[test]
    fn step_target_checks_both_sides_of_the_edge() {
        let board = BoardBuilder::new(3, 1)
            .wall(CellCoord::new(0, 0), Direction::East)
            .wall(CellCoord::new(2, 0), Direction::West)
            .build()
            .expect("board");

        let exit_blocked = board.step_target(CellCoord::new(0, 0), Direction::East);
        assert!(!exit_blocked.allowed);
        assert!(exit_blocked.blocked_by_wall);

        let entry_blocked = board.step_target(CellCoord::new(1, 0), Direction::East);
        assert!(!entry_blocked.allowed);
        assert!(entry_blocked.blocked_by_wall);

        let edge = board.step_target(CellCoord::new(2, 0), Direction::East);
        assert_eq!(
            edge,
            MoveTarget {
                target: None,
                allowed: false,
                blocked_by_wall: false
            }
        );
    }

    #[test]
    fn laser_runs_to_the_board_edge() {
        let board = open_board(4, 1);
        let path = board.trace_laser_path(CellCoord::new(0, 0), Direction::East, None);
        assert_eq!(
            path,
            vec![
                CellCoord::new(1, 0),
                CellCoord::new(2, 0),
                CellCoord::new(3, 0)
            ]
        );
    }

    #[test]
    fn laser_stops_on_the_robot() {
        let board = open_board(5, 1);
        let path = board.trace_laser_path(
            CellCoord::new(0, 0),
            Direction::East,
            Some(CellCoord::new(2, 0)),
        );
        assert_eq!(path, vec![CellCoord::new(1, 0), CellCoord::new(2, 0)]);
    }

    #[test]
    fn exit_wall_excludes_the_next_cell() {
        let board = BoardBuilder::new(5, 1)
            .wall(CellCoord::new(2, 0), Direction::East)
            .build()
            .expect("board");
        let path = board.trace_laser_path(CellCoord::new(0, 0), Direction::East, None);
        assert_eq!(path, vec![CellCoord::new(1, 0), CellCoord::new(2, 0)]);
    }

    #[test]
    fn robot_past_an_exit_wall_is_still_hit() {
        let board = BoardBuilder::new(5, 1)
            .wall(CellCoord::new(2, 0), Direction::East)
            .build()
            .expect("board");
        let path = board.trace_laser_path(
            CellCoord::new(0, 0),
            Direction::East,
            Some(CellCoord::new(3, 0)),
        );
        assert_eq!(
            path,
            vec![
                CellCoord::new(1, 0),
                CellCoord::new(2, 0),
                CellCoord::new(3, 0)
            ]
        );
    }

    #[test]
    fn robot_on_the_exit_wall_cell_is_hit() {
        let board = BoardBuilder::new(5, 1)
            .wall(CellCoord::new(2, 0), Direction::East)
            .build()
            .expect("board");
        let path = board.trace_laser_path(
            CellCoord::new(0, 0),
            Direction::East,
            Some(CellCoord::new(2, 0)),
        );
        assert_eq!(path, vec![CellCoord::new(1, 0), CellCoord::new(2, 0)]);
    }

    #[test]
    fn entry_wall_includes_the_blocking_cell() {
        let board = BoardBuilder::new(5, 1)
            .wall(CellCoord::new(3, 0), Direction::West)
            .build()
            .expect("board");
        let path = board.trace_laser_path(CellCoord::new(0, 0), Direction::East, None);
        assert_eq!(
            path,
            vec![
                CellCoord::new(1, 0),
                CellCoord::new(2, 0),
                CellCoord::new(3, 0)
            ]
        );
    }

    #[test]
    fn emitter_wall_on_firing_side_does_not_block_its_own_beam() {
        let board = BoardBuilder::new(3, 1)
            .wall(CellCoord::new(0, 0), Direction::East)
            .wall(CellCoord::new(0, 0), Direction::West)
            .build()
            .expect("board");
        let path = board.trace_laser_path(CellCoord::new(0, 0), Direction::East, None);
        assert_eq!(path, vec![CellCoord::new(1, 0), CellCoord::new(2, 0)]);
    }

    #[test]
    fn flags_are_ordered_checkpoints_then_stations() {
        let board = BoardBuilder::new(3, 2)
            .floor(CellCoord::new(0, 0), FloorDevice::RepairStation)
            .floor(CellCoord::new(1, 0), FloorDevice::Checkpoint { order: 2 })
            .floor(CellCoord::new(2, 1), FloorDevice::Checkpoint { order: 1 })
            .floor(
                CellCoord::new(0, 1),
                FloorDevice::Conveyor {
                    direction: Direction::North,
                    speed: ConveyorSpeed::Standard,
                },
            )
            .build()
            .expect("board");

        assert_eq!(
            board.flags(),
            &[
                CellCoord::new(2, 1),
                CellCoord::new(1, 0),
                CellCoord::new(0, 0)
            ]
        );
        assert_eq!(board.total_checkpoints(), 2);
    }

    #[test]
    fn checkpoint_sequence_must_be_contiguous() {
        let gap = BoardBuilder::new(2, 1)
            .floor(CellCoord::new(0, 0), FloorDevice::Checkpoint { order: 1 })
            .floor(CellCoord::new(1, 0), FloorDevice::Checkpoint { order: 3 })
            .build()
            .unwrap_err();
        assert_eq!(gap, BoardError::CheckpointGap { missing: 2 });

        let duplicate = BoardBuilder::new(2, 1)
            .floor(CellCoord::new(0, 0), FloorDevice::Checkpoint { order: 1 })
            .floor(CellCoord::new(1, 0), FloorDevice::Checkpoint { order: 1 })
            .build()
            .unwrap_err();
        assert_eq!(
            duplicate,
            BoardError::DuplicateCheckpoint {
                order: 1,
                first: CellCoord::new(0, 0),
                second: CellCoord::new(1, 0)
            }
        );
    }

    #[test]
    fn laser_emitters_are_listed_in_row_major_order() {
        let board = BoardBuilder::new(2, 2)
            .wall(CellCoord::new(1, 1), Direction::East)
            .wall_device(
                CellCoord::new(1, 1),
                WallDevice::Laser {
                    direction: Direction::West,
                },
            )
            .wall(CellCoord::new(0, 0), Direction::North)
            .wall_device(
                CellCoord::new(0, 0),
                WallDevice::Laser {
                    direction: Direction::South,
                },
            )
            .build()
            .expect("board");

        assert_eq!(
            board.laser_emitters().collect::<Vec<_>>(),
            vec![
                (CellCoord::new(0, 0), Direction::South),
                (CellCoord::new(1, 1), Direction::West)
            ]
        );
    }
}

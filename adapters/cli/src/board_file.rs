use std::{fs, path::Path};

use anyhow::{Context, Result};
use factory_floor_world::{Board, BoardDefinition, TileDefinition};

/// Factory floor used when no board file is supplied.
const DEFAULT_BOARD: &str = include_str!("../boards/factory.toml");

/// Loads the board at `path`, or the built-in factory floor when absent.
///
/// Files ending in `.json` are read as JSON; everything else as TOML.
pub(crate) fn load_board(path: Option<&Path>) -> Result<Board> {
    let Some(path) = path else {
        return parse_toml(DEFAULT_BOARD).context("built-in board is invalid");
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read board at {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));
    let board = if is_json {
        parse_json(&contents)
    } else {
        parse_toml(&contents)
    };
    board.with_context(|| format!("invalid board in {}", path.display()))
}

fn parse_toml(contents: &str) -> Result<Board> {
    let definition: BoardDefinition =
        toml::from_str(contents).context("failed to parse board toml contents")?;
    Ok(definition.build()?)
}

/// Reads a versioned definition object, or a bare grid of tile rows.
fn parse_json(contents: &str) -> Result<Board> {
    let definition = if contents.trim_start().starts_with('[') {
        let rows: Vec<Vec<TileDefinition>> =
            serde_json::from_str(contents).context("failed to parse board json grid")?;
        BoardDefinition::from_grid(rows)
    } else {
        serde_json::from_str(contents).context("failed to parse board json contents")?
    };
    Ok(definition.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use factory_floor_core::{CellCoord, Direction};
    use factory_floor_world::{ConveyorSpeed, FloorDevice};

    #[test]
    fn built_in_board_is_valid() {
        let board = load_board(None).expect("default board parses");
        assert_eq!((board.columns(), board.rows()), (8, 8));
        assert_eq!(board.total_checkpoints(), 3);
        assert_eq!(board.laser_emitters().count(), 2);
        assert_eq!(
            board.tile(CellCoord::new(4, 3)).map(|tile| tile.floor()),
            Some(FloorDevice::Hole)
        );
    }

    #[test]
    fn json_and_toml_describe_the_same_board() {
        let toml_board = parse_toml(
            r#"
            version = 1
            rows = [[{ floorDevice = { type = "checkpoint", order = 1 } }, { walls = ["west"] }]]
            "#,
        )
        .expect("toml board");
        let json_board = parse_json(
            r#"{
                "version": 1,
                "rows": [[{ "floorDevice": { "type": "checkpoint", "order": 1 } }, { "walls": ["west"] }]]
            }"#,
        )
        .expect("json board");

        assert!(toml_board.tiles().eq(json_board.tiles()));
    }

    #[test]
    fn bare_json_grid_loads_with_devices() {
        let board = parse_json(
            r#"[
                [
                    {
                        "walls": ["west"],
                        "floorDevice": { "type": "conveyor", "direction": "east", "speed": 2 },
                        "wallDevices": [{ "type": "laser", "direction": "east" }]
                    },
                    { "floorDevice": { "type": "checkpoint", "order": 1 } }
                ],
                [
                    { "walls": ["north"], "wallDevices": [{ "type": "pusher", "direction": "south", "steps": [2, 4] }] },
                    { "floorDevice": { "type": "gear", "direction": "ccw" } }
                ]
            ]"#,
        )
        .expect("bare grid");

        assert_eq!((board.columns(), board.rows()), (2, 2));
        assert_eq!(
            board.tile(CellCoord::new(0, 0)).map(|tile| tile.floor()),
            Some(FloorDevice::Conveyor {
                direction: Direction::East,
                speed: ConveyorSpeed::Express
            })
        );
        assert_eq!(board.laser_emitters().count(), 1);
        assert_eq!(board.total_checkpoints(), 1);
    }

    #[test]
    fn versioned_json_accepts_device_field_names() {
        let board = parse_json(
            r#"{
                "version": 1,
                "rows": [[
                    {
                        "walls": ["west"],
                        "floorDevice": { "type": "conveyor", "direction": "east", "speed": 2 },
                        "wallDevices": [{ "type": "laser", "direction": "east" }]
                    },
                    { "floorDevice": { "type": "repair-station" } }
                ]]
            }"#,
        )
        .expect("versioned board");

        assert_eq!(
            board.laser_emitters().collect::<Vec<_>>(),
            vec![(CellCoord::new(0, 0), Direction::East)]
        );
        assert_eq!(board.flags(), &[CellCoord::new(1, 0)]);
    }

    #[test]
    fn snake_case_device_fields_remain_accepted() {
        let legacy = parse_toml(
            r#"
            version = 1
            rows = [[{ walls = ["west"], floor = { type = "hole" }, wall_devices = [{ type = "laser", direction = "east" }] }]]
            "#,
        )
        .expect("legacy field names");

        assert_eq!(
            legacy.tile(CellCoord::new(0, 0)).map(|tile| tile.floor()),
            Some(FloorDevice::Hole)
        );
    }

    #[test]
    fn unsupported_version_is_reported() {
        let error = parse_toml("version = 2\nrows = [[{}]]").unwrap_err();
        assert!(
            format!("{error:#}").contains("version"),
            "unexpected error: {error:#}"
        );
    }

    #[test]
    fn unmounted_laser_rejects_the_board() {
        let result = parse_toml(
            r#"
            version = 1
            rows = [[{ wallDevices = [{ type = "laser", direction = "east" }] }]]
            "#,
        );
        assert!(result.is_err(), "laser without a supporting wall must fail");
    }
}

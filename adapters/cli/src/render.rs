use factory_floor_core::{Direction, Event, Rotation};
use factory_floor_world::{Board, ConveyorSpeed, FloorDevice, Robot, Tile};

/// Renders the board as text, two characters per tile, rows north to south.
///
/// The first character shows the floor device, the second a wall device or
/// an express belt. The robot replaces its tile with `R` and its facing.
pub(crate) fn render_board(board: &Board, robot: &Robot) -> String {
    let mut output = String::new();
    let mut tiles = board.tiles().peekable();

    for row in 0..board.rows() {
        while let Some(tile) = tiles.next_if(|tile| tile.cell().row() == row) {
            if tile.cell() == robot.cell() {
                output.push('R');
                output.push(arrow(robot.orientation()));
            } else {
                output.push(floor_glyph(tile));
                output.push(device_glyph(tile));
            }
        }
        output.push('\n');
    }

    output
}

/// Describes a notification on a single line.
pub(crate) fn describe_event(event: &Event) -> String {
    match event {
        Event::RobotMoved { cell, orientation } => {
            format!("robot moved to {cell} facing {orientation}")
        }
        Event::RobotTurned { cell, orientation } => {
            format!("robot turned to face {orientation} at {cell}")
        }
        Event::HealthChanged { health, max_health } => {
            format!("health {health}/{max_health}")
        }
        Event::LivesChanged { lives } => format!("lives remaining: {lives}"),
        Event::FlagVisited {
            flag,
            highest_order,
        } => format!("flag at {flag} visited, checkpoint progress {highest_order}"),
        Event::PowerStateChanged { powered_down } => {
            if *powered_down {
                "robot powered down".to_owned()
            } else {
                "robot powered up".to_owned()
            }
        }
        Event::GameOver { won } => {
            format!("game over: {}", if *won { "won" } else { "lost" })
        }
        Event::ProgramFinished => "program finished".to_owned(),
    }
}

/// Summarises the robot's vital statistics on one line.
pub(crate) fn describe_robot(robot: &Robot) -> String {
    let mut line = format!(
        "robot at {} facing {}, health {}/{}, lives {}, checkpoint {}",
        robot.cell(),
        robot.orientation(),
        robot.health(),
        robot.max_health(),
        robot.lives(),
        robot.highest_checkpoint(),
    );
    if robot.is_powered_down() {
        line.push_str(", powered down");
    }
    line
}

fn floor_glyph(tile: &Tile) -> char {
    match tile.floor() {
        FloorDevice::None => '.',
        FloorDevice::Hole => 'O',
        FloorDevice::RepairStation => '+',
        FloorDevice::Checkpoint { order } => char::from_digit(order, 10).unwrap_or('#'),
        FloorDevice::Conveyor { direction, .. } => arrow(direction),
        FloorDevice::Gear {
            rotation: Rotation::Clockwise,
        } => ')',
        FloorDevice::Gear {
            rotation: Rotation::CounterClockwise,
        } => '(',
    }
}

fn device_glyph(tile: &Tile) -> char {
    if let FloorDevice::Conveyor {
        direction,
        speed: ConveyorSpeed::Express,
    } = tile.floor()
    {
        return arrow(direction);
    }
    if tile.lasers().next().is_some() {
        return '*';
    }
    if tile.wall_devices().is_empty() {
        ' '
    } else {
        'p'
    }
}

const fn arrow(direction: Direction) -> char {
    match direction {
        Direction::North => '^',
        Direction::East => '>',
        Direction::South => 'v',
        Direction::West => '<',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use factory_floor_core::CellCoord;
    use factory_floor_world::{BoardBuilder, RobotConfig, WallDevice};

    #[test]
    fn renders_devices_and_robot() {
        let board = BoardBuilder::new(4, 2)
            .floor(
                CellCoord::new(0, 0),
                FloorDevice::Conveyor {
                    direction: Direction::East,
                    speed: ConveyorSpeed::Express,
                },
            )
            .floor(CellCoord::new(1, 0), FloorDevice::Checkpoint { order: 1 })
            .floor(CellCoord::new(2, 0), FloorDevice::Hole)
            .wall(CellCoord::new(3, 0), Direction::East)
            .wall_device(
                CellCoord::new(3, 0),
                WallDevice::Laser {
                    direction: Direction::West,
                },
            )
            .floor(CellCoord::new(0, 1), FloorDevice::RepairStation)
            .build()
            .expect("board");
        let robot = Robot::new(CellCoord::new(2, 1), Direction::West, RobotConfig::default());

        assert_eq!(render_board(&board, &robot), ">>1 O .*\n+ . R<. \n");
    }

    #[test]
    fn describes_game_over() {
        assert_eq!(
            describe_event(&Event::GameOver { won: true }),
            "game over: won"
        );
        assert_eq!(
            describe_event(&Event::HealthChanged {
                health: 2,
                max_health: 5
            }),
            "health 2/5"
        );
    }
}

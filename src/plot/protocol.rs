//! gnuplot command lines
//!
//! Everything sent to gnuplot is one line of text. [`Command`] renders a single
//! line through `Display`, without the trailing newline; the session appends it.

use std::fmt;

use crate::config::{Axis, AxisRange, PlotConfig};

/// Inline data file name gnuplot reads from its own stdin
pub const INLINE_DATA: &str = "'-'";

/// Terminates an inline data block
pub const END_OF_DATA: &str = "e";

/// A point in plot space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl From<(f64, f64, f64)> for Point3 {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Self { x, y, z }
    }
}

impl From<[f64; 3]> for Point3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

/// One gnuplot command line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `set xrange [low:high]`
    SetRange { axis: Axis, range: AxisRange },
    /// `set terminal <kind> size <width>,<height>`
    SetTerminal {
        kind: String,
        width: u32,
        height: u32,
    },
    /// Start an inline 3D scatter plot
    BeginScatter,
    /// One data line of the current block
    Point(Point3),
    /// `e`
    EndData,
}

impl Command {
    /// Axis ranges followed by the terminal setup
    pub fn unit_cube(config: &PlotConfig) -> Vec<Command> {
        let mut commands: Vec<Command> = Axis::ALL
            .iter()
            .map(|&axis| Command::SetRange {
                axis,
                range: config.range(axis),
            })
            .collect();
        commands.push(Command::SetTerminal {
            kind: config.terminal().to_string(),
            width: config.width(),
            height: config.height(),
        });
        commands
    }

    /// Header, one line per point, then the end-of-data marker
    pub fn scatter_block<I, P>(points: I) -> impl Iterator<Item = Command>
    where
        I: IntoIterator<Item = P>,
        P: Into<Point3>,
    {
        std::iter::once(Command::BeginScatter)
            .chain(points.into_iter().map(|p| Command::Point(p.into())))
            .chain(std::iter::once(Command::EndData))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::SetRange { axis, range } => {
                write!(f, "set {}range [{:?}:{:?}]", axis, range.low, range.high)
            }
            Command::SetTerminal {
                kind,
                width,
                height,
            } => write!(f, "set terminal {} size {},{}", kind, width, height),
            Command::BeginScatter => write!(
                f,
                "splot {} using 1:2:3 with points lt -1 ps 0.5 pt 7",
                INLINE_DATA
            ),
            Command::Point(p) => write!(f, "{:.6} {:.6} {:.6}", p.x, p.y, p.z),
            Command::EndData => f.write_str(END_OF_DATA),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlotOptions;

    fn lines(commands: impl IntoIterator<Item = Command>) -> Vec<String> {
        commands.into_iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_unit_cube_defaults() {
        let config = PlotConfig::for_platform("linux", PlotOptions::default()).unwrap();

        assert_eq!(
            lines(Command::unit_cube(&config)),
            vec![
                "set xrange [-1.0:1.0]",
                "set yrange [-1.0:1.0]",
                "set zrange [-1.0:1.0]",
                "set terminal wxt size 300,400",
            ]
        );
    }

    #[test]
    fn test_unit_cube_custom_ranges() {
        let options = PlotOptions::new()
            .terminal("qt")
            .size(640, 480)
            .range(Axis::Y, (0.0, 2.5))
            .range(Axis::Z, (-10.0, 1e20));
        let config = PlotConfig::for_platform("linux", options).unwrap();

        assert_eq!(
            lines(Command::unit_cube(&config)),
            vec![
                "set xrange [-1.0:1.0]",
                "set yrange [0.0:2.5]",
                "set zrange [-10.0:1e20]",
                "set terminal qt size 640,480",
            ]
        );
    }

    #[test]
    fn test_scatter_block() {
        let block = Command::scatter_block([(0.0, 0.0, 0.0), (1.0, -1.0, 0.5)]);

        assert_eq!(
            lines(block),
            vec![
                "splot '-' using 1:2:3 with points lt -1 ps 0.5 pt 7",
                "0.000000 0.000000 0.000000",
                "1.000000 -1.000000 0.500000",
                "e",
            ]
        );
    }

    #[test]
    fn test_empty_scatter_block() {
        let block = Command::scatter_block(Vec::<Point3>::new());

        assert_eq!(
            lines(block),
            vec!["splot '-' using 1:2:3 with points lt -1 ps 0.5 pt 7", "e"]
        );
    }

    #[test]
    fn test_point_formatting() {
        let point = Command::Point(Point3::from([0.1234567, -12.5, 3.0]));
        assert_eq!(point.to_string(), "0.123457 -12.500000 3.000000");
    }
}

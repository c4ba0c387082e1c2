use std::fmt;
use std::fs;
use std::path::Path;

use crate::simulation::field::Grid;
use crate::simulation::material::Material;

/// Errors produced while reading a room file.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("failed to read room file: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing or malformed dimension line (expected two positive integers)")]
    BadDimensions,
    #[error("obstacle row {row} is missing or shorter than {width} cells")]
    ShortObstacleRow { row: usize, width: usize },
    #[error("obstacle row {row} contains a character other than '0' or '1'")]
    BadObstacleChar { row: usize },
    #[error("material row {row} is missing or shorter than {width} cells")]
    ShortMaterialRow { row: usize, width: usize },
    #[error("material row {row} contains a non-digit character")]
    BadMaterialChar { row: usize },
}

/// An authored room: obstacle layout plus per-cell material ids, at its own
/// resolution. Loading into an engine rescales it onto the engine grid.
///
/// The persisted format is line-oriented text:
///
/// ```text
/// <width> <height>
/// <height rows of width '0'/'1' chars>   obstacle map
/// <height rows of width digit chars>     material map
/// ```
///
/// `Display` renders this format; [`RoomDefinition::parse`] reads it back.
/// Material digits 5-9 are syntactically valid and preserved verbatim; they
/// act as Air during stepping (see [`Material::from_id`]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomDefinition {
    width: usize,
    height: usize,
    obstacles: Grid<bool>,
    materials: Grid<u8>,
}

impl RoomDefinition {
    /// An empty room: no obstacles, all Air.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            obstacles: Grid::new(width, height),
            materials: Grid::new(width, height),
        }
    }

    /// Build a room from already-populated maps. The grids must be the
    /// same shape.
    pub fn from_grids(obstacles: Grid<bool>, materials: Grid<u8>) -> Self {
        assert_eq!(obstacles.width(), materials.width());
        assert_eq!(obstacles.height(), materials.height());
        Self {
            width: obstacles.width(),
            height: obstacles.height(),
            obstacles,
            materials,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn obstacles(&self) -> &Grid<bool> {
        &self.obstacles
    }

    pub fn materials(&self) -> &Grid<u8> {
        &self.materials
    }

    /// Mark `(x, y)` as an obstacle cell of the given material.
    pub fn paint(&mut self, x: usize, y: usize, material: Material) {
        self.obstacles.set(x, y, true);
        self.materials.set(x, y, material.id());
    }

    /// Clear `(x, y)` back to open Air.
    pub fn erase(&mut self, x: usize, y: usize) {
        self.obstacles.set(x, y, false);
        self.materials.set(x, y, 0);
    }

    /// Parse the persisted text format. Validation is complete before any
    /// state is built up for the caller, so a failed parse leaves nothing
    /// half-loaded.
    pub fn parse(text: &str) -> Result<Self, LoadError> {
        let mut lines = text.lines();

        let dims = lines.next().ok_or(LoadError::BadDimensions)?;
        let mut parts = dims.split_whitespace();
        let width = parse_dimension(parts.next())?;
        let height = parse_dimension(parts.next())?;

        let mut obstacles: Grid<bool> = Grid::new(width, height);
        for row in 0..height {
            let line = lines
                .next()
                .ok_or(LoadError::ShortObstacleRow { row, width })?;
            let mut chars = line.chars();
            for col in 0..width {
                match chars.next() {
                    Some('0') => {}
                    Some('1') => obstacles.set(col, row, true),
                    Some(_) => return Err(LoadError::BadObstacleChar { row }),
                    None => return Err(LoadError::ShortObstacleRow { row, width }),
                }
            }
        }

        let mut materials: Grid<u8> = Grid::new(width, height);
        for row in 0..height {
            let line = lines
                .next()
                .ok_or(LoadError::ShortMaterialRow { row, width })?;
            let mut chars = line.chars();
            for col in 0..width {
                match chars.next().map(|c| c.to_digit(10)) {
                    Some(Some(digit)) => materials.set(col, row, digit as u8),
                    Some(None) => return Err(LoadError::BadMaterialChar { row }),
                    None => return Err(LoadError::ShortMaterialRow { row, width }),
                }
            }
        }

        Ok(Self {
            width,
            height,
            obstacles,
            materials,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        Self::parse(&fs::read_to_string(path)?)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        fs::write(path, self.to_string())
    }

    /// Rescale this room onto destination maps of possibly different
    /// dimensions.
    ///
    /// The destination is reset first, then every source obstacle cell is
    /// mapped to the rectangle of destination cells its area overlaps and
    /// stamped there with its material id. Where rectangles from different
    /// source cells overlap, the last writer wins: the rescale is lossy and
    /// non-conservative. Non-obstacle source cells contribute nothing.
    pub fn apply_to(&self, obstacles: &mut Grid<bool>, materials: &mut Grid<u8>) {
        let dest_w = obstacles.width();
        let dest_h = obstacles.height();
        debug_assert_eq!(dest_w, materials.width());
        debug_assert_eq!(dest_h, materials.height());

        obstacles.fill(false);
        materials.fill(0);

        let scale_x = dest_w as f64 / self.width as f64;
        let scale_y = dest_h as f64 / self.height as f64;

        for sy in 0..self.height {
            for sx in 0..self.width {
                if !self.obstacles.get(sx, sy) {
                    continue;
                }
                let material = self.materials.get(sx, sy);
                let x0 = (sx as f64 * scale_x) as usize;
                let y0 = (sy as f64 * scale_y) as usize;
                let x1 = span_end(sx, scale_x, dest_w);
                let y1 = span_end(sy, scale_y, dest_h);
                for y in y0..=y1 {
                    for x in x0..=x1 {
                        obstacles.set(x, y, true);
                        materials.set(x, y, material);
                    }
                }
            }
        }
    }
}

fn parse_dimension(token: Option<&str>) -> Result<usize, LoadError> {
    token
        .and_then(|t| t.parse::<usize>().ok())
        .filter(|&d| d > 0)
        .ok_or(LoadError::BadDimensions)
}

/// Last destination cell whose unit interval overlaps source cell `i`
/// scaled by `scale`, clamped to the grid.
fn span_end(i: usize, scale: f64, dest_len: usize) -> usize {
    let end = ((i + 1) as f64 * scale).ceil() as usize;
    end.saturating_sub(1).min(dest_len - 1)
}

impl fmt::Display for RoomDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.width, self.height)?;
        for row in 0..self.height {
            for col in 0..self.width {
                f.write_str(if self.obstacles.get(col, row) { "1" } else { "0" })?;
            }
            writeln!(f)?;
        }
        for row in 0..self.height {
            for col in 0..self.width {
                write!(f, "{}", self.materials.get(col, row))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL_ROOM: &str = "3 2\n010\n111\n020\n344\n";

    #[test]
    fn test_parse_small_room() {
        let room = RoomDefinition::parse(SMALL_ROOM).unwrap();
        assert_eq!(room.width(), 3);
        assert_eq!(room.height(), 2);
        assert!(!room.obstacles().get(0, 0));
        assert!(room.obstacles().get(1, 0));
        assert!(room.obstacles().get(2, 1));
        assert_eq!(room.materials().get(1, 0), 2);
        assert_eq!(room.materials().get(0, 1), 3);
    }

    #[test]
    fn test_parse_ignores_trailing_columns_and_lines() {
        let room = RoomDefinition::parse("2 2\n0111\n10\n12\n34\nextra\n").unwrap();
        assert!(room.obstacles().get(1, 0));
        assert!(!room.obstacles().get(0, 0));
        assert_eq!(room.materials().get(1, 1), 4);
    }

    #[test]
    fn test_parse_rejects_bad_dimension_line() {
        assert!(matches!(
            RoomDefinition::parse(""),
            Err(LoadError::BadDimensions)
        ));
        assert!(matches!(
            RoomDefinition::parse("4\n"),
            Err(LoadError::BadDimensions)
        ));
        assert!(matches!(
            RoomDefinition::parse("0 3\n"),
            Err(LoadError::BadDimensions)
        ));
        assert!(matches!(
            RoomDefinition::parse("-2 3\n"),
            Err(LoadError::BadDimensions)
        ));
        assert!(matches!(
            RoomDefinition::parse("a b\n"),
            Err(LoadError::BadDimensions)
        ));
    }

    #[test]
    fn test_parse_rejects_short_obstacle_row() {
        let err = RoomDefinition::parse("3 2\n01\n111\n000\n000\n").unwrap_err();
        assert!(matches!(
            err,
            LoadError::ShortObstacleRow { row: 0, width: 3 }
        ));
    }

    #[test]
    fn test_parse_rejects_missing_obstacle_row() {
        let err = RoomDefinition::parse("3 2\n010\n").unwrap_err();
        assert!(matches!(err, LoadError::ShortObstacleRow { row: 1, .. }));
    }

    #[test]
    fn test_parse_rejects_garbled_obstacle_row() {
        let err = RoomDefinition::parse("3 2\n010\n1x1\n000\n000\n").unwrap_err();
        assert!(matches!(err, LoadError::BadObstacleChar { row: 1 }));
    }

    #[test]
    fn test_parse_rejects_non_digit_material() {
        let err = RoomDefinition::parse("2 1\n01\n3x\n").unwrap_err();
        assert!(matches!(err, LoadError::BadMaterialChar { row: 0 }));
    }

    #[test]
    fn test_parse_rejects_short_material_row() {
        let err = RoomDefinition::parse("3 1\n010\n12\n").unwrap_err();
        assert!(matches!(
            err,
            LoadError::ShortMaterialRow { row: 0, width: 3 }
        ));
    }

    #[test]
    fn test_display_parse_roundtrip() {
        let room = RoomDefinition::parse(SMALL_ROOM).unwrap();
        let reparsed = RoomDefinition::parse(&room.to_string()).unwrap();
        assert_eq!(room, reparsed);
    }

    #[test]
    fn test_paint_and_erase() {
        let mut room = RoomDefinition::new(4, 4);
        room.paint(2, 1, Material::Carpet);
        assert!(room.obstacles().get(2, 1));
        assert_eq!(room.materials().get(2, 1), 3);
        room.erase(2, 1);
        assert!(!room.obstacles().get(2, 1));
        assert_eq!(room.materials().get(2, 1), 0);
    }

    #[test]
    fn test_apply_identity_scale_copies_maps() {
        let room = RoomDefinition::parse(SMALL_ROOM).unwrap();
        let mut obstacles = Grid::new(3, 2);
        let mut materials = Grid::new(3, 2);
        room.apply_to(&mut obstacles, &mut materials);
        assert_eq!(&obstacles, room.obstacles());
        assert_eq!(&materials, room.materials());
    }

    #[test]
    fn test_apply_upscale_marks_block() {
        // One obstacle cell of a 2x2 room lands on a 2x2 block of a 4x4 grid
        let mut room = RoomDefinition::new(2, 2);
        room.paint(0, 0, Material::Carpet);
        let mut obstacles = Grid::new(4, 4);
        let mut materials = Grid::new(4, 4);
        room.apply_to(&mut obstacles, &mut materials);
        for y in 0..4 {
            for x in 0..4 {
                let inside = x < 2 && y < 2;
                assert_eq!(obstacles.get(x, y), inside, "cell ({x}, {y})");
                assert_eq!(materials.get(x, y), if inside { 3 } else { 0 });
            }
        }
    }

    #[test]
    fn test_apply_downscale_keeps_obstacles() {
        let mut room = RoomDefinition::new(4, 4);
        room.paint(0, 0, Material::Concrete);
        room.paint(3, 3, Material::Drywall);
        let mut obstacles = Grid::new(2, 2);
        let mut materials = Grid::new(2, 2);
        room.apply_to(&mut obstacles, &mut materials);
        assert!(obstacles.get(0, 0));
        assert!(obstacles.get(1, 1));
        assert_eq!(materials.get(0, 0), 1);
        assert_eq!(materials.get(1, 1), 2);
        assert!(!obstacles.get(1, 0));
        assert!(!obstacles.get(0, 1));
    }

    #[test]
    fn test_apply_resets_previous_contents() {
        let room = RoomDefinition::new(2, 2);
        let mut obstacles = Grid::new(2, 2);
        let mut materials = Grid::new(2, 2);
        obstacles.fill(true);
        materials.fill(4);
        room.apply_to(&mut obstacles, &mut materials);
        assert!(obstacles.as_slice().iter().all(|&c| !c));
        assert!(materials.as_slice().iter().all(|&m| m == 0));
    }

    #[test]
    fn test_out_of_table_digits_survive_roundtrip() {
        let room = RoomDefinition::parse("2 1\n11\n57\n").unwrap();
        assert_eq!(room.materials().get(0, 0), 5);
        let reparsed = RoomDefinition::parse(&room.to_string()).unwrap();
        assert_eq!(reparsed.materials().get(1, 0), 7);
    }
}

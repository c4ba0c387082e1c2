/// Engine grid dimensions (cells). The room loader rescales authored rooms
/// of any size onto this grid.
pub const GRID_WIDTH: u32 = 400;
pub const GRID_HEIGHT: u32 = 300;

// ============================================
// Wave Equation Parameters
// ============================================

/// Speed of sound in air, m/s
pub const SPEED_OF_SOUND: f64 = 343.0;

/// Spatial step, meters per cell
pub const SPATIAL_STEP: f64 = 1.0;

/// Safety factor applied when deriving dt from dx/c. Keeps the Courant
/// number at 0.5, inside the 2D explicit-scheme bound 1/sqrt(2).
pub const TIME_STEP_SAFETY: f64 = 0.5;

/// Pressure added at each active source every tick (continuous drive)
pub const SOURCE_AMPLITUDE: f64 = 50.0;

/// Uniform per-tick attenuation applied to the whole field in realism mode
pub const GLOBAL_DAMPING: f64 = 0.999;

// ============================================
// Viewer
// ============================================

/// Simulation ticks advanced per rendered frame
pub const STEPS_PER_FRAME: u32 = 2;

/// Window pixels per grid cell
pub const CELL_SCALE: u32 = 2;

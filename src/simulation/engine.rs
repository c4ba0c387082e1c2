use crate::config::{
    GLOBAL_DAMPING, SOURCE_AMPLITUDE, SPATIAL_STEP, SPEED_OF_SOUND, TIME_STEP_SAFETY,
};
use crate::simulation::field::{Grid, PressureField};
use crate::simulation::material::Material;
use crate::simulation::room::RoomDefinition;
use crate::simulation::source::SourceManager;

/// Discretization constants shared by both stepping modes.
///
/// `time_step` is derived as `(spatial_step / speed_of_sound) * safety`,
/// which pins the Courant number `c * dt / dx` at the safety factor. The
/// 2D explicit scheme is stable for Courant numbers up to `1/sqrt(2)`;
/// honoring that bound is the caller's responsibility, the engine does not
/// re-check it while stepping.
#[derive(Clone, Copy, Debug)]
pub struct SimulationParameters {
    pub speed_of_sound: f64,
    pub spatial_step: f64,
    pub time_step: f64,
    pub courant: f64,
    /// Uniform per-tick attenuation applied to the whole field in realism
    /// mode, modeling ambient absorption.
    pub global_damping: f64,
    /// Pressure added at each active source every tick.
    pub source_amplitude: f64,
}

impl SimulationParameters {
    pub fn new(speed_of_sound: f64, spatial_step: f64) -> Self {
        let time_step = (spatial_step / speed_of_sound) * TIME_STEP_SAFETY;
        Self {
            speed_of_sound,
            spatial_step,
            time_step,
            courant: speed_of_sound * time_step / spatial_step,
            global_damping: GLOBAL_DAMPING,
            source_amplitude: SOURCE_AMPLITUDE,
        }
    }
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self::new(SPEED_OF_SOUND, SPATIAL_STEP)
    }
}

/// Engine construction failed because the requested grid is degenerate.
#[derive(thiserror::Error, Debug)]
#[error("grid dimensions must be positive, got {width}x{height}")]
pub struct ConstructionError {
    pub width: u32,
    pub height: u32,
}

/// The FDTD simulation engine.
///
/// Owns the triple-buffered pressure field plus the obstacle and material
/// maps, and advances them one tick per [`Engine::step`] call. The caller
/// owns the stepping cadence; `step` never blocks and does `O(width *
/// height)` work. Grid dimensions are fixed for the engine's lifetime.
pub struct Engine {
    width: usize,
    height: usize,
    params: SimulationParameters,
    field: PressureField,
    obstacles: Grid<bool>,
    materials: Grid<u8>,
    sources: SourceManager,
    running: bool,
    realism: bool,
}

impl Engine {
    /// Create an engine with the default physical parameters.
    pub fn new(width: u32, height: u32, dual_mode: bool) -> Result<Self, ConstructionError> {
        Self::with_parameters(width, height, dual_mode, SimulationParameters::default())
    }

    /// Create an engine with explicit parameters. The state starts zeroed:
    /// quiescent field, no obstacles, all cells Air.
    pub fn with_parameters(
        width: u32,
        height: u32,
        dual_mode: bool,
        params: SimulationParameters,
    ) -> Result<Self, ConstructionError> {
        if width == 0 || height == 0 {
            return Err(ConstructionError { width, height });
        }
        let (w, h) = (width as usize, height as usize);
        Ok(Self {
            width: w,
            height: h,
            params,
            field: PressureField::new(w, h),
            obstacles: Grid::new(w, h),
            materials: Grid::new(w, h),
            sources: SourceManager::new(dual_mode),
            running: true,
            realism: false,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn parameters(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Select the stepping algorithm. Takes effect on the next `step`.
    pub fn set_realism_mode(&mut self, realism: bool) {
        self.realism = realism;
    }

    pub fn is_realism_mode(&self) -> bool {
        self.realism
    }

    /// Zero all three pressure frames. Obstacle and material maps are left
    /// alone.
    pub fn clear(&mut self) {
        self.field.clear();
    }

    pub fn set_source_position(&mut self, x: i32, y: i32) {
        self.sources.set_position(x, y);
    }

    pub fn set_dual_mode(&mut self, dual: bool) {
        self.sources.set_dual_mode(dual);
    }

    pub fn is_dual_mode(&self) -> bool {
        self.sources.is_dual_mode()
    }

    pub fn sources(&self) -> &SourceManager {
        &self.sources
    }

    /// Replace the obstacle and material maps with a rescaled copy of the
    /// given room. The pressure field is not touched.
    pub fn load_room(&mut self, room: &RoomDefinition) {
        room.apply_to(&mut self.obstacles, &mut self.materials);
    }

    /// Read-only snapshot of the current pressure frame, row-major.
    pub fn pressure_field(&self) -> &[f64] {
        self.field.current()
    }

    pub fn obstacles(&self) -> &Grid<bool> {
        &self.obstacles
    }

    pub fn materials(&self) -> &Grid<u8> {
        &self.materials
    }

    /// Advance the simulation by one tick. A stopped engine returns
    /// immediately.
    pub fn step(&mut self) {
        if !self.running {
            return;
        }
        if self.realism {
            self.realism_step();
        } else {
            self.ideal_step();
        }
        self.field.rotate();
    }

    /// Lossless mode: obstacles and edges are rigid zero-pressure
    /// reflectors, interior cells follow the five-point stencil.
    fn ideal_step(&mut self) {
        let (w, h) = (self.width, self.height);
        let alpha_sq = self.params.courant * self.params.courant;
        let frames = self.field.step_frames();
        let (prev, cur, next) = (frames.prev, frames.cur, frames.next);

        for y in 1..h.saturating_sub(1) {
            for x in 1..w - 1 {
                let idx = y * w + x;
                next[idx] = if self.obstacles.get(x, y) {
                    0.0
                } else {
                    2.0 * cur[idx] - prev[idx]
                        + alpha_sq
                            * (cur[idx + 1] + cur[idx - 1] + cur[idx + w] + cur[idx - w]
                                - 4.0 * cur[idx])
                };
            }
        }

        // Dirichlet boundary: edge rows and columns pinned to zero
        for x in 0..w {
            next[x] = 0.0;
            next[(h - 1) * w + x] = 0.0;
        }
        for y in 0..h {
            next[y * w] = 0.0;
            next[y * w + w - 1] = 0.0;
        }

        Self::inject_sources(&self.sources, self.params.source_amplitude, w, h, next);
    }

    /// Lossy mode: obstacle cells act as lumped reflective impedances,
    /// open cells are damped per material, edges behave like concrete
    /// walls, and a uniform global damping drains the whole field.
    fn realism_step(&mut self) {
        let (w, h) = (self.width, self.height);
        let alpha_sq = self.params.courant * self.params.courant;
        let frames = self.field.step_frames();
        let (prev, cur, next) = (frames.prev, frames.cur, frames.next);

        for y in 1..h.saturating_sub(1) {
            for x in 1..w - 1 {
                let idx = y * w + x;
                let material = Material::from_id(self.materials.get(x, y));
                next[idx] = if self.obstacles.get(x, y) {
                    material.reflection() * cur[idx]
                } else {
                    let val = 2.0 * cur[idx] - prev[idx]
                        + alpha_sq
                            * (cur[idx + 1] + cur[idx - 1] + cur[idx + w] + cur[idx - w]
                                - 4.0 * cur[idx]);
                    val * material.damping()
                };
            }
        }

        // Edges reflect like concrete walls
        let wall = Material::Concrete.reflection();
        for x in 0..w {
            next[x] = wall * cur[x];
            let bottom = (h - 1) * w + x;
            next[bottom] = wall * cur[bottom];
        }
        for y in 0..h {
            let left = y * w;
            next[left] = wall * cur[left];
            let right = left + w - 1;
            next[right] = wall * cur[right];
        }

        Self::inject_sources(&self.sources, self.params.source_amplitude, w, h, next);

        let damping = self.params.global_damping;
        for p in next.iter_mut() {
            *p *= damping;
        }
    }

    /// Add the drive amplitude at every active in-bounds source.
    fn inject_sources(
        sources: &SourceManager,
        amplitude: f64,
        w: usize,
        h: usize,
        next: &mut [f64],
    ) {
        for source in sources.active() {
            if source.x >= 0
                && (source.x as usize) < w
                && source.y >= 0
                && (source.y as usize) < h
            {
                next[source.y as usize * w + source.x as usize] += amplitude;
            }
        }
    }
}

use room_wave::simulation::Grid;
use wgpu::{Buffer, BufferUsages, Device, Queue};

/// Obstacle flag bit in the packed cell buffer; low bits carry the
/// material id.
pub const CELL_OBSTACLE: u32 = 1 << 8;

/// Per-frame view parameters for the fragment shader (16 bytes).
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ViewParams {
    pub grid_width: u32,
    pub grid_height: u32,
    /// Normalization bounds of the frame being drawn; the shader maps
    /// pressure linearly from [min, max] to grayscale.
    pub min_pressure: f32,
    pub max_pressure: f32,
}

/// GPU-side copies of the engine's renderable state.
///
/// The pressure frame changes every tick and is uploaded per frame,
/// converted to f32 through a reusable staging vector. The packed
/// obstacle/material buffer only changes on a room load, so the app
/// uploads it on demand.
pub struct FieldBuffers {
    pub pressure_buffer: Buffer,
    pub cell_buffer: Buffer,
    pub view_params_buffer: Buffer,
    staging: Vec<f32>,
    width: u32,
    height: u32,
}

impl FieldBuffers {
    pub fn new(device: &Device, width: u32, height: u32) -> Self {
        let cell_count = (width * height) as u64;

        let pressure_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pressure-buffer"),
            size: cell_count * std::mem::size_of::<f32>() as u64,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let cell_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("cell-buffer"),
            size: cell_count * std::mem::size_of::<u32>() as u64,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let view_params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("view-params-buffer"),
            size: std::mem::size_of::<ViewParams>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            pressure_buffer,
            cell_buffer,
            view_params_buffer,
            staging: Vec::with_capacity(cell_count as usize),
            width,
            height,
        }
    }

    /// Upload the current pressure frame and its normalization bounds.
    pub fn upload_pressure(&mut self, queue: &Queue, field: &[f64]) {
        self.staging.clear();
        self.staging.extend(field.iter().map(|&p| p as f32));

        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for &p in &self.staging {
            min = min.min(p);
            max = max.max(p);
        }
        if !min.is_finite() || !max.is_finite() {
            min = 0.0;
            max = 0.0;
        }

        queue.write_buffer(&self.pressure_buffer, 0, bytemuck::cast_slice(&self.staging));

        let params = ViewParams {
            grid_width: self.width,
            grid_height: self.height,
            min_pressure: min,
            max_pressure: max,
        };
        queue.write_buffer(&self.view_params_buffer, 0, bytemuck::bytes_of(&params));
    }

    /// Upload the obstacle and material maps, packed one u32 per cell.
    pub fn upload_cells(&self, queue: &Queue, obstacles: &Grid<bool>, materials: &Grid<u8>) {
        let cells: Vec<u32> = obstacles
            .as_slice()
            .iter()
            .zip(materials.as_slice())
            .map(|(&obstacle, &material)| {
                let mut cell = material as u32;
                if obstacle {
                    cell |= CELL_OBSTACLE;
                }
                cell
            })
            .collect();
        queue.write_buffer(&self.cell_buffer, 0, bytemuck::cast_slice(&cells));
    }
}

mod engine;
mod field;
mod material;
mod room;
mod source;

pub use engine::{ConstructionError, Engine, SimulationParameters};
pub use field::{Grid, PressureField, StepFrames};
pub use material::{Material, MATERIAL_COUNT};
pub use room::{LoadError, RoomDefinition};
pub use source::{Source, SourceManager};

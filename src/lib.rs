//! 2D acoustic wave propagation in a rectangular room.
//!
//! The engine evolves a pressure field on a dense grid with an explicit
//! finite-difference time-domain scheme. Two stepping modes are provided:
//! a lossless "ideal" mode where obstacles and boundaries are rigid
//! zero-pressure reflectors, and a "realism" mode where obstacles reflect
//! with material-dependent coefficients and the field is damped per cell
//! and globally. Rooms are authored externally as text files and rescaled
//! onto the engine grid at load time.
//!
//! The caller owns the stepping cadence: [`simulation::Engine::step`] is a
//! plain synchronous call that advances one tick.

pub mod config;
pub mod simulation;

//! # kinetra-io
//!
//! File interfaces of the Kinetra engine: the CSV checkpoint dialect
//! for body state, POV-Ray scene and include-file export for
//! postprocessing, and the TOML simulation configuration.
//!
//! Both checkpoint paths fail loudly on shapes the dialect cannot
//! carry; there is no silent skipping in either direction.

pub mod checkpoint;
pub mod config;
pub mod povray;

pub use checkpoint::{
    checkpoint_from_str, checkpoint_to_string, read_checkpoint, read_checkpoint_file,
    write_checkpoint, write_checkpoint_file,
};
pub use config::{SimulationConfig, SolverConfig};
pub use povray::{
    write_curve_include, write_curve_include_file, write_mesh_include, write_mesh_include_file,
    write_povray_scene, write_povray_scene_file,
};

//! seafloat library - real-time ocean, sky environment and floating bodies

pub mod camera;
pub mod cli;
pub mod environment;
pub mod floater;
pub mod lighting;
pub mod ocean;
pub mod params;
pub mod rendering;
pub mod simulation;
pub mod sky;

pub mod config;
pub mod error;
pub mod physics;
pub mod procgen;
pub mod render;
pub mod road;

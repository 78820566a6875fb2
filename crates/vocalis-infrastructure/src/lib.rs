//! Infrastructure layer for Vocalis.
//!
//! Concrete implementations of the storage and audio interfaces defined in
//! `vocalis-core`, plus environment-based configuration loading.

pub mod config_loader;
pub mod ffmpeg_toolkit;
pub mod fs_model_file_store;
pub mod paths;
pub mod sqlite_model_repository;

pub use crate::config_loader::EnvConfigLoader;
pub use crate::ffmpeg_toolkit::FfmpegToolkit;
pub use crate::fs_model_file_store::FsModelFileStore;
pub use crate::paths::ModelPaths;
pub use crate::sqlite_model_repository::SqliteModelRepository;

//! Media pipeline for Framefuse.
//!
//! Turns a validated composition request into a filter graph, fetches the
//! source files, and drives the FFmpeg renderer.

pub mod border;
pub mod command;
pub mod download;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod scratch;

pub use command::{check_ffmpeg, FfmpegCommand, FfmpegRunner, InputKind, RenderInput};
pub use download::download_to_file;
pub use error::{MediaError, MediaResult};
pub use graph::{assemble, FilterGraph, GraphBuilder, SourceSet, Stage, StreamLabel};
pub use scratch::ScratchDir;

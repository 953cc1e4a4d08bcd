//! Shared data models for the Framefuse composition API.
//!
//! These types describe a validated composition request: canvas format,
//! layout, placement anchors, colors, optional stage configuration, and
//! encoder settings. They carry no I/O and no graph logic.

pub mod anchor;
pub mod canvas;
pub mod color;
pub mod encoding;
pub mod error;
pub mod layout;
pub mod request;

pub use anchor::{Anchor, AnchorParseError};
pub use canvas::{CanvasFormat, FormatParseError};
pub use color::{ColorParseError, Rgb};
pub use encoding::EncodingConfig;
pub use error::CompositionError;
pub use layout::{Layout, LayoutParseError};
pub use request::{
    AvatarOptions, BlendMode, BorderOptions, CompositionRequest, FadeOptions, TextOptions,
    ThirdLayerKind, ThirdLayerOptions,
};

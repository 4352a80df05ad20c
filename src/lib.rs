pub mod config;
pub mod detection;
pub mod error;
pub mod geometry;
pub mod io;
pub mod lens;
pub mod pipeline;
pub mod positioning;
pub mod replay;
pub mod types;
pub mod visualization;
pub mod zoom;

pub use error::{Error, Result};
pub use lens::{LensCatalog, LensInfo};
pub use positioning::{PositioningAnalyzer, PositioningResult, Strategy};
pub use types::{ActiveRole, BoundingBox, LensRole};
pub use zoom::{ZoomController, ZoomEvent, ZoomState};

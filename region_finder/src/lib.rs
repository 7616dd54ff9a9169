// THEORY:
// This file is the main entry point for the `region_finder` library crate. It exports
// the `RegionFinder` core (flood fill, similarity test, ranking, and recoloring) along
// with two ways of driving it:
//
// - `pipeline::PaintSession`: a headless, frame-by-frame "camera painting" session that
//   turns clicks and key presses into target colors, display modes, and save requests.
// - `parallel_pipeline`: async wrappers that keep each finder single-writer while many
//   frames are analyzed at once.
//
// Capture, display, and file formats belong to the caller.

pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;

pub use core_modules::pixel::pixel::{Color, DEFAULT_MAX_COLOR_DIFF, color_match};
pub use core_modules::region::{Point, Region, largest_region};
pub use core_modules::region_finder::{DEFAULT_MIN_REGION_SIZE, FinderConfig, RegionFinder};
pub use core_modules::visited_grid::VisitedGrid;
pub use error::FinderError;

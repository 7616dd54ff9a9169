// THEORY:
// The `RegionFinder` is the owner and operator of one analysis. It holds the source
// image, the visited grid, and the resulting collection of regions, and it is the only
// thing that mutates them.
//
// Key architectural principles:
// 1.  **Deterministic scan**: `find_regions` walks the image column by column (x outer,
//     y inner). Every unvisited pixel that matches the target seeds a flood fill. The
//     same image, target, and config always produce the same regions in the same order.
// 2.  **Fresh pass state**: Each `find_regions` call starts with a cleared visited grid
//     and an empty collection. `set_image` clears both as well, since the old markers
//     describe a different picture.
// 3.  **Every pixel examined once**: The scan marks each pixel it looks at, and the
//     fills mark every neighbor they look at, so a finished pass leaves the whole
//     visited grid set.
// 4.  **Size filter after growth**: Small regions are grown in full, which marks their
//     pixels visited, and are then dropped. Their pixels are never reconsidered.
// 5.  **Insertion order, not size order**: The newest region sits at index 0. Consumers
//     that want the biggest one ask `largest_region`.
// 6.  **Explicit failure**: No image, no regions, or a seed outside the image are
//     reported as `FinderError`s instead of panicking.

use crate::core_modules::flood_fill::flood_fill;
use crate::core_modules::pixel::pixel::{Color, ColorDiff, DEFAULT_MAX_COLOR_DIFF, color_match};
use crate::core_modules::region::{Point, Region, largest_region};
use crate::core_modules::visited_grid::VisitedGrid;
use crate::error::{FinderError, Result};
use image::RgbaImage;
use log::{debug, trace};
use rand::Rng;

/// How many points a region needs before it is worth keeping.
pub const DEFAULT_MIN_REGION_SIZE: usize = 5;

/// Tunable parameters for region finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinderConfig {
    /// Maximum per-channel difference from the target color.
    pub max_color_diff: ColorDiff,
    /// Regions with fewer points than this are discarded. Zero behaves like one.
    pub min_region_size: usize,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            max_color_diff: DEFAULT_MAX_COLOR_DIFF,
            min_region_size: DEFAULT_MIN_REGION_SIZE,
        }
    }
}

/// Finds and holds the color regions of one image.
#[derive(Debug, Clone, Default)]
pub struct RegionFinder {
    config: FinderConfig,
    image: Option<RgbaImage>,
    recolored_image: Option<RgbaImage>,
    visited: VisitedGrid,
    target_color: Option<Color>,
    regions: Vec<Region>,
}

impl RegionFinder {
    pub fn new(config: FinderConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn with_image(config: FinderConfig, image: RgbaImage) -> Self {
        let mut finder = Self::new(config);
        finder.set_image(image);
        finder
    }

    /// Replaces the source image and drops everything derived from the old one.
    pub fn set_image(&mut self, image: RgbaImage) {
        let (width, height) = image.dimensions();
        self.visited.reset(width, height);
        self.regions.clear();
        self.recolored_image = None;
        self.image = Some(image);
    }

    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref()
    }

    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// The target color of the most recent `find_regions` pass, if any.
    pub fn target_color(&self) -> Option<Color> {
        self.target_color
    }

    pub fn visited(&self) -> &VisitedGrid {
        &self.visited
    }

    /// The kept regions, most recently found first.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn recolored_image(&self) -> Option<&RgbaImage> {
        self.recolored_image.as_ref()
    }

    /// Partitions the image into regions matching `target_color`.
    pub fn find_regions(&mut self, target_color: Color) -> Result<&[Region]> {
        let image = self.image.as_ref().ok_or(FinderError::InvalidState)?;
        let (width, height) = image.dimensions();
        let min_region_size = self.config.min_region_size.max(1);

        // --- 1. Fresh pass state ---
        self.visited.reset(width, height);
        self.recolored_image = None;
        self.target_color = Some(target_color);
        let mut found: Vec<Region> = Vec::new();
        let mut discarded = 0usize;

        // --- 2. Column-major scan, seeding a fill at every unvisited match ---
        for x in 0..width {
            for y in 0..height {
                // The scan itself examines the pixel, so it is marked even on a miss.
                if !self.visited.mark(x, y) {
                    continue;
                }
                let color = Color::from(image.get_pixel(x, y));
                if !color_match(&color, &target_color, self.config.max_color_diff) {
                    continue;
                }

                let region = flood_fill::grow_region(
                    image,
                    &mut self.visited,
                    Point::new(x, y),
                    &target_color,
                    self.config.max_color_diff,
                )?;

                // --- 3. Size filter ---
                if region.len() >= min_region_size {
                    found.push(region);
                } else {
                    trace!("discarding {}-point region seeded at ({x}, {y})", region.len());
                    discarded += 1;
                }
            }
        }

        // Newest first.
        found.reverse();
        self.regions = found;

        debug!(
            "found {} regions ({} discarded) for target {:?} in {}x{} image",
            self.regions.len(),
            discarded,
            target_color,
            width,
            height
        );
        Ok(&self.regions)
    }

    /// Grows a single region from `(x, y)` against the current visited grid.
    ///
    /// The seed is taken as matching, as `find_regions` only seeds on matches. The
    /// returned region is not added to the collection.
    pub fn flood_fill(&mut self, x: u32, y: u32, target_color: Color) -> Result<Region> {
        let image = self.image.as_ref().ok_or(FinderError::InvalidState)?;
        flood_fill::grow_region(
            image,
            &mut self.visited,
            Point::new(x, y),
            &target_color,
            self.config.max_color_diff,
        )
    }

    /// The region with the most points. Ties go to the earliest in collection order.
    ///
    /// Fails with `InvalidState` before any image is set, and with `EmptyResult` when
    /// the collection is empty.
    pub fn largest_region(&self) -> Result<&Region> {
        if self.image.is_none() {
            return Err(FinderError::InvalidState);
        }
        largest_region(&self.regions)
    }

    /// Copies the source image and paints each region one random color.
    pub fn recolor_image<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<&RgbaImage> {
        let image = self.image.as_ref().ok_or(FinderError::InvalidState)?;
        let mut recolored = image.clone();

        for region in &self.regions {
            let color = Color::random(rng).to_rgba();
            for point in region {
                recolored.put_pixel(point.x, point.y, color);
            }
        }

        Ok(&*self.recolored_image.insert(recolored))
    }
}

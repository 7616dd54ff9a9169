// THEORY:
// The `pipeline` module is the top-level API for driving the region finder from a
// stream of frames. It models the "camera painting" collaborator without owning a
// camera or a window: frames, clicks, and key presses come in, and the session answers
// with a per-frame report, an image to display, and save requests for the caller to
// write wherever it likes.
//
// Per frame, once a target color has been picked:
//   frame -> set_image -> find_regions -> recolor_image -> (Painting mode) paint largest
//
// The display mode is explicit session state (`DisplayMode`), not a global.

use crate::core_modules::pixel::pixel::Color;
use crate::core_modules::region_finder::{FinderConfig, RegionFinder};
use crate::error::{FinderError, Result};
use image::{Rgba, RgbaImage};
use log::{debug, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

// Re-export key data structures for the public API.
pub use crate::core_modules::region::{Point, Region};

pub const RECOLORED_FILE_NAME: &str = "recolored.png";
pub const PAINTING_FILE_NAME: &str = "painting.png";

const BLANK: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Configuration for the PaintSession.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub finder: FinderConfig,
    /// The "brush" color painted at the largest region's points.
    pub paint_color: Color,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            finder: FinderConfig::default(),
            paint_color: Color::BLUE,
        }
    }
}

/// What the session shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// The raw incoming frame.
    #[default]
    Webcam,
    /// The frame with every region recolored.
    Recolored,
    /// The accumulated painting.
    Painting,
}

/// A user command, as mapped from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Show(DisplayMode),
    ClearPainting,
    SaveRecolored,
    SavePainting,
}

impl Command {
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            'w' => Some(Command::Show(DisplayMode::Webcam)),
            'r' => Some(Command::Show(DisplayMode::Recolored)),
            'p' => Some(Command::Show(DisplayMode::Painting)),
            'c' => Some(Command::ClearPainting),
            'o' => Some(Command::SaveRecolored),
            's' => Some(Command::SavePainting),
            _ => None,
        }
    }
}

/// An image the caller is asked to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub file_name: &'static str,
    pub image: RgbaImage,
}

/// The detailed data package for an analyzed frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisDetails {
    pub region_count: usize,
    pub largest_region_size: Option<usize>,
    /// Whether the largest region was painted onto the canvas this frame.
    pub painted: bool,
}

/// The primary output of the session for a single frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// No target color has been picked yet, so nothing was analyzed.
    NoTarget,
    Analyzed(AnalysisDetails),
}

/// The main, top-level struct for a painting session.
pub struct PaintSession {
    config: PipelineConfig,
    finder: RegionFinder,
    frame: Option<RgbaImage>,
    target_color: Option<Color>,
    painting: Option<RgbaImage>,
    recolored: Option<RgbaImage>,
    mode: DisplayMode,
    rng: StdRng,
}

impl PaintSession {
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// A session whose recolor colors are reproducible.
    pub fn with_seed(config: PipelineConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: PipelineConfig, rng: StdRng) -> Self {
        Self {
            config,
            finder: RegionFinder::new(config.finder),
            frame: None,
            target_color: None,
            painting: None,
            recolored: None,
            mode: DisplayMode::default(),
            rng,
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DisplayMode) {
        self.mode = mode;
    }

    pub fn target_color(&self) -> Option<Color> {
        self.target_color
    }

    pub fn set_target_color(&mut self, color: Color) {
        self.target_color = Some(color);
    }

    pub fn painting(&self) -> Option<&RgbaImage> {
        self.painting.as_ref()
    }

    pub fn recolored(&self) -> Option<&RgbaImage> {
        self.recolored.as_ref()
    }

    pub fn finder(&self) -> &RegionFinder {
        &self.finder
    }

    /// Runs one refresh cycle on a new frame.
    pub fn process_frame(&mut self, frame: RgbaImage) -> Result<Report> {
        // The canvas takes the size of the first frame it sees.
        if self.painting.is_none() {
            let (width, height) = frame.dimensions();
            self.painting = Some(RgbaImage::from_pixel(width, height, BLANK));
        }

        let Some(target) = self.target_color else {
            self.frame = Some(frame);
            return Ok(Report::NoTarget);
        };

        // --- Stage 1: Region finding ---
        self.finder.set_image(frame.clone());
        self.frame = Some(frame);
        let region_count = self.finder.find_regions(target)?.len();

        // --- Stage 2: Visualization ---
        self.recolored = Some(self.finder.recolor_image(&mut self.rng)?.clone());

        // --- Stage 3: Painting ---
        let largest_region_size = self.finder.largest_region().ok().map(Region::len);
        let mut painted = false;
        if self.mode == DisplayMode::Painting {
            if let (Ok(brush), Some(painting)) = (self.finder.largest_region(), self.painting.as_mut()) {
                let paint = self.config.paint_color.to_rgba();
                for point in brush {
                    // Frames larger than the canvas paint only where they overlap.
                    if point.x < painting.width() && point.y < painting.height() {
                        painting.put_pixel(point.x, point.y, paint);
                    }
                }
                painted = true;
            }
        }

        debug!(
            "frame analyzed: {} regions, largest {:?}, painted {}",
            region_count, largest_region_size, painted
        );
        Ok(Report::Analyzed(AnalysisDetails {
            region_count,
            largest_region_size,
            painted,
        }))
    }

    /// Picks the color under `(x, y)` in the current frame as the new target.
    pub fn handle_mouse_press(&mut self, x: u32, y: u32) -> Result<Color> {
        let frame = self.frame.as_ref().ok_or(FinderError::InvalidState)?;
        let (width, height) = frame.dimensions();
        if x >= width || y >= height {
            return Err(FinderError::OutOfBounds {
                x,
                y,
                width,
                height,
            });
        }
        let color = Color::from(frame.get_pixel(x, y));
        self.target_color = Some(color);
        Ok(color)
    }

    /// Applies a key press. Save commands hand back the image to write.
    pub fn handle_key(&mut self, key: char) -> Option<SaveRequest> {
        let Some(command) = Command::from_key(key) else {
            warn!("unexpected key {key:?}");
            return None;
        };
        self.apply(command)
    }

    pub fn apply(&mut self, command: Command) -> Option<SaveRequest> {
        match command {
            Command::Show(mode) => {
                self.mode = mode;
                None
            }
            Command::ClearPainting => {
                self.clear_painting();
                None
            }
            Command::SaveRecolored => match &self.recolored {
                Some(image) => Some(SaveRequest {
                    file_name: RECOLORED_FILE_NAME,
                    image: image.clone(),
                }),
                None => {
                    warn!("no recolored image to save yet");
                    None
                }
            },
            Command::SavePainting => match &self.painting {
                Some(image) => Some(SaveRequest {
                    file_name: PAINTING_FILE_NAME,
                    image: image.clone(),
                }),
                None => {
                    warn!("no painting to save yet");
                    None
                }
            },
        }
    }

    /// Blanks the canvas and forgets the target color.
    pub fn clear_painting(&mut self) {
        if let Some(painting) = self.painting.as_mut() {
            painting.pixels_mut().for_each(|p| *p = BLANK);
        }
        self.target_color = None;
    }

    /// The image the current mode would show. Without a target, every mode shows the frame.
    pub fn display(&self) -> Option<&RgbaImage> {
        let derived = match (self.mode, self.target_color) {
            (DisplayMode::Webcam, _) | (_, None) => None,
            (DisplayMode::Recolored, Some(_)) => self.recolored.as_ref(),
            (DisplayMode::Painting, Some(_)) => self.painting.as_ref(),
        };
        derived.or(self.frame.as_ref())
    }
}

// THEORY:
// The flood fill is the engine of the region finder. Starting from one seed pixel it
// grows outward, breadth first, collecting every pixel that is both reachable through
// a chain of matching neighbors and close enough in color to the target.
//
// Algorithm steps:
// 1.  **Seeding**: The seed is marked visited and placed in both the work queue and the
//     result. The caller has already checked that the seed matches.
// 2.  **Expansion**: Points leave the queue first-in, first-out. Each one looks at all
//     eight neighbors (fewer along the image border). A neighbor that has not been
//     visited is marked visited straight away, match or no match, so nobody looks at it
//     again. A matching neighbor joins the queue and the result.
// 3.  **Termination**: The fill ends when the queue is empty. Because each pixel is
//     marked once, the total work across all fills in one pass is O(width * height).
// 4.  **Stateless Utility**: `grow_region` owns nothing. The image is borrowed, and the
//     visited grid is borrowed mutably from whoever runs the pass.

use crate::core_modules::pixel::pixel::{Color, ColorDiff, color_match};
use crate::core_modules::region::{Point, Region};
use crate::core_modules::visited_grid::VisitedGrid;
use crate::error::{FinderError, Result};

pub mod flood_fill {
    use super::*; // Make types from parent module available.
    use image::RgbaImage;
    use std::collections::VecDeque;

    /// Performs a breadth-first search to collect the region connected to `seed`.
    ///
    /// Fails with `OutOfBounds` for a seed outside the image, and with `InvalidState`
    /// when `visited` was not sized for `image`.
    pub fn grow_region(
        image: &RgbaImage,
        visited: &mut VisitedGrid,
        seed: Point,
        target: &Color,
        max_color_diff: ColorDiff,
    ) -> Result<Region> {
        let (width, height) = image.dimensions();
        if seed.x >= width || seed.y >= height {
            return Err(FinderError::OutOfBounds {
                x: seed.x,
                y: seed.y,
                width,
                height,
            });
        }
        if (visited.width(), visited.height()) != (width, height) {
            return Err(FinderError::InvalidState);
        }

        let mut region = Region::with_capacity(16);
        let mut queue: VecDeque<Point> = VecDeque::new();

        visited.mark(seed.x, seed.y);
        queue.push_back(seed);
        region.push(seed);

        while let Some(current) = queue.pop_front() {
            // Clip the 3x3 neighborhood to the image bounds.
            let x_range = current.x.saturating_sub(1)..=(current.x + 1).min(width - 1);
            let y_range = current.y.saturating_sub(1)..=(current.y + 1).min(height - 1);

            for nx in x_range {
                for ny in y_range.clone() {
                    if !visited.mark(nx, ny) {
                        continue;
                    }

                    let color = Color::from(image.get_pixel(nx, ny));
                    if color_match(&color, target, max_color_diff) {
                        let neighbor = Point::new(nx, ny);
                        queue.push_back(neighbor);
                        region.push(neighbor);
                    }
                }
            }
        }

        Ok(region)
    }
}

#[cfg(test)]
mod tests {
    use super::flood_fill::grow_region;
    use super::*;
    use image::{Rgba, RgbaImage};

    const A: Rgba<u8> = Rgba([200, 40, 40, 255]);
    const B: Rgba<u8> = Rgba([10, 10, 240, 255]);

    #[test]
    fn fill_stops_at_non_matching_pixels() {
        let mut image = RgbaImage::from_pixel(5, 1, A);
        image.put_pixel(2, 0, B);
        let mut visited = VisitedGrid::new(5, 1);

        let region = grow_region(&image, &mut visited, Point::new(0, 0), &A.into(), 19).unwrap();

        assert_eq!(region.points(), &[Point::new(0, 0), Point::new(1, 0)]);
        // The blocking pixel was examined, the pixels behind it were not.
        assert!(visited.is_visited(2, 0));
        assert!(!visited.is_visited(3, 0));
    }

    #[test]
    fn seed_comes_first_and_order_is_breadth_first() {
        let image = RgbaImage::from_pixel(5, 1, A);
        let mut visited = VisitedGrid::new(5, 1);

        let region = grow_region(&image, &mut visited, Point::new(2, 0), &A.into(), 0).unwrap();

        let xs: Vec<u32> = region.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![2, 1, 3, 0, 4]);
    }

    #[test]
    fn fill_skips_already_visited_pixels() {
        let image = RgbaImage::from_pixel(3, 1, A);
        let mut visited = VisitedGrid::new(3, 1);
        visited.mark(2, 0);

        let region = grow_region(&image, &mut visited, Point::new(0, 0), &A.into(), 0).unwrap();

        assert_eq!(region.len(), 2);
        assert!(!region.contains(&Point::new(2, 0)));
    }

    #[test]
    fn seed_outside_image_is_rejected() {
        let image = RgbaImage::from_pixel(3, 3, A);
        let mut visited = VisitedGrid::new(3, 3);

        let result = grow_region(&image, &mut visited, Point::new(7, 7), &A.into(), 19);

        assert_eq!(
            result.unwrap_err(),
            FinderError::OutOfBounds {
                x: 7,
                y: 7,
                width: 3,
                height: 3
            }
        );
        assert_eq!(visited.visited_count(), 0);
    }

    #[test]
    fn empty_image_has_no_valid_seed() {
        let image = RgbaImage::new(0, 4);
        let mut visited = VisitedGrid::new(0, 4);

        let result = grow_region(&image, &mut visited, Point::new(0, 0), &A.into(), 19);

        assert!(matches!(result, Err(FinderError::OutOfBounds { .. })));
    }

    #[test]
    fn mismatched_visited_grid_is_rejected() {
        let image = RgbaImage::from_pixel(3, 3, A);
        let mut visited = VisitedGrid::new(2, 2);

        let result = grow_region(&image, &mut visited, Point::new(0, 0), &A.into(), 19);

        assert_eq!(result.unwrap_err(), FinderError::InvalidState);
        assert_eq!(visited.visited_count(), 0);
    }

    #[test]
    fn single_pixel_image() {
        let image = RgbaImage::from_pixel(1, 1, A);
        let mut visited = VisitedGrid::new(1, 1);

        let region = grow_region(&image, &mut visited, Point::new(0, 0), &A.into(), 0).unwrap();

        assert_eq!(region.points(), &[Point::new(0, 0)]);
        assert!(visited.is_complete());
    }
}

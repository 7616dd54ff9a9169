// THEORY:
// A `Region` is the output unit of the region finder: one contiguous patch of pixels
// whose colors all sit within the similarity threshold of the target color. It is the
// pixel-level cousin of a blob. Where a blob summarizes itself eagerly, a region keeps
// every point it covers, because consumers paint with it point by point.
//
// Key architectural principles:
// 1.  **Discovery order**: Points are stored in the order the breadth-first fill reached
//     them. The seed is always first.
// 2.  **8-connectivity**: Any two points of a region are joined by a chain of points of
//     the same region, each step moving at most one pixel in x and in y.
// 3.  **Stateless Data Container**: A region knows nothing about the image it came from.
//     Summaries (bounding box, centroid) are computed on request from the points alone.

use crate::error::{FinderError, Result};

/// A pixel coordinate. Origin at the top-left, y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// True if the two points differ by at most one in both x and y (and are not equal).
    pub fn is_adjacent(&self, other: &Point) -> bool {
        self != other && self.x.abs_diff(other.x) <= 1 && self.y.abs_diff(other.y) <= 1
    }
}

/// A connected set of color-similar pixels discovered by one flood fill.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    points: Vec<Point>,
}

impl Region {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    /// The number of pixels in the region, i.e. its area.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    /// Linear scan; intended for tests and small regions.
    pub fn contains(&self, point: &Point) -> bool {
        self.points.contains(point)
    }

    /// The top-left and bottom-right corners of the smallest box enclosing every point.
    pub fn bounding_box(&self) -> Option<(Point, Point)> {
        let first = self.points.first()?;
        let (mut min, mut max) = (*first, *first);
        for point in &self.points[1..] {
            min.x = min.x.min(point.x);
            min.y = min.y.min(point.y);
            max.x = max.x.max(point.x);
            max.y = max.y.max(point.y);
        }
        Some((min, max))
    }

    /// The unweighted mean position of all points.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.points.is_empty() {
            return None;
        }
        let (sum_x, sum_y) = self
            .points
            .iter()
            .fold((0u64, 0u64), |(sx, sy), p| (sx + p.x as u64, sy + p.y as u64));
        let n = self.points.len() as f64;
        Some((sum_x as f64 / n, sum_y as f64 / n))
    }
}

/// The region with the most points in `regions`. Ties go to the earliest one.
pub fn largest_region(regions: &[Region]) -> Result<&Region> {
    let mut regions = regions.iter();
    let mut largest = regions.next().ok_or(FinderError::EmptyResult)?;
    for region in regions {
        if region.len() > largest.len() {
            largest = region;
        }
    }
    Ok(largest)
}

impl<'a> IntoIterator for &'a Region {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl FromIterator<Point> for Region {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacency_includes_diagonals() {
        let p = Point::new(1, 1);
        assert!(p.is_adjacent(&Point::new(0, 0)));
        assert!(p.is_adjacent(&Point::new(2, 1)));
        assert!(!p.is_adjacent(&Point::new(3, 1)));
        assert!(!p.is_adjacent(&p));
    }

    #[test]
    fn empty_region_has_no_summary() {
        let region = Region::new();
        assert!(region.is_empty());
        assert_eq!(region.bounding_box(), None);
        assert_eq!(region.centroid(), None);
    }

    #[test]
    fn summaries_cover_all_points() {
        let region: Region = [Point::new(2, 5), Point::new(3, 4), Point::new(4, 6)]
            .into_iter()
            .collect();
        assert_eq!(region.len(), 3);
        assert_eq!(
            region.bounding_box(),
            Some((Point::new(2, 4), Point::new(4, 6)))
        );
        assert_eq!(region.centroid(), Some((3.0, 5.0)));
        assert!(region.contains(&Point::new(3, 4)));
        assert!(!region.contains(&Point::new(3, 5)));
    }

    fn line(len: u32, y: u32) -> Region {
        (0..len).map(|x| Point::new(x, y)).collect()
    }

    #[test]
    fn largest_picks_the_first_of_equal_sizes() {
        let regions = vec![line(2, 0), line(3, 1), line(3, 2), line(1, 3)];
        let largest = largest_region(&regions).unwrap();
        assert_eq!(largest, &regions[1]);
    }

    #[test]
    fn largest_of_nothing_is_an_empty_result() {
        assert_eq!(largest_region(&[]).unwrap_err(), FinderError::EmptyResult);
    }
}

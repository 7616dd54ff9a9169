// THEORY:
// The `VisitedGrid` is the bookkeeping half of the flood fill. It remembers which
// pixels some flood fill has already examined during the current analysis pass, so a
// pixel is looked at once and only once no matter how many fills run.
//
// Key architectural principles:
// 1.  **Dense storage**: One `bool` per pixel in a flat `Vec`, indexed `y * width + x`.
//     Lookups are O(1) and a row-by-row walk stays in cache.
// 2.  **Examined, not matched**: A pixel is marked the moment it is looked at, whether
//     or not its color matched. Discarded small regions stay marked, too.
// 3.  **Exclusive ownership**: The grid lives inside one `RegionFinder` and is only
//     mutated by `find_regions`/`flood_fill` through `&mut self`.

/// A dense per-pixel "already examined" marker grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitedGrid {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl VisitedGrid {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width as usize * height as usize],
        }
    }

    /// Clears every marker and resizes the grid to the given dimensions.
    pub fn reset(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells.resize(width as usize * height as usize, false);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Panics on a coordinate outside the grid, which would otherwise alias a pixel on
    /// another row.
    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "({x}, {y}) is outside the {}x{} visited grid",
            self.width,
            self.height
        );
        y as usize * self.width as usize + x as usize
    }

    /// Panics if `(x, y)` is outside the grid.
    #[inline]
    pub fn is_visited(&self, x: u32, y: u32) -> bool {
        self.cells[self.index(x, y)]
    }

    /// Marks a pixel as examined. Returns `true` if it was not marked before.
    /// Panics if `(x, y)` is outside the grid.
    #[inline]
    pub fn mark(&mut self, x: u32, y: u32) -> bool {
        let index = self.index(x, y);
        !std::mem::replace(&mut self.cells[index], true)
    }

    pub fn visited_count(&self) -> usize {
        self.cells.iter().filter(|&&visited| visited).count()
    }

    /// True once every pixel has been examined.
    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(|&visited| visited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_unvisited() {
        let grid = VisitedGrid::new(4, 3);
        assert_eq!(grid.visited_count(), 0);
        assert!(!grid.is_visited(3, 2));
        assert!(!grid.is_complete());
    }

    #[test]
    fn mark_reports_first_visit_only() {
        let mut grid = VisitedGrid::new(2, 2);
        assert!(grid.mark(1, 0));
        assert!(!grid.mark(1, 0));
        assert!(grid.is_visited(1, 0));
        assert!(!grid.is_visited(0, 1));
        assert_eq!(grid.visited_count(), 1);
    }

    #[test]
    fn reset_clears_and_resizes() {
        let mut grid = VisitedGrid::new(2, 2);
        for y in 0..2 {
            for x in 0..2 {
                grid.mark(x, y);
            }
        }
        assert!(grid.is_complete());

        grid.reset(3, 1);
        assert_eq!((grid.width(), grid.height()), (3, 1));
        assert_eq!(grid.visited_count(), 0);
        assert!(!grid.is_visited(2, 0));
    }

    #[test]
    #[should_panic(expected = "outside the 4x3 visited grid")]
    fn column_past_the_width_does_not_wrap_to_the_next_row() {
        let mut grid = VisitedGrid::new(4, 3);
        grid.mark(1, 1);
        // (5, 0) would land on the same cell as (1, 1) if the index were unchecked.
        grid.is_visited(5, 0);
    }

    #[test]
    #[should_panic(expected = "outside the 4x3 visited grid")]
    fn marking_past_the_height_panics() {
        let mut grid = VisitedGrid::new(4, 3);
        grid.mark(0, 3);
    }

    #[test]
    fn empty_grid_is_trivially_complete() {
        assert!(VisitedGrid::new(0, 0).is_complete());
    }
}

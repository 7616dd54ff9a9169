pub mod flood_fill;
pub mod pixel;
pub mod region;
pub mod region_finder;
pub mod visited_grid;

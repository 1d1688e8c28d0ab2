pub mod axis;
pub mod grid;
pub mod index;

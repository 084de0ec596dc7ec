pub mod migrate;
pub mod theme;

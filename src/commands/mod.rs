pub mod info;
pub mod theme;

pub mod font;
pub mod gradient;
pub mod grid;
pub mod layout;
pub mod series;

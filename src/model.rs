pub mod cos;
pub mod fs;

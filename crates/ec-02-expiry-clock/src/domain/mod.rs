pub mod duration;
pub mod errors;
pub mod window;

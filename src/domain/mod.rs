pub mod assembler;
pub mod decoder;
pub mod detection;
pub mod errors;
pub mod frame;
pub mod geometry;
pub mod labels;
pub mod model;
pub mod preprocess;
pub mod stream;
pub mod suppression;

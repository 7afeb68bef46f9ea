pub mod background_model;
pub mod blob_extractor;
pub mod frame;
pub mod morphology;
pub mod smoother;
pub mod utils;

pub mod telemetry;
pub mod utils;

pub use utils::slugify;

mod health;
mod predict;

pub use health::health_router;
pub use predict::predict_router;

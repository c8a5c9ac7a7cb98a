pub mod models;
pub mod service;

pub use models::FanPhotoForm;
pub use service::*;

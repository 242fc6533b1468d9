pub mod camera;
pub mod error;
pub mod graphics;
pub mod i18n;
pub mod math;
pub mod navigation;
pub mod scene;
pub mod session;
pub mod state;
pub mod store;
pub mod vertex;
pub mod view;
pub mod widget;

pub use error::{Error, Result};

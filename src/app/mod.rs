pub mod effects;
pub mod model;
pub mod render;
pub mod store;
pub mod view;

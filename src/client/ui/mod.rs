mod history;
mod home;
mod quiz;
mod render;

pub use render::render;

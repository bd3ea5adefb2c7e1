pub mod renderer;
pub mod web;

pub use renderer::{Lookup, PageRenderer};
pub use web::WebDriverRenderer;

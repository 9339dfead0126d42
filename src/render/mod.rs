pub mod renderer;

pub use renderer::{CellKind, Renderer, caption, cell_kind};

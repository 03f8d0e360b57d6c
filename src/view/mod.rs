/// Terminal rendering layer. Draws the whole frame from application state;
/// holds no document data of its own.
pub mod renderer;

pub use renderer::Renderer;

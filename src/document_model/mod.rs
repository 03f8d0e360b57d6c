/// Document model - text data, cursor, selection, and the yank register.
pub mod registers;
pub mod text_buffer;
pub mod title_buffer;

pub use registers::YankRegister;
pub use text_buffer::TextBuffer;
pub use title_buffer::TitleBuffer;

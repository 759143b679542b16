pub mod edit;
pub mod init;
pub mod matrix;
pub mod templates;

pub use edit::{edit, EditArgs};
pub use init::{init, InitArgs};
pub use matrix::{matrix, MatrixArgs};
pub use templates::{templates, TemplatesArgs};

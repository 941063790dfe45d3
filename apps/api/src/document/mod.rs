pub mod edit;
pub mod session;

pub use edit::DocumentEdit;
pub use session::EditorSession;

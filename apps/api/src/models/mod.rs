pub mod document;
pub mod record;

pub use document::{
    Achievement, Certification, DocumentModel, DocumentType, Education, Experience, Project,
};
pub use record::{DocumentRecord, DocumentRow};

//! Editor session: the working draft, the active template and a pending photo.
//!
//! The session owns the draft. Edits mutate it synchronously; switching the
//! template changes the document type used for saving and for export names.

use crate::document::edit::{DocumentEdit, EditError};
use crate::errors::AppError;
use crate::layout::{render, Layout, Template};
use crate::models::DocumentModel;
use crate::store::gateway::{validate_for_save, ProfileImageUpload};

/// Everything a save needs, validated.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub model: DocumentModel,
    pub image: Option<ProfileImageUpload>,
}

#[derive(Debug, Clone)]
pub struct EditorSession {
    model: DocumentModel,
    active: Template,
    pending_image: Option<ProfileImageUpload>,
}

impl EditorSession {
    /// Opens a draft with the template matching its document type.
    pub fn from_model(model: DocumentModel) -> Self {
        Self {
            active: model.document_type.into(),
            model,
            pending_image: None,
        }
    }

    pub fn apply(&mut self, edit: DocumentEdit) -> Result<(), EditError> {
        edit.apply(&mut self.model)
    }

    pub fn switch_template(&mut self, template: Template) {
        self.active = template;
        self.model.document_type = template.document_type();
    }

    /// Holds the photo until the next save.
    pub fn attach_image(&mut self, upload: ProfileImageUpload) {
        self.pending_image = Some(upload);
    }

    pub fn preview(&self) -> Layout {
        render(&self.model, self.active)
    }

    /// Validates the draft and packages it for the store. The draft is left untouched.
    pub fn prepare_save(&self) -> Result<SaveRequest, AppError> {
        validate_for_save(&self.model)?;
        Ok(SaveRequest {
            model: self.model.clone(),
            image: self.pending_image.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::edit::PersonalField;
    use crate::layout::SectionKind;
    use crate::models::DocumentType;
    use crate::render::{export_file_name, ExportFormat};

    fn session(document_type: DocumentType) -> EditorSession {
        EditorSession::from_model(DocumentModel::empty("user_1", document_type))
    }

    fn set_name(session: &mut EditorSession, name: &str) {
        session
            .apply(DocumentEdit::SetPersonal {
                field: PersonalField::FullName,
                value: name.to_string(),
            })
            .unwrap();
    }

    #[test]
    fn test_template_follows_document_type() {
        let resume = session(DocumentType::Resume);
        assert_eq!(resume.preview().template, Template::Resume);
        assert!(session(DocumentType::Cv).preview().sections.is_empty());
    }

    #[test]
    fn test_switch_template_changes_type_and_file_name() {
        let mut s = session(DocumentType::Cv);
        set_name(&mut s, "Ada Lovelace");
        s.switch_template(Template::Resume);
        let request = s.prepare_save().unwrap();
        assert_eq!(request.model.document_type, DocumentType::Resume);
        assert_eq!(
            export_file_name(&request.model, ExportFormat::Png),
            "resume-Ada Lovelace.png"
        );
    }

    #[test]
    fn test_preview_follows_edits() {
        let mut s = session(DocumentType::Cv);
        s.apply(DocumentEdit::SetSummary {
            value: "Mathematician".to_string(),
        })
        .unwrap();
        assert!(s.preview().section(SectionKind::Summary).is_some());
        s.switch_template(Template::Resume);
        assert!(s.preview().section(SectionKind::Summary).is_none());
    }

    #[test]
    fn test_prepare_save_requires_name() {
        assert!(matches!(
            session(DocumentType::Cv).prepare_save(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_prepare_save_carries_pending_image() {
        let mut s = session(DocumentType::Cv);
        set_name(&mut s, "Ada Lovelace");
        assert!(s.prepare_save().unwrap().image.is_none());
        let upload = ProfileImageUpload {
            content_type: "image/png".to_string(),
            bytes: bytes::Bytes::from_static(&[1, 2, 3]),
        };
        s.attach_image(upload.clone());
        assert_eq!(s.prepare_save().unwrap().image, Some(upload));
    }
}

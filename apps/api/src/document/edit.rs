//! Typed edit operations on a `DocumentModel`.
//!
//! Each form interaction maps to one `DocumentEdit` variant: replace a single field,
//! append a blank list item, or remove an item by index. Edits are applied
//! synchronously and in order.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::AppError;
use crate::models::{
    Achievement, Certification, DocumentModel, Education, Experience, Project,
};

// ────────────────────────────────────────────────────────────────────────────
// Edit vocabulary
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PersonalField {
    FullName,
    Email,
    Phone,
    Address,
    Website,
    Linkedin,
    Github,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkillCategory {
    Technical,
    #[serde(rename = "languages")]
    SpokenLanguages,
    Frameworks,
    Tools,
    Soft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListSection {
    Experience,
    Education,
    Projects,
    Certifications,
    Achievements,
}

impl ListSection {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListSection::Experience => "experience",
            ListSection::Education => "education",
            ListSection::Projects => "projects",
            ListSection::Certifications => "certifications",
            ListSection::Achievements => "achievements",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum ExperienceChange {
    JobTitle(String),
    Company(String),
    Location(String),
    StartDate(String),
    EndDate(String),
    Current(bool),
    Description(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum EducationChange {
    Degree(String),
    Institution(String),
    Location(String),
    StartDate(String),
    EndDate(String),
    #[serde(rename = "gpa")]
    Score(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum ProjectChange {
    Title(String),
    Description(String),
    /// Raw comma-separated input, split into the technology list.
    Technologies(String),
    StartDate(String),
    EndDate(String),
    Url(String),
    #[serde(rename = "github")]
    RepoUrl(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum CertificationChange {
    Name(String),
    Issuer(String),
    Date(String),
    Url(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum AchievementChange {
    Title(String),
    Description(String),
    Date(String),
}

/// One user-initiated mutation of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DocumentEdit {
    SetPersonal { field: PersonalField, value: String },
    ClearProfileImage,
    SetSummary { value: String },
    /// Raw text split on commas and newlines into the category's list.
    SetSkills { category: SkillCategory, raw: String },
    AddItem { section: ListSection },
    RemoveItem { section: ListSection, index: usize },
    UpdateExperience { index: usize, change: ExperienceChange },
    UpdateEducation { index: usize, change: EducationChange },
    UpdateProject { index: usize, change: ProjectChange },
    UpdateCertification { index: usize, change: CertificationChange },
    UpdateAchievement { index: usize, change: AchievementChange },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("{section} has no item at index {index} (length {len})")]
    IndexOutOfRange {
        section: &'static str,
        index: usize,
        len: usize,
    },
}

impl From<EditError> for AppError {
    fn from(err: EditError) -> Self {
        AppError::Validation(err.to_string())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Application
// ────────────────────────────────────────────────────────────────────────────

impl DocumentEdit {
    pub fn apply(self, model: &mut DocumentModel) -> Result<(), EditError> {
        match self {
            DocumentEdit::SetPersonal { field, value } => {
                let info = &mut model.personal_info;
                let slot = match field {
                    PersonalField::FullName => &mut info.full_name,
                    PersonalField::Email => &mut info.email,
                    PersonalField::Phone => &mut info.phone,
                    PersonalField::Address => &mut info.address,
                    PersonalField::Website => &mut info.website,
                    PersonalField::Linkedin => &mut info.linkedin,
                    PersonalField::Github => &mut info.github,
                };
                *slot = value;
            }
            DocumentEdit::ClearProfileImage => model.personal_info.profile_image = None,
            DocumentEdit::SetSummary { value } => model.summary = value,
            DocumentEdit::SetSkills { category, raw } => {
                let skills = &mut model.skills;
                let slot = match category {
                    SkillCategory::Technical => &mut skills.technical,
                    SkillCategory::SpokenLanguages => &mut skills.spoken_languages,
                    SkillCategory::Frameworks => &mut skills.frameworks,
                    SkillCategory::Tools => &mut skills.tools,
                    SkillCategory::Soft => &mut skills.soft,
                };
                *slot = split_list(&raw, &[',', '\n']);
            }
            DocumentEdit::AddItem { section } => match section {
                ListSection::Experience => model.experience.push(Experience::default()),
                ListSection::Education => model.education.push(Education::default()),
                ListSection::Projects => model.projects.push(Project::default()),
                ListSection::Certifications => {
                    model.certifications.push(Certification::default())
                }
                ListSection::Achievements => model.achievements.push(Achievement::default()),
            },
            DocumentEdit::RemoveItem { section, index } => match section {
                ListSection::Experience => remove_at(&mut model.experience, section, index)?,
                ListSection::Education => remove_at(&mut model.education, section, index)?,
                ListSection::Projects => remove_at(&mut model.projects, section, index)?,
                ListSection::Certifications => {
                    remove_at(&mut model.certifications, section, index)?
                }
                ListSection::Achievements => remove_at(&mut model.achievements, section, index)?,
            },
            DocumentEdit::UpdateExperience { index, change } => {
                let item = item_mut(&mut model.experience, ListSection::Experience, index)?;
                match change {
                    ExperienceChange::JobTitle(v) => item.job_title = v,
                    ExperienceChange::Company(v) => item.company = v,
                    ExperienceChange::Location(v) => item.location = v,
                    ExperienceChange::StartDate(v) => item.start_date = v,
                    ExperienceChange::EndDate(v) => item.end_date = v,
                    ExperienceChange::Current(v) => item.current = v,
                    ExperienceChange::Description(v) => item.description = v,
                }
            }
            DocumentEdit::UpdateEducation { index, change } => {
                let item = item_mut(&mut model.education, ListSection::Education, index)?;
                match change {
                    EducationChange::Degree(v) => item.degree = v,
                    EducationChange::Institution(v) => item.institution = v,
                    EducationChange::Location(v) => item.location = v,
                    EducationChange::StartDate(v) => item.start_date = v,
                    EducationChange::EndDate(v) => item.end_date = v,
                    EducationChange::Score(v) => item.score = v,
                }
            }
            DocumentEdit::UpdateProject { index, change } => {
                let item = item_mut(&mut model.projects, ListSection::Projects, index)?;
                match change {
                    ProjectChange::Title(v) => item.title = v,
                    ProjectChange::Description(v) => item.description = v,
                    ProjectChange::Technologies(raw) => {
                        item.technologies = split_list(&raw, &[','])
                    }
                    ProjectChange::StartDate(v) => item.start_date = v,
                    ProjectChange::EndDate(v) => item.end_date = v,
                    ProjectChange::Url(v) => item.url = v,
                    ProjectChange::RepoUrl(v) => item.repo_url = v,
                }
            }
            DocumentEdit::UpdateCertification { index, change } => {
                let item =
                    item_mut(&mut model.certifications, ListSection::Certifications, index)?;
                match change {
                    CertificationChange::Name(v) => item.name = v,
                    CertificationChange::Issuer(v) => item.issuer = v,
                    CertificationChange::Date(v) => item.date = v,
                    CertificationChange::Url(v) => item.url = v,
                }
            }
            DocumentEdit::UpdateAchievement { index, change } => {
                let item = item_mut(&mut model.achievements, ListSection::Achievements, index)?;
                match change {
                    AchievementChange::Title(v) => item.title = v,
                    AchievementChange::Description(v) => item.description = v,
                    AchievementChange::Date(v) => item.date = v,
                }
            }
        }
        Ok(())
    }
}

/// Splits free-form list input, trimming entries and dropping empties.
pub fn split_list(raw: &str, separators: &[char]) -> Vec<String> {
    raw.split(|c| separators.contains(&c))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn item_mut<T>(list: &mut [T], section: ListSection, index: usize) -> Result<&mut T, EditError> {
    let len = list.len();
    list.get_mut(index).ok_or(EditError::IndexOutOfRange {
        section: section.as_str(),
        index,
        len,
    })
}

fn remove_at<T>(list: &mut Vec<T>, section: ListSection, index: usize) -> Result<(), EditError> {
    if index >= list.len() {
        return Err(EditError::IndexOutOfRange {
            section: section.as_str(),
            index,
            len: list.len(),
        });
    }
    list.remove(index);
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

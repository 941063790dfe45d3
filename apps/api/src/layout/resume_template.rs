//! Resume template: centered contact header, skills summary first, no summary text.

use crate::layout::cv_template::NAME_PLACEHOLDER;
use crate::layout::format::{bullet_lines, format_month, format_range, join_list, non_blank};
use crate::layout::template::Template;
use crate::layout::tree::{
    Block, Emphasis, Entry, Header, Labeled, Layout, Line, Section, SectionKind,
};
use crate::models::DocumentModel;

pub fn render(model: &DocumentModel) -> Layout {
    let sections = [
        skills(model),
        projects(model),
        certifications(model),
        achievements(model),
        education(model),
        experience(model),
    ]
    .into_iter()
    .flatten()
    .collect();

    Layout {
        template: Template::Resume,
        header: header(model),
        sections,
    }
}

/// Contact rows always render; empty fields show a placeholder hint.
fn header(model: &DocumentModel) -> Header {
    let info = &model.personal_info;
    let or = |value: &str, placeholder: &str| {
        non_blank(value).unwrap_or_else(|| placeholder.to_string())
    };
    let name = non_blank(&info.full_name).unwrap_or_else(|| NAME_PLACEHOLDER.to_string());

    Header::Centered {
        name: name.to_uppercase(),
        rows: vec![
            vec![
                Labeled::link("LinkedIn", or(&info.linkedin, "linkedin.com/in/username")),
                Labeled::new("Email", or(&info.email, "email@example.com")),
            ],
            vec![
                Labeled::link("GitHub", or(&info.github, "github.com/username")),
                Labeled::new("Mobile", or(&info.phone, "+1-234-567-8900")),
            ],
            vec![Labeled::link(
                "Digital Portfolio",
                or(&info.website, "portfolio.com"),
            )],
        ],
    }
}

fn section(kind: SectionKind, heading: &str, blocks: Vec<Block>) -> Option<Section> {
    (!blocks.is_empty()).then(|| Section {
        kind,
        heading: heading.to_string(),
        blocks,
    })
}

fn aside(text: String) -> Vec<String> {
    non_blank(&text).into_iter().collect()
}

fn skills(model: &DocumentModel) -> Option<Section> {
    let skills = &model.skills;
    if skills.is_empty() {
        return None;
    }
    let blocks = [
        ("Languages", &skills.technical),
        ("Frameworks", &skills.frameworks),
        ("Tools/Platforms", &skills.tools),
        ("Spoken Languages", &skills.spoken_languages),
        ("Soft Skills", &skills.soft),
    ]
    .into_iter()
    .filter(|(_, values)| !values.is_empty())
    .map(|(label, values)| Block::Field(Labeled::new(label, join_list(values))))
    .collect();
    section(SectionKind::Skills, "SKILLS", blocks)
}

fn projects(model: &DocumentModel) -> Option<Section> {
    let blocks = model
        .projects
        .iter()
        .map(|project| {
            let description = non_blank(&project.description);
            let mut lines = Vec::new();
            if let Some(text) = &description {
                lines.push(Line::Bullet { text: text.clone() });
            }
            if !project.technologies.is_empty() {
                lines.push(Line::Field(Labeled::new(
                    "Tech",
                    join_list(&project.technologies),
                )));
            }
            if let Some(url) = non_blank(&project.url) {
                lines.push(Line::Field(Labeled::link("Live Project", url)));
            }
            Block::Entry(Entry {
                title: format!("{}:", project.title.trim()),
                title_suffix: description,
                emphasis: Emphasis::Accent,
                aside: aside(format_range(&project.start_date, &project.end_date, false)),
                lines,
                ..Default::default()
            })
        })
        .collect();
    section(SectionKind::Projects, "PROJECTS", blocks)
}

fn certifications(model: &DocumentModel) -> Option<Section> {
    let blocks = model
        .certifications
        .iter()
        .map(|cert| {
            Block::Entry(Entry {
                title: cert.name.trim().to_string(),
                subtitle: non_blank(&cert.issuer),
                aside: aside(format_month(&cert.date)),
                ..Default::default()
            })
        })
        .collect();
    section(SectionKind::Certifications, "CERTIFICATES", blocks)
}

fn achievements(model: &DocumentModel) -> Option<Section> {
    let blocks = model
        .achievements
        .iter()
        .map(|achievement| {
            Block::Entry(Entry {
                title: format!("{}:", achievement.title.trim()),
                emphasis: Emphasis::Accent,
                aside: aside(format_month(&achievement.date)),
                lines: non_blank(&achievement.description)
                    .map(|text| vec![Line::Bullet { text }])
                    .unwrap_or_default(),
                ..Default::default()
            })
        })
        .collect();
    section(SectionKind::Achievements, "ACHIEVEMENTS", blocks)
}

fn education(model: &DocumentModel) -> Option<Section> {
    let blocks = model
        .education
        .iter()
        .map(|edu| {
            let mut aside = aside(format_range(&edu.start_date, &edu.end_date, false));
            if let Some(score) = non_blank(&edu.score) {
                aside.push(format!("CGPA: {score}"));
            }
            Block::Entry(Entry {
                title: edu.institution.trim().to_string(),
                emphasis: Emphasis::Accent,
                subtitle: non_blank(&edu.degree),
                detail: non_blank(&edu.location),
                aside,
                ..Default::default()
            })
        })
        .collect();
    section(SectionKind::Education, "EDUCATION", blocks)
}

fn experience(model: &DocumentModel) -> Option<Section> {
    let blocks = model
        .experience
        .iter()
        .map(|exp| {
            Block::Entry(Entry {
                title: exp.company.trim().to_string(),
                emphasis: Emphasis::Accent,
                subtitle: non_blank(&exp.job_title),
                detail: non_blank(&exp.location),
                aside: aside(format_range(&exp.start_date, &exp.end_date, exp.current)),
                lines: bullet_lines(&exp.description)
                    .into_iter()
                    .map(|text| Line::Bullet { text })
                    .collect(),
                ..Default::default()
            })
        })
        .collect();
    section(SectionKind::Experience, "EXPERIENCE", blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentType, Education, Experience};

    fn model() -> DocumentModel {
        DocumentModel::empty("user_1", DocumentType::Resume)
    }

    #[test]
    fn test_resume_never_shows_summary() {
        let mut m = model();
        m.summary = "Engineer".to_string();
        let layout = render(&m);
        assert!(layout.section(SectionKind::Summary).is_none());
        assert!(layout.sections.is_empty());
    }

    #[test]
    fn test_header_uses_placeholders_for_empty_contact() {
        let Header::Centered { name, rows } = render(&model()).header else {
            panic!("expected centered header");
        };
        assert_eq!(name, NAME_PLACEHOLDER);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0].value, "linkedin.com/in/username");
        assert_eq!(rows[1][1].value, "+1-234-567-8900");
    }

    #[test]
    fn test_skills_lead_the_resume() {
        let mut m = model();
        m.experience.push(Experience {
            company: "Acme".into(),
            ..Default::default()
        });
        m.skills.tools = vec!["Docker".into(), "Git".into()];
        let layout = render(&m);
        assert_eq!(
            layout.section_kinds(),
            vec![SectionKind::Skills, SectionKind::Experience]
        );
        assert_eq!(
            layout.sections[0].blocks,
            vec![Block::Field(Labeled::new("Tools/Platforms", "Docker, Git"))]
        );
    }

    #[test]
    fn test_education_leads_with_institution_and_score_aside() {
        let mut m = model();
        m.education.push(Education {
            degree: "BSc Mathematics".into(),
            institution: "University of London".into(),
            start_date: "2015-09".into(),
            end_date: "2018-06".into(),
            score: "3.8".into(),
            ..Default::default()
        });
        let layout = render(&m);
        let Block::Entry(entry) = &layout.section(SectionKind::Education).unwrap().blocks[0]
        else {
            panic!("expected entry");
        };
        assert_eq!(entry.title, "University of London");
        assert_eq!(entry.subtitle.as_deref(), Some("BSc Mathematics"));
        assert_eq!(
            entry.aside,
            vec!["Sep 2015 - Jun 2018".to_string(), "CGPA: 3.8".to_string()]
        );
    }
}

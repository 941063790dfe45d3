//! CV template: photo and contact block first, experience last.

use crate::layout::format::{bullet_lines, format_month, format_range, join_list, non_blank};
use crate::layout::template::Template;
use crate::layout::tree::{Block, Entry, Header, Labeled, Layout, Line, Section, SectionKind};
use crate::models::DocumentModel;

pub(crate) const NAME_PLACEHOLDER: &str = "FULL NAME";

pub fn render(model: &DocumentModel) -> Layout {
    let sections = [
        summary(model),
        projects(model),
        education(model),
        additional_information(model),
        achievements(model),
        experience(model),
    ]
    .into_iter()
    .flatten()
    .collect();

    Layout {
        template: Template::Cv,
        header: header(model),
        sections,
    }
}

fn header(model: &DocumentModel) -> Header {
    let info = &model.personal_info;
    let name = non_blank(&info.full_name).unwrap_or_else(|| NAME_PLACEHOLDER.to_string());

    let mut contact = Vec::new();
    if let Some(address) = non_blank(&info.address) {
        contact.push(Labeled::new("Address", address));
    }
    if let Some(phone) = non_blank(&info.phone) {
        contact.push(Labeled::new("Phone", phone));
    }
    if let Some(email) = non_blank(&info.email) {
        contact.push(Labeled::new("Email", email));
    }
    if let Some(website) = non_blank(&info.website) {
        contact.push(Labeled::link("Website", website));
    }

    Header::PhotoAndContact {
        name: name.to_uppercase(),
        photo: info.profile_image.clone().filter(|uri| !uri.is_empty()),
        contact,
    }
}

fn section(kind: SectionKind, heading: &str, blocks: Vec<Block>) -> Option<Section> {
    (!blocks.is_empty()).then(|| Section {
        kind,
        heading: heading.to_string(),
        blocks,
    })
}

fn summary(model: &DocumentModel) -> Option<Section> {
    let text = non_blank(&model.summary)?;
    section(
        SectionKind::Summary,
        "SUMMARY",
        vec![Block::Paragraph { text }],
    )
}

fn projects(model: &DocumentModel) -> Option<Section> {
    let blocks = model
        .projects
        .iter()
        .map(|project| {
            let mut lines = Vec::new();
            if !project.technologies.is_empty() {
                lines.push(Line::Field(Labeled::new(
                    "Technologies",
                    join_list(&project.technologies),
                )));
            }
            let mut links = Vec::new();
            if let Some(url) = non_blank(&project.url) {
                links.push(Labeled::link("Live Project", url));
            }
            if let Some(repo) = non_blank(&project.repo_url) {
                links.push(Labeled::link("Tech", repo));
            }
            if !links.is_empty() {
                lines.push(Line::Fields { items: links });
            }
            Block::Entry(Entry {
                title: project.title.trim().to_string(),
                subtitle: non_blank(&project.description),
                aside: non_blank(&format_range(&project.start_date, &project.end_date, false))
                    .into_iter()
                    .collect(),
                lines,
                ..Default::default()
            })
        })
        .collect();
    section(SectionKind::Projects, "PROJECTS", blocks)
}

fn education(model: &DocumentModel) -> Option<Section> {
    let blocks = model
        .education
        .iter()
        .map(|edu| {
            let lines = non_blank(&edu.score)
                .map(|score| vec![Line::Field(Labeled::new("Percentage", score))])
                .unwrap_or_default();
            Block::Entry(Entry {
                title: edu.degree.trim().to_string(),
                subtitle: non_blank(&edu.institution),
                detail: non_blank(&edu.location),
                aside: non_blank(&format_range(&edu.start_date, &edu.end_date, false))
                    .into_iter()
                    .collect(),
                lines,
                ..Default::default()
            })
        })
        .collect();
    section(SectionKind::Education, "EDUCATION", blocks)
}

fn additional_information(model: &DocumentModel) -> Option<Section> {
    let skills = &model.skills;
    let certifications: Vec<String> = model
        .certifications
        .iter()
        .filter_map(|c| non_blank(&c.name))
        .collect();

    let blocks = [
        ("Technical Skills", &skills.technical),
        ("Languages", &skills.spoken_languages),
        ("Frameworks", &skills.frameworks),
        ("Tools & Platforms", &skills.tools),
        ("Soft Skills", &skills.soft),
        ("Certifications", &certifications),
    ]
    .into_iter()
    .filter(|(_, values)| !values.is_empty())
    .map(|(label, values)| Block::Field(Labeled::new(label, join_list(values))))
    .collect();

    section(
        SectionKind::AdditionalInformation,
        "ADDITIONAL INFORMATION",
        blocks,
    )
}

fn achievements(model: &DocumentModel) -> Option<Section> {
    let blocks = model
        .achievements
        .iter()
        .map(|achievement| Block::Entry(Entry {
            title: achievement.title.trim().to_string(),
            aside: non_blank(&format_month(&achievement.date)).into_iter().collect(),
            lines: non_blank(&achievement.description)
                .map(|text| vec![Line::Text { text }])
                .unwrap_or_default(),
            ..Default::default()
        }))
        .collect();
    section(SectionKind::Achievements, "ACHIEVEMENTS", blocks)
}

fn experience(model: &DocumentModel) -> Option<Section> {
    let blocks = model
        .experience
        .iter()
        .map(|exp| {
            Block::Entry(Entry {
                title: exp.job_title.trim().to_string(),
                subtitle: non_blank(&exp.company),
                detail: non_blank(&exp.location),
                aside: non_blank(&format_range(&exp.start_date, &exp.end_date, exp.current))
                    .into_iter()
                    .collect(),
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

//! Static HTML fragment rendering.
//!
//! Renders the project and publication listings into standalone HTML
//! fragments under `_fragments/`, from the generated JSON mirrors. The
//! page shells include these fragments; all interpolation goes through
//! maud, so every record field arrives escaped.
//!
//! Interactive behavior is modeled as explicit state values,
//! [`ModalState`] and [`CarouselState`], owned by the fragment being
//! rendered. The initial render consumes the same state a client
//! toggles later, so the markup and the state machine can't drift
//! apart.

use crate::types::{Paper, Project};
use maud::{Markup, html};
use std::cmp::Reverse;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FragmentsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Detail-overlay state: at most one overlay open at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModalState {
    #[default]
    Closed,
    Open(String),
}

impl ModalState {
    /// Open an overlay, replacing any currently open one.
    pub fn open(&mut self, id: &str) {
        *self = ModalState::Open(id.to_string());
    }

    pub fn close(&mut self) {
        *self = ModalState::Closed;
    }

    pub fn open_id(&self) -> Option<&str> {
        match self {
            ModalState::Open(id) => Some(id),
            ModalState::Closed => None,
        }
    }
}

/// Paged-carousel state: a window of `per_page` items over `count`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarouselState {
    page: usize,
    per_page: usize,
    count: usize,
}

impl CarouselState {
    pub fn new(count: usize, viewport_width: u32) -> Self {
        CarouselState {
            page: 0,
            per_page: per_page_for(viewport_width),
            count,
        }
    }

    /// Last valid page index; a short or empty list still has page 0.
    pub fn max_page(&self) -> usize {
        if self.count == 0 {
            return 0;
        }
        (self.count - 1) / self.per_page
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn next(&mut self) {
        self.page = (self.page + 1).min(self.max_page());
    }

    pub fn prev(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    /// Recompute the page size for a new viewport width and re-clamp
    /// the current page so it stays valid.
    pub fn set_viewport(&mut self, width: u32) {
        self.per_page = per_page_for(width);
        self.page = self.page.min(self.max_page());
    }

    /// Items visible on the current page.
    pub fn page_slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.page * self.per_page).min(items.len());
        let end = (start + self.per_page).min(items.len());
        &items[start..end]
    }
}

fn per_page_for(width: u32) -> usize {
    if width < 768 {
        1
    } else if width < 1200 {
        2
    } else {
        3
    }
}

/// Desktop width used for the build-time initial render.
const DEFAULT_VIEWPORT: u32 = 1280;

/// Render both fragments from the JSON mirrors in `json_dir`.
pub fn generate_all(json_dir: &Path, fragments_dir: &Path) -> Result<(), FragmentsError> {
    fs::create_dir_all(fragments_dir)?;

    let projects_markup = match load_json::<Vec<Project>>(&json_dir.join("projects.json")) {
        Some(mut projects) => {
            projects.sort_by_key(|p| Reverse(p.year));
            render_projects(&projects)
        }
        None => unavailable("Projects"),
    };
    fs::write(fragments_dir.join("projects.html"), projects_markup.into_string())?;
    println!("  + projects.html");

    let papers_markup = match load_json::<Vec<Paper>>(&json_dir.join("publications.json")) {
        Some(mut papers) => {
            papers.sort_by_key(|p| Reverse(p.year));
            render_papers(&papers)
        }
        None => unavailable("Publications"),
    };
    fs::write(fragments_dir.join("papers.html"), papers_markup.into_string())?;
    println!("  + papers.html");

    Ok(())
}

/// Unreadable or unparseable input never aborts the build; the page
/// shows a placeholder instead.
fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(err) => {
            eprintln!("  warning: could not read {}: {err}", path.display());
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(err) => {
            eprintln!("  warning: could not parse {}: {err}", path.display());
            None
        }
    }
}

fn unavailable(what: &str) -> Markup {
    html! {
        p class="load-error" { (what) " are temporarily unavailable." }
    }
}

pub fn render_projects(projects: &[Project]) -> Markup {
    if projects.is_empty() {
        return html! { p class="empty-message" { "No projects found." } };
    }
    let (featured, rest): (Vec<&Project>, Vec<&Project>) =
        projects.iter().partition(|p| p.is_featured());
    let modal = ModalState::default();

    html! {
        @if !featured.is_empty() {
            section id="featured-projects" class="featured-projects" {
                @for project in &featured {
                    (project_card(project))
                }
            }
        }
        section id="project-grid" class="project-grid" {
            @for project in &rest {
                (project_card(project))
            }
        }
        @for project in projects {
            (project_overlay(project, &modal))
        }
    }
}

fn project_card(project: &Project) -> Markup {
    html! {
        article class="project-card" tabindex="0"
            data-modal-target=(project.id)
            data-category=(project.filter_category()) {
            @if let Some(image) = &project.image {
                img src=(image) alt=(project.image_alt.as_deref().unwrap_or(&project.title))
                    loading="lazy";
            }
            h3 { (project.title) }
            p class="project-category" { (project.category_label()) }
            @if let Some(context) = project.context_line() {
                p class="project-context" { (context) }
            }
            @if let Some(year) = project.year {
                span class="project-year" { (year) }
            }
            @if let Some(award) = project.award.as_ref().and_then(|a| a.label()) {
                span class="award-badge" { (award) }
            }
        }
    }
}

fn project_overlay(project: &Project, modal: &ModalState) -> Markup {
    let open = modal.open_id() == Some(project.id.as_str());
    html! {
        div class="modal" id={ "modal-" (project.id) } hidden[!open] {
            div class="modal-content" role="dialog" aria-label=(project.title) {
                button class="modal-close" data-modal-close { "\u{00d7}" }
                h2 { (project.title) }
                @if let Some(context) = project.context_line() {
                    p class="project-context" { (context) }
                }
                @if let Some(description) = &project.description {
                    p { (description) }
                }
                @if !project.technologies.is_empty() {
                    ul class="tech-list" {
                        @for tech in &project.technologies {
                            li { (tech) }
                        }
                    }
                }
                div class="modal-links" {
                    @if let Some(url) = &project.links.github {
                        a class="button" href=(url) { "GitHub" }
                    }
                    @if let Some(url) = &project.links.devpost {
                        a class="button" href=(url) { "Devpost" }
                    }
                    @if let Some(url) = &project.links.video {
                        a class="button" href=(url) { "Video" }
                    }
                    @if let Some(url) = &project.links.news {
                        a class="button" href=(url) { "News" }
                    }
                }
            }
        }
    }
}

pub fn render_papers(papers: &[Paper]) -> Markup {
    if papers.is_empty() {
        return html! { p class="empty-message" { "No publications found." } };
    }
    let (featured, rest): (Vec<&Paper>, Vec<&Paper>) =
        papers.iter().partition(|p| p.featured);
    let modal = ModalState::default();

    html! {
        @if !featured.is_empty() {
            section id="featured-papers" class="paper-carousel" {
                (paper_carousel(&featured))
            }
        }
        section id="paper-list" class="paper-list" {
            @for paper in &rest {
                (paper_card(paper))
            }
        }
        @for paper in papers {
            (paper_overlay(paper, &modal))
        }
    }
}

/// Featured papers are paged; the initial render shows the first page
/// at the desktop breakpoint, the rest land on later pages.
fn paper_carousel(featured: &[&Paper]) -> Markup {
    let mut state = CarouselState::new(featured.len(), DEFAULT_VIEWPORT);
    let mut pages = Vec::new();
    loop {
        let page = state.page();
        pages.push(html! {
            div class="carousel-page" data-carousel-page=(page) hidden[page != 0] {
                @for paper in state.page_slice(featured) {
                    (paper_card(paper))
                }
            }
        });
        if page == state.max_page() {
            break;
        }
        state.next();
    }
    html! {
        @for page in pages {
            (page)
        }
    }
}

fn paper_card(paper: &Paper) -> Markup {
    html! {
        article class="paper-card" tabindex="0" data-modal-target=(paper.id) {
            @if let Some(image) = &paper.image {
                img src=(image) alt=(paper.title) loading="lazy";
            }
            h3 { (paper.title) }
            @if !paper.authors.is_empty() {
                p class="paper-authors" { (paper.authors.join(", ")) }
            }
            p class="paper-venue" {
                @if let Some(venue) = &paper.venue { (venue) }
                @if let Some(year) = paper.year { " (" (year) ")" }
            }
            @if let Some(award) = paper.award.as_ref().and_then(|a| a.label()) {
                span class="award-badge" { (award) }
            }
        }
    }
}

fn paper_overlay(paper: &Paper, modal: &ModalState) -> Markup {
    let open = modal.open_id() == Some(paper.id.as_str());
    html! {
        div class="modal" id={ "modal-" (paper.id) } hidden[!open] {
            div class="modal-content" role="dialog" aria-label=(paper.title) {
                button class="modal-close" data-modal-close { "\u{00d7}" }
                h2 { (paper.title) }
                @if let Some(abstract_text) = &paper.abstract_text {
                    p class="paper-abstract" { (abstract_text) }
                }
                div class="modal-links" {
                    @if let Some(url) = paper.usable_url() {
                        a class="button" href=(url) { "Paper" }
                    }
                    @if let Some(url) = &paper.pdf {
                        a class="button" href=(url) { "PDF" }
                    }
                    @if let Some(url) = &paper.code {
                        a class="button" href=(url) { "Code" }
                    }
                }
                @if let Some(bibtex) = &paper.bibtex {
                    pre class="bibtex" { code { (bibtex) } }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project(id: &str, year: i64, featured: bool) -> Project {
        Project {
            id: id.to_string(),
            title: format!("Project {id}"),
            project_type: "personal".to_string(),
            year: Some(year),
            featured,
            ..Project::default()
        }
    }

    #[test]
    fn modal_open_replaces_and_close_resets() {
        let mut modal = ModalState::default();
        assert_eq!(modal.open_id(), None);
        modal.open("a");
        modal.open("b");
        assert_eq!(modal.open_id(), Some("b"));
        modal.close();
        assert_eq!(modal, ModalState::Closed);
        modal.close(); // close from closed is fine
    }

    #[test]
    fn carousel_clamps_at_both_ends() {
        let mut carousel = CarouselState::new(7, 1280); // 3 per page
        assert_eq!(carousel.max_page(), 2);
        carousel.prev();
        assert_eq!(carousel.page(), 0);
        carousel.next();
        carousel.next();
        carousel.next();
        assert_eq!(carousel.page(), 2);
    }

    #[test]
    fn carousel_reclamps_on_viewport_change() {
        let mut carousel = CarouselState::new(4, 500); // 1 per page
        carousel.next();
        carousel.next();
        carousel.next();
        assert_eq!(carousel.page(), 3);
        carousel.set_viewport(1280); // 3 per page, max page 1
        assert_eq!(carousel.page(), 1);
    }

    #[test]
    fn carousel_empty_list_stays_on_page_zero() {
        let carousel = CarouselState::new(0, 1280);
        assert_eq!(carousel.max_page(), 0);
        let empty: &[u8] = &[];
        assert!(carousel.page_slice(empty).is_empty());
    }

    #[test]
    fn carousel_slices_pages() {
        let items: Vec<u32> = (0..7).collect();
        let mut carousel = CarouselState::new(items.len(), 1280);
        assert_eq!(carousel.page_slice(&items), &[0, 1, 2]);
        carousel.next();
        assert_eq!(carousel.page_slice(&items), &[3, 4, 5]);
        carousel.next();
        assert_eq!(carousel.page_slice(&items), &[6]);
    }

    #[test]
    fn projects_markup_escapes_fields() {
        let mut p = project("xss", 2024, false);
        p.title = "<script>alert(1)</script>".to_string();
        let markup = render_projects(&[p]).into_string();
        assert!(!markup.contains("<script>alert"));
        assert!(markup.contains("&lt;script&gt;"));
    }

    #[test]
    fn featured_projects_split_from_grid() {
        let markup = render_projects(&[
            project("a", 2024, true),
            project("b", 2023, false),
        ])
        .into_string();
        assert!(markup.contains("featured-projects"));
        assert!(markup.contains("project-grid"));
        assert!(markup.contains("data-modal-target=\"a\""));
        assert!(markup.contains("id=\"modal-a\""));
        assert!(markup.contains("id=\"modal-b\""));
        assert!(markup.contains("tabindex=\"0\""));
    }

    #[test]
    fn empty_lists_render_messages() {
        assert!(render_projects(&[]).into_string().contains("No projects found."));
        assert!(render_papers(&[]).into_string().contains("No publications found."));
    }

    #[test]
    fn bad_json_writes_placeholder_fragment() {
        let tmp = TempDir::new().unwrap();
        let json_dir = tmp.path().join("json");
        let fragments_dir = tmp.path().join("_fragments");
        fs::create_dir_all(&json_dir).unwrap();
        fs::write(json_dir.join("projects.json"), "{ not json").unwrap();

        generate_all(&json_dir, &fragments_dir).unwrap();

        let projects = fs::read_to_string(fragments_dir.join("projects.html")).unwrap();
        assert!(projects.contains("temporarily unavailable"));
        // publications.json missing entirely gets the same treatment
        let papers = fs::read_to_string(fragments_dir.join("papers.html")).unwrap();
        assert!(papers.contains("temporarily unavailable"));
    }

    #[test]
    fn paper_carousel_pages_featured_records() {
        let papers: Vec<Paper> = (0..5)
            .map(|i| Paper {
                id: format!("p{i}"),
                title: format!("Paper {i}"),
                year: Some(2020 + i),
                featured: true,
                ..Paper::default()
            })
            .collect();
        let markup = render_papers(&papers).into_string();
        assert!(markup.contains("data-carousel-page=\"0\""));
        assert!(markup.contains("data-carousel-page=\"1\""));
        assert!(!markup.contains("data-carousel-page=\"2\""));
    }
}

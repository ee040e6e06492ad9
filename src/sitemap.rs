//! Sitemap generation.
//!
//! Writes `sitemap.xml` for the site's fixed page list. Each entry's
//! `<lastmod>` comes from the git history of the page's source file
//! (last commit date), so the sitemap reflects real edits rather than
//! build times. Files with no history, or a tree that isn't a git
//! checkout at all, fall back to the current date.

use chrono::Local;
use std::fs;
use std::path::Path;
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SitemapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One sitemap entry: site-relative URL, the source file whose git
/// history dates it, and the fixed priority/frequency hints.
struct Page {
    loc: &'static str,
    source: &'static str,
    priority: &'static str,
    changefreq: &'static str,
}

const PAGES: &[Page] = &[
    Page { loc: "/", source: "index.html", priority: "1.0", changefreq: "monthly" },
    Page { loc: "/pages/news.html", source: "pages/news.html", priority: "0.8", changefreq: "weekly" },
    Page { loc: "/pages/projects.html", source: "pages/projects.html", priority: "0.8", changefreq: "monthly" },
    Page { loc: "/pages/research.html", source: "pages/research.html", priority: "0.9", changefreq: "monthly" },
    Page { loc: "/cv/", source: "cv/index.md", priority: "0.8", changefreq: "monthly" },
    Page { loc: "/404.html", source: "404.html", priority: "0.1", changefreq: "yearly" },
];

/// Generate `<root>/sitemap.xml` for `base_url`.
pub fn generate(root: &Path, base_url: &str) -> Result<(), SitemapError> {
    let base = base_url.trim_end_matches('/');
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");

    for page in PAGES {
        let lastmod = last_commit_date(root, page.source).unwrap_or_else(today);
        println!("  {} (lastmod {lastmod})", page.loc);
        xml.push_str("  <url>\n");
        xml.push_str(&format!(
            "    <loc>{}{}</loc>\n",
            escape_xml(base),
            escape_xml(page.loc)
        ));
        xml.push_str(&format!("    <lastmod>{lastmod}</lastmod>\n"));
        xml.push_str(&format!(
            "    <changefreq>{}</changefreq>\n",
            page.changefreq
        ));
        xml.push_str(&format!("    <priority>{}</priority>\n", page.priority));
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    fs::write(root.join("sitemap.xml"), xml)?;
    Ok(())
}

/// Date (`YYYY-MM-DD`) of the last commit touching `file`, or `None`
/// when git is unavailable, the tree isn't a checkout, or the file has
/// no history yet.
fn last_commit_date(root: &Path, file: &str) -> Option<String> {
    let output = Command::new("git")
        .args(["log", "-1", "--format=%cs", "--", file])
        .current_dir(root)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let date = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if date.is_empty() { None } else { Some(date) }
}

fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Escape the five XML-special characters for element text.
fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

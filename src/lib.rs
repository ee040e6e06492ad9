//! # Vita
//!
//! Build pipeline for a YAML-driven personal site and CV. Hand-edited YAML
//! category files are the data source; every command is a re-runnable batch
//! transform that derives one artifact from them:
//!
//! ```text
//! data/yaml/*.yaml ──┬─ convert ──→ data/json/*.json        (browser data)
//!                    ├─ combine ──→ data/combined-data.yaml (knowledge base)
//!                    ├─ posts ────→ cv/_posts/**/*.md       (dated posts)
//!                    ├─ llms ─────→ llms.txt                (AI digest)
//!                    └─ sitemap ──→ sitemap.xml             (git lastmod)
//! images/**          ── optimize ─→ images/** (+ YAML path rewrite)
//! data/json/*.json   ── fragments → _fragments/*.html       (site cards)
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`convert`] | YAML→JSON mirror of the data tree |
//! | [`combine`] | Assembles category files into one aggregate document |
//! | [`posts`] | Emits one front-matter post per publication/news/project |
//! | [`llms`] | Renders the llms.txt digest from the combined document |
//! | [`sitemap`] | sitemap.xml with per-page lastmod from git history |
//! | [`optimize`] | PNG→JPEG conversion, resizing, recompression, backups |
//! | [`favicons`] | Platform icon set plus web manifest and tile config |
//! | [`projects`] | Reporting, validation, and flag toggling over projects.yaml |
//! | [`fragments`] | Escaped HTML card/overlay fragments from the JSON data |
//! | [`config`] | `vita.toml` loading, defaults, validation |
//! | [`dates`] | Free-text and year-based publish-date resolution |
//! | [`frontmatter`] | Generic key/value header-block serialization |
//! | [`imaging`] | Pure image math: fit-within resize, alpha sampling |
//! | [`types`] | Typed views of the category records |
//!
//! # Design Decisions
//!
//! ## YAML In, Everything Out
//!
//! The category files are read-only to every command: no generator ever
//! edits a record (the one exception, `projects toggle-cv`, rewrites a
//! single boolean at the operator's request). Regeneration is idempotent
//! modulo embedded timestamps, so every artifact can be deleted and
//! rebuilt at any time.
//!
//! ## Maud Over Template Engines
//!
//! Fragments are generated with [Maud](https://maud.lambda.xyz/):
//! compile-time checked markup, auto-escaped interpolation (no markup
//! injection from record fields), no template directory to ship.
//!
//! ## Pure-Rust Imaging
//!
//! The optimizer uses the `image` crate only — no ImageMagick, no system
//! dependencies. Transparency detection stride-samples the alpha channel
//! (bounded to ~10,000 samples); see [`imaging::has_transparency`] for why
//! that is an approximation and not a guarantee.
//!
//! ## Sequential By Design
//!
//! Every command processes files one at a time, in order. The pipeline's
//! steps feed each other through the filesystem, so there is nothing to
//! parallelize that would not just reorder log lines. One bad record or
//! file is logged and skipped; it never blocks the rest of the batch.

pub mod combine;
pub mod config;
pub mod convert;
pub mod dates;
pub mod favicons;
pub mod fragments;
pub mod frontmatter;
pub mod imaging;
pub mod llms;
pub mod optimize;
pub mod posts;
pub mod projects;
pub mod sitemap;
pub mod types;

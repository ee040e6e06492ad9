use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use vita::config::{self, SiteConfig};
use vita::{combine, convert, favicons, fragments, llms, optimize, posts, projects, sitemap};

/// Flags for the image optimizer.
#[derive(clap::Args, Clone)]
struct OptimizeArgs {
    /// Analyze and report without touching any file
    #[arg(long)]
    dry_run: bool,

    /// Skip the PNG→JPEG conversion pass
    #[arg(long)]
    no_convert: bool,

    /// JPEG quality 1-100 (default from config)
    #[arg(long)]
    quality: Option<u8>,

    /// Size threshold in KB above which images are recompressed
    /// (default from config)
    #[arg(long)]
    threshold: Option<u64>,
}

#[derive(Parser)]
#[command(name = "vita")]
#[command(about = "Build pipeline for a YAML-driven personal site and CV")]
#[command(long_about = "\
Build pipeline for a YAML-driven personal site and CV

Hand-edited YAML category files are the single source of truth; every
other artifact is generated from them.

Project structure:

  data/yaml/                   # Source of truth, one file per category
  ├── publications.yaml
  ├── projects.yaml
  ├── news-data.yaml
  └── dissertation/            # Optional, merged under one key
  data/json/                   # Generated JSON mirrors (convert)
  data/combined-data.yaml      # Generated aggregate (combine)
  cv/_posts/                   # Generated Jekyll posts (posts)
  _fragments/                  # Generated HTML fragments (fragments)
  images/                      # Optimized in place (optimize)
  _image-backups/              # Originals, kept on first touch
  sitemap.xml, llms.txt        # Generated site metadata
  vita.toml                    # Optional config

Run 'vita gen-config' to print a documented vita.toml.")]
#[command(version)]
struct Cli {
    /// Project root directory
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert data/yaml into pretty-printed JSON mirrors
    Convert,
    /// Assemble the combined knowledge-base YAML document
    Combine,
    /// Generate Jekyll posts for publications, news, and projects
    Posts,
    /// Generate llms.txt from the combined document
    Llms,
    /// Generate sitemap.xml with git-derived modification dates
    Sitemap,
    /// Convert opaque PNGs to JPEG and recompress oversized images
    Optimize(OptimizeArgs),
    /// Generate the favicon set from a source image
    Favicons {
        /// Source image to derive all icon sizes from
        source: PathBuf,
    },
    /// Render the project and publication HTML fragments
    Fragments,
    /// Inspect and maintain the project records
    Projects {
        #[command(subcommand)]
        command: ProjectsCommand,
    },
    /// Run the full pipeline: convert → combine → posts → llms → sitemap
    Build,
    /// Print a stock vita.toml with all options documented
    GenConfig,
}

#[derive(Subcommand)]
enum ProjectsCommand {
    /// Counts by CV visibility, award, type, and year
    Stats,
    /// List projects shown on the CV
    ListCv,
    /// List hackathon projects
    ListHackathons,
    /// List class projects
    ListClasses,
    /// Check every record for required fields
    Validate,
    /// Regenerate data/json/projects.json from the YAML
    UpdateJson,
    /// Flip a project's CV visibility
    ToggleCv {
        /// Project id to toggle
        id: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = config::load_config(&cli.root)?;
    let root = cli.root.as_path();

    match cli.command {
        Command::Convert => {
            let summary = run_convert(root, &config)?;
            if summary.failed > 0 {
                std::process::exit(1);
            }
        }
        Command::Combine => {
            run_combine(root, &config)?;
        }
        Command::Posts => {
            run_posts(root, &config)?;
        }
        Command::Llms => {
            run_llms(root, &config)?;
        }
        Command::Sitemap => {
            run_sitemap(root, &config)?;
        }
        Command::Optimize(args) => {
            let mut options = optimize::OptimizeOptions::from_config(&config);
            options.dry_run = args.dry_run;
            options.convert_png = !args.no_convert;
            if let Some(quality) = args.quality {
                options.jpeg_quality = quality;
            }
            if let Some(threshold) = args.threshold {
                options.size_threshold_kb = threshold;
            }
            let summary = optimize::optimize(root, &config, &options)?;
            println!(
                "Optimize: {} converted, {} recompressed, {} skipped",
                summary.converted, summary.optimized, summary.skipped
            );
        }
        Command::Favicons { source } => {
            favicons::generate(root, &source, &config)?;
        }
        Command::Fragments => {
            fragments::generate_all(
                &root.join(&config.paths.json_dir),
                &root.join(&config.paths.fragments_dir),
            )?;
        }
        Command::Projects { command } => {
            run_projects(root, &config, command)?;
        }
        Command::Build => {
            println!("==> Stage 1: Converting YAML to JSON");
            let summary = run_convert(root, &config)?;
            if summary.failed > 0 {
                eprintln!("Build aborted: {} files failed to convert", summary.failed);
                std::process::exit(1);
            }

            println!("==> Stage 2: Combining knowledge base");
            run_combine(root, &config)?;

            println!("==> Stage 3: Generating CV posts");
            run_posts(root, &config)?;

            println!("==> Stage 4: Generating llms.txt");
            run_llms(root, &config)?;

            println!("==> Stage 5: Generating sitemap.xml");
            run_sitemap(root, &config)?;

            println!("==> Build complete");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn run_convert(root: &Path, config: &SiteConfig) -> Result<convert::ConvertSummary, convert::ConvertError> {
    let summary = convert::convert_tree(
        &root.join(&config.paths.yaml_dir),
        &root.join(&config.paths.json_dir),
    )?;
    println!(
        "Converted {} files ({} failed)",
        summary.converted, summary.failed
    );
    Ok(summary)
}

fn run_combine(root: &Path, config: &SiteConfig) -> Result<(), combine::CombineError> {
    let summary = combine::combine(
        &root.join(&config.paths.yaml_dir),
        &root.join(&config.paths.combined_file),
        config,
    )?;
    println!(
        "Combined {} sections ({} skipped)",
        summary.loaded, summary.skipped
    );
    Ok(())
}

fn run_posts(root: &Path, config: &SiteConfig) -> Result<(), posts::PostsError> {
    let summary = posts::generate_all(
        &root.join(&config.paths.yaml_dir),
        &root.join(&config.paths.posts_dir),
    )?;
    println!(
        "Generated {} posts ({} papers, {} news, {} projects)",
        summary.total(),
        summary.publications,
        summary.news,
        summary.projects
    );
    Ok(())
}

fn run_llms(root: &Path, config: &SiteConfig) -> Result<(), llms::LlmsError> {
    llms::generate(
        &root.join(&config.paths.combined_file),
        &root.join(&config.paths.json_dir).join("projects.json"),
        &root.join("llms.txt"),
        config,
    )?;
    println!("Wrote llms.txt");
    Ok(())
}

fn run_sitemap(root: &Path, config: &SiteConfig) -> Result<(), sitemap::SitemapError> {
    sitemap::generate(root, &config.site.url)?;
    println!("Wrote sitemap.xml");
    Ok(())
}

fn run_projects(
    root: &Path,
    config: &SiteConfig,
    command: ProjectsCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    let yaml_path = root.join(&config.paths.yaml_dir).join("projects.yaml");

    match command {
        ProjectsCommand::Stats => {
            let records = projects::load_projects(&yaml_path)?;
            let stats = projects::collect_stats(&records);
            println!("Projects: {}", stats.total);
            println!("  on CV: {}", stats.cv_featured);
            println!("  with award: {}", stats.with_award);
            println!("By type:");
            for (project_type, count) in &stats.by_type {
                println!("  {project_type}: {count}");
            }
            println!("By year:");
            for (year, count) in &stats.by_year {
                println!("  {year}: {count}");
            }
        }
        ProjectsCommand::ListCv => {
            list_filtered(&yaml_path, "CV projects", |p| p.is_cv_featured())?;
        }
        ProjectsCommand::ListHackathons => {
            list_filtered(&yaml_path, "Hackathon projects", |p| {
                p.project_type == "hackathon"
            })?;
        }
        ProjectsCommand::ListClasses => {
            list_filtered(&yaml_path, "Class projects", |p| p.project_type == "class")?;
        }
        ProjectsCommand::Validate => {
            let violations = projects::validate_file(&yaml_path)?;
            if violations.is_empty() {
                println!("All project records are valid");
            } else {
                for violation in &violations {
                    eprintln!("  {violation}");
                }
                eprintln!("{} problems found", violations.len());
                std::process::exit(1);
            }
        }
        ProjectsCommand::UpdateJson => {
            let json_path = root.join(&config.paths.json_dir).join("projects.json");
            projects::update_json(&yaml_path, &json_path)?;
            println!("Wrote {}", json_path.display());
        }
        ProjectsCommand::ToggleCv { id } => {
            let shown = projects::toggle_cv(&yaml_path, &id)?;
            if shown {
                println!("{id} is now shown on the CV");
            } else {
                println!("{id} is now hidden from the CV");
            }
        }
    }
    Ok(())
}

fn list_filtered(
    yaml_path: &Path,
    heading: &str,
    predicate: impl Fn(&vita::types::Project) -> bool,
) -> Result<(), projects::ProjectsError> {
    let records = projects::load_projects(yaml_path)?;
    let matching: Vec<_> = records.iter().filter(|p| predicate(p)).collect();
    println!("{heading} ({}):", matching.len());
    for project in matching {
        println!("{}", projects::describe(project));
    }
    Ok(())
}

//! folio - portfolio site toolkit.

use anyhow::{Context, Result, bail};
use clap::Parser;
use folio::{
    carousel::{NavPolicy, Pager, visible_count},
    cli::{Cli, Commands},
    config::{SiteConfig, cfg, init_config},
    feed::{html::Document, load_posts_or_placeholders, summarize},
    log,
    project::{Category, GalleryFilter, SortOrder, load_projects},
    serve::{PROJECTS_MOUNT, serve_site},
    video::{
        FrameTable,
        markup::{audit_sections, scan_sections},
    },
};
use std::{fs, path::Path};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_config(SiteConfig::load(&cli)?);

    match &cli.command {
        Commands::Serve { .. } => serve_site(),
        Commands::Posts { json, width } => print_posts(*json, *width),
        Commands::Projects {
            json,
            category,
            tag,
            oldest,
        } => print_projects(*json, category, tag, *oldest),
        Commands::Frames { fps, page } => print_frames(*fps, page.as_deref()),
    }
}

/// Ingest the post captures and print them, plus the carousel pages for `width`.
fn print_posts(json: bool, width: Option<u32>) -> Result<()> {
    let c = cfg();
    let today = chrono::Local::now().date_naive();
    let posts = load_posts_or_placeholders(&c.paths.posts, &c.feed, today);

    if json {
        println!("{}", serde_json::to_string_pretty(&posts)?);
    } else {
        for post in &posts {
            println!("{}", summarize(post));
        }
        log!("feed"; "{} posts from {}", posts.len(), c.paths.posts.display());
    }

    if let Some(width) = width {
        let mut pager = Pager::new(posts.len(), visible_count(width), NavPolicy::Saturate);
        log!("carousel"; "{}px: {} per page, {} pages", width, pager.visible(), pager.page_count());
        for page in 0..pager.page_count() {
            pager.go_to(page);
            let ids: Vec<&str> = posts[pager.page_range()]
                .iter()
                .map(|post| post.id.as_str())
                .collect();
            println!("page {}: {}", page + 1, ids.join(", "));
        }
    }
    Ok(())
}

/// Load the project folders and print the filtered gallery.
fn print_projects(json: bool, categories: &[String], tags: &[String], oldest: bool) -> Result<()> {
    let c = cfg();

    let mut filter = GalleryFilter {
        order: if oldest {
            SortOrder::Oldest
        } else {
            SortOrder::Newest
        },
        ..Default::default()
    };
    for key in categories {
        filter.categories.insert(key.parse::<Category>()?);
    }
    for tag in tags {
        filter.add_tag(tag);
    }

    let projects = load_projects(&c.paths.projects, PROJECTS_MOUNT);
    let shown = filter.apply(&projects);

    if json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    for project in &shown {
        let year = match project.year_value() {
            0 => "-".to_owned(),
            year => year.to_string(),
        };
        println!(
            "{:<24} {:>5}  {:>2} img  {:>2} sec  {}",
            project.slug,
            year,
            project.images.len(),
            project.sections.len(),
            project.tags.join(", ")
        );
    }
    log!("projects"; "{} of {} projects", shown.len(), projects.len());
    Ok(())
}

/// Print the frame table, validate it and audit the page's section markup.
fn print_frames(fps: Option<f64>, page: Option<&Path>) -> Result<()> {
    let c = cfg();
    let fps = fps.unwrap_or(c.video.fallback_fps);
    if !(fps.is_finite() && fps > 0.0) {
        bail!("--fps must be a positive number");
    }

    let table = FrameTable::default_site(c.video.total_frames);
    println!(
        "{:<14} {:>6} {:>6} {:>9} {:>9}  mode",
        "section", "start", "end", "from", "to"
    );
    for range in table.ranges() {
        println!(
            "{:<14} {:>6} {:>6} {:>8.2}s {:>8.2}s  {}",
            range.name,
            range.start_frame,
            range.end_frame,
            range.start_time(fps),
            range.end_time(fps),
            range.mode
        );
    }

    match table.validate() {
        Ok(()) => log!("video"; "{} frames in {} ranges at {} fps", table.total_frames(), table.ranges().len(), fps),
        Err(err) => log!("error"; "frame table: {err}"),
    }

    let page = page.map_or_else(|| c.paths.dist.join("index.html"), Path::to_path_buf);
    if !page.is_file() {
        log!("video"; "no page at {}, skipping markup audit", page.display());
        return Ok(());
    }

    let html = fs::read_to_string(&page).with_context(|| format!("Failed to read {}", page.display()))?;
    let doc = Document::parse(&html).with_context(|| format!("Failed to parse {}", page.display()))?;
    let sections = scan_sections(&doc);
    let problems = audit_sections(&table, &sections);

    if problems.is_empty() {
        log!("video"; "{} sections in {} match the frame table", sections.len(), page.display());
        return Ok(());
    }
    for problem in &problems {
        log!("error"; "{problem}");
    }
    bail!("{} section markup problems in {}", problems.len(), page.display())
}

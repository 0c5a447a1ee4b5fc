//! CLI binary for poster-tiler.
//!
//! A thin shim over the library crate: reads a local PDF, maps flags to
//! `PreviewOptions` / `ExportOptions`, and writes the result to disk.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use poster_tiler::{
    bind_pdfium, export_to_file, load_pdf_file, plan_export_for, preview, ExportOptions,
    ExportProgressCallback, ExportReport, PagePlacement, PaperSize, PdfiumPageWriter,
    PreviewOptions, ProgressCallback, DEFAULT_EXPORT_FILENAME, DEFAULT_MARGIN_MM, DEFAULT_PAPER,
    DEFAULT_PREVIEW_MAX_PIXELS,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a bar over the output pages plus one log
/// line per composed tile.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    /// Spinner until `on_export_start` tells us the page count.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Rendering");
        bar.set_message("Rasterising poster…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Composing");
    }
}

impl ExportProgressCallback for CliProgressCallback {
    fn on_export_start(&self, total_tiles: usize) {
        self.activate_bar(total_tiles);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Laying out {total_tiles} pages…"))
        ));
    }

    fn on_tile_composed(&self, page: &PagePlacement, total: usize) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  tile ({}, {})  {}",
            green("✓"),
            page.page,
            total,
            page.row,
            page.col,
            dim(&format!(
                "{}x{} px → {:.0}x{:.0} pt",
                page.tile_width_px,
                page.tile_height_px,
                page.placement.width,
                page.placement.height
            )),
        ));
        self.bar.inc(1);
    }

    fn on_export_complete(&self, total_pages: usize, pdf_bytes: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages composed  {}",
            green("✔"),
            bold(&total_pages.to_string()),
            dim(&format!("{pdf_bytes} bytes")),
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Check where the cuts will fall (writes preview.png)
  poster-tiler preview poster.pdf --rows 2 --cols 3

  # Export onto A4 pages with a 5 mm margin (writes poster-tiles.pdf)
  poster-tiler export poster.pdf --rows 2 --cols 3

  # Letter paper, wider margin, custom output path
  poster-tiler export poster.pdf -r 3 -c 3 --paper Letter --margin-mm 10 -o out/wall.pdf

  # Custom paper in millimetres
  poster-tiler export poster.pdf -r 2 -c 2 --paper custom:500,700

  # Show the page layout without writing anything
  poster-tiler export poster.pdf -r 2 -c 3 --dry-run --json

  # Resolve a paper identifier
  poster-tiler paper Legal

PAPER SIZES:
  A4        210 × 297 mm
  A3        297 × 420 mm
  Letter    215.9 × 279.4 mm
  Legal     215.9 × 355.6 mm
  custom:W,H  any size, in millimetres

ENVIRONMENT VARIABLES:
  POSTER_TILER_ROWS, POSTER_TILER_COLS, POSTER_TILER_PAPER,
  POSTER_TILER_MARGIN_MM, POSTER_TILER_MAX_PIXELS, POSTER_TILER_VERBOSE,
  POSTER_TILER_QUIET      Defaults for the matching flags
  POSTER_TILER_PDFIUM_LIB Same as --pdfium-lib
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  RUST_LOG                Overrides the log filter
"#;

/// Split a single-page PDF poster into printable tiles.
#[derive(Parser, Debug)]
#[command(
    name = "poster-tiler",
    version,
    about = "Split a single-page PDF poster into printable tiles",
    long_about = "Split the first page of a PDF poster into a rows×cols grid and lay each \
tile out on its own page of a standard or custom paper size, ready to print and assemble.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "POSTER_TILER_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "POSTER_TILER_QUIET")]
    quiet: bool,

    /// Path to the pdfium library (file or directory).
    #[arg(long, global = true, env = "POSTER_TILER_PDFIUM_LIB")]
    pdfium_lib: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a PNG preview with the cut grid drawn on it.
    Preview {
        /// Poster PDF (only the first page is used).
        input: PathBuf,

        /// Number of tile rows.
        #[arg(short, long, env = "POSTER_TILER_ROWS", default_value_t = 1)]
        rows: u32,

        /// Number of tile columns.
        #[arg(short, long, env = "POSTER_TILER_COLS", default_value_t = 1)]
        cols: u32,

        /// Approximate pixel budget of the preview raster.
        #[arg(long, env = "POSTER_TILER_MAX_PIXELS", default_value_t = DEFAULT_PREVIEW_MAX_PIXELS)]
        max_pixels: u64,

        /// Where to write the PNG.
        #[arg(short, long, default_value = "preview.png")]
        output: PathBuf,
    },

    /// Export the tiles as a multi-page PDF, one tile per page.
    Export {
        /// Poster PDF (only the first page is used).
        input: PathBuf,

        /// Number of tile rows.
        #[arg(short, long, env = "POSTER_TILER_ROWS", default_value_t = 1)]
        rows: u32,

        /// Number of tile columns.
        #[arg(short, long, env = "POSTER_TILER_COLS", default_value_t = 1)]
        cols: u32,

        /// Paper: A4, A3, Letter, Legal or custom:W,H (mm).
        #[arg(short, long, env = "POSTER_TILER_PAPER", default_value = DEFAULT_PAPER)]
        paper: String,

        /// Blank margin on every side of each page, in millimetres.
        #[arg(long, env = "POSTER_TILER_MARGIN_MM", default_value_t = DEFAULT_MARGIN_MM,
              allow_hyphen_values = true)]
        margin_mm: f64,

        /// Where to write the PDF.
        #[arg(short, long, default_value = DEFAULT_EXPORT_FILENAME)]
        output: PathBuf,

        /// Print the page layout as JSON on stdout.
        #[arg(long)]
        json: bool,

        /// Plan the layout only; render and write nothing.
        #[arg(long)]
        dry_run: bool,
    },

    /// Resolve a paper identifier to its size.
    Paper {
        /// A4, A3, Letter, Legal or custom:W,H (mm). Empty means A4.
        #[arg(default_value = "")]
        id: String,

        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs during an export.
    let show_progress = !cli.quiet
        && matches!(
            cli.command,
            Command::Export {
                json: false,
                dry_run: false,
                ..
            }
        );
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Paper { ref id, json } => print_paper(id, json),

        Command::Preview {
            ref input,
            rows,
            cols,
            max_pixels,
            ref output,
        } => {
            let options = PreviewOptions::builder()
                .grid(rows, cols)
                .max_pixels(max_pixels)
                .build()
                .context("Invalid preview options")?;
            let upload = load_pdf_file(input)?;
            let pdfium = bind_pdfium(cli.pdfium_lib.as_deref())?;

            let result = preview(&pdfium, &upload, &options).context("Preview failed")?;
            write_output(output, &result.png)?;

            if !cli.quiet {
                eprintln!(
                    "{}  {}x{} px preview, {}x{} grid  →  {}",
                    green("✔"),
                    result.width,
                    result.height,
                    rows,
                    cols,
                    bold(&output.display().to_string()),
                );
            }
            Ok(())
        }

        Command::Export {
            ref input,
            rows,
            cols,
            ref paper,
            margin_mm,
            ref output,
            json,
            dry_run,
        } => {
            let progress_cb: Option<ProgressCallback> = if show_progress {
                Some(CliProgressCallback::new_dynamic() as Arc<dyn ExportProgressCallback>)
            } else {
                None
            };

            let mut builder = ExportOptions::builder()
                .grid(rows, cols)
                .paper(paper.as_str())
                .margin_mm(margin_mm);
            if let Some(cb) = progress_cb {
                builder = builder.progress_callback(cb);
            }
            let options = builder.build().context("Invalid export options")?;

            let upload = load_pdf_file(input)?;
            let pdfium = bind_pdfium(cli.pdfium_lib.as_deref())?;

            if dry_run {
                let report =
                    plan_export_for(&pdfium, &upload, &options).context("Planning failed")?;
                if json {
                    print_json(&report)?;
                } else {
                    print_report(&report);
                }
                return Ok(());
            }

            let writer = PdfiumPageWriter::new(&pdfium)?;
            let result = export_to_file(&pdfium, writer, &upload, &options, output)
                .context("Export failed")?;

            if json {
                print_json(&result.report(options.grid, options.margin_mm))?;
            }
            if !cli.quiet {
                eprintln!(
                    "{}  {} pages on {}  {}ms  →  {}",
                    green("✔"),
                    result.stats.page_count,
                    result.paper,
                    result.stats.total_duration_ms,
                    bold(&output.display().to_string()),
                );
                eprintln!(
                    "   {} raster",
                    dim(&format!(
                        "{}x{} px",
                        result.stats.raster_width, result.stats.raster_height
                    )),
                );
            }
            Ok(())
        }
    }
}

fn print_paper(id: &str, json: bool) -> Result<()> {
    let paper = PaperSize::parse(id)?;
    let mm = paper.physical_size();
    let pt = paper.device_size();

    if json {
        print_json(&serde_json::json!({
            "paper": paper.to_string(),
            "width_mm": mm.width_mm(),
            "height_mm": mm.height_mm(),
            "width_pt": pt.width,
            "height_pt": pt.height,
        }))?;
    } else {
        println!("Paper:   {}", paper);
        println!("Size:    {:.1} × {:.1} mm", mm.width_mm(), mm.height_mm());
        println!("         {:.2} × {:.2} pt", pt.width, pt.height);
    }
    Ok(())
}

fn print_report(report: &ExportReport) {
    println!(
        "Paper:   {} ({:.2} × {:.2} pt), margin {} mm",
        report.paper, report.page_width_pt, report.page_height_pt, report.margin_mm
    );
    println!("Grid:    {} rows × {} cols", report.rows, report.cols);
    println!();
    println!("{:>4}  {:<8}  {:>11}  {}", "Page", "Tile", "Pixels", "Placement (pt)");
    for page in &report.pages {
        let p = &page.placement;
        println!(
            "{:>4}  {:<8}  {:>11}  x={:.1} y={:.1} w={:.1} h={:.1}",
            page.page,
            format!("({},{})", page.row, page.col),
            format!("{}x{}", page.tile_width_px, page.tile_height_px),
            p.x,
            p.y,
            p.width,
            p.height
        );
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialise output")?;
    println!("{json}");
    Ok(())
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}

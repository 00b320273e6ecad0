//! Command line front end
//!
//! `capture` runs the capture pipeline against a PNG-backed page and either
//! writes the result or hands it to the editor; `edit` replays a script of
//! editor messages over a capture and exports it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::capture::static_page::StaticPage;
use crate::capture::stitch::StitchOptions;
use crate::capture::viewport::{CancelFlag, LogProgress, PageControl};
use crate::capture::{Bitmap, pipeline};
use crate::config::ScrollShotConfig;
use crate::domain::{CaptureMode, CaptureRequest, CssRect};
use crate::editor::{EditorSession, Request};
use crate::editor::messages::Msg;
use crate::{export, handoff};

/// Element name the `--element` box is registered under
const ELEMENT_NAME: &str = "target";

#[derive(Parser, Debug)]
#[command(
    name = "scrollshot",
    version,
    about = "Full-page capture, region extraction and raster annotation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Capture a page image the way a browser viewport would see it
    Capture(CaptureArgs),
    /// Replay editor messages over a capture and export the result
    Edit(EditArgs),
    /// Show the configuration, or reset it to defaults
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct CaptureArgs {
    /// PNG standing in for the rendered page
    #[arg(long, required_unless_present = "gradient", conflicts_with = "gradient")]
    pub page: Option<PathBuf>,
    /// Generate a WIDTHxHEIGHT page whose rows all differ, instead of loading one
    #[arg(long, value_parser = parse_size)]
    pub gradient: Option<(u32, u32)>,
    /// Let the page scroll past its end instead of clamping like a browser
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_scroll_clamp: bool,
    /// visible, fullpage, area or element
    #[arg(long, default_value = "visible")]
    pub mode: CaptureMode,
    /// Viewport size in CSS pixels, as WIDTHxHEIGHT
    #[arg(long, default_value = "1280x800", value_parser = parse_size)]
    pub viewport: (u32, u32),
    /// Device pixel ratio
    #[arg(long, default_value_t = 1.0)]
    pub dpr: f32,
    /// Initial vertical scroll position in CSS pixels
    #[arg(long, default_value_t = 0.0)]
    pub scroll_y: f32,
    /// Area selection in viewport CSS pixels, as x,y,w,h
    #[arg(long)]
    pub rect: Option<CssRect>,
    /// Element bounding box in page CSS pixels, as x,y,w,h
    #[arg(long)]
    pub element: Option<CssRect>,
    /// Wait after each scroll, overriding the configured delay
    #[arg(long)]
    pub settle_ms: Option<u64>,
    /// Write the capture here instead of handing it to the editor
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Image to edit; defaults to the pending capture
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// JSON array of editor messages
    #[arg(long)]
    pub script: PathBuf,
    /// Download directory; defaults to the configured save location
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Also copy the result to the clipboard
    #[arg(long, action = ArgAction::SetTrue)]
    pub copy: bool,
    /// Write the editor view after the script, with any unfinished overlay
    /// and floating text, before exporting
    #[arg(long)]
    pub preview: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Overwrite the stored configuration with defaults
    #[arg(long, action = ArgAction::SetTrue)]
    pub reset: bool,
}

fn parse_size(s: &str) -> anyhow::Result<(u32, u32)> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .with_context(|| format!("invalid size {s:?}, expected WIDTHxHEIGHT"))?;
    Ok((w.trim().parse()?, h.trim().parse()?))
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ScrollShotConfig::load();
    match cli.command {
        Commands::Capture(args) => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("failed to start runtime")?;
            runtime.block_on(capture(args, &config))
        }
        Commands::Edit(args) => edit(args, &config),
        Commands::Config(args) => show_config(args, config),
    }
}

fn show_config(args: ConfigArgs, mut config: ScrollShotConfig) -> anyhow::Result<()> {
    let path = ScrollShotConfig::path().context("no config directory")?;
    if args.reset {
        config = ScrollShotConfig::default();
        config.save();
    }
    println!("# {}", path.display());
    println!("# color {}", config.color.to_hex());
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

async fn capture(args: CaptureArgs, config: &ScrollShotConfig) -> anyhow::Result<()> {
    let (viewport_width, viewport_height) = args.viewport;
    let mut page = match (&args.page, args.gradient) {
        (Some(path), _) => StaticPage::open(path, viewport_width, viewport_height)?,
        (None, Some((width, height))) => {
            StaticPage::gradient(width, height, viewport_width, viewport_height)
        }
        (None, None) => anyhow::bail!("either --page or --gradient is required"),
    };
    page = page.with_scroll_clamp(!args.no_scroll_clamp);
    log::debug!(
        "Page {}x{}, viewport {viewport_width}x{viewport_height}",
        page.content().width(),
        page.content().height()
    );
    if let Some(element) = args.element {
        page = page.with_element(ELEMENT_NAME, element);
    }
    page.scroll_to(0.0, args.scroll_y);

    let target = match args.mode {
        CaptureMode::Area => args.rect,
        CaptureMode::Element => page.element_rect(ELEMENT_NAME),
        CaptureMode::Visible | CaptureMode::FullPage => None,
    };
    let request = CaptureRequest {
        mode: args.mode,
        target,
        dpr: args.dpr,
    };
    let options = StitchOptions {
        settle_delay: Duration::from_millis(args.settle_ms.unwrap_or(config.settle_delay_ms)),
        ..Default::default()
    };

    let cancel = options.cancel.clone();
    let mut progress = LogProgress;
    let work = pipeline::run_capture(&request, &mut page, &options, &mut progress);
    let Some(bitmap) = cancel_on_interrupt(work, tokio::signal::ctrl_c(), &cancel).await? else {
        log::warn!("Nothing selected, capture skipped");
        return Ok(());
    };
    log::debug!("Captured {} viewport(s)", page.capture_count());

    match args.output {
        Some(path) => {
            export::save_png(&bitmap.rgba, &path)?;
            println!("{}", path.display());
        }
        None => {
            let dir = handoff::handoff_dir().context("no cache directory for the capture handoff")?;
            let record = handoff::store_pending(&dir, &bitmap)?;
            let (w, h) = handoff::editor_window_size(record.width, record.height);
            println!("{} (editor window {w}x{h})", record.image_path.display());
        }
    }
    Ok(())
}

fn edit(args: EditArgs, config: &ScrollShotConfig) -> anyhow::Result<()> {
    let script = std::fs::read(&args.script)
        .with_context(|| format!("failed to read script {}", args.script.display()))?;
    let messages: Vec<Msg> = serde_json::from_slice(&script)
        .with_context(|| format!("invalid script {}", args.script.display()))?;

    let (bitmap, from_handoff) = match &args.input {
        Some(path) => (load_input(path)?, None),
        None => {
            let dir = handoff::handoff_dir().context("no cache directory for the capture handoff")?;
            let (_, bitmap) = handoff::load_pending(&dir)?;
            (bitmap, Some(dir))
        }
    };
    let mut session = EditorSession::new(bitmap.rgba, config)?;
    if let Some(dir) = from_handoff {
        handoff::clear_pending(&dir)?;
    }

    let saved = replay(&mut session, messages, config, args.output.as_deref())?;
    if let Some(preview) = &args.preview {
        export::save_png(&session.surface().compose_view(), preview)?;
    }
    let path = match saved {
        Some(path) => {
            if args.copy {
                export::copy_to_clipboard(session.prepare_export()?)?;
            }
            path
        }
        None => {
            let dir = export::download_dir(config, args.output.as_deref())?;
            let image = session.prepare_export()?;
            let path = export::download(image, &dir)?;
            if args.copy {
                export::copy_to_clipboard(image)?;
            } else if config.copy_to_clipboard_on_save
                && let Err(err) = export::copy_to_clipboard(image)
            {
                log::warn!("Failed to copy saved image: {err:#}");
            }
            path
        }
    };
    println!("{}", path.display());
    Ok(())
}

/// Drive `work` to completion, raising `cancel` if `interrupt` fires first
///
/// The work is not dropped on interrupt: it notices the flag at its next
/// step and winds down itself, restoring the page.
async fn cancel_on_interrupt<T>(
    work: impl Future<Output = T>,
    interrupt: impl Future<Output = std::io::Result<()>>,
    cancel: &CancelFlag,
) -> T {
    tokio::pin!(work);
    tokio::select! {
        output = &mut work => output,
        Ok(()) = interrupt => {
            log::warn!("Interrupted, cancelling capture");
            cancel.cancel();
            work.await
        }
    }
}

/// Feed messages to the session, carrying out any export it requests
///
/// Returns the last downloaded file, if any.
fn replay(
    session: &mut EditorSession,
    messages: Vec<Msg>,
    config: &ScrollShotConfig,
    dir: Option<&Path>,
) -> anyhow::Result<Option<PathBuf>> {
    let mut saved = None;
    for (i, msg) in messages.into_iter().enumerate() {
        log::debug!("Script step {i}: {msg:?}");
        if let Some(request) = session.update(msg).with_context(|| format!("script step {i}"))?
            && let Some(path) = export::handle_request(session, request, config, dir)?
        {
            saved = Some(path);
        }
    }
    Ok(saved)
}

fn load_input(path: &Path) -> anyhow::Result<Bitmap> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Bitmap::decode(&bytes, 1.0).with_context(|| format!("failed to load {}", path.display()))
}

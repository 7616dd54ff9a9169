mod image_helper;

use anyhow::{Context, Result, anyhow, bail};
use flexi_logger::Logger;
use log::{info, warn};
use region_finder::{Color, FinderConfig};
use region_finder::parallel_pipeline::WorkerPool;
use region_finder::pipeline::{PaintSession, PipelineConfig, Report};
use std::env;
use std::path::{Path, PathBuf};

const USAGE: &str = "\
Usage:
  paint_tester session <output_dir> <script> <frame.png>...
  paint_tester batch <output_dir> <r,g,b> <frame.png>...

A session script is a comma-separated list of events replayed in order:
  frame        process the next frame
  click:X:Y    pick the color under (X, Y) of the current frame as the target
  key:C        press key C (w/r/p switch display, c clears, o/s save)

Set PAINT_SEED to make the recolor colors reproducible.";

/// One step of a replayed session.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Frame,
    Click(u32, u32),
    Key(char),
}

fn parse_event(token: &str) -> Result<Event> {
    let mut parts = token.trim().split(':');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some("frame"), None, None, None) => Ok(Event::Frame),
        (Some("click"), Some(x), Some(y), None) => Ok(Event::Click(
            x.parse::<u32>().with_context(|| format!("bad x in {token:?}"))?,
            y.parse::<u32>().with_context(|| format!("bad y in {token:?}"))?,
        )),
        (Some("key"), Some(key), None, None) => {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Event::Key(c)),
                _ => bail!("key event needs exactly one character: {token:?}"),
            }
        }
        _ => bail!("unrecognized event {token:?}"),
    }
}

fn parse_script(script: &str) -> Result<Vec<Event>> {
    script
        .split(',')
        .filter(|token| !token.trim().is_empty())
        .map(parse_event)
        .collect()
}

fn parse_color(text: &str) -> Result<Color> {
    let channels = text
        .split(',')
        .map(|c| c.trim().parse::<u8>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("bad color {text:?}"))?;
    match channels.as_slice() {
        [red, green, blue] => Ok(Color::new(*red, *green, *blue)),
        _ => bail!("color needs three channels: {text:?}"),
    }
}

fn seed_from_env() -> Result<Option<u64>> {
    match env::var("PAINT_SEED") {
        Ok(value) => Ok(Some(value.parse().context("PAINT_SEED must be a u64")?)),
        Err(_) => Ok(None),
    }
}

fn run_session(output_dir: &Path, script: &str, frames: &[PathBuf]) -> Result<()> {
    let events = parse_script(script)?;
    let config = PipelineConfig::default();
    let mut session = match seed_from_env()? {
        Some(seed) => PaintSession::with_seed(config, seed),
        None => PaintSession::new(config),
    };
    let mut frames = frames.iter();

    for event in events {
        match event {
            Event::Frame => {
                let path = frames
                    .next()
                    .ok_or_else(|| anyhow!("script asks for more frames than were given"))?;
                let frame = image_helper::load(path)
                    .with_context(|| format!("loading {}", path.display()))?;
                match session.process_frame(frame)? {
                    Report::NoTarget => info!("{}: no target color yet", path.display()),
                    Report::Analyzed(details) => info!(
                        "{}: {} regions, largest {:?}, painted {}",
                        path.display(),
                        details.region_count,
                        details.largest_region_size,
                        details.painted
                    ),
                }
            }
            Event::Click(x, y) => {
                let color = session.handle_mouse_press(x, y)?;
                info!("target color set to {color:?}");
            }
            Event::Key(key) => {
                if let Some(request) = session.handle_key(key) {
                    let path = output_dir.join(request.file_name);
                    image_helper::save(&path, &request.image)
                        .with_context(|| format!("saving {}", path.display()))?;
                    info!("saved {}", path.display());
                }
            }
        }
    }

    if frames.next().is_some() {
        warn!("some frames were never processed by the script");
    }
    Ok(())
}

async fn run_batch(output_dir: &Path, color: &str, frames: &[PathBuf]) -> Result<()> {
    let target = parse_color(color)?;
    let images = frames
        .iter()
        .map(|path| image_helper::load(path).with_context(|| format!("loading {}", path.display())))
        .collect::<Result<Vec<_>>>()?;

    let pool = WorkerPool::new(FinderConfig::default(), seed_from_env()?);
    let analyses = pool.process_batch(images, target).await;

    for (path, analysis) in frames.iter().zip(analyses) {
        let analysis = analysis?;
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("frame");
        let out = output_dir.join(format!("{stem}_recolored.png"));
        image_helper::save(&out, &analysis.recolored)
            .with_context(|| format!("saving {}", out.display()))?;
        info!(
            "{}: {} regions, largest {:?} -> {}",
            path.display(),
            analysis.regions.len(),
            analysis.largest_region().ok().map(|r| r.len()),
            out.display()
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let _logger = Logger::try_with_env_or_str("info")?.start()?;

    // --- 1. Argument Parsing & Setup ---
    let args: Vec<String> = env::args().collect();
    if args.len() < 5 {
        println!("{USAGE}");
        return Ok(());
    }
    let output_dir = PathBuf::from(&args[2]);
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;
    let frames: Vec<PathBuf> = args[4..].iter().map(PathBuf::from).collect();

    // --- 2. Dispatch ---
    match args[1].as_str() {
        "session" => run_session(&output_dir, &args[3], &frames)?,
        "batch" => run_batch(&output_dir, &args[3], &frames).await?,
        other => bail!("unknown mode {other:?}\n{USAGE}"),
    }

    info!("Processing complete. Output saved to {}", output_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_script() {
        let events = parse_script("frame, click:3:4,key:p,frame,").unwrap();
        assert_eq!(
            events,
            vec![Event::Frame, Event::Click(3, 4), Event::Key('p'), Event::Frame]
        );
    }

    #[test]
    fn rejects_bad_events() {
        assert!(parse_event("click:3").is_err());
        assert!(parse_event("key:pp").is_err());
        assert!(parse_event("jump").is_err());
        assert!(parse_event("click:-1:2").is_err());
    }

    #[test]
    fn parses_colors() {
        assert_eq!(parse_color("1, 2,3").unwrap(), Color::new(1, 2, 3));
        assert!(parse_color("1,2").is_err());
        assert!(parse_color("1,2,300").is_err());
    }
}

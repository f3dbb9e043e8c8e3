use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use quadwarp::config::WarpScene;
use quadwarp::{compute, invert, CornerSet, Point2};

/// Quad warp CLI — unit-square homographies and rectangle fitting
#[derive(Parser)]
#[command(name = "quadwarp", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Homography and inverse for four normalized corners
    Homography {
        /// Corners as "x,y x,y x,y x,y" (top-left, top-right, bottom-right, bottom-left)
        #[arg(long)]
        corners: String,
    },
    /// Fit a rectangle around a scene's quad and report the warp
    Fit {
        /// Scene file (.toml or .json)
        #[arg(long)]
        scene: PathBuf,
    },
    /// Map a point through the homography of four corners
    Project {
        /// Corners as "x,y x,y x,y x,y"
        #[arg(long)]
        corners: String,
        /// Point as "x,y"
        #[arg(long, allow_hyphen_values = true)]
        point: String,
        /// Map from quad space back to the unit square
        #[arg(long)]
        inverse: bool,
    },
}

#[derive(Serialize)]
struct HomographyOutput {
    homography: [f64; 8],
    inverse: [f64; 9],
}

#[derive(Serialize)]
struct FitOutput {
    position: [f64; 2],
    size_delta: [f64; 2],
    rect_size: [f64; 2],
    corners: [[f64; 2]; 4],
    world_corners: [[f64; 2]; 4],
    homography: [f64; 8],
    inverse: [f64; 9],
}

#[derive(Serialize)]
struct ProjectOutput {
    point: [f64; 2],
}

fn parse_point(s: &str) -> Result<Point2> {
    let (x, y) = s
        .split_once(',')
        .with_context(|| format!("expected \"x,y\", got {s:?}"))?;
    let x: f64 = x
        .trim()
        .parse()
        .with_context(|| format!("invalid x coordinate in {s:?}"))?;
    let y: f64 = y
        .trim()
        .parse()
        .with_context(|| format!("invalid y coordinate in {s:?}"))?;
    Ok(Point2::new(x, y))
}

fn parse_corners(s: &str) -> Result<CornerSet> {
    let points = s
        .split(|c: char| c.is_whitespace() || c == ';')
        .filter(|p| !p.is_empty())
        .map(parse_point)
        .collect::<Result<Vec<_>>>()?;
    Ok(CornerSet::from_slice(&points)?)
}

fn load_scene(path: &Path) -> Result<WarpScene> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read scene: {}", path.display()))?;
    let scene: WarpScene = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&text)
            .with_context(|| format!("failed to parse scene: {}", path.display()))?,
        _ => WarpScene::from_toml_str(&text)
            .with_context(|| format!("failed to parse scene: {}", path.display()))?,
    };
    Ok(scene)
}

fn homography_output(corners: &CornerSet) -> Result<HomographyOutput> {
    let h = compute(corners);
    if !h.is_finite() {
        bail!("degenerate corners: {:?}", corners.points());
    }
    let inv = invert(&h)?;
    Ok(HomographyOutput {
        homography: h.params,
        inverse: inv.to_array(),
    })
}

fn run(command: Command) -> Result<serde_json::Value> {
    let value = match command {
        Command::Homography { corners } => {
            let corners = parse_corners(&corners)?;
            serde_json::to_value(homography_output(&corners)?)?
        }
        Command::Fit { scene } => {
            let image = load_scene(&scene)?.build()?;
            let rect = image.rect();
            let warp = homography_output(image.corners())?;
            tracing::info!(
                "fitted {} to {:?} at {:?}",
                scene.display(),
                rect.rect_size(),
                rect.position
            );
            serde_json::to_value(FitOutput {
                position: rect.position.into(),
                size_delta: rect.size_delta.into(),
                rect_size: rect.rect_size().into(),
                corners: (*image.corners()).into(),
                world_corners: image.points_world().map(Into::into),
                homography: warp.homography,
                inverse: warp.inverse,
            })?
        }
        Command::Project {
            corners,
            point,
            inverse,
        } => {
            let corners = parse_corners(&corners)?;
            let p = parse_point(&point)?;
            let h = compute(&corners);
            if !h.is_finite() {
                bail!("degenerate corners: {:?}", corners.points());
            }
            let out = if inverse {
                invert(&h)?.project(p.x, p.y)
            } else {
                h.project(p.x, p.y)
            };
            if !out.is_finite() {
                bail!("point ({}, {}) lies on the vanishing line", p.x, p.y);
            }
            serde_json::to_value(ProjectOutput { point: out.into() })?
        }
    };
    Ok(value)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let value = run(cli.command)?;
    let json = if cli.pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    println!("{json}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_corners_accepts_spaces_and_semicolons() {
        let c = parse_corners("0,0 1,0; 1,1;0,1").unwrap();
        assert_eq!(c, CornerSet::UNIT);
    }

    #[test]
    fn parse_corners_needs_four() {
        let err = parse_corners("0,0 1,0 1,1").unwrap_err();
        assert!(err.to_string().contains("expected 4 corners"), "{err}");
    }

    #[test]
    fn parse_point_rejects_garbage() {
        assert!(parse_point("1;2").is_err());
        assert!(parse_point("a,2").is_err());
        assert_eq!(parse_point(" -1.5, 2").unwrap(), Point2::new(-1.5, 2.0));
    }

    #[test]
    fn homography_command_outputs_identity() {
        let value = run(Command::Homography {
            corners: "0,0 1,0 1,1 0,1".to_string(),
        })
        .unwrap();
        assert_eq!(value["inverse"][0], 1.0);
        assert_eq!(value["inverse"][8], 1.0);
        assert_eq!(value["homography"].as_array().unwrap().len(), 8);
    }

    #[test]
    fn project_command_maps_corner() {
        let value = run(Command::Project {
            corners: "0,0 2,0 2,1 0,1".to_string(),
            point: "1,1".to_string(),
            inverse: false,
        })
        .unwrap();
        assert_eq!(value["point"][0], 2.0);
        assert_eq!(value["point"][1], 1.0);
    }

    #[test]
    fn degenerate_corners_fail() {
        let r = run(Command::Homography {
            corners: "0,0 0,0 0,0 0,0".to_string(),
        });
        assert!(r.is_err());
    }

    #[test]
    fn project_command_rejects_degenerate() {
        let r = run(Command::Project {
            corners: "0,0 0,0 0,0 0,0".to_string(),
            point: "0.5,0.5".to_string(),
            inverse: false,
        });
        let err = r.unwrap_err();
        assert!(err.to_string().contains("degenerate"), "{err}");
    }

    #[test]
    fn project_command_rejects_vanishing_point() {
        // h31 = -0.5, h32 = 0: u = 2 sends the homogeneous w to zero.
        let r = run(Command::Project {
            corners: "0,0 2,0 2,2 0,1".to_string(),
            point: "2,0".to_string(),
            inverse: false,
        });
        let err = r.unwrap_err();
        assert!(err.to_string().contains("vanishing line"), "{err}");
    }
}

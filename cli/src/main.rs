//! `wheelspin <snapshot.json> [output] [key=value ...]`
//!
//! Spins the wheel for a giveaway snapshot and writes the animation (or,
//! with a `.png` output, the stopped wheel) next to a text announcement on
//! stdout. Settings use the same `key=value` tokens as the library config.

mod snapshot;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};

use wheelspin_lib::{SpinConfig, TierChoice, config_from_cmdline, init_logging};
use wheelspin_video::{
    QualityOverride, ResultSink, SpinError, SpinOutcome, SpinReport, SpinRequest, SpinStage,
    TextConsoleSink, Tier, Winner, instant_result, render_result_png, spawn_spin,
};

const DEFAULT_OUTPUT: &str = "spin.gif";

struct Args {
    snapshot: PathBuf,
    output: PathBuf,
    cmdline: String,
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<Args> {
    let mut positional = Vec::new();
    let mut tokens = Vec::new();
    for arg in args {
        if arg.contains('=') {
            tokens.push(arg);
        } else {
            positional.push(arg);
        }
    }
    let mut positional = positional.into_iter();
    let Some(snapshot) = positional.next() else {
        bail!("usage: wheelspin <snapshot.json> [output] [key=value ...]");
    };
    let output = positional.next().unwrap_or_else(|| DEFAULT_OUTPUT.to_string());
    if let Some(extra) = positional.next() {
        bail!("unexpected argument '{}'", extra);
    }
    Ok(Args {
        snapshot: PathBuf::from(snapshot),
        output: PathBuf::from(output),
        cmdline: tokens.join(" "),
    })
}

fn build_request(name: String, snap: snapshot::Snapshot, cfg: &SpinConfig) -> Result<SpinRequest> {
    let mut request = SpinRequest::new(name, snap.participants);
    request.skip_animation = cfg.skip_animation;
    request.max_bytes = cfg.max_bytes;
    request.timeout = Duration::from_millis(cfg.timeout_ms as u64);
    request.quality = match cfg.tier {
        TierChoice::Auto => QualityOverride::Auto,
        TierChoice::Fixed(n) => match Tier::from_number(n) {
            Some(tier) => QualityOverride::Tier(tier),
            None => bail!("wheel.tier={} is not a tier", n),
        },
    };
    Ok(request)
}

fn spin_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
}

/// Draw a winner and render the stopped wheel on the blocking pool, bounded
/// by the request's timeout.
async fn instant_png(request: SpinRequest, seed: Option<u64>) -> Result<(Winner, Vec<u8>)> {
    let budget = request.timeout;
    let started = Instant::now();
    let handle = tokio::task::spawn_blocking(move || -> Result<(Winner, Vec<u8>), SpinError> {
        let winner = instant_result(&request, &mut spin_rng(seed))?;
        let png = render_result_png(&request, &winner)?;
        Ok((winner, png))
    });
    match tokio::time::timeout(budget, handle).await {
        Ok(joined) => Ok(joined.context("result renderer failed")??),
        Err(_) => Err(SpinError::GenerationTimedOut {
            elapsed_ms: started.elapsed().as_millis() as u64,
            budget_ms: budget.as_millis() as u64,
        }
        .into()),
    }
}

/// Writes the rendered result to disk.
struct FileSink {
    path: PathBuf,
    png: Option<Vec<u8>>,
}

impl ResultSink for FileSink {
    fn deliver_result(&mut self, report: &SpinReport<'_>) -> io::Result<()> {
        let bytes = match (self.png.take(), report.animation) {
            (Some(png), _) => png,
            (None, Some(gif)) => gif.bytes.clone(),
            (None, None) => return Ok(()),
        };
        fs::write(&self.path, &bytes)?;
        info!("wrote {} ({} bytes)", self.path.display(), bytes.len());
        Ok(())
    }
}

async fn run(args: Args, cfg: SpinConfig) -> Result<()> {
    let snap = snapshot::load_snapshot(&args.snapshot)?;
    let name = if snap.name.is_empty() {
        args.snapshot
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("giveaway")
            .to_string()
    } else {
        snap.name.clone()
    };
    let request = build_request(name.clone(), snap, &cfg)?;
    let participants = request.participants.clone();

    let (outcome, png) = if is_png(&args.output) {
        let started = Instant::now();
        let (winner, png) = instant_png(request, cfg.seed).await?;
        let outcome = SpinOutcome {
            winner,
            animation: None,
            settings: None,
            stage: SpinStage::InstantResult,
            elapsed: started.elapsed(),
        };
        (outcome, Some(png))
    } else {
        if cfg.skip_animation {
            warn!("animation skipped, {} will not be written", args.output.display());
        }
        let outcome = spawn_spin(request, cfg.seed).await?;
        (outcome, None)
    };

    let report = SpinReport::new(&name, &participants, &outcome);
    let mut sinks: Vec<Box<dyn ResultSink>> = vec![
        Box::new(FileSink {
            path: args.output.clone(),
            png,
        }),
        Box::new(TextConsoleSink::new(io::stdout())),
    ];
    for sink in sinks.iter_mut() {
        sink.deliver_result(&report)
            .with_context(|| format!("delivering result for '{}'", name))?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args(std::env::args().skip(1))?;
    let cfg = config_from_cmdline(Some(&args.cmdline));
    init_logging(cfg.log_level);
    info!(
        "tier={} skip={} timeout={}ms max_bytes={}",
        cfg.tier, cfg.skip_animation, cfg.timeout_ms, cfg.max_bytes
    );
    run(args, cfg).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn splits_paths_from_settings() {
        let a = args(&["snap.json", "wheel.tier=2", "out.png", "wheel.skip=on"]).unwrap();
        assert_eq!(a.snapshot, PathBuf::from("snap.json"));
        assert_eq!(a.output, PathBuf::from("out.png"));
        assert_eq!(a.cmdline, "wheel.tier=2 wheel.skip=on");
        assert!(is_png(&a.output));

        let a = args(&["snap.json"]).unwrap();
        assert_eq!(a.output, PathBuf::from(DEFAULT_OUTPUT));
        assert!(!is_png(&a.output));
    }

    #[test]
    fn rejects_missing_or_extra_paths() {
        assert!(args(&[]).is_err());
        assert!(args(&["a.json", "b.gif", "c.gif"]).is_err());
    }

    #[test]
    fn config_maps_onto_request() {
        let cfg = config_from_cmdline(Some("wheel.tier=3 wheel.timeout=5s wheel.max_bytes=2m"));
        let snap = snapshot::parse_snapshot(r#"{ "participants": { "a": { "entries": 2 } } }"#)
            .unwrap();
        let req = build_request("Drop".into(), snap, &cfg).unwrap();
        assert_eq!(req.quality, QualityOverride::Tier(Tier::Low));
        assert_eq!(req.timeout, Duration::from_secs(5));
        assert_eq!(req.max_bytes, 2 * 1024 * 1024);
        assert_eq!(req.participants.len(), 1);
    }

    fn png_request(timeout: Duration) -> SpinRequest {
        let snap = snapshot::parse_snapshot(
            r#"{ "participants": { "a": { "entries": 2 }, "b": { "entries": 5 } } }"#,
        )
        .unwrap();
        let mut req = build_request("Drop".into(), snap, &config_from_cmdline(None)).unwrap();
        req.timeout = timeout;
        req
    }

    #[tokio::test]
    async fn png_result_renders_off_the_runtime() {
        let (winner, png) = instant_png(png_request(Duration::from_secs(30)), Some(4))
            .await
            .unwrap();
        assert!(winner.index < 2);
        assert!(png.starts_with(b"\x89PNG"));
    }

    #[tokio::test]
    async fn png_result_honors_the_timeout() {
        let err = instant_png(png_request(Duration::ZERO), Some(4))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SpinError>(),
            Some(SpinError::GenerationTimedOut { budget_ms: 0, .. })
        ));
    }
}

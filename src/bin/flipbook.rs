use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "flipbook", version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Configuration JSON.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Serve frames from this local directory.
    #[arg(long, global = true, conflicts_with = "remote")]
    dir: Option<PathBuf>,

    /// Serve frames from this remote directory listing URL.
    #[arg(long, global = true)]
    remote: Option<String>,

    /// Frame cache capacity.
    #[arg(long, global = true)]
    capacity: Option<usize>,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = flipbook::logging::DEFAULT_LOG_LEVEL)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the info query response as JSON.
    Info,
    /// Print the frame query response for one index as JSON, or write the frame to a file.
    Frame(FrameArgs),
    /// Simulate playback, printing one status line per tick.
    Play(PlayArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Frame index (0-based).
    #[arg(long, allow_negative_numbers = true)]
    index: i64,

    /// Write the encoded JPEG here instead of printing JSON.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 120)]
    ticks: u64,

    /// Pointer move as `TICK:X`, with X the fractional horizontal position in [0, 1].
    #[arg(long = "pointer", value_parser = parse_pointer_event)]
    pointer: Vec<PointerEvent>,

    /// Deliver every Nth response one tick late, after the newer one (0 disables).
    #[arg(long, default_value_t = 0)]
    delay_every: u64,
}

#[derive(Clone, Copy, Debug)]
struct PointerEvent {
    tick: u64,
    x: f64,
}

fn parse_pointer_event(s: &str) -> Result<PointerEvent, String> {
    let (tick, x) = s
        .split_once(':')
        .ok_or_else(|| format!("expected TICK:X, got '{s}'"))?;
    let tick = tick
        .trim()
        .parse()
        .map_err(|e| format!("invalid tick '{tick}': {e}"))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("invalid x '{x}': {e}"))?;
    if !(0.0..=1.0).contains(&x) {
        return Err(format!("x must be in [0, 1], got {x}"));
    }
    Ok(PointerEvent { tick, x })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    flipbook::init_logging(&cli.global.log_level)?;

    let cfg = load_config(&cli.global)?;
    let service = flipbook::FrameService::from_config(&cfg).context("build frame service")?;

    match cli.cmd {
        Command::Info => cmd_info(&service),
        Command::Frame(args) => cmd_frame(&service, args),
        Command::Play(args) => cmd_play(&service, &cfg, args),
    }
}

fn load_config(args: &GlobalArgs) -> anyhow::Result<flipbook::FlipbookConfig> {
    let mut cfg = match &args.config {
        Some(path) => flipbook::FlipbookConfig::from_json_file(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => flipbook::FlipbookConfig::default(),
    };

    if let Some(dir) = &args.dir {
        cfg.source = flipbook::SourceConfig::Local { dir: dir.clone() };
    }
    if let Some(url) = &args.remote {
        let timeout_secs = match cfg.source {
            flipbook::SourceConfig::Remote { timeout_secs, .. } => timeout_secs,
            flipbook::SourceConfig::Local { .. } => {
                flipbook::source::remote::DEFAULT_TIMEOUT.as_secs()
            }
        };
        cfg.source = flipbook::SourceConfig::Remote {
            listing_url: url.clone(),
            timeout_secs,
        };
    }
    if let Some(capacity) = args.capacity {
        cfg.cache.capacity = capacity;
    }

    cfg.validate().context("validate config")?;
    Ok(cfg)
}

fn cmd_info(service: &flipbook::FrameService) -> anyhow::Result<()> {
    let info = service.info();
    println!("{}", serde_json::to_string(&info)?);
    Ok(())
}

fn cmd_frame(service: &flipbook::FrameService, args: FrameArgs) -> anyhow::Result<()> {
    let Some(out) = args.out else {
        let resp = service.frame_response(args.index);
        println!("{}", serde_json::to_string(&resp)?);
        return Ok(());
    };

    let frame = service
        .get_frame(args.index)
        .with_context(|| format!("resolve frame {}", args.index))?;
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&out, &frame.bytes)
        .with_context(|| format!("write frame '{}'", out.display()))?;

    eprintln!("wrote {} ({}x{})", out.display(), frame.width, frame.height);
    Ok(())
}

/// Runs in simulated time: tick `n` happens at `n / tick_hz` seconds, polls every
/// `poll_interval`, and nothing sleeps.
fn cmd_play(
    service: &flipbook::FrameService,
    cfg: &flipbook::FlipbookConfig,
    args: PlayArgs,
) -> anyhow::Result<()> {
    let total = service.total().context("enumerate frames")?;
    let tuning = cfg.playback.tuning();
    let tick_dt = cfg.playback.tick_interval();
    let mut controller = flipbook::PlaybackController::new(total, tuning);
    let mut gate = flipbook::LatestFrameGate::new();
    let mut next_poll = Duration::ZERO;
    let mut held: Option<(u64, flipbook::FrameResponse)> = None;

    for tick in 0..args.ticks {
        let now = Duration::from_secs_f64(tick as f64 * tick_dt.as_secs_f64());
        for ev in args.pointer.iter().filter(|ev| ev.tick == tick) {
            controller.pointer_moved(ev.x, now);
        }
        while next_poll <= now {
            controller.poll(next_poll);
            next_poll += tuning.poll_interval;
        }

        let Some(req) = controller.tick() else {
            println!("{tick:>5} {}", controller.status_text());
            continue;
        };
        let resp = service.frame_response(req.index as i64);
        if args.delay_every > 0 && (req.seq + 1) % args.delay_every == 0 && held.is_none() {
            held = Some((req.seq, resp));
            println!("{tick:>5} {} | delayed", controller.status_text());
            continue;
        }
        let mut outcome = deliver(&mut gate, req.seq, &resp);
        if let Some((seq, late)) = held.take() {
            outcome = format!("{outcome}, late {}", deliver(&mut gate, seq, &late));
        }
        println!("{tick:>5} {} | {outcome}", controller.status_text());
    }
    if let Some((seq, late)) = held.take() {
        println!("  end late {}", deliver(&mut gate, seq, &late));
    }

    let stats = service.cache_stats();
    eprintln!(
        "cache: {} stored, {} hits, {} misses, {} not admitted",
        service.cached_frames(),
        stats.hits,
        stats.misses,
        stats.rejected
    );
    Ok(())
}

fn deliver(
    gate: &mut flipbook::LatestFrameGate,
    seq: u64,
    resp: &flipbook::FrameResponse,
) -> String {
    match resp {
        flipbook::FrameResponse::Success(_) if gate.accept(seq) => "shown".to_string(),
        flipbook::FrameResponse::Success(_) => "stale".to_string(),
        flipbook::FrameResponse::Failure(f) => format!("error: {}", f.error),
    }
}

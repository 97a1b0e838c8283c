use std::time::Duration;

#[cfg(feature = "ffmpeg")]
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
#[cfg(feature = "ffmpeg")]
use colored::Colorize;
#[cfg(feature = "ffmpeg")]
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use vidgif::{FixedPolicy, MediaTime, SamplingConfig, TimeRange, VideoInfo, planner};

#[cfg(feature = "ffmpeg")]
use vidgif::{
    AssetLoader, FfmpegLoader, FfmpegLogLevel, FfmpegRenderer, GifMaker, GifOptions,
    HarvestOptions, OperationType, PlayMode, ProgressCallback, ProgressInfo,
};

const CLI_AFTER_HELP: &str = "Examples:\n  vidgif plan --duration 10 --fps 30 --target-fps 10 --every 3\n  vidgif plan --duration 0:01:30 --fps 24 --start 10 --end 14 --json\n  vidgif export input.mp4 --out loop.gif --mode pingpong --width 320 --progress\n  vidgif completions zsh > _vidgif";

#[derive(Debug, Parser)]
#[command(
    name = "vidgif",
    version,
    about = "Sample frames from a video and assemble a looping GIF",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional output.
    #[arg(long)]
    verbose: bool,

    /// Show a progress bar where supported.
    #[arg(long)]
    progress: bool,

    /// Allow overwriting existing output files.
    #[arg(long)]
    overwrite: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[cfg(feature = "ffmpeg")]
    #[arg(long)]
    log_level: Option<String>,
}

/// Frame selection flags shared by `plan` and `export`.
#[derive(Debug, Args, Clone, Default)]
struct SamplingArgs {
    /// Sample at this frame rate instead of the native one.
    #[arg(long)]
    target_fps: Option<f64>,
    /// Keep every Nth instant.
    #[arg(long)]
    every: Option<u64>,
    /// Keep instants on multiples of this many milliseconds (default 1000).
    #[arg(long)]
    interval_ms: Option<i64>,
    /// Start of the sampled range (seconds, MM:SS or HH:MM:SS).
    #[arg(long)]
    start: Option<String>,
    /// End of the sampled range, exclusive.
    #[arg(long)]
    end: Option<String>,
    /// Frame ceiling; also limits the range length at the sampling rate.
    #[arg(long, default_value_t = vidgif::policy::DEFAULT_MAX_FRAME_COUNT)]
    max_frames: usize,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the timestamps that would be sampled.
    #[command(
        about = "Print a sampling plan",
        after_help = "Examples:\n  vidgif plan --duration 10 --fps 30\n  vidgif plan --duration 00:02:00 --fps 25 --target-fps 5 --every 5 --json"
    )]
    Plan {
        /// Probe this media file instead of describing one by hand.
        input: Option<String>,
        /// Duration of the described video (seconds, MM:SS or HH:MM:SS).
        #[arg(long)]
        duration: Option<String>,
        /// Timescale the duration is expressed in.
        #[arg(long, default_value_t = 600)]
        timescale: i32,
        /// Native frame rate of the described video.
        #[arg(long, default_value_t = 30.0)]
        fps: f64,
        #[command(flatten)]
        sampling: SamplingArgs,
        /// Output the plan as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the metadata the sampler works from.
    #[cfg(feature = "ffmpeg")]
    #[command(about = "Print video metadata", visible_alias = "probe")]
    Info {
        /// Input media path or URL.
        input: String,
        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Harvest frames and write a looping GIF.
    #[cfg(feature = "ffmpeg")]
    #[command(
        about = "Export a looping GIF",
        after_help = "Examples:\n  vidgif export input.mp4 --out loop.gif\n  vidgif export input.mp4 --out clip.gif --start 5 --end 8 --target-fps 10 --mode pingpong --width 240"
    )]
    Export {
        /// Input media path or URL.
        input: String,
        /// Output GIF path.
        #[arg(long)]
        out: PathBuf,
        /// Play mode: forward | backward | pingpong.
        #[arg(long, default_value = "forward")]
        mode: String,
        /// Output width in pixels; height follows the aspect ratio.
        #[arg(long)]
        width: Option<u32>,
        /// Total playback length in seconds. Defaults to the sampled span.
        #[arg(long)]
        total_duration: Option<f64>,
        /// Quantizer speed, 1 (best) to 30 (fastest).
        #[arg(long, default_value_t = vidgif::gif::DEFAULT_SPEED)]
        speed: i32,
        /// Concurrent render requests.
        #[arg(long)]
        concurrency: Option<usize>,
        #[command(flatten)]
        sampling: SamplingArgs,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_timecode(value: &str) -> Result<Duration, Box<dyn std::error::Error>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("time value cannot be empty".into());
    }

    if let Ok(seconds) = trimmed.parse::<f64>() {
        return seconds_to_duration(seconds, trimmed);
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(format!("invalid time format: {trimmed}").into());
    }

    let (hours, minutes, seconds_str) = if parts.len() == 3 {
        (parts[0].parse::<u64>()?, parts[1].parse::<u64>()?, parts[2])
    } else {
        (0_u64, parts[0].parse::<u64>()?, parts[1])
    };

    let seconds = seconds_str.parse::<f64>()?;
    let total_seconds = (hours as f64 * 3600.0) + (minutes as f64 * 60.0) + seconds;
    seconds_to_duration(total_seconds, trimmed)
}

fn seconds_to_duration(seconds: f64, raw: &str) -> Result<Duration, Box<dyn std::error::Error>> {
    if !seconds.is_finite() {
        return Err(format!("invalid time value: {raw}").into());
    }
    Duration::try_from_secs_f64(seconds.max(0.0))
        .map_err(|error| format!("invalid time value {raw}: {error}").into())
}

fn sampling_config(
    args: &SamplingArgs,
    info: &VideoInfo,
) -> Result<SamplingConfig, Box<dyn std::error::Error>> {
    let mut config = SamplingConfig::new();
    if let Some(rate) = args.target_fps {
        config = config.with_target_frame_rate(rate);
    }
    if let Some(every) = args.every {
        config = config.with_interval_frames(every);
    }
    if let Some(millis) = args.interval_ms {
        config = config.with_interval_millis(millis);
    }

    if args.start.is_some() || args.end.is_some() {
        let timescale = info.duration.timescale;
        let start = match &args.start {
            Some(value) => MediaTime::from_duration(parse_timecode(value)?, timescale),
            None => MediaTime::new(0, timescale),
        };
        let end = match &args.end {
            Some(value) => MediaTime::from_duration(parse_timecode(value)?, timescale),
            // Half-open ranges would drop the instant at exactly the duration.
            None => info.duration.with_value(info.duration.value.saturating_add(1)),
        };
        if end < start {
            return Err("--start must be <= --end".into());
        }
        config = config.with_range(TimeRange::new(start, end)?);
    }

    Ok(config)
}

#[cfg(feature = "ffmpeg")]
fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(level) = &global.log_level {
        let parsed: FfmpegLogLevel = level
            .parse()
            .map_err(|_| format!("unsupported --log-level: {level}"))?;
        vidgif::set_ffmpeg_log_level(parsed);
    }
    Ok(())
}

#[cfg(not(feature = "ffmpeg"))]
fn apply_global_options(_global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    Ok(())
}

#[cfg(feature = "ffmpeg")]
fn ensure_writable_path(path: &Path, overwrite: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        if overwrite {
            eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                format!("overwriting {}", path.display()).yellow()
            );
        } else {
            return Err(format!(
                "output already exists: {} (use --overwrite to replace)",
                path.display()
            )
            .into());
        }
    }
    Ok(())
}

#[cfg(feature = "ffmpeg")]
fn describe_input(input: &str) -> Result<VideoInfo, Box<dyn std::error::Error>> {
    Ok(FfmpegLoader.load(input)?)
}

#[cfg(not(feature = "ffmpeg"))]
fn describe_input(_input: &str) -> Result<VideoInfo, Box<dyn std::error::Error>> {
    Err("probing a file requires building with the `ffmpeg` feature; use --duration".into())
}

/// Drives an indicatif bar from harvest and encoding callbacks.
#[cfg(feature = "ffmpeg")]
struct TerminalProgress {
    bar: ProgressBar,
}

#[cfg(feature = "ffmpeg")]
impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(0);
        let style =
            ProgressStyle::with_template("{spinner:.green} {msg:>9} {bar:40.cyan/blue} {pos}/{len}")?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

#[cfg(feature = "ffmpeg")]
impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        let message = match info.operation {
            OperationType::FrameHarvest => "rendering",
            OperationType::GifEncoding => "encoding",
            _ => "working",
        };
        self.bar.set_message(message);
        if let Some(total) = info.total {
            self.bar.set_length(total);
        }
        self.bar.set_position(info.current);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;

    match cli.command {
        Commands::Plan {
            input,
            duration,
            timescale,
            fps,
            sampling,
            json,
        } => {
            let info = match (&input, &duration) {
                (Some(input), _) => describe_input(input)?,
                (None, Some(duration)) => {
                    if timescale <= 0 {
                        return Err("--timescale must be positive".into());
                    }
                    let duration = MediaTime::from_duration(parse_timecode(duration)?, timescale);
                    VideoInfo::new(duration, fps, 0, 0)
                }
                (None, None) => return Err("either an input file or --duration is required".into()),
            };

            let config = sampling_config(&sampling, &info)?;
            let policy = FixedPolicy::new(sampling.max_frames);
            let plan = planner::plan_with_policy(&info, &config, &policy)?;

            if json {
                let payload = json!({
                    "duration_seconds": info.duration_seconds(),
                    "frame_rate": plan.frame_rate(),
                    "total_frames": plan.total_frames(),
                    "count": plan.len(),
                    "timestamps": plan.iter().map(|time| time.as_seconds()).collect::<Vec<_>>(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!(
                    "Plan: {} of {} instants at {:.3} fps",
                    plan.len(),
                    plan.total_frames(),
                    plan.frame_rate()
                );
                for (index, time) in plan.iter().enumerate() {
                    println!("  {:>5}  {time}", index + 1);
                }
            }
            if cli.global.verbose {
                eprintln!("duration {} ({} native fps)", info.duration, info.frames_per_second);
            }
        }
        #[cfg(feature = "ffmpeg")]
        Commands::Info { input, json } => {
            let info = describe_input(&input)?;
            if json {
                let payload = json!({
                    "duration_seconds": info.duration_seconds(),
                    "duration_value": info.duration.value,
                    "duration_timescale": info.duration.timescale,
                    "fps": info.frames_per_second,
                    "width": info.width,
                    "height": info.height,
                    "rotation": info.rotation_degrees,
                    "has_video": info.has_video_track,
                    "frame_count": info.estimated_frame_count(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Duration: {}", info.duration);
                if info.has_video_track {
                    println!(
                        "Video: {}x{} @ {:.3} fps, rotation {}°, ~{} frames",
                        info.width,
                        info.height,
                        info.frames_per_second,
                        info.rotation_degrees,
                        info.estimated_frame_count()
                    );
                } else {
                    println!("Video: none");
                }
            }
        }
        #[cfg(feature = "ffmpeg")]
        Commands::Export {
            input,
            out,
            mode,
            width,
            total_duration,
            speed,
            concurrency,
            sampling,
        } => {
            ensure_writable_path(&out, cli.global.overwrite)?;
            let mode: PlayMode = mode.parse()?;

            let info = describe_input(&input)?;
            let config = sampling_config(&sampling, &info)?;

            let progress = if cli.global.progress {
                Some(Arc::new(TerminalProgress::new()?))
            } else {
                None
            };

            let mut harvest_options = HarvestOptions::new();
            if let Some(workers) = concurrency {
                harvest_options = harvest_options.with_concurrency(workers);
            }
            let mut gif_options = GifOptions::new().speed(speed);
            if let Some(width) = width {
                gif_options = gif_options.width(width);
            }
            if let Some(progress) = &progress {
                harvest_options = harvest_options.with_progress(progress.clone());
                gif_options = gif_options.with_progress(progress.clone());
            }

            let mut maker = GifMaker::new(info, FfmpegRenderer::new(input.as_str()))
                .with_policy(Arc::new(FixedPolicy::new(sampling.max_frames)))
                .with_sampling(config)
                .with_harvest_options(harvest_options)
                .with_play_mode(mode);

            let harvested = maker.harvest()?;
            if cli.global.verbose {
                eprintln!("harvested {harvested} frame(s) from {input}");
            }
            let assembly = maker.export(&out, total_duration, &gif_options)?;

            if let Some(progress) = progress {
                progress.bar.finish_with_message("done");
            }

            println!(
                "{} {}",
                "success:".green().bold(),
                format!(
                    "Wrote {} frame(s) ({mode}, {:.2}s per frame) to {}",
                    assembly.len(),
                    assembly.frame_delay_seconds(),
                    out.display()
                )
                .green()
            );
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "vidgif", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Commands, SamplingArgs, parse_timecode, sampling_config};
    use vidgif::{MediaTime, VideoInfo};

    #[test]
    fn parse_timecode_formats() {
        let seconds = parse_timecode("75").unwrap();
        assert_eq!(seconds.as_secs(), 75);

        let mm_ss = parse_timecode("01:15").unwrap();
        assert_eq!(mm_ss.as_secs(), 75);

        let hh_mm_ss = parse_timecode("00:01:15.5").unwrap();
        assert_eq!(hh_mm_ss.as_millis(), 75_500);
    }

    #[test]
    fn parse_timecode_rejects_garbage() {
        assert!(parse_timecode("").is_err());
        assert!(parse_timecode("1:2:3:4").is_err());
        assert!(parse_timecode("ab:cd").is_err());
    }

    #[test]
    fn sampling_range_defaults_to_whole_video() {
        let info = VideoInfo::new(MediaTime::new(6000, 600), 30.0, 0, 0);
        let args = SamplingArgs {
            start: Some("2".to_string()),
            ..SamplingArgs::default()
        };
        let config = sampling_config(&args, &info).unwrap();
        let range = config.range.unwrap();
        assert_eq!(range.start, MediaTime::new(1200, 600));
        assert_eq!(range.end, MediaTime::new(6001, 600));
        assert!(range.contains(info.duration));
    }

    #[test]
    fn open_ended_range_keeps_final_instant() {
        let info = VideoInfo::new(MediaTime::new(6000, 600), 30.0, 0, 0);
        let args = SamplingArgs {
            start: Some("9".to_string()),
            ..SamplingArgs::default()
        };
        let config = sampling_config(&args, &info).unwrap();
        let plan = vidgif::plan(&info, &config).unwrap();
        assert_eq!(plan.last(), Some(info.duration));
    }

    #[test]
    fn huge_timecodes_are_errors() {
        assert!(parse_timecode("1e30").is_err());
        assert!(parse_timecode("00:00:1e30").is_err());
        assert!(parse_timecode("inf").is_err());
        assert!(parse_timecode("NaN").is_err());
    }

    #[test]
    fn sampling_range_rejects_reversed_bounds() {
        let info = VideoInfo::new(MediaTime::new(6000, 600), 30.0, 0, 0);
        let args = SamplingArgs {
            start: Some("5".to_string()),
            end: Some("3".to_string()),
            ..SamplingArgs::default()
        };
        assert!(sampling_config(&args, &info).is_err());
    }

    #[test]
    fn plan_command_parses_sampling_flags() {
        let cli = Cli::parse_from([
            "vidgif",
            "plan",
            "--duration",
            "10",
            "--target-fps",
            "10",
            "--every",
            "3",
        ]);
        let Commands::Plan {
            duration, sampling, ..
        } = cli.command
        else {
            panic!("expected the plan subcommand");
        };
        assert_eq!(duration.as_deref(), Some("10"));
        assert_eq!(sampling.target_fps, Some(10.0));
        assert_eq!(sampling.every, Some(3));
        assert_eq!(sampling.max_frames, vidgif::policy::DEFAULT_MAX_FRAME_COUNT);
    }
}

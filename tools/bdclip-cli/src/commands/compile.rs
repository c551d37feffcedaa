//! Compile subtitle streams into a clip.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use bdclip_clip_model::{ClipDescriptor, EsEntry, EsTrack, Language, SubtitleClipBuilder};
use bdclip_common::config::{AppConfig, CompilingSettings};
use bdclip_common::timecode::{format_timecode, parse_timecode, to_45khz_ticks};
use bdclip_compiler::{
    Orchestrator, ProgressSink, ProgressStage, ProgressTracker, ProgressUpdate, RunOutcome,
};
use clap::Args;

use crate::exit;

/// Language used when neither the command line, the config, nor the locale
/// names one.
const FALLBACK_LANGUAGE: &str = "eng";

#[derive(Debug, Args)]
pub struct CompileArgs {
    /// Subtitle stream files, in track order
    #[arg(short, long = "input", required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Language of each input (ISO 639-1 or 639-2 code)
    #[arg(short, long = "lang", num_args = 1..)]
    pub languages: Vec<String>,

    /// Output stream file; the clip information file is written next to it
    #[arg(short, long)]
    pub output: PathBuf,

    /// Video format (1080p/1080i/720p/576p/576i/480p/480i)
    #[arg(short, long, default_value = "1080p")]
    pub format: String,

    /// Video frame rate (23.976/24/25/29.97/50/59.94)
    #[arg(short = 'r', long = "rate", default_value = "23.976")]
    pub frame_rate: String,

    /// In-time offset, H:MM:SS.fff
    #[arg(short = 't', long, default_value = "0:10:00.000")]
    pub in_time: String,

    /// Compiler executable to launch before connecting
    #[arg(long)]
    pub compiler: Option<PathBuf>,

    /// Directory holding the compiler's schemas
    #[arg(long)]
    pub schema_dir: Option<PathBuf>,

    /// Root for per-run workspaces
    #[arg(long)]
    pub temp_dir: Option<PathBuf>,

    /// Port of the compiling service
    #[arg(long)]
    pub port: Option<u16>,

    /// Cache bound for the compiling service, in bytes
    #[arg(long)]
    pub cache_size: Option<u64>,
}

impl CompileArgs {
    /// Apply command line overrides on top of configured settings.
    pub fn settings(&self, mut base: CompilingSettings) -> CompilingSettings {
        if let Some(compiler) = &self.compiler {
            base.compiler_path = Some(compiler.clone());
        }
        if let Some(schema_dir) = &self.schema_dir {
            base.schema_dir = schema_dir.clone();
        }
        if let Some(temp_dir) = &self.temp_dir {
            base.temp_dir = temp_dir.clone();
        }
        if let Some(port) = self.port {
            base.port = port;
        }
        if let Some(cache_size) = self.cache_size {
            base.cache_size = cache_size;
        }
        base
    }
}

pub async fn run(args: CompileArgs, config: AppConfig) -> anyhow::Result<i32> {
    let in_time = match parse_timecode(&args.in_time) {
        Ok(offset) => offset,
        Err(e) => {
            eprintln!("ERROR: {e}");
            return Ok(exit::INPUT_ERROR);
        }
    };

    let language = default_language(&config, locale_from_env());
    let clip = match SubtitleClipBuilder::new(language)
        .in_time_offset(in_time)
        .build(&args.inputs, &args.languages, &args.format, &args.frame_rate)
    {
        Ok(clip) => clip,
        Err(e) => {
            eprintln!("ERROR: {e}");
            return Ok(exit::INPUT_ERROR);
        }
    };

    let settings = args.settings(config.compiler);
    println!("Compiling {} subtitle stream(s)", clip.tracks().len());
    for descriptor in clip.tracks() {
        if let Some(entry) = clip.entry_for(descriptor) {
            println!("{}", track_line(&descriptor.track, entry));
        }
    }
    println!("{}", video_line(&clip));
    println!(
        "  In time: {} ({} ticks)",
        format_timecode(clip.in_time_offset()),
        to_45khz_ticks(clip.in_time_offset())
    );
    println!("  Service: {}", settings.connection_string());
    println!("  Output: {}", args.output.display());

    let progress = Arc::new(ProgressTracker::with_callback(Box::new(print_progress)));
    let cancel = progress.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nCancelling...");
            cancel.cancel();
        }
    });

    let orchestrator = Orchestrator::tcp(settings);
    let result = orchestrator
        .compile_and_deliver(&clip, &args.output, progress)
        .await;
    ctrl_c.abort();

    match &result {
        Ok(RunOutcome::Delivered { artifacts, .. }) => {
            println!("Compilation complete:");
            println!("  {}", artifacts.stream.display());
            println!("  {}", artifacts.clip_info.display());
        }
        Ok(RunOutcome::CompileFailed { compilation }) => {
            eprintln!(
                "Compilation failed; workspace kept at {}",
                compilation.workspace.display()
            );
        }
        Ok(RunOutcome::FinalizeFailed { compilation, error }) => {
            eprintln!("ERROR: {error}");
            eprintln!("Compiled output is in {}", compilation.workspace.display());
        }
        Err(e) => eprintln!("ERROR: {e}"),
    }

    Ok(exit::for_run(&result))
}

fn track_line(track: &EsTrack, entry: &EsEntry) -> String {
    format!(
        "  {track} coding 0x{:02X} PID 0x{:04X} <- {}",
        track.coding_type.code(),
        track.pid(),
        entry.source.display()
    )
}

fn video_line(clip: &ClipDescriptor) -> String {
    let format = clip.video_format();
    let rate = clip.video_frame_rate();
    format!(
        "  Video: {} (0x{:X}) @ {} (0x{:X})",
        format.token(),
        format.code(),
        rate.token(),
        rate.code()
    )
}

fn print_progress(update: ProgressUpdate) {
    match update.stage {
        ProgressStage::Running => {
            print!(
                "\r  Progress: {:.1}% ({}/{})  ",
                update.fraction() * 100.0,
                update.current,
                update.total
            );
            std::io::stdout().flush().ok();
        }
        ProgressStage::Completed { .. } => println!(),
    }
}

/// First non-empty locale variable of the process, in POSIX precedence.
pub(crate) fn locale_from_env() -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| !value.is_empty())
}

/// Language token for subtitles given without `--lang`.
pub(crate) fn default_language(config: &AppConfig, locale: Option<String>) -> String {
    if let Some(token) = &config.default_language {
        return token.clone();
    }
    locale
        .map(|locale| Language::from_locale(&locale))
        .filter(|lang| lang.is_valid())
        .map(|lang| lang.code().to_string())
        .unwrap_or_else(|| FALLBACK_LANGUAGE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: CompileArgs,
    }

    fn parse(argv: &[&str]) -> CompileArgs {
        Harness::try_parse_from(std::iter::once("bdclip").chain(argv.iter().copied()))
            .unwrap()
            .args
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["-i", "a.sup", "b.sup", "-o", "out.m2ts"]);
        assert_eq!(args.inputs, vec![PathBuf::from("a.sup"), PathBuf::from("b.sup")]);
        assert!(args.languages.is_empty());
        assert_eq!(args.format, "1080p");
        assert_eq!(args.frame_rate, "23.976");
        assert_eq!(args.in_time, "0:10:00.000");
    }

    #[test]
    fn test_inputs_are_required() {
        let result = Harness::try_parse_from(["bdclip", "-o", "out.m2ts"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_replace_configured_settings() {
        let args = parse(&[
            "-i",
            "a.sup",
            "-o",
            "out.m2ts",
            "--compiler",
            "/opt/mux/server",
            "--port",
            "9920",
            "--cache-size",
            "838860800",
        ]);
        let base = CompilingSettings::default();
        let settings = args.settings(base.clone());

        assert_eq!(settings.compiler_path, Some(PathBuf::from("/opt/mux/server")));
        assert_eq!(settings.port, 9920);
        assert_eq!(settings.cache_size, 838_860_800);
        assert_eq!(settings.schema_dir, base.schema_dir);
        assert_eq!(settings.temp_dir, base.temp_dir);
    }

    #[test]
    fn test_summary_shows_stream_codes() {
        let clip = SubtitleClipBuilder::new("eng".to_string())
            .build(
                &[PathBuf::from("a.sup"), PathBuf::from("b.sup")],
                &["eng".to_string(), "jpn".to_string()],
                "1080p",
                "23.976",
            )
            .unwrap();

        let lines: Vec<String> = clip
            .tracks()
            .iter()
            .map(|d| track_line(&d.track, clip.entry_for(d).unwrap()))
            .collect();
        assert!(lines[0].contains("coding 0x90 PID 0x1200 <- a.sup"));
        assert!(lines[1].contains("coding 0x90 PID 0x1201 <- b.sup"));

        let video = video_line(&clip);
        assert!(video.contains(&format!("1080p (0x{:X})", clip.video_format().code())));
        assert!(video.contains(&format!("23.976 (0x{:X})", clip.video_frame_rate().code())));
    }

    #[test]
    fn test_default_language_resolution() {
        let mut config = AppConfig::default();
        assert_eq!(
            default_language(&config, Some("fr_FR.UTF-8".to_string())),
            "fre"
        );
        assert_eq!(default_language(&config, Some("C".to_string())), "eng");
        assert_eq!(default_language(&config, None), "eng");

        config.default_language = Some("jpn".to_string());
        assert_eq!(
            default_language(&config, Some("fr_FR.UTF-8".to_string())),
            "jpn"
        );
    }
}

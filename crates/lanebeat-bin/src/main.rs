use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lanebeat_model::{ChartFormat, ChartParser, MusicInfo, NoteTimeline};
use lanebeat_play::traits::{ChartSource, DirChartSource, ManualTransport, ScriptedInput};
use lanebeat_play::{
    EngineConfig, JsonRecordStore, JudgmentEngine, PlaySession, PlaySummary, RecordOutcome,
    autoplay_inputs, record_play,
};
use lanebeat_rule::Grade;
use log::{debug, info};

/// Upper bound on simulated frames, a little over an hour at 16ms.
const MAX_FRAMES: u64 = 250_000;

#[derive(Parser, Debug)]
#[command(name = "lanebeat", about = "Lane rhythm game chart and scoring tool")]
struct Args {
    /// Engine config file (defaults are used when it doesn't exist)
    #[arg(short, long, global = true, default_value = "lanebeat.json")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List chart ids available under a chart directory
    List {
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
    /// Print song-select info and totals for a chart
    Info {
        chart_id: String,

        #[command(flatten)]
        chart: ChartArgs,
    },
    /// Play a chart with perfect timing and report the result
    Autoplay {
        chart_id: String,

        #[command(flatten)]
        chart: ChartArgs,

        /// Save the result, personal best and ranking under this directory
        #[arg(long)]
        record_dir: Option<PathBuf>,

        #[arg(long, default_value = "autoplay")]
        uid: String,
    },
}

#[derive(clap::Args, Debug)]
struct ChartArgs {
    /// Directory holding csv/<chart_id>.csv
    #[arg(long, default_value = ".")]
    root: PathBuf,

    #[arg(long, env = "LANEBEAT_AUDIO_BASE", default_value = "")]
    audio_base: String,

    /// Chart has no composer/mode/level header lines
    #[arg(long)]
    legacy: bool,

    /// Skip malformed note rows instead of failing
    #[arg(long)]
    lenient: bool,
}

impl ChartArgs {
    fn source(&self) -> DirChartSource {
        DirChartSource::new(&self.root, self.audio_base.clone())
    }

    fn parser(&self) -> ChartParser {
        let format = if self.legacy {
            ChartFormat::Legacy
        } else {
            ChartFormat::Standard
        };
        let parser = ChartParser::new(format);
        if self.lenient { parser.lenient() } else { parser }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = EngineConfig::load_from(&args.config)?;
    config
        .validate()
        .with_context(|| format!("invalid config {}", args.config.display()))?;
    debug!("config: {:?}", config);

    match args.command {
        Command::List { root } => {
            let source = DirChartSource::new(root, "");
            for id in source.chart_ids()? {
                println!("{id}");
            }
        }
        Command::Info { chart_id, chart } => {
            let (info, _) = load_chart(&config, &chart, &chart_id)?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Command::Autoplay {
            chart_id,
            chart,
            record_dir,
            uid,
        } => {
            let (info, timeline) = load_chart(&config, &chart, &chart_id)?;
            info!("autoplay: {} ({} notes)", info.name, timeline.note_count());
            let summary = run_autoplay(&config, &chart_id, timeline)?;
            print_summary(&summary);

            if let Some(dir) = record_dir {
                let outcome = save_result(&config, dir, &chart_id, &uid, &summary)?;
                println!("result id: {}", outcome.result_id);
                if outcome.new_best {
                    println!("new personal best");
                }
                if let Some(position) = outcome.ranking_position {
                    println!("ranking: #{position}");
                }
            }
        }
    }

    Ok(())
}

fn load_chart(
    config: &EngineConfig,
    args: &ChartArgs,
    chart_id: &str,
) -> Result<(MusicInfo, NoteTimeline)> {
    let text = args.source().chart_text(chart_id)?;
    let chart = args
        .parser()
        .parse(&text, config.layout.len())
        .with_context(|| format!("failed to parse chart {chart_id}"))?;
    let timeline = config.timeline_builder().build(&chart);
    let info = MusicInfo::from_chart(chart_id, &chart, timeline.totals(&config.rule));
    Ok((info, timeline))
}

/// Drives a full session frame by frame on a manual clock.
fn run_autoplay(
    config: &EngineConfig,
    chart_id: &str,
    timeline: NoteTimeline,
) -> Result<PlaySummary> {
    let transport = ManualTransport::new();
    let clock = transport.clock();
    let mut input = ScriptedInput::new(autoplay_inputs(&timeline), clock.clone());
    let engine = JudgmentEngine::new(timeline, config);
    let mut session = PlaySession::new(chart_id, engine, transport);
    session.start()?;

    let mut frames = 0;
    while !session.frame(&mut input, &mut ()) {
        clock.advance(config.tick_interval_ms);
        frames += 1;
        if frames >= MAX_FRAMES {
            anyhow::bail!("autoplay of {chart_id} did not finish after {frames} frames");
        }
    }
    debug!("autoplay finished after {} frames", frames);
    Ok(session.summary())
}

fn save_result(
    config: &EngineConfig,
    dir: PathBuf,
    chart_id: &str,
    uid: &str,
    summary: &PlaySummary,
) -> Result<RecordOutcome> {
    let mut store = JsonRecordStore::new(dir);
    record_play(&mut store, chart_id, uid, summary, config.ranking_size)
}

fn print_summary(summary: &PlaySummary) {
    println!(
        "score: {} / {} ({:.2}%)",
        summary.final_score,
        summary.max_score,
        summary.score_rate() * 100.0
    );
    println!("combo: {} / {}", summary.best_combo, summary.max_combo);
    for &grade in Grade::all() {
        println!("{:>8}: {}", grade.label(), summary.count(grade));
    }
    println!("hold ticks: {}", summary.hold_ticks);
    if summary.is_full_combo() {
        println!("FULL COMBO");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const CHART: &str = "Song\nBy\nnormal\n3\n120\n4\n0\n0,0,0,,,,,\n0,2,,1,,,,\n1,0,,,0,,,\n";

    fn chart_args(root: PathBuf) -> ChartArgs {
        ChartArgs {
            root,
            audio_base: String::new(),
            legacy: false,
            lenient: false,
        }
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "lanebeat",
            "autoplay",
            "song-normal",
            "--root",
            "charts",
            "--record-dir",
            "records",
            "-v",
        ])
        .unwrap();
        assert!(args.verbose);
        match args.command {
            Command::Autoplay {
                chart_id,
                chart,
                record_dir,
                uid,
            } => {
                assert_eq!(chart_id, "song-normal");
                assert_eq!(chart.root, PathBuf::from("charts"));
                assert_eq!(record_dir, Some(PathBuf::from("records")));
                assert_eq!(uid, "autoplay");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_autoplay_and_record() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("csv")).unwrap();
        fs::write(dir.path().join("csv/song-normal.csv"), CHART).unwrap();

        let config = EngineConfig::default();
        let (info, timeline) =
            load_chart(&config, &chart_args(dir.path().to_path_buf()), "song-normal").unwrap();
        assert_eq!(info.name, "Song");
        assert_eq!(info.level, 3);

        let summary = run_autoplay(&config, "song-normal", timeline).unwrap();
        assert_eq!(summary.final_score, info.max_score);
        assert_eq!(summary.best_combo, info.max_combo);

        let records = dir.path().join("records");
        let outcome = save_result(&config, records.clone(), "song-normal", "me", &summary).unwrap();
        assert!(outcome.new_best);
        assert_eq!(outcome.ranking_position, Some(1));
        assert!(records.join("public/song-normal.json").exists());
    }

    #[test]
    fn test_missing_chart_is_error() {
        let dir = tempdir().unwrap();
        let config = EngineConfig::default();
        let result = load_chart(&config, &chart_args(dir.path().to_path_buf()), "nope-normal");
        assert!(result.is_err());
    }
}

use std::error::Error;
use std::path::Path;

use monitor::{synth::SyntheticPpg, Config, RawReading, Session, SessionEvent};
use plotpy::{Curve, Plot};
use pulseox::{Outcome, Reason};

#[derive(serde::Deserialize)]
struct Row {
    red: u32,
    ir: u32,
    elapsed_ms: u32,
    #[serde(default = "default_temperature")]
    temperature: f32,
}

fn default_temperature() -> f32 {
    36.6
}

impl From<Row> for RawReading {
    fn from(r: Row) -> Self {
        RawReading {
            red: r.red,
            ir: r.ir,
            elapsed_ms: r.elapsed_ms,
            temperature: r.temperature,
        }
    }
}

fn plot_values_multiple(vals: &[(&str, &[(f32, f32)])], path: &str) {
    let mut plot = Plot::new();
    for (label, vals) in vals {
        let mut curve = Curve::new();
        curve.set_line_width(2.0);

        curve.points_begin();
        for &(x, y) in *vals {
            curve.points_add(x, y);
        }
        curve.points_end();
        curve.set_label(label);

        plot.add(&curve);
    }

    if let Err(e) = plot.legend().grid_and_labels("s", "value").save(path) {
        println!("{}", e);
    }
}

fn read_recording(name: &str) -> Result<Vec<RawReading>, Box<dyn Error>> {
    let mut rdr = csv::Reader::from_path(name)?;
    let mut out = Vec::new();
    for result in rdr.deserialize() {
        let row: Row = result?;
        out.push(row.into());
    }
    Ok(out)
}

fn synthetic(bpm: &str, spo2: &str, seconds: &str) -> Result<Vec<RawReading>, Box<dyn Error>> {
    let source = SyntheticPpg::new(bpm.parse()?).with_spo2(spo2.parse()?);
    let n = seconds.parse::<u32>()? * 1000 / source.sample_period_ms();
    Ok(source.take(n as usize).collect())
}

const USAGE: &str = "usage: analyze_ppg [--config <file>] [--plot <out.svg>] \
                     (<recording.csv> | --synthetic <bpm> <spo2> <seconds>)";

#[derive(Default)]
struct Counts {
    published: usize,
    beats: usize,
    rejected: usize,
    degenerate: usize,
    signal_lost: usize,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut config = Config::default();
    let mut plot_path = None;
    let mut readings = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                config = Config::load(Path::new(&args[i + 1]))?;
                i += 2;
            }
            "--plot" if i + 1 < args.len() => {
                plot_path = Some(args[i + 1].clone());
                i += 2;
            }
            "--synthetic" if i + 3 < args.len() => {
                readings = Some(synthetic(&args[i + 1], &args[i + 2], &args[i + 3])?);
                i += 4;
            }
            file if !file.starts_with("--") => {
                readings = Some(read_recording(file)?);
                i += 1;
            }
            _ => break,
        }
    }
    let Some(readings) = readings else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };

    let mut session = Session::new(&config);
    let mut counts = Counts::default();
    let mut bpm_vals = Vec::new();
    let mut spo2_vals = Vec::new();

    for r in readings {
        let s = r.elapsed_ms as f32 / 1000.0;
        match session.feed(r, None)? {
            SessionEvent::Published { record, batch } => {
                counts.published += 1;
                bpm_vals.push((s, record.bpm as f32));
                spo2_vals.push((s, record.spo2));
                if let Some(doc) = batch {
                    println!("{}", doc);
                }
            }
            SessionEvent::Measuring(Outcome::Unchanged { reason, .. }) => match reason {
                Reason::BeatAccepted | Reason::FirstBeat => counts.beats += 1,
                Reason::Rejected(_) => counts.rejected += 1,
                Reason::Degenerate(_) => counts.degenerate += 1,
                Reason::SignalLost => counts.signal_lost += 1,
                _ => {}
            },
            _ => {}
        }
    }

    let reading = session.oximeter().reading();
    log::info!(
        "{} records ({} pending), {} beats, {} rejected, {} degenerate, {} signal losses",
        counts.published,
        session.pending(),
        counts.beats,
        counts.rejected,
        counts.degenerate,
        counts.signal_lost,
    );
    eprintln!("final: {} bpm, spo2 {:.2}", reading.bpm, reading.spo2);

    if let Some(path) = plot_path {
        plot_values_multiple(
            &[("bpm", bpm_vals.as_slice()), ("spo2", spo2_vals.as_slice())],
            &path,
        );
    }

    Ok(())
}

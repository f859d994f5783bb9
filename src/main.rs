//! Keyline CLI - Inspect, sample and convert keyframe timelines.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use keyline::{
    archive::{self, CompressionType},
    compute::{Timeline, TimelineStats, sample_times},
    schema::TimelineDocument,
};

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <timeline.json|timeline.ktl> [start end samples]", args[0]);
        eprintln!("       {} --convert <in.json> <out.ktl>", args[0]);
        eprintln!();
        eprintln!("Print statistics and samples of a keyframe timeline.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  timeline  JSON document or .ktl archive");
        eprintln!("  start     First sample time (default: first point)");
        eprintln!("  end       Last sample time (default: last point)");
        eprintln!("  samples   Number of samples (default: 11)");
        eprintln!();
        eprintln!("Example document is generated with --example flag.");
        std::process::exit(1);
    }

    match args[1].as_str() {
        "--example" => {
            print_example_document();
            return;
        }
        "--convert" => {
            let (Some(input), Some(output)) = (args.get(2), args.get(3)) else {
                eprintln!("Usage: {} --convert <in.json> <out.ktl>", args[0]);
                std::process::exit(1);
            };
            convert(Path::new(input), Path::new(output));
            return;
        }
        _ => {}
    }

    let path = PathBuf::from(&args[1]);
    let timeline = load_timeline(&path);

    let start: f64 = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(timeline.time_min());
    let end: f64 = args
        .get(3)
        .and_then(|s| s.parse().ok())
        .unwrap_or(timeline.time_max());
    let samples: usize = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(11);

    let stats = TimelineStats::from_timeline(&timeline);

    println!("Keyline Timeline");
    println!("================");
    println!("File: {}", path.display());
    println!("Points: {}", stats.points);
    println!("Dimensions: {}", stats.dimensions);
    println!("Span: [{:.6}, {:.6}]s", stats.time_min, stats.time_max);
    println!(
        "Value range: {:?} .. {:?}",
        stats.value_min.as_slice(),
        stats.value_max.as_slice()
    );
    for (kind, count) in &stats.kinds {
        println!("  {}: {}", kind, count);
    }
    println!();

    let times = sample_times(start, end, samples);
    let timer = Instant::now();
    let values = timeline.sample_many(&times);
    let elapsed = timer.elapsed();

    println!("Samples:");
    for (t, v) in times.iter().zip(&values) {
        println!("  t={:>12.6}  {:?}", t, v.as_slice());
    }
    println!();
    println!(
        "Time: {:.3}ms ({} samples)",
        elapsed.as_secs_f64() * 1000.0,
        values.len()
    );
}

fn load_timeline(path: &Path) -> Timeline {
    if path.extension().is_some_and(|ext| ext == "ktl") {
        return archive::load_file(path).unwrap_or_else(|e| {
            eprintln!("Error reading archive: {}", e);
            std::process::exit(1);
        });
    }

    let text = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading document: {}", e);
        std::process::exit(1);
    });

    TimelineDocument::from_json(&text)
        .and_then(|doc| doc.into_timeline())
        .unwrap_or_else(|e| {
            eprintln!("Error loading document: {}", e);
            std::process::exit(1);
        })
}

fn convert(input: &Path, output: &Path) {
    let timeline = load_timeline(input);
    let compression = if cfg!(feature = "lz4") {
        CompressionType::Lz4
    } else {
        CompressionType::None
    };

    match archive::save_file(output, &timeline, compression) {
        Ok(stats) => println!(
            "Wrote {} point(s) to {} ({} bytes, {:?})",
            stats.point_count,
            output.display(),
            stats.total_bytes,
            stats.compression
        ),
        Err(e) => {
            eprintln!("Error writing archive: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_example_document() {
    let document = TimelineDocument::example();

    println!("Example document (timeline.json):");
    match document.to_json_pretty() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing example: {}", e);
            std::process::exit(1);
        }
    }
}

use std::env;
use std::ptr;
use std::time::Instant;

use html_namespacing::add_namespace_to_html;
use html_namespacing::ffi::{HTML_NAMESPACING_OK, add_namespace_to_html_with_length, html_namespacing_free};
use libc::c_char;
use serde_json::json;

const NAMESPACE: &str = "users-show";

#[derive(Clone, Copy)]
struct RunConfig {
    warmup: usize,
    iterations: usize,
}

struct Sample {
    name: &'static str,
    html: Vec<u8>,
    cfg: RunConfig,
}

#[derive(Default, Clone)]
struct Stats {
    avg_ms: f64,
    p50_ms: f64,
    p95_ms: f64,
    p99_ms: f64,
    input_mb_per_s: f64,
}

fn percentile_ms(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() - 1) as f64 * p).round() as usize;
    sorted[idx]
}

fn summarize(durations_s: &[f64], input_bytes: usize) -> Stats {
    let mut ms: Vec<f64> = durations_s.iter().map(|d| d * 1000.0).collect();
    ms.sort_by(f64::total_cmp);
    let total_s: f64 = durations_s.iter().sum();
    let avg_ms = if durations_s.is_empty() {
        0.0
    } else {
        total_s * 1000.0 / durations_s.len() as f64
    };
    let input_mb_per_s = if total_s > 0.0 {
        (input_bytes as f64 * durations_s.len() as f64) / (1024.0 * 1024.0) / total_s
    } else {
        0.0
    };

    Stats {
        avg_ms,
        p50_ms: percentile_ms(&ms, 0.50),
        p95_ms: percentile_ms(&ms, 0.95),
        p99_ms: percentile_ms(&ms, 0.99),
        input_mb_per_s,
    }
}

/// A page fragment with sibling roots, nested markup, comments and classes
fn seed() -> &'static [u8] {
    b"<article class=\"post\"><h2>Title</h2><p>Some <em>text</em> &amp; a <a href=\"/x?a=1&b=2\">link</a>.</p><!-- note --><img src=\"a.png\" /></article>"
}

fn repeat_to_size(seed: &[u8], target_size: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(target_size + seed.len());
    while out.len() + seed.len() < target_size {
        out.extend_from_slice(seed);
        out.push(b'\n');
    }
    out
}

fn build_samples() -> Vec<Sample> {
    vec![
        Sample {
            name: "small",
            html: seed().to_vec(),
            cfg: RunConfig {
                warmup: 1000,
                iterations: 30000,
            },
        },
        Sample {
            name: "medium",
            html: repeat_to_size(seed(), 10 * 1024),
            cfg: RunConfig {
                warmup: 100,
                iterations: 3000,
            },
        },
        Sample {
            name: "large",
            html: repeat_to_size(seed(), 1024 * 1024),
            cfg: RunConfig {
                warmup: 5,
                iterations: 100,
            },
        },
    ]
}

fn run_rust_api(sample: &Sample) -> Stats {
    let mut durations = Vec::with_capacity(sample.cfg.iterations);
    for i in 0..sample.cfg.warmup + sample.cfg.iterations {
        let start = Instant::now();
        let out = add_namespace_to_html(&sample.html, NAMESPACE);
        let elapsed = start.elapsed().as_secs_f64();
        if let Err(e) = out {
            panic!("sample {} rejected: {e}", sample.name);
        }
        if i >= sample.cfg.warmup {
            durations.push(elapsed);
        }
    }
    summarize(&durations, sample.html.len())
}

fn run_ffi(sample: &Sample) -> Stats {
    let ns = c"users-show";
    let mut durations = Vec::with_capacity(sample.cfg.iterations);
    for i in 0..sample.cfg.warmup + sample.cfg.iterations {
        let mut out: *mut c_char = ptr::null_mut();
        let mut out_len = 0usize;

        let start = Instant::now();
        let rv = unsafe {
            add_namespace_to_html_with_length(
                sample.html.as_ptr().cast(),
                sample.html.len(),
                ns.as_ptr(),
                &mut out,
                &mut out_len,
            )
        };
        unsafe { html_namespacing_free(out) };
        let elapsed = start.elapsed().as_secs_f64();

        assert_eq!(rv, HTML_NAMESPACING_OK, "sample {} rejected", sample.name);
        if i >= sample.cfg.warmup {
            durations.push(elapsed);
        }
    }
    summarize(&durations, sample.html.len())
}

fn stats_json(stats: &Stats) -> serde_json::Value {
    json!({
        "avg_ms": stats.avg_ms,
        "p50_ms": stats.p50_ms,
        "p95_ms": stats.p95_ms,
        "p99_ms": stats.p99_ms,
        "input_mb_per_s": stats.input_mb_per_s,
    })
}

fn print_table(results: &[(&Sample, Stats, Stats)]) {
    println!("# Namespacing Baseline (local, release build)");
    println!();
    println!("| Sample | HTML bytes | API avg ms | API P95 ms | FFI avg ms | FFI P99 ms | MB/s |");
    println!("|--------|------------|------------|------------|------------|------------|------|");
    for (sample, api, ffi) in results {
        println!(
            "| {} | {} | {:.4} | {:.4} | {:.4} | {:.4} | {:.1} |",
            sample.name,
            sample.html.len(),
            api.avg_ms,
            api.p95_ms,
            ffi.avg_ms,
            ffi.p99_ms,
            api.input_mb_per_s
        );
    }
    println!();
}

fn main() {
    let as_json = env::args().any(|arg| arg == "--json");

    let samples = build_samples();
    let results: Vec<_> = samples
        .iter()
        .map(|sample| (sample, run_rust_api(sample), run_ffi(sample)))
        .collect();

    if as_json {
        let report: Vec<_> = results
            .iter()
            .map(|(sample, api, ffi)| {
                json!({
                    "sample": sample.name,
                    "html_bytes": sample.html.len(),
                    "api": stats_json(api),
                    "ffi": stats_json(ffi),
                })
            })
            .collect();
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{text}"),
            Err(e) => eprintln!("failed to serialize report: {e}"),
        }
    } else {
        print_table(&results);
    }
}

//! CLI tool for querying laid-out page text

use std::env;
use std::process;
use stext_inspector::{
    layout_text_file, CopyOptions, LayoutMetrics, LineEnding, Point, Rect, SearchOptions,
    StextError, StructuredText,
};

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} <text_file> search <needle> [--ignore-case] [--normalize]", program);
    eprintln!("       {} <text_file> locate <x> <y>", program);
    eprintln!("       {} <text_file> highlight <x0> <y0> <x1> <y1>", program);
    eprintln!("       {} <text_file> copy <x0> <y0> <x1> <y1> [--crlf]", program);
    eprintln!();
    eprintln!("Lays the file out on a 10x10 monospace grid, one block per paragraph.");
    process::exit(1);
}

/// Split command arguments into `--` flags and positional values
fn split_args(args: &[String]) -> (Vec<&str>, Vec<&str>) {
    args.iter()
        .map(|a| a.as_str())
        .partition(|a| a.starts_with("--"))
}

fn parse_point(program: &str, x: Option<&&str>, y: Option<&&str>) -> Point {
    match (
        x.and_then(|v| v.parse::<f32>().ok()),
        y.and_then(|v| v.parse::<f32>().ok()),
    ) {
        (Some(x), Some(y)) => Point::new(x, y),
        _ => usage(program),
    }
}

fn format_rect(r: &Rect) -> String {
    format!("[{:.1} {:.1} {:.1} {:.1}]", r.x0, r.y0, r.x1, r.y1)
}

fn run(args: &[String]) -> Result<i32, StextError> {
    let program = &args[0];
    let page = layout_text_file(&args[1], &LayoutMetrics::default())?;
    let text = StructuredText::new(page);
    let (flags, values) = split_args(&args[3..]);

    match args[2].as_str() {
        "search" => {
            let needle = values.first().copied().unwrap_or_else(|| usage(program));
            let options = SearchOptions {
                ignore_case: flags.contains(&"--ignore-case"),
                normalize_whitespace: flags.contains(&"--normalize"),
                ..Default::default()
            };
            let hits = text.search_with(needle, &options)?;
            for hit in &hits {
                let rects: Vec<String> = hit.rects.iter().map(format_rect).collect();
                println!("{}..{} {}", hit.start, hit.end, rects.join(" "));
            }
            if hits.is_empty() {
                eprintln!("No matches for \"{}\"", needle);
                return Ok(2);
            }
        }
        "locate" => {
            let p = parse_point(program, values.first(), values.get(1));
            let pos = text.locate(p)?;
            let center = text.center_point(pos)?;
            println!("{:?} center=({:.1}, {:.1})", pos, center.x, center.y);
        }
        "highlight" => {
            let a = parse_point(program, values.first(), values.get(1));
            let b = parse_point(program, values.get(2), values.get(3));
            let range = text.range(a, b)?;
            println!("{}..{}", range.start(), range.end());
            for rect in &range.rects {
                println!("{}", format_rect(rect));
            }
        }
        "copy" => {
            let a = parse_point(program, values.first(), values.get(1));
            let b = parse_point(program, values.get(2), values.get(3));
            let options = CopyOptions {
                line_ending: if flags.contains(&"--crlf") {
                    LineEnding::CrLf
                } else {
                    LineEnding::Lf
                },
                ..Default::default()
            };
            print!("{}", text.copy_text_with(a, b, &options)?);
            println!();
        }
        _ => usage(program),
    }

    Ok(0)
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        usage(args.first().map(|s| s.as_str()).unwrap_or("stext-query"));
    }

    match run(&args) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

// CLI entry point for inspecting room navigation.
//
// Loads a room's walkboxes from JSON, runs one path query and/or dumps the
// visibility graph, and prints the result as JSON on stdout so external
// tools can draw it. Set `RUST_LOG=debug` to see graph rebuilds and
// clamping, `RUST_LOG=trace` for search statistics.
//
// Usage:
//   navdump --room <FILE> [OPTIONS]
//     --room <FILE>       Room JSON: {"walkboxes": [...]}
//     --config <FILE>     NavConfig JSON (default: built-in defaults)
//     --from <X,Y>        Path start (requires --to)
//     --to <X,Y>          Path end (requires --from)
//     --graph             Print the visibility graph

use mossfen_nav::{NavConfig, NavGraph, PathFinder, Vec2, Walkbox, path_length};
use serde::{Deserialize, Serialize};

#[derive(Default)]
struct Args {
    room: Option<String>,
    config: Option<String>,
    from: Option<Vec2>,
    to: Option<Vec2>,
    graph: bool,
}

#[derive(Deserialize)]
struct Room {
    walkboxes: Vec<Walkbox>,
}

#[derive(Serialize)]
struct Output<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<Vec<Vec2>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    length: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    graph: Option<&'a NavGraph>,
}

fn main() {
    env_logger::init();
    let args = parse_args();

    let Some(room_path) = args.room else {
        eprintln!("--room is required");
        print_usage();
        std::process::exit(1);
    };
    let room: Room = read_json(&room_path);
    let config = match &args.config {
        Some(path) => read_json::<NavConfig>(path),
        None => NavConfig::default(),
    };

    let mut finder = PathFinder::new(config);

    let path = match (args.from, args.to) {
        (Some(from), Some(to)) => Some(finder.calculate_path(&room.walkboxes, from, to)),
        (None, None) => None,
        _ => {
            eprintln!("--from and --to must be given together");
            std::process::exit(1);
        }
    };
    let length = path.as_deref().map(path_length);

    let graph = if args.graph {
        Some(finder.graph(&room.walkboxes))
    } else {
        None
    };

    let output = Output {
        path,
        length,
        graph,
    };
    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Failed to encode output: {e}");
            std::process::exit(1);
        }
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &str) -> T {
    let text = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Failed to read {path}: {e}");
        std::process::exit(1);
    });
    serde_json::from_str(&text).unwrap_or_else(|e| {
        eprintln!("Failed to parse {path}: {e}");
        std::process::exit(1);
    })
}

/// Parse `x,y` into a point.
fn parse_point(s: &str) -> Option<Vec2> {
    let (x, y) = s.split_once(',')?;
    Some(Vec2::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
}

/// Parse command-line arguments. Uses simple `std::env::args()` matching.
fn parse_args() -> Args {
    let mut args = Args::default();
    let argv: Vec<String> = std::env::args().collect();
    let mut i = 1;

    while i < argv.len() {
        match argv[i].as_str() {
            "--room" => {
                i += 1;
                args.room = argv.get(i).cloned().or_else(|| {
                    eprintln!("--room requires a file path");
                    std::process::exit(1);
                });
            }
            "--config" => {
                i += 1;
                args.config = argv.get(i).cloned().or_else(|| {
                    eprintln!("--config requires a file path");
                    std::process::exit(1);
                });
            }
            "--from" => {
                i += 1;
                args.from = argv.get(i).and_then(|s| parse_point(s)).or_else(|| {
                    eprintln!("--from requires a point like 10,20");
                    std::process::exit(1);
                });
            }
            "--to" => {
                i += 1;
                args.to = argv.get(i).and_then(|s| parse_point(s)).or_else(|| {
                    eprintln!("--to requires a point like 10,20");
                    std::process::exit(1);
                });
            }
            "--graph" => args.graph = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    args
}

fn print_usage() {
    println!("Usage: navdump --room <FILE> [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --room <FILE>       Room JSON with a \"walkboxes\" array");
    println!("  --config <FILE>     NavConfig JSON (default: built-in defaults)");
    println!("  --from <X,Y>        Path start (requires --to)");
    println!("  --to <X,Y>          Path end (requires --from)");
    println!("  --graph             Print the visibility graph");
    println!("  --help, -h          Show this help");
}

use std::env;
use std::time::Instant;

use held_karp::utils::round_to;
use held_karp::{GenerationStats, HeldKarp, Problem, TableKind};
use sysinfo::{get_current_pid, ProcessRefreshKind, System};

fn main() {
    let options = match Options::parse(env::args().skip(1)) {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("tsp_probe: {err}");
            Options::print_help();
            std::process::exit(2);
        }
    };

    let mut sys = System::new();
    let mut measurements = Vec::with_capacity(options.paths.len());
    let mut failed = false;

    for (idx, path) in options.paths.iter().enumerate() {
        if options.verbose {
            eprintln!("[{}/{}] {path}", idx + 1, options.paths.len());
        }
        match probe(path, &options, &mut sys) {
            Ok(m) => measurements.push(m),
            Err(err) => {
                eprintln!("tsp_probe: {path}: {err}");
                failed = true;
            }
        }
    }

    options.format.write(&measurements, options.precision);
    if failed {
        std::process::exit(1);
    }
}

struct Options {
    paths: Vec<String>,
    table_kind: TableKind,
    precision: u32,
    format: OutputFormat,
    verbose: bool,
}

impl Options {
    fn parse<I, T>(mut args: I) -> Result<Self, String>
    where
        I: Iterator<Item = T>,
        T: Into<String>,
    {
        let mut paths = Vec::new();
        let mut table_kind = TableKind::Auto;
        let mut precision = 5u32;
        let mut format = OutputFormat::Plain;
        let mut verbose = false;

        while let Some(arg) = args.next() {
            let arg = arg.into();
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) if flag.starts_with("--") => {
                    (flag.to_string(), Some(value.to_string()))
                }
                _ => (arg.clone(), None),
            };
            let mut value = |name: &str| -> Result<String, String> {
                match inline.clone() {
                    Some(v) => Ok(v),
                    None => args
                        .next()
                        .map(Into::into)
                        .ok_or_else(|| format!("missing value after {name}")),
                }
            };
            match flag.as_str() {
                "-h" | "--help" => {
                    Options::print_help();
                    std::process::exit(0);
                }
                "-v" | "--verbose" => verbose = true,
                "--table" => {
                    table_kind = value("--table")?
                        .parse()
                        .map_err(|e: held_karp::Error| e.to_string())?;
                }
                "--precision" => {
                    precision = value("--precision")?
                        .parse::<u32>()
                        .map_err(|_| "precision must be a non-negative integer".to_string())?;
                }
                "--format" => format = OutputFormat::from_str(&value("--format")?)?,
                other if other.starts_with('-') => {
                    return Err(format!("unrecognized argument '{other}'"));
                }
                _ => paths.push(arg),
            }
        }

        if paths.is_empty() {
            return Err("no problem files given".to_string());
        }
        Ok(Self {
            paths,
            table_kind,
            precision,
            format,
            verbose,
        })
    }

    fn print_help() {
        println!(
            "\
Usage: tsp_probe [options] <problem-file>...

Solves each problem file exactly with Held-Karp and prints the tour cost.
A problem file holds the city count on its first line and one `x y` pair
per following line.

Options:
  --table <sparse|dense|auto>   Generation table layout (default: auto)
  --precision <N>               Decimal places of the printed cost (default: 5)
  --format <plain|csv|json>     Output format (default: plain)
  -v, --verbose                 Report every generation on stderr
  -h, --help                    Print this help message

Examples:
  tsp_probe tests/data/tsp9.txt
  tsp_probe --table dense --precision 3 -v tests/data/tsp12.txt
"
        );
    }
}

#[derive(Copy, Clone)]
enum OutputFormat {
    Plain,
    Csv,
    Json,
}

impl OutputFormat {
    fn from_str(value: &str) -> Result<Self, String> {
        match value {
            "plain" => Ok(Self::Plain),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown format '{other}'")),
        }
    }

    fn write(self, measurements: &[Measurement], precision: u32) {
        match self {
            OutputFormat::Plain => write_plain(measurements, precision),
            OutputFormat::Csv => write_csv(measurements, precision),
            OutputFormat::Json => write_json(measurements, precision),
        }
    }
}

struct Measurement {
    path: String,
    city_count: usize,
    cost: f64,
    wall_s: f64,
    rss_delta_kib: u64,
    peak_live_bytes: usize,
}

fn probe(path: &str, options: &Options, sys: &mut System) -> held_karp::Result<Measurement> {
    let problem = Problem::from_path(path)?;
    let engine =
        HeldKarp::new(&problem.cities, problem.city_count)?.with_table_kind(options.table_kind);

    let verbose = options.verbose;
    let mut peak_live_bytes = 0usize;
    let mut report = |s: &GenerationStats| {
        peak_live_bytes = peak_live_bytes.max(s.live_bytes());
        if verbose {
            eprintln!(
                "      m={:<3} subsets={:<10} entries {:>10} -> {:<10} live={} KiB  {:.3}s",
                s.size,
                s.subsets,
                s.previous_entries,
                s.current_entries,
                s.live_bytes() / 1024,
                s.elapsed.as_secs_f64()
            );
        }
    };

    let before = rss_kib(sys);
    let start = Instant::now();
    let cost = engine.run(&mut report)?;
    let wall_s = start.elapsed().as_secs_f64();
    let after = rss_kib(sys);

    Ok(Measurement {
        path: path.to_string(),
        city_count: problem.city_count,
        cost,
        wall_s,
        rss_delta_kib: after.saturating_sub(before),
        peak_live_bytes,
    })
}

fn write_plain(measurements: &[Measurement], precision: u32) {
    for m in measurements {
        println!("{}: {}", m.path, round_to(m.cost, precision));
    }
}

fn write_csv(measurements: &[Measurement], precision: u32) {
    println!("path,cities,cost,wall_s,rss_delta_kib,peak_live_bytes");
    for m in measurements {
        println!(
            "\"{}\",{},{},{:.3},{},{}",
            m.path.replace('"', "'"),
            m.city_count,
            round_to(m.cost, precision),
            m.wall_s,
            m.rss_delta_kib,
            m.peak_live_bytes
        );
    }
}

fn write_json(measurements: &[Measurement], precision: u32) {
    println!("[");
    for (idx, m) in measurements.iter().enumerate() {
        println!(
            "  {{\"path\":\"{}\",\"cities\":{},\"cost\":{},\"wall_s\":{:.3},\"rss_delta_kib\":{},\"peak_live_bytes\":{}}}{}",
            m.path.replace('\\', "\\\\").replace('"', "\\\""),
            m.city_count,
            round_to(m.cost, precision),
            m.wall_s,
            m.rss_delta_kib,
            m.peak_live_bytes,
            if idx + 1 == measurements.len() { "" } else { "," }
        );
    }
    println!("]");
}

fn rss_kib(sys: &mut System) -> u64 {
    sys.refresh_processes_specifics(ProcessRefreshKind::new());
    if let Some(process) = get_current_pid().ok().and_then(|pid| sys.process(pid)) {
        process.memory() / 1024
    } else {
        0
    }
}

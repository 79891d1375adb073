use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;
use clap::Parser;
use env_logger::Env;
use log::info;
use wtcache::config::{HierarchyConfig, PartialGeometry, PartialHierarchyConfig};
use wtcache::io::{get_reader, open_ram};
use wtcache::report::{CacheDump, OperationReport, Summary};
use wtcache::simulator::Simulator;

#[cfg(debug_assertions)]
const DEBUG_DEFAULT: bool = true;

#[cfg(not(debug_assertions))]
const DEBUG_DEFAULT: bool = false;

#[derive(Parser, Debug)]
#[command(about = String::from("Replays a memory trace against write-through L1 data, L1 instruction and shared L2 caches"))]
struct Args {
    /// Number of L1 set index bits
    #[arg(long = "L1s", value_name = "BITS")]
    l1_set_bits: Option<u32>,
    /// Lines per L1 set
    #[arg(long = "L1E", value_name = "LINES")]
    l1_associativity: Option<u32>,
    /// Number of L1 block offset bits
    #[arg(long = "L1b", value_name = "BITS")]
    l1_block_bits: Option<u32>,
    /// Number of L2 set index bits
    #[arg(long = "L2s", value_name = "BITS")]
    l2_set_bits: Option<u32>,
    /// Lines per L2 set
    #[arg(long = "L2E", value_name = "LINES")]
    l2_associativity: Option<u32>,
    /// Number of L2 block offset bits
    #[arg(long = "L2b", value_name = "BITS")]
    l2_block_bits: Option<u32>,

    /// JSON configuration, individual flags take precedence over it
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    trace: PathBuf,

    /// RAM image, modified in place by write-through
    #[arg(short, long, default_value = "RAM.dat")]
    ram: PathBuf,

    /// Directory the final cache dumps are written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Don't print the per-operation log
    #[arg(short, long)]
    quiet: bool,

    /// Print the final statistics as JSON
    #[arg(short, long)]
    json: bool,

    #[arg(short, long)]
    performance: bool,

    #[arg(short, long, default_value_t = DEBUG_DEFAULT)]
    debug: bool,
}

impl Args {
    fn flag_config(&self) -> PartialHierarchyConfig {
        PartialHierarchyConfig {
            l1: PartialGeometry {
                set_bits: self.l1_set_bits,
                associativity: self.l1_associativity,
                block_bits: self.l1_block_bits,
            },
            l2: PartialGeometry {
                set_bits: self.l2_set_bits,
                associativity: self.l2_associativity,
                block_bits: self.l2_block_bits,
            },
        }
    }
}

fn load_config(args: &Args) -> Result<HierarchyConfig, String> {
    let file_config = match &args.config {
        Some(path) => {
            let config_file = File::open(path).map_err(|e| format!("Couldn't open the config file at path {}: {e}", path.display()))?;
            serde_json::from_reader(BufReader::new(config_file)).map_err(|e| format!("Couldn't parse the config file: {e}"))?
        }
        None => PartialHierarchyConfig::default(),
    };
    file_config
        .overridden_by(args.flag_config())
        .resolve()
        .map_err(|e| format!("Invalid configuration: {e}"))
}

fn main() -> Result<(), String> {
    let start = Instant::now();
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().filter_or("WTSIM_LOG", "warn").write_style_or("WTSIM_LOG_STYLE", "auto")).init();

    let config = load_config(&args)?;
    let ram = open_ram(&args.ram)?;
    let mut simulator = Simulator::new(&config, ram).map_err(|e| format!("Invalid configuration: {e}"))?;
    let trace_file = File::open(&args.trace).map_err(|e| format!("Couldn't open the trace file at path {}: {e}", args.trace.display()))?;
    let trace_reader = get_reader(trace_file)?;

    let mut out = BufWriter::new(io::stdout().lock());
    let mut write_error: Option<io::Error> = None;
    let stats = *simulator.simulate(trace_reader, |op, outcome| {
        if args.quiet || write_error.is_some() {
            return;
        }
        if let Err(e) = writeln!(out, "\n{}", OperationReport { op, outcome }) {
            write_error = Some(e);
        }
    });
    if let Some(e) = write_error {
        return Err(format!("Couldn't write the operation log: {e}"));
    }
    let summary = if args.json {
        serde_json::to_string_pretty(&stats).map_err(|e| format!("Couldn't serialise the output {e}"))?
    } else {
        format!("\n{}", Summary(&stats))
    };
    writeln!(out, "{summary}").map_err(|e| format!("Couldn't write the summary: {e}"))?;
    out.flush().map_err(|e| format!("Couldn't write the summary: {e}"))?;
    drop(out);

    for cache in simulator.caches() {
        let path = args.output_dir.join(format!("{}_final.txt", cache.name()));
        fs::write(&path, CacheDump(cache).to_string()).map_err(|e| format!("Couldn't write the cache dump at path {}: {e}", path.display()))?;
        info!("wrote {}", path.display());
    }
    simulator.memory().flush().map_err(|e| format!("Couldn't flush the RAM image: {e}"))?;

    if args.performance {
        let end = Instant::now();
        let simulation_time = simulator.get_execution_time();
        let total_time = end - start;
        println!("Simulation time: {}s", simulation_time.as_nanos() as f64 / 1e9);
        println!("Total execution time (includes parsing, configuration, output and dumps): {}s", total_time.as_nanos() as f64 / 1e9)
    }
    if args.debug {
        #[cfg(debug_assertions)]
        println!("Running the debug binary, debug mode is enabled by default. If benchmarking, do not use this binary, re-compile with the --release argument when using cargo run");
        println!("Parsed input configuration: {config:?}");
        let invalid_lines = simulator.invalid_line_counts();
        let formatted = invalid_lines
            .iter()
            .map(|(name, count)| format!("{name}: {count}"))
            .collect::<Vec<_>>()
            .join(", ");
        println!("Never filled cache lines by cache: ({formatted})");
        println!("Total never filled cache lines: {}", invalid_lines.iter().map(|(_, count)| count).sum::<usize>())
    }
    Ok(())
}

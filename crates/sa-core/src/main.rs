use std::io::{self, IsTerminal};

use sa_backend::ChatBackend;
use sa_core::config::Config;
use sa_core::console::{Console, Style};
use sa_core::fetch::Fetcher;
use sa_core::repl::{run_repl, Dispatcher};
use sa_core::runner::ScriptRunner;
use sa_core::telemetry;

fn print_help() {
    println!("scriptagent: chat with an LLM and run Python scripts");
    println!();
    println!("Usage:");
    println!("  scriptagent            Start the interactive loop");
    println!();
    println!("Commands inside the loop:");
    println!("  run_github <raw_url>   Fetch a script over HTTP and run it");
    println!("  run_local <path>       Run a script from disk");
    println!("  help                   List commands");
    println!("  quit | exit            Leave");
    println!("  anything else          Chat");
    println!();
    println!("Options:");
    println!("  --version         Print version");
    println!("  --help            Print this help");
    println!();
    println!("Config: {}", sa_core::config::config_path().display());
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return;
    }

    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("scriptagent {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    if let Some(arg) = args.first() {
        eprintln!("error: unexpected argument '{arg}' (try --help)");
        std::process::exit(2);
    }

    // A missing .env is fine; the environment may already carry the key.
    dotenvy::dotenv().ok();
    telemetry::init();

    let config = Config::load_or_default();

    let backend = match config.backend.build() {
        Ok(backend) => backend,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let fetcher = match Fetcher::new(config.fetch.timeout()) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            eprintln!("error: failed to initialize HTTP client: {e}");
            std::process::exit(1);
        }
    };

    let runner = ScriptRunner::from_config(&config.runner);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create async runtime: {e}");
            std::process::exit(1);
        }
    };

    let stdout = io::stdout();
    let style = Style::detect(stdout.is_terminal());
    let mut console = Console::new(stdout.lock(), style);

    if let Err(e) = console.banner(backend.name(), config.backend.model()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }

    let mut dispatcher = Dispatcher::new(backend, fetcher, runner);
    let stdin = io::stdin();
    let result = runtime.block_on(run_repl(&mut dispatcher, stdin.lock(), &mut console));

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

//! Screen Shield CLI
//!
//! Drives a shield from directives on stdin, for trying out hosts and
//! scripting scenarios.

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use crossbeam_channel::{select, unbounded, Receiver};
use screen_shield::{
    channel::{Method, PushMessage},
    directive::Directive,
    presentation::TracingRenderer,
    CaptureSignal, Config, HostCaptureSignal, ShieldHandle, ShieldRuntime, SHIELD_DECLARATION, VERSION,
};
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// How long a directive waits for the control thread to answer.
const REPLY_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Parser)]
#[command(name = "screen-shield")]
#[command(version = VERSION)]
#[command(about = "Privacy overlay core for mobile apps", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a shield, reading directives from stdin
    Run {
        /// Behave like an OS without capture-state detection or material blurs
        #[arg(long)]
        legacy_platform: bool,

        /// App name shown on the background cover
        #[arg(long)]
        app_name: Option<String>,
    },

    /// List the control-channel methods
    Methods,

    /// Display what the shield does and does not do
    Declaration,

    /// Show configuration
    Config,
}

fn main() {
    let cli = Cli::parse();
    let config = load_config();
    init_tracing(&config);

    let result = match cli.command {
        Commands::Run {
            legacy_platform,
            app_name,
        } => cmd_run(config, legacy_platform, app_name),
        Commands::Methods => {
            cmd_methods(&config);
            Ok(())
        }
        Commands::Declaration => {
            cmd_declaration();
            Ok(())
        }
        Commands::Config => {
            cmd_config(&config);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn load_config() -> Config {
    match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config, using defaults: {e}");
            Config::default()
        }
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_run(mut config: Config, legacy_platform: bool, app_name: Option<String>) -> anyhow::Result<()> {
    if let Some(name) = app_name {
        config.app_name = name;
    }
    if legacy_platform {
        config.material_blur = false;
    }

    println!("Screen Shield v{VERSION}");
    println!();
    println!("  Channel: {}", config.channel_name);
    println!("  App name: {}", config.app_name);
    println!(
        "  Capture detection: {}",
        if legacy_platform {
            "unsupported"
        } else {
            "supported"
        }
    );
    println!();
    println!("Reading directives from stdin. Press Ctrl+C to stop.");
    println!();

    let capture = Arc::new(if legacy_platform {
        HostCaptureSignal::unsupported()
    } else {
        HostCaptureSignal::new()
    });

    let (push_tx, push_rx) = unbounded::<PushMessage>();
    let mut runtime = ShieldRuntime::spawn(
        &config,
        capture.clone(),
        Box::new(TracingRenderer),
        Box::new(push_tx),
    )
    .context("starting control thread")?;
    let shield = runtime.handle();

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("setting Ctrl+C handler")?;

    let lines = spawn_stdin_reader();
    let mut eof = false;

    while running.load(Ordering::SeqCst) && !eof {
        select! {
            recv(push_rx) -> push => {
                if let Ok(push) = push {
                    print_push(&push);
                }
            }
            recv(lines) -> line => match line {
                Ok(line) => run_line(&line, &shield, &capture),
                Err(_) => eof = true,
            },
            default(Duration::from_millis(100)) => {}
        }
    }

    // Let in-flight pushes land before shutting down.
    thread::sleep(config.frame_interval);
    for push in push_rx.try_iter() {
        print_push(&push);
    }

    runtime.stop();

    println!();
    println!("{}", runtime.activity().summary());
    Ok(())
}

fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = unbounded();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn run_line(line: &str, shield: &ShieldHandle, capture: &HostCaptureSignal) {
    let directive = match Directive::parse(line) {
        Ok(Some(directive)) => directive,
        Ok(None) => return,
        Err(e) => {
            eprintln!("Error: {e}");
            return;
        }
    };

    match directive {
        Directive::Call(call) => {
            let method = call.method.clone();
            match shield.call_blocking(call, REPLY_TIMEOUT) {
                Ok(reply) => println!("[{}] {method} -> {}", timestamp(), format_reply(&reply)),
                Err(e) => eprintln!("Error: {method}: {e}"),
            }
        }
        Directive::Lifecycle(transition) => {
            if shield.lifecycle().deliver(transition) {
                println!("[{}] {transition}", timestamp());
            } else {
                eprintln!("Error: shield has stopped");
            }
        }
        Directive::Capture(captured) => {
            if !capture.set_captured(captured) && !capture.is_supported() {
                println!("[{}] capture state ignored (unsupported platform)", timestamp());
            }
        }
        Directive::Wait(duration) => thread::sleep(duration),
        Directive::Status => match shield.status(REPLY_TIMEOUT) {
            Ok(status) => match serde_json::to_string_pretty(&status) {
                Ok(json) => println!("{json}"),
                Err(e) => eprintln!("Error serializing status: {e}"),
            },
            Err(e) => eprintln!("Error: {e}"),
        },
    }
}

fn format_reply(reply: &screen_shield::Reply) -> String {
    match reply.as_bool() {
        Some(value) => value.to_string(),
        None => "not implemented".to_string(),
    }
}

fn print_push(push: &PushMessage) {
    println!("[{}] push {}({})", timestamp(), push.method, push.arguments);
}

fn timestamp() -> String {
    Local::now().format("%H:%M:%S%.3f").to_string()
}

fn cmd_methods(config: &Config) {
    println!("Channel: {}", config.channel_name);
    println!();
    for method in Method::ALL {
        println!("  {:<32} {}", method.name(), method.description());
    }
    println!();
    println!("Push:");
    println!(
        "  {:<32} bool argument, sent after startScreenRecordingMonitoring",
        screen_shield::channel::RECORDING_CHANGED
    );
}

fn cmd_declaration() {
    println!("{SHIELD_DECLARATION}");
}

fn cmd_config(config: &Config) {
    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    match serde_json::to_string_pretty(config) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Error serializing config: {e}"),
    }
}

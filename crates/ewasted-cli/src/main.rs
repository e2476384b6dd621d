mod controller;
mod render;

use std::io::{self, ErrorKind, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ewasted_contracts::commands::{parse_intent, Intent, SHELL_HELP_COMMANDS};
use ewasted_contracts::events::EventLog;
use ewasted_gateway::{Gateway, GatewayConfig, OfflineDelays};
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::controller::{ContactForm, Controller, Rendered, Tone};

#[derive(Debug, Parser)]
#[command(name = "ewasted", version, about = "E-Wasted recycling assistant")]
struct Cli {
    /// Gemini API key; without one every feature answers with mock data.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,
    #[arg(long, env = "GEMINI_API_BASE", global = true)]
    api_base: Option<String>,
    #[arg(long, env = "EWASTED_MODEL", global = true)]
    model: Option<String>,
    /// Append one JSON line per model call to this file.
    #[arg(long, global = true)]
    events: Option<PathBuf>,
    /// Print the structured result as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,
    /// Skip the artificial latency of offline mode.
    #[arg(long, global = true)]
    no_delay: bool,
    #[arg(long, env = "EWASTED_LAT", global = true, allow_hyphen_values = true)]
    lat: Option<f64>,
    #[arg(long, env = "EWASTED_LON", global = true, allow_hyphen_values = true)]
    lon: Option<f64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive shell with every feature.
    Shell,
    /// Ask the chat assistant one question.
    Chat {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// Identify the e-waste item in an image.
    Identify { path: PathBuf },
    /// Find recycling centers near --lat/--lon.
    Centers {
        #[arg(required = true, num_args = 1..)]
        device: Vec<String>,
    },
    /// Environmental impact and end-of-life recommendation.
    Impact {
        /// Broken, Minor Issues or Working.
        #[arg(long, default_value = "Working")]
        condition: String,
        #[arg(required = true, num_args = 1..)]
        device: Vec<String>,
    },
    /// Data wiping instructions for a device type.
    Wipe {
        #[arg(required = true, num_args = 1..)]
        device: Vec<String>,
    },
    /// Send the contact form.
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        service: String,
        #[arg(long)]
        message: String,
    },
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("ewasted error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing();

    let controller = Controller::new(build_gateway(&cli), cli.lat.zip(cli.lon));
    let json = cli.json;
    let rendered = match cli.command {
        Command::Shell => return run_shell(&controller, json),
        Command::Chat { message } => {
            controller.open_chat();
            controller.chat(&message.join(" "))
        }
        Command::Identify { path } => {
            let staged = controller.stage_image_file(&path);
            if staged.is_error() {
                staged
            } else {
                controller.identify()
            }
        }
        Command::Centers { device } => controller.find_centers(&device.join(" "), None),
        Command::Impact { condition, device } => controller.analyze(&device.join(" "), &condition),
        Command::Wipe { device } => controller.wipe(&device.join(" ")),
        Command::Contact {
            name,
            email,
            service,
            message,
        } => controller.contact(&ContactForm {
            name,
            email,
            service,
            message,
        }),
    };
    print_rendered(&rendered, json);
    Ok(exit_code(&rendered))
}

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var("EWASTED_LOG")
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn build_gateway(cli: &Cli) -> Gateway {
    let mut config = GatewayConfig::from_env();
    if cli.api_key.is_some() {
        config = config.with_api_key(cli.api_key.clone());
    }
    if let Some(api_base) = cli.api_base.as_deref() {
        config = config.with_api_base(api_base);
    }
    if let Some(model) = cli.model.as_deref() {
        config = config.with_model(model);
    }
    if cli.no_delay {
        config = config.with_offline_delays(OfflineDelays::none());
    }
    if !config.is_live() {
        info!("no API key configured; using mock responses");
    }

    let gateway = Gateway::new(config);
    match cli.events.as_ref() {
        Some(path) => gateway.with_event_log(EventLog::new(path)),
        None => gateway,
    }
}

/// Validation notices count as usage failures.
fn exit_code(rendered: &Rendered) -> i32 {
    match rendered.tone {
        Tone::Info | Tone::Success => 0,
        Tone::Warning | Tone::Error => 1,
    }
}

fn print_rendered(rendered: &Rendered, json: bool) {
    if json {
        if let Some(text) = rendered.json.as_deref() {
            println!("{text}");
            return;
        }
    }
    if rendered.body.is_empty() {
        return;
    }
    match rendered.tone {
        Tone::Info | Tone::Success => println!("{}", rendered.body),
        Tone::Warning | Tone::Error => eprintln!("{}", rendered.body),
    }
}

fn run_shell(controller: &Controller, json: bool) -> Result<i32> {
    let stdin = io::stdin();
    let mut line = String::new();

    let mode = if controller.gateway().is_live() {
        "live"
    } else {
        "offline"
    };
    println!("E-Wasted shell ({mode}). Type /help for commands; anything else goes to the assistant.");
    print_rendered(&controller.open_chat(), false);

    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        let read = match stdin.read_line(&mut line) {
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        if read == 0 {
            break;
        }

        let intent = parse_intent(line.trim_end_matches(['\n', '\r']));
        match intent.action.as_str() {
            "noop" => continue,
            "quit" => break,
            "help" => {
                for (usage, about) in SHELL_HELP_COMMANDS {
                    println!("  {usage:<48} {about}");
                }
            }
            _ => {
                if let Some(rendered) = dispatch(controller, &intent) {
                    print_rendered(&rendered, json);
                }
            }
        }
    }
    Ok(0)
}

fn dispatch(controller: &Controller, intent: &Intent) -> Option<Rendered> {
    let rendered = match intent.action.as_str() {
        "chat" => controller.chat(intent.prompt.as_deref().unwrap_or_default()),
        "open_chat" => controller.open_chat(),
        "stage_image" => match intent.arg_str("path") {
            Some(path) => controller.stage_image_file(&PathBuf::from(path)),
            None => {
                println!("/image requires a path");
                return None;
            }
        },
        "identify" => {
            if let Some(path) = intent.arg_str("path") {
                let staged = controller.stage_image_file(&PathBuf::from(path));
                if staged.is_error() {
                    return Some(staged);
                }
            }
            controller.identify()
        }
        "find_centers" => {
            let location = intent.arg_f64("lat").zip(intent.arg_f64("lon"));
            controller.find_centers(intent.arg_str("device").unwrap_or_default(), location)
        }
        "analyze_impact" => controller.analyze(
            intent.arg_str("device").unwrap_or_default(),
            intent.arg_str("condition").unwrap_or("Working"),
        ),
        "wipe" => controller.wipe(intent.arg_str("device").unwrap_or_default()),
        "contact" => controller.contact(&ContactForm {
            name: intent.arg_str("name").unwrap_or_default().to_string(),
            email: intent.arg_str("email").unwrap_or_default().to_string(),
            service: intent.arg_str("service").unwrap_or_default().to_string(),
            message: intent.arg_str("message").unwrap_or_default().to_string(),
        }),
        "contact_prefill" => controller.contact_prefill(),
        _ => {
            let command = intent.arg_str("command").unwrap_or("?");
            println!("Unknown command: /{command}. Type /help for the list.");
            return None;
        }
    };
    Some(rendered)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{exit_code, Cli, Command};
    use crate::controller::{Rendered, Tone};

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "ewasted", "centers", "old", "laptop", "--lat", "40.7", "--lon", "-74.0", "--json",
        ])
        .unwrap_or_else(|err| panic!("{err}"));
        assert!(cli.json);
        assert_eq!(cli.lat.zip(cli.lon), Some((40.7, -74.0)));
        match cli.command {
            Command::Centers { device } => assert_eq!(device.join(" "), "old laptop"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn impact_condition_defaults_to_working() {
        let cli = Cli::try_parse_from(["ewasted", "impact", "iPad"])
            .unwrap_or_else(|err| panic!("{err}"));
        match cli.command {
            Command::Impact { condition, .. } => assert_eq!(condition, "Working"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn warnings_and_errors_exit_nonzero() {
        let rendered = |tone| Rendered {
            tone,
            body: String::new(),
            json: None,
        };
        assert_eq!(exit_code(&rendered(Tone::Success)), 0);
        assert_eq!(exit_code(&rendered(Tone::Info)), 0);
        assert_eq!(exit_code(&rendered(Tone::Warning)), 1);
        assert_eq!(exit_code(&rendered(Tone::Error)), 1);
    }
}

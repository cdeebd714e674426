//! Causal Wizard - Entry Point
//!
//! Command-line shell around the wizard core: one-shot compile/scene/run
//! commands plus a line-driven session that walks through the same screens
//! as the graphical builder.

use causal_wizard::core::config::WizardConfig;
use causal_wizard::core::error::Result;
use causal_wizard::core::types::FileRef;
use causal_wizard::execution::{pipeline, CancellationToken, ProcessPort};
use causal_wizard::knowledge::{KnowledgeModel, Relationship};
use causal_wizard::rules::{compile, save_knowledge, save_scene, scene_file_name};
use causal_wizard::scene;
use causal_wizard::wizard::{Screen, WizardController};

use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

/// Author causal knowledge and hand it to the imitation pipeline
#[derive(Parser, Debug)]
#[command(name = "causal-wizard")]
#[command(about = "Build causal knowledge, compile it to RULES text and run imitation")]
struct Cli {
    /// TOML config file (defaults are used when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a knowledge snapshot (JSON) to RULES text
    Compile {
        /// Knowledge snapshot written by the shell's `export` command
        input: PathBuf,
        /// Task label used to name the saved file
        #[arg(long, default_value = "")]
        task: String,
        /// Save as <task>_knowledge.txt in the configured output directory
        #[arg(long)]
        save: bool,
    },
    /// Generate tabletop scene XML from a description
    Scene {
        description: String,
        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Run both pipeline stages
    Run {
        /// Knowledge snapshot (JSON) to compile
        #[arg(long, conflicts_with = "knowledge_file", required_unless_present = "knowledge_file")]
        knowledge_json: Option<PathBuf>,
        /// Existing knowledge file passed to stage 1 by path
        #[arg(long)]
        knowledge_file: Option<String>,
        /// Recording as NAME=PATH or PATH; repeat in demonstration order
        #[arg(long = "recording")]
        recordings: Vec<String>,
        /// Initial-state scene file for stage 2
        #[arg(long)]
        initial_state: Option<String>,
        #[arg(long, default_value = "")]
        task: String,
    },
    /// Interactive wizard session on stdin
    Shell,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => WizardConfig::load(path)?,
        None => WizardConfig::default(),
    };

    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    match cli.command {
        Command::Compile { input, task, save } => {
            let model = KnowledgeModel::from_json(&std::fs::read_to_string(&input)?)?;
            let text = compile(model.causes());
            if save {
                let path = save_knowledge(Path::new(&config.output_dir), &task, &text)?;
                println!("Saved {}", path.display());
            } else {
                println!("{}", text);
            }
        }
        Command::Scene { description, out } => {
            let xml = scene::generate(&description)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, xml)?;
                    println!("Wrote {}", path.display());
                }
                None => print!("{}", xml),
            }
        }
        Command::Run {
            knowledge_json,
            knowledge_file,
            recordings,
            initial_state,
            task,
        } => {
            let mut wizard = WizardController::new(config);
            wizard.set_task_label(task);
            if let Some(path) = knowledge_json {
                *wizard.knowledge_mut() = KnowledgeModel::from_json(&std::fs::read_to_string(path)?)?;
            }
            if let Some(path) = knowledge_file {
                wizard.import_knowledge(vec![FileRef::parse(&path)]);
            }
            wizard.set_recordings(recordings.iter().map(|r| FileRef::parse(r)).collect());
            if let Some(path) = initial_state {
                wizard.set_initial_state_files(vec![FileRef::parse(&path)]);
            }

            let rt = Runtime::new()?;
            run_wizard(&rt, &mut wizard)?;
            print_log(&wizard);
            if let Some(error) = wizard.error() {
                eprintln!("Run failed: {}", error);
                std::process::exit(1);
            }
        }
        Command::Shell => run_shell(config)?,
    }

    Ok(())
}

/// Validate, run both stages, and record the outcome on the wizard
fn run_wizard(rt: &Runtime, wizard: &mut WizardController) -> Result<()> {
    let plan = wizard.go()?;
    let port = ProcessPort::from_config(wizard.config());
    let cancel = CancellationToken::new();

    let report = rt.block_on(async {
        let on_interrupt = cancel.clone();
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, cancelling run");
                on_interrupt.cancel();
            }
        });
        let report = pipeline::run(&port, &plan, &cancel).await;
        watcher.abort();
        report
    });

    wizard.finish_run(report);
    Ok(())
}

fn print_log(wizard: &WizardController) {
    for entry in wizard.log().entries() {
        println!("[{:?}] {}", entry.category, entry.message);
    }
}

fn run_shell(config: WizardConfig) -> Result<()> {
    let rt = Runtime::new()?;
    let mut wizard = WizardController::new(config);

    println!("\n=== CAUSAL WIZARD ===");
    println!("Type 'help' for commands.");
    println!();

    loop {
        print!("[{}] > ", wizard.screen());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "q" {
            break;
        }

        let (command, rest) = input.split_once(' ').unwrap_or((input, ""));
        let rest = rest.trim();
        match command {
            "help" | "h" => print_help(),
            "screens" => {
                for screen in Screen::ALL {
                    let marker = if wizard.is_active(screen) { "*" } else { " " };
                    println!(" {} {}", marker, screen);
                }
            }
            "show" => match rest.parse::<Screen>() {
                Ok(screen) => wizard.show(screen),
                Err(e) => println!("{}", e),
            },
            "task" => wizard.set_task_label(rest),
            "recording" => {
                let mut recordings = wizard.recordings().to_vec();
                recordings.push(FileRef::parse(rest));
                wizard.set_recordings(recordings);
            }
            "clear-recordings" => wizard.set_recordings(Vec::new()),
            "import" => wizard.import_knowledge(vec![FileRef::parse(rest)]),
            "builder" => wizard.use_builder(),
            "state" => wizard.set_initial_state_files(vec![FileRef::parse(rest)]),
            "cause" | "action" | "param" | "arg" | "custom" => {
                if let Err(message) = edit_knowledge(wizard.knowledge_mut(), command, rest) {
                    println!("{}", message);
                }
            }
            "picks" => {
                for (i, values) in wizard.param_list().iter().enumerate() {
                    println!("  cause {}: {}", i, values.join(", "));
                }
            }
            "preview" => println!("{}", wizard.preview()),
            "export" => println!("{}", wizard.knowledge().to_json()?),
            "save" => {
                let dir = PathBuf::from(&wizard.config().output_dir);
                match save_knowledge(&dir, wizard.task_label(), &wizard.preview()) {
                    Ok(path) => println!("Saved {}", path.display()),
                    Err(e) => println!("Could not save: {}", e),
                }
            }
            "scene" => match wizard.generate_scene(rest).map(str::to_string) {
                Ok(xml) => {
                    let dir = PathBuf::from(&wizard.config().output_dir);
                    match save_scene(&dir, wizard.task_label(), &xml) {
                        Ok(path) => {
                            println!("Wrote {}", path.display());
                            let name = scene_file_name(wizard.task_label());
                            let path = path.display().to_string();
                            wizard.set_initial_state_files(vec![FileRef::new(name, path)]);
                        }
                        Err(e) => println!("Could not save scene: {}", e),
                    }
                }
                Err(e) => println!("{}", e),
            },
            "go" => match run_wizard(&rt, &mut wizard) {
                Ok(()) => {
                    print_log(&wizard);
                    println!("Status: {:?}", wizard.status());
                }
                Err(e) => println!("{}", e),
            },
            "log" => print_log(&wizard),
            "start-over" => wizard.start_over(),
            _ => println!("Unknown command '{}'. Type 'help'.", command),
        }

        if let Some(error) = wizard.error() {
            println!("! {}", error);
        }
    }

    println!("\nGoodbye!");
    Ok(())
}

fn print_help() {
    println!("Navigation:");
    println!("  screens | show <screen> | start-over | quit");
    println!("Session:");
    println!("  task <label> | recording <NAME=PATH> | clear-recordings");
    println!("  import <PATH> | builder | state <PATH> | scene <description>");
    println!("Knowledge (indices are 0-based):");
    println!("  cause add | cause remove | cause <c> label <text>");
    println!("  cause <c> if <condition> | cause <c> direct");
    println!("  action add <c> | action remove <c> | action <c> <a> label <text>");
    println!("  param add <c> | param remove <c> | param <c> <p> <name>");
    println!("  arg add <c> <a> | arg remove <c> <a> | arg <c> <a> <p> <kind> <value>");
    println!("  custom add | custom remove | custom <p> <value>");
    println!("Output:");
    println!("  picks | preview | export | save | go | log");
}

/// Parse an index and check it against the current length
fn index(token: Option<&str>, len: usize, what: &str) -> std::result::Result<usize, String> {
    let token = token.ok_or_else(|| format!("Missing {} index", what))?;
    let index: usize = token
        .parse()
        .map_err(|_| format!("'{}' is not a {} index", token, what))?;
    if index >= len {
        return Err(format!("No {} #{} (have {})", what, index, len));
    }
    Ok(index)
}

/// Apply one knowledge edit, checking indices before they reach the model
fn edit_knowledge(
    model: &mut KnowledgeModel,
    command: &str,
    rest: &str,
) -> std::result::Result<(), String> {
    let mut words = rest.split_whitespace();
    let first = words.next();

    match (command, first) {
        ("cause", Some("add")) => {
            model.add_cause();
        }
        ("cause", Some("remove")) => {
            model.remove_cause();
        }
        ("cause", _) => {
            let c = index(first, model.len(), "cause")?;
            match words.next() {
                Some("label") => model.set_cause_label(c, words.collect::<Vec<_>>().join(" ")),
                Some("if") => model.set_relationship(
                    c,
                    Relationship::conditional(words.collect::<Vec<_>>().join(" ")),
                ),
                Some("direct") => model.set_relationship(c, Relationship::direct()),
                _ => return Err("Usage: cause <c> label <text> | if <condition> | direct".into()),
            }
        }
        ("action", Some(op @ ("add" | "remove"))) => {
            let c = index(words.next(), model.len(), "cause")?;
            if op == "add" {
                model.add_action(c);
            } else {
                model.remove_action(c);
            }
        }
        ("action", _) => {
            let c = index(first, model.len(), "cause")?;
            let a = index(words.next(), model.cause(c).actions.len(), "action")?;
            match words.next() {
                Some("label") => model.set_action_label(c, a, words.collect::<Vec<_>>().join(" ")),
                _ => return Err("Usage: action <c> <a> label <text>".into()),
            }
        }
        ("param", Some(op @ ("add" | "remove"))) => {
            let c = index(words.next(), model.len(), "cause")?;
            if op == "add" {
                model.add_causal_parameter(c);
            } else {
                model.remove_causal_parameter(c);
            }
        }
        ("param", _) => {
            let c = index(first, model.len(), "cause")?;
            let p = index(words.next(), model.cause(c).parameters.len(), "parameter")?;
            let name = words.next().ok_or("Usage: param <c> <p> <name>")?;
            model.set_causal_parameter(c, p, name);
        }
        ("arg", Some(op @ ("add" | "remove"))) => {
            let c = index(words.next(), model.len(), "cause")?;
            let a = index(words.next(), model.cause(c).actions.len(), "action")?;
            if op == "add" {
                model.add_action_parameter(c, a);
            } else {
                model.remove_action_parameter(c, a);
            }
        }
        ("arg", _) => {
            let c = index(first, model.len(), "cause")?;
            let a = index(words.next(), model.cause(c).actions.len(), "action")?;
            let p = index(
                words.next(),
                model.cause(c).actions[a].parameters.len(),
                "argument",
            )?;
            match (words.next(), words.next()) {
                (Some(kind), Some(value)) => model.set_action_parameter(c, a, p, kind, value),
                _ => return Err("Usage: arg <c> <a> <p> <kind> <value>".into()),
            }
        }
        ("custom", Some("add")) => {
            model.add_custom_parameter();
        }
        ("custom", Some("remove")) => {
            model.remove_custom_parameter();
        }
        ("custom", _) => {
            let p = index(first, model.custom_parameters().len(), "custom parameter")?;
            let value = words.next().ok_or("Usage: custom <p> <value>")?;
            model.set_custom_parameter(p, value);
        }
        _ => return Err(format!("Unknown edit '{}'", command)),
    }
    Ok(())
}

mod cli_helper;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use docsense_application::{AppHome, AuthForm, AuthGuard, AuthMode, SendOutcome, UploadOutcome};
use docsense_core::config::ClientConfig;
use docsense_infrastructure::{ConfigService, DevIdentityProvider, DocsensePaths};
use docsense_interaction::HttpDocumentsBackend;

use crate::cli_helper::{COMMANDS, CliHelper};

type Repl = Editor<CliHelper, DefaultHistory>;

#[derive(Parser, Debug)]
#[command(name = "docsense", version, about = "Ask questions about your documents")]
struct Args {
    /// Config file to read instead of ~/.config/docsense/config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the config file and environment
    #[arg(long)]
    api_url: Option<String>,
}

/// Routes tracing output to a daily rolling file so it never mixes with the REPL.
fn init_tracing(config: &ClientConfig) -> Result<WorkerGuard> {
    let log_dir = DocsensePaths::log_dir()?;
    std::fs::create_dir_all(&log_dir)?;

    let appender = tracing_appender::rolling::daily(&log_dir, "docsense.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}

async fn load_config(args: &Args) -> Result<ClientConfig> {
    let service = match &args.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new()?,
    };
    let mut config = service.get_config().await?;
    if let Some(api_url) = &args.api_url {
        config.api_base_url = api_url.clone();
        config.validate()?;
    }
    Ok(config)
}

fn print_help() {
    println!("{}", "Type a question to ask about your documents.".bright_black());
    for (name, args) in COMMANDS {
        println!("{}", format!("  {} {}", name, args).bright_black());
    }
}

/// Reads one prompted value. `None` when the user cancels.
fn prompt(rl: &mut Repl, label: &str) -> Option<String> {
    match rl.readline(label) {
        Ok(value) => Some(value),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => None,
        Err(err) => {
            eprintln!("{}", format!("Error: {:?}", err).red());
            None
        }
    }
}

async fn run_email_auth(app: &AppHome, rl: &mut Repl, mode: AuthMode) {
    let form = app.auth_form();
    form.set_mode(mode).await;
    println!("{}", AuthForm::subtitle(app.identity().await.is_some()).bright_black());

    let Some(email) = prompt(rl, "email: ") else {
        return;
    };
    let Some(password) = prompt(rl, "password: ") else {
        return;
    };
    form.set_email(email).await;
    form.set_password(password).await;

    println!("{}", form.submit_label().await.bright_black());
    if app.submit_auth().await.is_err() {
        if let Some(message) = form.error_message().await {
            println!("{}", message.red());
        }
    }
}

async fn select_chat(app: &AppHome, arg: &str) {
    let chats = app.visible_chats().await;
    let chosen = arg
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|index| chats.get(index));

    match chosen {
        Some(chat) => {
            app.select_chat(&chat.id).await;
            println!("{}", format!("Switched to {}", chat.title).green());
        }
        None => println!("{}", "Usage: /select <n> (see /chats)".yellow()),
    }
}

/// Handles one slash command. Returns false when the REPL should exit.
async fn handle_command(app: &AppHome, rl: &mut Repl, command: &str, arg: &str) -> bool {
    match command {
        "/quit" | "/exit" => return false,
        "/help" => print_help(),
        "/upload" if arg.is_empty() => println!("{}", "Usage: /upload <path>".yellow()),
        "/upload" => match app.upload_path(arg).await {
            Ok(UploadOutcome::Busy) => println!("{}", "Uploading…".yellow()),
            Ok(UploadOutcome::Uploaded { .. }) => {}
            Err(_) => {
                if let Some(notice) = app.upload_notice().await {
                    println!("{}", notice.red());
                    app.dismiss_upload_notice().await;
                }
            }
        },
        "/new" => {
            app.new_chat().await;
            println!("{}", "Started a new chat".green());
        }
        "/chats" => render::print_chats(app).await,
        "/select" => select_chat(app, arg).await,
        "/search" => {
            app.set_search(arg).await;
            render::print_chats(app).await;
        }
        "/sidebar" => {
            let collapsed = app.toggle_sidebar().await;
            let state = if collapsed { "collapsed" } else { "expanded" };
            println!("{}", format!("Sidebar {}", state).bright_black());
        }
        "/sync" => {
            // Failures are reported through the event stream.
            let _ = app.resync().await;
        }
        "/login" => run_email_auth(app, rl, AuthMode::Login).await,
        "/signup" => run_email_auth(app, rl, AuthMode::Signup).await,
        "/google" => {
            if app.sign_in_with_google().await.is_err() {
                if let Some(message) = app.auth_form().error_message().await {
                    println!("{}", message.red());
                }
            }
        }
        "/logout" => {
            if let Err(err) = app.sign_out().await {
                println!("{}", err.user_message().red());
            }
        }
        "/profile" => {
            if app.toggle_profile_menu().await {
                render::print_profile(app).await;
            }
        }
        _ => println!("{}", format!("Unknown command {}. Try /help", command).bright_black()),
    }
    true
}

async fn send_question(app: &AppHome, question: &str) {
    app.set_composer(question).await;
    match app.send_composer().await {
        SendOutcome::Busy => println!("{}", "Still answering the previous question".yellow()),
        SendOutcome::Skipped | SendOutcome::Answered { .. } | SendOutcome::Failed { .. } => {}
    }
}

/// The main entry point for the DocSense readline REPL.
///
/// Loads configuration, mounts the chat screen against the HTTP backend and
/// then reads lines until `/quit` or EOF. Events produced by each command are
/// rendered once the command returns.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args).await?;
    let _log_guard = init_tracing(&config)?;
    tracing::info!("[Main] Starting against {}", config.base_url());

    let backend = Arc::new(HttpDocumentsBackend::from_config(&config)?);
    let provider = Arc::new(DevIdentityProvider::new());
    let app = AppHome::new(&config, backend, provider);
    let mut events = app.subscribe();

    println!("{}", "=== DocSense ===".bright_magenta().bold());
    print_help();
    println!();

    // A failed first load is already on the event stream.
    let _ = app.mount().await;
    render::drain_events(&app, &mut events).await;
    if app.guard().await == AuthGuard::RedirectToAuth {
        println!(
            "{}",
            "Not signed in. Use /login or /signup; requests use the development caller meanwhile.".yellow()
        );
    }

    let mut rl: Repl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                if trimmed.starts_with('/') {
                    let (command, arg) = trimmed.split_once(' ').unwrap_or((trimmed, ""));
                    if !handle_command(&app, &mut rl, command, arg.trim()).await {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                } else {
                    println!("{}", format!("> {}", trimmed).green());
                    send_question(&app, trimmed).await;
                }

                render::drain_events(&app, &mut events).await;
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type '/quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    app.unmount().await;
    Ok(())
}

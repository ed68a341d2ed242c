//! Terminal rendering of application events and sidebar state.

use colored::Colorize;
use docsense_application::AppHome;
use docsense_core::event::AppEvent;
use docsense_core::session::MessageRole;
use tokio::sync::broadcast::{self, error::TryRecvError};

/// Prints every event queued on `events`.
pub async fn drain_events(app: &AppHome, events: &mut broadcast::Receiver<AppEvent>) {
    loop {
        match events.try_recv() {
            Ok(event) => render_event(app, &event).await,
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::warn!("[Render] Skipped {} events", skipped);
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
}

async fn render_event(app: &AppHome, event: &AppEvent) {
    match event {
        AppEvent::MessageAppended { role, .. } => {
            if *role == MessageRole::Assistant {
                println!("{}", "…".bright_black());
            }
        }
        AppEvent::ChunkAppended { chunk, .. } => {
            let is_error = chunk.starts_with("Error: ");
            for line in chunk.lines() {
                if is_error {
                    println!("{}", line.red());
                } else {
                    println!("{}", line.bright_blue());
                }
            }
        }
        AppEvent::ResponseFinished {
            session_id,
            message_id,
        } => {
            let citations = app
                .messages(session_id)
                .await
                .into_iter()
                .find(|message| &message.id == message_id)
                .map(|message| message.citations)
                .unwrap_or_default();
            for citation in citations {
                let source = citation.document_id.as_deref().unwrap_or("unknown document");
                let snippet = citation.text_snippet.as_deref().unwrap_or_default();
                println!("{}", format!("  [{}] {}", source, snippet).bright_black());
            }
            println!();
        }
        AppEvent::DocumentsLoading => println!("{}", "Loading…".bright_black()),
        AppEvent::DocumentsChanged { count } => {
            println!("{}", format!("{} chats in the sidebar", count).bright_black());
        }
        AppEvent::DocumentsSyncFailed { message } => println!("{}", message.red()),
        AppEvent::UploadStarted { file_name } => {
            println!("{}", format!("Uploading {}…", file_name).yellow());
        }
        AppEvent::UploadFinished { file_name } => {
            println!("{}", format!("Uploaded {}", file_name).green());
        }
        AppEvent::UploadFailed { message, .. } => println!("{}", message.red()),
        AppEvent::IdentityChanged { identity } => match identity {
            Some(identity) => println!(
                "{}",
                format!("Signed in as {}", identity.display_label()).green()
            ),
            None => println!("{}", "Signed out".bright_black()),
        },
    }
}

/// Prints the sidebar: loading state, error banner and the filtered list.
pub async fn print_chats(app: &AppHome) {
    let view = app.view().await;
    if view.sidebar_collapsed {
        println!("{}", "Sidebar collapsed. Use /sidebar to expand.".bright_black());
        return;
    }

    let documents = app.documents().await;
    if let Some(error) = &documents.last_error {
        println!("{}", error.red());
    }
    if documents.loading {
        println!("{}", "Loading…".bright_black());
        return;
    }

    let chats = app.visible_chats().await;
    if chats.is_empty() {
        println!("{}", "No documents".bright_black());
        return;
    }

    for (index, chat) in chats.iter().enumerate() {
        let line = format!("{:>3}. {}", index + 1, chat.title);
        if view.active_chat_id.as_deref() == Some(chat.id.as_str()) {
            println!("{}", line.bold());
        } else {
            println!("{}", line);
        }
    }
}

/// Prints the profile menu contents.
pub async fn print_profile(app: &AppHome) {
    println!(
        "{} {}",
        format!("[{}]", app.avatar_initials().await).bright_magenta().bold(),
        app.user_label().await
    );
    println!("{}", "  /logout to sign out".bright_black());
}

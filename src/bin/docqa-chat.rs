//! Interactive terminal client for the document Q&A service.
//!
//! This binary provides a REPL interface for asking questions against
//! uploaded documents, with login, conversation history, and resume.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage against a local service
//! docqa-chat
//!
//! # Point at a different deployment
//! docqa-chat --url http://qa.internal:8080
//!
//! # Disable colors (useful for piping output)
//! docqa-chat --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/new` - Start a fresh conversation
//! - `/chats` - List past conversations
//! - `/resume <index>` - Resume a past conversation
//! - `/context <mode>` - Switch between global, document, and custom scope
//! - `/upload <path>` - Upload files as document context
//! - `/quit` - Exit the application

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use docqa::chat::{
    ChatArgs, ChatCommand, ChatConfig, PlainTextRenderer, Renderer, SessionShell, help_text,
    parse_command,
};
use docqa::types::{ConversationSummary, RegisterParams};
use docqa::{DocQa, IdentityStore};

/// Main entry point for the docqa-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("docqa-chat [OPTIONS]");
    let config = ChatConfig::from(args);

    let client = Arc::new(DocQa::new(Some(config.url.clone()))?);
    let store = match config.state_dir.clone() {
        Some(dir) => IdentityStore::new(dir),
        None => IdentityStore::default_location()?,
    };
    let mut shell = SessionShell::new(client.clone(), store);
    let mut renderer = PlainTextRenderer::with_color(config.use_color);
    let mut rl = DefaultEditor::new()?;

    // Keep Ctrl+C from killing the process while a reply is in flight;
    // rustyline reports Interrupted at the prompt itself.
    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_clone = interrupted.clone();
    ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::Relaxed);
    })?;

    println!("Document Q&A Chat ({})", client.base_url());
    println!("Type /help for commands, /quit to exit\n");

    if !sign_in(&mut shell, &mut rl, &mut renderer).await? {
        return Ok(());
    }
    print_conversation(&mut shell, &mut renderer);

    loop {
        interrupted.store(false, Ordering::Relaxed);

        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                // Check for slash commands
                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::New => match shell.new_chat().await {
                            Ok(()) => {
                                renderer.print_info("Started a new conversation.");
                                print_conversation(&mut shell, &mut renderer);
                            }
                            Err(err) => renderer.print_error(&err.to_string()),
                        },
                        ChatCommand::Chats => match shell.conversation_list().await {
                            Ok(list) => print_chats(list),
                            Err(err) => renderer.print_error(&err.to_string()),
                        },
                        ChatCommand::Resume(idx) => match shell.resume(idx).await {
                            Ok(()) => {
                                renderer.print_info(&format!("Resumed conversation {idx}."));
                                print_conversation(&mut shell, &mut renderer);
                            }
                            Err(err) => renderer.print_error(&err.to_string()),
                        },
                        ChatCommand::Context(mode) => {
                            shell.session_mut().set_context_mode(mode);
                            renderer.print_info(&format!("Context mode set to {mode}."));
                        }
                        ChatCommand::Doc(name) => {
                            match shell.session_mut().select_document(&name) {
                                Ok(()) => renderer.print_info(&format!("Selected {name}.")),
                                Err(err) => renderer.print_error(&err.to_string()),
                            }
                        }
                        ChatCommand::Docs(name) => {
                            match shell.session_mut().toggle_document(&name) {
                                Ok(true) => renderer.print_info(&format!("Added {name}.")),
                                Ok(false) => renderer.print_info(&format!("Removed {name}.")),
                                Err(err) => renderer.print_error(&err.to_string()),
                            }
                        }
                        ChatCommand::Files => {
                            print_documents(shell.session().context().documents.as_slice());
                        }
                        ChatCommand::Upload(paths) => {
                            match shell.session_mut().upload(&paths).await {
                                Ok(uploaded) if uploaded.is_empty() => {
                                    renderer.print_info("Nothing uploaded.");
                                }
                                Ok(uploaded) => {
                                    renderer.print_info(&format!(
                                        "Uploaded: {}",
                                        uploaded.join(", ")
                                    ));
                                }
                                Err(err) => renderer.print_error(&err.to_string()),
                            }
                        }
                        ChatCommand::Whoami => match shell.identity() {
                            Some(identity) => renderer.print_info(&format!(
                                "Logged in as {} <{}>",
                                identity.name, identity.email
                            )),
                            None => renderer.print_info("Not logged in."),
                        },
                        ChatCommand::Logout => {
                            if let Err(err) = shell.logout().await {
                                renderer.print_error(&err.to_string());
                            }
                            renderer.print_info("Logged out.");
                            if !sign_in(&mut shell, &mut rl, &mut renderer).await? {
                                break;
                            }
                            print_conversation(&mut shell, &mut renderer);
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                // Regular message - send to the service
                match shell.session_mut().submit(line).await {
                    Ok(reply) => {
                        let reply = reply.clone();
                        renderer.print_message(&reply);
                    }
                    Err(err) => renderer.print_error(&err.to_string()),
                }
                if interrupted.swap(false, Ordering::Relaxed) {
                    renderer.print_info("Interrupt received; the reply above had already finished.");
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

/// Prompts for login or registration until one succeeds.
///
/// Returns Ok(false) when the user gives up (Ctrl+D).
async fn sign_in(
    shell: &mut SessionShell<DocQa>,
    rl: &mut DefaultEditor,
    renderer: &mut PlainTextRenderer,
) -> Result<bool, Box<dyn std::error::Error>> {
    let saved_email = match shell.saved_identity() {
        Ok(Some(identity)) => {
            println!("Welcome back, {}.", identity.name);
            Some(identity.email)
        }
        Ok(None) => None,
        Err(err) => {
            renderer.print_error(&format!("Could not read saved login: {err}"));
            None
        }
    };

    loop {
        let choice = match prompt(rl, "Login or register? [l/r]: ") {
            Some(choice) => choice,
            None => return Ok(false),
        };
        let outcome = match choice.as_str() {
            "l" | "login" => {
                let email = match prompt_with_default(rl, "Email", saved_email.as_deref()) {
                    Some(email) => email,
                    None => return Ok(false),
                };
                let password = match prompt(rl, "Password: ") {
                    Some(password) => password,
                    None => return Ok(false),
                };
                shell.login(&email, &password).await
            }
            "r" | "register" => {
                let Some(email) = prompt(rl, "Email: ") else {
                    return Ok(false);
                };
                let Some(name) = prompt(rl, "Name: ") else {
                    return Ok(false);
                };
                let Some(dob) = prompt(rl, "Date of birth (YYYY-MM-DD): ") else {
                    return Ok(false);
                };
                let Some(password) = prompt(rl, "Password: ") else {
                    return Ok(false);
                };
                shell
                    .register(RegisterParams {
                        email,
                        name,
                        dob,
                        password,
                    })
                    .await
            }
            _ => {
                renderer.print_info("Enter l to log in or r to register.");
                continue;
            }
        };
        match outcome {
            Ok(()) => {
                let name = shell.identity().map(|i| i.name.clone()).unwrap_or_default();
                renderer.print_info(&format!("Signed in as {name}."));
                return Ok(true);
            }
            Err(err) => renderer.print_error(&err.to_string()),
        }
    }
}

/// Reads one trimmed line, or None on Ctrl+D.
fn prompt(rl: &mut DefaultEditor, text: &str) -> Option<String> {
    loop {
        match rl.readline(text) {
            Ok(line) => {
                let line = line.trim();
                if !line.is_empty() {
                    return Some(line.to_string());
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!();
            }
            Err(_) => return None,
        }
    }
}

/// Like `prompt`, but an empty line accepts the default.
fn prompt_with_default(rl: &mut DefaultEditor, label: &str, default: Option<&str>) -> Option<String> {
    let text = match default {
        Some(value) => format!("{label} [{value}]: "),
        None => format!("{label}: "),
    };
    loop {
        match rl.readline(&text) {
            Ok(line) => {
                let line = line.trim();
                if !line.is_empty() {
                    return Some(line.to_string());
                }
                if let Some(value) = default {
                    return Some(value.to_string());
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!();
            }
            Err(_) => return None,
        }
    }
}

fn print_conversation(shell: &SessionShell<DocQa>, renderer: &mut PlainTextRenderer) {
    println!();
    for message in shell.session().messages() {
        renderer.print_message(message);
    }
}

fn print_chats(chats: &[ConversationSummary]) {
    if chats.is_empty() {
        println!("    (no past conversations)");
        return;
    }
    println!("    Past conversations:");
    for (idx, chat) in chats.iter().enumerate() {
        let length = chat.length.unwrap_or(0);
        println!(
            "      {idx}: {} ({}, {length} messages)",
            chat.title(),
            chat.started_display()
        );
    }
}

fn print_documents(documents: &[String]) {
    if documents.is_empty() {
        println!("    (no documents uploaded)");
        return;
    }
    println!("    Documents:");
    for name in documents {
        println!("      - {name}");
    }
}

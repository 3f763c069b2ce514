//! Interactive shell and one-shot command dispatch.
//!
//! The REPL prompt reflects the routed screen; the mechanic home and the
//! admin/assistant dashboard expose the same session commands but render
//! different status summaries.

use crate::models::{Role, User, UserPatch};
use crate::router::{route, Screen};
use crate::session::Session;
use crate::Args;
use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::cell::RefCell;

pub struct Context {
    pub args: Args,
    pub session: RefCell<Session>,
}

pub fn run_once(ctx: &Context, line: &str) -> Result<()> {
    handle_command(ctx, line.trim());
    Ok(())
}

pub fn run_repl(ctx: Context) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    println!("ambu - type help for commands, exit to quit");

    loop {
        let prompt = format!("ambu({})> ", route(ctx.session.borrow().state()).as_str());
        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line)?;

                if handle_command(&ctx, line) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Dispatch one command line. Returns true when the REPL should exit.
fn handle_command(ctx: &Context, cmd: &str) -> bool {
    let parts: Vec<&str> = cmd.split_whitespace().collect();
    let Some(&command) = parts.first() else {
        return false;
    };
    match command {
        "exit" | "quit" => return true,
        "help" => {
            println!("Commands:");
            println!("  login <email> <password>  - sign in");
            println!("  logout                    - sign out and clear the stored token");
            println!("  whoami                    - show the current user");
            println!("  refresh                   - re-fetch the current user from the server");
            println!("  vehicle <id|->            - assign or clear the active vehicle (local)");
            println!("  work start|stop           - toggle the working flag (local)");
            println!("  screen                    - show the routed screen");
            println!("  clear-errors              - dismiss the last error");
            println!("  exit                      - quit");
        }
        "login" => {
            if parts.len() != 3 {
                println!("Usage: login <email> <password>");
                return false;
            }
            let mut session = ctx.session.borrow_mut();
            session.authenticate(parts[1], parts[2]);
            match session.state().error.as_deref() {
                Some(message) => println!("Login failed: {}", message),
                None => report_session(session.state().user.as_ref()),
            }
        }
        "logout" => {
            let mut session = ctx.session.borrow_mut();
            if let Err(e) = session.logout() {
                eprintln!("Warning: failed to clear stored token: {}", e);
            }
            println!("Signed out");
        }
        "whoami" => {
            let session = ctx.session.borrow();
            match route(session.state()) {
                Screen::Login => println!("Not signed in (screen: login)"),
                Screen::Loading => println!("Session is loading"),
                Screen::MechanicHome => {
                    render_mechanic(session.state().user.as_ref());
                }
                Screen::Dashboard => {
                    render_dashboard(session.state().user.as_ref());
                }
            }
        }
        "refresh" => {
            let mut session = ctx.session.borrow_mut();
            session.load_user();
            if session.state().is_authenticated() {
                report_session(session.state().user.as_ref());
            } else {
                println!("Session could not be restored; use login");
            }
        }
        "vehicle" => {
            if parts.len() != 2 {
                println!("Usage: vehicle <id|->");
                return false;
            }
            let mut session = ctx.session.borrow_mut();
            if !session.state().is_authenticated() {
                println!("Not signed in (screen: login)");
                return false;
            }
            let vehicle = if parts[1] == "-" {
                None
            } else {
                Some(parts[1].to_string())
            };
            let cleared = vehicle.is_none();
            session.merge_user(UserPatch {
                active_vehicle: Some(vehicle),
                ..UserPatch::default()
            });
            if cleared {
                println!("Active vehicle cleared");
            } else {
                println!("Active vehicle: {}", parts[1]);
            }
        }
        "work" => {
            if parts.len() != 2 || (parts[1] != "start" && parts[1] != "stop") {
                println!("Usage: work start|stop");
                return false;
            }
            let mut session = ctx.session.borrow_mut();
            if !session.state().is_authenticated() {
                println!("Not signed in (screen: login)");
                return false;
            }
            let starting = parts[1] == "start";
            session.merge_user(UserPatch {
                is_working: Some(starting),
                work_started_at: Some(if starting {
                    Some(chrono::Utc::now())
                } else {
                    None
                }),
                ..UserPatch::default()
            });
            println!("Work {}", if starting { "started" } else { "stopped" });
        }
        "screen" => {
            let session = ctx.session.borrow();
            println!("Screen: {}", route(session.state()).as_str());
        }
        "clear-errors" => {
            ctx.session.borrow_mut().clear_errors();
            println!("Errors cleared");
        }
        _ => println!("Unknown command: {} (try help)", command),
    }
    false
}

fn report_session(user: Option<&User>) {
    match user {
        Some(user) => {
            let role = user
                .role
                .map(|r| r.as_str())
                .unwrap_or("unknown role");
            println!("Signed in as {} ({})", display_name(user), role);
        }
        None => println!("Signed in"),
    }
}

fn render_mechanic(user: Option<&User>) {
    let Some(user) = user else { return };
    println!("Mechanic: {}", display_name(user));
    if let Some(city) = &user.city {
        println!("  City: {}", city);
    }
    match &user.active_vehicle {
        Some(vehicle) => println!("  Vehicle: {}", vehicle),
        None => println!("  Vehicle: none assigned"),
    }
    if user.is_working {
        match &user.work_started_at {
            Some(started) => println!("  On shift since {}", started.format("%H:%M")),
            None => println!("  On shift"),
        }
    } else {
        println!("  Off shift");
    }
}

fn render_dashboard(user: Option<&User>) {
    let Some(user) = user else { return };
    let role = match user.role {
        Some(Role::Admin) => "admin",
        _ => "assistant",
    };
    println!("Dashboard: {} ({})", display_name(user), role);
    if let Some(city) = &user.city {
        match city.expanded() {
            Some(city) => println!("  City: {} ({})", city.name, city.id),
            None => println!("  City: #{}", city.id()),
        }
    }
}

fn display_name(user: &User) -> &str {
    if user.name.is_empty() {
        "<pending profile>"
    } else {
        &user.name
    }
}

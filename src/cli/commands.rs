//! Implementations of the individual CLI commands. Each command opens the
//! controller over the persisted workspace, applies one operation and
//! reports the outcome; domain errors are user-facing messages, never
//! fatal.

use colored::Colorize;
use std::error::Error;
use std::io::Read;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::app::App;
use crate::config::PlaygroundConfig;
use crate::error::PlaygroundError;
use crate::handlers::{RunStatus, SuggestionOutcome};

fn open_app() -> App {
    App::new(&PlaygroundConfig::load())
}

pub fn list_files() -> Result<(), Box<dyn Error>> {
    let app = open_app();
    println!("{}", "OPEN FILES".bold());
    for name in app.workspace.file_names() {
        let Some(file) = app.workspace.get(name) else {
            continue;
        };
        let marker = if name == app.workspace.active_file_name() {
            "*".bright_green()
        } else {
            " ".normal()
        };
        println!(
            "{} {:<20} {:<10} {} lines",
            marker,
            name.bright_white(),
            file.language().display_name(),
            file.line_count()
        );
    }
    Ok(())
}

pub fn new_file(name: &str) -> Result<(), Box<dyn Error>> {
    let mut app = open_app();
    match app.create_file(name) {
        Ok(()) => println!("{} Opened {}", "Created:".green(), name.bright_white()),
        Err(e) => println!("{} {}", "Error:".red(), e),
    }
    Ok(())
}

pub fn show_file(name: Option<&str>) -> Result<(), Box<dyn Error>> {
    let app = open_app();
    let name = name.unwrap_or_else(|| app.workspace.active_file_name());
    match app.workspace.get(name) {
        Some(file) => {
            println!(
                "{} ({})",
                file.name.bold(),
                file.language().display_name()
            );
            println!("{}", file.content);
        }
        None => println!(
            "{} {}",
            "Error:".red(),
            PlaygroundError::UnknownFile(name.to_string())
        ),
    }
    Ok(())
}

pub fn switch_file(name: &str) -> Result<(), Box<dyn Error>> {
    let mut app = open_app();
    match app.switch_file(name) {
        Ok(()) => println!("{} {}", "Active:".green(), name.bright_white()),
        Err(e) => println!("{} {}", "Error:".red(), e),
    }
    Ok(())
}

pub fn rename_file(old: &str, new: &str) -> Result<(), Box<dyn Error>> {
    let mut app = open_app();
    match app.rename_file(old, new) {
        Ok(()) => println!(
            "{} {} -> {}",
            "Renamed:".green(),
            old,
            new.bright_white()
        ),
        Err(e) => println!("{} {}", "Error:".red(), e),
    }
    Ok(())
}

pub fn close_file(name: &str) -> Result<(), Box<dyn Error>> {
    let mut app = open_app();
    match app.close_file(name) {
        Ok(()) => println!(
            "{} {} (active: {})",
            "Closed:".green(),
            name,
            app.workspace.active_file_name().bright_white()
        ),
        Err(e) => println!("{} {}", "Error:".red(), e),
    }
    Ok(())
}

pub fn edit_file(name: &str, source: &str) -> Result<(), Box<dyn Error>> {
    let content = if source == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(source)?
    };

    let mut app = open_app();
    match app.update_content(name, content) {
        Ok(()) => println!("{} {}", "Updated:".green(), name.bright_white()),
        Err(e) => println!("{} {}", "Error:".red(), e),
    }
    Ok(())
}

pub fn upload_file(path: &str) -> Result<(), Box<dyn Error>> {
    let path = Path::new(path);
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        println!("{} Not a file path: {}", "Error:".red(), path.display());
        return Ok(());
    };
    let content = std::fs::read_to_string(path)?;

    let mut app = open_app();
    match app.upload(name, content) {
        Ok(true) => println!("{} {}", "Uploaded:".green(), name.bright_white()),
        Ok(false) => println!(
            "{} {} (replaced existing content)",
            "Uploaded:".green(),
            name.bright_white()
        ),
        Err(e) => println!("{} {}", "Error:".red(), e),
    }
    Ok(())
}

pub async fn run_file(name: Option<&str>) -> Result<(), Box<dyn Error>> {
    let mut app = open_app();
    if let Some(name) = name {
        if let Err(e) = app.switch_file(name) {
            println!("{} {}", "Error:".red(), e);
            return Ok(());
        }
    }

    println!(
        "{} {}",
        "Running".bold(),
        app.workspace.active_file_name().bright_white()
    );
    let result = app.run_active_file().await;
    match result.status {
        RunStatus::Success => println!("{}", "Success".green().bold()),
        RunStatus::Error => println!("{}", "Error".red().bold()),
    }
    if !result.output.is_empty() {
        println!("{}", result.output);
    }
    Ok(())
}

pub async fn suggest_next_line() -> Result<(), Box<dyn Error>> {
    let config = PlaygroundConfig::load();
    let mut app = App::new(&config);
    let prefix = app.workspace.active_file().content.clone();
    app.request_suggestion(&prefix);

    // Results arrive on the coordinator's channel; keep draining until the
    // live request resolves or we give up waiting.
    let deadline = Instant::now() + config.suggestion_timeout() + Duration::from_secs(2);
    loop {
        if let Some(outcome) = app.poll_suggestion() {
            match outcome {
                SuggestionOutcome::Suggestion(text) => {
                    println!("{}", "Suggestion:".bold());
                    println!("{}", text.bright_white());
                }
                SuggestionOutcome::NoSuggestion => println!("No suggestion."),
            }
            return Ok(());
        }
        if Instant::now() >= deadline {
            println!("No suggestion.");
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

pub fn diff_file(name: Option<&str>) -> Result<(), Box<dyn Error>> {
    let mut app = open_app();
    if let Some(name) = name {
        if let Err(e) = app.switch_file(name) {
            println!("{} {}", "Error:".red(), e);
            return Ok(());
        }
    }

    match app.diff_active_file() {
        None => println!("No changes to show."),
        Some(diff) if !diff.has_changes() => {
            println!("No edits since the file was loaded.");
        }
        Some(diff) => {
            println!(
                "{} {}",
                "Changes in".bold(),
                app.workspace.active_file_name().bright_white()
            );
            for line in diff.original.lines() {
                println!("{}", format!("- {line}").red());
            }
            for line in diff.current.lines() {
                println!("{}", format!("+ {line}").green());
            }
        }
    }
    Ok(())
}

pub fn download_file(name: &str, dest_dir: Option<&str>) -> Result<(), Box<dyn Error>> {
    let app = open_app();
    match app.download_blob(name) {
        Ok((file_name, bytes)) => {
            let dest = Path::new(dest_dir.unwrap_or(".")).join(file_name);
            std::fs::write(&dest, bytes)?;
            println!("{} {}", "Saved:".green(), dest.display());
        }
        Err(e) => println!("{} {}", "Error:".red(), e),
    }
    Ok(())
}

pub fn reset_workspace() -> Result<(), Box<dyn Error>> {
    print!("Are you sure you want to reset your workspace? [y/N] ");
    use std::io::Write;
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    if !answer.trim().eq_ignore_ascii_case("y") {
        println!("Reset cancelled.");
        return Ok(());
    }

    let mut app = open_app();
    app.reset();
    println!(
        "{} Workspace is back to {}",
        "Reset:".green(),
        app.workspace.active_file_name().bright_white()
    );
    Ok(())
}

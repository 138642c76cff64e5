//! CLI module for codepad.
//! A thin command shell over the workspace controller: every command loads
//! the persisted workspace, performs one operation through the controller,
//! and lets the controller persist the result. No orchestration logic
//! lives here.

pub mod commands;

use colored::Colorize;
use std::error::Error;

/// Executes CLI commands based on the provided arguments.
pub async fn execute_cli(args: &[String]) -> Result<(), Box<dyn Error>> {
    if args.is_empty() {
        print_help();
        return Ok(());
    }

    match args[0].as_str() {
        "list" | "ls" => {
            commands::list_files()?;
        }
        "new" => {
            if args.len() < 2 {
                println!("{} Usage: codepad new <NAME.py|NAME.js>", "Error:".red());
                return Ok(());
            }
            commands::new_file(&args[1])?;
        }
        "show" | "view" | "cat" => {
            commands::show_file(args.get(1).map(String::as_str))?;
        }
        "switch" => {
            if args.len() < 2 {
                println!("{} Usage: codepad switch <NAME>", "Error:".red());
                return Ok(());
            }
            commands::switch_file(&args[1])?;
        }
        "rename" => {
            if args.len() < 3 {
                println!("{} Usage: codepad rename <OLD> <NEW>", "Error:".red());
                return Ok(());
            }
            commands::rename_file(&args[1], &args[2])?;
        }
        "rm" | "close" => {
            if args.len() < 2 {
                println!("{} Usage: codepad rm <NAME>", "Error:".red());
                return Ok(());
            }
            commands::close_file(&args[1])?;
        }
        "edit" => {
            if args.len() < 3 {
                println!(
                    "{} Usage: codepad edit <NAME> <PATH | ->",
                    "Error:".red()
                );
                return Ok(());
            }
            commands::edit_file(&args[1], &args[2])?;
        }
        "open" | "upload" => {
            if args.len() < 2 {
                println!("{} Usage: codepad open <PATH>", "Error:".red());
                return Ok(());
            }
            commands::upload_file(&args[1])?;
        }
        "run" => {
            commands::run_file(args.get(1).map(String::as_str)).await?;
        }
        "suggest" => {
            commands::suggest_next_line().await?;
        }
        "diff" => {
            commands::diff_file(args.get(1).map(String::as_str))?;
        }
        "download" | "save" => {
            if args.len() < 2 {
                println!("{} Usage: codepad download <NAME> [DIR]", "Error:".red());
                return Ok(());
            }
            commands::download_file(&args[1], args.get(2).map(String::as_str))?;
        }
        "reset" => {
            commands::reset_workspace()?;
        }
        "help" => {
            print_help();
        }
        _ => {
            println!("{} Unknown command: {}", "Error:".red(), args[0]);
            print_help();
        }
    }

    Ok(())
}

/// Prints the help message with available commands.
fn print_help() {
    println!("{}", "CODEPAD - MULTI-FILE CODE PLAYGROUND".bold());
    println!();
    println!("{}", "USAGE:".bright_yellow());
    println!("  codepad [COMMAND] [ARGS]");
    println!();
    println!("{}", "COMMANDS:".bright_yellow());
    println!(
        "  {:<24} {}",
        "list, ls".bright_white(),
        "List open files and the active tab"
    );
    println!(
        "  {:<24} {}",
        "new <NAME>".bright_white(),
        "Open a new empty file (.py or .js) and make it active"
    );
    println!(
        "  {:<24} {}",
        "show [NAME]".bright_white(),
        "Print a file's content (defaults to the active file)"
    );
    println!(
        "  {:<24} {}",
        "switch <NAME>".bright_white(),
        "Make another open file active"
    );
    println!(
        "  {:<24} {}",
        "rename <OLD> <NEW>".bright_white(),
        "Rename an open file"
    );
    println!(
        "  {:<24} {}",
        "rm, close <NAME>".bright_white(),
        "Close a file (the last one stays open)"
    );
    println!(
        "  {:<24} {}",
        "edit <NAME> <PATH|->".bright_white(),
        "Replace a file's content from a path or stdin"
    );
    println!(
        "  {:<24} {}",
        "open <PATH>".bright_white(),
        "Upload a file from disk into the workspace"
    );
    println!(
        "  {:<24} {}",
        "run [NAME]".bright_white(),
        "Run the active file (or switch to NAME and run it)"
    );
    println!(
        "  {:<24} {}",
        "suggest".bright_white(),
        "Ask the completion provider for the next line"
    );
    println!(
        "  {:<24} {}",
        "diff [NAME]".bright_white(),
        "Show edits against the originally loaded content"
    );
    println!(
        "  {:<24} {}",
        "download <NAME> [DIR]".bright_white(),
        "Write a file's content out as a named file"
    );
    println!(
        "  {:<24} {}",
        "reset".bright_white(),
        "Clear persisted state and reseed the workspace"
    );
    println!("  {:<24} {}", "help".bright_white(), "Display this help message");
}

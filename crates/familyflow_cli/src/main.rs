//! CLI entry point.
//!
//! # Responsibility
//! - Provide a smoke check for `familyflow_core` linkage.
//! - Print a group's board from a local store for quick inspection.

use clap::{Parser, Subcommand};
use familyflow_core::service::board::{BoardRow, BoardService, BoardView};
use familyflow_core::{db, EngineConfig, SqliteTaskRepository};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "familyflow_cli")]
#[command(about = "Inspect a FamilyFlow task store")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
enum Command {
    /// Print core ping and version (default)
    Ping,
    /// Print a group's board from a local store
    Board {
        /// Path to the SQLite store
        db_path: PathBuf,
        /// Chat group whose board is shown
        group_id: String,
        /// Member viewing the board; decides the row actions
        viewer: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Ping) {
        Command::Ping => {
            println!("familyflow_core ping={}", familyflow_core::ping());
            println!("familyflow_core version={}", familyflow_core::core_version());
            ExitCode::SUCCESS
        }
        Command::Board {
            db_path,
            group_id,
            viewer,
        } => match print_board(&db_path, &group_id, viewer.as_deref().unwrap_or("")) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("error: {err}");
                ExitCode::FAILURE
            }
        },
    }
}

fn print_board(
    db_path: &Path,
    group_id: &str,
    viewer: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let conn = db::open_db(db_path)?;
    let repo = SqliteTaskRepository::new(&conn);
    let board = BoardService::new(repo, EngineConfig::default()).build(group_id, viewer)?;
    render(&board);
    Ok(())
}

fn render(board: &BoardView) {
    println!("group={} viewer={}", board.group_id, board.viewer);

    println!("[routine]");
    print_rows(&board.routine.pending);
    println!("[routine history]");
    print_rows(&board.routine.history);
    println!("[routine trash]");
    print_rows(&board.routine.trash);

    for group in &board.projects.groups {
        println!("[project: {}]", group.topic);
        print_rows(&group.rows);
    }
    println!("[project history]");
    print_rows(&board.projects.history);
    println!("[project trash]");
    print_rows(&board.projects.trash);
}

fn print_rows(rows: &[BoardRow]) {
    if rows.is_empty() {
        println!("  (none)");
        return;
    }
    for row in rows {
        let task = &row.task;
        let assignee = task.assignee.as_deref().unwrap_or("-");
        let due = task
            .due_date
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        let lock = if row.actions.locked { " (locked)" } else { "" };
        println!(
            "  {} [{}] {} assignee={} due={}{}",
            task.id,
            task.state(),
            task.content,
            assignee,
            due,
            lock
        );
    }
}

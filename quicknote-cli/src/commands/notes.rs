//! Note listing, creation and deletion

use anyhow::Result;
use clap::Subcommand;
use quicknote_core::{Note, NoteContent};
use uuid::Uuid;

use super::{explain, Ctx};

#[derive(Subcommand, Debug)]
pub enum NotesCommands {
    /// List your notes, newest first
    List {
        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Create a note
    Add {
        /// Note text
        content: String,
    },
    /// Delete a note by id
    Delete {
        /// Note id (UUID)
        id: Uuid,
    },
}

pub async fn run_notes(ctx: &Ctx, command: NotesCommands) -> Result<()> {
    let (client, _) = ctx.signed_in()?;

    match command {
        NotesCommands::List { json } => {
            let notes = client.list_notes().await.map_err(explain)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&notes)?);
            } else if notes.is_empty() {
                println!("No notes yet.");
            } else {
                for note in &notes {
                    println!("{}", format_note(note));
                }
            }
        }
        NotesCommands::Add { content } => {
            let content = NoteContent::new(&content)?;
            let note = client.create_note(content.as_str()).await.map_err(explain)?;
            println!("Created {}", note.id);
        }
        NotesCommands::Delete { id } => {
            client.delete_note(id).await.map_err(explain)?;
            println!("Deleted {}", id);
        }
    }

    Ok(())
}

fn format_note(note: &Note) -> String {
    let when = note
        .created_at_utc()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    format!("{}  {:<16}  {}", note.id, when, note.content.replace('\n', " "))
}

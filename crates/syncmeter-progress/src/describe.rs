//! Human-readable descriptions of items for activity views and logs

use syncmeter_core::domain::{Direction, Instruction, SyncFileItem};

/// Describes what happened to an item once it has been processed
pub fn result_description(item: &SyncFileItem) -> String {
    match item.instruction() {
        Instruction::Sync | Instruction::New => {
            if item.direction() != Direction::Up {
                "Downloaded".to_string()
            } else {
                "Uploaded".to_string()
            }
        }
        Instruction::Conflict => "Downloaded, renamed conflicting file".to_string(),
        Instruction::Remove => "Deleted".to_string(),
        Instruction::EvalRename | Instruction::Rename => {
            format!("Moved to {}", item.rename_target().unwrap_or_default())
        }
        Instruction::Ignore => "Ignored".to_string(),
        Instruction::StatError => "Filesystem access error".to_string(),
        Instruction::Error => "Error".to_string(),
        Instruction::None | Instruction::Eval => "Unknown".to_string(),
    }
}

/// Describes what is being done to an item while it is in flight
///
/// Returns `None` for items with nothing to do.
pub fn action_description(item: &SyncFileItem) -> Option<&'static str> {
    match item.instruction() {
        Instruction::Conflict | Instruction::Sync | Instruction::New => {
            if item.direction() != Direction::Up {
                Some("downloading")
            } else {
                Some("uploading")
            }
        }
        Instruction::Remove => Some("deleting"),
        Instruction::EvalRename | Instruction::Rename => Some("moving"),
        Instruction::Ignore => Some("ignoring"),
        Instruction::StatError | Instruction::Error => Some("error"),
        Instruction::None | Instruction::Eval => None,
    }
}

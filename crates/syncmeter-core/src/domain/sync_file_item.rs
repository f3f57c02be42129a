//! SyncFileItem domain entity
//!
//! A `SyncFileItem` describes one filesystem entry changed by the current
//! synchronization run. The synchronization engine creates it during
//! discovery and hands it, read-only, to the progress engine with every
//! start/partial/completion event.
//!
//! ## Byte accounting
//!
//! Only entries that actually move content contribute to the byte-based
//! estimate:
//!
//! ```text
//!   counts_toward_size = !is_directory && instruction ∈ { New, Sync, Conflict }
//! ```
//!
//! The same predicate must be used when totals are accumulated and when
//! completions are recorded, otherwise the byte counters drift apart.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::newtypes::ItemPath;

// ============================================================================
// Instruction enum
// ============================================================================

/// What the synchronization engine decided to do with an item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instruction {
    /// Nothing to do
    #[default]
    None,
    /// Still being evaluated
    Eval,
    /// Item is new on one side and will be copied
    New,
    /// Item was modified and its content will be transferred
    Sync,
    /// Item will be deleted
    Remove,
    /// Item will be moved
    Rename,
    /// Item is a rename candidate still being evaluated
    EvalRename,
    /// Both sides changed; the remote copy is downloaded and the local one renamed
    Conflict,
    /// Item is excluded from synchronization
    Ignore,
    /// The local filesystem could not be queried for this item
    StatError,
    /// The item failed to synchronize
    Error,
}

impl Instruction {
    /// Returns true if carrying out this instruction transfers file content
    pub fn moves_bytes(&self) -> bool {
        matches!(
            self,
            Instruction::New | Instruction::Sync | Instruction::Conflict
        )
    }

    /// Returns true if this instruction is a no-op
    pub fn is_none(&self) -> bool {
        matches!(self, Instruction::None)
    }

    /// Returns the instruction name in snake_case
    pub fn name(&self) -> &'static str {
        match self {
            Instruction::None => "none",
            Instruction::Eval => "eval",
            Instruction::New => "new",
            Instruction::Sync => "sync",
            Instruction::Remove => "remove",
            Instruction::Rename => "rename",
            Instruction::EvalRename => "eval_rename",
            Instruction::Conflict => "conflict",
            Instruction::Ignore => "ignore",
            Instruction::StatError => "stat_error",
            Instruction::Error => "error",
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Direction enum
// ============================================================================

/// Transfer direction of an item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Not a transfer (or not yet decided)
    #[default]
    None,
    /// Local to remote
    Up,
    /// Remote to local
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::None => write!(f, "none"),
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

// ============================================================================
// ItemStatus enum
// ============================================================================

/// Outcome the synchronization engine assigned to an item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Not processed yet
    #[default]
    NoStatus,
    /// Error that aborts the whole run
    FatalError,
    /// Error for this item only
    NormalError,
    /// Transient error, retried on the next run
    SoftError,
    /// Item synchronized successfully
    Success,
    /// Item ended in a conflict copy
    Conflict,
    /// Item was ignored
    FileIgnored,
    /// Item was restored because the change was not permitted
    Restoration,
}

impl ItemStatus {
    /// Returns true if the outcome deserves a warning in the activity view
    pub fn is_warning_kind(&self) -> bool {
        matches!(
            self,
            ItemStatus::SoftError
                | ItemStatus::NormalError
                | ItemStatus::FatalError
                | ItemStatus::FileIgnored
                | ItemStatus::Conflict
                | ItemStatus::Restoration
        )
    }

    /// Returns true if the item was ignored
    pub fn is_ignored_kind(&self) -> bool {
        matches!(self, ItemStatus::FileIgnored)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ItemStatus::NoStatus => "no_status",
            ItemStatus::FatalError => "fatal_error",
            ItemStatus::NormalError => "normal_error",
            ItemStatus::SoftError => "soft_error",
            ItemStatus::Success => "success",
            ItemStatus::Conflict => "conflict",
            ItemStatus::FileIgnored => "file_ignored",
            ItemStatus::Restoration => "restoration",
        };
        write!(f, "{}", s)
    }
}

// ============================================================================
// SyncFileItem struct
// ============================================================================

fn default_affected_items() -> u64 {
    1
}

/// One filesystem entry changed by the current synchronization run
///
/// Consumed read-only by the progress engine. The `path` is the unique key
/// under which in-flight transfers are tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncFileItem {
    /// Path relative to the synchronized folder
    path: ItemPath,
    /// Whether this entry is a directory
    #[serde(default)]
    is_directory: bool,
    /// Size in bytes (0 for directories)
    #[serde(default)]
    size: u64,
    /// What the engine will do with this entry
    #[serde(default)]
    instruction: Instruction,
    /// Transfer direction
    #[serde(default)]
    direction: Direction,
    /// Number of tracked items this operation covers (e.g. a recursive delete)
    #[serde(default = "default_affected_items")]
    affected_items: u64,
    /// Outcome once processed
    #[serde(default)]
    status: ItemStatus,
    /// Destination path for renames
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rename_target: Option<String>,
}

impl SyncFileItem {
    /// Creates a file item
    pub fn file(path: ItemPath, size: u64, instruction: Instruction) -> Self {
        Self {
            path,
            is_directory: false,
            size,
            instruction,
            direction: Direction::None,
            affected_items: 1,
            status: ItemStatus::NoStatus,
            rename_target: None,
        }
    }

    /// Creates a directory item (size 0)
    pub fn directory(path: ItemPath, instruction: Instruction) -> Self {
        Self {
            is_directory: true,
            ..Self::file(path, 0, instruction)
        }
    }

    /// Sets the transfer direction
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Sets how many tracked items this operation covers
    pub fn with_affected_items(mut self, affected_items: u64) -> Self {
        self.affected_items = affected_items;
        self
    }

    /// Sets the outcome
    pub fn with_status(mut self, status: ItemStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the rename destination
    pub fn with_rename_target(mut self, target: impl Into<String>) -> Self {
        self.rename_target = Some(target.into());
        self
    }

    // --- Getters ---

    /// Returns the path key
    pub fn path(&self) -> &ItemPath {
        &self.path
    }

    /// Returns true if this is a directory
    pub fn is_directory(&self) -> bool {
        self.is_directory
    }

    /// Returns the size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the instruction
    pub fn instruction(&self) -> Instruction {
        self.instruction
    }

    /// Returns the transfer direction
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns the number of tracked items this operation covers
    pub fn affected_items(&self) -> u64 {
        self.affected_items
    }

    /// Returns the outcome
    pub fn status(&self) -> ItemStatus {
        self.status
    }

    /// Returns the rename destination, if any
    pub fn rename_target(&self) -> Option<&str> {
        self.rename_target.as_deref()
    }

    // --- Setters ---

    /// Records the outcome of processing this item
    pub fn set_status(&mut self, status: ItemStatus) {
        self.status = status;
    }

    // --- Computed Properties ---

    /// Returns true if this item contributes to the byte-based estimate
    pub fn counts_toward_size(&self) -> bool {
        !self.is_directory && self.instruction.moves_bytes()
    }

    /// Returns true if this item contributes to the file-count estimate
    ///
    /// Files always count; directories only when something happens to them.
    pub fn counts_toward_files(&self) -> bool {
        !self.is_directory || !self.instruction.is_none()
    }
}

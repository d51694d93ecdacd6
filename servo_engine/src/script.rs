//! Script library.
//!
//! Named, persisted command lists. Expansion into sequence steps (and the
//! recursion guard) lives on the engine; this module owns storage, CRUD
//! rules and command splitting.

use servo_common::consts::MAX_NAME_LEN;
use servo_common::record::ScriptRecord;
use tracing::{info, warn};

use crate::error::CommandError;

/// Scripts held by the library.
pub const MAX_SCRIPTS: usize = 20;
/// Commands kept from one script's text.
pub const MAX_SCRIPT_COMMANDS: usize = 100;
/// Nested `script` expansions allowed before `RecursionLimit`.
pub const MAX_SCRIPT_DEPTH: usize = 5;
/// Maximum length of a script's command text [bytes].
pub const MAX_COMMANDS_TEXT: usize = 1024;
/// Maximum length of a script description [bytes].
pub const MAX_DESCRIPTION_LEN: usize = 127;

/// One stored script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub name: String,
    pub description: String,
    pub commands: String,
    pub enabled: bool,
}

impl From<&Script> for ScriptRecord {
    fn from(s: &Script) -> Self {
        Self {
            name: s.name.clone(),
            description: s.description.clone(),
            commands: s.commands.clone(),
            enabled: s.enabled,
        }
    }
}

/// Split script text on `;`, `\n` or `\r` into trimmed, non-empty commands.
///
/// At most [`MAX_SCRIPT_COMMANDS`] entries are returned.
pub fn split_commands(text: &str) -> Vec<String> {
    text.split([';', '\n', '\r'])
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .take(MAX_SCRIPT_COMMANDS)
        .map(str::to_string)
        .collect()
}

/// Bounded, index-addressed script store. Names are unique ignoring case.
#[derive(Debug, Default)]
pub struct ScriptLibrary {
    scripts: heapless::Vec<Script, MAX_SCRIPTS>,
}

impl ScriptLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    fn validate(
        &self,
        name: &str,
        description: &str,
        commands: &str,
        skip: Option<usize>,
    ) -> Result<(), CommandError> {
        if name.trim().is_empty() {
            return Err(CommandError::validation("Script name cannot be empty"));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(CommandError::validation(format!(
                "Script name cannot exceed {MAX_NAME_LEN} characters"
            )));
        }
        if description.len() > MAX_DESCRIPTION_LEN {
            return Err(CommandError::validation(format!(
                "Script description cannot exceed {MAX_DESCRIPTION_LEN} characters"
            )));
        }
        if commands.len() > MAX_COMMANDS_TEXT {
            return Err(CommandError::validation(format!(
                "Script commands cannot exceed {MAX_COMMANDS_TEXT} characters"
            )));
        }
        let clash = self
            .scripts
            .iter()
            .enumerate()
            .any(|(i, s)| Some(i) != skip && s.name.eq_ignore_ascii_case(name));
        if clash {
            return Err(CommandError::validation(format!(
                "Script '{name}' already exists"
            )));
        }
        Ok(())
    }

    /// Add an enabled script. Returns its index.
    pub fn add(
        &mut self,
        name: &str,
        description: &str,
        commands: &str,
    ) -> Result<usize, CommandError> {
        if self.scripts.is_full() {
            return Err(CommandError::exhausted(format!(
                "Script library full ({MAX_SCRIPTS})"
            )));
        }
        self.validate(name, description, commands, None)?;
        let script = Script {
            name: name.trim().to_string(),
            description: description.to_string(),
            commands: commands.to_string(),
            enabled: true,
        };
        self.scripts
            .push(script)
            .map_err(|_| CommandError::exhausted("Script library full"))?;
        info!(name, index = self.scripts.len() - 1, "Script added");
        Ok(self.scripts.len() - 1)
    }

    /// Replace name, description and commands of the script at `index`.
    pub fn update(
        &mut self,
        index: usize,
        name: &str,
        description: &str,
        commands: &str,
    ) -> Result<(), CommandError> {
        if index >= self.scripts.len() {
            return Err(not_found_index(index));
        }
        self.validate(name, description, commands, Some(index))?;
        let script = &mut self.scripts[index];
        script.name = name.trim().to_string();
        script.description = description.to_string();
        script.commands = commands.to_string();
        info!(name, index, "Script updated");
        Ok(())
    }

    /// Remove the script at `index`; later scripts shift down.
    pub fn delete(&mut self, index: usize) -> Result<Script, CommandError> {
        if index >= self.scripts.len() {
            return Err(not_found_index(index));
        }
        let removed = self.scripts.remove(index);
        info!(name = %removed.name, index, "Script deleted");
        Ok(removed)
    }

    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> Result<(), CommandError> {
        let script = self
            .scripts
            .get_mut(index)
            .ok_or_else(|| not_found_index(index))?;
        script.enabled = enabled;
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Script> {
        self.scripts.get(index)
    }

    /// Look up a script by name, ignoring case.
    pub fn find(&self, name: &str) -> Option<&Script> {
        self.scripts
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name.trim()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Replace the whole library from stored records.
    ///
    /// Invalid or duplicate records are skipped with a warning.
    pub fn replace_all(&mut self, records: &[ScriptRecord]) -> usize {
        self.scripts.clear();
        for record in records {
            match self.add(&record.name, &record.description, &record.commands) {
                Ok(index) => self.scripts[index].enabled = record.enabled,
                Err(e) => warn!(name = %record.name, error = %e, "Skipping stored script"),
            }
        }
        self.scripts.len()
    }

    pub fn records(&self) -> Vec<ScriptRecord> {
        self.scripts.iter().map(ScriptRecord::from).collect()
    }
}

fn not_found_index(index: usize) -> CommandError {
    CommandError::not_found(format!("Script index {index} not found"))
}

//! Operator interaction seam.
//!
//! The engine never reads a terminal directly; it asks a [`Prompt`]. The CLI
//! supplies a terminal implementation, unattended runs use
//! [`NonInteractive`], and tests script their answers.

use std::collections::VecDeque;

use super::EntityKind;
use crate::api::EntityRef;
use crate::error::{ConfigError, SyncError};
use crate::storage::ConfigKey;

/// One request for a mapping target.
#[derive(Debug, Clone, Copy)]
pub struct MappingRequest<'a> {
    pub kind: EntityKind,
    /// The unmapped source entity.
    pub entity: &'a EntityRef,
    /// Destination entities the answer must be chosen from, sorted by id.
    pub candidates: &'a [EntityRef],
    /// 1 on the first ask, incremented after each rejected answer.
    pub attempt: u32,
}

impl MappingRequest<'_> {
    pub fn allows_skip(&self) -> bool {
        self.kind.allows_skip()
    }
}

pub trait Prompt {
    /// Value for a configuration key that is neither stored nor given.
    fn ask_value(&mut self, key: ConfigKey) -> Result<String, SyncError>;

    /// Raw answer for a mapping request. Validation happens in the caller.
    fn choose(&mut self, request: &MappingRequest<'_>) -> Result<String, SyncError>;
}

impl<P: Prompt + ?Sized> Prompt for &mut P {
    fn ask_value(&mut self, key: ConfigKey) -> Result<String, SyncError> {
        (**self).ask_value(key)
    }

    fn choose(&mut self, request: &MappingRequest<'_>) -> Result<String, SyncError> {
        (**self).choose(request)
    }
}

/// Fails whenever input would be needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonInteractive;

impl Prompt for NonInteractive {
    fn ask_value(&mut self, key: ConfigKey) -> Result<String, SyncError> {
        Err(ConfigError::MissingKey(key.as_str().to_string()).into())
    }

    fn choose(&mut self, request: &MappingRequest<'_>) -> Result<String, SyncError> {
        Err(SyncError::MappingRequired {
            kind: request.kind,
            id: request.entity.id,
            name: request.entity.name.clone(),
        })
    }
}

/// Answers from a fixed script, in order.
///
/// Running out of answers is a prompt failure, the same as a closed
/// terminal.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompt {
    values: VecDeque<String>,
    choices: VecDeque<String>,
    /// Every mapping question asked, as `(kind, source id, attempt)`.
    pub asked: Vec<(EntityKind, u64, u32)>,
}

impl ScriptedPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices.extend(choices.into_iter().map(Into::into));
        self
    }

    pub fn remaining_choices(&self) -> usize {
        self.choices.len()
    }
}

impl Prompt for ScriptedPrompt {
    fn ask_value(&mut self, key: ConfigKey) -> Result<String, SyncError> {
        self.values
            .pop_front()
            .ok_or_else(|| SyncError::Prompt(format!("no scripted value for {key}")))
    }

    fn choose(&mut self, request: &MappingRequest<'_>) -> Result<String, SyncError> {
        self.asked
            .push((request.kind, request.entity.id, request.attempt));
        self.choices.pop_front().ok_or_else(|| {
            SyncError::Prompt(format!(
                "no scripted answer for {} '{}'",
                request.kind, request.entity.name
            ))
        })
    }
}

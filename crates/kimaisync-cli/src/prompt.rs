//! Terminal prompt for missing settings and mappings.

use std::io::{self, BufRead, Write};

use kimaisync_core::storage::DO_NOT_MAP;
use kimaisync_core::sync::MappingRequest;
use kimaisync_core::{ConfigKey, Prompt, SyncError};

pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompt<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_line(&mut self) -> Result<String, SyncError> {
        self.output.flush().map_err(prompt_error)?;
        let mut line = String::new();
        let read = self.input.read_line(&mut line).map_err(prompt_error)?;
        if read == 0 {
            return Err(SyncError::Prompt("input closed".into()));
        }
        Ok(line.trim().to_string())
    }
}

fn prompt_error(e: io::Error) -> SyncError {
    SyncError::Prompt(e.to_string())
}

fn label(key: ConfigKey) -> &'static str {
    match key {
        ConfigKey::SourceUrl => "URL of the source Kimai",
        ConfigKey::SourceApiKey => "API token for the source Kimai",
        ConfigKey::SourceCustomer => "Customer to sync (name as shown in the source Kimai)",
        ConfigKey::DestinationUrl => "URL of the destination Kimai",
        ConfigKey::DestinationApiKey => "API token for the destination Kimai",
    }
}

impl<R: BufRead, W: Write> Prompt for TerminalPrompt<R, W> {
    fn ask_value(&mut self, key: ConfigKey) -> Result<String, SyncError> {
        write!(self.output, "{}: ", label(key)).map_err(prompt_error)?;
        self.read_line()
    }

    fn choose(&mut self, request: &MappingRequest<'_>) -> Result<String, SyncError> {
        let out = &mut self.output;
        if request.attempt > 1 {
            writeln!(out, "Not a valid choice, try again.").map_err(prompt_error)?;
        } else {
            writeln!(
                out,
                "\nNo destination {} for source {} {} \"{}\". Candidates:",
                request.kind, request.kind, request.entity.id, request.entity.name
            )
            .map_err(prompt_error)?;
            for candidate in request.candidates {
                writeln!(out, "  {}: {}", candidate.id, candidate.name).map_err(prompt_error)?;
            }
            if request.allows_skip() {
                writeln!(out, "  {DO_NOT_MAP}: do not sync this {}", request.kind)
                    .map_err(prompt_error)?;
            }
        }
        write!(out, "Destination {} id: ", request.kind).map_err(prompt_error)?;
        self.read_line()
    }
}

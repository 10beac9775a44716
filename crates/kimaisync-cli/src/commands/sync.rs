//! The `sync` command: one full run against the configured installations.

use kimaisync_core::{
    synchronize, ConfigStore, KimaiClient, NonInteractive, Overrides, Prompt, SyncOptions,
    SyncReport,
};
use tracing::debug;

use crate::prompt::TerminalPrompt;

pub fn run(
    store: &ConfigStore,
    overrides: Overrides,
    non_interactive: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    debug!(path = %store.path().display(), "using config");
    let options = SyncOptions {
        overrides,
        ..SyncOptions::default()
    };

    let mut terminal;
    let mut batch = NonInteractive;
    let prompt: &mut dyn Prompt = if non_interactive {
        &mut batch
    } else {
        terminal = TerminalPrompt::stdio();
        &mut terminal
    };

    let report = synchronize(store, &options, prompt, |_, conn| {
        KimaiClient::new(&conn.url, &conn.api_key)
    })?;
    print_summary(&report);
    Ok(())
}

fn print_summary(report: &SyncReport) {
    println!("Transferred: {}", report.transferred);
    if report.mappings_added > 0 {
        println!("New mappings: {}", report.mappings_added);
    }
    let skipped =
        report.skipped_unfinished + report.skipped_already_synced + report.skipped_ignored_project;
    if skipped > 0 {
        println!(
            "Skipped: {skipped} (running: {}, already synced: {}, not synced project: {})",
            report.skipped_unfinished, report.skipped_already_synced, report.skipped_ignored_project
        );
    }
}

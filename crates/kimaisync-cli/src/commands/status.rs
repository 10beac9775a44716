use kimaisync_core::ConfigStore;

/// Print the stored configuration as JSON, tokens masked.
pub fn run(store: &ConfigStore) -> Result<(), Box<dyn std::error::Error>> {
    let config = store.load()?;
    let json = serde_json::to_string_pretty(&config.redacted())?;
    println!("{json}");
    Ok(())
}

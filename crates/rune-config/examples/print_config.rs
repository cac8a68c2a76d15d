/// Example program to print the loaded configuration
///
/// Run with: cargo run -p rune-config --example print_config

fn main() {
    // Load configuration from rune.toml
    let config = rune_config::RuneConfig::load();

    println!("=== Rune Configuration ===\n");

    println!("Engine Settings:");
    println!("  Frame Rate: {}", config.engine.frame_rate);
    println!("  Skip Animations: {}", config.engine.skip_animations);
    println!("  Transition Duration: {}", config.engine.transition_duration);
    println!("  Scroll Speed: {}", config.engine.scroll_speed);
    println!("  Max Frames: {:?}", config.engine.max_frames);
    println!();

    println!("Save Settings:");
    println!("  Directory: {:?}", config.save.directory);
    println!("  Slot: {}", config.save.slot);
    println!();

    println!("Logging Settings:");
    println!("  Filter: {:?}", config.logging.filter);
    println!();

    // Try to serialize to TOML for verification
    match toml::to_string_pretty(&config) {
        Ok(toml_str) => {
            println!("=== Serialized Configuration ===");
            println!("{}", toml_str);
        }
        Err(e) => {
            eprintln!("Failed to serialize config: {}", e);
        }
    }
}

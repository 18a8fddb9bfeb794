use anyhow::Result;
use calcsv_core::config::Settings;
use owo_colors::OwoColorize;

pub fn run(init: bool) -> Result<()> {
    let config_path = Settings::config_path()?;

    if init {
        if config_path.exists() {
            println!(
                "{}",
                format!("Config already exists at {}", config_path.display()).dimmed()
            );
        } else {
            Settings::create_default_config(&config_path)?;
            println!("Created {}", config_path.display().green());
        }
        println!();
    }

    let settings = Settings::load()?;
    let options = settings.render.options()?;

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());
    println!();

    println!("{}", "Output".bold());
    println!("  Locale:     {}", options.locale.tag());
    println!("  Timezone:   {}", options.timezone);
    println!();

    println!("{}", "Settings".bold());
    for line in settings.to_toml()?.lines() {
        println!("  {line}");
    }

    Ok(())
}

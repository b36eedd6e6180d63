use std::io;

use clap::Parser;
use crossterm::{
    event::{DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture},
    execute,
};
use ember_config::Config;

mod app;
mod cli;
mod logging;

use app::App;
use cli::Cli;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    cli.apply(&mut config);

    if cli.init_config {
        let path = match &cli.config {
            Some(path) => {
                config.save_to(path)?;
                path.clone()
            }
            None => config.save()?,
        };
        println!("wrote {}", path.display());
        return Ok(());
    }

    if let Some(dir) = ember_config::log_dir() {
        logging::init(&config.log_level, &dir)?;
    }

    let target = config.target_instant()?;
    let app = App::new(&config, target)?;

    let terminal = ratatui::init();
    let result = execute!(io::stdout(), EnableMouseCapture, EnableFocusChange)
        .map_err(Into::into)
        .and_then(|()| app.run(terminal));
    // Best effort; the terminal is being torn down either way.
    let _ = execute!(io::stdout(), DisableFocusChange, DisableMouseCapture);
    ratatui::restore();
    logging::flush();
    result
}

use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    Config,
};

use crate::error::{Error, Result};

/// Install a console logger at `level` and route panics through it.
///
/// The library itself never calls this; binaries opt in.
pub fn init_log(level: LevelFilter) -> Result<()> {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("[{h({l})} - {t}] {m}{n}")))
        .build();
    let appender = Appender::builder().build("stdout", Box::new(stdout));

    let config = Config::builder()
        .appender(appender)
        .build(Root::builder().appender("stdout").build(level))
        .map_err(|e| Error::LoggerError(e.to_string()))?;
    log4rs::init_config(config).map_err(|e| Error::LoggerError(e.to_string()))?;
    update_panic_hook();

    Ok(())
}

fn update_panic_hook() {
    let hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |info| {
        log::error!("PANIC => {}", info);
        hook(info);
    }));
}

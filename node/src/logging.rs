use node_api::{Error, LoggingConfig, Result};

/// Install the process-wide logger
///
/// Only the first call in a process succeeds; later calls report an error
/// to JS instead of replacing the logger.
pub fn init(config: &LoggingConfig) -> Result<()> {
  let level = config.level_filter()?;

  let mut dispatch = fern::Dispatch::new()
    .format(|out, message, record| {
      out.finish(format_args!(
        "[{} {} {}] {}",
        chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"),
        record.level(),
        record.target(),
        message
      ))
    })
    .level(level);

  if config.console_output {
    dispatch = dispatch.chain(std::io::stderr());
  }

  dispatch
    .apply()
    .map_err(|e| Error::Config(format!("logger already initialised: {}", e)))
}

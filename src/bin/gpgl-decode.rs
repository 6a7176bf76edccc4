use anyhow::Result;
use gpgl_decoder::config::Config;
use gpgl_decoder::host;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_args_and_env()?;

    let env = env_logger::Env::default().default_filter_or(config.log_level.as_str());
    env_logger::Builder::from_env(env).init();

    if let Some(path) = &config.config_file {
        log::debug!("Using config file {}", path.display());
    }

    host::run(config).await
}

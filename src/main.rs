use haunted_house::{AppConfig, HauntedHouseApp};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()?;
    log::info!("Starting with {:?}", config);

    HauntedHouseApp::new(config)?.run()
}

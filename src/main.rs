use dogstatsd_demo::tasks;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match tasks::start_with(|key| std::env::var(key).ok()) {
        Ok(converted) => {
            log::debug!("converted values: {converted:?}");
            log::info!("Done!");
        }
        Err(e) => log::error!("{e}"),
    }
}

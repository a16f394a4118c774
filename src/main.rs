use std::time;

use env_logger::init_from_env;
use log::info;
use mdkit::Result;

fn main() -> Result<()> {
    let now = time::Instant::now();

    init_from_env(
        env_logger::Env::new().filter_or("MDKIT_LOG", "info"));

    mdkit::cli::run()?;

    info!("Time used: {:?}", now.elapsed());
    Ok(())
}

/*
 *  main.rs
 *
 *  Tixel - time, in pixels
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */
use anyhow::Context;
use clap::Parser;
use log::{info, warn, LevelFilter};

use tixel::clock_font::FontBook;
use tixel::config::{Cli, Config};
use tixel::control::{self, ControlEvent};
use tixel::display::factory;
use tixel::fontstore;
use tixel::scheduler::Scheduler;
use tixel::sensor::{FixedSensor, LightSensor, SysfsSensor};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli).context("loading configuration")?;
    init_logging(&config.log_level);

    if cli.dump_config {
        print!("{}", config.to_yaml());
        return Ok(());
    }

    info!(
        "tixel {} (built {})",
        env!("CARGO_PKG_VERSION"),
        BUILD_DATE
    );

    // everything runs on one thread; the clock core depends on it
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building runtime")?;
    runtime.block_on(run(config))
}

fn init_logging(level: &str) {
    let filter = level.parse().unwrap_or(LevelFilter::Info);
    // RUST_LOG still wins over the configured level
    env_logger::Builder::new()
        .filter_level(filter)
        .parse_default_env()
        .init();
}

async fn run(config: Config) -> anyhow::Result<()> {
    let driver = factory::build_driver(&config).context("building display driver")?;

    let sensor: Box<dyn LightSensor> = match &config.sensor_path {
        Some(path) => Box::new(SysfsSensor::new(path, config.sensor_max_raw)),
        None => {
            warn!("no light sensor configured; using a fixed mid-range reading");
            Box::new(FixedSensor::new(
                config.sensor_max_raw / 2,
                config.sensor_max_raw,
            ))
        }
    };

    let mut fonts = FontBook::new();
    if let Some(path) = &config.font_file {
        if path.exists() {
            match fontstore::load(path) {
                Ok(font) => fonts.set_custom(font),
                Err(err) => warn!("ignoring custom font: {err}"),
            }
        }
    }

    let (control_tx, control_rx) = control::channel();
    let scheduler = Scheduler::new(driver, sensor, control_rx, &config, fonts);

    // the control sender is what an HTTP/configuration layer would hold;
    // here it only carries the shutdown signal
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("termination signal received");
        let _ = control_tx.send(ControlEvent::Shutdown).await;
    });

    scheduler.run().await.context("clock loop failed")?;
    Ok(())
}

async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(_) => {
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

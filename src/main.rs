mod board;
mod config;
mod departure;
mod display;
mod error;
mod geo;
mod render;
mod schedule;
mod serde_helpers;
mod station_tree;
mod timer;
mod train_position;
mod transport;

#[cfg(test)]
mod test_utils;

use std::env;

use tokio::select;
use tokio::time::sleep;

use crate::board::Board;
use crate::config::Config;
use crate::error::{BoardError, BoardResult};
use crate::transport::client::TransportClient;

async fn run(config: Config) -> BoardResult<()> {
    let client = TransportClient::new(&config.transport)?;
    let mut board = Board::new(config, client)?;

    loop {
        let wait = board.update().await?;
        sleep(wait).await;
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::io::Result<()> {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::try_init().ok();

    log::debug!("Debug logging enabled");

    dotenvy::from_filename(".env").ok();

    let config = Config::load().map_err(BoardError::Config)?;

    select! {
        res = run(config) => {
            if let Err(e) = &res {
                log::error!("Board stopped: {}", e);
            }
            res?;
            Ok(())
        },
        _ = tokio::signal::ctrl_c() => {
            log::debug!("Keyboard interrupt");
            Ok(())
        }
    }
}

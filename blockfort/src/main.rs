use blockfort::{
    config::load_config,
    network::{BlockChangeSender, MapFrame},
    util::logging::{self, LogSettings},
    world::MapError,
    MapSession,
};
use blockfort_data::{Block, BlockPosition};
use linefeed::{DefaultTerminal, Interface, ReadResult};
use log::*;
use std::{error::Error, path::Path, sync::Arc};
use tokio::{runtime::Runtime, sync::mpsc};

fn main() -> Result<(), Box<dyn Error>> {
    let console_interface = Arc::new(Interface::new("blockfort")?);
    console_interface.set_prompt("> ")?;

    let log_settings = LogSettings::default();
    logging::init_logger(&log_settings, &["blockfort"], console_interface.clone())?;

    let config = match load_config(Path::new("./config.json")) {
        Ok(cfg) => cfg,
        Err(error) => {
            error!("Failed to load config: {}", error);
            return Ok(());
        }
    };

    let runtime = Runtime::new()?;

    let session = match MapSession::open(config) {
        Ok(session) => session,
        Err(error) => {
            error!("Failed to open map: {}", error);
            logging::cleanup(&log_settings);
            return Ok(());
        }
    };

    // Stand-in for connected peers: replicate every change into the log
    let (sender, mut changes) = BlockChangeSender::channel();
    session.subscribe(sender);
    runtime.spawn(async move {
        while let Some(change) = changes.recv().await {
            debug!("Replicating {} at {}", change.block.color, change.position);
        }
    });

    run(&session, &runtime, &console_interface);
    logging::cleanup(&log_settings);

    // Move off of the command prompt
    println!();

    Ok(())
}

fn run(session: &MapSession, runtime: &Runtime, console: &Interface<DefaultTerminal>) {
    info!("Ready, type \"help\" for a list of commands");

    loop {
        let line = match console.read_line() {
            Ok(ReadResult::Input(line)) => line,
            Ok(ReadResult::Eof) => break,
            Ok(ReadResult::Signal(_)) => continue,
            Err(e) => {
                error!("Failed to read console input: {}", e);
                break;
            }
        };

        let command = line.trim();
        if command.is_empty() {
            continue;
        }
        console.add_history_unique(command.to_owned());

        let args: Vec<&str> = command.split_whitespace().collect();
        match args[0] {
            "stop" => {
                if session.config().save_on_stop {
                    if let Err(e) = session.save(None) {
                        error!("Failed to save map: {}", e);
                    }
                }
                break;
            }
            "help" => info!("Commands: info, block <x> <y> <z>, set <x> <y> <z> <kind>, save [name], encode, stop"),
            "info" => info(session),
            "block" => match parse_position(&args[1 ..]) {
                Some(pos) => match session.block_at(pos) {
                    Ok(block) => info!("Block at {}: kind {}, color {}", pos, block.kind, block.color),
                    Err(e) => error!("{}", e),
                },
                None => error!("Usage: block <x> <y> <z>"),
            },
            "set" => match (parse_position(&args[1 ..]), args.get(4).and_then(|kind| kind.parse().ok())) {
                (Some(pos), Some(kind)) => match session.set_block(pos, Block::from_kind(kind)) {
                    Ok(()) => info!("Set block at {} to kind {}", pos, kind),
                    Err(e) => error!("{}", e),
                },
                _ => error!("Usage: set <x> <y> <z> <kind>"),
            },
            "save" =>
                if let Err(e) = session.save(args.get(1).copied()) {
                    error!("Failed to save map: {}", e);
                },
            "encode" =>
                if let Err(e) = encode(session, runtime) {
                    error!("Failed to encode map: {}", e);
                },
            other => error!("Unknown command \"{}\"", other),
        }
    }
}

fn info(session: &MapSession) {
    session.read(|provider| {
        let map = provider.map_data();
        info!(
            "Map {}: {}x{}x{}, {} chunks, {} spawn points",
            session.config().map_name,
            map.width(),
            map.height(),
            map.depth(),
            map.chunk_count(),
            map.spawn_points().len()
        );
    });
}

fn parse_position(args: &[&str]) -> Option<BlockPosition> {
    match args {
        [x, y, z, ..] => Some(BlockPosition::new(x.parse().ok()?, y.parse().ok()?, z.parse().ok()?)),
        _ => None,
    }
}

/// Encodes a snapshot and pushes it through the framed transfer into a local sink.
fn encode(session: &MapSession, runtime: &Runtime) -> Result<(), MapError> {
    let transfer = session.transfer()?;
    let frames = transfer.frame_count();
    let bytes = transfer.len();
    info!(
        "Encoded map: {} bytes in {} frames of up to {} bytes",
        bytes,
        frames,
        session.config().transfer_frame_size
    );

    let delay = session.config().transfer_frame_delay();
    let received = runtime.block_on(async move {
        let (sender, mut receiver) = mpsc::unbounded_channel::<MapFrame>();
        let sink = tokio::spawn(async move {
            let mut received = 0;
            while let Some(frame) = receiver.recv().await {
                received += frame.data.len();
            }
            received
        });

        transfer.drip_feed(&sender, delay).await;
        drop(sender);
        sink.await.unwrap_or(0)
    });

    info!("Transfer delivered {} of {} bytes", received, bytes);
    Ok(())
}

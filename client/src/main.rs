use clap::Parser;
use client::game::Session;
use client::input;
use client::network::{NetworkEvent, NetworkHandle};
use client::rendering::Renderer;
use log::{error, info, warn};
use macroquad::prelude::{get_frame_time, next_frame, Conf};
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server WebSocket URL
    #[arg(short = 's', long, default_value = "ws://127.0.0.1:3001")]
    server: String,

    /// Window width
    #[arg(short = 'w', long, default_value = "800")]
    width: i32,

    /// Window height (no short flag to avoid conflict with --help)
    #[arg(long, default_value = "400")]
    height: i32,
}

static ARGS: OnceLock<Args> = OnceLock::new();

/// Command line, parsed once and shared by `window_conf` and `main`.
fn args() -> &'static Args {
    ARGS.get_or_init(Args::parse)
}

fn window_conf() -> Conf {
    conf_for(args())
}

fn conf_for(args: &Args) -> Conf {
    Conf {
        window_title: "Multiplayer Runner".to_owned(),
        window_width: args.width,
        window_height: args.height,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = args();

    info!("Starting client...");
    info!("Controls: Space to jump, Shift to slide");

    let mut network = match NetworkHandle::spawn(&args.server) {
        Ok(network) => network,
        Err(e) => {
            error!("Failed to start network thread: {}", e);
            return;
        }
    };
    let mut session = Session::new();
    let mut renderer = Renderer::new(args.width as f32, args.height as f32);

    loop {
        for event in network.poll() {
            match event {
                NetworkEvent::Server(event) => session.handle_event(event),
                NetworkEvent::Closed(reason) => {
                    match reason {
                        Some(reason) => warn!("Disconnected: {}", reason),
                        None => warn!("Disconnected"),
                    }
                    session.end();
                }
            }
        }

        let mut outgoing = Vec::new();
        for transition in input::poll_transitions() {
            outgoing.extend(session.handle_key(transition));
        }
        outgoing.extend(session.update(Duration::from_secs_f32(get_frame_time())));

        for message in outgoing {
            network.send(message);
        }

        renderer.render(&session.players(), session.local_id());

        next_frame().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["client"]).unwrap();
        assert_eq!(args.server, "ws://127.0.0.1:3001");

        let conf = conf_for(&args);
        assert_eq!(conf.window_width, 800);
        assert_eq!(conf.window_height, 400);
    }

    #[test]
    fn test_window_size_follows_arguments() {
        let args = Args::try_parse_from(["client", "-w", "1024", "--height", "600"]).unwrap();

        let conf = conf_for(&args);
        assert_eq!(conf.window_width, 1024);
        assert_eq!(conf.window_height, 600);
    }
}

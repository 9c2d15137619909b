use std::io;
use std::process::ExitCode;

use chess_arbiter::config::AppConfig;
use chess_arbiter::engine::Game;
use chess_arbiter::session::Session;

fn main() -> ExitCode {
    let config = AppConfig::from_env();

    // Initialize tracing (structured logging). Stdout carries the board, so
    // logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .with_writer(io::stderr)
        .init();

    // `--fen <FEN>` starts from a custom position.
    let args: Vec<String> = std::env::args().collect();
    let game = match args.iter().position(|a| a == "--fen") {
        Some(i) => {
            let Some(fen) = args.get(i + 1) else {
                eprintln!("--fen needs a FEN string");
                return ExitCode::FAILURE;
            };
            match Game::from_fen(fen) {
                Ok(game) => game,
                Err(e) => {
                    eprintln!("{e}");
                    return ExitCode::FAILURE;
                }
            }
        }
        None => Game::new(),
    };

    tracing::info!("chess-arbiter v{} starting", env!("CARGO_PKG_VERSION"));

    let mut session = Session::new(game, config, io::stdin().lock(), io::stdout().lock());
    match session.run() {
        Ok(end) => {
            tracing::info!(?end, "session finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

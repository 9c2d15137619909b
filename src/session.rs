//! Line-oriented play over any reader/writer pair.
//!
//! Each turn prints the board, announces check or checkmate, prompts the side
//! to move and reads one command:
//!
//! - `e2 e4` (optionally followed by a promotion letter `r`, `n`, `b`, `q`)
//! - `e2 e4 draw?` plays the move and offers a draw
//! - `draw` accepts the opponent's standing offer
//! - `resign` concedes
//!
//! Resignation and draws are settled here; the engine only knows checkmate.

use std::io::{BufRead, Write};

use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::engine::{Color, Game, Position, Square, Verdict};

/// How a finished session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    Checkmate { winner: Color },
    Resignation { winner: Color },
    Draw,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// A parsed line of player input.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Command {
    Move {
        from: String,
        to: String,
        promotion: Option<String>,
        offer_draw: bool,
    },
    Draw,
    Resign,
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim().to_ascii_lowercase();
    match line.as_str() {
        "resign" => return Some(Command::Resign),
        "draw" => return Some(Command::Draw),
        _ => {}
    }
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.as_slice() {
        [from, to] => Some(Command::Move {
            from: from.to_string(),
            to: to.to_string(),
            promotion: None,
            offer_draw: false,
        }),
        [from, to, "draw?"] => Some(Command::Move {
            from: from.to_string(),
            to: to.to_string(),
            promotion: None,
            offer_draw: true,
        }),
        [from, to, promo] => Some(Command::Move {
            from: from.to_string(),
            to: to.to_string(),
            promotion: Some(promo.to_string()),
            offer_draw: false,
        }),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

enum Turn {
    Played,
    Finished(SessionEnd),
    Exhausted,
}

pub struct Session<R, W> {
    game: Game,
    config: AppConfig,
    input: R,
    output: W,
    /// Side whose draw offer is standing, if any.
    draw_offer: Option<Color>,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(game: Game, config: AppConfig, input: R, output: W) -> Self {
        Session {
            game,
            config,
            input,
            output,
            draw_offer: None,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Play until checkmate, resignation, an accepted draw or end of input.
    /// End of input yields `Ok(None)`.
    pub fn run(&mut self) -> Result<Option<SessionEnd>, SessionError> {
        loop {
            write!(
                self.output,
                "{}",
                render_board(self.game.position(), self.config.checkered_tiles)
            )?;
            writeln!(self.output)?;

            if let Some(winner) = self.game.winner() {
                writeln!(self.output, "Checkmate")?;
                writeln!(self.output, "{} wins", winner.name())?;
                info!(%winner, "checkmate");
                return Ok(Some(SessionEnd::Checkmate { winner }));
            }
            if self.game.is_in_check(Color::White) || self.game.is_in_check(Color::Black) {
                writeln!(self.output, "Check")?;
            }

            match self.turn()? {
                Turn::Played => {}
                Turn::Finished(end) => return Ok(Some(end)),
                Turn::Exhausted => return Ok(None),
            }
        }
    }

    /// Prompt the side to move until it plays a legal move or the session
    /// stops.
    fn turn(&mut self) -> Result<Turn, SessionError> {
        let side = self.game.side_to_move();
        loop {
            write!(self.output, "{}'s move: ", side.name())?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                debug!("end of input");
                return Ok(Turn::Exhausted);
            }

            match parse_command(&line) {
                Some(Command::Resign) => {
                    let winner = !side;
                    writeln!(self.output, "{} wins", winner.name())?;
                    info!(%side, "resigned");
                    return Ok(Turn::Finished(SessionEnd::Resignation { winner }));
                }
                Some(Command::Draw) if self.draw_offer == Some(!side) => {
                    writeln!(self.output, "draw")?;
                    info!("draw agreed");
                    return Ok(Turn::Finished(SessionEnd::Draw));
                }
                Some(Command::Draw) => {
                    debug!(%side, "draw claimed without an offer");
                    self.illegal(Some("no draw has been offered"))?;
                }
                Some(Command::Move {
                    from,
                    to,
                    promotion,
                    offer_draw,
                }) => match self.game.try_move(&from, &to, promotion.as_deref()) {
                    Verdict::Rejected(reason) => {
                        self.illegal(Some(&reason.to_string()))?;
                    }
                    _ => {
                        self.draw_offer = offer_draw.then_some(side);
                        if offer_draw {
                            debug!(%side, "draw offered");
                        }
                        writeln!(self.output)?;
                        return Ok(Turn::Played);
                    }
                },
                None => {
                    warn!(input = line.trim(), "unrecognised command");
                    self.illegal(None)?;
                }
            }
        }
    }

    fn illegal(&mut self, reason: Option<&str>) -> Result<(), SessionError> {
        writeln!(self.output, "Illegal move, try again")?;
        if self.config.show_reasons
            && let Some(reason) = reason
        {
            writeln!(self.output, "({reason})")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Board rendering
// ---------------------------------------------------------------------------

/// Text grid, rank 8 first, rank digit on the right and a file footer.
///
/// Pieces are shown by their two-letter code. Empty squares are blank, or
/// `##` on dark squares when `checkered` is set.
pub fn render_board(pos: &Position, checkered: bool) -> String {
    let mut s = String::with_capacity(256);
    for rank in (0..8u8).rev() {
        for file in 0..8u8 {
            let sq = Square::from_file_rank(file, rank);
            match pos.piece_at(sq).code() {
                Some(code) => s.push_str(&code),
                None if checkered && is_dark(sq) => s.push_str("##"),
                None => s.push_str("  "),
            }
            s.push(' ');
        }
        s.push((b'1' + rank) as char);
        s.push('\n');
    }
    s.push_str(" a  b  c  d  e  f  g  h\n");
    s
}

fn is_dark(sq: Square) -> bool {
    (sq.file() + sq.rank()) % 2 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_moves() {
        assert_eq!(
            parse_command("E2 e4\n"),
            Some(Command::Move {
                from: "e2".into(),
                to: "e4".into(),
                promotion: None,
                offer_draw: false
            })
        );
        assert_eq!(
            parse_command("a7 a8 N"),
            Some(Command::Move {
                from: "a7".into(),
                to: "a8".into(),
                promotion: Some("n".into()),
                offer_draw: false
            })
        );
        assert!(matches!(
            parse_command("e2 e4 draw?"),
            Some(Command::Move {
                offer_draw: true,
                ..
            })
        ));
    }

    #[test]
    fn parses_keywords() {
        assert_eq!(parse_command("Resign"), Some(Command::Resign));
        assert_eq!(parse_command(" draw "), Some(Command::Draw));
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("e2"), None);
        assert_eq!(parse_command("a b c d"), None);
    }

    #[test]
    fn renders_starting_board() {
        let board = render_board(&Position::starting(), true);
        let lines: Vec<&str> = board.lines().collect();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "bR bN bB bQ bK bB bN bR 8");
        assert_eq!(lines[1], "bp bp bp bp bp bp bp bp 7");
        assert_eq!(lines[2], "   ##    ##    ##    ## 6");
        assert_eq!(lines[3], "##    ##    ##    ##    5");
        assert_eq!(lines[7], "wR wN wB wQ wK wB wN wR 1");
        assert_eq!(lines[8], " a  b  c  d  e  f  g  h");
    }

    #[test]
    fn renders_plain_tiles() {
        let board = render_board(&Position::starting(), false);
        assert!(!board.contains("##"));
    }
}

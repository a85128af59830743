//! Line-based terminal game against the computer.

use promo_tictactoe::{
    Board, GameController, GameStatus, MoveError, RandomSource, RewardIssuer, Session,
    SessionEvent, Square,
};
use std::io::{self, BufRead, Write};
use tracing::{debug, instrument};

/// Renders the board with open squares numbered 1 to 9.
pub fn render_board(board: &Board) -> String {
    let cells: Vec<String> = board
        .squares()
        .iter()
        .enumerate()
        .map(|(index, square)| match square {
            Square::Empty => (index + 1).to_string(),
            Square::Occupied(mark) => mark.symbol().to_string(),
        })
        .collect();

    cells
        .chunks(3)
        .map(|row| format!(" {} | {} | {}", row[0], row[1], row[2]))
        .collect::<Vec<_>>()
        .join("\n---+---+---\n")
}

fn describe_rejection(error: MoveError) -> String {
    match error {
        MoveError::OutOfBounds(_) => "Pick a square from 1 to 9.".to_string(),
        MoveError::SquareOccupied(index) => format!("Square {} is taken.", index + 1),
        other => format!("Move refused: {}", other),
    }
}

/// Plays one game over the given streams.
///
/// Returns the final session; it is still active when input ends or the
/// player types `q`.
#[instrument(skip_all)]
pub fn play<I, S, R, W>(
    controller: &GameController<I>,
    rng: &mut S,
    input: R,
    output: &mut W,
) -> io::Result<Session>
where
    I: RewardIssuer,
    S: RandomSource + ?Sized,
    R: BufRead,
    W: Write,
{
    let mut session = controller.reset();
    let mut lines = input.lines();

    writeln!(output, "You are X. Three in a row wins a promo code.")?;
    while session.status() == GameStatus::Active {
        writeln!(output, "\n{}\n", render_board(session.board()))?;
        write!(output, "Your move (1-9, q to quit): ")?;
        output.flush()?;

        let Some(line) = lines.next().transpose()? else {
            writeln!(output)?;
            return Ok(session);
        };
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Ok(session);
        }

        let index = match line.parse::<usize>() {
            Ok(n) if n >= 1 => n - 1,
            _ => {
                writeln!(output, "Pick a square from 1 to 9.")?;
                continue;
            }
        };

        let step = controller.apply_human_move(&session, index);
        if let SessionEvent::Rejected { error } = step.event {
            writeln!(output, "{}", describe_rejection(error))?;
            continue;
        }
        session = step.session;

        if step.event == SessionEvent::AwaitingComputer {
            let reply = controller.apply_computer_turn(&session, rng);
            if let Some(choice) = reply.choice {
                debug!(index = choice.index, reason = %choice.reason, "Computer moved");
                writeln!(output, "Computer plays {}.", choice.index + 1)?;
            }
            session = reply.session;
        }
    }

    writeln!(output, "\n{}\n", render_board(session.board()))?;
    match session.status() {
        GameStatus::WonByHuman => match session.reward() {
            Some(code) => writeln!(output, "You win! Promo code: {}", code)?,
            None => writeln!(output, "You win!")?,
        },
        GameStatus::WonByComputer => writeln!(output, "Computer wins.")?,
        _ => writeln!(output, "Draw.")?,
    }
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use promo_tictactoe::{NoReward, OpponentPolicy, RewardToken, ScriptedSource};
    use std::io::Cursor;

    #[test]
    fn test_render_numbers_open_squares() {
        let board: Board = "X.O/.../...".parse().unwrap();
        assert_eq!(
            render_board(&board),
            " X | 2 | O\n---+---+---\n 4 | 5 | 6\n---+---+---\n 7 | 8 | 9"
        );
    }

    #[test]
    fn test_human_win_prints_code() {
        let ctl = GameController::new(OpponentPolicy::new(1.0).unwrap(), || {
            Some(RewardToken::from("A7K3D".to_string()))
        });
        // Computer takes the first open square each turn: 2, then 3.
        let mut rng = ScriptedSource::new([0.0; 2], [0, 0]);
        let input = Cursor::new("1\n4\n7\n");
        let mut output = Vec::new();

        let session = play(&ctl, &mut rng, input, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();

        assert_eq!(session.status(), GameStatus::WonByHuman);
        assert!(text.contains("Computer plays 2."));
        assert!(text.contains("Computer plays 3."));
        assert!(text.contains("You win! Promo code: A7K3D"));
    }

    #[test]
    fn test_bad_input_is_reported_and_retried() {
        let ctl = GameController::new(OpponentPolicy::heuristic_only(), NoReward);
        let mut rng = ScriptedSource::never_explore();
        let input = Cursor::new("zero\n10\n5\n5\nq\n");
        let mut output = Vec::new();

        let session = play(&ctl, &mut rng, input, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();

        assert_eq!(session.status(), GameStatus::Active);
        assert_eq!(text.matches("Pick a square from 1 to 9.").count(), 2);
        assert!(text.contains("Square 5 is taken."));
    }

    #[test]
    fn test_end_of_input_abandons_game() {
        let ctl: GameController<NoReward> = GameController::default();
        let mut rng = ScriptedSource::never_explore();
        let session = play(&ctl, &mut rng, Cursor::new(""), &mut Vec::new()).unwrap();
        assert_eq!(session, Session::new());
    }
}

use parlor_core::games::{TicTacToe, TicTacToeMove};
use parlor_core::Discipline;
use parlor_p2p::{Lobby, LobbyConfig, LobbyEvent, MatchboxNetwork, MoveKind, PlayerProfile, TurnSession};
use std::time::Duration;

/// Joins the lobby, offers a tic-tac-toe room and plays whoever takes it.
/// Run the demo_guest example in a second terminal to fill the seat.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = LobbyConfig::default().with_signalling_url(
        std::env::var("PARLOR_SIGNALLING").unwrap_or_else(|_| "ws://localhost:3536".to_string()),
    );
    let network = MatchboxNetwork::new(config.signalling_url.clone(), config.lobby_id.clone())
        .with_claim_window(config.claim_window);

    let mut lobby = Lobby::establish(
        &network,
        config.clone(),
        PlayerProfile::new("Demo Host", "crown"),
    )
    .await?;
    println!("✅ In the lobby as {} ({:?})", lobby.local_id(), lobby.role());

    lobby.start_hosting(Discipline::TurnBased)?;
    println!("📋 Offering a tic-tac-toe room, waiting for an opponent...");

    let mut board: Option<TurnSession<TicTacToe>> = None;
    let mut interval = tokio::time::interval(config.poll_interval);

    loop {
        interval.tick().await;

        for event in lobby.poll(instant::Instant::now()) {
            match event {
                LobbyEvent::RosterChanged(roster) => {
                    println!("🏠 Lobby has {} players", roster.len());
                }
                LobbyEvent::GameStarted {
                    opponent,
                    starts_first,
                    ..
                } => {
                    println!("🎮 Matched against {opponent}");
                    let mut session = TurnSession::begin(TicTacToe::new(), starts_first);
                    if starts_first {
                        let payload = session.submit(TicTacToeMove { cell: 4 })?;
                        lobby.send_game(MoveKind::TurnMove, payload)?;
                    }
                    board = Some(session);
                }
                LobbyEvent::MoveReceived { kind, payload } => {
                    if let Some(session) = board.as_mut() {
                        session.handle(kind, payload)?;
                        if let Some(outcome) = session.outcome() {
                            println!("🏁 Game over: {outcome:?}");
                            board = None;
                            lobby.leave_game()?;
                        } else if let Some(payload) = first_free_move(session)? {
                            lobby.send_game(MoveKind::TurnMove, payload)?;
                        }
                    }
                }
                LobbyEvent::OpponentLeft { who } => {
                    println!("👋 {who} left; offering the room again");
                    board = None;
                    lobby.start_hosting(Discipline::TurnBased)?;
                }
                LobbyEvent::HostUnreachable => {
                    eprintln!("❌ Lost the lobby host, shutting down");
                    return Ok(());
                }
                other => println!("📡 {other:?}"),
            }
        }
    }
}

fn first_free_move(
    session: &mut TurnSession<TicTacToe>,
) -> Result<Option<serde_json::Value>, Box<dyn std::error::Error>> {
    if !session.is_my_turn() {
        return Ok(None);
    }
    let free = session
        .machine()
        .game()
        .and_then(|game| (0..9).find(|&cell| game.cell(cell).is_none()));
    match free {
        Some(cell) => Ok(Some(session.submit(TicTacToeMove { cell })?)),
        None => Ok(None),
    }
}

use parlor_core::games::{TicTacToe, TicTacToeMove};
use parlor_p2p::{Lobby, LobbyConfig, LobbyEvent, MatchboxNetwork, MoveKind, PlayerProfile, TurnSession};

/// Joins the lobby and takes the first offered room it sees.
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
        PlayerProfile::new("Demo Guest", "dice"),
    )
    .await?;
    println!("✅ In the lobby as {} ({:?})", lobby.local_id(), lobby.role());

    let mut board: Option<TurnSession<TicTacToe>> = None;
    let mut interval = tokio::time::interval(config.poll_interval);

    loop {
        interval.tick().await;

        for event in lobby.poll(instant::Instant::now()) {
            match event {
                LobbyEvent::RosterChanged(roster) => {
                    println!("🏠 Lobby has {} players", roster.len());

                    if board.is_none() && lobby.session().is_none() {
                        let local = lobby.local_id().clone();
                        if let Some(open) =
                            roster.iter().find(|r| r.is_hosting() && *r.id() != local)
                        {
                            println!("📤 Joining {}'s room...", open.name());
                            lobby.request_join(open.id().clone())?;
                        }
                    }
                }
                LobbyEvent::GameStarted {
                    opponent,
                    starts_first,
                    ..
                } => {
                    println!("🎮 Matched against {opponent}");
                    board = Some(TurnSession::begin(TicTacToe::new(), starts_first));
                }
                LobbyEvent::MoveReceived { kind, payload } => {
                    if let Some(session) = board.as_mut() {
                        session.handle(kind, payload)?;
                        if let Some(outcome) = session.outcome() {
                            println!("🏁 Game over: {outcome:?}");
                            board = None;
                        } else if session.is_my_turn() {
                            let free = session
                                .machine()
                                .game()
                                .and_then(|game| (0..9).find(|&cell| game.cell(cell).is_none()));
                            if let Some(cell) = free {
                                let payload = session.submit(TicTacToeMove { cell })?;
                                lobby.send_game(MoveKind::TurnMove, payload)?;
                            }
                        }
                    }
                }
                LobbyEvent::OpponentLeft { who } => {
                    println!("👋 {who} left the game");
                    board = None;
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

use crate::domain::Seat;
use crate::rng::DeterministicRng;
use crate::turn::{GameResult, Progress, TurnGame};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A playing card: rank `1..=13`, suit `0..=3`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub rank: u8,
    pub suit: u8,
}

impl Card {
    /// A card may be played on another if ranks or suits match
    pub fn matches(&self, other: &Card) -> bool {
        self.rank == other.rank || self.suit == other.suit
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SUITS: [&str; 4] = ["♣", "♦", "♥", "♠"];
        write!(f, "{}{}", self.rank, SUITS[self.suit as usize % 4])
    }
}

/// One move in the pile duel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PileMove {
    /// Play the card at `index` in your hand onto the discard pile
    Play { index: usize },
    /// Draw one card from the shared pile and pass the turn
    Draw,
}

/// A small matching card duel over a shared draw pile.
///
/// Play a card matching the discard top by rank or suit, or draw. Emptying
/// your hand grants the opponent exactly one final turn, then the match is
/// scored. Shuffle state lives in the deterministic RNG, so the whole game
/// serializes for the rematch/initial handoff and both copies stay in
/// lockstep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PileGame {
    hands: [Vec<Card>; 2],
    draw: Vec<Card>,
    discard: Vec<Card>,
    rng: DeterministicRng,
    /// First seat to empty its hand
    went_out: Option<Seat>,
    /// Whether the opponent's single final turn has been taken
    final_move_played: bool,
}

/// Cards dealt to each player at the start
const HAND_SIZE: usize = 7;

impl PileGame {
    /// Deal a fresh game from a seed. Both peers never call this for the
    /// same match; the dealer exports the result and the other side adopts
    /// it verbatim.
    pub fn new(seed: u64) -> Self {
        let mut rng = DeterministicRng::new(seed);

        let mut deck: Vec<Card> = (0..4u8)
            .flat_map(|suit| (1..=13u8).map(move |rank| Card { rank, suit }))
            .collect();
        rng.shuffle(&mut deck);

        let hand_b: Vec<Card> = deck.split_off(deck.len() - HAND_SIZE);
        let hand_a: Vec<Card> = deck.split_off(deck.len() - HAND_SIZE);
        let top = deck.pop().expect("52 cards always cover two hands and a flip");

        Self {
            hands: [hand_a, hand_b],
            draw: deck,
            discard: vec![top],
            rng,
            went_out: None,
            final_move_played: false,
        }
    }

    // ===== Queries =====

    pub fn hand(&self, seat: Seat) -> &[Card] {
        &self.hands[seat.index()]
    }

    pub fn draw_pile_len(&self) -> usize {
        self.draw.len()
    }

    pub fn discard_top(&self) -> &Card {
        self.discard
            .last()
            .expect("discard always holds the initial flip")
    }

    // ===== Internals =====

    /// Draw one card, reshuffling the discard pile (minus its top card)
    /// back into the draw pile when it runs dry. When both piles are
    /// exhausted the draw becomes a pass; that is the defined recovery,
    /// not an error.
    fn draw_card(&mut self, seat: Seat) {
        if self.draw.is_empty() && self.discard.len() > 1 {
            let top = self.discard.pop().expect("checked non-empty");
            self.draw = std::mem::take(&mut self.discard);
            self.discard.push(top);
            self.rng.shuffle(&mut self.draw);
            tracing::debug!(recycled = self.draw.len(), "reshuffled discard into draw pile");
        }

        if let Some(card) = self.draw.pop() {
            self.hands[seat.index()].push(card);
        }
    }
}

impl TurnGame for PileGame {
    type Move = PileMove;

    fn validate(&self, mv: &PileMove, seat: Seat) -> Result<(), String> {
        match mv {
            PileMove::Play { index } => {
                let hand = &self.hands[seat.index()];
                let card = hand
                    .get(*index)
                    .ok_or_else(|| format!("no card at index {index}"))?;

                if !card.matches(self.discard_top()) {
                    return Err(format!(
                        "{} does not match the discard top {}",
                        card,
                        self.discard_top()
                    ));
                }
                Ok(())
            }
            PileMove::Draw => Ok(()),
        }
    }

    fn apply(&mut self, mv: &PileMove, seat: Seat) {
        match mv {
            PileMove::Play { index } => {
                let card = self.hands[seat.index()].remove(*index);
                self.discard.push(card);

                if self.hands[seat.index()].is_empty() && self.went_out.is_none() {
                    self.went_out = Some(seat);
                    return;
                }
            }
            PileMove::Draw => {
                self.draw_card(seat);
            }
        }

        // Any move by the opponent of whoever went out is the final turn
        if let Some(out) = self.went_out {
            if out != seat {
                self.final_move_played = true;
            }
        }
    }

    fn progress(&self) -> Progress {
        match self.went_out {
            None => Progress::Continue,
            Some(out) => {
                if !self.final_move_played {
                    Progress::FinalTurn
                } else if self.hands[out.other().index()].is_empty() {
                    // Opponent also went out on the final turn
                    Progress::Over(GameResult::Draw)
                } else {
                    Progress::Over(GameResult::Winner(out))
                }
            }
        }
    }
}

use std::collections::HashMap;

use rand::Rng;
use thiserror::Error;

use crate::game::cards::{is_legal_play, shuffle, standard_deck, Card, CardKind, Color};

pub type PlayerId = String;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 10;
const STARTING_HAND: usize = 7;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("a game needs between 2 and 10 players, got {0}")]
    InvalidPlayerCount(usize),
    #[error("the deck ran out before a numbered starting card appeared")]
    NoStartingCard,
    #[error("no such player in this game")]
    UnknownPlayer,
    #[error("that card is not in your hand")]
    CardNotInHand,
    #[error("that card cannot be played now")]
    IllegalPlay,
    #[error("the deck is exhausted and the discard pile has nothing to reshuffle")]
    DeckExhausted,
    #[error("the game is already over")]
    GameFinished,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    pub fn flip(&mut self) {
        *self = match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        };
    }

    /// Signed turn step, `+1` or `-1`.
    pub fn step(&self) -> i8 {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }
}

/// Authoritative state of one game. Hands are keyed by stable player id
/// rather than seat position, so a mid-game departure never shifts anyone
/// else's hand; `seats` fixes the turn order at deal time and is not edited
/// afterwards.
///
/// Total cards across `deck`, `discard_pile` and all hands stay at 108 for
/// the life of the game.
#[derive(Debug, PartialEq)]
pub struct GameState {
    /// Draw pile; the back of the vec is the draw end.
    pub deck: Vec<Card>,
    /// Played cards; the last element is the face-up active card. Never
    /// empty once the game is dealt.
    pub discard_pile: Vec<Card>,
    pub seats: Vec<PlayerId>,
    pub hands: HashMap<PlayerId, Vec<Card>>,
    pub current: usize,
    pub direction: Direction,
    /// The color plays must match. A wild on top of the discard still leaves
    /// a concrete chosen color here.
    pub current_color: Color,
    /// Accumulated draw penalty owed by the player the turn lands on next.
    pub pending_draw: u8,
    /// Most recent draw, kept so the drawer's client can highlight it.
    pub last_drawn: Option<(PlayerId, Card)>,
    /// Human-readable notices queued since the last broadcast.
    pub messages: Vec<String>,
    pub winner: Option<PlayerId>,
}

impl GameState {
    /// Shuffles a fresh deck, deals seven cards to every seat round-robin,
    /// then seeds the discard pile with the first numbered card drawn,
    /// shuffling any skipped action or wild card back into the deck so the
    /// game never opens on one.
    pub fn deal(seats: Vec<PlayerId>, rng: &mut impl Rng) -> Result<GameState, GameError> {
        if seats.len() < MIN_PLAYERS || seats.len() > MAX_PLAYERS {
            return Err(GameError::InvalidPlayerCount(seats.len()));
        }

        let mut deck = standard_deck();
        shuffle(&mut deck, rng);

        let mut hands: HashMap<PlayerId, Vec<Card>> = seats
            .iter()
            .map(|id| (id.clone(), Vec::with_capacity(STARTING_HAND)))
            .collect();
        for _ in 0..STARTING_HAND {
            for seat in &seats {
                if let Some(card) = deck.pop() {
                    hands.get_mut(seat).ok_or(GameError::UnknownPlayer)?.push(card);
                }
            }
        }

        let mut discard_pile = Vec::new();
        let mut current_color = None;
        while let Some(card) = deck.pop() {
            if card.kind.is_number() {
                current_color = card.color.as_color();
                discard_pile.push(card);
                break;
            }
            // Not a valid opener; bury it and reshuffle.
            deck.insert(0, card);
            shuffle(&mut deck, rng);
        }
        let current_color = current_color.ok_or(GameError::NoStartingCard)?;

        let mut state = GameState {
            deck,
            discard_pile,
            seats,
            hands,
            current: 0,
            direction: Direction::Clockwise,
            current_color,
            pending_draw: 0,
            last_drawn: None,
            messages: Vec::new(),
            winner: None,
        };
        state.notice(format!("Game started. Active color is {}.", state.current_color));
        Ok(state)
    }

    pub fn player_count(&self) -> usize {
        self.seats.len()
    }

    pub fn current_player(&self) -> &PlayerId {
        &self.seats[self.current]
    }

    pub fn is_current(&self, player: &str) -> bool {
        self.current_player() == player
    }

    pub fn hand(&self, player: &str) -> Option<&Vec<Card>> {
        self.hands.get(player)
    }

    /// Drains the notices queued since the last broadcast.
    pub fn take_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }

    fn notice(&mut self, text: String) {
        self.messages.push(text);
    }

    /// Plays one card out of `player`'s hand onto the discard pile and
    /// applies its effect. A wild play must carry a chosen color; supplying
    /// none is rejected as an illegal play before anything mutates. All
    /// validation happens up front, so a rejected play leaves the state
    /// untouched.
    pub fn play_card(
        &mut self,
        player: &str,
        card: Card,
        chosen_color: Option<Color>,
        rng: &mut impl Rng,
    ) -> Result<(), GameError> {
        if self.winner.is_some() {
            return Err(GameError::GameFinished);
        }
        let hand = self.hands.get(player).ok_or(GameError::UnknownPlayer)?;
        let in_hand = hand
            .iter()
            .position(|c| *c == card)
            .ok_or(GameError::CardNotInHand)?;

        let next_color = if card.is_wild() {
            chosen_color.ok_or(GameError::IllegalPlay)?
        } else {
            card.color.as_color().ok_or(GameError::IllegalPlay)?
        };
        let top = *self.discard_pile.last().ok_or(GameError::IllegalPlay)?;
        if !is_legal_play(&card, &top, self.current_color) {
            return Err(GameError::IllegalPlay);
        }

        // Validated; commit.
        if let Some(hand) = self.hands.get_mut(player) {
            hand.remove(in_hand);
        }
        self.discard_pile.push(card);
        self.current_color = next_color;
        self.notice(format!("{} played {}.", player, card));
        if card.is_wild() {
            self.notice(format!("Active color is now {}.", next_color));
        }

        self.apply_card_effect(&card, rng);

        if self.hands.get(player).map_or(false, |h| h.is_empty()) {
            self.winner = Some(player.to_string());
            self.notice(format!("{} has no cards left and wins the game!", player));
        }
        Ok(())
    }

    /// Turn bookkeeping for a freshly played card. Numbered and plain wild
    /// cards advance one step; SKIP advances two; REVERSE flips direction
    /// (acting as SKIP in a two-player game); the draw cards queue their
    /// penalty, advance onto the target, and resolve immediately.
    fn apply_card_effect(&mut self, card: &Card, rng: &mut impl Rng) {
        match card.kind {
            CardKind::Skip => {
                self.notice(format!("{} is skipped.", self.peek_next()));
                self.advance_turn();
                self.advance_turn();
            }
            CardKind::Reverse => {
                self.direction.flip();
                if self.player_count() == 2 {
                    self.notice("Direction reversed; turn skipped.".to_string());
                    self.advance_turn();
                    self.advance_turn();
                } else {
                    self.notice("Direction of play reversed.".to_string());
                    self.advance_turn();
                }
            }
            CardKind::DrawTwo => {
                self.pending_draw += 2;
                self.advance_turn();
                self.notice(format!("{} must draw 2.", self.current_player()));
                self.resolve_pending_draw(rng);
            }
            CardKind::WildDrawFour => {
                self.pending_draw += 4;
                self.advance_turn();
                self.notice(format!("{} must draw 4.", self.current_player()));
                self.resolve_pending_draw(rng);
            }
            _ => {
                // Numbered cards and plain WILD pass the turn normally.
                self.advance_turn();
            }
        }
    }

    /// Pays out an accumulated draw penalty to the player the turn has just
    /// landed on, then skips their play opportunity. The draw is settled
    /// immediately rather than deferred to the start of their turn. If the
    /// table genuinely runs out of cards mid-penalty the remainder is
    /// forgiven with a notice; the triggering play has already resolved.
    fn resolve_pending_draw(&mut self, rng: &mut impl Rng) {
        if self.pending_draw == 0 {
            return;
        }
        let target = self.current_player().clone();
        for _ in 0..self.pending_draw {
            if self.draw_into_hand(&target, rng).is_err() {
                self.notice("No cards left to draw; penalty cut short.".to_string());
                break;
            }
        }
        self.pending_draw = 0;
        self.advance_turn();
    }

    /// Draws one card for `player`, reshuffling the discard pile (minus its
    /// top card) into a fresh deck first if the deck is empty. Fails with
    /// `DeckExhausted` when there is no reserve left to reshuffle. Advances
    /// the turn when `end_turn` is set.
    pub fn draw_card(
        &mut self,
        player: &str,
        end_turn: bool,
        rng: &mut impl Rng,
    ) -> Result<(), GameError> {
        if self.winner.is_some() {
            return Err(GameError::GameFinished);
        }
        if !self.hands.contains_key(player) {
            return Err(GameError::UnknownPlayer);
        }
        self.draw_into_hand(player, rng)?;
        self.notice(format!("{} drew a card.", player));
        if end_turn {
            self.advance_turn();
        }
        Ok(())
    }

    fn draw_into_hand(&mut self, player: &str, rng: &mut impl Rng) -> Result<(), GameError> {
        if self.deck.is_empty() {
            if self.discard_pile.len() <= 1 {
                return Err(GameError::DeckExhausted);
            }
            // Keep the face-up card, turn the rest back into the deck.
            let top = self.discard_pile.pop().ok_or(GameError::DeckExhausted)?;
            self.deck = std::mem::take(&mut self.discard_pile);
            shuffle(&mut self.deck, rng);
            self.discard_pile.push(top);
            self.notice("Deck reshuffled from the discard pile.".to_string());
        }
        let card = self.deck.pop().ok_or(GameError::DeckExhausted)?;
        let hand = self.hands.get_mut(player).ok_or(GameError::UnknownPlayer)?;
        hand.push(card);
        self.last_drawn = Some((player.to_string(), card));
        Ok(())
    }

    /// Steps `current` one seat in the active direction, wrapping at either
    /// end of the seat order.
    pub fn advance_turn(&mut self) {
        let n = self.seats.len();
        self.current = match self.direction {
            Direction::Clockwise => (self.current + 1) % n,
            Direction::CounterClockwise => (self.current + n - 1) % n,
        };
    }

    fn peek_next(&self) -> &PlayerId {
        let n = self.seats.len();
        let next = match self.direction {
            Direction::Clockwise => (self.current + 1) % n,
            Direction::CounterClockwise => (self.current + n - 1) % n,
        };
        &self.seats[next]
    }

    /// Total cards on the table; 108 for a standard game.
    pub fn total_cards(&self) -> usize {
        self.deck.len()
            + self.discard_pile.len()
            + self.hands.values().map(Vec::len).sum::<usize>()
    }
}

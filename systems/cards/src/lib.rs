#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deck, hand and discard bookkeeping for program cards.
//!
//! The [`Deck`] owns every card instance of a session and moves identifiers
//! between three piles. Shuffling is seeded so that a session replays
//! identically for the same seed.

use factory_floor_core::{Card, CardId, CardKind, CardSupply};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

/// Number of copies of each card kind in the standard factory deck.
pub const STANDARD_COMPOSITION: [(CardKind, u32); 6] = [
    (CardKind::Move1, 18),
    (CardKind::Move2, 12),
    (CardKind::Back1, 6),
    (CardKind::TurnLeft, 18),
    (CardKind::TurnRight, 18),
    (CardKind::UTurn, 6),
];

/// Seeded card supply with draw, hand and discard piles.
#[derive(Clone, Debug)]
pub struct Deck {
    cards: Vec<Card>,
    draw_pile: Vec<CardId>,
    hand: Vec<CardId>,
    discard_pile: Vec<CardId>,
    seed: u64,
    rng: ChaCha8Rng,
}

impl Deck {
    /// Builds and shuffles the standard factory deck.
    #[must_use]
    pub fn standard(seed: u64) -> Self {
        Self::with_composition(&STANDARD_COMPOSITION, seed)
    }

    /// Builds and shuffles a deck holding `copies` of each listed kind.
    ///
    /// Card identifiers are assigned sequentially in composition order.
    #[must_use]
    pub fn with_composition(composition: &[(CardKind, u32)], seed: u64) -> Self {
        let cards: Vec<Card> = composition
            .iter()
            .flat_map(|&(kind, copies)| std::iter::repeat(kind).take(copies as usize))
            .zip(0u32..)
            .map(|(kind, id)| Card::new(CardId::new(id), kind))
            .collect();

        let mut deck = Self {
            draw_pile: Vec::with_capacity(cards.len()),
            hand: Vec::new(),
            discard_pile: Vec::new(),
            cards,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        deck.reset();
        deck
    }

    /// Returns every card to the draw pile and reshuffles with the creation
    /// seed, restarting the lifecycle.
    pub fn reset(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.hand.clear();
        self.discard_pile.clear();
        self.draw_pile.clear();
        self.draw_pile.extend(self.cards.iter().map(Card::id));
        self.draw_pile.shuffle(&mut self.rng);
        debug!(cards = self.cards.len(), seed = self.seed, "deck reset");
    }

    /// Total number of card instances owned by the deck.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Reports whether the deck owns no cards at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Identifiers currently held in the hand, in draw order.
    #[must_use]
    pub fn hand(&self) -> &[CardId] {
        &self.hand
    }

    /// Cards currently held in the hand, in draw order.
    pub fn hand_cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.hand.iter().filter_map(|id| self.card(*id))
    }

    /// Number of cards waiting to be drawn.
    #[must_use]
    pub fn draw_pile_len(&self) -> usize {
        self.draw_pile.len()
    }

    /// Number of cards in the discard pile.
    #[must_use]
    pub fn discard_pile_len(&self) -> usize {
        self.discard_pile.len()
    }

    fn recycle_discards(&mut self) {
        if self.discard_pile.is_empty() {
            return;
        }
        debug!(cards = self.discard_pile.len(), "reshuffling discard pile");
        self.draw_pile.append(&mut self.discard_pile);
        self.draw_pile.shuffle(&mut self.rng);
    }
}

impl CardSupply for Deck {
    fn draw_cards(&mut self, count: usize) -> Vec<Card> {
        let mut drawn = Vec::with_capacity(count);
        while drawn.len() < count {
            if self.draw_pile.is_empty() {
                self.recycle_discards();
            }
            let Some(id) = self.draw_pile.pop() else {
                warn!(
                    requested = count,
                    drawn = drawn.len(),
                    "deck exhausted"
                );
                break;
            };
            self.hand.push(id);
            if let Some(card) = self.card(id) {
                drawn.push(card);
            }
        }
        drawn
    }

    fn discard(&mut self, ids: &[CardId]) {
        for id in ids {
            match self.hand.iter().position(|held| held == id) {
                Some(index) => {
                    let card = self.hand.remove(index);
                    self.discard_pile.push(card);
                }
                None => debug!(card = id.get(), "ignoring discard of card not in hand"),
            }
        }
    }

    fn card(&self, id: CardId) -> Option<Card> {
        self.cards.get(id.get() as usize).copied()
    }
}

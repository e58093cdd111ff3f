//! Small games shared by the integration tests.
#![allow(dead_code)]

use rand::seq::SliceRandom;
use rand::RngCore;
use serde::Serialize;
use tcg_ismcts::Game;

// ============================================================================
// One decision, two outcomes
// ============================================================================

/// Player 0 picks `A` (wins) or `B` (loses); either ends the game.
pub struct TwoActionGame;

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub enum Choice {
    A,
    B,
}

#[derive(Clone, Debug)]
pub struct TwoActionState {
    pub chosen: Option<Choice>,
}

impl TwoActionState {
    pub fn start() -> Self {
        Self { chosen: None }
    }
}

impl Game for TwoActionGame {
    type State = TwoActionState;
    type Action = Choice;
    type Player = u8;

    fn legal_actions(&self, state: &TwoActionState) -> Vec<Choice> {
        match state.chosen {
            None => vec![Choice::A, Choice::B],
            Some(_) => Vec::new(),
        }
    }

    fn apply_action(&self, _state: &TwoActionState, action: &Choice) -> TwoActionState {
        TwoActionState {
            chosen: Some(action.clone()),
        }
    }

    fn terminal_value(&self, state: &TwoActionState, perspective: u8) -> f64 {
        let player_zero = match state.chosen {
            Some(Choice::A) => 1.0,
            Some(Choice::B) => -1.0,
            None => 0.0,
        };
        if perspective == 0 {
            player_zero
        } else {
            -player_zero
        }
    }
}

// ============================================================================
// Hidden hands
// ============================================================================

/// Players alternate playing one card from hand; each pair of plays is a trick
/// won by the higher card. More tricks wins. Opponent hands are hidden.
pub struct HighCardGame;

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct PlayCard {
    pub card: u8,
}

#[derive(Clone, Debug)]
pub struct HighCardState {
    pub hands: [Vec<u8>; 2],
    /// Cards nobody holds and nobody has seen.
    pub unseen: Vec<u8>,
    pub to_move: u8,
    pub pending: Option<u8>,
    pub tricks: [u8; 2],
}

impl HighCardState {
    pub fn deal(first: &[u8], second: &[u8], unseen: &[u8]) -> Self {
        Self {
            hands: [first.to_vec(), second.to_vec()],
            unseen: unseen.to_vec(),
            to_move: 0,
            pending: None,
            tricks: [0, 0],
        }
    }
}

impl Game for HighCardGame {
    type State = HighCardState;
    type Action = PlayCard;
    type Player = u8;

    fn legal_actions(&self, state: &HighCardState) -> Vec<PlayCard> {
        state.hands[usize::from(state.to_move)]
            .iter()
            .map(|&card| PlayCard { card })
            .collect()
    }

    fn apply_action(&self, state: &HighCardState, action: &PlayCard) -> HighCardState {
        let mut next = state.clone();
        let mover = usize::from(state.to_move);
        next.hands[mover].retain(|&c| c != action.card);

        match state.pending {
            None => next.pending = Some(action.card),
            Some(led) => {
                // The leader is the other player
                if action.card > led {
                    next.tricks[mover] += 1;
                } else if led > action.card {
                    next.tricks[1 - mover] += 1;
                }
                next.pending = None;
            }
        }
        next.to_move = 1 - state.to_move;
        next
    }

    fn determinize(&self, state: &HighCardState, perspective: u8, rng: &mut dyn RngCore) -> HighCardState {
        let mut next = state.clone();
        let opponent = usize::from(1 - perspective);

        let mut pool: Vec<u8> = next.hands[opponent].drain(..).chain(next.unseen.drain(..)).collect();
        let hand_size = state.hands[opponent].len();
        pool.shuffle(rng);
        next.unseen = pool.split_off(hand_size);
        next.hands[opponent] = pool;
        next
    }

    fn terminal_value(&self, state: &HighCardState, perspective: u8) -> f64 {
        let me = state.tricks[usize::from(perspective)];
        let them = state.tricks[usize::from(1 - perspective)];
        match me.cmp(&them) {
            std::cmp::Ordering::Greater => 1.0,
            std::cmp::Ordering::Less => -1.0,
            std::cmp::Ordering::Equal => 0.0,
        }
    }

    fn encode_state(&self, state: &HighCardState, perspective: u8) -> Vec<f32> {
        let mut features = vec![0.0; tcg_ismcts::game::STATE_FEATURES];
        for &card in &state.hands[usize::from(perspective)] {
            features[usize::from(card)] = 1.0;
        }
        features
    }

    fn encode_action(&self, action: &PlayCard) -> Vec<f32> {
        let mut features = vec![0.0; tcg_ismcts::game::ACTION_FEATURES];
        features[0] = f32::from(action.card);
        features
    }
}

//! End-to-end search scenarios through the public API

mod common;

use common::{Choice, HighCardGame, HighCardState, PlayCard, TwoActionGame, TwoActionState};
use tcg_ismcts::{
    ActionKey, ActionScorer, Game, IsmctsConfig, IsmctsEngine, IsmctsError, PolicyValueOracle,
    Prediction, Result, ScoringOracle, SearchRequest, UniformOracle,
};

fn greedy(dets: usize, sims: usize) -> IsmctsConfig {
    IsmctsConfig {
        exploration_weight: 1.5,
        ..IsmctsConfig::for_evaluation(dets, sims)
    }
}

fn key(action: &impl serde::Serialize) -> ActionKey {
    ActionKey::canonical(action).unwrap()
}

fn sample_deal() -> HighCardState {
    HighCardState::deal(&[2, 7, 11], &[3, 9, 12], &[1, 4, 5, 6, 8, 10])
}

/// Uniform predictions delivered only asynchronously, after a scheduler yield.
struct YieldingOracle {
    calls: usize,
}

impl<G: Game> PolicyValueOracle<G> for YieldingOracle {
    async fn predict(&mut self, _features: &[f32]) -> Result<Prediction> {
        tokio::task::yield_now().await;
        self.calls += 1;
        Ok(Prediction::uniform(0.0))
    }
}

/// Scores actions by their first feature (the card rank).
struct RankScorer;

impl ActionScorer for RankScorer {
    fn score_actions(&mut self, _state: &[f32], actions: &[Vec<f32>]) -> Result<Vec<f32>> {
        Ok(actions.iter().map(|f| f[0]).collect())
    }

    fn value(&mut self, _state: &[f32]) -> Result<f32> {
        Ok(0.0)
    }
}

#[tokio::test]
async fn test_two_action_game_prefers_win() {
    let state = TwoActionState::start();
    let mut engine = IsmctsEngine::new(greedy(1, 50)).unwrap();

    let result = engine
        .search_uniform(&TwoActionGame, SearchRequest::new(&state, 0))
        .await
        .unwrap();

    assert_eq!(result.action, Choice::A);
    let a = result.child(&key(&Choice::A)).unwrap();
    let b = result.child(&key(&Choice::B)).unwrap();
    assert!(a.visit_count > b.visit_count);
    assert_eq!(a.visit_count + b.visit_count, 50);
    assert!((result.policy.values().sum::<f64>() - 1.0).abs() < 1e-9);
    assert!(result.value > 0.0 && result.value <= 1.0);
}

#[tokio::test]
async fn test_identity_determinization_is_deterministic() {
    let state = TwoActionState::start();

    let mut first = IsmctsEngine::seeded(greedy(3, 40), 1).unwrap();
    let mut second = IsmctsEngine::seeded(greedy(3, 40), 2).unwrap();
    let a = first
        .search_uniform(&TwoActionGame, SearchRequest::new(&state, 0))
        .await
        .unwrap();
    let b = second
        .search_uniform(&TwoActionGame, SearchRequest::new(&state, 0))
        .await
        .unwrap();

    assert_eq!(a.action, b.action);
    assert_eq!(a.policy, b.policy);
    assert_eq!(a.value, b.value);
    assert_eq!(a.stats, b.stats);
}

#[tokio::test]
async fn test_seeded_hidden_information_search_is_reproducible() {
    let state = sample_deal();
    let config = IsmctsConfig {
        num_determinizations: 4,
        num_simulations: 60,
        ..Default::default()
    };

    let mut first = IsmctsEngine::seeded(config.clone(), 42).unwrap();
    let mut second = IsmctsEngine::seeded(config, 42).unwrap();
    let a = first
        .search_uniform(&HighCardGame, SearchRequest::new(&state, 0).at_turn(1))
        .await
        .unwrap();
    let b = second
        .search_uniform(&HighCardGame, SearchRequest::new(&state, 0).at_turn(1))
        .await
        .unwrap();

    assert_eq!(a.action, b.action);
    assert_eq!(a.policy, b.policy);
}

#[tokio::test]
async fn test_hidden_information_search_stays_in_own_hand() {
    let state = sample_deal();
    let mut engine = IsmctsEngine::seeded(greedy(8, 80), 7).unwrap();

    let result = engine
        .search_uniform(&HighCardGame, SearchRequest::new(&state, 0))
        .await
        .unwrap();

    assert!(state.hands[0].contains(&result.action.card));
    let legal: Vec<ActionKey> = HighCardGame
        .legal_actions(&state)
        .iter()
        .map(key)
        .collect();
    assert_eq!(result.policy.len(), legal.len());
    assert!(legal.iter().all(|k| result.policy.contains_key(k)));
    assert_eq!(result.stats.determinizations, 8);
    assert_eq!(result.stats.simulations, 640);
    assert!((-1.0..=1.0).contains(&result.value));
}

#[tokio::test]
async fn test_invalid_configuration_is_rejected() {
    let config = IsmctsConfig {
        num_simulations: 0,
        ..Default::default()
    };
    assert!(matches!(
        IsmctsEngine::new(config),
        Err(IsmctsError::InvalidConfiguration(_))
    ));
}

#[tokio::test]
async fn test_unusable_noise_and_temperature_are_rejected() {
    let infinite_alpha = IsmctsConfig {
        dirichlet_alpha: f64::INFINITY,
        ..greedy(1, 10)
    };
    assert!(matches!(
        IsmctsEngine::seeded(infinite_alpha, 0),
        Err(IsmctsError::InvalidConfiguration(_))
    ));

    let nan_temperature = IsmctsConfig {
        temperature_start: f64::NAN,
        ..greedy(1, 10)
    };
    assert!(matches!(
        IsmctsEngine::seeded(nan_temperature, 0),
        Err(IsmctsError::InvalidConfiguration(_))
    ));
}

#[tokio::test]
async fn test_terminal_root_has_no_legal_actions() {
    let state = TwoActionGame.apply_action(&TwoActionState::start(), &Choice::B);
    let mut engine = IsmctsEngine::new(greedy(1, 10)).unwrap();

    let result = engine
        .search_uniform(&TwoActionGame, SearchRequest::new(&state, 0))
        .await;
    assert!(matches!(result, Err(IsmctsError::NoLegalActions)));
}

#[tokio::test]
async fn test_async_oracle_is_awaited_for_every_prediction() {
    let state = sample_deal();
    let mut engine = IsmctsEngine::seeded(greedy(2, 30), 3).unwrap();
    let mut oracle = YieldingOracle { calls: 0 };

    let result = engine
        .search(&HighCardGame, SearchRequest::new(&state, 0), &mut oracle)
        .await
        .unwrap();

    assert_eq!(oracle.calls, result.stats.oracle_calls);
    assert!(oracle.calls > 0);
}

#[tokio::test]
async fn test_progress_reaches_total() {
    let state = sample_deal();
    let mut engine = IsmctsEngine::seeded(greedy(3, 100), 5).unwrap();
    let mut reports = Vec::new();
    let mut on_progress = |done: usize, total: usize| reports.push((done, total));

    engine
        .search(
            &HighCardGame,
            SearchRequest::new(&state, 0).on_progress(&mut on_progress),
            &mut UniformOracle,
        )
        .await
        .unwrap();

    assert_eq!(reports.last(), Some(&(300, 300)));
    assert!(reports.windows(2).all(|w| w[0].0 < w[1].0));
}

#[tokio::test]
async fn test_concurrent_searches_are_independent() {
    let state = sample_deal();
    let mut left = IsmctsEngine::seeded(greedy(2, 40), 11).unwrap();
    let mut right = IsmctsEngine::seeded(greedy(2, 40), 11).unwrap();
    let mut left_oracle = YieldingOracle { calls: 0 };
    let mut right_oracle = YieldingOracle { calls: 0 };

    let (a, b) = tokio::join!(
        left.search(&HighCardGame, SearchRequest::new(&state, 0), &mut left_oracle),
        right.search(&HighCardGame, SearchRequest::new(&state, 0), &mut right_oracle),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.policy, b.policy);
    assert_eq!(a.stats, b.stats);
    assert_eq!(left_oracle.calls, right_oracle.calls);
}

#[tokio::test]
async fn test_action_scoring_oracle_shapes_priors() {
    let state = sample_deal();
    let mut engine = IsmctsEngine::seeded(greedy(1, 10), 0).unwrap();
    let mut oracle = ScoringOracle::new(&HighCardGame, RankScorer);

    let result = engine
        .search(&HighCardGame, SearchRequest::new(&state, 0), &mut oracle)
        .await
        .unwrap();

    let low = result.child(&key(&PlayCard { card: 2 })).unwrap();
    let high = result.child(&key(&PlayCard { card: 11 })).unwrap();
    assert!(high.prior > low.prior);
    assert!((result.child_stats.iter().map(|c| c.prior).sum::<f64>() - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn test_result_serializes_to_json() {
    let state = TwoActionState::start();
    let mut engine = IsmctsEngine::seeded(greedy(1, 20), 0).unwrap();
    let result = engine
        .search_uniform(&TwoActionGame, SearchRequest::new(&state, 0))
        .await
        .unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["action"], "A");
    assert!(json["policy"].is_object());
    assert_eq!(json["stats"]["simulations"], 20);
}

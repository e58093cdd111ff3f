//! Information-Set Monte Carlo Tree Search.
//!
//! A search samples `num_determinizations` concrete states consistent with
//! what the acting player knows and runs `num_simulations` simulations against
//! each of them, all sharing one tree of information sets. A simulation:
//!
//! 1. descends with PUCT while the current node has a child for every action
//!    legal in the current concrete state,
//! 2. expands every missing legal action with oracle priors,
//! 3. steps into the first newly created child and scores it (terminal value or
//!    oracle value),
//! 4. backpropagates with the sign flipped at every ply.
//!
//! The tree lives for a single call. Nothing is shared between searches.

use crate::game::{ActionKey, Game};
use crate::mcts::hyperparameters::IsmctsConfig;
use crate::mcts::mcts_result::{
    argmax_visits, collect_child_stats, extract_policy, extract_value, root_visit_counts,
    sample_by_temperature, SearchResult, SearchStats, GREEDY_TEMPERATURE,
};
use crate::mcts::node::{NodeId, MIN_PRIOR};
use crate::mcts::noise::{blend_prior, SymmetricDirichlet};
use crate::mcts::selection::{is_fully_expanded, select_child};
use crate::mcts::tree::Tree;
use crate::neural::policy_value_net::{PolicyValueOracle, Prediction, UniformOracle};
use crate::{IsmctsError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Distribution;

/// Receives `(simulations_done, simulations_total)`.
pub type ProgressCallback<'a> = dyn FnMut(usize, usize) + 'a;

/// Inputs of one search besides the game and the oracle.
pub struct SearchRequest<'a, G: Game> {
    state: &'a G::State,
    perspective: G::Player,
    turn: Option<u32>,
    on_progress: Option<&'a mut ProgressCallback<'a>>,
}

impl<'a, G: Game> SearchRequest<'a, G> {
    pub fn new(state: &'a G::State, perspective: G::Player) -> Self {
        Self {
            state,
            perspective,
            turn: None,
            on_progress: None,
        }
    }

    /// Turn number used to anneal the move-selection temperature.
    pub fn at_turn(mut self, turn: u32) -> Self {
        self.turn = Some(turn);
        self
    }

    pub fn on_progress(mut self, callback: &'a mut ProgressCallback<'a>) -> Self {
        self.on_progress = Some(callback);
        self
    }
}

struct Progress<'a> {
    done: usize,
    total: usize,
    last_reported: Option<usize>,
    callback: Option<&'a mut ProgressCallback<'a>>,
}

impl<'a> Progress<'a> {
    fn new(total: usize, callback: Option<&'a mut ProgressCallback<'a>>) -> Self {
        Self {
            done: 0,
            total,
            last_reported: None,
            callback,
        }
    }

    /// Reports only when `done` moved since the previous report.
    fn report(&mut self) {
        if self.last_reported == Some(self.done) {
            return;
        }
        self.last_reported = Some(self.done);
        if let Some(callback) = self.callback.as_deref_mut() {
            callback(self.done, self.total);
        }
    }
}

/// Per-search collaborators and counters.
struct SearchContext<'a, G: Game, O> {
    game: &'a G,
    perspective: G::Player,
    oracle: &'a mut O,
    use_sync: bool,
    stats: SearchStats,
}

impl<G: Game, O: PolicyValueOracle<G>> SearchContext<'_, G, O> {
    fn action_keys(&self, actions: &[G::Action]) -> Result<Vec<ActionKey>> {
        actions.iter().map(|action| self.game.action_key(action)).collect()
    }

    async fn evaluate(&mut self, state: &G::State, legal_actions: &[G::Action]) -> Result<Prediction> {
        self.oracle.set_context(state, legal_actions)?;
        let features = self.game.encode_state(state, self.perspective);
        self.stats.oracle_calls += 1;
        if self.use_sync {
            self.oracle.predict_sync(&features)
        } else {
            self.oracle.predict(&features).await
        }
    }

    /// Value of a freshly entered state: terminal value if the game is over,
    /// otherwise the oracle's estimate.
    async fn leaf_value(&mut self, state: &G::State) -> Result<f64> {
        let legal_actions = self.game.legal_actions(state);
        if legal_actions.is_empty() {
            self.stats.terminal_evaluations += 1;
            return Ok(self.game.terminal_value(state, self.perspective));
        }
        Ok(self.evaluate(state, &legal_actions).await?.value)
    }
}

/// Propagates a leaf value up `path` (root first).
///
/// `value` is expressed for the searching player. A node stores values from
/// the point of view of the player who moved into it, so odd plies keep the
/// sign and even plies (the root included) flip it.
pub fn backpropagate<A>(tree: &mut Tree<A>, path: &[NodeId], value: f64) {
    let leaf_depth = path.len().saturating_sub(1);
    let mut value = if leaf_depth % 2 == 1 { value } else { -value };
    for &node_id in path.iter().rev() {
        tree.get_mut(node_id).record(value);
        value = -value;
    }
}

/// ISMCTS engine. Owns the configuration and the random source; every call to
/// [`search`](IsmctsEngine::search) builds and drops its own tree.
#[derive(Debug)]
pub struct IsmctsEngine<R = StdRng> {
    config: IsmctsConfig,
    rng: R,
}

impl IsmctsEngine<StdRng> {
    /// Engine seeded from the operating system.
    ///
    /// # Errors
    /// `InvalidConfiguration` if the configuration does not validate.
    pub fn new(config: IsmctsConfig) -> Result<Self> {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Reproducible engine.
    pub fn seeded(config: IsmctsConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> IsmctsEngine<R> {
    pub fn with_rng(config: IsmctsConfig, rng: R) -> Result<Self> {
        config.validate()?;
        log::info!("[ISMCTS] engine configured: {}", config.to_config_string());
        Ok(Self { config, rng })
    }

    pub fn config(&self) -> &IsmctsConfig {
        &self.config
    }

    /// Searches with the default uniform-policy, zero-value oracle.
    pub async fn search_uniform<G: Game>(
        &mut self,
        game: &G,
        request: SearchRequest<'_, G>,
    ) -> Result<SearchResult<G::Action>> {
        let mut oracle = UniformOracle;
        self.search(game, request, &mut oracle).await
    }

    /// Picks an action for `request.perspective` in `request.state`.
    ///
    /// # Errors
    /// - `NoLegalActions` if the state is terminal
    /// - `SearchInvariantViolation` if the game reports inconsistent legal actions
    /// - any error raised by the oracle or by action-key serialization
    pub async fn search<G, O>(
        &mut self,
        game: &G,
        request: SearchRequest<'_, G>,
        oracle: &mut O,
    ) -> Result<SearchResult<G::Action>>
    where
        G: Game,
        O: PolicyValueOracle<G>,
    {
        let (_, result) = self.search_with_tree(game, request, oracle).await?;
        Ok(result)
    }

    pub(crate) async fn search_with_tree<G, O>(
        &mut self,
        game: &G,
        request: SearchRequest<'_, G>,
        oracle: &mut O,
    ) -> Result<(Tree<G::Action>, SearchResult<G::Action>)>
    where
        G: Game,
        O: PolicyValueOracle<G>,
    {
        let SearchRequest {
            state,
            perspective,
            turn,
            on_progress,
        } = request;

        let root_actions = game.legal_actions(state);
        if root_actions.is_empty() {
            return Err(IsmctsError::NoLegalActions);
        }

        let use_sync = oracle.supports_sync();
        let mut ctx = SearchContext {
            game,
            perspective,
            oracle,
            use_sync,
            stats: SearchStats::default(),
        };
        let root_keys = ctx.action_keys(&root_actions)?;
        let mut progress = Progress::new(self.config.total_simulations(), on_progress);
        let mut tree = Tree::new();

        log::debug!(
            "[ISMCTS] search start: perspective={:?} legal_actions={} budget={}x{} sync_oracle={}",
            perspective,
            root_actions.len(),
            self.config.num_determinizations,
            self.config.num_simulations,
            use_sync
        );

        for index in 0..self.config.num_determinizations {
            self.run_determinization(index, &mut tree, &mut ctx, state, &mut progress)
                .await?;
        }

        let temperature = self.config.get_temperature(turn);
        let visits = root_visit_counts(&tree, &root_keys);
        let chosen = if temperature < GREEDY_TEMPERATURE {
            argmax_visits(&visits)
        } else {
            sample_by_temperature(&visits, temperature, &mut self.rng)
        };

        let policy = extract_policy(&tree, &root_keys);
        let value = extract_value(&tree);
        let child_stats = collect_child_stats(&tree, &policy);
        let mut stats = std::mem::take(&mut ctx.stats);
        stats.nodes = tree.len();

        log::debug!(
            "[ISMCTS] search done: action={} value={:.3} temperature={:.3} stats={:?}",
            root_keys[chosen],
            value,
            temperature,
            stats
        );

        let result = SearchResult {
            action: root_actions[chosen].clone(),
            policy,
            value,
            child_stats,
            stats,
        };
        Ok((tree, result))
    }

    /// Samples one determinization and runs the inner simulation loop on it.
    async fn run_determinization<G, O>(
        &mut self,
        index: usize,
        tree: &mut Tree<G::Action>,
        ctx: &mut SearchContext<'_, G, O>,
        state: &G::State,
        progress: &mut Progress<'_>,
    ) -> Result<()>
    where
        G: Game,
        O: PolicyValueOracle<G>,
    {
        let determinized = ctx.game.determinize(state, ctx.perspective, &mut self.rng);
        ctx.stats.determinizations += 1;

        for _ in 0..self.config.num_simulations {
            self.simulate(tree, ctx, &determinized).await?;
            ctx.stats.simulations += 1;
            progress.done += 1;

            // Async oracles already suspend on every prediction
            if ctx.use_sync && progress.done % self.config.yield_interval == 0 {
                tokio::task::yield_now().await;
                progress.report();
            }
        }

        if index == 0 && self.apply_root_noise(tree)? {
            log::trace!(
                "[ISMCTS] root noise applied over {} children",
                tree.root().children.len()
            );
        }

        if log::log_enabled!(log::Level::Trace) {
            log::trace!(
                "[ISMCTS] determinization {}/{} done: root_visits={} nodes={}",
                index + 1,
                self.config.num_determinizations,
                tree.root().visit_count,
                tree.len()
            );
        }

        tokio::task::yield_now().await;
        progress.report();
        Ok(())
    }

    /// One select / expand / evaluate / backpropagate pass.
    async fn simulate<G, O>(
        &self,
        tree: &mut Tree<G::Action>,
        ctx: &mut SearchContext<'_, G, O>,
        root_state: &G::State,
    ) -> Result<()>
    where
        G: Game,
        O: PolicyValueOracle<G>,
    {
        let mut state = root_state.clone();
        let mut node_id = NodeId::ROOT;
        let mut path = vec![NodeId::ROOT];

        loop {
            let legal_actions = ctx.game.legal_actions(&state);

            if legal_actions.is_empty() {
                ctx.stats.terminal_evaluations += 1;
                let value = ctx.game.terminal_value(&state, ctx.perspective);
                finish_simulation(tree, &path, value, &mut ctx.stats);
                return Ok(());
            }

            if path.len() - 1 >= self.config.max_depth {
                ctx.stats.depth_cutoffs += 1;
                let value = ctx.evaluate(&state, &legal_actions).await?.value;
                finish_simulation(tree, &path, value, &mut ctx.stats);
                return Ok(());
            }

            let legal_keys = ctx.action_keys(&legal_actions)?;

            if !is_fully_expanded(tree, node_id, &legal_keys) {
                let prediction = ctx.evaluate(&state, &legal_actions).await?;
                let (index, child_id) =
                    self.expand(tree, node_id, &legal_actions, &legal_keys, &prediction)?;
                state = ctx.game.apply_action(&state, &legal_actions[index]);
                path.push(child_id);

                let value = ctx.leaf_value(&state).await?;
                finish_simulation(tree, &path, value, &mut ctx.stats);
                return Ok(());
            }

            let (index, child_id) =
                select_child(tree, node_id, &legal_keys, self.config.exploration_weight)?;
            state = ctx.game.apply_action(&state, &legal_actions[index]);
            path.push(child_id);
            node_id = child_id;
        }
    }

    /// Creates a child for every legal action that lacks one and returns the
    /// first newly created child in legal order, which the simulation enters.
    fn expand<A: Clone>(
        &self,
        tree: &mut Tree<A>,
        node_id: NodeId,
        legal_actions: &[A],
        legal_keys: &[ActionKey],
        prediction: &Prediction,
    ) -> Result<(usize, NodeId)> {
        let uniform = 1.0 / legal_actions.len() as f64;
        let use_policy = self.config.use_neural_net_prior && !prediction.policy.is_empty();
        let mut descent = None;

        for (index, (action, key)) in legal_actions.iter().zip(legal_keys).enumerate() {
            if tree.child(node_id, key).is_some() {
                continue;
            }
            let prior = if use_policy {
                prediction.policy.get(key).copied().unwrap_or(0.0)
            } else {
                uniform
            };
            let child_id = tree.add_child(node_id, key.clone(), action.clone(), prior);
            if descent.is_none() {
                descent = Some((index, child_id));
            }
        }

        descent.ok_or_else(|| {
            IsmctsError::SearchInvariantViolation(format!(
                "expansion of node {:?} created no child for {} legal actions",
                node_id,
                legal_actions.len()
            ))
        })
    }

    /// Blends Dirichlet noise into the root priors. Returns whether noise was applied.
    fn apply_root_noise<A>(&mut self, tree: &mut Tree<A>) -> Result<bool> {
        if self.config.dirichlet_alpha <= 0.0 {
            return Ok(false);
        }
        let children: Vec<NodeId> = tree.root().children.values().copied().collect();
        if children.is_empty() {
            return Ok(false);
        }

        let noise = SymmetricDirichlet::new(self.config.dirichlet_alpha, children.len())?
            .sample(&mut self.rng);
        for (child_id, eta) in children.into_iter().zip(noise) {
            let child = tree.get_mut(child_id);
            child.prior = blend_prior(child.prior, eta, self.config.dirichlet_epsilon).max(MIN_PRIOR);
        }
        Ok(true)
    }
}

fn finish_simulation<A>(tree: &mut Tree<A>, path: &[NodeId], value: f64, stats: &mut SearchStats) {
    stats.max_depth = stats.max_depth.max(path.len() - 1);
    backpropagate(tree, path, value);
}

//! Network-driven arena players and their factory.

use crate::arena::config::ArenaConfig;
use crate::arena::network::{Layer, Network, argmax};
use crate::arena::{MoveKind, VisibleState};
use crate::candidate::{
    Candidate, CandidateFactory, CandidateId, CandidateSource, SerializedCandidate,
};
use crate::error::SerializationError;
use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock};
use tracing::warn;

/// A player whose moves come from a dense network.
///
/// Decisions are a pure function of the visible state, so one player can
/// take part in many matches at once.
#[derive(Debug)]
pub struct ArenaPlayer {
    id: CandidateId,
    parent_ids: Vec<CandidateId>,
    source: Option<CandidateSource>,
    network: RwLock<Option<Network>>,
}

impl ArenaPlayer {
    /// Create a player with a fresh identifier.
    #[must_use]
    pub fn new(
        network: Network,
        parent_ids: Vec<CandidateId>,
        source: Option<CandidateSource>,
    ) -> Self {
        Self::restore(CandidateId::new(), network, parent_ids, source)
    }

    /// Create a player with a known identifier.
    #[must_use]
    pub fn restore(
        id: CandidateId,
        network: Network,
        parent_ids: Vec<CandidateId>,
        source: Option<CandidateSource>,
    ) -> Self {
        Self {
            id,
            parent_ids,
            source,
            network: RwLock::new(Some(network)),
        }
    }

    /// A copy of the network, or `None` once disposed.
    #[must_use]
    pub fn network(&self) -> Option<Network> {
        self.network
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether the network has been released.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.network.read().unwrap_or_else(PoisonError::into_inner).is_none()
    }
}

impl Candidate for ArenaPlayer {
    type VisibleState = VisibleState;
    type Move = MoveKind;

    fn id(&self) -> CandidateId {
        self.id
    }

    fn parent_ids(&self) -> &[CandidateId] {
        &self.parent_ids
    }

    fn source(&self) -> Option<CandidateSource> {
        self.source
    }

    fn next_move(&self, visible: &VisibleState) -> MoveKind {
        let guard = self.network.read().unwrap_or_else(PoisonError::into_inner);
        let Some(network) = guard.as_ref() else {
            return MoveKind::default();
        };

        let inputs = visible.to_inputs();
        if inputs.len() != network.input_count() {
            return MoveKind::default();
        }

        match argmax(&network.forward(&inputs)) {
            None | Some(0) => MoveKind::TurnLeft,
            Some(1) => MoveKind::TurnRight,
            Some(_) => MoveKind::MoveForward,
        }
    }

    fn dispose(&self) {
        *self.network.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Network shape and breeding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArenaPlayerConfig {
    /// Width of each hidden layer.
    pub hidden_layers: Vec<usize>,
    /// Probability that a weight is perturbed by a mutation.
    pub mutation_rate: f64,
    /// Largest perturbation applied to a mutated weight.
    pub mutation_power: f64,
}

impl Default for ArenaPlayerConfig {
    fn default() -> Self {
        Self {
            hidden_layers: vec![16, 16],
            mutation_rate: 0.05,
            mutation_power: 0.1,
        }
    }
}

/// Number of move kinds a network chooses between.
const OUTPUTS: usize = 3;

/// Breeds [`ArenaPlayer`]s.
#[derive(Debug)]
pub struct ArenaPlayerFactory {
    widths: Vec<usize>,
    config: ArenaPlayerConfig,
}

impl ArenaPlayerFactory {
    /// Create a factory for players of the given arena.
    #[must_use]
    pub fn new(arena: &ArenaConfig, config: ArenaPlayerConfig) -> Self {
        let widths = std::iter::once(VisibleState::input_count(arena.visibility_radius))
            .chain(config.hidden_layers.iter().copied())
            .chain(std::iter::once(OUTPUTS))
            .collect();
        Self { widths, config }
    }

    /// Layer widths of every network produced, input first.
    #[must_use]
    pub fn widths(&self) -> &[usize] {
        &self.widths
    }

    fn random_network(&self) -> Network {
        Network::random(&self.widths, &mut rand::thread_rng())
    }

    /// The parent's network; a disposed parent contributes a random one.
    fn parent_network(&self, parent: &ArenaPlayer) -> Network {
        parent.network().unwrap_or_else(|| {
            warn!(candidate_id = %parent.id, "breeding from a disposed player");
            self.random_network()
        })
    }
}

impl CandidateFactory for ArenaPlayerFactory {
    type Candidate = ArenaPlayer;
    type Payload = Network;

    fn create_random(&self) -> ArenaPlayer {
        ArenaPlayer::new(self.random_network(), Vec::new(), Some(CandidateSource::Random))
    }

    fn create_clone(&self, original: &ArenaPlayer) -> ArenaPlayer {
        ArenaPlayer::new(
            self.parent_network(original),
            vec![original.id],
            Some(CandidateSource::Clone),
        )
    }

    fn create_crossover(&self, first: &ArenaPlayer, second: &ArenaPlayer) -> ArenaPlayer {
        let network = Network::crossover(&self.parent_network(first), &self.parent_network(second));
        ArenaPlayer::new(
            network,
            vec![first.id, second.id],
            Some(CandidateSource::CrossOver),
        )
    }

    fn create_mutated(&self, original: &ArenaPlayer) -> ArenaPlayer {
        let network = self.parent_network(original).mutated(
            self.config.mutation_rate,
            self.config.mutation_power,
            &mut rand::thread_rng(),
        );
        ArenaPlayer::new(network, vec![original.id], Some(CandidateSource::Mutation))
    }

    /// A disposed player serializes with an empty network, which
    /// [`deserialize_candidate`](Self::deserialize_candidate) rejects.
    fn serialize_candidate(&self, candidate: &ArenaPlayer) -> SerializedCandidate<Network> {
        SerializedCandidate {
            id: candidate.id,
            parent_ids: candidate.parent_ids.clone(),
            source: candidate.source,
            payload: candidate.network().unwrap_or_default(),
        }
    }

    fn deserialize_candidate(
        &self,
        data: SerializedCandidate<Network>,
    ) -> Result<ArenaPlayer, SerializationError> {
        let widths = data.payload.widths();
        if widths != self.widths {
            return Err(SerializationError::IncompatiblePayload {
                candidate_id: data.id,
                reason: format!("network shape {widths:?}, expected {:?}", self.widths),
            });
        }
        if !data.payload.layers.windows(2).all(|pair| pair[0].outputs == pair[1].inputs) {
            return Err(SerializationError::IncompatiblePayload {
                candidate_id: data.id,
                reason: "layer inputs do not match the previous layer's outputs".to_string(),
            });
        }
        if !data.payload.layers.iter().all(Layer::is_consistent) {
            return Err(SerializationError::IncompatiblePayload {
                candidate_id: data.id,
                reason: "layer buffers do not match their widths".to_string(),
            });
        }

        Ok(ArenaPlayer::restore(data.id, data.payload, data.parent_ids, data.source))
    }
}

//! Mock candidates and scenarios shared by unit tests.

use crate::candidate::{
    Candidate, CandidateFactory, CandidateId, CandidateSource, SerializedCandidate,
};
use crate::error::{EvaluationError, SerializationError};
use crate::evaluation::{CandidateRank, CandidateTest, CandidateTestFactory, CandidateTestResult};
use crate::population::{Population, PopulationId};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Candidate whose "skill" is a plain number it reports as its score.
#[derive(Debug)]
pub(crate) struct MockCandidate {
    id: CandidateId,
    parent_ids: Vec<CandidateId>,
    source: Option<CandidateSource>,
    value: f64,
    disposals: AtomicUsize,
}

impl MockCandidate {
    pub(crate) fn new(
        id: CandidateId,
        parent_ids: Vec<CandidateId>,
        source: Option<CandidateSource>,
        value: f64,
    ) -> Self {
        Self {
            id,
            parent_ids,
            source,
            value,
            disposals: AtomicUsize::new(0),
        }
    }

    pub(crate) fn random(value: f64) -> Self {
        Self::new(CandidateId::new(), Vec::new(), Some(CandidateSource::Random), value)
    }

    pub(crate) fn with_source(source: Option<CandidateSource>, value: f64) -> Self {
        Self::new(CandidateId::new(), Vec::new(), source, value)
    }

    pub(crate) fn value(&self) -> f64 {
        self.value
    }

    pub(crate) fn disposals(&self) -> usize {
        self.disposals.load(Ordering::SeqCst)
    }
}

impl Candidate for MockCandidate {
    type VisibleState = ();
    type Move = f64;

    fn id(&self) -> CandidateId {
        self.id
    }

    fn parent_ids(&self) -> &[CandidateId] {
        &self.parent_ids
    }

    fn source(&self) -> Option<CandidateSource> {
        self.source
    }

    fn next_move(&self, _visible: &()) -> f64 {
        self.value
    }

    fn dispose(&self) {
        self.disposals.fetch_add(1, Ordering::SeqCst);
    }
}

/// Population of random mock candidates with the given values.
pub(crate) fn mock_population(values: &[f64]) -> Population<MockCandidate> {
    Population::new(
        0,
        values
            .iter()
            .map(|&value| Arc::new(MockCandidate::random(value)))
            .collect(),
    )
}

/// Factory producing mock candidates; payload is the candidate's value.
///
/// Breeding from a parent that was already disposed is counted.
#[derive(Debug, Default)]
pub(crate) struct MockCandidateFactory {
    random_created: AtomicUsize,
    bred_from_disposed: AtomicUsize,
}

impl MockCandidateFactory {
    pub(crate) fn random_created(&self) -> usize {
        self.random_created.load(Ordering::SeqCst)
    }

    pub(crate) fn bred_from_disposed(&self) -> usize {
        self.bred_from_disposed.load(Ordering::SeqCst)
    }

    fn check_alive(&self, parent: &MockCandidate) {
        if parent.disposals() > 0 {
            self.bred_from_disposed.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl CandidateFactory for MockCandidateFactory {
    type Candidate = MockCandidate;
    type Payload = f64;

    #[allow(clippy::cast_precision_loss)]
    fn create_random(&self) -> MockCandidate {
        let count = self.random_created.fetch_add(1, Ordering::SeqCst);
        MockCandidate::random(count as f64)
    }

    fn create_clone(&self, original: &MockCandidate) -> MockCandidate {
        self.check_alive(original);
        MockCandidate::new(
            CandidateId::new(),
            vec![original.id],
            Some(CandidateSource::Clone),
            original.value,
        )
    }

    fn create_crossover(&self, first: &MockCandidate, second: &MockCandidate) -> MockCandidate {
        self.check_alive(first);
        self.check_alive(second);
        MockCandidate::new(
            CandidateId::new(),
            vec![first.id, second.id],
            Some(CandidateSource::CrossOver),
            f64::midpoint(first.value, second.value),
        )
    }

    fn create_mutated(&self, original: &MockCandidate) -> MockCandidate {
        self.check_alive(original);
        MockCandidate::new(
            CandidateId::new(),
            vec![original.id],
            Some(CandidateSource::Mutation),
            original.value + 1.0,
        )
    }

    fn serialize_candidate(&self, candidate: &MockCandidate) -> SerializedCandidate<f64> {
        SerializedCandidate {
            id: candidate.id,
            parent_ids: candidate.parent_ids.clone(),
            source: candidate.source,
            payload: candidate.value,
        }
    }

    fn deserialize_candidate(
        &self,
        data: SerializedCandidate<f64>,
    ) -> Result<MockCandidate, SerializationError> {
        if !data.payload.is_finite() {
            return Err(SerializationError::IncompatiblePayload {
                candidate_id: data.id,
                reason: "value must be finite".to_string(),
            });
        }
        Ok(MockCandidate::new(data.id, data.parent_ids, data.source, data.payload))
    }
}

/// Every participant scores its own value.
#[derive(Debug, Default)]
pub(crate) struct ScoreTestFactory {
    configs_created: AtomicUsize,
    tests_run: Arc<AtomicUsize>,
}

impl ScoreTestFactory {
    pub(crate) fn configs_created(&self) -> usize {
        self.configs_created.load(Ordering::SeqCst)
    }

    pub(crate) fn tests_run(&self) -> usize {
        self.tests_run.load(Ordering::SeqCst)
    }
}

pub(crate) struct ScoreTest {
    tests_run: Arc<AtomicUsize>,
}

impl CandidateTest<MockCandidate> for ScoreTest {
    fn run(
        self,
        candidates: &[Arc<MockCandidate>],
    ) -> Result<CandidateTestResult, EvaluationError> {
        self.tests_run.fetch_add(1, Ordering::SeqCst);
        Ok(CandidateTestResult::new(
            candidates
                .iter()
                .map(|candidate| CandidateRank {
                    candidate_id: candidate.id(),
                    score: candidate.next_move(&()),
                })
                .collect(),
        ))
    }
}

impl CandidateTestFactory<MockCandidate> for ScoreTestFactory {
    type Config = PopulationId;
    type Test = ScoreTest;

    fn create_test_config(&self, population_id: PopulationId) -> PopulationId {
        self.configs_created.fetch_add(1, Ordering::SeqCst);
        population_id
    }

    fn create_test(&self, _config: &PopulationId) -> ScoreTest {
        ScoreTest {
            tests_run: Arc::clone(&self.tests_run),
        }
    }
}

/// Fails every test the victim takes part in.
#[derive(Debug)]
pub(crate) struct FailingTestFactory {
    victim: CandidateId,
}

impl FailingTestFactory {
    pub(crate) fn new(victim: CandidateId) -> Self {
        Self { victim }
    }
}

pub(crate) struct FailingTest {
    victim: CandidateId,
}

impl CandidateTest<MockCandidate> for FailingTest {
    fn run(
        self,
        candidates: &[Arc<MockCandidate>],
    ) -> Result<CandidateTestResult, EvaluationError> {
        if candidates.iter().any(|candidate| candidate.id() == self.victim) {
            return Err(EvaluationError::test_failed("victim crashed the scenario"));
        }
        ScoreTest {
            tests_run: Arc::new(AtomicUsize::new(0)),
        }
        .run(candidates)
    }
}

impl CandidateTestFactory<MockCandidate> for FailingTestFactory {
    type Config = ();
    type Test = FailingTest;

    fn create_test_config(&self, _population_id: PopulationId) {}

    fn create_test(&self, _config: &()) -> FailingTest {
        FailingTest { victim: self.victim }
    }
}

/// Fails the first `failures` tests, then behaves like [`ScoreTestFactory`].
#[derive(Debug)]
pub(crate) struct FlakyTestFactory {
    failures_left: Arc<AtomicUsize>,
}

impl FlakyTestFactory {
    pub(crate) fn new(failures: usize) -> Self {
        Self {
            failures_left: Arc::new(AtomicUsize::new(failures)),
        }
    }
}

pub(crate) struct FlakyTest {
    failures_left: Arc<AtomicUsize>,
}

impl CandidateTest<MockCandidate> for FlakyTest {
    fn run(
        self,
        candidates: &[Arc<MockCandidate>],
    ) -> Result<CandidateTestResult, EvaluationError> {
        let failed = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failed {
            return Err(EvaluationError::test_failed("flaky scenario"));
        }
        ScoreTest {
            tests_run: Arc::new(AtomicUsize::new(0)),
        }
        .run(candidates)
    }
}

impl CandidateTestFactory<MockCandidate> for FlakyTestFactory {
    type Config = ();
    type Test = FlakyTest;

    fn create_test_config(&self, _population_id: PopulationId) {}

    fn create_test(&self, _config: &()) -> FlakyTest {
        FlakyTest {
            failures_left: Arc::clone(&self.failures_left),
        }
    }
}

/// Fails every test while switched on, otherwise scores like [`ScoreTestFactory`].
#[derive(Debug, Default)]
pub(crate) struct ToggleTestFactory {
    failing: Arc<AtomicBool>,
}

impl ToggleTestFactory {
    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

pub(crate) struct ToggleTest {
    failing: bool,
}

impl CandidateTest<MockCandidate> for ToggleTest {
    fn run(
        self,
        candidates: &[Arc<MockCandidate>],
    ) -> Result<CandidateTestResult, EvaluationError> {
        if self.failing {
            return Err(EvaluationError::test_failed("scenario switched off"));
        }
        ScoreTest {
            tests_run: Arc::new(AtomicUsize::new(0)),
        }
        .run(candidates)
    }
}

impl CandidateTestFactory<MockCandidate> for ToggleTestFactory {
    type Config = ();
    type Test = ToggleTest;

    fn create_test_config(&self, _population_id: PopulationId) {}

    fn create_test(&self, _config: &()) -> ToggleTest {
        ToggleTest {
            failing: self.failing.load(Ordering::SeqCst),
        }
    }
}

/// Returns results with no ranks at all.
#[derive(Debug)]
pub(crate) struct ForgetfulTestFactory;

pub(crate) struct ForgetfulTest;

impl CandidateTest<MockCandidate> for ForgetfulTest {
    fn run(
        self,
        _candidates: &[Arc<MockCandidate>],
    ) -> Result<CandidateTestResult, EvaluationError> {
        Ok(CandidateTestResult::new(Vec::new()))
    }
}

impl CandidateTestFactory<MockCandidate> for ForgetfulTestFactory {
    type Config = ();
    type Test = ForgetfulTest;

    fn create_test_config(&self, _population_id: PopulationId) {}

    fn create_test(&self, _config: &()) -> ForgetfulTest {
        ForgetfulTest
    }
}

/// Ranks a candidate that never took part.
#[derive(Debug)]
pub(crate) struct StrangerTestFactory;

pub(crate) struct StrangerTest;

impl CandidateTest<MockCandidate> for StrangerTest {
    fn run(
        self,
        _candidates: &[Arc<MockCandidate>],
    ) -> Result<CandidateTestResult, EvaluationError> {
        Ok(CandidateTestResult::new(vec![CandidateRank {
            candidate_id: CandidateId::new(),
            score: 1.0,
        }]))
    }
}

impl CandidateTestFactory<MockCandidate> for StrangerTestFactory {
    type Config = ();
    type Test = StrangerTest;

    fn create_test_config(&self, _population_id: PopulationId) {}

    fn create_test(&self, _config: &()) -> StrangerTest {
        StrangerTest
    }
}

/// Scores the participants and also ranks a fixed bystander that sat the match out.
#[derive(Debug)]
pub(crate) struct BystanderTestFactory {
    bystander: CandidateId,
}

impl BystanderTestFactory {
    pub(crate) fn new(bystander: CandidateId) -> Self {
        Self { bystander }
    }
}

pub(crate) struct BystanderTest {
    bystander: CandidateId,
}

impl CandidateTest<MockCandidate> for BystanderTest {
    fn run(
        self,
        candidates: &[Arc<MockCandidate>],
    ) -> Result<CandidateTestResult, EvaluationError> {
        let mut ranks: Vec<CandidateRank> = candidates
            .iter()
            .map(|candidate| CandidateRank {
                candidate_id: candidate.id(),
                score: candidate.next_move(&()),
            })
            .collect();
        if ranks.iter().all(|rank| rank.candidate_id != self.bystander) {
            ranks.push(CandidateRank {
                candidate_id: self.bystander,
                score: 100.0,
            });
        }
        Ok(CandidateTestResult::new(ranks))
    }
}

impl CandidateTestFactory<MockCandidate> for BystanderTestFactory {
    type Config = ();
    type Test = BystanderTest;

    fn create_test_config(&self, _population_id: PopulationId) {}

    fn create_test(&self, _config: &()) -> BystanderTest {
        BystanderTest {
            bystander: self.bystander,
        }
    }
}

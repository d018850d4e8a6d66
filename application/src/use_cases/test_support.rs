//! In-memory repositories shared by the use case tests.

use crate::ports::repositories::{
    AnnotationRuleRepository, ApiError, BallotRepository, Repositories,
    VotingConfigurationRepository,
};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use consensus_domain::{
    AnnotationRule, AnnotationRulePatch, Ballot, BallotId, BallotPatch, ConfigurationId,
    FinalResult, ProjectId, RuleId, RuleOutcome, VotingConfiguration, VotingConfigurationPatch,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub(crate) const PROJECT: ProjectId = ProjectId::new(1);

pub(crate) fn day(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap()
}

#[derive(Default)]
struct State {
    next_id: u64,
    rules: BTreeMap<RuleId, AnnotationRule>,
    configurations: BTreeMap<ConfigurationId, VotingConfiguration>,
    ballots: BTreeMap<BallotId, Ballot>,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Backend stand-in that stores everything in memory and counts calls.
#[derive(Default)]
pub(crate) struct InMemoryBackend {
    state: Mutex<State>,
    calls: AtomicUsize,
}

impl InMemoryBackend {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn repositories(self: &Arc<Self>) -> Repositories {
        Repositories::new(self.clone(), self.clone(), self.clone())
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    /// Store a configuration with the given id, window from day 1 to day 10.
    pub(crate) fn seed_configuration(
        &self,
        id: u64,
        voting_threshold: u32,
        percentage_threshold: f64,
    ) -> VotingConfiguration {
        let mut config = VotingConfiguration::create(
            PROJECT,
            voting_threshold,
            percentage_threshold,
            None,
            day(1),
            day(10),
        )
        .unwrap();
        config.id = ConfigurationId::new(id);
        let mut state = self.state.lock().unwrap();
        state.next_id = state.next_id.max(id);
        state.configurations.insert(config.id, config.clone());
        config
    }

    pub(crate) fn seed_rule(&self, id: u64, configuration: u64) -> AnnotationRule {
        let mut rule = AnnotationRule::create(
            PROJECT,
            format!("R{}", id),
            "Rule description",
            ConfigurationId::new(configuration),
        )
        .unwrap();
        rule.id = RuleId::new(id);
        let mut state = self.state.lock().unwrap();
        state.next_id = state.next_id.max(id);
        state.rules.insert(rule.id, rule.clone());
        rule
    }

    pub(crate) fn set_closed(&self, id: u64) {
        let mut state = self.state.lock().unwrap();
        if let Some(config) = state.configurations.get_mut(&ConfigurationId::new(id)) {
            config.is_closed = true;
        }
    }

    pub(crate) fn set_finalized(&self, id: u64, result: FinalResult) {
        let mut state = self.state.lock().unwrap();
        if let Some(rule) = state.rules.get_mut(&RuleId::new(id)) {
            *rule = rule.with_outcome(result);
        }
    }

    /// Simulate a concurrent writer advancing the stored version.
    pub(crate) fn bump_version(&self, id: u64) {
        let mut state = self.state.lock().unwrap();
        if let Some(config) = state.configurations.get_mut(&ConfigurationId::new(id)) {
            config.version += 1;
        }
    }

    pub(crate) fn stored_configuration(&self, id: u64) -> VotingConfiguration {
        self.state.lock().unwrap().configurations[&ConfigurationId::new(id)].clone()
    }

    pub(crate) fn stored_rule(&self, id: u64) -> AnnotationRule {
        self.state.lock().unwrap().rules[&RuleId::new(id)].clone()
    }

    pub(crate) fn ballots_of(&self, rule: u64) -> Vec<Ballot> {
        self.state
            .lock()
            .unwrap()
            .ballots
            .values()
            .filter(|b| b.annotation_rule == RuleId::new(rule))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AnnotationRuleRepository for InMemoryBackend {
    async fn create(
        &self,
        _project: ProjectId,
        rule: &AnnotationRule,
    ) -> Result<AnnotationRule, ApiError> {
        self.record_call();
        let mut state = self.state.lock().unwrap();
        let mut stored = rule.clone();
        stored.id = RuleId::new(state.next_id());
        state.rules.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn list(&self, project: ProjectId) -> Result<Vec<AnnotationRule>, ApiError> {
        self.record_call();
        let state = self.state.lock().unwrap();
        Ok(state
            .rules
            .values()
            .filter(|r| r.project == project)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, _project: ProjectId, id: RuleId) -> Result<AnnotationRule, ApiError> {
        self.record_call();
        let state = self.state.lock().unwrap();
        state
            .rules
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("annotation rule {}", id)))
    }

    async fn update(
        &self,
        _project: ProjectId,
        id: RuleId,
        patch: &AnnotationRulePatch,
    ) -> Result<AnnotationRule, ApiError> {
        self.record_call();
        let mut state = self.state.lock().unwrap();
        let rule = state
            .rules
            .get_mut(&id)
            .ok_or_else(|| ApiError::NotFound(format!("annotation rule {}", id)))?;
        *rule = patch.apply_to(rule);
        Ok(rule.clone())
    }

    async fn record_outcome(
        &self,
        _project: ProjectId,
        id: RuleId,
        outcome: &RuleOutcome,
    ) -> Result<AnnotationRule, ApiError> {
        self.record_call();
        let mut state = self.state.lock().unwrap();
        let rule = state
            .rules
            .get_mut(&id)
            .ok_or_else(|| ApiError::NotFound(format!("annotation rule {}", id)))?;
        rule.final_result = outcome.final_result;
        rule.is_finalized = outcome.is_finalized;
        Ok(rule.clone())
    }

    async fn delete(&self, _project: ProjectId, id: RuleId) -> Result<AnnotationRule, ApiError> {
        self.record_call();
        let mut state = self.state.lock().unwrap();
        state
            .rules
            .remove(&id)
            .ok_or_else(|| ApiError::NotFound(format!("annotation rule {}", id)))
    }
}

#[async_trait]
impl VotingConfigurationRepository for InMemoryBackend {
    async fn create(
        &self,
        _project: ProjectId,
        config: &VotingConfiguration,
    ) -> Result<VotingConfiguration, ApiError> {
        self.record_call();
        let mut state = self.state.lock().unwrap();
        let mut stored = config.clone();
        stored.id = ConfigurationId::new(state.next_id());
        state.configurations.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn list(&self, project: ProjectId) -> Result<Vec<VotingConfiguration>, ApiError> {
        self.record_call();
        let state = self.state.lock().unwrap();
        Ok(state
            .configurations
            .values()
            .filter(|c| c.project == project)
            .cloned()
            .collect())
    }

    async fn find_by_id(
        &self,
        _project: ProjectId,
        id: ConfigurationId,
    ) -> Result<VotingConfiguration, ApiError> {
        self.record_call();
        let state = self.state.lock().unwrap();
        state
            .configurations
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("voting configuration {}", id)))
    }

    async fn update(
        &self,
        _project: ProjectId,
        id: ConfigurationId,
        patch: &VotingConfigurationPatch,
    ) -> Result<VotingConfiguration, ApiError> {
        self.record_call();
        let mut state = self.state.lock().unwrap();
        let config = state
            .configurations
            .get_mut(&id)
            .ok_or_else(|| ApiError::NotFound(format!("voting configuration {}", id)))?;
        if let Some(v) = patch.voting_threshold {
            config.voting_threshold = v;
        }
        if let Some(v) = patch.percentage_threshold {
            config.percentage_threshold = v;
        }
        if let Some(v) = patch.begin_date {
            config.begin_date = v;
        }
        if let Some(v) = patch.end_date {
            config.end_date = v;
        }
        if let Some(v) = patch.is_closed {
            config.is_closed = v;
        }
        if let Some(v) = patch.version {
            config.version = v;
        }
        Ok(config.clone())
    }
}

#[async_trait]
impl BallotRepository for InMemoryBackend {
    async fn create(&self, _project: ProjectId, ballot: &Ballot) -> Result<Ballot, ApiError> {
        self.record_call();
        let mut state = self.state.lock().unwrap();
        let mut stored = ballot.clone();
        stored.id = BallotId::new(state.next_id());
        state.ballots.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn list(&self, _project: ProjectId, rule: RuleId) -> Result<Vec<Ballot>, ApiError> {
        self.record_call();
        let state = self.state.lock().unwrap();
        Ok(state
            .ballots
            .values()
            .filter(|b| b.annotation_rule == rule)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, _project: ProjectId, id: BallotId) -> Result<Ballot, ApiError> {
        self.record_call();
        let state = self.state.lock().unwrap();
        state
            .ballots
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("ballot {}", id)))
    }

    async fn update(
        &self,
        _project: ProjectId,
        id: BallotId,
        patch: &BallotPatch,
    ) -> Result<Ballot, ApiError> {
        self.record_call();
        let mut state = self.state.lock().unwrap();
        let ballot = state
            .ballots
            .get_mut(&id)
            .ok_or_else(|| ApiError::NotFound(format!("ballot {}", id)))?;
        *ballot = patch.apply_to(ballot);
        Ok(ballot.clone())
    }

    async fn delete(&self, _project: ProjectId, id: BallotId) -> Result<(), ApiError> {
        self.record_call();
        let mut state = self.state.lock().unwrap();
        state
            .ballots
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| ApiError::NotFound(format!("ballot {}", id)))
    }
}

//! Repository adapters backed by the REST API

use super::client::ApiClient;
use async_trait::async_trait;
use consensus_application::{
    AnnotationRuleRepository, ApiError, BallotRepository, Repositories,
    VotingConfigurationRepository,
};
use consensus_domain::{
    AnnotationRule, AnnotationRulePatch, Ballot, BallotId, BallotPatch, ConfigurationId,
    MemberId, ProjectId, RuleId, RuleOutcome, VotingConfiguration, VotingConfigurationPatch,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Backend routes
pub(crate) mod paths {
    use consensus_domain::{BallotId, ConfigurationId, ProjectId, RuleId};

    pub fn rule_create(project: ProjectId) -> String {
        format!("/projects/{}/annotation-rules/create", project)
    }

    pub fn rule_list(project: ProjectId) -> String {
        format!("/projects/{}/annotation-rules/list", project)
    }

    pub fn rule(project: ProjectId, id: RuleId) -> String {
        format!("/projects/{}/annotation-rules/{}", project, id)
    }

    pub fn configuration_create(project: ProjectId) -> String {
        format!("/projects/{}/rules/create", project)
    }

    pub fn configuration_list(project: ProjectId) -> String {
        format!("/projects/{}/rules/list", project)
    }

    pub fn configuration(project: ProjectId, id: ConfigurationId) -> String {
        format!("/projects/{}/voting-configurations/{}", project, id)
    }

    pub fn ballot_create(project: ProjectId) -> String {
        format!("/projects/{}/annotation-rule-answers/create", project)
    }

    /// Filtered with `?annotation_rule={id}`
    pub fn ballot_list(project: ProjectId) -> String {
        format!("/projects/{}/annotation-rule-answers", project)
    }

    pub fn ballot(project: ProjectId, id: BallotId) -> String {
        format!("/projects/{}/annotation-rule-answers/{}", project, id)
    }
}

/// List endpoints answer either with a bare array or with a paginated page.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListResponse<T> {
    Plain(Vec<T>),
    Paged { results: Vec<T> },
}

impl<T> ListResponse<T> {
    fn into_items(self) -> Vec<T> {
        match self {
            ListResponse::Plain(items) | ListResponse::Paged { results: items } => items,
        }
    }
}

/// Replace the route in a 404 with the entity that was looked up.
fn not_found_as(what: impl FnOnce() -> String) -> impl FnOnce(ApiError) -> ApiError {
    move |err| match err {
        ApiError::NotFound(_) => ApiError::NotFound(what()),
        other => other,
    }
}

#[derive(Serialize)]
struct NewRule<'a> {
    project: ProjectId,
    name: &'a str,
    description: &'a str,
    voting_configuration: ConfigurationId,
}

#[derive(Serialize)]
struct NewConfiguration {
    project: ProjectId,
    voting_threshold: u32,
    percentage_threshold: f64,
    created_by: Option<MemberId>,
    begin_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    is_closed: bool,
    version: u64,
}

#[derive(Serialize)]
struct NewBallot {
    annotation_rule: RuleId,
    member: MemberId,
    answer: bool,
}

/// Annotation rules over REST
pub struct ApiAnnotationRuleRepository {
    client: ApiClient,
}

impl ApiAnnotationRuleRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AnnotationRuleRepository for ApiAnnotationRuleRepository {
    async fn create(
        &self,
        project: ProjectId,
        rule: &AnnotationRule,
    ) -> Result<AnnotationRule, ApiError> {
        let body = NewRule {
            project,
            name: &rule.name,
            description: &rule.description,
            voting_configuration: rule.voting_configuration,
        };
        self.client.post(&paths::rule_create(project), &body).await
    }

    async fn list(&self, project: ProjectId) -> Result<Vec<AnnotationRule>, ApiError> {
        let page: ListResponse<AnnotationRule> = self
            .client
            .get(&paths::rule_list(project))
            .await
            .map_err(not_found_as(|| format!("project {}", project)))?;
        Ok(page.into_items())
    }

    async fn find_by_id(&self, project: ProjectId, id: RuleId) -> Result<AnnotationRule, ApiError> {
        self.client
            .get(&paths::rule(project, id))
            .await
            .map_err(not_found_as(|| format!("annotation rule {}", id)))
    }

    async fn update(
        &self,
        project: ProjectId,
        id: RuleId,
        patch: &AnnotationRulePatch,
    ) -> Result<AnnotationRule, ApiError> {
        self.client
            .put(&paths::rule(project, id), patch)
            .await
            .map_err(not_found_as(|| format!("annotation rule {}", id)))
    }

    async fn record_outcome(
        &self,
        project: ProjectId,
        id: RuleId,
        outcome: &RuleOutcome,
    ) -> Result<AnnotationRule, ApiError> {
        self.client
            .put(&paths::rule(project, id), outcome)
            .await
            .map_err(not_found_as(|| format!("annotation rule {}", id)))
    }

    /// The backend answers DELETE without a body, so the rule is read first.
    async fn delete(&self, project: ProjectId, id: RuleId) -> Result<AnnotationRule, ApiError> {
        let path = paths::rule(project, id);
        let label = || format!("annotation rule {}", id);
        let rule: AnnotationRule = self.client.get(&path).await.map_err(not_found_as(label))?;
        self.client.delete(&path).await.map_err(not_found_as(label))?;
        Ok(rule)
    }
}

/// Voting configurations over REST
pub struct ApiVotingConfigurationRepository {
    client: ApiClient,
}

impl ApiVotingConfigurationRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VotingConfigurationRepository for ApiVotingConfigurationRepository {
    async fn create(
        &self,
        project: ProjectId,
        config: &VotingConfiguration,
    ) -> Result<VotingConfiguration, ApiError> {
        let body = NewConfiguration {
            project,
            voting_threshold: config.voting_threshold,
            percentage_threshold: config.percentage_threshold,
            created_by: config.created_by,
            begin_date: config.begin_date,
            end_date: config.end_date,
            is_closed: config.is_closed,
            version: config.version,
        };
        self.client
            .post(&paths::configuration_create(project), &body)
            .await
    }

    async fn list(&self, project: ProjectId) -> Result<Vec<VotingConfiguration>, ApiError> {
        let page: ListResponse<VotingConfiguration> = self
            .client
            .get(&paths::configuration_list(project))
            .await
            .map_err(not_found_as(|| format!("project {}", project)))?;
        Ok(page.into_items())
    }

    async fn find_by_id(
        &self,
        project: ProjectId,
        id: ConfigurationId,
    ) -> Result<VotingConfiguration, ApiError> {
        self.client
            .get(&paths::configuration(project, id))
            .await
            .map_err(not_found_as(|| format!("voting configuration {}", id)))
    }

    async fn update(
        &self,
        project: ProjectId,
        id: ConfigurationId,
        patch: &VotingConfigurationPatch,
    ) -> Result<VotingConfiguration, ApiError> {
        self.client
            .put(&paths::configuration(project, id), patch)
            .await
            .map_err(not_found_as(|| format!("voting configuration {}", id)))
    }
}

/// Ballots (annotation rule answers) over REST
pub struct ApiBallotRepository {
    client: ApiClient,
}

impl ApiBallotRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BallotRepository for ApiBallotRepository {
    async fn create(&self, project: ProjectId, ballot: &Ballot) -> Result<Ballot, ApiError> {
        let body = NewBallot {
            annotation_rule: ballot.annotation_rule,
            member: ballot.member,
            answer: ballot.answer,
        };
        self.client.post(&paths::ballot_create(project), &body).await
    }

    async fn list(&self, project: ProjectId, rule: RuleId) -> Result<Vec<Ballot>, ApiError> {
        let page: ListResponse<Ballot> = self
            .client
            .get_with_query(&paths::ballot_list(project), &[("annotation_rule", rule.get())])
            .await
            .map_err(not_found_as(|| format!("annotation rule {}", rule)))?;
        // Older backends ignore the filter
        Ok(page
            .into_items()
            .into_iter()
            .filter(|b| b.annotation_rule == rule)
            .collect())
    }

    async fn find_by_id(&self, project: ProjectId, id: BallotId) -> Result<Ballot, ApiError> {
        self.client
            .get(&paths::ballot(project, id))
            .await
            .map_err(not_found_as(|| format!("ballot {}", id)))
    }

    async fn update(
        &self,
        project: ProjectId,
        id: BallotId,
        patch: &BallotPatch,
    ) -> Result<Ballot, ApiError> {
        self.client
            .put(&paths::ballot(project, id), patch)
            .await
            .map_err(not_found_as(|| format!("ballot {}", id)))
    }

    async fn delete(&self, project: ProjectId, id: BallotId) -> Result<(), ApiError> {
        self.client
            .delete(&paths::ballot(project, id))
            .await
            .map_err(not_found_as(|| format!("ballot {}", id)))
    }
}

/// Build the REST-backed repositories sharing one client.
pub fn api_repositories(client: ApiClient) -> Repositories {
    Repositories::new(
        Arc::new(ApiAnnotationRuleRepository::new(client.clone())),
        Arc::new(ApiVotingConfigurationRepository::new(client.clone())),
        Arc::new(ApiBallotRepository::new(client)),
    )
}

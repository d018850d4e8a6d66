//! Default project and member (`[project]` section)

use consensus_domain::{MemberId, ProjectId};
use serde::{Deserialize, Serialize};

/// Raw project configuration from TOML
///
/// Both values can be overridden per command on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProjectConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ProjectId>,
    /// Member casting ballots and listing unvoted rules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<MemberId>,
}

//! Annotation rule voting domain
//!
//! Members vote yes/no on annotation rules. Each rule belongs to a voting
//! round ([`VotingConfiguration`]) that fixes the thresholds and the window.
//! Once the round closes, ballots are tallied and the rule is finalized.
//!
//! ```text
//! ┌──────────────────────┐ 1      1 ┌─────────────────────┐
//! │  VotingConfiguration │◀─────────│   AnnotationRule    │
//! └──────────────────────┘          └─────────────────────┘
//!                                              ▲ 1
//!                                              │
//!                                              │ N
//!                                   ┌─────────────────────┐ N      1 ┌────────┐
//!                                   │       Ballot        │─────────▶│ Member │
//!                                   └─────────────────────┘          └────────┘
//! ```

pub mod ballot;
pub mod configuration;
pub mod lifecycle;
pub mod rule;
pub mod tally;
pub mod threshold;
pub mod unvoted;

pub use ballot::{Ballot, BallotPatch};
pub use configuration::{VotingConfiguration, VotingConfigurationPatch, next_round_version};
pub use lifecycle::{FinalizationDecision, RuleState, decide};
pub use rule::{AnnotationRule, AnnotationRulePatch, FinalResult, RuleOutcome};
pub use tally::Tally;
pub use threshold::ApprovalThreshold;
pub use unvoted::UnvotedRules;

pub mod call;
pub mod contact;
pub mod insight;
pub mod spam_rule;
pub mod stats;
pub mod summary;
pub mod transcript;

pub use call::{Call, CallAction, CallStatus, CallType, CallUpdate, NewCall, TranscriptStatus};
pub use contact::{Contact, ContactUpdate, NewContact};
pub use insight::{Insight, InsightType, NewInsight};
pub use spam_rule::{NewSpamRule, SpamRule, SpamRuleUpdate};
pub use stats::CallStats;
pub use summary::{CallIntent, CallSummary, NewCallSummary, Sentiment, SummaryUpdate, Urgency};
pub use transcript::{
    join_messages, NewTranscript, SpeakerRole, Transcript, TranscriptMessage, TranscriptUpdate,
};

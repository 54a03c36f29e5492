//! Topic records as the ledger stores them, and drafts validated before creation.

use crate::error::VoteError;

pub type TopicId = u64;

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 10;

/// Who may decrypt the aggregate once results are published.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    /// Only the topic owner.
    Private,
    /// Anyone.
    #[default]
    Public,
}

/// A poll as held by the ledger. Only `published` ever changes, and only on
/// the ledger side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topic<A> {
    pub id: TopicId,
    pub name: String,
    pub details: String,
    pub options: Vec<String>,
    pub open_at: u64,
    pub close_at: u64,
    pub published: bool,
    pub owner: A,
    pub visibility: Visibility,
}

impl<A> Topic<A> {
    pub fn option_count(&self) -> usize {
        self.options.len()
    }
}

/// Parameters for a topic that does not exist yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopicDraft {
    pub name: String,
    pub details: String,
    pub options: Vec<String>,
    pub open_at: u64,
    pub close_at: u64,
    pub visibility: Visibility,
}

impl TopicDraft {
    pub fn new<I, S>(name: impl Into<String>, options: I, open_at: u64, close_at: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            details: String::new(),
            options: options.into_iter().map(Into::into).collect(),
            open_at,
            close_at,
            visibility: Visibility::default(),
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Trimmed copy of the draft, or the first rule it breaks.
    pub fn validate(&self) -> Result<TopicDraft, VoteError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(VoteError::Validation("topic name is required".into()));
        }

        let options: Vec<String> = self.options.iter().map(|o| o.trim().to_owned()).collect();
        if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&options.len()) {
            return Err(VoteError::Validation(format!(
                "a topic needs between {MIN_OPTIONS} and {MAX_OPTIONS} options, got {}",
                options.len()
            )));
        }
        if let Some(position) = options.iter().position(String::is_empty) {
            return Err(VoteError::Validation(format!(
                "option {position} has an empty label"
            )));
        }

        if self.open_at >= self.close_at {
            return Err(VoteError::Validation(format!(
                "voting window is empty: opens at {} but closes at {}",
                self.open_at, self.close_at
            )));
        }

        Ok(TopicDraft {
            name: name.to_owned(),
            details: self.details.trim().to_owned(),
            options,
            open_at: self.open_at,
            close_at: self.close_at,
            visibility: self.visibility,
        })
    }
}

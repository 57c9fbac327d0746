use crate::error::ValidationError;
use crate::fallback;
use crate::forms::{RecommendationFields, RegistrationFields};
use crate::types::*;
use chrono::Utc;

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_TITLE: &str = "Farming Assistant";

/// A single conversation with the advisory backend
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    next_message_id: MessageId,
}

impl Default for ChatSession {
    fn default() -> Self {
        let mut session = Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
            next_message_id: 1,
        };
        session.append(
            Role::Assistant,
            fallback::GREETING.to_string(),
            Some(fallback::greeting_metadata()),
        );
        session
    }
}

impl ChatSession {
    /// Append a message and return its freshly assigned id.
    pub fn append(
        &mut self,
        role: Role,
        content: String,
        metadata: Option<MessageMetadata>,
    ) -> MessageId {
        let id = self.next_message_id;
        self.next_message_id += 1;
        self.messages.push(Message {
            id,
            role,
            content,
            timestamp: Utc::now(),
            metadata,
        });
        id
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn count_role(&self, role: Role) -> usize {
        self.messages.iter().filter(|m| m.role == role).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatStatus {
    #[default]
    Idle,
    /// `query` is the id of the user message waiting for its answer.
    AwaitingResponse { query: MessageId },
}

/// Where the currently shown recommendations came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultSource {
    Backend,
    SampleFallback { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationResults {
    pub source: ResultSource,
    pub crops: Vec<CropRecommendation>,
}

impl RecommendationResults {
    pub fn is_degraded(&self) -> bool {
        matches!(self.source, ResultSource::SampleFallback { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecommendationForm {
    pub fields: RecommendationFields,
    pub loading: bool,
    pub results: Option<RecommendationResults>,
    pub error: Option<ValidationError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistrationStatus {
    #[default]
    Editing,
    Registering,
    SigningIn,
    SignedIn,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegistrationForm {
    pub fields: RegistrationFields,
    pub status: RegistrationStatus,
    pub error: Option<ValidationError>,
}

impl RegistrationForm {
    pub fn is_busy(&self) -> bool {
        matches!(
            self.status,
            RegistrationStatus::Registering | RegistrationStatus::SigningIn
        )
    }
}

/// Everything a front-end needs to render the advisory pages
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub session: ChatSession,
    pub chat_status: ChatStatus,

    /// Current chat input box contents
    pub input: String,

    /// Language sent along with every query
    pub language: String,

    pub recommendation: RecommendationForm,
    pub registration: RegistrationForm,

    /// Toasts waiting to be shown, oldest first
    pub notifications: Vec<Notification>,
    next_notification_id: u64,

    /// Route a front-end should navigate to, if any
    pub redirect: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            session: ChatSession::default(),
            chat_status: ChatStatus::Idle,
            input: String::new(),
            language: DEFAULT_LANGUAGE.to_string(),
            recommendation: RecommendationForm::default(),
            registration: RegistrationForm::default(),
            notifications: Vec::new(),
            next_notification_id: 1,
            redirect: None,
        }
    }
}

impl AppState {
    /// While true the chat input is disabled.
    pub fn is_awaiting_response(&self) -> bool {
        matches!(self.chat_status, ChatStatus::AwaitingResponse { .. })
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        let id = self.next_notification_id;
        self.next_notification_id += 1;
        self.notifications.push(Notification {
            id,
            level,
            message: message.into(),
        });
    }

    pub fn last_notification(&self) -> Option<&Notification> {
        self.notifications.last()
    }
}

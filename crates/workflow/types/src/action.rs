//! Actions: what the system does when a workflow reaches a step

use crate::RoleId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Action sub-type tag
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    #[default]
    Email,
    Notification,
    Task,
    Message,
    Api,
    Update,
}

/// Action configuration, discriminated by `actionType`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "actionType", content = "config", rename_all = "lowercase")]
pub enum ActionConfig {
    Email(EmailAction),
    Notification(NotificationAction),
    Task(TaskAction),
    Message(MessageAction),
    Api(ApiAction),
    Update(UpdateAction),
}

impl ActionConfig {
    /// Default configuration for an action sub-type
    pub fn for_type(action_type: ActionType) -> Self {
        match action_type {
            ActionType::Email => Self::Email(EmailAction::default()),
            ActionType::Notification => Self::Notification(NotificationAction::default()),
            ActionType::Task => Self::Task(TaskAction::default()),
            ActionType::Message => Self::Message(MessageAction::default()),
            ActionType::Api => Self::Api(ApiAction::default()),
            ActionType::Update => Self::Update(UpdateAction::default()),
        }
    }

    pub fn action_type(&self) -> ActionType {
        match self {
            Self::Email(_) => ActionType::Email,
            Self::Notification(_) => ActionType::Notification,
            Self::Task(_) => ActionType::Task,
            Self::Message(_) => ActionType::Message,
            Self::Api(_) => ActionType::Api,
            Self::Update(_) => ActionType::Update,
        }
    }
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self::for_type(ActionType::default())
    }
}

/// Send a templated email
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default)]
    pub recipients: Vec<String>,
}

impl EmailAction {
    pub fn with_template(template_id: impl Into<String>) -> Self {
        Self {
            template_id: Some(template_id.into()),
            ..Self::default()
        }
    }

    pub fn to(mut self, recipient: impl Into<String>) -> Self {
        self.recipients.push(recipient.into());
        self
    }
}

/// In-app notification to everyone holding one of the roles
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationAction {
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub recipient_roles: BTreeSet<RoleId>,
}

/// Open a task for a role
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAction {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_role: Option<RoleId>,
    /// Days after activation the task falls due
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_in_days: Option<u32>,
}

impl TaskAction {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn assigned_to(mut self, role: RoleId) -> Self {
        self.assignee_role = Some(role);
        self
    }

    pub fn due_in(mut self, days: u32) -> Self {
        self.due_in_days = Some(days);
        self
    }
}

/// Post a message to a channel (community board, resident portal)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageAction {
    pub channel: String,
    #[serde(default)]
    pub body: String,
}

/// HTTP method for outbound API calls
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
    Put,
    Patch,
    Delete,
}

/// Call an external endpoint
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAction {
    pub endpoint: String,
    #[serde(default)]
    pub method: HttpMethod,
}

/// Set a field on the record the workflow runs against
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAction {
    pub field: String,
    pub value: String,
}

impl UpdateAction {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_action_is_email() {
        assert_eq!(ActionConfig::default().action_type(), ActionType::Email);
    }

    #[test]
    fn test_switching_sub_type_drops_old_fields() {
        let email = ActionConfig::Email(EmailAction::with_template("late-notice").to("owner"));
        let switched = ActionConfig::for_type(ActionType::Task);
        assert_ne!(email, switched);
        assert_eq!(switched, ActionConfig::Task(TaskAction::default()));
    }

    #[test]
    fn test_serialized_shape() {
        let config = ActionConfig::Task(
            TaskAction::new("Inspect gate")
                .assigned_to(RoleId::new("manager"))
                .due_in(7),
        );
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["actionType"], "task");
        assert_eq!(json["config"]["title"], "Inspect gate");
        assert_eq!(json["config"]["assigneeRole"], "manager");
        assert_eq!(json["config"]["dueInDays"], 7);

        let api = serde_json::to_value(ActionConfig::Api(ApiAction::default())).unwrap();
        assert_eq!(api["config"]["method"], "POST");
    }
}

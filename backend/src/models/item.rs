use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::AppError;

pub const DEFAULT_TITLE: &str = "Untitled";

/// Characters of content used as the reminder body when an item has no title.
const BODY_PREVIEW_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    #[default]
    Note,
    Todo,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Note => "note",
            ItemKind::Todo => "todo",
        }
    }
}

impl FromStr for ItemKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "note" => Ok(ItemKind::Note),
            "todo" => Ok(ItemKind::Todo),
            other => Err(AppError::Validation(format!("unknown item type: {other}"))),
        }
    }
}

/// How `remind_at` advances once a reminder is acknowledged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Repeat {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Weekdays,
}

impl Repeat {
    pub fn is_recurring(&self) -> bool {
        !matches!(self, Repeat::None)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Repeat::None => "none",
            Repeat::Daily => "daily",
            Repeat::Weekly => "weekly",
            Repeat::Monthly => "monthly",
            Repeat::Weekdays => "weekdays",
        }
    }
}

impl fmt::Display for Repeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Repeat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Repeat::None),
            "daily" => Ok(Repeat::Daily),
            "weekly" => Ok(Repeat::Weekly),
            "monthly" => Ok(Repeat::Monthly),
            "weekdays" => Ok(Repeat::Weekdays),
            other => Err(AppError::Validation(format!("unknown repeat rule: {other}"))),
        }
    }
}

/// Where an item sits in the reminder lifecycle at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderState {
    /// No reminder set.
    Idle,
    /// Reminder set and still in the future.
    Armed,
    /// Reminder due and not yet fired for this occurrence.
    Due,
    /// Reminder fired, waiting for acknowledgement.
    Fired,
    /// Completed; reminder fields are kept but ignored.
    Terminal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(rename = "type", default)]
    pub kind: ItemKind,
    #[serde(default)]
    pub remind_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub repeat: Repeat,
    #[serde(default)]
    pub last_reminded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
}

impl Item {
    pub fn new(req: NewItemRequest, now: DateTime<Utc>) -> Self {
        let title = req
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        Self {
            id: Uuid::new_v4().to_string(),
            title,
            content: req.content.unwrap_or_default(),
            images: req.images.unwrap_or_default(),
            kind: req.kind.unwrap_or_default(),
            remind_at: req.remind_at,
            repeat: req.repeat.unwrap_or_default(),
            last_reminded_at: None,
            created_at: now,
            updated_at: now,
            completed: false,
        }
    }

    pub fn reminder_state(&self, now: DateTime<Utc>) -> ReminderState {
        if self.completed {
            return ReminderState::Terminal;
        }
        let Some(remind_at) = self.remind_at else {
            return ReminderState::Idle;
        };
        if remind_at > now {
            return ReminderState::Armed;
        }
        match self.last_reminded_at {
            Some(last) if last >= remind_at => ReminderState::Fired,
            _ => ReminderState::Due,
        }
    }

    /// Text shown in the reminder notification: the title, or a content preview.
    pub fn reminder_body(&self) -> String {
        if self.title.trim().is_empty() {
            self.content.chars().take(BODY_PREVIEW_CHARS).collect()
        } else {
            self.title.clone()
        }
    }

    pub fn apply(&mut self, req: UpdateItemRequest, now: DateTime<Utc>) {
        if let Some(title) = req.title {
            self.title = title;
        }
        if let Some(content) = req.content {
            self.content = content;
        }
        if let Some(images) = req.images {
            self.images = images;
        }
        if let Some(kind) = req.kind {
            self.kind = kind;
        }
        if let Some(remind_at) = req.remind_at {
            self.remind_at = remind_at;
        }
        if let Some(repeat) = req.repeat {
            self.repeat = repeat;
        }
        if let Some(completed) = req.completed {
            self.completed = completed;
        }
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItemRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub images: Option<Vec<String>>,
    #[serde(rename = "type")]
    pub kind: Option<ItemKind>,
    pub remind_at: Option<DateTime<Utc>>,
    pub repeat: Option<Repeat>,
}

/// Partial update. `remindAt: null` clears the reminder, an absent key leaves it alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub images: Option<Vec<String>>,
    #[serde(rename = "type")]
    pub kind: Option<ItemKind>,
    #[serde(default, deserialize_with = "double_option")]
    pub remind_at: Option<Option<DateTime<Utc>>>,
    pub repeat: Option<Repeat>,
    pub completed: Option<bool>,
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

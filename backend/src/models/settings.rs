use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shortcuts {
    pub toggle_window: String,
    pub new_todo: String,
    pub new_note: String,
}

impl Default for Shortcuts {
    fn default() -> Self {
        Self {
            toggle_window: "CommandOrControl+Alt+J".to_string(),
            new_todo: "CommandOrControl+Alt+N".to_string(),
            new_note: "CommandOrControl+Alt+M".to_string(),
        }
    }
}

impl Shortcuts {
    fn validate(&self) -> Result<(), AppError> {
        let accelerators = [
            ("toggleWindow", &self.toggle_window),
            ("newTodo", &self.new_todo),
            ("newNote", &self.new_note),
        ];
        for (name, accelerator) in accelerators {
            if accelerator.trim().is_empty() {
                return Err(AppError::Validation(format!("shortcut {name} is empty")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub shortcuts: Shortcuts,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub auto_start: bool,
}

fn default_theme() -> String {
    "light".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            shortcuts: Shortcuts::default(),
            theme: default_theme(),
            auto_start: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub shortcuts: Option<Shortcuts>,
    pub theme: Option<String>,
    pub auto_start: Option<bool>,
}

impl Settings {
    /// Shallow merge: each provided top-level key replaces the stored one.
    pub fn merge(&mut self, req: UpdateSettingsRequest) -> Result<(), AppError> {
        if let Some(shortcuts) = req.shortcuts {
            shortcuts.validate()?;
            self.shortcuts = shortcuts;
        }
        if let Some(theme) = req.theme {
            self.theme = theme;
        }
        if let Some(auto_start) = req.auto_start {
            self.auto_start = auto_start;
        }
        Ok(())
    }
}

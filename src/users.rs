//! Telegram users known to the bot.
//!
//! Field limits follow the Bot API `ChatFullInfo` object:
//! <https://core.telegram.org/bots/api#chatfullinfo>

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use teloxide::types::UserId;

use crate::error::{RentalError, RentalResult};
use crate::utils::validation::{
    validate_language_code, validate_profile_field, validate_telegram_user_id, validate_username,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTelegramUser {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: Option<String>,
    pub bio: String,
    pub language_code: String,
    pub is_premium: bool,
}

impl NewTelegramUser {
    pub fn new(id: i64, first_name: impl Into<String>) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: String::new(),
            username: None,
            bio: String::new(),
            language_code: "en".to_string(),
            is_premium: false,
        }
    }

    pub fn validate(&self) -> RentalResult<()> {
        let invalid = |e: anyhow::Error| RentalError::validation(e.to_string());

        validate_telegram_user_id(self.id).map_err(invalid)?;
        if self.first_name.trim().is_empty() {
            return Err(RentalError::validation("First name cannot be empty"));
        }
        validate_profile_field("First name", &self.first_name, 64).map_err(invalid)?;
        validate_profile_field("Last name", &self.last_name, 64).map_err(invalid)?;
        validate_profile_field("Bio", &self.bio, 70).map_err(invalid)?;
        validate_language_code(&self.language_code).map_err(invalid)?;
        if let Some(username) = &self.username {
            validate_username(username).map_err(invalid)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: Option<String>,
    pub bio: String,
    pub language_code: String,
    pub is_premium: bool,
    pub registered_at: DateTime<Utc>,
}

impl TelegramUser {
    pub fn new(fields: NewTelegramUser) -> RentalResult<Self> {
        fields.validate()?;
        Ok(Self {
            id: fields.id,
            first_name: fields.first_name,
            last_name: fields.last_name,
            username: fields.username,
            bio: fields.bio,
            language_code: fields.language_code,
            is_premium: fields.is_premium,
            registered_at: Utc::now(),
        })
    }

    pub fn display_name(&self) -> String {
        if self.last_name.is_empty() {
            self.first_name.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }

    /// `tg://user` deep link that opens the user's profile.
    pub fn profile_url(&self) -> String {
        UserId(self.id.unsigned_abs()).url().to_string()
    }
}

/// One size of a user's profile picture.
///
/// <https://core.telegram.org/bots/api#photosize>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramUserProfilePhoto {
    pub id: Option<i64>,
    pub user_id: i64,
    pub file_id: String,
    pub file_unique_id: String,
    pub width: u32,
    pub height: u32,
    /// Bytes.
    pub file_size: Option<u32>,
}

impl TelegramUserProfilePhoto {
    pub fn new(
        user_id: i64,
        file_id: impl Into<String>,
        file_unique_id: impl Into<String>,
        width: u32,
        height: u32,
    ) -> RentalResult<Self> {
        let file_id = file_id.into();
        let file_unique_id = file_unique_id.into();
        if file_id.is_empty() || file_unique_id.is_empty() {
            return Err(RentalError::validation("Photo file identifiers cannot be empty"));
        }

        Ok(Self {
            id: None,
            user_id,
            file_id,
            file_unique_id,
            width,
            height,
            file_size: None,
        })
    }
}

// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Operator notifications.

use crate::error::BotError;
use async_trait::async_trait;
use teloxide::prelude::*;
use tracing::{debug, info};

/// Delivers human-readable status messages to an operator channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), BotError>;
}

/// Telegram notifier. Silently disabled when the token or chat id is missing.
#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Option<Bot>,
    chat_id: Option<ChatId>,
}

impl TelegramNotifier {
    pub fn new(token: Option<String>, chat_id: Option<String>) -> Self {
        info!(
            "📱 Initializing Telegram: token={}, chat_id={}",
            token.as_ref().map(|_| "SET").unwrap_or("NONE"),
            chat_id.as_ref().map(|_| "SET").unwrap_or("NONE")
        );

        let bot = token.map(Bot::new);
        // An unparseable chat id disables delivery instead of aborting startup.
        let chat_id = chat_id.and_then(|id| id.trim().parse::<i64>().ok()).map(ChatId);

        Self { bot, chat_id }
    }

    pub fn is_enabled(&self) -> bool {
        self.bot.is_some() && self.chat_id.is_some()
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, message: &str) -> Result<(), BotError> {
        let (Some(bot), Some(chat_id)) = (&self.bot, &self.chat_id) else {
            debug!("Telegram disabled, dropping message");
            return Ok(());
        };

        bot.send_message(*chat_id, message)
            .await
            .map_err(|e| BotError::Notify(e.to_string()))?;
        info!("📤 Sent Telegram message");
        Ok(())
    }
}

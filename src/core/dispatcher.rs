use crate::domain::model::{
    BotCommand, InlineKeyboardButton, InlineKeyboardMarkup, OutgoingMessage, Update,
};
use crate::domain::ports::{ConfigProvider, UpdateHandler};
use crate::utils::error::Result;
use async_trait::async_trait;

// 回覆文案保持俄文原樣，這是給 FENIX 社群用戶看的
pub const GREETING_TEXT: &str =
    "Привет! Я бот клана ФЕНИКС.\nНажми кнопку, чтобы пройти регистрацию:";
pub const REGISTRATION_TEXT: &str = "Открываю форму регистрации:";
pub const REGISTRATION_WORD_TEXT: &str = "Регистрация здесь:";
pub const HELP_TEXT: &str = "Доступные команды:\n\
                             /start — приветствие и кнопка регистрации\n\
                             /registration — ссылка на форму регистрации\n\
                             /ping — проверка доступности бота";
pub const PING_REPLY: &str = "pong 🧡";
pub const REGISTRATION_BUTTON_LABEL: &str = "🔥 Начать регистрацию";

/// Bare words that open the registration form without a slash command.
const REGISTRATION_TRIGGER_WORDS: [&str; 2] = ["регистрация", "registration"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Registration,
    Help,
    Ping,
}

impl Command {
    /// Parses the leading bot command out of a message text. A `@botname`
    /// suffix is stripped, trailing arguments are ignored.
    pub fn parse(text: &str) -> Option<Self> {
        let first_word = text.trim().split_whitespace().next()?;
        let command = first_word.strip_prefix('/')?;
        let command = command.split('@').next().unwrap_or(command);

        match command {
            "start" => Some(Command::Start),
            "registration" => Some(Command::Registration),
            "help" => Some(Command::Help),
            "ping" => Some(Command::Ping),
            _ => None,
        }
    }
}

/// The command menu registered via `setMyCommands` at startup.
pub fn default_commands() -> Vec<BotCommand> {
    [
        ("start", "Начало и кнопка регистрации"),
        ("registration", "Ссылка на форму регистрации"),
        ("help", "Справка"),
        ("ping", "Проверка связи"),
    ]
    .into_iter()
    .map(|(command, description)| BotCommand {
        command: command.to_string(),
        description: description.to_string(),
    })
    .collect()
}

pub fn registration_keyboard(registration_url: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![vec![InlineKeyboardButton {
            text: REGISTRATION_BUTTON_LABEL.to_string(),
            url: Some(registration_url.to_string()),
        }]],
    }
}

/// Routes incoming updates to the registration flow replies.
pub struct RegistrationDispatcher<C: ConfigProvider> {
    config: C,
}

impl<C: ConfigProvider> RegistrationDispatcher<C> {
    pub fn new(config: C) -> Self {
        Self { config }
    }

    fn keyboard_reply(&self, chat_id: i64, text: &str) -> OutgoingMessage {
        OutgoingMessage::with_keyboard(
            chat_id,
            text,
            registration_keyboard(self.config.registration_url()),
        )
    }
}

#[async_trait]
impl<C: ConfigProvider> UpdateHandler for RegistrationDispatcher<C> {
    async fn handle(&self, update: &Update) -> Result<Vec<OutgoingMessage>> {
        let Some(message) = &update.message else {
            return Ok(Vec::new());
        };
        let Some(text) = &message.text else {
            return Ok(Vec::new());
        };
        let chat_id = message.chat.id;

        let replies = match Command::parse(text) {
            Some(Command::Start) => vec![self.keyboard_reply(chat_id, GREETING_TEXT)],
            Some(Command::Registration) => vec![self.keyboard_reply(chat_id, REGISTRATION_TEXT)],
            Some(Command::Help) => vec![OutgoingMessage::text(chat_id, HELP_TEXT)],
            Some(Command::Ping) => vec![OutgoingMessage::text(chat_id, PING_REPLY)],
            None => {
                // 純文字「регистрация」也要能拿到表單
                let normalized = text.trim().to_lowercase();
                if REGISTRATION_TRIGGER_WORDS.contains(&normalized.as_str()) {
                    vec![self.keyboard_reply(chat_id, REGISTRATION_WORD_TEXT)]
                } else {
                    Vec::new()
                }
            }
        };

        Ok(replies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Chat, Message};

    struct TestConfig;

    impl ConfigProvider for TestConfig {
        fn bot_token(&self) -> &str {
            "42:test"
        }

        fn registration_url(&self) -> &str {
            "https://fenix.example/register"
        }

        fn api_base_url(&self) -> &str {
            "https://api.telegram.org"
        }

        fn poll_timeout_secs(&self) -> u64 {
            30
        }
    }

    fn text_update(text: Option<&str>) -> Update {
        Update {
            update_id: 1,
            message: Some(Message {
                message_id: 10,
                from: None,
                chat: Chat {
                    id: 777,
                    chat_type: "private".to_string(),
                },
                text: text.map(str::to_string),
            }),
        }
    }

    fn handle(update: &Update) -> Vec<OutgoingMessage> {
        let dispatcher = RegistrationDispatcher::new(TestConfig);
        tokio_test::block_on(dispatcher.handle(update)).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/start@fenix_bot"), Some(Command::Start));
        assert_eq!(Command::parse("  /ping  "), Some(Command::Ping));
        assert_eq!(Command::parse("/registration now"), Some(Command::Registration));
        assert_eq!(Command::parse("/help"), Some(Command::Help));
        assert_eq!(Command::parse("/unknown"), None);
        assert_eq!(Command::parse("start"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[test]
    fn test_start_gets_greeting_with_keyboard() {
        let replies = handle(&text_update(Some("/start")));
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].chat_id, 777);
        assert_eq!(replies[0].text, GREETING_TEXT);

        let keyboard = replies[0].reply_markup.as_ref().unwrap();
        let button = &keyboard.inline_keyboard[0][0];
        assert_eq!(button.text, REGISTRATION_BUTTON_LABEL);
        assert_eq!(button.url.as_deref(), Some("https://fenix.example/register"));
    }

    #[test]
    fn test_ping_replies_without_keyboard() {
        let replies = handle(&text_update(Some("/ping")));
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].text, PING_REPLY);
        assert!(replies[0].reply_markup.is_none());
    }

    #[test]
    fn test_help_lists_commands() {
        let replies = handle(&text_update(Some("/help")));
        assert!(replies[0].text.contains("/registration"));
        assert!(replies[0].reply_markup.is_none());
    }

    #[test]
    fn test_registration_word_in_any_case() {
        for word in ["регистрация", "Регистрация", "REGISTRATION", " registration "] {
            let replies = handle(&text_update(Some(word)));
            assert_eq!(replies.len(), 1, "word {:?} should trigger", word);
            assert_eq!(replies[0].text, REGISTRATION_WORD_TEXT);
            assert!(replies[0].reply_markup.is_some());
        }
    }

    #[test]
    fn test_unrelated_text_is_ignored() {
        assert!(handle(&text_update(Some("привет"))).is_empty());
        assert!(handle(&text_update(Some("how to register?"))).is_empty());
        assert!(handle(&text_update(None)).is_empty());
        assert!(handle(&Update {
            update_id: 2,
            message: None
        })
        .is_empty());
    }

    #[test]
    fn test_default_commands_menu() {
        let commands = default_commands();
        assert_eq!(commands.len(), 4);
        assert_eq!(commands[0].command, "start");
        assert!(commands.iter().all(|c| !c.description.is_empty()));
    }
}

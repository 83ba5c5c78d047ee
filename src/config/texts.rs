/// User-facing text catalog.
///
/// This module defines every message a participant can see, along with the
/// labels of the two keyboard buttons. The button labels double as commands:
/// a participant pressing a button sends its label back as plain text.

/// Label of the button that starts a partner search.
pub const SEARCH_BUTTON: &str = "🎯 Найти собеседника";

/// Label of the button that stops a search or leaves the current chat.
pub const STOP_BUTTON: &str = "⏹ Остановить";

/// Text command that shows the welcome message.
pub const START_COMMAND: &str = "/start";

/// Display name used in the welcome message when the client supplies none.
pub const DEFAULT_DISPLAY_NAME: &str = "студент";

/// Greeting sent on `/start`. `{name}` is replaced with the display name.
pub const WELCOME_TEMPLATE: &str = "👋 Привет, *{name}*!\n\
Я — *анонимный чат-бот* для студентов Kozybayev University 🎓\n\n\
Здесь можно знакомиться, общаться и находить новых друзей.\n\
Нажми «🎯 *Найти собеседника*» — и я соединю тебя с другим студентом.\n\n\
⏹ В любой момент можно завершить чат или поиск кнопкой «*Остановить*».\n\n\
✨ Удачи и приятных знакомств!";

pub const WAITING: &str = "⏳ Ждем собеседника...";
pub const MATCHED: &str = "✅ Нашелся собеседник! Можешь писать ✉️";
pub const ALREADY_IN_CHAT: &str = "❗ Ты уже в чате. Нажми ⏹ Остановить, чтобы выйти.";
pub const SEARCH_CANCELLED: &str = "❌ Поиск остановлен.";
pub const YOU_LEFT: &str = "❌ Ты вышел из чата.";
pub const PARTNER_LEFT: &str = "❌ Собеседник вышел из чата.";
pub const NOT_SEARCHING: &str = "❗ Ты сейчас не ищешь собеседника и не в чате.";

/// Main keyboard attached to every notice, one button per row.
pub fn main_keyboard() -> Vec<Vec<String>> {
    vec![
        vec![SEARCH_BUTTON.to_string()],
        vec![STOP_BUTTON.to_string()],
    ]
}

use teloxide::{
  Bot,
  prelude::*,
  types::{InlineKeyboardButton, InlineKeyboardMarkup, InputFile, ParseMode},
};

use super::{Action, Messenger};
use crate::prelude::*;

/// Two buttons per row, in the given order.
pub fn keyboard(actions: &[Action]) -> InlineKeyboardMarkup {
  let rows = actions.chunks(2).map(|row| {
    row
      .iter()
      .map(|action| {
        InlineKeyboardButton::callback(action.label.clone(), action.data.clone())
      })
      .collect::<Vec<_>>()
  });
  InlineKeyboardMarkup::new(rows)
}

#[async_trait]
impl Messenger for Bot {
  async fn send(
    &self,
    chat_id: i64,
    text: &str,
    actions: &[Action],
  ) -> Result<()> {
    let chunks = utils::chunk_message(text, 0);
    let last = chunks.len().saturating_sub(1);

    for (idx, chunk) in chunks.into_iter().enumerate() {
      let request = self
        .send_message(ChatId(chat_id), chunk)
        .parse_mode(ParseMode::Html);

      // buttons go under the final chunk
      if idx == last && !actions.is_empty() {
        request.reply_markup(keyboard(actions)).await?;
      } else {
        request.await?;
      }
    }
    Ok(())
  }

  async fn send_image(
    &self,
    chat_id: i64,
    image: Vec<u8>,
    caption: &str,
  ) -> Result<()> {
    self
      .send_photo(ChatId(chat_id), InputFile::memory(image).file_name("chart.png"))
      .caption(caption)
      .parse_mode(ParseMode::Html)
      .await?;
    Ok(())
  }
}

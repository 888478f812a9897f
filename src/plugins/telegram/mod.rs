mod callback;
mod command;

use command::Command;
use teloxide::{
  Bot,
  dispatching::{Dispatcher, HandlerExt, UpdateFilterExt},
  prelude::*,
  types::{CallbackQuery, ChatId, InputFile, Message, ParseMode, Update},
  utils::command::BotCommands,
};

use crate::{
  channel::{Action, telegram::keyboard},
  prelude::*,
  state::AppState,
};

pub struct Plugin;

#[async_trait]
impl super::Plugin for Plugin {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    run_bot(app).await;
    Ok(())
  }
}

pub async fn run_bot(app: Arc<AppState>) {
  info!("Starting Telegram bot...");

  let bot = app.bot.clone();
  if let Err(err) = bot.set_my_commands(Command::bot_commands()).await {
    warn!("Failed to register bot commands: {err}");
  }

  let handler = teloxide::dptree::entry()
    .branch(Update::filter_message().filter_command::<Command>().endpoint({
      let app = app.clone();
      move |bot: Bot, msg: Message, cmd: Command| {
        let app = app.clone();
        let username = msg.from.as_ref().and_then(|user| user.username.clone());
        let bot = ReplyBot::new(bot, msg.chat.id.0, username, msg.chat.id);
        command::handle(app, bot, cmd)
      }
    }))
    .branch(Update::filter_callback_query().endpoint({
      let app = app.clone();
      move |bot: Bot, query: CallbackQuery| {
        let app = app.clone();
        callback_handle(app, bot, query)
      }
    }));

  let mut dispatcher = Dispatcher::builder(bot, handler).build();

  let token = dispatcher.shutdown_token();
  let shutdown = app.shutdown.clone();
  tokio::spawn(async move {
    shutdown.cancelled().await;
    if let Ok(stopped) = token.shutdown() {
      stopped.await;
    }
  });

  dispatcher.dispatch().await;
}

async fn callback_handle(
  app: Arc<AppState>,
  bot: Bot,
  query: CallbackQuery,
) -> ResponseResult<()> {
  // answer callback to remove loading state
  bot.answer_callback_query(query.id.clone()).await?;

  if let Some(data) = query.data
    && let Some(msg) = query.message.as_ref()
  {
    let bot = ReplyBot::new(
      bot,
      query.from.id.0 as i64,
      query.from.username.clone(),
      msg.chat().id,
    );
    callback::handle(app, bot, &data).await
  } else {
    Ok(())
  }
}

#[derive(Debug, Clone)]
struct ReplyBot {
  inner: Bot,
  pub user_id: i64,
  pub username: Option<String>,
  pub chat_id: ChatId,
}

impl ReplyBot {
  pub fn new(
    inner: Bot,
    user_id: i64,
    username: Option<String>,
    chat_id: ChatId,
  ) -> Self {
    Self { inner, user_id, username, chat_id }
  }

  async fn reply_html(
    &self,
    text: impl Into<String>,
  ) -> ResponseResult<Message> {
    self
      .inner
      .send_message(self.chat_id, text.into())
      .parse_mode(ParseMode::Html)
      .await
  }

  /// Sends a potentially long message in chunks, buttons under the last one.
  async fn reply_html_chunked(
    &self,
    text: impl Into<String>,
    actions: &[Action],
  ) -> ResponseResult<()> {
    let chunks = utils::chunk_message(&text.into(), 0);
    let last = chunks.len().saturating_sub(1);

    for (idx, chunk) in chunks.into_iter().enumerate() {
      let request = self
        .inner
        .send_message(self.chat_id, chunk)
        .parse_mode(ParseMode::Html);
      if idx == last && !actions.is_empty() {
        request.reply_markup(keyboard(actions)).await?;
      } else {
        request.await?;
      }
    }
    Ok(())
  }

  async fn reply_image(
    &self,
    png: Vec<u8>,
    caption: &str,
  ) -> ResponseResult<Message> {
    self
      .inner
      .send_photo(self.chat_id, InputFile::memory(png).file_name("chart.png"))
      .caption(caption)
      .await
  }
}

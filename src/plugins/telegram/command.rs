use std::str::FromStr;

use teloxide::{
  prelude::*,
  utils::{command::BotCommands, html::escape},
};

use super::ReplyBot;
use crate::{
  channel::{self, Action, ChartRenderer, Coach},
  entity::{ActivityLevel, Gender, Goal, GoalSpeed},
  insight::{ProfileInput, alerts, report},
  prelude::*,
  state::{AppState, Services},
  sv::{self, DailyPatch, NewLift, NewWorkout, SettingsPatch, insight},
};

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase")]
pub enum Command {
  Start,
  Help,
  Profile(String),
  Weight(String),
  Eat(String),
  Water(String),
  Sleep(String),
  Workout(String),
  Lift(String),
  Today,
  Week,
  Month,
  Streak,
  Alerts,
  Progress(String),
  Set(String),
}

const HELP: &str = "\
<b>📋 Commands</b>

<b>Setup:</b>
/profile &lt;m|f&gt; &lt;age&gt; &lt;height&gt; &lt;weight&gt; &lt;activity&gt; &lt;goal&gt; [speed]
  activity: sedentary, light, moderate, high, very_high
  goal: recomp, cut, bulk; speed: gentle, standard, aggressive
/set &lt;key&gt; &lt;value&gt; - timezone, weigh_day, weigh_time, daily_time, \
report_time, weight_loss_pct, low_calories_pct, coach

<b>Logging:</b>
/weight &lt;kg&gt;
/eat &lt;kcal&gt; [what]
/water &lt;ml&gt;
/sleep &lt;hours&gt;
/workout &lt;gym|cardio|walking|other&gt; &lt;minutes&gt; [kcal]
/lift &lt;exercise&gt; &lt;kg&gt; &lt;reps&gt; &lt;sets&gt;

<b>Reports:</b>
/today - day summary
/week - weekly report
/month - monthly summary
/streak - weeks in a row with workouts
/alerts - check warnings now
/progress &lt;exercise&gt; - strength progress
/help - show this message";

/// Text to send back plus an optional image sent before it
#[derive(Debug, Default)]
pub struct Reply {
  pub text: String,
  pub actions: Vec<Action>,
  pub image: Option<(Vec<u8>, String)>,
}

/// Optional collaborators a reply may draw on
#[derive(Default, Clone, Copy)]
pub struct Extras<'a> {
  pub coach: Option<&'a dyn Coach>,
  pub charts: Option<&'a dyn ChartRenderer>,
}

impl From<String> for Reply {
  fn from(text: String) -> Self {
    Self { text, ..Self::default() }
  }
}

fn number<T: FromStr>(raw: &str, what: &str) -> Result<T> {
  raw
    .trim()
    .parse()
    .map_err(|_| Error::invalid(format!("{what}: `{raw}` is not a number")))
}

fn decimal(raw: &str, what: &str) -> Result<Decimal> {
  number(&raw.trim().replace(',', "."), what)
}

fn bounded<T: PartialOrd + std::fmt::Display>(
  value: T,
  min: T,
  max: T,
  what: &str,
) -> Result<T> {
  if value < min || value > max {
    return Err(Error::invalid(format!("{what} must be within {min}-{max}")));
  }
  Ok(value)
}

fn usage(text: &str) -> Error {
  Error::invalid(format!("Usage: {text}"))
}

fn parse_profile(args: &str) -> Result<ProfileInput> {
  const USAGE: &str =
    "/profile <m|f> <age> <height> <weight> <activity> <goal> [speed]";

  let parts: Vec<&str> = args.split_whitespace().collect();
  let [gender, age, height, weight, activity, goal, rest @ ..] =
    parts.as_slice()
  else {
    return Err(usage(USAGE));
  };

  let speed = match rest {
    [] => GoalSpeed::Standard,
    [speed] => speed
      .parse()
      .map_err(|_| Error::invalid(format!("Unknown speed `{speed}`")))?,
    _ => return Err(usage(USAGE)),
  };

  Ok(ProfileInput {
    gender: gender
      .parse::<Gender>()
      .map_err(|_| Error::invalid("gender is `m` or `f`"))?,
    age: bounded(number(age, "age")?, 14, 100, "age")?,
    height_cm: bounded(number(height, "height")?, 100, 250, "height")?,
    weight_kg: bounded(
      decimal(weight, "weight")?,
      dec!(30),
      dec!(300),
      "weight",
    )?,
    activity: ActivityLevel::parse_lossy(activity),
    goal: goal
      .parse::<Goal>()
      .map_err(|_| Error::invalid(format!("Unknown goal `{goal}`")))?,
    goal_speed: speed,
  })
}

/// Milliliters; a value with a decimal point is read as liters.
fn parse_water(args: &str) -> Result<i32> {
  let raw = args.trim();
  if raw.is_empty() {
    return Err(usage("/water <ml>"));
  }
  let ml = if raw.contains(['.', ',']) {
    (decimal(raw, "water")? * dec!(1000)).trunc()
  } else {
    Decimal::from(number::<i64>(raw, "water")?)
  };
  let ml: i32 = bounded(ml, dec!(0), dec!(10000), "water (ml)")?
    .try_into()
    .map_err(|_| Error::invalid("water is out of range"))?;
  Ok(ml)
}

fn parse_workout(args: &str) -> Result<NewWorkout> {
  const USAGE: &str = "/workout <gym|cardio|walking|other> <minutes> [kcal]";

  let parts: Vec<&str> = args.split_whitespace().collect();
  let (kind, minutes, kcal) = match parts.as_slice() {
    [kind, minutes] => (*kind, *minutes, None),
    [kind, minutes, kcal] => (*kind, *minutes, Some(*kcal)),
    _ => return Err(usage(USAGE)),
  };

  let kind = kind.to_lowercase();
  if !sv::workout::KINDS.contains(&kind.as_str()) {
    return Err(usage(USAGE));
  }
  let minutes = bounded(number(minutes, "minutes")?, 1, 480, "minutes")?;
  let burned = kcal
    .map(|kcal| bounded(number(kcal, "kcal")?, 0, 5000, "kcal"))
    .transpose()?;

  Ok(NewWorkout {
    kind,
    duration_min: Some(minutes),
    calories_burned: burned,
    note: None,
  })
}

fn parse_lift(args: &str) -> Result<NewLift> {
  const USAGE: &str = "/lift <exercise> <kg> <reps> <sets>";

  let parts: Vec<&str> = args.split_whitespace().collect();
  let [name @ .., weight, reps, sets] = parts.as_slice() else {
    return Err(usage(USAGE));
  };
  if name.is_empty() {
    return Err(usage(USAGE));
  }

  let weight = decimal(weight, "weight")?;
  if weight <= Decimal::ZERO || weight > dec!(500) {
    return Err(Error::invalid("weight must be within 0-500"));
  }
  Ok(NewLift {
    exercise: name.join(" "),
    weight_kg: weight,
    reps: bounded(number(reps, "reps")?, 1, 100, "reps")?,
    sets: bounded(number(sets, "sets")?, 1, 50, "sets")?,
  })
}

fn weight_feedback(diff: Decimal) -> &'static str {
  if diff < dec!(-1) {
    "\n⚠️ Dropping fast, make sure you eat enough."
  } else if diff <= dec!(-0.3) {
    "\n👍 Good pace!"
  } else if diff > Decimal::ZERO {
    "\nA small rise is most likely water, don't worry."
  } else {
    ""
  }
}

/// Runs one command for `user` whose local date is `today`.
pub async fn execute(
  sv: &Services<'_>,
  extras: Extras<'_>,
  user: i64,
  today: Date,
  cmd: Command,
) -> Result<Reply> {
  let reply = match cmd {
    Command::Start => format!(
      "👋 <b>Hi! I'm your nutrition and training tracker.</b>\n\n\
       Start with /profile to get your calorie and macro targets, \
       then log your day with /weight, /eat, /water, /sleep and /workout.\n\n\
       I'll remind you to weigh in, summarize each evening and send a \
       weekly report. Times follow your timezone, see /set.\n\n{HELP}"
    )
    .into(),

    Command::Help => HELP.to_string().into(),

    Command::Profile(args) => {
      let input = parse_profile(&args)?;
      let targets = sv.profile.save(user, input).await?;
      sv.daily
        .upsert(
          user,
          today,
          DailyPatch {
            weight_kg: Some(input.weight_kg),
            ..DailyPatch::default()
          },
        )
        .await?;
      report::targets(&targets).into()
    }

    Command::Weight(args) => {
      if args.trim().is_empty() {
        return Err(usage("/weight <kg>"));
      }
      let weight =
        bounded(decimal(&args, "weight")?, dec!(30), dec!(300), "weight")?;
      sv.daily
        .upsert(
          user,
          today,
          DailyPatch { weight_kg: Some(weight), ..DailyPatch::default() },
        )
        .await?;

      let mut text =
        format!("✅ Weight {} kg logged", utils::decimal(weight, 1));
      let week_ago =
        sv.daily.weight_at(user, today - TimeDelta::days(7)).await?;
      if let Some(old) = week_ago {
        let diff = weight - old.weight;
        text.push_str(&format!(
          "\nChange over the week: {} kg",
          utils::signed(diff, 1)
        ));
        text.push_str(weight_feedback(diff));
      }
      text.into()
    }

    Command::Eat(args) => {
      let (kcal, what) = match args.trim().split_once(char::is_whitespace) {
        Some((kcal, what)) => (kcal, Some(what.trim().to_string())),
        None => (args.trim(), None),
      };
      if kcal.is_empty() {
        return Err(usage("/eat <kcal> [what]"));
      }
      let kcal = bounded(number(kcal, "kcal")?, 0, 10000, "kcal")?;
      let total = sv.daily.add_intake(user, today, kcal, what).await?;

      let mut text = format!("✅ +{kcal} kcal. Today: {total} kcal");
      if let Some(targets) = sv.profile.targets(user).await? {
        let left = targets.target_calories - total;
        if left >= 0 {
          text.push_str(&format!(" ({left} left)"));
        } else {
          text.push_str(&format!(" ({} over the plan)", -left));
        }
      }
      text.into()
    }

    Command::Water(args) => {
      let ml = parse_water(&args)?;
      sv.daily
        .upsert(
          user,
          today,
          DailyPatch { water_ml: Some(ml), ..DailyPatch::default() },
        )
        .await?;
      let note = match ml {
        2000.. => " 💧 Great, well hydrated!",
        1500.. => " Almost there.",
        _ => " Try to drink a bit more.",
      };
      format!("✅ Water today: {ml} ml.{note}").into()
    }

    Command::Sleep(args) => {
      if args.trim().is_empty() {
        return Err(usage("/sleep <hours>"));
      }
      let hours =
        bounded(decimal(&args, "sleep")?, dec!(0), dec!(24), "sleep")?;
      sv.daily
        .upsert(
          user,
          today,
          DailyPatch { sleep_hours: Some(hours), ..DailyPatch::default() },
        )
        .await?;
      let note = if hours >= dec!(7) {
        "😴 Well rested!"
      } else if hours >= dec!(6) {
        "A little short, aim for 7+ hours."
      } else {
        "⚠️ Too little sleep slows recovery and fat loss."
      };
      format!("✅ Sleep {} h logged. {note}", utils::decimal(hours, 1)).into()
    }

    Command::Workout(args) => {
      let workout = sv.workout.add(user, today, parse_workout(&args)?).await?;
      let week = sv.workout.count_this_week(user, today).await?;
      let mut text = format!(
        "✅ {} logged, {} min. Workouts this week: {week}",
        workout.kind,
        workout.duration_min.unwrap_or_default()
      );
      if let Some(burned) = workout.calories_burned {
        text.push_str(&format!("\n🔥 Burned: {burned} kcal"));
      }
      if week >= 3 {
        text.push_str("\n💪 Great consistency!");
      }
      text.into()
    }

    Command::Lift(args) => {
      let logged = sv.strength.add(user, today, parse_lift(&args)?).await?;
      let record = &logged.record;
      report::lift_logged(
        &record.exercise,
        record.weight_kg.round_dp(2),
        record.reps,
        record.sets,
        record.e1rm.round_dp(2),
        logged.previous.map(|previous| previous.e1rm.round_dp(2)),
      )
      .into()
    }

    Command::Today => {
      let summary = sv.insight.daily(user, today).await?;
      if summary.has_activity() {
        report::daily_summary(&summary).into()
      } else {
        Reply {
          text: report::daily_prompt().into(),
          actions: channel::logging_actions(),
          image: None,
        }
      }
    }

    Command::Week => {
      let settings = sv.settings.get(user).await?;
      let coach = extras.coach.filter(|_| settings.use_ai_coach);
      let weekly =
        sv.insight.weekly_report(user, today, coach, extras.charts).await?;
      Reply {
        text: weekly.text,
        actions: Vec::new(),
        image: weekly
          .chart
          .map(|png| (png, insight::WEEKLY_CHART_CAPTION.to_string())),
      }
    }

    Command::Month => {
      let stats = sv.insight.monthly(user, today).await?;
      let mut reply = Reply::from(report::monthly(&stats));
      if let Some(charts) = extras.charts {
        let trend = sv.insight.trend(user, today, 30).await?;
        if trend.has_trend() {
          match charts.weight_chart(&trend) {
            Ok(png) => {
              reply.image = Some((png, "⚖️ Weight, last 30 days".into()))
            }
            Err(err) => warn!(user, "Weight chart failed: {err}"),
          }
        }
      }
      reply
    }

    Command::Streak => {
      report::streak(sv.insight.streak(user, today).await?).into()
    }

    Command::Alerts => {
      let ctx = sv.insight.alert_context(user, today).await?;
      let fired = alerts::evaluate(&ctx);
      if fired.is_empty() {
        "✅ No warnings, everything is on track.".to_string().into()
      } else {
        let texts: Vec<_> = fired.iter().map(report::alert).collect();
        texts.join("\n\n").into()
      }
    }

    Command::Progress(args) => {
      if args.trim().is_empty() {
        let known = sv.strength.exercises(user, 10).await?;
        if known.is_empty() {
          return Err(usage("/progress <exercise>"));
        }
        return Ok(format!("Pick an exercise: {}", known.join(", ")).into());
      }

      let Some(progress) = sv.insight.progress(user, &args).await? else {
        return Ok(format!("No records for `{}` yet.", args.trim()).into());
      };
      let mut reply = Reply::from(report::progress(&progress));
      if !progress.has_trend() {
        reply.text.push_str("\nLog a few more sessions to see a trend.");
      } else if let Some(charts) = extras.charts {
        match charts.progress_chart(&progress) {
          Ok(png) => {
            reply.image = Some((png, format!("📈 {}", progress.exercise)))
          }
          Err(err) => warn!(user, "Progress chart failed: {err}"),
        }
      }
      reply
    }

    Command::Set(args) => {
      let Some((key, value)) = args.trim().split_once(char::is_whitespace)
      else {
        let settings = sv.settings.get(user).await?;
        return Ok(settings_overview(&settings).into());
      };
      let settings =
        sv.settings.update(user, SettingsPatch::parse(key, value)?).await?;
      format!("✅ Saved.\n\n{}", settings_overview(&settings)).into()
    }
  };
  Ok(reply)
}

fn settings_overview(settings: &crate::entity::settings::Model) -> String {
  format!(
    "⚙️ <b>Settings</b>\n\
     • timezone: {}\n\
     • weigh_day: {}\n\
     • weigh_time: {}\n\
     • daily_time: {}\n\
     • report_time: {}\n\
     • weight_loss_pct: {}\n\
     • low_calories_pct: {}\n\
     • coach: {}\n\n\
     Change with /set &lt;key&gt; &lt;value&gt;",
    settings.timezone,
    settings.weigh_day,
    utils::format_time(settings.weigh_time),
    utils::format_time(settings.daily_summary_time),
    utils::format_time(settings.weekly_report_time),
    utils::decimal(settings.weight_loss_pct, 1),
    utils::decimal(settings.low_calories_pct * dec!(100), 0),
    if settings.use_ai_coach { "on" } else { "off" },
  )
}

pub async fn handle(
  app: Arc<AppState>,
  bot: ReplyBot,
  cmd: Command,
) -> ResponseResult<()> {
  let sv = app.sv();

  let result: Result<Reply> = async {
    sv.user.get_or_create(bot.user_id, bot.username.as_deref()).await?;
    let today = app.today(bot.user_id).await?;
    let extras = Extras {
      coach: Some(app.coach.as_ref()),
      charts: app.charts.as_deref(),
    };
    execute(&sv, extras, bot.user_id, today, cmd).await
  }
  .await;

  match result {
    Ok(reply) => {
      if let Some((png, caption)) = reply.image
        && let Err(err) = bot.reply_image(png, &caption).await
      {
        warn!(user = bot.user_id, "Image reply failed: {err}");
      }
      bot.reply_html_chunked(reply.text, &reply.actions).await?;
    }
    Err(err @ Error::Invalid(_)) | Err(err @ Error::UnknownTimezone(_)) => {
      bot.reply_html(format!("❌ {}", escape(&err.to_string()))).await?;
    }
    Err(err) => {
      error!(user = bot.user_id, "Command failed: {err}");
      bot.reply_html("❌ Something went wrong, try again later.").await?;
    }
  }

  Ok(())
}

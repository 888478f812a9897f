use crate::{
  entity::{settings, user},
  prelude::*,
  sv,
};

pub struct User<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> User<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Registers unknown users together with their default settings. Known
  /// users are reactivated.
  pub async fn get_or_create(
    &self,
    tg_user_id: i64,
    username: Option<&str>,
  ) -> Result<user::Model> {
    if let Some(user) =
      user::Entity::find_by_id(tg_user_id).one(self.db).await?
    {
      if user.is_active {
        return Ok(user);
      }
      let user = user::ActiveModel { is_active: Set(true), ..user.into() }
        .update(self.db)
        .await?;
      return Ok(user);
    }

    let txn = self.db.begin().await?;

    let now = Utc::now().naive_utc();
    let user = user::ActiveModel {
      tg_user_id: Set(tg_user_id),
      username: Set(username.map(str::to_string)),
      is_active: Set(true),
      created_at: Set(now),
    }
    .insert(&txn)
    .await?;

    settings::ActiveModel::from(sv::settings::defaults(tg_user_id))
      .reset_all()
      .insert(&txn)
      .await?;

    txn.commit().await?;
    info!(user = tg_user_id, "Registered new user");
    Ok(user)
  }

  pub async fn set_active(&self, tg_user_id: i64, active: bool) -> Result<()> {
    let user = user::Entity::find_by_id(tg_user_id)
      .one(self.db)
      .await?
      .ok_or(Error::UserNotFound)?;

    user::ActiveModel { is_active: Set(active), ..user.into() }
      .update(self.db)
      .await?;
    Ok(())
  }

  /// Every active user joined with their settings, in a stable order.
  pub async fn active_with_settings(
    &self,
  ) -> Result<Vec<(user::Model, settings::Model)>> {
    let pairs = user::Entity::find()
      .filter(user::Column::IsActive.eq(true))
      .find_also_related(settings::Entity)
      .order_by_asc(user::Column::TgUserId)
      .all(self.db)
      .await?;

    Ok(
      pairs
        .into_iter()
        .filter_map(|(user, settings)| settings.map(|s| (user, s)))
        .collect(),
    )
  }
}

//! IQCode service - identity token issuance and role/status checks

use rand::Rng;

use crate::{
  entities::iq_code::{self, Role, Status},
  prelude::*,
};

const SUFFIX_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const SUFFIX_LEN: usize = 5;

fn random_suffix() -> String {
  let mut rng = rand::thread_rng();
  (0..SUFFIX_LEN)
    .map(|_| SUFFIX_CHARSET[rng.gen_range(0..SUFFIX_CHARSET.len())] as char)
    .collect()
}

pub struct IqCodes<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> IqCodes<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Mints a new identity, `TIQ-<ROLE>-XXXXX`. The code string is the only
  /// thing a member ever presents; it carries no personal data.
  pub async fn create(
    &self,
    role: Role,
    structure_code: Option<String>,
  ) -> Result<iq_code::Model> {
    if let Some(structure) = &structure_code {
      self.require(structure, Role::Structure).await?;
    }

    for _ in 0..8 {
      let code = format!("TIQ-{}-{}", role.tag(), random_suffix());

      if iq_code::Entity::find_by_id(&code).one(self.db).await?.is_some() {
        continue;
      }

      let now = Utc::now().naive_utc();
      let model = iq_code::ActiveModel {
        code: Set(code),
        role: Set(role),
        status: Set(Status::Active),
        structure_code: Set(structure_code.clone()),
        created_at: Set(now),
      };

      return Ok(model.insert(self.db).await?);
    }

    Err(Error::DuplicateCode)
  }

  /// Inserts a known identity if it does not exist yet. Used at startup to
  /// seed the admin configured in the environment.
  pub async fn ensure(&self, code: &str, role: Role) -> Result<iq_code::Model> {
    if let Some(model) = iq_code::Entity::find_by_id(code).one(self.db).await? {
      return Ok(model);
    }

    let now = Utc::now().naive_utc();
    let model = iq_code::ActiveModel {
      code: Set(code.to_string()),
      role: Set(role),
      status: Set(Status::Active),
      structure_code: Set(None),
      created_at: Set(now),
    };

    Ok(model.insert(self.db).await?)
  }

  /// Looks up an IQCode and checks it is active and bound to `role`.
  /// A code bound to another role reads as not found, so probing an
  /// identifier does not reveal what it is.
  pub async fn require(&self, code: &str, role: Role) -> Result<iq_code::Model> {
    let model = iq_code::Entity::find_by_id(code)
      .one(self.db)
      .await?
      .filter(|model| model.role == role)
      .ok_or(Error::IqCodeNotFound)?;

    if model.status != Status::Active {
      return Err(Error::IqCodeInactive);
    }

    Ok(model)
  }

  pub async fn set_status(&self, code: &str, status: Status) -> Result<()> {
    let model = iq_code::Entity::find_by_id(code)
      .one(self.db)
      .await?
      .ok_or(Error::IqCodeNotFound)?;

    iq_code::ActiveModel { status: Set(status), ..model.into() }
      .update(self.db)
      .await?;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use sea_orm::{ConnectionTrait, Database, DbBackend, Schema};

  use super::*;
  use crate::entities;

  async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();

    let schema = Schema::new(DbBackend::Sqlite);

    let stmt = schema.create_table_from_entity(entities::iq_code::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    db
  }

  #[tokio::test]
  async fn test_create_iqcode() {
    let db = setup_test_db().await;

    let tourist = IqCodes::new(&db).create(Role::Tourist, None).await.unwrap();

    assert!(tourist.code.starts_with("TIQ-TRT-"));
    assert_eq!(tourist.role, Role::Tourist);
    assert_eq!(tourist.status, Status::Active);
  }

  #[tokio::test]
  async fn test_require_checks_role() {
    let db = setup_test_db().await;
    let sv = IqCodes::new(&db);

    let partner = sv.create(Role::Partner, None).await.unwrap();

    assert!(sv.require(&partner.code, Role::Partner).await.is_ok());
    assert!(matches!(
      sv.require(&partner.code, Role::Tourist).await,
      Err(Error::IqCodeNotFound)
    ));
  }

  #[tokio::test]
  async fn test_blocked_iqcode_is_inactive() {
    let db = setup_test_db().await;
    let sv = IqCodes::new(&db);

    let tourist = sv.create(Role::Tourist, None).await.unwrap();
    sv.set_status(&tourist.code, Status::Blocked).await.unwrap();

    assert!(matches!(
      sv.require(&tourist.code, Role::Tourist).await,
      Err(Error::IqCodeInactive)
    ));
  }

  #[tokio::test]
  async fn test_tourist_bound_to_structure() {
    let db = setup_test_db().await;
    let sv = IqCodes::new(&db);

    let structure = sv.create(Role::Structure, None).await.unwrap();
    let tourist =
      sv.create(Role::Tourist, Some(structure.code.clone())).await.unwrap();

    assert_eq!(tourist.structure_code.as_deref(), Some(structure.code.as_str()));

    assert!(matches!(
      sv.create(Role::Tourist, Some("TIQ-STR-MISSING".into())).await,
      Err(Error::IqCodeNotFound)
    ));
  }
}

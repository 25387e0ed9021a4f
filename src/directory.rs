use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// A resident as the matcher sees it. Records are created and destroyed by
/// surrounding infrastructure; the workflows only read them and write the
/// enrollment fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub full_name: String,
    pub face_embedding: Option<Vec<u8>>,
    pub checkin_photo_url: Option<String>,
    pub avatar_url: Option<String>,
}

impl UserRecord {
    pub fn new(id: Uuid, full_name: impl Into<String>) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            face_embedding: None,
            checkin_photo_url: None,
            avatar_url: None,
        }
    }

    pub fn has_embedding(&self) -> bool {
        self.face_embedding.as_deref().is_some_and(|b| !b.is_empty())
    }
}

/// Lookup and persistence of user records.
pub trait UserDirectory {
    fn get(&self, id: Uuid) -> Result<Option<UserRecord>>;
    /// All users with a stored (non-empty) embedding, in stable order.
    fn enrolled(&self) -> Result<Vec<UserRecord>>;
    fn save(&self, user: UserRecord) -> Result<()>;
}

impl<T: UserDirectory + ?Sized> UserDirectory for &T {
    fn get(&self, id: Uuid) -> Result<Option<UserRecord>> {
        (**self).get(id)
    }

    fn enrolled(&self) -> Result<Vec<UserRecord>> {
        (**self).enrolled()
    }

    fn save(&self, user: UserRecord) -> Result<()> {
        (**self).save(user)
    }
}

/// File-backed directory keeping all records in one postcard-encoded file
/// under the data directory.
pub struct FileDirectory {
    root: PathBuf,
}

impl FileDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn store_file(&self) -> PathBuf {
        self.root.join("users.bin")
    }

    pub fn load_all(&self) -> Result<Vec<UserRecord>> {
        let file = self.store_file();

        if !file.exists() {
            return Ok(vec![]);
        }

        let data = std::fs::read(&file)
            .with_context(|| format!("reading {}", file.display()))?;
        Ok(postcard::from_bytes(&data)?)
    }

    fn write_all(&self, users: &[UserRecord]) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        let file = self.store_file();
        let data = postcard::to_allocvec(users)?;
        std::fs::write(&file, data)
            .with_context(|| format!("writing {}", file.display()))?;
        Ok(())
    }

    /// Remove a user's enrollment, keeping the record itself.
    pub fn purge(&self, id: Uuid) -> Result<()> {
        let mut users = self.load_all()?;
        for user in users.iter_mut().filter(|u| u.id == id) {
            user.face_embedding = None;
            user.checkin_photo_url = None;
        }
        self.write_all(&users)
    }
}

impl UserDirectory for FileDirectory {
    fn get(&self, id: Uuid) -> Result<Option<UserRecord>> {
        Ok(self.load_all()?.into_iter().find(|u| u.id == id))
    }

    fn enrolled(&self) -> Result<Vec<UserRecord>> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(UserRecord::has_embedding)
            .collect())
    }

    fn save(&self, user: UserRecord) -> Result<()> {
        let mut users = self.load_all()?;
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user,
            None => users.push(user),
        }
        self.write_all(&users)
    }
}

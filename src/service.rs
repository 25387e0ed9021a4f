use log::{error, warn};
use serde::Serialize;
use uuid::Uuid;

use crate::codec;
use crate::directory::{UserDirectory, UserRecord};
use crate::extractor::EmbeddingExtractor;
use crate::similarity::cosine_similarity;
use crate::store::FileStore;

/// Storage category for enrollment photos.
pub const FACE_PHOTO_CATEGORY: &str = "face-registration";

/// Outcome of a 1:1 verification. A business result, never an error.
#[derive(Debug, Clone, Serialize)]
pub struct Verification {
    pub verified: bool,
    pub similarity: f32,
    pub message: String,
}

impl Verification {
    fn accepted(similarity: f32, message: impl Into<String>) -> Self {
        Self {
            verified: true,
            similarity,
            message: message.into(),
        }
    }

    fn rejected(similarity: f32, message: impl Into<String>) -> Self {
        Self {
            verified: false,
            similarity,
            message: message.into(),
        }
    }
}

/// Outcome of an enrollment.
#[derive(Debug, Clone, Serialize)]
pub struct Enrollment {
    pub success: bool,
    pub message: String,
}

impl Enrollment {
    fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Outcome of a 1:N identification. The best similarity seen is reported
/// even when no user clears the threshold.
#[derive(Debug, Clone, Serialize)]
pub struct Identification {
    pub identified: bool,
    pub user_id: Option<Uuid>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub similarity: f32,
    pub message: String,
}

impl Identification {
    fn rejected(similarity: f32, message: impl Into<String>) -> Self {
        Self {
            identified: false,
            user_id: None,
            full_name: None,
            avatar_url: None,
            similarity,
            message: message.into(),
        }
    }
}

/// Face matching workflows over injected collaborators: a user directory,
/// an image store and an embedding extractor.
pub struct FaceService<D, S, E> {
    directory: D,
    store: S,
    extractor: E,
    threshold: f32,
}

impl<D, S, E> FaceService<D, S, E>
where
    D: UserDirectory,
    S: FileStore,
    E: EmbeddingExtractor,
{
    pub fn new(directory: D, store: S, extractor: E, threshold: f32) -> Self {
        Self {
            directory,
            store,
            extractor,
            threshold,
        }
    }

    /// Compare a live image against one user's enrolled face.
    pub fn verify(&self, user_id: Uuid, image: &[u8]) -> Verification {
        self.try_verify(user_id, image).unwrap_or_else(|e| {
            error!("verification failed for user {user_id}: {e:#}");
            Verification::rejected(0.0, format!("Lỗi: {e}"))
        })
    }

    fn try_verify(&self, user_id: Uuid, image: &[u8]) -> anyhow::Result<Verification> {
        let Some(user) = self.directory.get(user_id)? else {
            return Ok(Verification::rejected(0.0, "User không tồn tại"));
        };

        let Some(blob) = user.face_embedding.as_deref().filter(|b| !b.is_empty()) else {
            return Ok(Verification::rejected(0.0, "User chưa đăng ký khuôn mặt"));
        };

        let stored = match codec::decode(blob) {
            Ok(v) => v,
            Err(e) => {
                error!("unreadable stored embedding for user {user_id}: {e}");
                return Ok(Verification::rejected(
                    0.0,
                    "Lỗi khi đọc dữ liệu khuôn mặt từ database",
                ));
            }
        };

        let live = self.extractor.extract(image)?;

        if stored.len() != live.len() {
            return Ok(Verification::rejected(0.0, "Lỗi khi so sánh embedding"));
        }
        let sim = cosine_similarity(&live, &stored)?;

        if sim > self.threshold {
            Ok(Verification::accepted(sim, "Xác thực thành công"))
        } else {
            Ok(Verification::rejected(sim, "Xác thực thất bại"))
        }
    }

    /// Capture a user's reference face: store the photo, then write the
    /// embedding and photo reference onto the record.
    pub fn enroll(&self, user_id: Uuid, image: &[u8]) -> Enrollment {
        self.try_enroll(user_id, image).unwrap_or_else(|e| {
            error!("enrollment failed for user {user_id}: {e:#}");
            Enrollment::failed(format!("Lỗi: {e}"))
        })
    }

    fn try_enroll(&self, user_id: Uuid, image: &[u8]) -> anyhow::Result<Enrollment> {
        let Some(mut user) = self.directory.get(user_id)? else {
            return Ok(Enrollment::failed("User không tồn tại"));
        };

        let embedding = self.extractor.extract(image)?;

        // Photo first; the record is only touched once storage succeeded.
        let stored = self
            .store
            .save(image, FACE_PHOTO_CATEGORY, &user_id.to_string())?;

        user.face_embedding = Some(codec::encode(&embedding)?);
        user.checkin_photo_url = Some(stored.path.clone());
        if user.avatar_url.as_deref().map_or(true, |a| a.trim().is_empty()) {
            user.avatar_url = Some(stored.path);
        }
        self.directory.save(user)?;

        Ok(Enrollment::succeeded("Đăng ký khuôn mặt thành công"))
    }

    /// Find the enrolled user whose face best matches a live image.
    pub fn identify(&self, image: Option<&[u8]>) -> Identification {
        self.try_identify(image).unwrap_or_else(|e| {
            error!("identification failed: {e:#}");
            Identification::rejected(0.0, format!("Lỗi: {e}"))
        })
    }

    fn try_identify(&self, image: Option<&[u8]>) -> anyhow::Result<Identification> {
        let Some(image) = image.filter(|i| !i.is_empty()) else {
            return Ok(Identification::rejected(0.0, "Ảnh khuôn mặt là bắt buộc."));
        };

        let enrolled: Vec<UserRecord> = self
            .directory
            .enrolled()?
            .into_iter()
            .filter(UserRecord::has_embedding)
            .collect();

        if enrolled.is_empty() {
            return Ok(Identification::rejected(
                0.0,
                "Chưa có cư dân nào đăng ký khuôn mặt trong hệ thống.",
            ));
        }

        let live = self.extractor.extract(image)?;

        // Linear scan, highest similarity wins, first-encountered on ties.
        // Unreadable records are skipped, not fatal.
        let mut best: Option<&UserRecord> = None;
        let mut best_similarity = 0.0f32;

        for user in &enrolled {
            let Some(blob) = user.face_embedding.as_deref() else {
                continue;
            };
            let stored = match codec::decode(blob) {
                Ok(v) => v,
                Err(e) => {
                    warn!("skipping user {}: {e}", user.id);
                    continue;
                }
            };
            if stored.len() != live.len() {
                warn!(
                    "skipping user {}: embedding length {} does not match probe length {}",
                    user.id,
                    stored.len(),
                    live.len()
                );
                continue;
            }

            let sim = match cosine_similarity(&live, &stored) {
                Ok(s) => s,
                Err(e) => {
                    warn!("skipping user {}: {e}", user.id);
                    continue;
                }
            };
            if sim > best_similarity {
                best_similarity = sim;
                best = Some(user);
            }
        }

        match best {
            Some(user) if best_similarity > self.threshold => Ok(Identification {
                identified: true,
                user_id: Some(user.id),
                full_name: Some(user.full_name.clone()),
                avatar_url: user
                    .checkin_photo_url
                    .clone()
                    .or_else(|| user.avatar_url.clone()),
                similarity: best_similarity,
                message: "Nhận diện thành công.".into(),
            }),
            _ => Ok(Identification::rejected(
                best_similarity,
                "Không tìm thấy cư dân phù hợp.",
            )),
        }
    }
}

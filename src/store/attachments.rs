use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::{Result, ValidationError};
use crate::models::{Attachment, UserId, MAX_UPLOAD_BYTES, SIGNED_URL_TTL_SECS};
use crate::remote::BlobStore;

/// Per-(user, date) attachment lifecycle. Files live in blob storage under
/// `{user}/{date}/{filename}`; listings are fetched lazily when a date's
/// detail view opens and cached for the session so duplicate filenames can be
/// rejected locally.
pub struct AttachmentManager {
    user: UserId,
    blobs: Arc<dyn BlobStore>,
    listings: HashMap<NaiveDate, Vec<Attachment>>,
}

impl AttachmentManager {
    pub fn new(user: UserId, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            user,
            blobs,
            listings: HashMap::new(),
        }
    }

    fn folder(&self, date: NaiveDate) -> String {
        format!("{}/{}", self.user, date)
    }

    fn path(&self, date: NaiveDate, filename: &str) -> String {
        format!("{}/{}/{}", self.user, date, filename)
    }

    /// Lists a date's files and issues 7-day signed URLs for all of them in
    /// one batched call.
    pub async fn list(&mut self, date: NaiveDate) -> Result<Vec<Attachment>> {
        let names = self.blobs.list(&self.folder(date)).await?;
        let attachments = if names.is_empty() {
            Vec::new()
        } else {
            let paths: Vec<String> = names.iter().map(|name| self.path(date, name)).collect();
            let urls = self.blobs.sign_many(&paths, SIGNED_URL_TTL_SECS).await?;
            names
                .into_iter()
                .zip(urls)
                .map(|(filename, url)| Attachment {
                    date,
                    filename,
                    url,
                })
                .collect()
        };
        self.listings.insert(date, attachments.clone());
        Ok(attachments)
    }

    /// Uploads one image. Content type, size and duplicate names are checked
    /// before any remote call.
    pub async fn upload(
        &mut self,
        date: NaiveDate,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Attachment> {
        if !content_type.starts_with("image/") {
            return Err(ValidationError::NotAnImage(content_type.to_string()).into());
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(ValidationError::OversizeUpload {
                size: bytes.len(),
                limit: MAX_UPLOAD_BYTES,
            }
            .into());
        }
        if let Some(listing) = self.listings.get(&date) {
            if listing.iter().any(|a| a.filename == filename) {
                return Err(ValidationError::DuplicateFilename(filename.to_string()).into());
            }
        }

        let path = self.path(date, filename);
        self.blobs.upload(&path, content_type, bytes).await?;

        let url = self
            .blobs
            .sign_many(std::slice::from_ref(&path), SIGNED_URL_TTL_SECS)
            .await?
            .into_iter()
            .next()
            .unwrap_or_default();
        let attachment = Attachment {
            date,
            filename: filename.to_string(),
            url,
        };
        if let Some(listing) = self.listings.get_mut(&date) {
            listing.push(attachment.clone());
        }
        Ok(attachment)
    }

    pub async fn remove(&mut self, date: NaiveDate, filename: &str) -> Result<()> {
        self.blobs.remove(&[self.path(date, filename)]).await?;
        if let Some(listing) = self.listings.get_mut(&date) {
            listing.retain(|a| a.filename != filename);
        }
        Ok(())
    }

    /// Deletes every file under a date. Invoked by the entry-delete cascade;
    /// a date with no attachments is a no-op, not an error.
    pub async fn remove_all(&mut self, date: NaiveDate) -> Result<()> {
        let names = self.blobs.list(&self.folder(date)).await?;
        if !names.is_empty() {
            let paths: Vec<String> = names.iter().map(|name| self.path(date, name)).collect();
            self.blobs.remove(&paths).await?;
        }
        self.listings.insert(date, Vec::new());
        Ok(())
    }
}

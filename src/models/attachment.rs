//! File attachments of patient records.

use std::path::Path;

use crate::client::{page_path, PhenoTipsClient};
use crate::error::{PhenoTipsError, Result};

fn attachment_path(patient_id: &str, filename: &str) -> String {
    format!(
        "{}/attachments/{}",
        page_path(patient_id),
        urlencoding::encode(filename)
    )
}

impl PhenoTipsClient {
    /// Contents of an attachment.
    #[tracing::instrument(skip(self))]
    pub async fn get_file(&self, patient_id: &str, filename: &str) -> Result<Vec<u8>> {
        let path = format!(
            "bin/download/data/{}/{}",
            urlencoding::encode(patient_id),
            urlencoding::encode(filename)
        );
        let response = self.get_raw(&path).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Create or replace an attachment.
    #[tracing::instrument(skip(self, contents))]
    pub async fn set_file(&self, patient_id: &str, filename: &str, contents: Vec<u8>) -> Result<()> {
        self.put_bytes(&attachment_path(patient_id, filename), contents)
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_file(&self, patient_id: &str, filename: &str) -> Result<()> {
        self.delete_raw(&attachment_path(patient_id, filename))
            .await?;
        Ok(())
    }

    /// Attach a local file under its base name.
    #[tracing::instrument(skip(self, local_path), fields(path = %local_path.as_ref().display()))]
    pub async fn upload_file(&self, patient_id: &str, local_path: impl AsRef<Path>) -> Result<()> {
        let local_path = local_path.as_ref();
        let filename = local_path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                PhenoTipsError::IoError(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("{} has no usable file name", local_path.display()),
                ))
            })?;
        let contents = tokio::fs::read(local_path).await?;
        self.set_file(patient_id, filename, contents).await
    }

    /// Save an attachment to a local file, replacing it if present.
    #[tracing::instrument(skip(self, local_path), fields(path = %local_path.as_ref().display()))]
    pub async fn download_file(
        &self,
        patient_id: &str,
        filename: &str,
        local_path: impl AsRef<Path>,
    ) -> Result<()> {
        let contents = self.get_file(patient_id, filename).await?;
        tokio::fs::write(local_path, contents).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_path_encodes_filename() {
        assert_eq!(
            attachment_path("P0000001", "exome run 1.vcf"),
            "rest/wikis/xwiki/spaces/data/pages/P0000001/attachments/exome%20run%201.vcf"
        );
    }
}

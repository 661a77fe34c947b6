//! Dataset upload DTOs

/// File extensions the backend accepts
pub const ALLOWED_EXTENSIONS: [&str; 4] = [".vcf", ".vcf.gz", ".csv", ".txt"];

/// Largest upload the dashboard allows, in megabytes
pub const MAX_UPLOAD_MB: u64 = 100;

/// Multipart upload for `POST /datasets`
#[derive(Debug, Clone)]
pub struct UploadDataset {
    /// Original file name, sent as the multipart file name
    pub file_name: String,
    pub content: Vec<u8>,
    pub name: String,
    pub description: Option<String>,
}

impl UploadDataset {
    /// Checks the upload against the limits the backend enforces
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("dataset name cannot be empty".to_string());
        }

        let lower = self.file_name.to_ascii_lowercase();
        if !ALLOWED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            return Err(format!(
                "invalid file type '{}'. Allowed: {}",
                self.file_name,
                ALLOWED_EXTENSIONS.join(", ")
            ));
        }

        if self.content.is_empty() {
            return Err(format!("file '{}' is empty", self.file_name));
        }

        if self.content.len() as u64 > MAX_UPLOAD_MB * 1024 * 1024 {
            return Err(format!(
                "file is too large. Maximum size is {}MB",
                MAX_UPLOAD_MB
            ));
        }

        Ok(())
    }

    /// Upload size in megabytes
    pub fn size_mb(&self) -> f64 {
        self.content.len() as f64 / (1024.0 * 1024.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(file_name: &str, content: Vec<u8>) -> UploadDataset {
        UploadDataset {
            file_name: file_name.to_string(),
            content,
            name: "cohort".to_string(),
            description: None,
        }
    }

    #[test]
    fn test_accepts_known_extensions() {
        for name in ["a.vcf", "b.VCF.GZ", "c.csv", "d.txt"] {
            assert!(upload(name, vec![b'#']).validate().is_ok(), "{}", name);
        }
    }

    #[test]
    fn test_rejects_unknown_extension() {
        let err = upload("genotypes.bed", vec![1]).validate().unwrap_err();
        assert!(err.contains(".vcf.gz"));
    }

    #[test]
    fn test_rejects_empty_name_and_content() {
        let mut req = upload("a.vcf", vec![]);
        assert!(req.validate().is_err());
        req.content = vec![1];
        req.name = "  ".to_string();
        assert!(req.validate().is_err());
    }
}

//! Duplicate-aware batch planning for cover art.
//!
//! Catalog imports often carry the same cover once per track. Entries are
//! grouped by a case-insensitive, trimmed album key before any network call;
//! one upload is issued per distinct key and its outcome is projected back
//! onto every entry that shares the key. First-occurrence order is kept so
//! targets still line up with descriptors.

use waveform_core::{AppError, UploadDescriptor};

/// Normalized grouping key for an album name.
pub fn dedup_key(album_name: &str) -> String {
    album_name.trim().to_lowercase()
}

/// Upload plan for a keyed batch: the unique descriptors to actually upload
/// and, per input entry, the index of the unique upload it reuses.
#[derive(Debug, Clone)]
pub struct UploadPlan {
    unique: Vec<UploadDescriptor>,
    assignment: Vec<usize>,
}

impl UploadPlan {
    /// Group `(album_name, descriptor)` entries by key. The first entry for
    /// a key contributes the descriptor; later same-key entries reuse it.
    pub fn build(entries: &[(String, UploadDescriptor)]) -> Self {
        let mut unique: Vec<UploadDescriptor> = Vec::new();
        let mut keys: Vec<String> = Vec::new();
        let mut assignment: Vec<usize> = Vec::with_capacity(entries.len());

        for (album_name, descriptor) in entries {
            let key = dedup_key(album_name);
            match keys.iter().position(|existing| existing == &key) {
                Some(index) => assignment.push(index),
                None => {
                    keys.push(key);
                    unique.push(descriptor.clone());
                    assignment.push(unique.len() - 1);
                }
            }
        }

        Self { unique, assignment }
    }

    /// Descriptors to upload, one per distinct key, in first-occurrence order.
    pub fn unique(&self) -> &[UploadDescriptor] {
        &self.unique
    }

    pub fn is_empty(&self) -> bool {
        self.unique.is_empty()
    }

    /// Fan the per-unique-upload results back out to every input entry.
    pub fn project<T: Clone>(&self, unique_results: &[T]) -> Result<Vec<T>, AppError> {
        if unique_results.len() != self.unique.len() {
            return Err(AppError::LengthMismatch {
                files: self.unique.len(),
                targets: unique_results.len(),
            });
        }
        Ok(self
            .assignment
            .iter()
            .map(|&index| unique_results[index].clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(album: &str, file: &str) -> (String, UploadDescriptor) {
        (
            album.to_string(),
            UploadDescriptor {
                file_name: file.to_string(),
                content_type: "image/jpeg".to_string(),
                file_size: 2048,
            },
        )
    }

    #[test]
    fn test_same_key_entries_share_one_upload() {
        let entries = vec![
            entry("Night Drive", "cover-1.jpg"),
            entry("  night drive ", "cover-2.jpg"),
            entry("NIGHT DRIVE", "cover-3.jpg"),
        ];
        let plan = UploadPlan::build(&entries);
        assert_eq!(plan.unique().len(), 1);
        // the first occurrence's file wins
        assert_eq!(plan.unique()[0].file_name, "cover-1.jpg");
    }

    #[test]
    fn test_distinct_keys_keep_first_occurrence_order() {
        let entries = vec![
            entry("Album B", "b.jpg"),
            entry("Album A", "a.jpg"),
            entry("album b", "b-dup.jpg"),
        ];
        let plan = UploadPlan::build(&entries);
        let names: Vec<&str> = plan.unique().iter().map(|d| d.file_name.as_str()).collect();
        assert_eq!(names, vec!["b.jpg", "a.jpg"]);
    }

    #[test]
    fn test_projection_fans_results_back_out() {
        let entries = vec![
            entry("Album B", "b.jpg"),
            entry("Album A", "a.jpg"),
            entry("album b", "b-dup.jpg"),
        ];
        let plan = UploadPlan::build(&entries);
        let projected = plan
            .project(&["url-b".to_string(), "url-a".to_string()])
            .unwrap();
        assert_eq!(projected, vec!["url-b", "url-a", "url-b"]);
    }

    #[test]
    fn test_projection_rejects_wrong_result_count() {
        let plan = UploadPlan::build(&[entry("Album A", "a.jpg")]);
        assert!(matches!(
            plan.project(&Vec::<String>::new()),
            Err(AppError::LengthMismatch { .. })
        ));
    }
}

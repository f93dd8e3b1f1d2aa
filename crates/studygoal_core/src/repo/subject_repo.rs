//! Subject repository.
//!
//! # Invariants
//! - Subject names are trimmed, non-empty and unique (exact match).
//! - Deleting a subject never touches goals referring to its name.

use crate::model::subject::{normalize_subject_name, Subject};
use crate::repo::{RecordKind, RepoError, RepoResult};

/// Ordered in-memory subject collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectRepository {
    subjects: Vec<Subject>,
}

impl SubjectRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a repository from persisted records, keeping their order.
    ///
    /// Later records whose name repeats an earlier one are dropped so the
    /// uniqueness invariant holds even for hand-edited storage.
    pub fn from_records(records: Vec<Subject>) -> Self {
        let mut repo = Self::new();
        for record in records {
            if !repo.contains_name(&record.name) {
                repo.subjects.push(record);
            }
        }
        repo
    }

    /// Creates a subject from user input.
    ///
    /// # Errors
    /// - `Validation` when the trimmed name is empty.
    /// - `DuplicateSubject` when the name is already taken.
    pub fn add_subject(&mut self, name: &str) -> RepoResult<Subject> {
        let name = normalize_subject_name(name)
            .ok_or_else(|| RepoError::Validation("subject name cannot be empty".to_string()))?;
        if self.contains_name(&name) {
            return Err(RepoError::DuplicateSubject(name));
        }

        let subject = Subject::new(name);
        self.subjects.push(subject.clone());
        Ok(subject)
    }

    /// Removes one subject by id and returns it.
    pub fn delete_subject(&mut self, id: &str) -> RepoResult<Subject> {
        let index = self
            .subjects
            .iter()
            .position(|subject| subject.id == id)
            .ok_or_else(|| RepoError::NotFound {
                kind: RecordKind::Subject,
                id: id.to_string(),
            })?;
        Ok(self.subjects.remove(index))
    }

    /// Returns a snapshot in insertion order.
    pub fn list_subjects(&self) -> Vec<Subject> {
        self.subjects.clone()
    }

    pub fn records(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Subject> {
        self.subjects.iter().find(|subject| subject.name == name)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.find_by_name(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::SubjectRepository;
    use crate::model::subject::Subject;
    use crate::repo::{RecordKind, RepoError};

    #[test]
    fn add_subject_trims_and_keeps_insertion_order() {
        let mut repo = SubjectRepository::new();
        repo.add_subject("  Math ").unwrap();
        repo.add_subject("Physics").unwrap();

        let names: Vec<String> = repo.list_subjects().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Math".to_string(), "Physics".to_string()]);
    }

    #[test]
    fn add_subject_rejects_blank_name() {
        let mut repo = SubjectRepository::new();
        let err = repo.add_subject("   ").unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
        assert!(repo.is_empty());
    }

    #[test]
    fn duplicate_name_is_rejected_after_trimming_but_case_matters() {
        let mut repo = SubjectRepository::new();
        repo.add_subject("Math").unwrap();

        let err = repo.add_subject(" Math").unwrap_err();
        assert_eq!(err, RepoError::DuplicateSubject("Math".to_string()));
        assert_eq!(repo.len(), 1);

        repo.add_subject("math").unwrap();
        assert_eq!(repo.len(), 2);
    }

    #[test]
    fn delete_unknown_subject_is_not_found() {
        let mut repo = SubjectRepository::new();
        let err = repo.delete_subject("missing").unwrap_err();
        assert_eq!(
            err,
            RepoError::NotFound {
                kind: RecordKind::Subject,
                id: "missing".to_string()
            }
        );
    }

    #[test]
    fn from_records_drops_repeated_names() {
        let first = Subject::new("Math");
        let repeated = Subject::new("Math");
        let other = Subject::new("Art");
        let repo = SubjectRepository::from_records(vec![first.clone(), repeated, other.clone()]);
        assert_eq!(repo.list_subjects(), vec![first, other]);
    }
}

//! Goal repository.
//!
//! # Responsibility
//! - Provide create/toggle/update/delete/list over the goal collection.
//! - Check subject references against the live subject collection on write.
//!
//! # Invariants
//! - `completed` and `date` are never changed by `update_goal`.
//! - Validation runs before any field is written, so a rejected patch leaves
//!   the goal untouched.
//! - Subject references are weak: nothing here reacts to subject deletion.

use crate::model::goal::{Goal, GoalPatch, NewGoal};
use crate::repo::subject_repo::SubjectRepository;
use crate::repo::{RecordKind, RepoError, RepoResult};

/// Ordered in-memory goal collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalRepository {
    goals: Vec<Goal>,
}

impl GoalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a repository from persisted records, keeping their order.
    pub fn from_records(records: Vec<Goal>) -> Self {
        Self { goals: records }
    }

    /// Creates one open goal.
    ///
    /// # Errors
    /// - `Validation` when the trimmed title is empty.
    /// - `Validation` when `subject` names no subject in `subjects`.
    pub fn add_goal(&mut self, input: NewGoal, subjects: &SubjectRepository) -> RepoResult<Goal> {
        let title = normalize_title(&input.title)?;
        let subject = resolve_subject_name(&input.subject, subjects)?;
        let goal = Goal::new(title, subject, input.description.unwrap_or_default());
        self.goals.push(goal.clone());
        Ok(goal)
    }

    /// Flips `completed` and returns the updated goal.
    pub fn toggle_goal_completion(&mut self, id: &str) -> RepoResult<Goal> {
        let goal = self.goal_mut(id)?;
        goal.completed = !goal.completed;
        Ok(goal.clone())
    }

    /// Merges the provided fields into one goal.
    pub fn update_goal(
        &mut self,
        id: &str,
        patch: GoalPatch,
        subjects: &SubjectRepository,
    ) -> RepoResult<Goal> {
        let index = self.index_of(id)?;
        let title = patch.title.as_deref().map(normalize_title).transpose()?;
        let subject = patch
            .subject
            .as_deref()
            .map(|name| resolve_subject_name(name, subjects))
            .transpose()?;

        let goal = &mut self.goals[index];
        if let Some(title) = title {
            goal.title = title;
        }
        if let Some(subject) = subject {
            goal.subject = subject;
        }
        if let Some(description) = patch.description {
            goal.description = description;
        }
        Ok(goal.clone())
    }

    /// Removes one goal by id and returns it.
    pub fn delete_goal(&mut self, id: &str) -> RepoResult<Goal> {
        let index = self.index_of(id)?;
        Ok(self.goals.remove(index))
    }

    /// Returns a snapshot in insertion order.
    pub fn list_goals(&self) -> Vec<Goal> {
        self.goals.clone()
    }

    pub fn records(&self) -> &[Goal] {
        &self.goals
    }

    pub fn get_goal(&self, id: &str) -> Option<&Goal> {
        self.goals.iter().find(|goal| goal.id == id)
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    fn index_of(&self, id: &str) -> RepoResult<usize> {
        self.goals
            .iter()
            .position(|goal| goal.id == id)
            .ok_or_else(|| RepoError::NotFound {
                kind: RecordKind::Goal,
                id: id.to_string(),
            })
    }

    fn goal_mut(&mut self, id: &str) -> RepoResult<&mut Goal> {
        let index = self.index_of(id)?;
        Ok(&mut self.goals[index])
    }
}

fn normalize_title(title: &str) -> RepoResult<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(RepoError::Validation("goal title cannot be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

fn resolve_subject_name(name: &str, subjects: &SubjectRepository) -> RepoResult<String> {
    let trimmed = name.trim();
    match subjects.find_by_name(trimmed) {
        Some(subject) => Ok(subject.name.clone()),
        None => Err(RepoError::Validation(format!("unknown subject: `{trimmed}`"))),
    }
}

#[cfg(test)]
mod tests {
    use super::GoalRepository;
    use crate::model::goal::{GoalPatch, NewGoal};
    use crate::repo::subject_repo::SubjectRepository;
    use crate::repo::{RecordKind, RepoError};

    fn subjects(names: &[&str]) -> SubjectRepository {
        let mut repo = SubjectRepository::new();
        for name in names {
            repo.add_subject(name).unwrap();
        }
        repo
    }

    #[test]
    fn add_goal_requires_existing_subject() {
        let mut goals = GoalRepository::new();
        let err = goals
            .add_goal(NewGoal::new("X", "Unknown"), &SubjectRepository::new())
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
        assert!(goals.is_empty());
    }

    #[test]
    fn add_goal_trims_title_and_defaults_fields() {
        let mut goals = GoalRepository::new();
        let goal = goals
            .add_goal(NewGoal::new("  Finish ch.3 ", "Math"), &subjects(&["Math"]))
            .unwrap();
        assert_eq!(goal.title, "Finish ch.3");
        assert_eq!(goal.subject, "Math");
        assert_eq!(goal.description, "");
        assert!(!goal.completed);
        assert!(goal.created_at().is_some());
    }

    #[test]
    fn toggle_flips_only_completed() {
        let mut goals = GoalRepository::new();
        let created = goals
            .add_goal(NewGoal::new("Read", "Math").description("pages 1-10"), &subjects(&["Math"]))
            .unwrap();

        let toggled = goals.toggle_goal_completion(&created.id).unwrap();
        assert!(toggled.completed);
        assert_eq!(toggled.title, created.title);
        assert_eq!(toggled.description, created.description);
        assert_eq!(toggled.date, created.date);

        let back = goals.toggle_goal_completion(&created.id).unwrap();
        assert_eq!(back, created);
    }

    #[test]
    fn rejected_patch_leaves_goal_untouched() {
        let subjects = subjects(&["Math"]);
        let mut goals = GoalRepository::new();
        let created = goals.add_goal(NewGoal::new("Read", "Math"), &subjects).unwrap();

        let patch = GoalPatch {
            title: Some("Renamed".to_string()),
            subject: Some("Biology".to_string()),
            description: None,
        };
        let err = goals.update_goal(&created.id, patch, &subjects).unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
        assert_eq!(goals.get_goal(&created.id), Some(&created));

        let blank_title = GoalPatch {
            title: Some("   ".to_string()),
            ..GoalPatch::default()
        };
        assert!(goals.update_goal(&created.id, blank_title, &subjects).is_err());
    }

    #[test]
    fn update_merges_only_provided_fields() {
        let subjects = subjects(&["Math", "Physics"]);
        let mut goals = GoalRepository::new();
        let created = goals.add_goal(NewGoal::new("Read", "Math"), &subjects).unwrap();
        goals.toggle_goal_completion(&created.id).unwrap();

        let patch = GoalPatch {
            subject: Some("Physics".to_string()),
            ..GoalPatch::default()
        };
        let updated = goals.update_goal(&created.id, patch, &subjects).unwrap();
        assert_eq!(updated.title, "Read");
        assert_eq!(updated.subject, "Physics");
        assert!(updated.completed);
        assert_eq!(updated.date, created.date);
    }

    #[test]
    fn operations_on_missing_goal_are_not_found() {
        let mut goals = GoalRepository::new();
        let expected = RepoError::NotFound {
            kind: RecordKind::Goal,
            id: "nope".to_string(),
        };
        assert_eq!(goals.toggle_goal_completion("nope").unwrap_err(), expected);
        assert_eq!(goals.delete_goal("nope").unwrap_err(), expected);
        assert_eq!(
            goals
                .update_goal("nope", GoalPatch::default(), &SubjectRepository::new())
                .unwrap_err(),
            expected
        );
    }
}

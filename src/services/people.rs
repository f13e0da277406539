//! People management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::person::{
        LoanedBook, Person, PersonDetails, PersonFilter, PersonPayload, PersonSearchQuery,
        PersonSummary,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct PeopleService {
    repository: Repository,
}

impl PeopleService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List people with pagination and loan counts, optionally sorted by name
    pub async fn list_people(
        &self,
        page: i64,
        per_page: i64,
        sort_by_name: bool,
    ) -> AppResult<(Vec<PersonSummary>, i64)> {
        self.repository.people.list(page, per_page, sort_by_name).await
    }

    /// Get a person with their current loans, overdue flags recomputed
    pub async fn get_person(&self, id: i32) -> AppResult<PersonDetails> {
        let person = self.repository.people.get_by_id(id).await?;
        let books = self.repository.people.borrowed_books(id).await?;

        Ok(PersonDetails {
            id: person.id,
            full_name: person.full_name,
            year_of_birth: person.year_of_birth,
            books,
        })
    }

    /// Books currently on loan to a person
    pub async fn person_books(&self, id: i32) -> AppResult<Vec<LoanedBook>> {
        // Verify person exists
        self.repository.people.get_by_id(id).await?;
        self.repository.people.borrowed_books(id).await
    }

    /// Create a new person. Duplicate full names are rejected with a
    /// field-level error; the check runs on creation only. The pre-check
    /// here is a friendlier message, the storage unique index is the
    /// authoritative signal for concurrent creations.
    pub async fn create_person(&self, person: PersonPayload) -> AppResult<Person> {
        person.validate()?;

        if self
            .repository
            .people
            .find_by_full_name(&person.full_name)
            .await?
            .is_some()
        {
            return Err(AppError::duplicate_full_name());
        }

        let created = self.repository.people.create(&person).await?;
        tracing::info!("Person '{}' created with id {}", created.full_name, created.id);
        Ok(created)
    }

    /// Update an existing person. No uniqueness pre-check on update.
    pub async fn update_person(&self, id: i32, person: PersonPayload) -> AppResult<Person> {
        person.validate()?;

        let updated = self.repository.people.update(id, &person).await?;
        tracing::info!("Person with id {} updated", id);
        Ok(updated)
    }

    /// Delete a person; their borrowed books return to the shelf
    pub async fn delete_person(&self, id: i32) -> AppResult<()> {
        self.repository.people.delete(id).await?;
        tracing::info!("Person with id {} deleted", id);
        Ok(())
    }

    /// Search people by name and/or year of birth. With neither field
    /// given the dispatch is never reached and the result is empty.
    pub async fn search_people(&self, query: PersonSearchQuery) -> AppResult<Vec<Person>> {
        match PersonFilter::from_query(query.name, query.year) {
            Some(filter) => self.repository.people.search(&filter).await,
            None => Ok(Vec::new()),
        }
    }
}

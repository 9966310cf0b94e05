use std::collections::HashSet;

use serde::Deserialize;

use super::domain::{Pet, PetId, ShelterId};

/// Query parameters accepted alongside an application lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PetSearch {
    #[serde(default)]
    pub find_pet: Option<String>,
    #[serde(default)]
    pub shelter_id: Option<ShelterId>,
}

impl PetSearch {
    pub fn named(query: impl Into<String>) -> Self {
        Self {
            find_pet: Some(query.into()),
            shelter_id: None,
        }
    }

    pub fn in_shelter(mut self, shelter_id: ShelterId) -> Self {
        self.shelter_id = Some(shelter_id);
        self
    }

    pub fn is_requested(&self) -> bool {
        self.find_pet.is_some()
    }

    pub fn query(&self) -> &str {
        self.find_pet.as_deref().unwrap_or_default()
    }
}

/// Case-insensitive substring match on pet names, skipping `exclude`.
///
/// A blank query matches nothing. Results are ordered by name, then id.
pub fn search_pets<'a, I>(pool: I, query: &str, exclude: &HashSet<PetId>) -> Vec<Pet>
where
    I: IntoIterator<Item = &'a Pet>,
{
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<(String, Pet)> = pool
        .into_iter()
        .filter(|pet| !exclude.contains(&pet.id))
        .filter_map(|pet| {
            let folded = pet.name.to_lowercase();
            folded.contains(&needle).then(|| (folded, pet.clone()))
        })
        .collect();

    matches.sort_by(|(a_name, a), (b_name, b)| a_name.cmp(b_name).then(a.id.cmp(&b.id)));
    matches.into_iter().map(|(_, pet)| pet).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pet(id: u64, name: &str) -> Pet {
        Pet {
            id: PetId(id),
            shelter_id: ShelterId(1),
            name: name.to_string(),
            breed: "Great Dane".to_string(),
            age: 2,
            adoptable: true,
        }
    }

    fn pool() -> Vec<Pet> {
        vec![pet(1, "Scooby"), pet(2, "Scrappy"), pet(3, "Daisy")]
    }

    fn names(pets: &[Pet]) -> Vec<&str> {
        pets.iter().map(|pet| pet.name.as_str()).collect()
    }

    #[test]
    fn matches_regardless_of_case() {
        let found = search_pets(&pool(), "sCrAPpY", &HashSet::new());
        assert_eq!(names(&found), vec!["Scrappy"]);
    }

    #[test]
    fn matches_partial_names() {
        let found = search_pets(&pool(), "Sc", &HashSet::new());
        assert_eq!(names(&found), vec!["Scooby", "Scrappy"]);

        let found = search_pets(&pool(), "Scr", &HashSet::new());
        assert_eq!(names(&found), vec!["Scrappy"]);
    }

    #[test]
    fn never_returns_excluded_pets() {
        let exclude = HashSet::from([PetId(2)]);
        let found = search_pets(&pool(), "scr", &exclude);
        assert!(found.is_empty());
    }

    #[test]
    fn blank_query_matches_nothing() {
        assert!(search_pets(&pool(), "", &HashSet::new()).is_empty());
        assert!(search_pets(&pool(), "   ", &HashSet::new()).is_empty());
    }

    #[test]
    fn ignores_breed() {
        assert!(search_pets(&pool(), "Dane", &HashSet::new()).is_empty());
    }

    #[test]
    fn no_match_returns_empty() {
        assert!(search_pets(&pool(), "Moose", &HashSet::new()).is_empty());
    }
}

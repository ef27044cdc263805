use {
    crate::{Exercise, ExerciseRecord, RegistryError},
    std::{collections::BTreeMap, fs, path::Path},
};

const BUILTIN_CATALOG: &str = include_str!("../assets/exercises.json");

/// Immutable map of exercises by id, built once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Registry {
    exercises: BTreeMap<u32, Exercise>,
}

impl Registry {
    /// Validate every record and build the registry. Any invalid record or
    /// duplicate id fails the whole load.
    pub fn load(records: impl IntoIterator<Item = ExerciseRecord>) -> Result<Self, RegistryError> {
        let mut exercises = BTreeMap::new();
        for record in records {
            let id = record.id;
            if exercises.contains_key(&id) {
                return Err(RegistryError::InvalidExerciseDefinition {
                    id,
                    reason: "duplicate id".to_string(),
                });
            }
            exercises.insert(id, Exercise::try_from(record)?);
        }
        if exercises.is_empty() {
            return Err(RegistryError::Catalog("catalog contains no exercises".to_string()));
        }
        Ok(Self { exercises })
    }

    /// Parse a JSON array of exercise records.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let records: Vec<ExerciseRecord> = serde_json::from_str(json)?;
        Self::load(records)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| RegistryError::Catalog(format!("{}: {}", path.display(), e)))?;
        let registry = Self::from_json(&json)?;
        log::info!(
            "loaded {} exercises from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    /// The catalog bundled with the crate.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn get(&self, id: u32) -> Option<&Exercise> {
        self.exercises.get(&id)
    }

    pub fn require(&self, id: u32) -> Result<&Exercise, RegistryError> {
        self.get(id).ok_or(RegistryError::UnknownExercise(id))
    }

    /// Exercises in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Exercise> {
        self.exercises.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.exercises.keys().copied()
    }

    /// The exercise with the lowest id.
    pub fn first(&self) -> Option<&Exercise> {
        self.exercises.values().next()
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }
}

use crate::error::StorageResult;
use crate::storage::{KeyValueStore, Storage};
use crate::types::Plant;

/// Storage slot holding the whole plant list.
pub const PLANTS_KEY: &str = "garden-plants";

/// CRUD over the plant list kept in a single storage slot.
///
/// Each mutation reads the full list, changes it in memory and writes the full
/// list back. Nothing guards the gap between the read and the write, so two
/// interleaved callers can lose one another's change; the last write wins.
pub struct PlantStore<S> {
    storage: Storage<S>,
}

impl<S: KeyValueStore> PlantStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            storage: Storage::new(store),
        }
    }

    /// Replace the stored list.
    pub fn save_plants(&self, plants: &[Plant]) -> StorageResult<()> {
        self.storage.save(PLANTS_KEY, plants)
    }

    /// The stored list, or an empty one when nothing was saved yet.
    pub fn get_plants(&self) -> StorageResult<Vec<Plant>> {
        Ok(self.storage.get(PLANTS_KEY)?.unwrap_or_default())
    }

    pub fn find_plant(&self, id: &str) -> StorageResult<Option<Plant>> {
        Ok(self.get_plants()?.into_iter().find(|p| p.id == id))
    }

    pub fn add_plant(&self, plant: Plant) -> StorageResult<()> {
        let mut plants = self.get_plants()?;
        plants.push(plant);
        self.save_plants(&plants)
    }

    /// Replace the first plant with the same id, keeping its position.
    ///
    /// An unknown id leaves the store untouched.
    pub fn update_plant(&self, plant: Plant) -> StorageResult<()> {
        let mut plants = self.get_plants()?;
        match plants.iter().position(|p| p.id == plant.id) {
            Some(index) => {
                plants[index] = plant;
                self.save_plants(&plants)
            }
            None => {
                tracing::debug!("update_plant: no plant with id '{}'", plant.id);
                Ok(())
            }
        }
    }

    /// Remove every plant with this id.
    pub fn delete_plant(&self, id: &str) -> StorageResult<()> {
        let mut plants = self.get_plants()?;
        plants.retain(|p| p.id != id);
        self.save_plants(&plants)
    }
}

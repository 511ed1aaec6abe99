//! In-memory actor directory, filled by the host adapter.

use async_trait::async_trait;
use dashmap::DashMap;

use misrecall_domain::{ActorId, ActorKind, CreatureRecord};

use crate::infrastructure::ports::{CreatureDirectory, RepoError};

#[derive(Default)]
pub struct InMemoryCreatureDirectory {
    creatures: DashMap<ActorId, CreatureRecord>,
}

impl InMemoryCreatureDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CreatureDirectory for InMemoryCreatureDirectory {
    async fn get(&self, id: &ActorId) -> Result<Option<CreatureRecord>, RepoError> {
        Ok(self.creatures.get(id).map(|entry| entry.value().clone()))
    }

    async fn upsert(&self, creature: CreatureRecord) -> Result<(), RepoError> {
        self.creatures.insert(creature.id.clone(), creature);
        Ok(())
    }

    fn actor_kind(&self, id: &ActorId) -> Option<ActorKind> {
        self.creatures.get(id).map(|entry| entry.kind)
    }
}

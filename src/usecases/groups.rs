use tracing::{debug, instrument};

use super::{TodoStore, validation};
use crate::db::{
    Database, DbResult, Group, GroupPatch, GroupRepository, Id, ListResult, PageQuery,
};
use crate::notifier::UpdateMessage;

impl<D: Database> TodoStore<D> {
    /// Create a group. The name is trimmed and length-checked.
    #[instrument(skip(self))]
    pub async fn create_group(&self, name: &str) -> DbResult<Group> {
        let name = validation::group_name(name, &self.limits)?;
        let group = self.db.groups().create(&name).await?;

        debug!(group_id = group.id, "Group created");
        self.notifier
            .notify(UpdateMessage::GroupCreated { group_id: group.id });
        Ok(group)
    }

    #[instrument(skip(self))]
    pub async fn get_groups(&self, query: &PageQuery) -> DbResult<ListResult<Group>> {
        self.db.groups().list(query).await
    }

    #[instrument(skip(self))]
    pub async fn get_group(&self, id: Id) -> DbResult<Option<Group>> {
        self.db.groups().get(id).await
    }

    #[instrument(skip(self))]
    pub async fn update_group(&self, id: Id, patch: &GroupPatch) -> DbResult<Option<Group>> {
        let patch = validation::group_patch(patch, &self.limits)?;
        let group = self.db.groups().update(id, &patch).await?;

        if group.is_some() {
            self.notifier
                .notify(UpdateMessage::GroupUpdated { group_id: id });
        }
        Ok(group)
    }

    /// Delete a group together with its todos and their subtodos.
    #[instrument(skip(self))]
    pub async fn delete_group(&self, id: Id) -> DbResult<bool> {
        let deleted = self.db.groups().delete(id).await?;

        if deleted {
            debug!(group_id = id, "Group deleted");
            self.notifier
                .notify(UpdateMessage::GroupDeleted { group_id: id });
        }
        Ok(deleted)
    }
}

//! Attaching host entities to the patch under them
//!
//! Roles are never trusted from earlier bookkeeping. Every attach re-derives
//! the role from the entity's current properties, and the tick sweep drops
//! handles the host no longer recognises.

use crate::connector::role::{ConnectorRegistry, Role};
use crate::host::interface::{EntityHandle, Host};
use crate::spatial::key::{TileKey, TilePos};
use crate::storage::patch::PatchId;
use crate::storage::surface::Surface;

impl Surface {
    /// Attach every connector occupying the cell at `pos`
    pub fn resolve_cell<H: Host + ?Sized>(
        &mut self,
        host: &H,
        registry: &ConnectorRegistry,
        pos: TilePos,
    ) {
        for handle in host.entities_in_cell(self.id(), pos) {
            self.attach_entity(host, registry, handle);
        }
    }

    /// File an entity under the role its current properties give it
    ///
    /// Called when a connector is built or rotated. Any earlier filing of the
    /// handle on that tile is replaced. Returns `None` (after dropping the
    /// old filing) for invalid handles, unregistered names, unclassifiable
    /// loaders and entities that do not stand on a storage tile.
    pub fn attach_entity<H: Host + ?Sized>(
        &mut self,
        host: &H,
        registry: &ConnectorRegistry,
        handle: EntityHandle,
    ) -> Option<Role> {
        let info = host.describe(handle)?;
        self.detach_entity(host, handle, info.position);

        let role = registry.role_of(&info)?;
        let key = TileKey::try_from(info.position).ok()?;
        let id = self.owner(key)?;
        let patch = self.patch_mut(id)?;
        patch.connectors_mut().insert(role, key, handle);
        if role == Role::Scanner {
            self.refresh_limits(host, id);
        }
        Some(role)
    }

    /// Drop an entity's filing from the patch at `pos`
    ///
    /// Returns the role it was filed under, if any.
    pub fn detach_entity<H: Host + ?Sized>(
        &mut self,
        host: &H,
        handle: EntityHandle,
        pos: TilePos,
    ) -> Option<Role> {
        let id = self.patch_id_at(pos)?;
        let role = self.patch_mut(id)?.connectors_mut().remove_handle(handle)?;
        if role == Role::Scanner {
            self.refresh_limits(host, id);
        }
        Some(role)
    }

    /// Sweep a patch's connectors against the host
    ///
    /// Handles that no longer resolve, or resolve to something that is not a
    /// connector any more, are dropped silently. Connectors whose role
    /// changed without a notification are refiled. Returns how many handles
    /// were dropped.
    pub fn revalidate<H: Host + ?Sized>(
        &mut self,
        host: &H,
        registry: &ConnectorRegistry,
        id: PatchId,
    ) -> usize {
        let surface = self.id().0;
        let Some(patch) = self.patch_mut(id) else {
            return 0;
        };

        let mut pruned = 0;
        let mut scanners_changed = false;
        for role in Role::ALL {
            for (key, handle) in patch.connectors().entries(role) {
                let current = host
                    .describe(handle)
                    .and_then(|info| registry.role_of(&info));
                match current {
                    Some(derived) if derived == role => {}
                    Some(derived) => {
                        patch.connectors_mut().insert(derived, key, handle);
                        scanners_changed |= role == Role::Scanner || derived == Role::Scanner;
                    }
                    None => {
                        patch.connectors_mut().remove_handle(handle);
                        log::trace!(
                            "surface {surface}: pruned stale {role} connector {handle} at {key}"
                        );
                        scanners_changed |= role == Role::Scanner;
                        pruned += 1;
                    }
                }
            }
        }

        if scanners_changed {
            self.refresh_limits(host, id);
        }
        pruned
    }
}

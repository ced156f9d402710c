use crate::api::types::EntityId;
use crate::components::fixture::Fixture;

/// The spatial index that turns fixtures into candidate collision pairs.
///
/// Implementations own their indexing strategy. They may write proxies into
/// `fixture.proxies` on insertion and must forget them on removal.
pub trait BroadPhase {
    /// Index a fixture that was just attached to `body`.
    fn add_fixture(&mut self, body: EntityId, fixture: &mut Fixture);

    /// De-index a fixture that is being detached from `body`.
    fn remove_fixture(&mut self, body: EntityId, fixture: &mut Fixture);

    /// De-index everything belonging to `body`.
    fn remove_body(&mut self, body: EntityId);
}

/// Broad-phase that indexes nothing. For headless or server-side use where
/// another system owns spatial queries.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBroadPhase;

impl BroadPhase for NullBroadPhase {
    fn add_fixture(&mut self, _body: EntityId, _fixture: &mut Fixture) {}

    fn remove_fixture(&mut self, _body: EntityId, fixture: &mut Fixture) {
        fixture.proxies.clear();
    }

    fn remove_body(&mut self, _body: EntityId) {}
}

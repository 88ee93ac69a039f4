//! Handler themes (§4.7): one module per row-group of the tool table.

pub mod catalog;
pub mod common;
pub mod discovery;
pub mod lifecycle;
pub mod pq;
pub mod scripting;
pub mod session_crud;
pub mod tables;

use crate::dispatch::Dispatcher;

/// Registers one handler instance per tool name (§4.7's handler table).
pub fn register_all(dispatcher: &mut Dispatcher) {
    dispatcher.register(Box::new(lifecycle::Reload));

    dispatcher.register(Box::new(discovery::EnterpriseSystemsStatus));
    dispatcher.register(Box::new(discovery::ListSessions));
    dispatcher.register(Box::new(discovery::SessionDetails));

    dispatcher.register(Box::new(session_crud::SessionCommunityCreate));
    dispatcher.register(Box::new(session_crud::SessionCommunityDelete));
    dispatcher.register(Box::new(session_crud::SessionCommunityCredentials));
    dispatcher.register(Box::new(session_crud::SessionEnterpriseCreate));
    dispatcher.register(Box::new(session_crud::SessionEnterpriseDelete));

    dispatcher.register(Box::new(tables::SessionTablesList));
    dispatcher.register(Box::new(tables::SessionTablesSchema));
    dispatcher.register(Box::new(tables::SessionTableData));

    dispatcher.register(Box::new(catalog::CatalogNamespacesList));
    dispatcher.register(Box::new(catalog::CatalogTablesList));
    dispatcher.register(Box::new(catalog::CatalogTablesSchema));
    dispatcher.register(Box::new(catalog::CatalogTableSample));

    dispatcher.register(Box::new(scripting::SessionScriptRun));
    dispatcher.register(Box::new(scripting::SessionPipList));

    dispatcher.register(Box::new(pq::PqList));
    dispatcher.register(Box::new(pq::PqDetails));
    dispatcher.register(Box::new(pq::PqNameToId));
    dispatcher.register(Box::new(pq::PqCreate));
    dispatcher.register(Box::new(pq::PqModify));
    dispatcher.register(Box::new(pq::PqStart));
    dispatcher.register(Box::new(pq::PqStop));
    dispatcher.register(Box::new(pq::PqRestart));
    dispatcher.register(Box::new(pq::PqDelete));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_theme_contributes_at_least_one_handler() {
        let mut dispatcher = Dispatcher::new();
        register_all(&mut dispatcher);
        let names = dispatcher.names();
        assert!(names.contains(&"reload"));
        assert!(names.contains(&"list_sessions"));
        assert!(names.contains(&"session_enterprise_create"));
        assert!(names.contains(&"session_table_data"));
        assert!(names.contains(&"catalog_table_sample"));
        assert!(names.contains(&"session_script_run"));
        assert!(names.contains(&"pq_delete"));
        assert_eq!(names.len(), 27);
    }
}

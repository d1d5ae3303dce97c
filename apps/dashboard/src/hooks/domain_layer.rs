use dioxus::prelude::*;

use crate::hooks::map_data::use_map_data;
use crate::models::{DataSource, Domain};
use crate::state::{use_dashboard_actions, use_dashboard_state};

/// Keeps one domain's load phase in step with its data hook.
///
/// The hook stays enabled from the first activation on, so switching the
/// layer off keeps its collection and switching it back on never refetches.
pub fn use_domain_layer(domain: Domain, source: DataSource) {
    let state = use_dashboard_state();
    let actions = use_dashboard_actions();

    let enabled = state.read().layers.is_requested(domain);
    let data = use_map_data(source.endpoint, enabled);

    use_effect(move || {
        let snapshot = data.read().clone();
        actions.sync_layer(domain, &snapshot);
    });
}

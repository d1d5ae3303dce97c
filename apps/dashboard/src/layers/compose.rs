use std::collections::BTreeMap;
use std::sync::Arc;

use geojson::FeatureCollection;

use super::{build_layer, HoverHandler, LayerDescriptor};
use crate::models::{ActiveLayers, Domain, MapData};

/// Data lifecycle of one wired domain.
///
/// The phase tracks the data only. Whether the layer is drawn also depends
/// on the domain's flag, so a `Loaded` domain whose flag is off keeps its
/// data and is simply not composed.
#[derive(Clone, Debug, Default)]
pub enum LoadPhase {
    #[default]
    Inactive,
    Loading,
    Loaded(Arc<FeatureCollection>),
    Failed,
}

impl PartialEq for LoadPhase {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Loaded(left), Self::Loaded(right)) => Arc::ptr_eq(left, right),
            (Self::Inactive, Self::Inactive)
            | (Self::Loading, Self::Loading)
            | (Self::Failed, Self::Failed) => true,
            _ => false,
        }
    }
}

impl LoadPhase {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::Loading => "loading",
            Self::Loaded(_) => "loaded",
            Self::Failed => "failed",
        }
    }
}

/// Load phases for every wired domain. Unwired domains never leave `Inactive`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayerSlots {
    phases: BTreeMap<Domain, LoadPhase>,
}

impl LayerSlots {
    pub fn phase(&self, domain: Domain) -> &LoadPhase {
        static INACTIVE: LoadPhase = LoadPhase::Inactive;
        self.phases.get(&domain).unwrap_or(&INACTIVE)
    }

    /// True once the domain has left `Inactive`; stays true for the view's lifetime.
    pub fn is_requested(&self, domain: Domain) -> bool {
        self.phases.contains_key(&domain)
    }

    /// `Inactive -> Loading` on the first activation of a wired domain.
    /// Returns whether that transition happened.
    pub fn activate(&mut self, domain: Domain) -> bool {
        if !domain.is_wired() || self.is_requested(domain) {
            return false;
        }
        self.phases.insert(domain, LoadPhase::Loading);
        true
    }

    /// Folds a data hook snapshot into the domain's phase. Snapshots for
    /// domains that were never activated are ignored.
    pub fn apply(&mut self, domain: Domain, snapshot: &MapData) {
        let Some(phase) = self.phases.get_mut(&domain) else {
            return;
        };

        let next = match (&snapshot.data, snapshot.is_error) {
            (Some(data), _) => LoadPhase::Loaded(Arc::clone(data)),
            (None, true) => LoadPhase::Failed,
            // A loaded collection is never given up for a blank snapshot.
            (None, false) if matches!(phase, LoadPhase::Loaded(_)) => return,
            (None, false) => LoadPhase::Loading,
        };

        if *phase != next {
            tracing::debug!(domain = domain.key(), phase = next.label(), "layer phase");
            *phase = next;
        }
    }

    pub fn loaded(&self, domain: Domain) -> Option<&Arc<FeatureCollection>> {
        match self.phases.get(&domain) {
            Some(LoadPhase::Loaded(data)) => Some(data),
            _ => None,
        }
    }
}

/// Overlay layers to draw: every wired domain whose flag is on and whose
/// data has arrived, in catalog order.
pub fn compose_layers(
    active: &ActiveLayers,
    slots: &LayerSlots,
    on_hover: &HoverHandler,
) -> Vec<LayerDescriptor> {
    Domain::wired()
        .filter(|domain| active.is_active(*domain))
        .filter_map(|domain| {
            let data = slots.loaded(domain)?;
            build_layer(domain, Arc::clone(data), on_hover.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::test_support::{collection, recording_handler};
    use serde_json::json;

    fn ids(layers: &[LayerDescriptor]) -> Vec<&'static str> {
        layers.iter().map(|layer| layer.id).collect()
    }

    #[test]
    fn first_activation_starts_loading_once() {
        let mut slots = LayerSlots::default();
        assert_eq!(slots.phase(Domain::Economy), &LoadPhase::Inactive);
        assert!(slots.activate(Domain::Economy));
        assert_eq!(slots.phase(Domain::Economy), &LoadPhase::Loading);
        assert!(!slots.activate(Domain::Economy));
    }

    #[test]
    fn unwired_domains_never_activate() {
        let mut slots = LayerSlots::default();
        assert!(!slots.activate(Domain::Security));
        assert!(!slots.is_requested(Domain::Security));
        slots.apply(Domain::Security, &MapData::loaded(collection(Vec::new())));
        assert_eq!(slots.phase(Domain::Security), &LoadPhase::Inactive);
    }

    #[test]
    fn layer_visible_only_when_flag_on_and_loaded() {
        let (handler, _) = recording_handler();
        let data = collection(vec![json!({ "amount": 1 })]);
        let mut slots = LayerSlots::default();
        let mut active = ActiveLayers::default();

        // flag on, data pending
        active = active.toggled(Domain::Economy);
        slots.activate(Domain::Economy);
        slots.apply(Domain::Economy, &MapData::loading());
        assert!(compose_layers(&active, &slots, &handler).is_empty());

        // data arrives
        slots.apply(Domain::Economy, &MapData::loaded(Arc::clone(&data)));
        assert_eq!(ids(&compose_layers(&active, &slots, &handler)), vec!["economy-layer"]);

        // flag off keeps the data but hides the layer
        active = active.toggled(Domain::Economy);
        assert!(compose_layers(&active, &slots, &handler).is_empty());
        assert!(slots.loaded(Domain::Economy).is_some());

        // flag back on shows it again without a new activation
        active = active.toggled(Domain::Economy);
        assert!(!slots.activate(Domain::Economy));
        assert_eq!(ids(&compose_layers(&active, &slots, &handler)), vec!["economy-layer"]);
    }

    #[test]
    fn loaded_data_without_flag_is_not_drawn() {
        let (handler, _) = recording_handler();
        let mut slots = LayerSlots::default();
        slots.activate(Domain::Politics);
        slots.apply(Domain::Politics, &MapData::loaded(collection(Vec::new())));
        assert!(compose_layers(&ActiveLayers::default(), &slots, &handler).is_empty());
    }

    #[test]
    fn failed_load_stays_hidden() {
        let (handler, _) = recording_handler();
        let mut slots = LayerSlots::default();
        let active = ActiveLayers::default().toggled(Domain::Environment);
        slots.activate(Domain::Environment);
        slots.apply(Domain::Environment, &MapData::failed());
        assert_eq!(slots.phase(Domain::Environment), &LoadPhase::Failed);
        assert!(compose_layers(&active, &slots, &handler).is_empty());
    }

    #[test]
    fn blank_snapshot_does_not_drop_loaded_data() {
        let mut slots = LayerSlots::default();
        let data = collection(Vec::new());
        slots.activate(Domain::Politics);
        slots.apply(Domain::Politics, &MapData::loaded(Arc::clone(&data)));
        slots.apply(Domain::Politics, &MapData::default());
        assert_eq!(slots.phase(Domain::Politics), &LoadPhase::Loaded(data));
    }

    #[test]
    fn composition_follows_catalog_order() {
        let (handler, _) = recording_handler();
        let mut slots = LayerSlots::default();
        let mut active = ActiveLayers::default();
        for domain in [Domain::Environment, Domain::Economy, Domain::Politics] {
            active = active.toggled(domain);
            slots.activate(domain);
            slots.apply(domain, &MapData::loaded(collection(Vec::new())));
        }
        assert_eq!(
            ids(&compose_layers(&active, &slots, &handler)),
            vec!["economy-layer", "politics-layer", "environment-layer"]
        );
    }

    #[test]
    fn toggling_unwired_domain_leaves_overlay_unchanged() {
        let (handler, _) = recording_handler();
        let mut slots = LayerSlots::default();
        let mut active = ActiveLayers::default().toggled(Domain::Economy);
        slots.activate(Domain::Economy);
        slots.apply(Domain::Economy, &MapData::loaded(collection(Vec::new())));
        let before = compose_layers(&active, &slots, &handler);

        active = active.toggled(Domain::Security);
        slots.activate(Domain::Security);
        let after = compose_layers(&active, &slots, &handler);

        assert_eq!(ids(&before), ids(&after));
    }
}

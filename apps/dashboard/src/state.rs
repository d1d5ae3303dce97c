use dioxus::prelude::*;

use crate::layers::{HoverEvent, LayerSlots, LoadPhase};
use crate::models::{ActiveLayers, Domain, MapData, TooltipInfo, ViewState};

pub type DashboardSignal = Signal<DashboardState>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ApiHealth {
    #[default]
    Checking,
    Online {
        version: Option<String>,
    },
    Offline,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DashboardState {
    pub active: ActiveLayers,
    pub layers: LayerSlots,
    pub tooltip: Option<TooltipInfo>,
    pub view_state: ViewState,
    pub api_health: ApiHealth,
}

impl DashboardState {
    /// Flips one flag. Switching a wired domain on for the first time also
    /// marks its dataset as requested.
    pub fn toggle(&mut self, domain: Domain) {
        self.active = self.active.toggled(domain);
        if self.active.is_active(domain) && self.layers.activate(domain) {
            tracing::info!(domain = domain.key(), "layer requested");
        }
        if !domain.is_wired() {
            tracing::debug!(domain = domain.key(), "domain has no data source yet");
        }
        tracing::debug!(active = self.active.active_domains().count(), "layer flags updated");
    }

    pub fn sync_layer(&mut self, domain: Domain, snapshot: &MapData) {
        self.layers.apply(domain, snapshot);
    }

    pub fn hover(&mut self, event: HoverEvent) {
        self.tooltip = event.feature.map(|feature| TooltipInfo {
            feature,
            x: event.x,
            y: event.y,
        });
    }

    pub fn phase(&self, domain: Domain) -> &LoadPhase {
        self.layers.phase(domain)
    }
}

#[derive(Clone, Copy)]
pub struct DashboardActions {
    state: DashboardSignal,
}

impl DashboardActions {
    pub fn new(state: DashboardSignal) -> Self {
        Self { state }
    }

    pub fn toggle_layer(&self, domain: Domain) {
        let mut state = self.state;
        state.write().toggle(domain);
    }

    pub fn sync_layer(&self, domain: Domain, snapshot: &MapData) {
        let mut state = self.state;
        let unchanged = {
            let current = state.peek();
            let mut probe = current.layers.clone();
            probe.apply(domain, snapshot);
            probe == current.layers
        };
        if !unchanged {
            state.write().sync_layer(domain, snapshot);
        }
    }

    pub fn hover(&self, event: HoverEvent) {
        let mut state = self.state;
        if state.peek().tooltip.is_none() && event.feature.is_none() {
            return;
        }
        state.write().hover(event);
    }

    pub fn set_view_state(&self, view_state: ViewState) {
        let mut state = self.state;
        if state.peek().view_state != view_state {
            state.write().view_state = view_state;
        }
    }

    pub fn set_api_health(&self, health: ApiHealth) {
        let mut state = self.state;
        state.write().api_health = health;
    }
}

pub fn use_dashboard_state() -> DashboardSignal {
    use_context::<DashboardSignal>()
}

pub fn use_dashboard_actions() -> DashboardActions {
    DashboardActions::new(use_dashboard_state())
}

//! Top-level rendering coordinator.
//!
//! Rendering is two steps: compute the [`UIViewModel`] from `AppState`, then
//! hand it to the components. Nothing here reads state directly, so the list
//! and the map are always drawn from the same snapshot.

use crate::app::AppState;
use crate::ui::components;
use crate::ui::viewmodel::UIViewModel;
use crate::ui::theme::Theme;

/// Renders the plugin UI to stdout.
pub fn render(state: &AppState, rows: usize, cols: usize) {
    let viewmodel = state.compute_viewmodel(rows, cols);

    render_viewmodel(&viewmodel, &state.theme);
}

fn render_viewmodel(vm: &UIViewModel, theme: &Theme) {
    tracing::trace!(
        items = vm.list.items.len(),
        total = vm.list.total,
        map = vm.map.is_some(),
        popup = vm.popup.is_some(),
        "rendering frame"
    );
    components::render_screen(vm, theme);
}

pub mod interactive;
pub mod render;
pub mod setup;
pub mod ui;

use crate::core::{Action, Catalog, ConversionPresenter, MessageKey, ViewState};

/// Runs one action through the presenter, with a spinner while the network
/// is involved.
pub async fn apply(
    presenter: &ConversionPresenter<'_>,
    state: &ViewState,
    action: Action,
    catalog: &Catalog,
) -> ViewState {
    if !action.needs_network() {
        return presenter.handle(state, action).await;
    }

    let message = match action {
        Action::History { .. } => MessageKey::FetchingHistory,
        _ => MessageKey::FetchingRates,
    };
    let pb = ui::new_spinner(&catalog.text(state.language, message));
    let next = presenter.handle(state, action).await;
    pb.finish_and_clear();
    next
}

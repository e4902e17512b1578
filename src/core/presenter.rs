//! Turns user actions into new view states

use crate::core::convert::{Conversion, ConversionRequest, convert_with};
use crate::core::error::FxError;
use crate::core::history::{HistoryFetcher, PricePoint};
use crate::core::i18n::{Language, MessageKey};
use crate::core::rates::{RateSource, RateTable};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Convert(ConversionRequest),
    Refresh,
    ShowRates,
    History { base: String, target: String },
    SetLanguage(Language),
}

impl Action {
    /// Whether handling this action may wait on the network.
    pub fn needs_network(&self) -> bool {
        !matches!(self, Action::SetLanguage(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryView {
    pub base: String,
    pub target: String,
    pub points: Vec<PricePoint>,
}

/// What the user is currently looking at.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Panel {
    #[default]
    Empty,
    Conversion(Conversion),
    Rates,
    History(HistoryView),
}

/// Everything needed to render one screen. Each action produces a new state;
/// nothing is shared or mutated behind the caller's back.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    pub language: Language,
    pub rates: Option<Arc<RateTable>>,
    pub panel: Panel,
    pub notice: Option<MessageKey>,
    pub error: Option<FxError>,
}

impl ViewState {
    pub fn new(language: Language) -> Self {
        ViewState {
            language,
            ..Default::default()
        }
    }

    /// A fresh state that keeps the session data (language and rates).
    fn carry_over(&self) -> Self {
        ViewState {
            language: self.language,
            rates: self.rates.clone(),
            ..Default::default()
        }
    }
}

pub struct ConversionPresenter<'a> {
    rates: &'a dyn RateSource,
    history: &'a dyn HistoryFetcher,
}

impl<'a> ConversionPresenter<'a> {
    pub fn new(rates: &'a dyn RateSource, history: &'a dyn HistoryFetcher) -> Self {
        Self { rates, history }
    }

    /// Applies `action` to `state`. Never fails: errors land in
    /// [`ViewState::error`] and previously fetched rates are kept.
    pub async fn handle(&self, state: &ViewState, action: Action) -> ViewState {
        debug!(?action, "Handling action");
        let mut next = state.carry_over();

        match action {
            Action::Convert(request) => match self.rates.rates().await {
                Ok(rates) => {
                    match convert_with(&rates, &request) {
                        Ok(conversion) => next.panel = Panel::Conversion(conversion),
                        Err(e) => next.error = Some(e),
                    }
                    next.rates = Some(rates);
                }
                Err(e) => next.error = Some(e),
            },
            Action::Refresh => match self.rates.refresh().await {
                Ok(rates) => {
                    next.rates = Some(rates);
                    next.panel = Panel::Rates;
                    next.notice = Some(MessageKey::Refreshed);
                }
                Err(e) => next.error = Some(e),
            },
            Action::ShowRates => match self.rates.rates().await {
                Ok(rates) => {
                    next.rates = Some(rates);
                    next.panel = Panel::Rates;
                }
                Err(e) => next.error = Some(e),
            },
            Action::History { base, target } => {
                let base = base.trim().to_uppercase();
                let target = target.trim().to_uppercase();
                let points = if base == target {
                    Vec::new()
                } else {
                    self.history.fetch_history(&base, &target).await
                };
                next.panel = Panel::History(HistoryView {
                    base,
                    target,
                    points,
                });
            }
            Action::SetLanguage(language) => {
                next.language = language;
                next.panel = state.panel.clone();
                next.notice = Some(MessageKey::LanguageChanged);
            }
        }

        next
    }
}

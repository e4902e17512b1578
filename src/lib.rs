pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::{
    Action, AssetPriceProvider, Catalog, ConversionPresenter, ConversionRequest, Language,
    ViewState,
};
use crate::providers::{
    CachingRateProvider, CoinGeckoProvider, EcbRateProvider, ReferenceRateProvider,
    YahooHistoryProvider,
};
use anyhow::Result;
use tracing::{debug, info};

pub type RateService = CachingRateProvider<ReferenceRateProvider<EcbRateProvider>>;

pub enum AppCommand {
    Convert {
        amount: f64,
        from: String,
        to: String,
        refresh: bool,
        history: bool,
    },
    Rates,
    History {
        base: String,
        target: String,
    },
    Interactive,
}

/// Builds the cached fiat + crypto rate source described by `config`.
pub fn build_rate_service(config: &AppConfig) -> RateService {
    let timeout = config.timeout();
    let fiat = EcbRateProvider::new(&config.providers.ecb.base_url, timeout);
    let asset = config.providers.coingecko.as_ref().map(|cg| {
        Box::new(CoinGeckoProvider::new(
            &cg.base_url,
            &cg.asset_id,
            &cg.symbol,
            timeout,
        )) as Box<dyn AssetPriceProvider>
    });
    CachingRateProvider::new(ReferenceRateProvider::new(fiat, asset), config.cache_ttl())
}

pub fn build_history_provider(config: &AppConfig) -> YahooHistoryProvider {
    let provider = YahooHistoryProvider::new(&config.providers.yahoo.base_url, config.timeout());
    match &config.providers.coingecko {
        Some(cg) => provider.with_crypto_symbols(&[cg.symbol.as_str()]),
        None => provider,
    }
}

fn ensure_no_error(state: &ViewState) -> Result<()> {
    match &state.error {
        Some(e) => Err(anyhow::Error::new(e.clone())),
        None => Ok(()),
    }
}

pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    language: Option<Language>,
) -> Result<()> {
    info!("fxconv starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let catalog = match &config.messages_path {
        Some(path) => Catalog::load_from_path(path)?,
        None => Catalog::embedded()?,
    };

    let rates = build_rate_service(&config);
    let history = build_history_provider(&config);
    let presenter = ConversionPresenter::new(&rates, &history);
    let mut state = ViewState::new(language.unwrap_or(config.language));

    match command {
        AppCommand::Convert {
            amount,
            from,
            to,
            refresh,
            history,
        } => {
            if refresh {
                state = cli::apply(&presenter, &state, Action::Refresh, &catalog).await;
                ensure_no_error(&state)?;
            }

            let request = ConversionRequest::new(amount, &from, &to);
            state = cli::apply(&presenter, &state, Action::Convert(request), &catalog).await;
            ensure_no_error(&state)?;
            println!("{}", cli::render::render(&state, &catalog));

            if history {
                let action = Action::History {
                    base: from,
                    target: to,
                };
                state = cli::apply(&presenter, &state, action, &catalog).await;
                println!("\n{}", cli::render::render(&state, &catalog));
            }
        }
        AppCommand::Rates => {
            state = cli::apply(&presenter, &state, Action::ShowRates, &catalog).await;
            ensure_no_error(&state)?;
            println!("{}", cli::render::render(&state, &catalog));
        }
        AppCommand::History { base, target } => {
            state = cli::apply(&presenter, &state, Action::History { base, target }, &catalog).await;
            println!("{}", cli::render::render(&state, &catalog));
        }
        AppCommand::Interactive => cli::interactive::run(&presenter, &catalog, state).await?,
    }

    Ok(())
}

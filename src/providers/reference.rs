use crate::core::error::FxError;
use crate::core::rates::{AssetPriceProvider, RateProvider, RateTable};
use async_trait::async_trait;
use futures::future::{OptionFuture, join};
use tracing::warn;

/// Combines a fiat rate source with an optional single-asset price source.
///
/// The fiat table is mandatory: if it fails, the whole fetch fails. The asset
/// is best effort and is listed as unavailable when its price cannot be had.
pub struct ReferenceRateProvider<F: RateProvider> {
    fiat: F,
    asset: Option<Box<dyn AssetPriceProvider>>,
}

impl<F: RateProvider> ReferenceRateProvider<F> {
    pub fn new(fiat: F, asset: Option<Box<dyn AssetPriceProvider>>) -> Self {
        Self { fiat, asset }
    }
}

#[async_trait]
impl<F: RateProvider> RateProvider for ReferenceRateProvider<F> {
    async fn fetch_rates(&self) -> Result<RateTable, FxError> {
        let asset_price: OptionFuture<_> = self.asset.as_ref().map(|a| a.fetch_price()).into();
        let (fiat, asset_price) = join(self.fiat.fetch_rates(), asset_price).await;

        let mut table = fiat?;

        if let (Some(asset), Some(price)) = (self.asset.as_ref(), asset_price) {
            // Asset prices are quoted per unit; the table wants units per base.
            let added = price.and_then(|p| table.insert(asset.symbol(), 1.0 / p));
            if let Err(e) = added {
                warn!(symbol = asset.symbol(), error = %e, "Asset price unavailable");
                table.mark_unavailable(asset.symbol());
            }
        }

        Ok(table)
    }
}

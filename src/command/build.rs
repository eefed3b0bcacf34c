use crate::{
    compile::{self, ChangeSet},
    config::Project,
    internal_prelude::*,
    signal::{Outcome, Product},
};
use std::sync::Arc;

/// Compiles every entry once. A compile error is reported, not returned.
pub async fn build(proj: &Arc<Project>) -> Result<()> {
    match compile::style(proj, &ChangeSet::all_changes()).await.await?? {
        Outcome::Success(Product::Style) => debug!("Sass build done with changes"),
        Outcome::Success(Product::None) => debug!("Sass build done, outputs up to date"),
        Outcome::Stopped => info!("Sass build interrupted"),
        Outcome::Failed => warn!("Sass build failed"),
    }
    Ok(())
}

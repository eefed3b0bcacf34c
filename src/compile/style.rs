use super::{
    artifacts::{report, BuildArtifacts, OutputFiles},
    dart_sass, scss, ChangeSet,
};
use crate::{
    config::{Compiler, Project},
    ext::{fs, PathExt},
    internal_prelude::*,
    logger::GRAY,
    signal::{Outcome, Product},
};
use camino::Utf8PathBuf;
use std::{sync::Arc, time::Instant};
use tokio::task::{self, JoinHandle};

pub async fn style(
    proj: &Arc<Project>,
    changes: &ChangeSet,
) -> JoinHandle<Result<Outcome<Product>>> {
    let changes = changes.clone();
    let proj = proj.clone();

    tokio::spawn(async move {
        if !changes.need_style_build() {
            debug!("Sass no build needed {changes:?}");
            return Ok(Outcome::Success(Product::None));
        }
        debug!("Sass building for {changes}");
        build(&proj).await
    })
}

async fn build(proj: &Arc<Project>) -> Result<Outcome<Product>> {
    fs::create_dir_all(&proj.dest).await?;

    let mut product = Product::None;
    let mut failed = false;
    for entry in &proj.entries {
        if entry.is_partial() {
            warn!(
                "Sass {} is a partial and is not compiled on its own",
                GRAY.paint(entry)
            );
            continue;
        }
        match build_entry(proj, entry.clone()).await? {
            Outcome::Success(p) => product = product.merge(p),
            Outcome::Stopped => return Ok(Outcome::Stopped),
            // the other entries are still worth building
            Outcome::Failed => failed = true,
        }
    }
    Ok(if failed {
        Outcome::Failed
    } else {
        Outcome::Success(product)
    })
}

async fn build_entry(proj: &Arc<Project>, entry: Utf8PathBuf) -> Result<Outcome<Product>> {
    let outputs = OutputFiles::new(&proj.dest, &entry)?;
    let start = Instant::now();

    let outcome = match &proj.compiler {
        Compiler::DartSass { exe } => dart_sass::compile(exe, proj, &entry, &outputs).await?,
        Compiler::Grass => {
            let proj = proj.clone();
            let entry = entry.clone();
            let res = task::spawn_blocking(move || scss::compile(&proj, &entry, &outputs))
                .await
                .wrap_err("Sass compile task panicked")?;
            match res {
                Ok(artifacts) => Outcome::Success(publish(&artifacts).await?),
                Err(e) => {
                    report(&e);
                    Outcome::Failed
                }
            }
        }
    };

    if outcome.is_success() {
        info!(
            "Sass compiled {} in {:?}",
            GRAY.paint(entry.unbase(&proj.working_dir).unwrap_or_else(|| entry.clone())),
            start.elapsed()
        );
    }
    Ok(outcome)
}

/// Writes the map before the css that references it.
pub async fn publish(artifacts: &BuildArtifacts) -> Result<Product> {
    let outputs = &artifacts.outputs;
    let map_changed = fs::write_if_changed(&outputs.map, &artifacts.map).await?;
    let css_changed = fs::write_if_changed(&outputs.css, &artifacts.css).await?;

    if map_changed || css_changed {
        trace!("Sass wrote {}", GRAY.paint(&outputs.css));
        Ok(Product::Style)
    } else {
        trace!("Sass {} unchanged", GRAY.paint(&outputs.css));
        Ok(Product::None)
    }
}

use super::build::build;
use crate::{
    compile,
    config::Project,
    internal_prelude::*,
    service,
    signal::{Interrupt, Outcome, Product},
};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

/// Builds, then rebuilds after every batch of source changes until shutdown.
/// Returns the number of rebuilds.
pub async fn watch(proj: &Arc<Project>) -> Result<usize> {
    // subscribe before the watcher starts so that no batch is missed
    let int = Interrupt::subscribe_any();
    build(proj).await?;

    let _watch = service::notify::spawn(proj)?;

    let res = run_loop(proj, int).await;
    if res.is_err() {
        Interrupt::request_shutdown().await;
    }
    res
}

pub async fn run_loop(
    proj: &Arc<Project>,
    mut int: tokio::sync::broadcast::Receiver<()>,
) -> Result<usize> {
    let mut rebuilds = 0;
    loop {
        debug!("Watch waiting for changes");
        match int.recv().await {
            Ok(()) => {}
            // several batches arrived during the last build, they are all pending
            Err(RecvError::Lagged(n)) => trace!("Watch skipped {n} interrupt(s)"),
            Err(RecvError::Closed) => return Ok(rebuilds),
        }

        if Interrupt::is_shutdown_requested().await {
            debug!("Shutting down");
            return Ok(rebuilds);
        }

        let changes = Interrupt::take_source_changes().await;
        if changes.is_empty() {
            trace!("Watch nothing pending");
            continue;
        }

        rebuilds += 1;
        match compile::style(proj, &changes).await.await?? {
            Outcome::Success(Product::Style) => info!("Watch updated style"),
            Outcome::Success(Product::None) => trace!("Watch build step done with no changes"),
            Outcome::Failed => trace!("Watch build step failed, waiting for the next save"),
            Outcome::Stopped => info!("Watch interrupted. Restarting build step."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Opts};
    use camino::{Utf8Path, Utf8PathBuf};
    use std::{fs, time::Duration};
    use temp_dir::TempDir;
    use tokio::time::{sleep, timeout, Instant};

    /// Polls until the file holds `needle`.
    async fn wait_for(file: &Utf8Path, needle: &str) {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if fs::read_to_string(file).is_ok_and(|css| css.contains(needle)) {
                return;
            }
            assert!(Instant::now() < deadline, "{file} never contained {needle}");
            sleep(Duration::from_millis(50)).await;
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn one_save_rebuilds_once_and_shutdown_ends_the_loop() {
        let dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        fs::create_dir(root.join("scss")).unwrap();
        fs::write(root.join("scss/sass.toml"), "[sass]\ndebounce-ms = 100\n").unwrap();
        fs::write(root.join("scss/main.scss"), ".a {\n  color: red;\n}\n").unwrap();
        let opts = Opts {
            release: false,
            verbose: 0,
        };
        let conf = Config::load(opts, &root, Some(Utf8Path::new("scss/sass.toml"))).unwrap();
        let css = root.join("css/main.css");

        let proj = conf.project.clone();
        let task = tokio::spawn(async move { watch(&proj).await });

        wait_for(&css, "red").await;
        // the watcher starts right after the first build
        sleep(Duration::from_millis(300)).await;

        fs::write(root.join("scss/main.scss"), ".a {\n  color: blue;\n}\n").unwrap();
        wait_for(&css, "#00f").await;
        // longer than the debounce window, a second batch would have landed
        sleep(Duration::from_millis(500)).await;

        Interrupt::request_shutdown().await;
        let rebuilds = timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(rebuilds, 1);
    }
}

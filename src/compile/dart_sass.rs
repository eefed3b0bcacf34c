use super::artifacts::{report, CompileError, OutputFiles};
use crate::{
    config::Project,
    ext::{
        fs,
        sync::{wait_piped_interruptible, CommandResult, OutputExt},
    },
    internal_prelude::*,
    logger::GRAY,
    signal::{Interrupt, Outcome, Product},
};
use camino::Utf8Path;
use tokio::process::Command;

pub fn sass_args(proj: &Project, entry: &Utf8Path, outputs: &OutputFiles) -> Vec<String> {
    let mut args = vec![
        "--no-error-css".to_string(),
        format!("--style={}", proj.style.as_str()),
        "--source-map-urls=relative".to_string(),
    ];
    args.extend(proj.include_paths.iter().map(|p| format!("--load-path={p}")));
    args.push(entry.to_string());
    args.push(outputs.css.to_string());
    args
}

/// Runs the `sass` executable, which writes the css and map itself.
pub async fn compile(
    exe: &Utf8Path,
    proj: &Project,
    entry: &Utf8Path,
    outputs: &OutputFiles,
) -> Result<Outcome<Product>> {
    let args = sass_args(proj, entry, outputs);
    trace!(
        "Sass running {}",
        GRAY.paint(format!("{exe} {}", args.join(" ")))
    );

    let before = fs::file_hash(&outputs.css).await?;
    let mut cmd = Command::new(exe);
    cmd.args(&args);

    match wait_piped_interruptible("Dart Sass", cmd, Interrupt::subscribe_any()).await? {
        CommandResult::Success(output) => {
            let stderr = output.stderr();
            // deprecation notices and @warn
            if !stderr.trim().is_empty() {
                warn!("Sass {}", stderr.trim_end());
            }
            let after = fs::file_hash(&outputs.css).await?;
            Ok(Outcome::Success(if before == after {
                Product::None
            } else {
                Product::Style
            }))
        }
        CommandResult::Interrupted => Ok(Outcome::Stopped),
        CommandResult::Failure(output) => {
            let message = match output.stderr() {
                s if s.trim().is_empty() => output.stdout(),
                s => s,
            };
            report(&CompileError::Process {
                exe: exe.to_path_buf(),
                entry: entry.to_path_buf(),
                message: message.trim_end().to_string(),
            });
            Ok(Outcome::Failed)
        }
    }
}

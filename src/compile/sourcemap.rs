use super::artifacts::OutputFiles;
use crate::{config::Project, ext::PathExt, internal_prelude::*};
use camino::{Utf8Path, Utf8PathBuf};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use parcel_sourcemap::SourceMap;
use serde::Serialize;

pub struct Printed {
    /// ends with the `sourceMappingURL` comment
    pub css: String,
    pub map: String,
}

/// A stylesheet read while compiling, listed in the map with its content.
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub path: Utf8PathBuf,
    pub content: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SourceMapJson<'a> {
    version: u8,
    file: &'a str,
    sources: Vec<String>,
    sources_content: Vec<&'a str>,
    names: &'a [String],
    mappings: String,
}

/// Reprints the compiled css with lightningcss, recording a mapping for every
/// printed rule.
///
/// grass does not track positions, so the mappings point into the compiled css
/// itself. It is the first source of the map, named after the entry with a
/// `.css` suffix and embedded as `sourcesContent`. The stylesheets in `loaded`
/// follow with their content, without mappings.
pub fn print(
    css: &str,
    proj: &Project,
    outputs: &OutputFiles,
    loaded: &[LoadedSource],
) -> Result<Printed> {
    let compiled = outputs.compiled_source();
    let mut source_map = SourceMap::new("/");
    source_map.add_source(&compiled);

    let parse_options = ParserOptions {
        filename: compiled.clone(),
        ..Default::default()
    };
    let minify = proj.style.is_compressed();

    let code = match StyleSheet::parse(css, parse_options) {
        Ok(mut stylesheet) => {
            // the optimisation pass merges rules, only worth it for release
            if proj.release {
                stylesheet
                    .minify(MinifyOptions {
                        targets: proj.targets,
                        ..Default::default()
                    })
                    .wrap_err("Could not minify css")?;
            }
            let options = PrinterOptions {
                targets: proj.targets,
                minify,
                source_map: Some(&mut source_map),
                ..Default::default()
            };
            stylesheet.to_css(options).wrap_err("Could not print css")?.code
        }
        Err(e) => {
            trace!("Css could not parse the compiled stylesheet, keeping it as is: {e}");
            css.to_string()
        }
    };

    let map = encode(&mut source_map, outputs, compiled, css, loaded)?;
    Ok(Printed {
        css: with_map_reference(&code, outputs.map_name()),
        map,
    })
}

fn encode(
    source_map: &mut SourceMap,
    outputs: &OutputFiles,
    compiled: String,
    css: &str,
    loaded: &[LoadedSource],
) -> Result<String> {
    let mut vlq = Vec::new();
    source_map
        .write_vlq(&mut vlq)
        .map_err(|e| eyre!("Could not encode source map mappings: {e:?}"))?;

    let dest = outputs.css.parent().unwrap_or(Utf8Path::new(""));
    let mut sources = vec![compiled];
    let mut sources_content = vec![css];
    for source in loaded {
        sources.push(source.path.relative_from(dest)?.to_string());
        sources_content.push(&source.content);
    }

    let json = SourceMapJson {
        version: 3,
        file: outputs.css_name(),
        sources,
        sources_content,
        names: source_map.get_names(),
        mappings: String::from_utf8(vlq).wrap_err("Source map mappings are not utf-8")?,
    };
    serde_json::to_string(&json).dot()
}

/// The css with a trailing comment pointing at its map.
pub fn with_map_reference(css: &str, map_name: &str) -> String {
    let css = css.trim_end();
    let reference = format!("/*# sourceMappingURL={map_name} */\n");
    if css.is_empty() {
        reference
    } else {
        format!("{css}\n{reference}")
    }
}

#[cfg(test)]
mod tests {
    use super::with_map_reference;

    #[test]
    fn reference_goes_last() {
        assert_eq!(
            with_map_reference("a {\n  color: red;\n}\n\n", "main.css.map"),
            "a {\n  color: red;\n}\n/*# sourceMappingURL=main.css.map */\n"
        );
        assert_eq!(
            with_map_reference("", "empty.css.map"),
            "/*# sourceMappingURL=empty.css.map */\n"
        );
    }
}

//! Command-line front end: renders one gallery page to PNG frames.

use std::path::PathBuf;

use mlgallery::config::{self, GallerySettings};
use mlgallery::gallery::{Gallery, Page};
use mlgallery::logging;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }

    let config_path = match &options.config_path {
        Some(path) => path.clone(),
        None => config::config_path().map_err(|err| err.to_string())?,
    };
    let mut settings = config::load_from_path(&config_path).map_err(|err| err.to_string())?;
    apply_options(&mut settings, &options)?;
    if options.save {
        config::save_to_path(&settings, &config_path).map_err(|err| err.to_string())?;
        println!("Saved settings to {}", config_path.display());
    }

    let Target::Page(page) = options.target else {
        let text = toml::to_string_pretty(&settings).map_err(|err| err.to_string())?;
        println!("# {}", config_path.display());
        print!("{text}");
        return Ok(());
    };
    let mut gallery = Gallery::new(settings).map_err(|err| err.to_string())?;
    let report = gallery.run(page).map_err(|err| format!("{page}: {err}"))?;
    println!("{page}: {}", report.summary);
    if let Some(err) = &report.fallback {
        println!("  computed locally ({err})");
    }
    println!(
        "  {} frame(s) in {}",
        report.frames.len(),
        gallery.output_dir().join(page.as_str()).display()
    );
    for artifact in &report.artifacts {
        println!("  wrote {}", artifact.display());
    }
    Ok(())
}

fn apply_options(settings: &mut GallerySettings, options: &CliOptions) -> Result<(), String> {
    for (key, value) in &options.overrides {
        let key = match options.target {
            Target::Page(page) => settings.qualify_key(page.settings_section(), key),
            Target::Config => key.clone(),
        };
        settings
            .apply_override(&key, value)
            .map_err(|err| err.to_string())?;
    }
    if let Some(dir) = &options.output_dir {
        settings.output_dir = Some(dir.clone());
    }
    if options.offline {
        settings.offline = true;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Target {
    Page(Page),
    Config,
}

#[derive(Debug, Clone)]
struct CliOptions {
    target: Target,
    config_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    offline: bool,
    save: bool,
    overrides: Vec<(String, String)>,
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut target: Option<Target> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut output_dir: Option<PathBuf> = None;
    let mut offline = false;
    let mut save = false;
    let mut overrides = Vec::new();

    let mut idx = 0usize;
    while idx < args.len() {
        let arg = args[idx].as_str();
        match arg {
            "-h" | "--help" => return Err(help_text()),
            "--config" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--config requires a value".to_string())?;
                config_path = Some(PathBuf::from(value));
            }
            "--out" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--out requires a value".to_string())?;
                output_dir = Some(PathBuf::from(value));
            }
            "--offline" => {
                offline = true;
            }
            "--save" => {
                save = true;
            }
            flag if flag.starts_with("--") => {
                let flag = &flag[2..];
                let (key, value) = match flag.split_once('=') {
                    Some((key, value)) => (key, value.to_string()),
                    None => {
                        idx += 1;
                        let value = args
                            .get(idx)
                            .ok_or_else(|| format!("--{flag} requires a value"))?;
                        (flag, value.clone())
                    }
                };
                if key.is_empty() {
                    return Err(format!("Unknown argument: {arg}\n\n{}", help_text()));
                }
                overrides.push((key.replace('-', "_"), value));
            }
            name if target.is_none() => {
                target = Some(if name.eq_ignore_ascii_case("config") {
                    Target::Config
                } else {
                    Target::Page(name.parse::<Page>().map_err(|err| format!("{err}\n\n{}", help_text()))?)
                });
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }

    let target = target.ok_or_else(help_text)?;
    Ok(CliOptions {
        target,
        config_path,
        output_dir,
        offline,
        save,
        overrides,
    })
}

fn help_text() -> String {
    let pages: Vec<&str> = Page::ALL.iter().map(|page| page.as_str()).collect();
    [
        "mlgallery".to_string(),
        String::new(),
        "Renders a machine-learning visualization page to PNG frames.".to_string(),
        String::new(),
        "Usage:".to_string(),
        "  mlgallery <page> [options] [--<setting> <value>]...".to_string(),
        "  mlgallery config [--<setting> <value>]... [--save]".to_string(),
        String::new(),
        format!("Pages: {}", pages.join(", ")),
        "  `config` prints the effective settings and the file they came from.".to_string(),
        String::new(),
        "Options:".to_string(),
        "  --config <file>       Settings file (default: <config dir>/.mlgallery/config.toml).".to_string(),
        "  --out <dir>           Directory for rendered frames.".to_string(),
        "  --offline             Never call the backend; use local computation.".to_string(),
        "  --save                Write the effective settings back to the settings file.".to_string(),
        "  --<setting> <value>   Override one setting, e.g. `--k 5` on the kmeans page".to_string(),
        "                        or `--canvas.width 800`. Bare names resolve to the page's".to_string(),
        "                        section first. Lists are comma separated.".to_string(),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn page_and_overrides_are_parsed() {
        let options = parse_args(args(&[
            "kmeans",
            "--k",
            "4",
            "--canvas.max-frames=12",
            "--offline",
            "--out",
            "frames",
        ]))
        .unwrap();
        assert_eq!(options.target, Target::Page(Page::KMeans));
        assert_eq!(
            options.overrides,
            vec![
                ("k".to_string(), "4".to_string()),
                ("canvas.max_frames".to_string(), "12".to_string())
            ]
        );
        assert!(options.offline);
        assert_eq!(options.output_dir, Some(PathBuf::from("frames")));
    }

    #[test]
    fn overrides_resolve_against_the_page_section() {
        let options = parse_args(args(&["dbscan", "--epsilon", "2.5", "--seed", "9"])).unwrap();
        let mut settings = GallerySettings::default();
        apply_options(&mut settings, &options).unwrap();
        assert_eq!(settings.dbscan.epsilon, 2.5);
        assert_eq!(settings.dbscan.seed, 9);
        assert_eq!(settings.kmeans.seed, GallerySettings::default().kmeans.seed);
    }

    #[test]
    fn missing_page_and_unknown_page_are_errors() {
        assert!(parse_args(Vec::new()).is_err());
        assert!(parse_args(args(&["umap"])).unwrap_err().contains("Unknown page"));
        assert!(parse_args(args(&["kmeans", "--k"])).is_err());
        assert_eq!(parse_args(args(&["config"])).unwrap().target, Target::Config);
    }
}

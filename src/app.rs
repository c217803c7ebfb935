use std::io::Write;
use std::time::Duration;

use clap::{error::ErrorKind, CommandFactory, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Instant;

use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::filter::FacetFilter;
use crate::gallery::Gallery;
use crate::output::{self, OutputFormat};
use crate::runner::{self, Options, Runner};
use crate::session::{self, Command};
use crate::utils::{self, format_kv_line, Reporter};

fn print_banner() {
    const BANNER: &str = r#"
    __          _                 ____
   / /_  ____ _(_)________ _____ _/ / /__  _______  __
  / __ \/ __ `/ / ___/ __ `/ __ `/ / / _ \/ ___/ / / /
 / / / / /_/ / / /  / /_/ / /_/ / / /  __/ /  / /_/ /
/_/ /_/\__,_/_/_/   \__, /\__,_/_/_/\___/_/   \__, /
                   /____/                    /____/
          v0.1.0 - filterable hairstyle gallery
    "#;
    let _ = write!(&mut rainbowcoat::stdout(), "{}", BANNER);
    println!();
}

fn format_opt_value(v: Option<&str>, default: &str) -> String {
    match v {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    match value {
        Some(v) if v.trim().is_empty() => None,
        other => other,
    }
}

#[derive(Clone, Debug)]
struct RunConfig {
    options: Options,
    output: Option<String>,
    output_format: Option<OutputFormat>,
    interactive: bool,
    no_color: bool,
    verbose: u8,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = args.no_color || cfg.no_color.unwrap_or(false);

    let data = config::expand_tilde_string(
        args.data
            .or(cfg.data)
            .unwrap_or_else(|| "./hairstyles.json".to_string())
            .as_str(),
    );

    let filter = FacetFilter::new(
        args.length.or(cfg.length).as_deref(),
        args.style.or(cfg.style).as_deref(),
        args.face.or(cfg.face_shape).as_deref(),
    );

    let timeout = match args.timeout.as_deref() {
        Some(raw) => utils::parse_duration_secs(raw)
            .map_err(|e| format!("invalid --timeout '{raw}': {e}"))?,
        None => match cfg.timeout {
            Some(secs) if secs.is_finite() && secs > 0.0 => Duration::try_from_secs_f64(secs)
                .map_err(|_| format!("invalid timeout {secs}, value is too large"))?,
            Some(secs) => return Err(format!("invalid timeout {secs}, expected positive seconds")),
            None => crate::probe::DEFAULT_PROBE_TIMEOUT,
        },
    };

    let swipe_threshold = args
        .swipe_threshold
        .or(cfg.swipe_threshold)
        .unwrap_or(crate::carousel::DEFAULT_SWIPE_THRESHOLD);
    if !swipe_threshold.is_finite() || swipe_threshold <= 0.0 {
        return Err("invalid swipe-threshold, expected a positive number of pixels".to_string());
    }

    // A CLI source of either kind overrides both config keys.
    let (base_url, asset_dir) = if args.base_url.is_some() || args.asset_dir.is_some() {
        (non_empty(args.base_url), non_empty(args.asset_dir))
    } else {
        (non_empty(cfg.base_url), non_empty(cfg.asset_dir))
    };
    if base_url.is_some() && asset_dir.is_some() {
        return Err("use either base_url or asset_dir, not both".to_string());
    }

    let default_image = args
        .default_image
        .or(cfg.default_image)
        .unwrap_or_else(|| crate::probe::DEFAULT_IMAGE.to_string());

    let user_agent = args
        .user_agent
        .or(cfg.user_agent)
        .unwrap_or_else(|| utils::DEFAULT_USER_AGENT.to_string());

    let output = non_empty(args.output.or(cfg.output)).map(|p| config::expand_tilde_string(&p));
    let output_format_raw = args.output_format.or(cfg.output_format);
    let output_format = match output_format_raw.as_deref() {
        Some(raw) => Some(
            OutputFormat::parse(raw)
                .ok_or_else(|| format!("invalid output format '{raw}', expected text, json or html"))?,
        ),
        None => output.as_deref().and_then(output::infer_format_from_path),
    };

    Ok(RunConfig {
        options: Options {
            data,
            filter,
            timeout,
            base_url,
            asset_dir,
            default_image,
            swipe_threshold,
            user_agent,
        },
        output,
        output_format,
        interactive: args.interactive,
        no_color,
        verbose: args.verbose,
    })
}

async fn write_output(path: &str, rendered: &[u8]) -> Result<(), String> {
    let mut outfile = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .await
        .map_err(|e| format!("failed to open output file: {e}"))?;
    outfile
        .write_all(rendered)
        .await
        .map_err(|_| "failed to write output file".to_string())?;
    Ok(())
}

async fn render_with_progress(gallery: &mut Gallery, filter: FacetFilter, reporter: &Reporter) {
    let total = gallery.candidate_count(&filter) as u64;
    let pb = ProgressBar::new(total);
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.blue} {prefix:.bold} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} images",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb.set_prefix("probing");
    pb.enable_steady_tick(Duration::from_millis(120));

    gallery
        .resolver_mut()
        .set_reporter(reporter.with_progress(pb.clone()));
    gallery.render(filter).await;
    pb.finish_and_clear();
    gallery.resolver_mut().set_reporter(reporter.clone());
}

fn print_summary(gallery: &Gallery) {
    let cards = gallery.cards();
    let navigable = cards.iter().filter(|c| c.is_navigable()).count();
    let fallback = cards.iter().filter(|c| c.display.is_fallback()).count();
    format_kv_line("Entries", &gallery.entries().len().to_string());
    format_kv_line("Filters", &gallery.filter().summary());
    format_kv_line("Cards", &cards.len().to_string());
    format_kv_line("Carousels", &navigable.to_string());
    format_kv_line("Default image", &fallback.to_string());
}

async fn run_session(gallery: &mut Gallery, reporter: &Reporter) -> Result<(), String> {
    println!("{}", session::HELP.dimmed());
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    loop {
        print!("{} ", ">".bold().cyan());
        let _ = std::io::stdout().flush();
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => return Err(format!("failed to read stdin: {e}")),
        };
        let cmd = match session::parse_command(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(e) => {
                reporter.warn(&e);
                continue;
            }
        };
        if cmd == Command::Quit {
            break;
        }
        let rerenders = matches!(cmd, Command::Filter(..) | Command::Clear);
        let cmd = if rerenders {
            // Re-render with progress, then just describe the result.
            let mut filter = gallery.filter().clone();
            match &cmd {
                Command::Filter(facet, value) => filter.set(*facet, value.as_deref()),
                _ => filter = FacetFilter::default(),
            }
            render_with_progress(gallery, filter, reporter).await;
            Command::Show
        } else {
            cmd
        };
        match session::execute(gallery, cmd).await {
            Ok(out) => println!("{out}"),
            Err(e) => reporter.warn(&e),
        }
    }
    Ok(())
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }
    print_banner();

    let reporter = Reporter::new(run.verbose);

    format_kv_line("Data", &run.options.data);
    format_kv_line(
        "Timeout",
        &format!("{}s", run.options.timeout.as_secs_f64()),
    );
    format_kv_line("Default image", &run.options.default_image);
    format_kv_line(
        "Output",
        &format_opt_value(run.output.as_deref(), "stdout"),
    );
    println!();

    let now = Instant::now();
    let filter = run.options.filter.clone();
    let runner = Runner::new(run.options)
        .map_err(|e| e.to_string())?
        .reporter(reporter.clone());

    let entries = match runner.load().await {
        Ok(entries) => entries,
        Err(e) => {
            reporter.error(&e.to_string());
            if let (Some(path), Some(OutputFormat::Html)) = (run.output.as_deref(), run.output_format) {
                write_output(path, &output::page::render_error_html(&e.to_string())).await?;
                reporter.info(&format!("error page written to {path}"));
            }
            return Err("could not load hairstyle data".to_string());
        }
    };
    reporter.info(&format!(
        "loaded {} hairstyles from {}",
        entries.len(),
        runner.source().describe()
    ));

    let mut gallery = runner.gallery(entries);
    render_with_progress(&mut gallery, filter, &reporter).await;
    print_summary(&gallery);
    println!();

    if run.interactive {
        run_session(&mut gallery, &reporter).await?;
    }

    let page = runner::build_page(&gallery);
    match run.output.as_deref() {
        Some(path) => {
            let format = run.output_format.unwrap_or(OutputFormat::Text);
            write_output(path, &output::render(format, &page)).await?;
            reporter.info(&format!("gallery written to {path}"));
        }
        None if !run.interactive => {
            let format = run.output_format.unwrap_or(OutputFormat::Text);
            print!("{}", String::from_utf8_lossy(&output::render(format, &page)));
        }
        None => {}
    }

    let elapsed_time = now.elapsed();

    println!();
    println!(
        ":: Completed :: rendered in {:.2}s ::",
        elapsed_time.as_secs_f64()
    );

    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp => {
                print!("{}", CliArgs::command().render_long_help());
                return Ok(());
            }
            ErrorKind::DisplayVersion => {
                let cmd = CliArgs::command();
                print!("{}", cmd.render_version());
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    let user_config_path = match args.config.as_deref() {
        Some(p) => Some(config::expand_tilde(p)),
        None => config::default_config_path(),
    };

    if args.init_config {
        let path = user_config_path.ok_or_else(|| "could not locate home directory".to_string())?;
        if config::ensure_default_config_file(&path)? {
            println!("wrote default config to {}", path.display());
        } else {
            println!("config already exists at {}", path.display());
        }
        return Ok(());
    }

    // An explicit --config must exist; the default location is optional.
    let cfg = match (args.config.is_some(), user_config_path.as_ref()) {
        (true, Some(path)) => config::load_config(path, false)?,
        (false, Some(path)) => config::load_config(path, true)?,
        (_, None) => ConfigFile::default(),
    };

    let run = build_run_config(args, cfg)?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))?;
    Ok(())
}

use crate::cli::args::CliArgs;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(raw) = args.timeout.as_deref() {
        crate::utils::parse_duration_secs(raw)
            .map_err(|e| format!("invalid --timeout '{raw}': {e}"))?;
    }
    if let Some(px) = args.swipe_threshold {
        if !px.is_finite() || px <= 0.0 {
            return Err("invalid swipe-threshold, expected a positive number of pixels".to_string());
        }
    }
    if let Some(raw) = args.output_format.as_deref() {
        if crate::output::OutputFormat::parse(raw).is_none() {
            return Err(format!(
                "invalid --output-format '{raw}', expected text, json or html"
            ));
        }
    }
    if let Some(raw) = args.base_url.as_deref() {
        reqwest::Url::parse(raw.trim()).map_err(|e| format!("invalid --base-url '{raw}': {e}"))?;
    }
    if let Some(raw) = args.default_image.as_deref() {
        if raw.trim().is_empty() {
            return Err("invalid default-image, expected a non-empty path".to_string());
        }
    }
    if args.base_url.is_some() && args.asset_dir.is_some() {
        return Err("use either --base-url or --asset-dir, not both".to_string());
    }
    Ok(())
}
